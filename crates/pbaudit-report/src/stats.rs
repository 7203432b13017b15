//! Aggregate statistics over audit collections
//!
//! [`AuditReport`] is computed once from either record shape and then
//! rendered (see [`crate::render`]) or serialized as-is.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use pbaudit_core::convert::{parse_calendar_date, parse_flat_timestamp};
use pbaudit_core::domain::{FlatAudit, Floor, FormatError, NestedDocument, RecordShape};
use serde::Serialize;
use serde_json::Value;

/// Number of floors listed in the frequency ranking
pub const TOP_FLOORS: usize = 10;

/// Label used for records without an account identifier
pub const UNKNOWN_ACCOUNT: &str = "unknown";

/// Percentage of `count` in `total`; `0.0` when `total` is zero
pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

// ============================================================================
// Report types
// ============================================================================

/// Statistics for a collection of audits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub total_accounts: usize,
    pub total_audits: usize,
    /// Audits whose score is absent or null
    pub missing_scores: usize,
    /// Ascending by year
    pub audits_by_year: Vec<YearCount>,
    /// At most [`TOP_FLOORS`] entries, descending by visits
    pub top_floors: Vec<FloorCount>,
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub audits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorCount {
    pub floor: Floor,
    pub visits: usize,
}

/// Per-account block of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub id: String,
    pub audit_count: usize,
    pub first_audit: Option<NaiveDate>,
    pub last_audit: Option<NaiveDate>,
    pub missing_scores: usize,
    /// Mean gap between consecutive sorted dates; `None` below two dates
    pub avg_days_between: Option<f64>,
}

impl AccountSummary {
    fn new(id: impl Into<String>, dates: &mut [NaiveDate], audit_count: usize, missing_scores: usize) -> Self {
        dates.sort_unstable();
        let avg_days_between = if dates.len() > 1 {
            let gaps: i64 = dates
                .windows(2)
                .map(|pair| (pair[1] - pair[0]).num_days())
                .sum();
            Some(gaps as f64 / (dates.len() - 1) as f64)
        } else {
            None
        };

        Self {
            id: id.into(),
            audit_count,
            first_audit: dates.first().copied(),
            last_audit: dates.last().copied(),
            missing_scores,
            avg_days_between,
        }
    }

    /// Share of this account's audits lacking a score
    pub fn missing_percent(&self) -> f64 {
        percent(self.missing_scores, self.audit_count)
    }
}

// ============================================================================
// Accumulators
// ============================================================================

/// Collection-wide counters shared by both shapes
#[derive(Default)]
struct Totals {
    audits: usize,
    missing_scores: usize,
    years: BTreeMap<i32, usize>,
    floor_visits: Vec<FloorCount>,
    floor_index: HashMap<Floor, usize>,
}

impl Totals {
    fn count_audit(&mut self, has_score: bool) {
        self.audits += 1;
        if !has_score {
            self.missing_scores += 1;
        }
    }

    fn count_date(&mut self, date: NaiveDate) {
        *self.years.entry(date.year()).or_insert(0) += 1;
    }

    fn count_floors(&mut self, floors: impl IntoIterator<Item = Floor>) {
        for floor in floors {
            match self.floor_index.get(&floor) {
                Some(&i) => self.floor_visits[i].visits += 1,
                None => {
                    self.floor_index.insert(floor.clone(), self.floor_visits.len());
                    self.floor_visits.push(FloorCount { floor, visits: 1 });
                }
            }
        }
    }

    fn finish(mut self, total_accounts: usize, accounts: Vec<AccountSummary>) -> AuditReport {
        // Stable sort keeps first-seen order among equal counts
        self.floor_visits.sort_by(|a, b| b.visits.cmp(&a.visits));
        self.floor_visits.truncate(TOP_FLOORS);

        AuditReport {
            total_accounts,
            total_audits: self.audits,
            missing_scores: self.missing_scores,
            audits_by_year: self
                .years
                .into_iter()
                .map(|(year, audits)| YearCount { year, audits })
                .collect(),
            top_floors: self.floor_visits,
            accounts,
        }
    }
}

// ============================================================================
// Construction
// ============================================================================

impl AuditReport {
    /// Computes statistics from a nested document, keeping account order.
    ///
    /// # Errors
    /// [`FormatError::InvalidDate`] if an audit date is not `YYYY-MM-DD`.
    pub fn from_nested(document: &NestedDocument) -> Result<Self, FormatError> {
        let mut totals = Totals::default();
        let mut accounts = Vec::with_capacity(document.accounts.len());

        for account in &document.accounts {
            let mut dates = Vec::with_capacity(account.audits.len());
            let mut missing = 0;
            for audit in &account.audits {
                let date = parse_calendar_date(&audit.date)?;
                totals.count_audit(audit.score.is_some());
                totals.count_date(date);
                totals.count_floors(audit.visited_floors.iter().cloned());
                if audit.score.is_none() {
                    missing += 1;
                }
                dates.push(date);
            }
            accounts.push(AccountSummary::new(
                account.id.clone(),
                &mut dates,
                account.audits.len(),
                missing,
            ));
        }

        Ok(totals.finish(document.accounts.len(), accounts))
    }

    /// Computes statistics from flat records.
    ///
    /// Accounts are listed sorted by identifier. Records whose date cannot be
    /// parsed still count toward totals, scores and floors, but not toward the
    /// year histogram or the account's date statistics.
    pub fn from_flat(records: &[FlatAudit]) -> Self {
        let mut totals = Totals::default();
        let mut groups: BTreeMap<&str, (Vec<NaiveDate>, usize, usize)> = BTreeMap::new();

        for record in records {
            let account = if record.account.is_empty() {
                UNKNOWN_ACCOUNT
            } else {
                record.account.as_str()
            };
            let (dates, count, missing) = groups.entry(account).or_default();

            totals.count_audit(record.score.is_some());
            *count += 1;
            if record.score.is_none() {
                *missing += 1;
            }
            totals.count_floors(record.floors());

            if let Some(timestamp) = parse_flat_timestamp(&record.date) {
                totals.count_date(timestamp.date());
                dates.push(timestamp.date());
            }
        }

        let total_accounts = groups.len();
        let accounts = groups
            .into_iter()
            .map(|(id, (mut dates, count, missing))| {
                AccountSummary::new(id, &mut dates, count, missing)
            })
            .collect();

        totals.finish(total_accounts, accounts)
    }

    /// Computes statistics from a parsed document of either shape.
    ///
    /// `shape` overrides detection (`accounts` key: nested, array: flat).
    pub fn from_document(document: &Value, shape: Option<RecordShape>) -> Result<Self, FormatError> {
        let shape = match shape {
            Some(shape) => shape,
            None => RecordShape::detect(document)?,
        };
        match shape {
            RecordShape::Nested => {
                let nested: NestedDocument = serde_json::from_value(document.clone())?;
                Self::from_nested(&nested)
            }
            RecordShape::Flat => {
                let records: Vec<FlatAudit> = serde_json::from_value(document.clone())?;
                Ok(Self::from_flat(&records))
            }
        }
    }

    /// Share of all audits lacking a score
    pub fn missing_percent(&self) -> f64 {
        percent(self.missing_scores, self.total_audits)
    }
}
