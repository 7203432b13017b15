//! Format converter
//!
//! Pure functions mapping between the nested and flat audit shapes.
//!
//! ## Guarantees
//!
//! - Field content (status, note, score, floor list, id) survives a
//!   `to_flat` -> `to_nested` round trip unchanged.
//! - `to_nested` groups accounts in first-seen order; records of an account
//!   keep their relative order.
//! - `to_flat` rejects dates that are not `YYYY-MM-DD`; `to_nested` never
//!   fails.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{
    decode_floors, encode_floors, AccountAudits, FlatAudit, FormatError, NestedAudit,
    NestedDocument,
};

/// Date format used by the nested shape
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format written into flat records (midnight UTC, millisecond precision)
pub const FLAT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT00:00:00.000Z";

/// Parses a nested-shape `YYYY-MM-DD` date
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(value.trim(), CALENDAR_DATE_FORMAT)
        .map_err(|_| FormatError::invalid_date(value))
}

/// Parses a flat-shape timestamp.
///
/// Accepts ISO date-times with or without a trailing `Z` and with optional
/// fractional seconds, as well as bare `YYYY-MM-DD` dates (taken as midnight).
pub fn parse_flat_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, CALENDAR_DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Converts a nested document into flat records, one per audit.
///
/// # Errors
/// [`FormatError::InvalidDate`] if any audit date is not `YYYY-MM-DD`.
pub fn to_flat(document: &NestedDocument) -> Result<Vec<FlatAudit>, FormatError> {
    let mut records = Vec::with_capacity(document.audit_count());

    for account in &document.accounts {
        for audit in &account.audits {
            let date = parse_calendar_date(&audit.date)?;
            records.push(FlatAudit {
                account: account.id.clone(),
                date: date.format(FLAT_TIMESTAMP_FORMAT).to_string(),
                status: audit.status.clone(),
                note: audit.note.clone(),
                visited_floors: serde_json::Value::String(encode_floors(&audit.visited_floors)),
                score: audit.score.clone(),
                id: audit.id.clone(),
            });
        }
    }

    Ok(records)
}

/// Converts flat records back into a nested document.
///
/// Dates ending in `Z` are reduced to their calendar day; other date strings
/// (and `Z` strings that do not parse) are kept verbatim. Floors are decoded
/// leniently, see [`decode_floors`].
pub fn to_nested(records: &[FlatAudit]) -> NestedDocument {
    let mut accounts: Vec<AccountAudits> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.account.as_str()).or_insert_with(|| {
            accounts.push(AccountAudits::new(record.account.clone()));
            accounts.len() - 1
        });

        accounts[slot].audits.push(NestedAudit {
            date: flat_date_to_calendar(&record.date),
            visited_floors: decode_floors(&record.visited_floors),
            status: record.status.clone(),
            note: record.note.clone(),
            score: record.score.clone(),
            id: record.id.clone(),
        });
    }

    NestedDocument { accounts }
}

fn flat_date_to_calendar(value: &str) -> String {
    if !value.ends_with('Z') {
        return value.to_string();
    }
    match parse_flat_timestamp(value) {
        Some(ts) => ts.format(CALENDAR_DATE_FORMAT).to_string(),
        None => value.to_string(),
    }
}
