//! Batch import and update of flat audit records
//!
//! Both operations walk the input in order, one request at a time, and never
//! abort on a single record's failure. Every input record produces exactly
//! one [`BatchItem`] in the result, so the result can be written straight
//! back to the file it came from.
//!
//! ## Import
//!
//! - record already has an id: passed through, no request ([`BatchStatus::Skipped`])
//! - create succeeds: copy with the store id attached ([`BatchStatus::Created`])
//! - create fails: original record, still without id ([`BatchStatus::Failed`])
//!
//! Re-running an import on its own output issues no create calls.
//!
//! ## Update
//!
//! - record has no id: warned about and passed through ([`BatchStatus::Skipped`])
//! - otherwise the record minus its id is PATCHed; the result holds the
//!   **local** record whether the update succeeded or not. The server's
//!   post-update representation is not merged back.
//!
//! Updates are not idempotent: every run re-issues every PATCH.
//!
//! ## Simulation
//!
//! On an unauthenticated client nothing is sent. Import attaches generated
//! 15-character identifiers and update passes records through, both marked
//! [`BatchStatus::Simulated`].

use pbaudit_core::domain::FlatAudit;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::client::StoreClient;

/// Length of generated simulation identifiers (matches PocketBase ids)
pub const SIMULATED_ID_LEN: usize = 15;

/// Outcome for a single record of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchStatus {
    /// Created in the store; the record now carries the store id
    Created,
    /// Update accepted by the store
    Updated,
    /// No request needed (import: already has an id; update: has no id)
    Skipped,
    /// Client was not authenticated; handled locally without a request
    Simulated,
    /// The store call failed; the record is passed through unchanged
    Failed {
        /// Error reported for the call
        reason: String,
    },
}

impl BatchStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchStatus::Failed { .. })
    }
}

/// A record together with what happened to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub record: FlatAudit,
    #[serde(flatten)]
    pub status: BatchStatus,
}

/// Per-status totals of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub simulated: usize,
    pub failed: usize,
}

impl BatchCounts {
    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.simulated + self.failed
    }
}

/// Result of a batch operation, one item per input record in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    pub items: Vec<BatchItem>,
}

impl BatchResult {
    fn push(&mut self, record: FlatAudit, status: BatchStatus) {
        self.items.push(BatchItem { record, status });
    }

    /// The records, in input order, as they should be written back
    pub fn records(&self) -> Vec<FlatAudit> {
        self.items.iter().map(|item| item.record.clone()).collect()
    }

    /// Consumes the result, returning the records in input order
    pub fn into_records(self) -> Vec<FlatAudit> {
        self.items.into_iter().map(|item| item.record).collect()
    }

    /// Items whose store call failed
    pub fn failures(&self) -> impl Iterator<Item = &BatchItem> {
        self.items.iter().filter(|item| item.status.is_failed())
    }

    pub fn counts(&self) -> BatchCounts {
        let mut counts = BatchCounts::default();
        for item in &self.items {
            match item.status {
                BatchStatus::Created => counts.created += 1,
                BatchStatus::Updated => counts.updated += 1,
                BatchStatus::Skipped => counts.skipped += 1,
                BatchStatus::Simulated => counts.simulated += 1,
                BatchStatus::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Generates an identifier for simulated imports
fn simulated_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SIMULATED_ID_LEN);
    id
}

impl StoreClient {
    /// Imports records lacking an id, sequentially, in input order
    pub async fn batch_import_audits(&self, collection: &str, audits: &[FlatAudit]) -> BatchResult {
        let mut result = BatchResult::default();
        let simulate = !self.is_authenticated();
        if simulate {
            warn!(collection, "Not authenticated; simulating import");
        }

        for audit in audits {
            if audit.has_id() {
                info!(record_id = audit.id.as_deref().unwrap_or_default(), "Skipping audit with existing id");
                result.push(audit.clone(), BatchStatus::Skipped);
                continue;
            }

            if simulate {
                let id = simulated_id();
                info!(account = %audit.account, date = %audit.date, record_id = %id, "Simulated import");
                result.push(audit.with_id(id), BatchStatus::Simulated);
                continue;
            }

            match self.try_create_record(collection, audit).await {
                Ok(record) => {
                    info!(account = %audit.account, date = %audit.date, record_id = %record.id, "Imported audit");
                    result.push(audit.with_id(record.id), BatchStatus::Created);
                }
                Err(e) => {
                    error!(account = %audit.account, date = %audit.date, error = %e, "Failed to import audit");
                    result.push(
                        audit.clone(),
                        BatchStatus::Failed {
                            reason: e.to_string(),
                        },
                    );
                }
            }
        }

        let counts = result.counts();
        info!(
            collection,
            created = counts.created,
            skipped = counts.skipped,
            simulated = counts.simulated,
            failed = counts.failed,
            "Batch import finished"
        );
        result
    }

    /// Re-sends every record that has an id, sequentially, in input order.
    ///
    /// The returned records are the local input records, not the store's
    /// post-update representation.
    pub async fn batch_update_audits(&self, collection: &str, audits: &[FlatAudit]) -> BatchResult {
        let mut result = BatchResult::default();
        let simulate = !self.is_authenticated();
        if simulate {
            warn!(collection, "Not authenticated; simulating update");
        }

        for audit in audits {
            let record_id = match audit.id.as_deref().filter(|id| !id.is_empty()) {
                Some(id) => id,
                None => {
                    warn!(account = %audit.account, date = %audit.date, "Audit has no id, skipping update");
                    result.push(audit.clone(), BatchStatus::Skipped);
                    continue;
                }
            };

            if simulate {
                info!(record_id, account = %audit.account, "Simulated update");
                result.push(audit.clone(), BatchStatus::Simulated);
                continue;
            }

            let body = audit.without_id();
            match self.try_update_record(collection, record_id, &body).await {
                Ok(_) => {
                    info!(record_id, account = %audit.account, date = %audit.date, "Updated audit");
                    result.push(audit.clone(), BatchStatus::Updated);
                }
                Err(e) => {
                    error!(record_id, error = %e, "Failed to update audit");
                    result.push(
                        audit.clone(),
                        BatchStatus::Failed {
                            reason: e.to_string(),
                        },
                    );
                }
            }
        }

        let counts = result.counts();
        info!(
            collection,
            updated = counts.updated,
            skipped = counts.skipped,
            simulated = counts.simulated,
            failed = counts.failed,
            "Batch update finished"
        );
        result
    }
}
