//! Domain entities
//!
//! This module contains the record types shared by every pbaudit crate:
//! - Floor identifiers and their string-encoded list form
//! - Nested audit documents (interchange shape A)
//! - Flat audit records (interchange shape B)
//! - Domain-specific error types

pub mod errors;
pub mod floor;
pub mod record;

// Re-export commonly used types
pub use errors::FormatError;
pub use floor::{decode_floors, encode_floors, Floor};
pub use record::{
    AccountAudits, FlatAudit, NestedAudit, NestedDocument, RecordShape, DEFAULT_STATUS,
};
