//! pbaudit Store - PocketBase record store client
//!
//! Provides an async client for:
//! - Password authentication against the `users` collection
//! - Record CRUD on any collection (create, get, list, update, delete)
//! - Sequential batch import and update of flat audit records
//!
//! Every call is awaited to completion before the next one is issued; batch
//! helpers never dispatch requests in parallel and never retry.
//!
//! ## Modules
//!
//! - [`client`] - HTTP client, authentication state and record primitives
//! - [`batch`] - Fail-soft batch import/update with per-record outcomes

pub mod batch;
pub mod client;

pub use batch::{BatchCounts, BatchItem, BatchResult, BatchStatus};
pub use client::{ListQuery, RecordPage, StoreClient, StoreRecord};

use thiserror::Error;

/// Errors that can occur when communicating with the record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record operation was attempted before a successful authentication
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The store rejected the request payload (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Credentials or token were rejected (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested record or collection does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other non-success status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// A network-level error occurred (connection, timeout, transport)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response could not be parsed or was missing required fields
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A request URL could not be built (unusable base URL or record id)
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
}
