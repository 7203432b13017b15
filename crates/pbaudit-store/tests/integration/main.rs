//! Integration tests for pbaudit-store
//!
//! Uses wiremock to simulate a PocketBase server and verifies end-to-end
//! behavior of authentication, record primitives, and batch operations.

mod common;

mod test_auth;
mod test_batch;
mod test_records;
