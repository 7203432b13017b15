//! pbaudit Core - Audit record model and format conversion
//!
//! This crate contains the pieces of pbaudit that do not talk to the network:
//! - **Domain types** - nested (`accounts -> audits`) and flat audit records,
//!   floor identifiers, and the error taxonomy for malformed input
//! - **Converter** - pure mapping between the nested and flat shapes
//! - **File wrappers** - read a document, convert it, write it back out
//! - **Configuration** - YAML configuration file with environment overrides
//!
//! The converter never performs I/O; only [`files`] touches the filesystem.

pub mod config;
pub mod convert;
pub mod domain;
pub mod files;
