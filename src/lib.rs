//! # autoload - table-file bulk loader for PostgreSQL
//!
//! Loads tab-delimited table files (`#table/keys`, `@columns`, then data
//! rows) into a live database with one upsert per row, in single-file,
//! ordered-batch, and full-reload modes. Ships with `convert-encoding`, a
//! companion tool that normalizes table files to UTF-8 before loading.

pub mod config;
pub mod db;
pub mod encoding;
pub mod error;
pub mod loader;
pub mod sqllog;

pub use config::{ConnectionConfig, Sequence, Settings};
pub use db::Db;
pub use error::{Error, Result};
