//! Run configuration passed explicitly to every component.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Connection parameters for the target database
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

/// Per-invocation settings shared by the load modes
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionConfig,
    /// Write a `<input>.sql` log of every executed statement
    pub save_sql: bool,
}

/// Ordered table names encoding foreign-key dependency order.
///
/// Referenced tables come before referencing tables; batch loads follow this
/// order and the full reload drops tables in it. The list is trusted as given,
/// it is never checked against the real dependency graph.
#[derive(Debug, Clone)]
pub struct Sequence {
    tables: Vec<String>,
}

impl Sequence {
    /// Parse a sequence file: one table name per line, blank lines and
    /// `#` comment lines ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::Sequence {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let tables: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_owned)
            .collect();
        if tables.is_empty() {
            return Err(Error::Sequence {
                path: path.to_path_buf(),
                reason: "no table names found".into(),
            });
        }
        Ok(Self { tables })
    }

    /// Build a sequence from an in-memory list.
    pub fn new(tables: Vec<String>) -> Self {
        Self { tables }
    }

    /// Position of a table in the load order, if it is listed.
    pub fn position(&self, table: &str) -> Option<usize> {
        self.tables.iter().position(|t| t == table)
    }

    /// Tables in load order.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }
}

/// Resolve a sequence argument that is required for the current mode.
pub fn require_sequence(path: Option<&PathBuf>, mode: &str) -> Result<Sequence> {
    match path {
        Some(p) => Sequence::from_file(p),
        None => Err(Error::Sequence {
            path: PathBuf::from("--sequence"),
            reason: format!("{mode} needs a sequence file; pass --sequence <path>"),
        }),
    }
}
