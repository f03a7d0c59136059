//! Database connection wrapper around the blocking `postgres` client.

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use postgres::types::Type;
use postgres::{GenericClient, NoTls, Transaction};

/// Database connection wrapper
pub struct Db {
    client: postgres::Client,
}

impl Db {
    /// Open a connection using the supplied parameters.
    pub fn connect(cfg: &ConnectionConfig) -> Result<Self> {
        let client = postgres::Config::new()
            .host(&cfg.host)
            .port(cfg.port)
            .dbname(&cfg.dbname)
            .user(&cfg.user)
            .password(&cfg.password)
            .connect(NoTls)?;
        Ok(Self { client })
    }

    /// Begin a transaction
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.client.transaction()?)
    }

    /// Close the connection, reporting any terminal error.
    pub fn close(self) -> Result<()> {
        self.client.close()?;
        Ok(())
    }
}

/// One column of a live table: catalog name plus Postgres type
#[derive(Debug, Clone)]
pub struct DbColumn {
    pub name: String,
    pub ty: Type,
}

/// Read a table's column list without touching its rows.
///
/// Prepares a zero-row projection and takes names and types from the
/// statement metadata; nothing executes, so this never appears in a SQL log.
pub fn table_columns<C: GenericClient>(client: &mut C, table: &str) -> Result<Vec<DbColumn>> {
    check_identifier(table)?;
    let stmt = client.prepare(&format!("SELECT * FROM {table} LIMIT 0"))?;
    Ok(stmt
        .columns()
        .iter()
        .map(|c| DbColumn {
            name: c.name().to_string(),
            ty: c.type_().clone(),
        })
        .collect())
}

/// Reject names that cannot be spliced into SQL as identifiers.
///
/// Table names from file headers go into SQL unquoted (the files rely on
/// Postgres case-folding), so they are held to `[A-Za-z_][A-Za-z0-9_]*`.
pub fn check_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::BadIdentifier {
            name: name.to_string(),
        })
    }
}

/// Double-quote a catalog-sourced identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
