//! The `#`/`@` two-line header convention of table files.

use crate::error::{Error, Result};
use std::path::Path;

/// Parsed table-file header: target table, upsert keys, column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    pub table: String,
    pub key_columns: Vec<String>,
    pub columns: Vec<String>,
}

/// Accumulates header lines until the first data row arrives.
///
/// The two header lines usually open the file, but the loader accepts them
/// anywhere before the data starts, same as the script this replaces.
#[derive(Debug, Default)]
pub struct HeaderBuilder {
    table: Option<String>,
    key_columns: Vec<String>,
    columns: Vec<String>,
}

impl HeaderBuilder {
    /// Consume the remainder of a `#` line: table name, then key columns.
    pub fn table_line(&mut self, rest: &str) {
        let mut parts = rest.trim().split('\t');
        self.table = parts.next().map(str::to_owned).filter(|t| !t.is_empty());
        self.key_columns = parts.map(str::to_owned).collect();
    }

    /// Consume the remainder of an `@` line: the column names in file order.
    pub fn column_line(&mut self, rest: &str) {
        self.columns = rest.trim().split('\t').map(str::to_owned).collect();
    }

    /// Table name, once a `#` line has been seen.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Finish the header; a missing `#` or `@` line (or one that declared no
    /// keys or columns) is a `MissingHeader` error.
    pub fn complete(&self, path: &Path) -> Result<TableHeader> {
        match &self.table {
            Some(table) if !self.key_columns.is_empty() && !self.columns.is_empty() => {
                Ok(TableHeader {
                    table: table.clone(),
                    key_columns: self.key_columns.clone(),
                    columns: self.columns.clone(),
                })
            }
            _ => Err(Error::MissingHeader {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Check the first two lines of a candidate file against the header
/// convention and return the declared table name if they match.
pub fn peek(first: &str, second: &str) -> Option<String> {
    let table = first.strip_prefix('#')?.split('\t').next()?.trim();
    if table.is_empty() || !second.starts_with('@') {
        return None;
    }
    Some(table.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_parses_table_keys_and_columns() {
        let mut builder = HeaderBuilder::default();
        builder.table_line("gene\tid\tsymbol");
        builder.column_line("id\tsymbol\tdescription");

        let header = builder.complete(Path::new("gene.txt")).unwrap();
        assert_eq!(header.table, "gene");
        assert_eq!(header.key_columns, ["id", "symbol"]);
        assert_eq!(header.columns, ["id", "symbol", "description"]);
    }

    #[test]
    fn test_header_trims_line_endings() {
        let mut builder = HeaderBuilder::default();
        builder.table_line("gene\tid\r");
        builder.column_line("id\tname \r");

        let header = builder.complete(Path::new("gene.txt")).unwrap();
        assert_eq!(header.key_columns, ["id"]);
        assert_eq!(header.columns, ["id", "name"]);
    }

    #[test]
    fn test_missing_column_line_is_an_error() {
        let mut builder = HeaderBuilder::default();
        builder.table_line("gene\tid");

        let err = builder.complete(Path::new("gene.txt")).unwrap_err();
        assert!(matches!(err, Error::MissingHeader { .. }));
    }

    #[test]
    fn test_keyless_table_line_is_an_error() {
        let mut builder = HeaderBuilder::default();
        builder.table_line("gene");
        builder.column_line("id\tname");

        let err = builder.complete(Path::new("gene.txt")).unwrap_err();
        assert!(matches!(err, Error::MissingHeader { .. }));
    }

    #[test]
    fn test_peek_accepts_the_convention() {
        assert_eq!(
            peek("#gene\tid\n", "@id\tname\n"),
            Some("gene".to_string())
        );
        assert_eq!(peek("#gene\n", "@id\n"), Some("gene".to_string()));
    }

    #[test]
    fn test_peek_rejects_other_files() {
        assert_eq!(peek("gene\tid\n", "@id\n"), None);
        assert_eq!(peek("#gene\tid\n", "id\tname\n"), None);
        assert_eq!(peek("", ""), None);
    }
}
