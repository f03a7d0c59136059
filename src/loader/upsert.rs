//! Upsert statement construction from a file header and live column metadata.

use crate::db::{check_identifier, quote_ident, DbColumn};
use crate::error::{Error, Result};
use crate::loader::header::TableHeader;
use std::path::Path;

/// Literal that replaces single quotes in row values.
///
/// Inherited from the loader this replaces: quotes were rewritten before the
/// value ever reached SQL, and rows already in production carry the word.
/// Kept so old and new loads stay byte-identical.
pub const QUOTE_PLACEHOLDER: &str = "prime";

/// A validated, reusable upsert for one table file.
///
/// `sql` is the parameterized form executed per row: every value is bound as
/// text and cast server-side to the live column's type. [`render`] produces
/// the same statement with the values inlined, for the SQL log.
///
/// [`render`]: UpsertPlan::render
#[derive(Debug)]
pub struct UpsertPlan {
    pub table: String,
    pub sql: String,
    pub columns: usize,
    conflict_target: String,
    set_clause: String,
}

impl UpsertPlan {
    /// Validate the header against the live columns and build the statement.
    ///
    /// Column lists are count-checked, not name-checked; key columns must
    /// exist under the same name in both the live table and the file header.
    pub fn build(header: &TableHeader, db_columns: &[DbColumn]) -> Result<Self> {
        check_identifier(&header.table)?;
        if header.columns.len() != db_columns.len() {
            return Err(Error::SchemaMismatch {
                table: header.table.clone(),
                file_columns: header.columns.len(),
                db_columns: db_columns.len(),
            });
        }
        for key in &header.key_columns {
            let in_table = db_columns.iter().any(|c| &c.name == key);
            let in_file = header.columns.iter().any(|c| c == key);
            if !in_table || !in_file {
                return Err(Error::UnknownKey {
                    table: header.table.clone(),
                    key: key.clone(),
                });
            }
        }

        let placeholders: Vec<String> = db_columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("${}::{}", i + 1, c.ty.name()))
            .collect();
        let conflict_target: Vec<String> =
            header.key_columns.iter().map(|k| quote_ident(k)).collect();
        let set_clause: Vec<String> = db_columns
            .iter()
            .map(|c| format!("{} = EXCLUDED.{}", quote_ident(&c.name), quote_ident(&c.name)))
            .collect();

        let conflict_target = conflict_target.join(", ");
        let set_clause = set_clause.join(", ");
        let sql = format!(
            "INSERT INTO {} VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
            header.table,
            placeholders.join(", "),
            conflict_target,
            set_clause
        );

        Ok(Self {
            table: header.table.clone(),
            sql,
            columns: db_columns.len(),
            conflict_target,
            set_clause,
        })
    }

    /// Render one row's statement with its values inlined, replayable SQL.
    pub fn render(&self, values: &[String]) -> String {
        let literals: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
        format!(
            "INSERT INTO {} VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
            self.table,
            literals.join(", "),
            self.conflict_target,
            self.set_clause
        )
    }
}

/// Split a data row on tabs, applying the quote transform to every value.
pub fn split_row(line: &str, expected: usize, path: &Path, line_no: usize) -> Result<Vec<String>> {
    let cleaned = line.trim().replace('\'', QUOTE_PLACEHOLDER);
    let values: Vec<String> = cleaned.split('\t').map(str::to_owned).collect();
    if values.len() != expected {
        return Err(Error::RowWidth {
            path: path.to_path_buf(),
            line: line_no,
            found: values.len(),
            expected,
        });
    }
    Ok(values)
}

/// Quote a value as a SQL string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use postgres::types::Type;

    fn header(table: &str, keys: &[&str], columns: &[&str]) -> TableHeader {
        TableHeader {
            table: table.to_string(),
            key_columns: keys.iter().map(|s| s.to_string()).collect(),
            columns: columns.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn live_columns() -> Vec<DbColumn> {
        vec![
            DbColumn {
                name: "id".into(),
                ty: Type::INT4,
            },
            DbColumn {
                name: "symbol".into(),
                ty: Type::VARCHAR,
            },
            DbColumn {
                name: "description".into(),
                ty: Type::TEXT,
            },
        ]
    }

    #[test]
    fn test_build_parameterized_upsert() {
        let plan = UpsertPlan::build(
            &header("gene", &["id"], &["id", "symbol", "description"]),
            &live_columns(),
        )
        .unwrap();

        assert_eq!(plan.columns, 3);
        assert_eq!(
            plan.sql,
            "INSERT INTO gene VALUES ($1::int4, $2::varchar, $3::text) \
             ON CONFLICT (\"id\") DO UPDATE SET \
             \"id\" = EXCLUDED.\"id\", \"symbol\" = EXCLUDED.\"symbol\", \
             \"description\" = EXCLUDED.\"description\""
        );
    }

    #[test]
    fn test_build_with_composite_key() {
        let plan = UpsertPlan::build(
            &header("gene", &["id", "symbol"], &["id", "symbol", "description"]),
            &live_columns(),
        )
        .unwrap();

        assert!(plan.sql.contains("ON CONFLICT (\"id\", \"symbol\")"));
    }

    #[test]
    fn test_column_count_mismatch_aborts() {
        let err = UpsertPlan::build(&header("gene", &["id"], &["id", "symbol"]), &live_columns())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::SchemaMismatch {
                file_columns: 2,
                db_columns: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_key_missing_from_table_aborts() {
        let err = UpsertPlan::build(
            &header("gene", &["accession"], &["id", "symbol", "description"]),
            &live_columns(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnknownKey { key, .. } if key == "accession"));
    }

    #[test]
    fn test_key_missing_from_file_columns_aborts() {
        // present in the table, absent from the file's @ line
        let err = UpsertPlan::build(
            &header("gene", &["id"], &["ident", "symbol", "description"]),
            &live_columns(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnknownKey { key, .. } if key == "id"));
    }

    #[test]
    fn test_bad_table_identifier_aborts() {
        let err = UpsertPlan::build(
            &header("gene; --", &["id"], &["id", "symbol", "description"]),
            &live_columns(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::BadIdentifier { .. }));
    }

    #[test]
    fn test_split_row_applies_quote_transform() {
        let values = split_row("1\tO'Brien\tnote", 3, Path::new("t.txt"), 3).unwrap();
        assert_eq!(values, ["1", "OprimeBrien", "note"]);
    }

    #[test]
    fn test_split_row_width_check() {
        let err = split_row("1\ttwo", 3, Path::new("t.txt"), 7).unwrap_err();
        assert!(matches!(
            err,
            Error::RowWidth {
                line: 7,
                found: 2,
                expected: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_render_inlines_values() {
        let plan = UpsertPlan::build(
            &header("gene", &["id"], &["id", "symbol", "description"]),
            &live_columns(),
        )
        .unwrap();

        let rendered = plan.render(&[
            "1".to_string(),
            "BRCA1".to_string(),
            "repair".to_string(),
        ]);
        assert_eq!(
            rendered,
            "INSERT INTO gene VALUES ('1', 'BRCA1', 'repair') \
             ON CONFLICT (\"id\") DO UPDATE SET \
             \"id\" = EXCLUDED.\"id\", \"symbol\" = EXCLUDED.\"symbol\", \
             \"description\" = EXCLUDED.\"description\""
        );
    }

    #[test]
    fn test_quote_literal_doubles_quotes() {
        assert_eq!(quote_literal("plain"), "'plain'");
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
    }
}
