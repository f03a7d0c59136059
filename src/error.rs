use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for the autoloader and the encoding converter
#[derive(Error, Debug)]
pub enum Error {
    /// File bytes are not valid for the detected codec
    #[error("Decode error: {} contains bytes that are not valid {codec}", .path.display())]
    Decode { path: PathBuf, codec: String },

    /// A table file is missing its `#` or `@` header line
    #[error(
        "{}: no keys or columns were provided; the file must start with\n\t#tableName\tkey1\tkey2 ...\n\t@column1\tcolumn2\tcolumn3 ...",
        .path.display()
    )]
    MissingHeader { path: PathBuf },

    /// File column count differs from the live table's column count
    #[error(
        "table {table}: the file declares {file_columns} columns but the database table has {db_columns}"
    )]
    SchemaMismatch {
        table: String,
        file_columns: usize,
        db_columns: usize,
    },

    /// A declared key column does not exist in the table or the file header
    #[error("table {table}: key column {key} is not one of the table's columns")]
    UnknownKey { table: String, key: String },

    /// A data row's field count disagrees with the column header
    #[error("{}:{line}: row has {found} fields, expected {expected}", .path.display())]
    RowWidth {
        path: PathBuf,
        line: usize,
        found: usize,
        expected: usize,
    },

    /// A name from a table file is not a usable SQL identifier
    #[error("{name:?} is not a valid table or column identifier")]
    BadIdentifier { name: String },

    /// A SQL statement failed to execute
    #[error("SQL statement failed: {source}\n> SQL: {sql}")]
    Statement {
        sql: String,
        #[source]
        source: postgres::Error,
    },

    /// The external schema script exited with a failure status
    #[error("psql exited with {status} while loading the models file")]
    SchemaScript { status: std::process::ExitStatus },

    /// Sequence file could not be used
    #[error("sequence file {}: {reason}", .path.display())]
    Sequence { path: PathBuf, reason: String },

    /// Database or connection error
    #[error("Database error: {0}")]
    Db(#[from] postgres::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for autoloader operations
pub type Result<T> = std::result::Result<T, Error>;
