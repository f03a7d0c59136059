//! Table-file ingestion: single-file loading, batch ordering, full reload.

pub mod batch;
pub mod header;
pub mod reload;
pub mod upsert;

use crate::config::Settings;
use crate::db::{self, Db};
use crate::error::{Error, Result};
use crate::sqllog::SqlLog;
use header::HeaderBuilder;
use postgres::types::{ToSql, Type};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use upsert::UpsertPlan;

/// What a completed file load did
#[derive(Debug)]
pub struct LoadSummary {
    pub table: String,
    pub rows: u64,
}

/// Load one table file with an upsert per data row.
///
/// All rows execute inside a single transaction committed after the last
/// one; any failure drops the transaction, so the file is all-or-nothing.
/// The SQL log is closed on both paths.
pub fn load_file(db: &mut Db, settings: &Settings, path: &Path) -> Result<LoadSummary> {
    let mut log = SqlLog::create(settings.save_sql, path)?;
    let result = run_load(db, &mut log, path);
    log.finish()?;
    result
}

fn run_load(db: &mut Db, log: &mut SqlLog, path: &Path) -> Result<LoadSummary> {
    let reader = BufReader::new(File::open(path)?);
    let mut builder = HeaderBuilder::default();
    let mut prepared: Option<(UpsertPlan, postgres::Statement)> = None;
    let mut rows: u64 = 0;

    let mut tx = db.transaction()?;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(rest) = line.strip_prefix('#') {
            builder.table_line(rest);
            if let Some(table) = builder.table() {
                println!("Updating table {table}.");
            }
        } else if let Some(rest) = line.strip_prefix('@') {
            builder.column_line(rest);
        } else {
            if line.trim().is_empty() {
                continue;
            }
            // first data row: validate the header against the live schema
            // and prepare the one statement every row reuses
            if prepared.is_none() {
                let table_header = builder.complete(path)?;
                let db_columns = db::table_columns(&mut tx, &table_header.table)?;
                let plan = UpsertPlan::build(&table_header, &db_columns)?;
                let param_types = vec![Type::TEXT; plan.columns];
                let stmt = tx.prepare_typed(&plan.sql, &param_types)?;
                prepared = Some((plan, stmt));
            }
            let (plan, stmt) = prepared.as_ref().expect("prepared above");

            let values = upsert::split_row(&line, plan.columns, path, idx + 1)?;
            let params: Vec<&(dyn ToSql + Sync)> =
                values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            if let Err(e) = tx.execute(stmt, &params) {
                return Err(Error::Statement {
                    sql: plan.render(&values),
                    source: e,
                });
            }
            log.record(&plan.render(&values))?;
            rows += 1;
        }
    }

    // a file with headers and no rows commits vacuously; a file that never
    // produced complete headers is rejected even without data rows
    let table = match prepared {
        Some((plan, _)) => plan.table,
        None => builder.complete(path)?.table,
    };

    tx.commit()?;
    println!("\t{table} table updated ({rows} rows).");
    Ok(LoadSummary { table, rows })
}
