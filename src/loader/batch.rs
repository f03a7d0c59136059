//! Ordered multi-file loading: referenced tables before referencing tables.

use crate::config::{Sequence, Settings};
use crate::db::Db;
use crate::error::Result;
use crate::loader::{self, header, LoadSummary};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Scan a directory and return its table files in sequence order.
///
/// Only the first two lines of each candidate are peeked. Files that do not
/// match the `#`/`@` convention are skipped silently; files whose table is
/// not in the sequence list are skipped with a warning, since loading them
/// at an arbitrary point could violate foreign-key order.
pub fn collect_ordered(dir: &Path, sequence: &Sequence) -> Result<Vec<PathBuf>> {
    let mut queue: Vec<(usize, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(table) = peek_table(&path)? else {
            continue;
        };
        match sequence.position(&table) {
            Some(position) => queue.push((position, path)),
            None => eprintln!(
                "Warning: {} looks like a file for the {} table, but that table is not in the sequence list. Skipping it.",
                path.display(),
                table
            ),
        }
    }

    queue.sort();
    Ok(queue.into_iter().map(|(_, path)| path).collect())
}

/// Load every recognized table file in the directory, in sequence order,
/// over the shared connection.
pub fn load_directory(
    db: &mut Db,
    settings: &Settings,
    dir: &Path,
    sequence: &Sequence,
) -> Result<Vec<LoadSummary>> {
    let files = collect_ordered(dir, sequence)?;
    let mut summaries = Vec::with_capacity(files.len());
    for file in &files {
        summaries.push(loader::load_file(db, settings, file)?);
    }
    Ok(summaries)
}

fn peek_table(path: &Path) -> Result<Option<String>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut first = String::new();
    let mut second = String::new();
    reader.read_line(&mut first)?;
    reader.read_line(&mut second)?;
    Ok(header::peek(&first, &second))
}
