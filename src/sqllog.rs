//! Per-input SQL logging for `--saveSQL`.

use crate::error::Result;
use chrono::SecondsFormat;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Log of executed mutating statements, one file per ingested table file.
///
/// When logging is disabled this is an inert shell, so callers record
/// unconditionally. The writer is flushed on both the success and the
/// failure path of a file load.
pub struct SqlLog {
    out: Option<BufWriter<File>>,
}

impl SqlLog {
    /// Create `<input>.sql` next to the input file, or an inert log.
    pub fn create(enabled: bool, input: &Path) -> Result<Self> {
        if !enabled {
            return Ok(Self { out: None });
        }
        let mut out = BufWriter::new(File::create(log_path(input))?);
        writeln!(
            out,
            "-- statements executed for {} at {}",
            input.display(),
            chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        Ok(Self { out: Some(out) })
    }

    /// Append one statement, terminated so the log replays under psql.
    pub fn record(&mut self, sql: &str) -> Result<()> {
        if let Some(out) = &mut self.out {
            writeln!(out, "{sql};")?;
        }
        Ok(())
    }

    /// Flush and close the log.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(mut out) = self.out.take() {
            out.flush()?;
        }
        Ok(())
    }
}

impl Drop for SqlLog {
    fn drop(&mut self) {
        if let Some(out) = &mut self.out {
            let _ = out.flush();
        }
    }
}

/// `<input>.sql`, keeping the input's own extension in place.
pub fn log_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".sql");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_log_path_appends_sql() {
        assert_eq!(
            log_path(Path::new("data/genes.txt")),
            Path::new("data/genes.txt.sql")
        );
    }

    #[test]
    fn test_disabled_log_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("genes.txt");

        let mut log = SqlLog::create(false, &input).unwrap();
        log.record("INSERT INTO genes VALUES ('1')").unwrap();
        log.finish().unwrap();

        assert!(!log_path(&input).exists());
    }

    #[test]
    fn test_statements_recorded_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("genes.txt");

        let mut log = SqlLog::create(true, &input).unwrap();
        log.record("INSERT INTO genes VALUES ('1')").unwrap();
        log.record("INSERT INTO genes VALUES ('2')").unwrap();
        log.finish().unwrap();

        let text = fs::read_to_string(log_path(&input)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("-- statements executed for"));
        assert_eq!(lines[1], "INSERT INTO genes VALUES ('1');");
        assert_eq!(lines[2], "INSERT INTO genes VALUES ('2');");
    }
}
