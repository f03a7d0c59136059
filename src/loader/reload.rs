//! Destructive full reload: drop every sequence table, replay the models file.

use crate::config::{ConnectionConfig, Sequence};
use crate::db::{check_identifier, Db};
use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;

/// Drop all sequence tables, then recreate them from the models file.
pub fn reload_tables(
    db: &mut Db,
    cfg: &ConnectionConfig,
    sequence: &Sequence,
    models: &Path,
) -> Result<()> {
    drop_all_tables(db, sequence)?;
    run_models_script(cfg, models)
}

/// Drop every table in the sequence list, in listed order.
///
/// Each drop runs under its own savepoint on one shared transaction: a
/// failed drop (usually a table that does not exist yet) is reported as a
/// warning and rolled back to the savepoint, keeping the transaction usable
/// for the remaining tables. One commit at the end.
pub fn drop_all_tables(db: &mut Db, sequence: &Sequence) -> Result<()> {
    println!("\nRemoving tables...");

    let mut tx = db.transaction()?;
    for table in sequence.tables() {
        if let Err(e) = check_identifier(table) {
            eprintln!("> WARNING: {e}");
            continue;
        }
        let sql = format!("DROP TABLE {table} CASCADE");
        let savepoint = tx.savepoint(format!("drop_{table}"))?;
        match execute_drop(savepoint, &sql) {
            Ok(()) => println!("Table {table} removed"),
            Err(e) => {
                eprintln!("> SQL: {sql}");
                eprintln!("> WARNING: {e}");
                println!("Rolling back...");
            }
        }
    }
    tx.commit()?;
    Ok(())
}

fn execute_drop(mut savepoint: postgres::Transaction<'_>, sql: &str) -> Result<()> {
    match savepoint.batch_execute(sql) {
        Ok(()) => {
            savepoint.commit()?;
            Ok(())
        }
        Err(e) => {
            savepoint.rollback()?;
            Err(Error::Db(e))
        }
    }
}

/// The psql invocation that replays the models file.
///
/// The password travels through the environment, not the command line.
pub fn models_command(cfg: &ConnectionConfig, models: &Path) -> Command {
    let mut cmd = Command::new("psql");
    cmd.env("PGPASSWORD", &cfg.password)
        .arg("--host")
        .arg(&cfg.host)
        .arg("--port")
        .arg(cfg.port.to_string())
        .arg("-U")
        .arg(&cfg.user)
        .arg("-d")
        .arg(&cfg.dbname)
        .arg("-f")
        .arg(models);
    cmd
}

/// Run the external schema script and echo its output.
pub fn run_models_script(cfg: &ConnectionConfig, models: &Path) -> Result<()> {
    println!("\nReloading tables...");

    let output = models_command(cfg, models).output()?;
    print!("{}", String::from_utf8_lossy(&output.stdout));
    eprint!("{}", String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(Error::SchemaScript {
            status: output.status,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_models_command_arguments() {
        let cfg = ConnectionConfig {
            host: "db.example".to_string(),
            port: 5433,
            dbname: "rg4db".to_string(),
            user: "loader".to_string(),
            password: "secret".to_string(),
        };

        let cmd = models_command(&cfg, Path::new("models.sql"));
        assert_eq!(cmd.get_program(), "psql");

        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(
            args,
            [
                "--host",
                "db.example",
                "--port",
                "5433",
                "-U",
                "loader",
                "-d",
                "rg4db",
                "-f",
                "models.sql"
            ]
        );

        let password = cmd
            .get_envs()
            .find(|(k, _)| *k == OsStr::new("PGPASSWORD"))
            .and_then(|(_, v)| v);
        assert_eq!(password, Some(OsStr::new("secret")));
    }
}
