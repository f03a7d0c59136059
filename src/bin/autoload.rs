use autoload::config::{self, ConnectionConfig, Settings};
use autoload::loader::{self, batch, reload};
use autoload::{Db, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Bulk-load tab-delimited table files into a PostgreSQL database
#[derive(Parser)]
#[command(name = "autoload")]
#[command(about = "Upsert table files into PostgreSQL", long_about = None)]
#[command(group = clap::ArgGroup::new("mode").required(true).multiple(false))]
struct Cli {
    /// Load a single table file
    #[arg(short = 'f', long = "file", group = "mode", value_name = "PATH")]
    tablefile: Option<PathBuf>,

    /// Detect and load every table file in the directory, in sequence order
    #[arg(short = 'D', long, group = "mode", value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Delete all sequence tables and reload them from the models file
    #[arg(long = "reloadTables", group = "mode", value_name = "MODELSFILE")]
    reload_tables: Option<PathBuf>,

    /// Host where the postgres database is
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port the database listens on
    #[arg(long, default_value_t = 5432)]
    port: u16,

    /// The database's name
    #[arg(short = 'd', long)]
    dbname: String,

    /// The user as which to access the database
    #[arg(short = 'U', long)]
    user: String,

    /// The database password for the specified user
    #[arg(short = 'p', long)]
    pwd: String,

    /// Table order file for --dir and --reloadTables, one table name per line
    #[arg(long, value_name = "PATH")]
    sequence: Option<PathBuf>,

    /// Save a log of the executed SQL, one file per table file
    #[arg(long = "saveSQL")]
    save_sql: bool,

    /// Skip the confirmation prompt before --reloadTables
    #[arg(short = 'y', long)]
    yes: bool,
}

fn main() -> ExitCode {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("> ERROR: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<()> {
    let connection = ConnectionConfig {
        host: cli.host.clone(),
        port: cli.port,
        dbname: cli.dbname.clone(),
        user: cli.user.clone(),
        password: cli.pwd.clone(),
    };
    let settings = Settings {
        connection: connection.clone(),
        save_sql: cli.save_sql,
    };

    let mut db = Db::connect(&connection)?;
    println!(
        "\nConnected to database {} as user {}.",
        connection.dbname, connection.user
    );

    if let Some(file) = &cli.tablefile {
        if !file.is_file() {
            eprintln!("\nThe provided file was not found, please check that the name was correct.");
            std::process::exit(1);
        }
        println!();
        loader::load_file(&mut db, &settings, file)?;
    } else if let Some(dir) = &cli.dir {
        if !dir.is_dir() {
            eprintln!(
                "\nThe provided directory was not found, please check that the name was correct."
            );
            std::process::exit(1);
        }
        let sequence = config::require_sequence(cli.sequence.as_ref(), "--dir")?;
        println!();
        batch::load_directory(&mut db, &settings, dir, &sequence)?;
    } else if let Some(models) = &cli.reload_tables {
        let sequence = config::require_sequence(cli.sequence.as_ref(), "--reloadTables")?;
        if !cli.yes && !confirm_reload()? {
            println!("Understood. Aborting.");
            std::process::exit(1);
        }
        reload::reload_tables(&mut db, &connection, &sequence, models)?;
    }

    db.close()?;
    println!("\nDatabase connection closed.");
    Ok(())
}

fn confirm_reload() -> Result<bool> {
    print!("All the tables in the database will be removed, are you sure you want to continue? [y/N]: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}
