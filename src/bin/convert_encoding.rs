use autoload::encoding::{self, Conversion};
use autoload::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Check a table file's text encoding and convert it to UTF-8 if needed
#[derive(Parser)]
#[command(name = "convert-encoding")]
#[command(
    about = "Detect a table file's encoding and rewrite it as UTF-8, keeping the original under oldEncodeTables/",
    long_about = None
)]
struct Cli {
    /// The table file to be checked
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    file: PathBuf,
}

fn main() -> ExitCode {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("> ERROR: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<()> {
    if !cli.file.is_file() {
        eprintln!("The provided file was not found, please check that the name was correct.");
        std::process::exit(1);
    }

    let detected = encoding::detect_file(&cli.file)?;
    println!("Detected encoding: {}.", detected.name());

    if !detected.needs_conversion() {
        println!("This file should already be correct, no conversion needed.");
        return Ok(());
    }

    println!("Converting the file...");
    match encoding::normalize_file(&cli.file)? {
        Conversion::Converted { from, backup } => {
            println!(
                "The conversion from {from} was successful; the original file was kept at {}.",
                backup.display()
            );
        }
        Conversion::NoChange { .. } => {
            println!("This file should already be correct, no conversion needed.");
        }
    }
    Ok(())
}
