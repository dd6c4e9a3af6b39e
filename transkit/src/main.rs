mod commands;
mod formatting;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use transkit_core::config::CONFIG_FILE_NAME;

#[derive(Parser)]
#[command(name = "transkit")]
#[command(about = "Run source transformers the way a test runner would")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, action)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    Transform {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, action)]
        coverage: bool,
        #[arg(long, action)]
        esm: bool,
        #[arg(long, action)]
        json: bool,
    },
    CacheKey {
        file: PathBuf,
        #[arg(long, action)]
        coverage: bool,
        #[arg(long, action)]
        esm: bool,
    },
    List {
        #[arg(long, action)]
        json: bool,
    },
    Check {
        #[arg(long, action)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Transform {
            files,
            coverage,
            esm,
            json,
        } => commands::cmd_transform(&cli.config, files, coverage, esm, json)?,
        Commands::CacheKey {
            file,
            coverage,
            esm,
        } => commands::cmd_cache_key(&cli.config, file, coverage, esm)?,
        Commands::List { json } => commands::cmd_list(json)?,
        Commands::Check { json } => commands::cmd_check(&cli.config, json)?,
    }

    Ok(())
}
