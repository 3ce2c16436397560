use clap::Parser;
use langfile_core::LanguageConfig;
use std::path::PathBuf;

mod commands;
mod init;

use commands::Commands;

#[derive(Parser)]
#[command(name = "langfile")]
#[command(about = "Inspect, check and rewrite language record files", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log resolution decisions and saves
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init::setup_logger(cli.verbose);

    let config = match &cli.config {
        Some(path) => LanguageConfig::from_json_file(path)?,
        None => LanguageConfig::default(),
    };

    let clean = cli.command.execute(&config)?;
    if !clean {
        std::process::exit(1);
    }
    Ok(())
}
