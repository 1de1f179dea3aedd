//! shardca — certificate-chain issuance with threshold-sharded keys.
//!
//! Issues a root → intermediate → leaf hierarchy while never leaving a CA
//! private key on disk in one piece: keys are split into Shamir shares at
//! creation and rebuilt in memory only to sign one subordinate certificate.

mod ca;
mod commands;
mod config;
mod custody;
mod error;
mod subject;

use anyhow::Result;
use clap::Parser;
use commands::Commands;
use config::Config;

#[derive(Parser)]
#[command(
    name = "shardca",
    version,
    about = "Certificate authority with Shamir-sharded private keys",
    long_about = "Issues a certificate hierarchy whose CA private keys never touch disk in \
                  recoverable form: every key is split into threshold shares at creation, and \
                  signing a subordinate certificate rebuilds the parent key in memory from a \
                  quorum of share files, uses it once, and discards it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command.execute(&config) {
        Ok(()) => Ok(()),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {}", e);

                if cli.verbose {
                    let mut source = e.source();
                    while let Some(err) = source {
                        eprintln!("  Caused by: {}", err);
                        source = err.source();
                    }
                }
            }
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}
