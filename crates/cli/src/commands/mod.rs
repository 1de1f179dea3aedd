//! Subcommands of the shardca CLI.

mod create_root;
mod create_subca;
mod inspect;
mod sign;

pub use create_root::CreateRootCommand;
pub use create_subca::CreateSubcaCommand;
pub use inspect::InspectCommand;
pub use sign::SignCommand;

use crate::config::Config;
use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Create a self-signed root CA and split its private key into shares
    CreateRoot(CreateRootCommand),

    /// Create a subordinate CA signed by a parent whose key is rebuilt from shares
    CreateSubca(CreateSubcaCommand),

    /// Sign a leaf certificate with a CA whose key is rebuilt from shares
    Sign(SignCommand),

    /// Show the structure of share files without reconstructing anything
    Inspect(InspectCommand),
}

impl Commands {
    pub fn execute(&self, config: &Config) -> Result<()> {
        match self {
            Commands::CreateRoot(cmd) => cmd.execute(config),
            Commands::CreateSubca(cmd) => cmd.execute(config),
            Commands::Sign(cmd) => cmd.execute(config),
            Commands::Inspect(cmd) => cmd.execute(config),
        }
    }
}
