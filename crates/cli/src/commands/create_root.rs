//! create-root command.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::ca::{self, RootRequest};
use crate::config::Config;
use crate::subject::SubjectArgs;

#[derive(Args)]
pub struct CreateRootCommand {
    #[command(flatten)]
    pub subject: SubjectArgs,

    /// Validity period in days
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Total number of key shares
    #[arg(short = 'n', long = "shares", value_name = "COUNT")]
    pub shares: Option<usize>,

    /// Shares required to reconstruct the key
    #[arg(short = 't', long = "threshold", value_name = "COUNT")]
    pub threshold: Option<usize>,

    /// Output path for the root CA certificate (PEM)
    #[arg(long, value_name = "FILE")]
    pub cert_out: PathBuf,

    /// Destination file for one key share; repeat once per share (count must equal n)
    #[arg(long = "share-out", value_name = "FILE", required = true, num_args = 1..)]
    pub share_outs: Vec<PathBuf>,
}

impl CreateRootCommand {
    pub fn execute(&self, config: &Config) -> Result<()> {
        let request = RootRequest {
            subject: self.subject.to_subject()?,
            days: self.days.unwrap_or(config.defaults.days),
            shares: self.shares.unwrap_or(config.defaults.shares),
            threshold: self.threshold.unwrap_or(config.defaults.threshold),
            certificate_out: self.cert_out.clone(),
            share_outs: self.share_outs.clone(),
        };

        ca::issue_root(&request)?;

        println!("Root CA created");
        println!("  certificate: {}", request.certificate_out.display());
        println!(
            "  {} shares written, {} required to rebuild the key",
            request.shares, request.threshold
        );
        Ok(())
    }
}
