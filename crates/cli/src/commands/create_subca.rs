//! create-subca command.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::ca::{self, SubordinateRequest};
use crate::config::Config;
use crate::subject::SubjectArgs;

#[derive(Args)]
pub struct CreateSubcaCommand {
    #[command(flatten)]
    pub subject: SubjectArgs,

    /// Validity period in days
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Parent CA certificate (PEM)
    #[arg(long, value_name = "FILE")]
    pub parent_cert: PathBuf,

    /// Parent CA key share file; repeat to supply the quorum
    #[arg(long = "parent-share", value_name = "FILE", required = true, num_args = 1..)]
    pub parent_shares: Vec<PathBuf>,

    /// Total number of key shares for the new CA
    #[arg(short = 'n', long = "shares", value_name = "COUNT")]
    pub shares: Option<usize>,

    /// Shares required to reconstruct the new CA key
    #[arg(short = 't', long = "threshold", value_name = "COUNT")]
    pub threshold: Option<usize>,

    /// Output path for the subordinate CA certificate (PEM)
    #[arg(long, value_name = "FILE")]
    pub cert_out: PathBuf,

    /// Destination file for one key share; repeat once per share (count must equal n)
    #[arg(long = "share-out", value_name = "FILE", required = true, num_args = 1..)]
    pub share_outs: Vec<PathBuf>,
}

impl CreateSubcaCommand {
    pub fn execute(&self, config: &Config) -> Result<()> {
        let request = SubordinateRequest {
            subject: self.subject.to_subject()?,
            days: self.days.unwrap_or(config.defaults.days),
            shares: self.shares.unwrap_or(config.defaults.shares),
            threshold: self.threshold.unwrap_or(config.defaults.threshold),
            parent_certificate: self.parent_cert.clone(),
            parent_shares: self.parent_shares.clone(),
            certificate_out: self.cert_out.clone(),
            share_outs: self.share_outs.clone(),
        };

        ca::issue_subordinate(&request)?;

        println!("Subordinate CA created");
        println!("  certificate: {}", request.certificate_out.display());
        println!(
            "  {} shares written, {} required to rebuild the key",
            request.shares, request.threshold
        );
        Ok(())
    }
}
