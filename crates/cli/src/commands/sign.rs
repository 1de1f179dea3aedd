//! sign command: leaf certificate issuance.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::ca::{self, LeafRequest};
use crate::config::Config;
use crate::subject::{KeyUsageArgs, SubjectArgs};

#[derive(Args)]
pub struct SignCommand {
    #[command(flatten)]
    pub subject: SubjectArgs,

    #[command(flatten)]
    pub key_usage: KeyUsageArgs,

    /// Validity period in days
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Signing CA certificate (PEM)
    #[arg(long, value_name = "FILE")]
    pub ca_cert: PathBuf,

    /// Signing CA key share file; repeat to supply the quorum
    #[arg(long = "ca-share", value_name = "FILE", required = true, num_args = 1..)]
    pub ca_shares: Vec<PathBuf>,

    /// Output path for the signed certificate (PEM)
    #[arg(long, value_name = "FILE")]
    pub cert_out: PathBuf,

    /// Export the new leaf private key to this path (PEM, unencrypted)
    #[arg(long, value_name = "FILE")]
    pub key_out: Option<PathBuf>,
}

impl SignCommand {
    pub fn execute(&self, config: &Config) -> Result<()> {
        let request = LeafRequest {
            subject: self.subject.to_subject()?,
            days: self.days.unwrap_or(config.defaults.days),
            key_usages: self.key_usage.purposes(),
            parent_certificate: self.ca_cert.clone(),
            parent_shares: self.ca_shares.clone(),
            certificate_out: self.cert_out.clone(),
            key_out: self.key_out.clone(),
        };

        ca::issue_leaf(&request)?;

        println!("Signed certificate written to {}", request.certificate_out.display());
        if let Some(key_out) = &request.key_out {
            println!("Leaf private key written to {}", key_out.display());
        }
        Ok(())
    }
}
