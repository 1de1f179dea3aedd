//! inspect command: structural report on share files.

use anyhow::Result;
use clap::Args;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::Config;
use crate::custody;

#[derive(Args)]
pub struct InspectCommand {
    /// Share files to inspect
    #[arg(value_name = "SHARES", required = true)]
    pub inputs: Vec<PathBuf>,
}

impl InspectCommand {
    /// Prints identity and payload size per share, then flags structural
    /// problems a combine would reject. Never reconstructs the secret.
    pub fn execute(&self, _config: &Config) -> Result<()> {
        let mut identities: HashMap<u8, usize> = HashMap::new();
        let mut widths: Vec<usize> = Vec::new();

        for path in &self.inputs {
            let share = custody::read_share(path)?;
            println!(
                "{}: identity {}, {} payload byte(s)",
                path.display(),
                share.identity(),
                share.width()
            );
            *identities.entry(share.identity()).or_default() += 1;
            widths.push(share.width());
        }

        let mut issues = Vec::new();
        for (identity, count) in &identities {
            if *count > 1 {
                issues.push(format!(
                    "identity {} appears {} times; duplicates cannot combine",
                    identity, count
                ));
            }
        }
        if identities.contains_key(&0) {
            issues.push("identity 0 is reserved; such a share is invalid".to_string());
        }
        if widths.windows(2).any(|pair| pair[0] != pair[1]) {
            issues.push("payload lengths differ; these shares are not from one split".to_string());
        }

        if issues.is_empty() {
            println!(
                "{} share(s), structurally consistent (threshold cannot be inferred from shares)",
                self.inputs.len()
            );
        } else {
            for issue in &issues {
                println!("warning: {}", issue);
            }
        }
        Ok(())
    }
}
