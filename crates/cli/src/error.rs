//! Error taxonomy of the issuance workflow.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PkiError {
    #[error("subject is invalid: {0}")]
    SubjectInvalid(&'static str),

    #[error("{actual} share destination(s) named for n = {expected}")]
    ShareTargetMismatch { expected: usize, actual: usize },

    #[error("destination '{}' already exists; refusing to overwrite", .0.display())]
    DestinationExists(PathBuf),

    /// Persistence stopped partway through a share set. The written and
    /// pending lists matter: an incomplete set silently lowers the
    /// effective recovery threshold, so the caller must know exactly which
    /// fragments made it to disk.
    #[error(
        "share set incomplete: {} of {} share files written, failed at '{}' ({source}); \
         written: [{}], not written: [{}]",
        .written.len(),
        .written.len() + .pending.len() + 1,
        .failed.display(),
        display_paths(.written),
        display_paths(.pending),
    )]
    ShareSetIncomplete {
        written: Vec<PathBuf>,
        failed: PathBuf,
        pending: Vec<PathBuf>,
        source: std::io::Error,
    },

    #[error("cannot read parent certificate '{}': {detail}", .path.display())]
    ParentCertificateUnreadable { path: PathBuf, detail: String },

    /// The combined share bytes do not parse as a private key. This is the
    /// only signal available for an under-threshold or mixed-origin quorum.
    #[error(
        "combined shares do not parse as a private key ({0}); \
         the supplied quorum may be below the original threshold or drawn from different splits"
    )]
    ParentKeyReconstructionFailed(String),

    #[error("share file '{}' does not hold a valid share: {detail}", .path.display())]
    ShareFileInvalid { path: PathBuf, detail: String },

    #[error("secure random source is unavailable")]
    RandomnessUnavailable,

    #[error(transparent)]
    Shamir(#[from] shardca_shamir::ShamirError),

    #[error("certificate encoding failed: {0}")]
    Certificate(#[from] rcgen::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
