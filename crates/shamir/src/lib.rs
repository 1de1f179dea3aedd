//! Threshold secret sharing over GF(256), byte by byte.
//!
//! [`split`] fragments a secret into `n` shares so that any `t` of them
//! reconstruct it exactly and any smaller set reveals nothing; [`combine`]
//! interpolates a set of shares back into bytes. The scheme is
//! information-theoretic: each secret byte becomes the constant term of a
//! fresh random polynomial of degree t−1, and a share is the evaluation of
//! every polynomial at one non-zero field element.
//!
//! `combine` is intentionally ignorant of the threshold a share set was
//! created with. Given fewer than `t` shares, or shares from different
//! splits, it returns a deterministic but wrong byte sequence with no error;
//! callers that need to detect this must validate the reconstructed secret
//! themselves (for shardca, by parsing it as a private key).

pub mod gf256;
pub mod poly;
mod share;

use gf256::Gf256;
use hashbrown::HashSet;
use rand::rngs::OsRng;
use rand::RngCore;
pub use share::Share;

/// Largest share count the field supports: one share per non-zero element.
pub const MAX_SHARES: usize = 255;

/// Errors raised by [`split`] and [`combine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShamirError {
    /// Parameters outside 1 ≤ t ≤ n ≤ 255, or an empty secret.
    InvalidParameters(&'static str),
    /// The secure entropy source failed. Fatal; there is no fallback source.
    RandomnessUnavailable,
    /// A share blob is too short, or its length disagrees with the others.
    MalformedShare { expected: usize, actual: usize },
    /// Two shares carry the same identity byte.
    DuplicateShareIdentity(u8),
    /// A share carries the reserved zero identity.
    InvalidShareIdentity,
}

impl std::fmt::Display for ShamirError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameters(reason) => write!(f, "invalid parameters: {}", reason),
            Self::RandomnessUnavailable => {
                write!(f, "secure random source is unavailable")
            }
            Self::MalformedShare { expected, actual } => {
                write!(
                    f,
                    "malformed share: expected {} bytes, found {}",
                    expected, actual
                )
            }
            Self::DuplicateShareIdentity(x) => {
                write!(f, "duplicate share identity: {}", x)
            }
            Self::InvalidShareIdentity => write!(f, "share identity must be non-zero"),
        }
    }
}

impl std::error::Error for ShamirError {}

pub type Result<T> = std::result::Result<T, ShamirError>;

/// Splits `secret` into `n` shares, any `t` of which reconstruct it.
///
/// Share identities are the field elements 1..=n. Polynomial coefficients
/// are drawn from the operating system's entropy source; if that source
/// fails the call fails closed with [`ShamirError::RandomnessUnavailable`]
/// rather than degrading to a weaker generator.
///
/// A threshold of 1 is accepted but emits a warning: every single share
/// then carries the secret verbatim.
pub fn split(secret: &[u8], n: usize, t: usize) -> Result<Vec<Share>> {
    validate_split(secret, n, t)?;
    let mut randomness = vec![0u8; secret.len() * (t - 1)];
    OsRng
        .try_fill_bytes(&mut randomness)
        .map_err(|_| ShamirError::RandomnessUnavailable)?;
    Ok(build_shares(secret, n, t, &randomness))
}

/// [`split`] with a caller-supplied generator, for deterministic tests.
pub fn split_with_rng<R: RngCore>(secret: &[u8], n: usize, t: usize, rng: &mut R) -> Result<Vec<Share>> {
    validate_split(secret, n, t)?;
    let mut randomness = vec![0u8; secret.len() * (t - 1)];
    rng.fill_bytes(&mut randomness);
    Ok(build_shares(secret, n, t, &randomness))
}

/// Reconstructs the byte sequence encoded by `shares`.
///
/// Validates structure only: at least one share, equal widths, pairwise
/// distinct non-zero identities. Correctness of the output is guaranteed
/// only when the shares are ≥ t fragments from a single [`split`]; see the
/// crate-level discussion of under-quorum sets.
pub fn combine(shares: &[Share]) -> Result<Vec<u8>> {
    if shares.is_empty() {
        return Err(ShamirError::InvalidParameters(
            "at least one share is required",
        ));
    }

    let width = shares[0].width();
    let mut identities = HashSet::with_capacity(shares.len());
    for share in shares {
        if share.width() != width {
            return Err(ShamirError::MalformedShare {
                expected: width,
                actual: share.width(),
            });
        }
        if share.x.is_zero() {
            return Err(ShamirError::InvalidShareIdentity);
        }
        if !identities.insert(share.identity()) {
            return Err(ShamirError::DuplicateShareIdentity(share.identity()));
        }
    }

    Ok(poly::interpolate(shares))
}

fn validate_split(secret: &[u8], n: usize, t: usize) -> Result<()> {
    if secret.is_empty() {
        return Err(ShamirError::InvalidParameters(
            "secret must be at least one byte",
        ));
    }
    if t == 0 {
        return Err(ShamirError::InvalidParameters("threshold must be at least 1"));
    }
    if t > n {
        return Err(ShamirError::InvalidParameters(
            "threshold cannot exceed the share count",
        ));
    }
    if n > MAX_SHARES {
        return Err(ShamirError::InvalidParameters(
            "share count cannot exceed 255",
        ));
    }
    if t == 1 {
        log::warn!("threshold 1 requested: every single share reconstructs the secret on its own");
    }
    Ok(())
}

fn build_shares(secret: &[u8], n: usize, t: usize, randomness: &[u8]) -> Vec<Share> {
    let polynomials = secret
        .iter()
        .enumerate()
        .map(|(i, &byte)| poly::polynomial(Gf256(byte), &randomness[i * (t - 1)..(i + 1) * (t - 1)]))
        .collect();
    poly::share_stream(polynomials).take(n).collect()
}
