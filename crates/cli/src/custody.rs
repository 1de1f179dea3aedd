//! Share-set persistence and recovery.
//!
//! Each share is written to its own destination file as bare base64 text,
//! no headers; the pre-encoding blob is the engine's `[x ‖ y…]` layout.
//! Destinations are owned exclusively by the invocation that names them:
//! writes refuse to replace existing files, and a failure partway through a
//! set reports exactly which fragments reached disk.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use shardca_shamir::{combine, split, Share};
use zeroize::Zeroizing;

use crate::error::PkiError;

/// Checks that `destinations` can receive a share set of size `n`: the
/// count must match and no destination may already exist. Runs before any
/// key material is generated.
pub fn ensure_share_destinations(n: usize, destinations: &[PathBuf]) -> Result<(), PkiError> {
    if destinations.len() != n {
        return Err(PkiError::ShareTargetMismatch {
            expected: n,
            actual: destinations.len(),
        });
    }
    for destination in destinations {
        ensure_fresh(destination)?;
    }
    Ok(())
}

/// Fails if `path` already exists.
pub fn ensure_fresh(path: &Path) -> Result<(), PkiError> {
    if path.exists() {
        return Err(PkiError::DestinationExists(path.to_path_buf()));
    }
    Ok(())
}

/// Splits `secret` into `n` shares with threshold `t` and writes one base64
/// file per destination.
///
/// On a mid-set write failure the error carries the already-written and
/// still-pending destinations, since a partial share set changes the
/// effective recovery threshold.
pub fn write_share_set(
    secret: &[u8],
    n: usize,
    t: usize,
    destinations: &[PathBuf],
) -> Result<(), PkiError> {
    ensure_share_destinations(n, destinations)?;

    let shares = split(secret, n, t)?;
    debug_assert_eq!(shares.len(), destinations.len());

    for (index, (share, destination)) in shares.iter().zip(destinations).enumerate() {
        let encoded = BASE64.encode(share.to_bytes());
        if let Err(source) = fs::write(destination, &encoded) {
            return Err(PkiError::ShareSetIncomplete {
                written: destinations[..index].to_vec(),
                failed: destination.clone(),
                pending: destinations[index + 1..].to_vec(),
                source,
            });
        }
        log::debug!("wrote share {} to '{}'", share.identity(), destination.display());
    }
    Ok(())
}

/// Reads one share from a base64 share file.
pub fn read_share(path: &Path) -> Result<Share, PkiError> {
    let text = fs::read_to_string(path).map_err(|e| PkiError::ShareFileInvalid {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let blob = BASE64
        .decode(text.trim())
        .map_err(|e| PkiError::ShareFileInvalid {
            path: path.to_path_buf(),
            detail: format!("invalid base64: {}", e),
        })?;
    Share::from_bytes(&blob).map_err(|e| PkiError::ShareFileInvalid {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Reads every named share file and combines them into the secret bytes.
///
/// Whether the result really is the original secret depends on the caller
/// supplying a quorum from one split; the engine cannot tell (see the
/// engine's crate docs). The buffer is zeroized on drop.
pub fn recover_secret(sources: &[PathBuf]) -> Result<Zeroizing<Vec<u8>>, PkiError> {
    let shares = sources
        .iter()
        .map(|path| read_share(path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Zeroizing::new(combine(&shares)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn destinations(dir: &Path, count: usize) -> Vec<PathBuf> {
        (1..=count).map(|i| dir.join(format!("share-{}.b64", i))).collect()
    }

    #[test]
    fn share_set_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let outs = destinations(dir.path(), 5);
        let secret = b"round trip through base64 files";

        write_share_set(secret, 5, 3, &outs).unwrap();

        let recovered = recover_secret(&[outs[0].clone(), outs[2].clone(), outs[4].clone()]).unwrap();
        assert_eq!(recovered.as_slice(), secret);
    }

    #[test]
    fn share_files_are_bare_base64() {
        let dir = tempdir().unwrap();
        let outs = destinations(dir.path(), 2);
        write_share_set(b"opaque", 2, 2, &outs).unwrap();

        let text = fs::read_to_string(&outs[0]).unwrap();
        assert!(!text.contains("-----"));
        let blob = BASE64.decode(text.trim()).unwrap();
        assert_eq!(blob[0], 1); // identity byte leads the blob
        assert_eq!(blob.len(), 1 + b"opaque".len());
    }

    #[test]
    fn destination_count_must_match_n() {
        let dir = tempdir().unwrap();
        let outs = destinations(dir.path(), 2);
        let err = write_share_set(b"secret", 3, 2, &outs).unwrap_err();
        assert!(matches!(
            err,
            PkiError::ShareTargetMismatch { expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn existing_destinations_are_not_overwritten() {
        let dir = tempdir().unwrap();
        let outs = destinations(dir.path(), 3);
        fs::write(&outs[1], "occupied").unwrap();

        let err = write_share_set(b"secret", 3, 2, &outs).unwrap_err();
        assert!(matches!(err, PkiError::DestinationExists(path) if path == outs[1]));
        // The pre-existing file is untouched and nothing else was written.
        assert_eq!(fs::read_to_string(&outs[1]).unwrap(), "occupied");
        assert!(!outs[0].exists());
        assert!(!outs[2].exists());
    }

    #[test]
    fn partial_failure_reports_written_and_pending() {
        let dir = tempdir().unwrap();
        let outs = vec![
            dir.path().join("a.b64"),
            dir.path().join("missing-dir").join("b.b64"),
            dir.path().join("c.b64"),
        ];

        let err = write_share_set(b"secret", 3, 2, &outs).unwrap_err();
        match err {
            PkiError::ShareSetIncomplete { written, failed, pending, .. } => {
                assert_eq!(written, vec![outs[0].clone()]);
                assert_eq!(failed, outs[1]);
                assert_eq!(pending, vec![outs[2].clone()]);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(outs[0].exists());
    }

    #[test]
    fn unreadable_or_garbled_share_files_are_rejected() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("absent.b64");
        assert!(matches!(
            read_share(&missing),
            Err(PkiError::ShareFileInvalid { .. })
        ));

        let garbled = dir.path().join("garbled.b64");
        fs::write(&garbled, "!!! not base64 !!!").unwrap();
        assert!(matches!(
            read_share(&garbled),
            Err(PkiError::ShareFileInvalid { .. })
        ));
    }

    #[test]
    fn duplicate_source_files_surface_the_engine_error() {
        let dir = tempdir().unwrap();
        let outs = destinations(dir.path(), 3);
        write_share_set(b"secret", 3, 2, &outs).unwrap();

        let err = recover_secret(&[outs[0].clone(), outs[0].clone()]).unwrap_err();
        assert!(matches!(
            err,
            PkiError::Shamir(shardca_shamir::ShamirError::DuplicateShareIdentity(1))
        ));
    }
}
