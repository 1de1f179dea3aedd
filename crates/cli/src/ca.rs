//! Key-custody certificate issuance.
//!
//! Three operations, each a single linear pass with no state surviving the
//! call: a self-signed root, a subordinate authority, and a leaf. Every CA
//! private key is split into shares the moment it has signed its own
//! certificate; a parent key exists in memory only between quorum
//! reconstruction and the one signature it was reconstructed for.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::RngCore;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, IsCa, KeyPair, KeyUsagePurpose,
    SerialNumber, PKCS_ECDSA_P256_SHA256,
};
use time::{Duration, OffsetDateTime};
use zeroize::Zeroizing;

use crate::custody;
use crate::error::PkiError;
use crate::subject::Subject;

/// Path-length constraint stamped on root certificates: room for one tier
/// of subordinate authorities below the root.
const ROOT_PATH_LEN: u8 = 1;

/// Usage bits every authority certificate carries; certificate signing on
/// top of the base bits the original deployment configures.
const CA_KEY_USAGES: [KeyUsagePurpose; 3] = [
    KeyUsagePurpose::DigitalSignature,
    KeyUsagePurpose::KeyEncipherment,
    KeyUsagePurpose::KeyCertSign,
];

/// Inputs of a root issuance. Immutable; one value per invocation.
#[derive(Debug, Clone)]
pub struct RootRequest {
    pub subject: Subject,
    pub days: u32,
    pub shares: usize,
    pub threshold: usize,
    pub certificate_out: PathBuf,
    pub share_outs: Vec<PathBuf>,
}

/// Inputs of a subordinate-authority issuance.
#[derive(Debug, Clone)]
pub struct SubordinateRequest {
    pub subject: Subject,
    pub days: u32,
    pub shares: usize,
    pub threshold: usize,
    pub parent_certificate: PathBuf,
    pub parent_shares: Vec<PathBuf>,
    pub certificate_out: PathBuf,
    pub share_outs: Vec<PathBuf>,
}

/// Inputs of a leaf issuance. The private key is exported only when
/// `key_out` names a destination; otherwise it is discarded after signing.
#[derive(Debug, Clone)]
pub struct LeafRequest {
    pub subject: Subject,
    pub days: u32,
    pub key_usages: Vec<KeyUsagePurpose>,
    pub parent_certificate: PathBuf,
    pub parent_shares: Vec<PathBuf>,
    pub certificate_out: PathBuf,
    pub key_out: Option<PathBuf>,
}

/// Creates a self-signed root authority, persists its certificate, and
/// splits its private key into the requested share set.
pub fn issue_root(request: &RootRequest) -> Result<(), PkiError> {
    custody::ensure_share_destinations(request.shares, &request.share_outs)?;
    custody::ensure_fresh(&request.certificate_out)?;

    let key_pair = generate_key_pair()?;
    let mut params = base_params(&request.subject, request.days)?;
    params.is_ca = IsCa::Ca(BasicConstraints::Constrained(ROOT_PATH_LEN));
    params.key_usages = CA_KEY_USAGES.to_vec();

    let certificate = params.self_signed(&key_pair)?;
    log::info!(
        "issued self-signed root '{}', valid {} days",
        request.subject.common_name,
        request.days
    );

    persist_authority(
        &certificate,
        &key_pair,
        request.shares,
        request.threshold,
        &request.certificate_out,
        &request.share_outs,
    )
}

/// Creates a subordinate authority signed by a reconstructed parent key.
pub fn issue_subordinate(request: &SubordinateRequest) -> Result<(), PkiError> {
    custody::ensure_share_destinations(request.shares, &request.share_outs)?;
    custody::ensure_fresh(&request.certificate_out)?;

    let parent = load_parent(&request.parent_certificate)?;

    let (certificate, key_pair) = {
        // The reconstructed parent key lives only inside this block.
        let parent_key = reconstruct_parent_key(&request.parent_shares)?;
        let issuer = parent.params.self_signed(&parent_key)?;

        let key_pair = generate_key_pair()?;
        let mut params = base_params(&request.subject, request.days)?;
        let path_len = parent.path_len.unwrap_or(0).saturating_sub(1);
        params.is_ca = IsCa::Ca(BasicConstraints::Constrained(path_len));
        params.key_usages = CA_KEY_USAGES.to_vec();

        let certificate = params.signed_by(&key_pair, &issuer, &parent_key)?;
        (certificate, key_pair)
    };
    log::info!(
        "issued subordinate authority '{}' under '{}'",
        request.subject.common_name,
        request.parent_certificate.display()
    );

    persist_authority(
        &certificate,
        &key_pair,
        request.shares,
        request.threshold,
        &request.certificate_out,
        &request.share_outs,
    )
}

/// Creates a leaf certificate signed by a reconstructed parent key, with the
/// caller's explicit key-usage bit set.
pub fn issue_leaf(request: &LeafRequest) -> Result<(), PkiError> {
    custody::ensure_fresh(&request.certificate_out)?;
    if let Some(key_out) = &request.key_out {
        custody::ensure_fresh(key_out)?;
    }

    let parent = load_parent(&request.parent_certificate)?;

    let (certificate, key_pair) = {
        let parent_key = reconstruct_parent_key(&request.parent_shares)?;
        let issuer = parent.params.self_signed(&parent_key)?;

        let key_pair = generate_key_pair()?;
        let mut params = base_params(&request.subject, request.days)?;
        params.is_ca = IsCa::ExplicitNoCa;
        params.key_usages = request.key_usages.clone();

        let certificate = params.signed_by(&key_pair, &issuer, &parent_key)?;
        (certificate, key_pair)
    };
    log::info!(
        "issued leaf certificate '{}' under '{}'",
        request.subject.common_name,
        request.parent_certificate.display()
    );

    fs::write(&request.certificate_out, certificate.pem())?;
    if let Some(key_out) = &request.key_out {
        let key_pem = Zeroizing::new(key_pair.serialize_pem());
        fs::write(key_out, key_pem.as_bytes())?;
        log::warn!(
            "leaf private key exported in the clear to '{}'",
            key_out.display()
        );
    }
    Ok(())
}

/// Writes an authority's certificate, then shards its private key. The key
/// bytes are zeroized once the share files are on disk.
fn persist_authority(
    certificate: &Certificate,
    key_pair: &KeyPair,
    shares: usize,
    threshold: usize,
    certificate_out: &Path,
    share_outs: &[PathBuf],
) -> Result<(), PkiError> {
    fs::write(certificate_out, certificate.pem())?;
    let secret = Zeroizing::new(key_pair.serialize_pem());
    custody::write_share_set(secret.as_bytes(), shares, threshold, share_outs)
}

fn generate_key_pair() -> Result<KeyPair, PkiError> {
    Ok(KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256)?)
}

/// Certificate parameters common to all three operations: subject, fresh
/// 128-bit serial, and a validity window of exactly `days` × 24 h.
fn base_params(subject: &Subject, days: u32) -> Result<CertificateParams, PkiError> {
    let mut params = CertificateParams::default();
    params.distinguished_name = subject.distinguished_name();
    params.serial_number = Some(random_serial()?);
    let not_before = OffsetDateTime::now_utc();
    params.not_before = not_before;
    params.not_after = not_before + Duration::days(i64::from(days));
    Ok(params)
}

/// 16 random bytes with the top bit cleared, so the serial encodes as a
/// positive DER INTEGER. Collisions are not checked; the 127-bit space makes
/// them negligible.
fn random_serial() -> Result<SerialNumber, PkiError> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| PkiError::RandomnessUnavailable)?;
    bytes[0] &= 0x7f;
    Ok(SerialNumber::from_slice(&bytes))
}

/// A parent authority as read back from disk. Issuer identity comes from
/// the stored certificate at use time; nothing holds a live parent
/// reference across invocations.
struct ParentAuthority {
    params: CertificateParams,
    path_len: Option<u8>,
}

fn load_parent(path: &Path) -> Result<ParentAuthority, PkiError> {
    let pem = fs::read_to_string(path).map_err(|e| PkiError::ParentCertificateUnreadable {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let params =
        CertificateParams::from_ca_cert_pem(&pem).map_err(|e| PkiError::ParentCertificateUnreadable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let (_, parsed_pem) = x509_parser::pem::parse_x509_pem(pem.as_bytes()).map_err(|e| {
        PkiError::ParentCertificateUnreadable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }
    })?;
    let certificate = parsed_pem
        .parse_x509()
        .map_err(|e| PkiError::ParentCertificateUnreadable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    let path_len = certificate
        .basic_constraints()
        .ok()
        .flatten()
        .and_then(|bc| bc.value.path_len_constraint)
        .map(|len| len.min(u32::from(u8::MAX)) as u8);

    Ok(ParentAuthority { params, path_len })
}

/// Combines the share files and parses the result as a private key. A parse
/// failure is the only observable symptom of an under-threshold or
/// mixed-origin quorum.
fn reconstruct_parent_key(sources: &[PathBuf]) -> Result<KeyPair, PkiError> {
    let secret = custody::recover_secret(sources)?;
    let pem = std::str::from_utf8(&secret)
        .map_err(|_| PkiError::ParentKeyReconstructionFailed("combined bytes are not text".into()))?;
    KeyPair::from_pem(pem).map_err(|e| PkiError::ParentKeyReconstructionFailed(e.to_string()))
}
