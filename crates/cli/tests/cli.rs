//! End-to-end tests driving the shardca binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use x509_parser::pem::parse_x509_pem;

fn shardca(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("shardca").unwrap();
    cmd.current_dir(dir);
    cmd
}

fn create_root(dir: &Path) {
    shardca(dir)
        .args([
            "create-root",
            "--cn",
            "E2E Root CA",
            "--org",
            "E2E Org",
            "-n",
            "3",
            "-t",
            "2",
            "--cert-out",
            "root.pem",
            "--share-out",
            "root-1.share",
            "--share-out",
            "root-2.share",
            "--share-out",
            "root-3.share",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Root CA created"));
}

#[test]
fn issues_a_full_chain() {
    let dir = tempdir().unwrap();
    create_root(dir.path());

    for name in ["root.pem", "root-1.share", "root-2.share", "root-3.share"] {
        assert!(dir.path().join(name).exists(), "missing {}", name);
    }

    // Subordinate CA from a two-of-three quorum of the root's shares.
    shardca(dir.path())
        .args([
            "create-subca",
            "--cn",
            "E2E Issuing CA",
            "--parent-cert",
            "root.pem",
            "--parent-share",
            "root-1.share",
            "--parent-share",
            "root-3.share",
            "-n",
            "2",
            "-t",
            "2",
            "--cert-out",
            "subca.pem",
            "--share-out",
            "subca-1.share",
            "--share-out",
            "subca-2.share",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Subordinate CA created"));

    // Leaf signed by the subordinate, with explicit usage bits and export.
    shardca(dir.path())
        .args([
            "sign",
            "--cn",
            "service.e2e.test",
            "--ca-cert",
            "subca.pem",
            "--ca-share",
            "subca-1.share",
            "--ca-share",
            "subca-2.share",
            "--digital-signature",
            "--key-encipherment",
            "--days",
            "90",
            "--cert-out",
            "leaf.pem",
            "--key-out",
            "leaf.key",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed certificate written"));

    // Walk the stored chain: leaf verifies under subca, subca under root.
    let root_data = fs::read(dir.path().join("root.pem")).unwrap();
    let (_, root_pem) = parse_x509_pem(&root_data).unwrap();
    let root = root_pem.parse_x509().unwrap();

    let subca_data = fs::read(dir.path().join("subca.pem")).unwrap();
    let (_, subca_pem) = parse_x509_pem(&subca_data).unwrap();
    let subca = subca_pem.parse_x509().unwrap();

    let leaf_data = fs::read(dir.path().join("leaf.pem")).unwrap();
    let (_, leaf_pem) = parse_x509_pem(&leaf_data).unwrap();
    let leaf = leaf_pem.parse_x509().unwrap();

    root.verify_signature(None).unwrap();
    subca.verify_signature(Some(root.public_key())).unwrap();
    leaf.verify_signature(Some(subca.public_key())).unwrap();
    assert!(root.basic_constraints().unwrap().unwrap().value.ca);
    assert!(subca.basic_constraints().unwrap().unwrap().value.ca);
    assert!(!leaf.basic_constraints().unwrap().unwrap().value.ca);

    let key_pem = fs::read_to_string(dir.path().join("leaf.key")).unwrap();
    assert!(key_pem.contains("PRIVATE KEY"));
}

#[test]
fn share_destination_count_must_match_n() {
    let dir = tempdir().unwrap();

    shardca(dir.path())
        .args([
            "create-root",
            "--cn",
            "Mismatch CA",
            "-n",
            "3",
            "-t",
            "2",
            "--cert-out",
            "root.pem",
            "--share-out",
            "only-one.share",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("share destination"));

    assert!(!dir.path().join("root.pem").exists());
    assert!(!dir.path().join("only-one.share").exists());
}

#[test]
fn common_name_is_mandatory() {
    let dir = tempdir().unwrap();

    shardca(dir.path())
        .args([
            "create-root",
            "--org",
            "No CN Org",
            "--cert-out",
            "root.pem",
            "--share-out",
            "a.share",
            "--share-out",
            "b.share",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("common name"));
}

#[test]
fn under_quorum_signing_is_detected_at_key_parse() {
    let dir = tempdir().unwrap();
    create_root(dir.path());

    shardca(dir.path())
        .args([
            "create-subca",
            "--cn",
            "Starved CA",
            "--parent-cert",
            "root.pem",
            "--parent-share",
            "root-2.share",
            "-n",
            "2",
            "-t",
            "2",
            "--cert-out",
            "starved.pem",
            "--share-out",
            "s1.share",
            "--share-out",
            "s2.share",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("do not parse as a private key"));

    assert!(!dir.path().join("starved.pem").exists());
}

#[test]
fn refuses_to_overwrite_an_existing_certificate() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("root.pem"), "occupied").unwrap();

    shardca(dir.path())
        .args([
            "create-root",
            "--cn",
            "Clobber CA",
            "-n",
            "2",
            "-t",
            "2",
            "--cert-out",
            "root.pem",
            "--share-out",
            "a.share",
            "--share-out",
            "b.share",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));

    assert_eq!(
        fs::read_to_string(dir.path().join("root.pem")).unwrap(),
        "occupied"
    );
}

#[test]
fn inspect_reports_share_structure() {
    let dir = tempdir().unwrap();
    create_root(dir.path());

    shardca(dir.path())
        .args(["inspect", "root-1.share", "root-2.share", "root-3.share"])
        .assert()
        .success()
        .stdout(predicate::str::contains("identity 1"))
        .stdout(predicate::str::contains("structurally consistent"));

    // A duplicated file is flagged.
    shardca(dir.path())
        .args(["inspect", "root-1.share", "root-1.share"])
        .assert()
        .success()
        .stdout(predicate::str::contains("appears 2 times"));
}

#[test]
fn default_validity_is_one_year() {
    let dir = tempdir().unwrap();
    create_root(dir.path());

    let data = fs::read(dir.path().join("root.pem")).unwrap();
    let (_, pem) = parse_x509_pem(&data).unwrap();
    let cert = pem.parse_x509().unwrap();
    let validity = cert.validity();
    assert_eq!(
        validity.not_after.timestamp() - validity.not_before.timestamp(),
        365 * 24 * 60 * 60
    );
}
