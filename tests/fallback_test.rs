use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("ips-sim"));
    cmd.arg("--data-dir")
        .arg(dir.path())
        .arg("--db-path")
        .arg("some_db")
        .arg("ledger");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to the JSON ledger.",
        ));
    assert!(dir.path().join("Accounts.json").exists());
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("ips-sim"));
    cmd.arg("--data-dir")
        .arg(dir.path().join("data"))
        .arg("--db-path")
        .arg(&db_path)
        .arg("ledger");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
