//! Command-line behavior of the `sketch-index` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{NamedTempFile, TempDir};

fn fasta(records: &[(&str, &str)]) -> NamedTempFile {
    let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
    for (name, seq) in records {
        writeln!(temp, ">{name}\n{seq}").unwrap();
    }
    temp.flush().unwrap();
    temp
}

fn sketch_index() -> Command {
    Command::cargo_bin("sketch-index").unwrap()
}

const SEQ_A: &str = "ACGTTGCAACGTAGGCTAGCTAGGATCCATTGACCGTAGCTAGCTTAGGCA";
const SEQ_B: &str = "TTTTGGGGCCCCAAAATTTTGGGGCCCCAAAAGATTACAGATTACAGATTACA";

#[test]
fn test_build_info_query() {
    let input = fasta(&[("alpha first", SEQ_A), ("beta", SEQ_B)]);
    let dir = TempDir::new().unwrap();
    let index = dir.path().join("refs.idx");

    sketch_index()
        .args(["build", "-k", "7", "-s", "10", "-o"])
        .arg(&index)
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Sequences: 2"));

    sketch_index()
        .arg("info")
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("k=7 sketch_size=10 stride=1 seed=42"))
        .stdout(predicate::str::contains("alpha first"))
        .stdout(predicate::str::contains("beta"));

    let query = fasta(&[("q", &SEQ_B[5..45])]);
    sketch_index()
        .args(["query", "--format", "tsv"])
        .arg(&index)
        .arg(query.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("q\tbeta\t1\t"));
}

#[test]
fn test_info_json_dump() {
    let input = fasta(&[("alpha", SEQ_A)]);
    let dir = TempDir::new().unwrap();
    let index = dir.path().join("refs.idx");

    sketch_index()
        .args(["build", "-k", "5", "-s", "4", "-o"])
        .arg(&index)
        .arg(input.path())
        .assert()
        .success();

    let output = sketch_index()
        .args(["info", "--dump", "--format", "json"])
        .arg(&index)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["params"]["kmer_size"], 5);
    assert_eq!(json["stats"]["references"], 1);
    assert_eq!(json["references"][0]["name"], "alpha");
    assert_eq!(json["hash_bins"].as_array().unwrap().len(), 4);
}

#[test]
fn test_zero_stride_rejected() {
    let input = fasta(&[("alpha", SEQ_A)]);
    let dir = TempDir::new().unwrap();
    let index = dir.path().join("refs.idx");

    sketch_index()
        .args(["build", "--stride", "0", "-o"])
        .arg(&index)
        .arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("stride must be at least 1"));
    assert!(!index.exists());
}

#[test]
fn test_info_rejects_non_index() {
    let input = fasta(&[("alpha", SEQ_A)]);
    sketch_index()
        .arg("info")
        .arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a sketch index"));
}
