//! Fingerprint log reader tests over tempfile-backed JSONL fixtures.

use anyhow::Result;
use std::io::Write;
use tempfile::tempdir;

use netveil_console::fingerprints::{FingerprintLog, LogError};

fn write_log(path: &std::path::Path, lines: &[&str]) -> Result<()> {
    let mut f = std::fs::File::create(path)?;
    for line in lines {
        writeln!(f, "{}", line)?;
    }
    Ok(())
}

#[test]
fn missing_log_is_the_first_run_condition() -> Result<()> {
    let tmp = tempdir()?;
    let log = FingerprintLog::new(tmp.path().join("netveil_fingerprint.jsonl"));

    assert!(log.list_all()?.is_empty());
    assert!(log.list_by_ip("10.0.0.5")?.is_empty());
    Ok(())
}

#[test]
fn list_by_ip_round_trip() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("netveil_fingerprint.jsonl");
    write_log(&path, &[r#"{"ip":"10.0.0.5","mac":"aa:bb"}"#])?;
    let log = FingerprintLog::new(&path);

    let hits = log.list_by_ip("10.0.0.5")?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["mac"], "aa:bb");

    assert!(log.list_by_ip("10.0.0.9")?.is_empty());
    Ok(())
}

#[test]
fn append_order_is_preserved_for_duplicate_ips() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("netveil_fingerprint.jsonl");
    write_log(&path, &[r#"{"ip":"1.1.1.1","seen":1}"#, r#"{"ip":"1.1.1.1","seen":2}"#])?;
    let log = FingerprintLog::new(&path);

    let hits = log.list_by_ip("1.1.1.1")?;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["seen"], 1);
    assert_eq!(hits[1]["seen"], 2);
    Ok(())
}

#[test]
fn records_without_ip_are_skipped_not_errors() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("netveil_fingerprint.jsonl");
    write_log(&path, &[
        r#"{"hostname":"printer"}"#,
        r#"{"ip":"10.0.0.5","mac":"aa:bb"}"#,
        r#"{"ip":42}"#,
    ])?;
    let log = FingerprintLog::new(&path);

    // list_all passes every well-formed record through untouched
    assert_eq!(log.list_all()?.len(), 3);
    // the ip filter only matches records carrying a string ip
    let hits = log.list_by_ip("10.0.0.5")?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["mac"], "aa:bb");
    Ok(())
}

#[test]
fn malformed_line_fails_the_whole_read() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("netveil_fingerprint.jsonl");
    write_log(&path, &[r#"{"ip":"10.0.0.5"}"#, "not json at all"])?;
    let log = FingerprintLog::new(&path);

    match log.list_all() {
        Err(LogError::Malformed { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected Malformed error, got {:?}", other),
    }
    Ok(())
}
