//! Read path over the append-only fingerprint log written by the netveil
//! collector: one JSON object per line, UTF-8, append order significant.
//! The console only ever holds a read handle, opened per request.

use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to open fingerprint log {path}: {source}")]
    Open { path: PathBuf, source: std::io::Error },
    #[error("failed to read fingerprint log {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("malformed fingerprint record at {path}:{line}: {source}")]
    Malformed { path: PathBuf, line: usize, source: serde_json::Error },
}

#[derive(Debug, Clone)]
pub struct FingerprintLog {
    path: PathBuf,
}

impl FingerprintLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in append order. A missing log is the first-run condition
    /// and yields an empty list; a malformed line fails the whole read.
    pub fn list_all(&self) -> Result<Vec<Value>, LogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.path)
            .map_err(|e| LogError::Open { path: self.path.clone(), source: e })?;
        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| LogError::Read { path: self.path.clone(), source: e })?;
            let record: Value = serde_json::from_str(&line).map_err(|e| LogError::Malformed {
                path: self.path.clone(),
                line: idx + 1,
                source: e,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Records whose `ip` field equals the given address exactly, append
    /// order preserved. Records without a string `ip` are skipped.
    pub fn list_by_ip(&self, ip: &str) -> Result<Vec<Value>, LogError> {
        let records = self.list_all()?;
        Ok(records
            .into_iter()
            .filter(|r| r.get("ip").and_then(Value::as_str) == Some(ip))
            .collect())
    }
}
