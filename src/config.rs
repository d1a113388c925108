//! Runtime configuration, read once at startup from NETVEIL_* environment
//! variables with sensible defaults for a single-host install.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port.
    pub http_port: u16,
    /// Folder holding console-owned state (users.json).
    pub state_root: PathBuf,
    /// Append-only JSONL fingerprint log written by the netveil collector.
    pub fingerprint_log: PathBuf,
    /// Folder holding the bundled scan scripts.
    pub scripts_root: PathBuf,
    /// Upper bound on a dispatched script's runtime.
    pub run_timeout: Duration,
    /// Fixed session lifetime.
    pub session_ttl: Duration,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_secs(name: &str, default: u64) -> Duration {
    let secs = std::env::var(name).ok().and_then(|v| v.parse::<u64>().ok()).unwrap_or(default);
    Duration::from_secs(secs)
}

impl Config {
    pub fn from_env() -> Self {
        let http_port = std::env::var("NETVEIL_HTTP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);
        Self {
            http_port,
            state_root: PathBuf::from(env_or("NETVEIL_STATE_FOLDER", "state")),
            fingerprint_log: PathBuf::from(env_or(
                "NETVEIL_FINGERPRINT_LOG",
                "/var/log/netveil_fingerprint.jsonl",
            )),
            scripts_root: PathBuf::from(env_or("NETVEIL_SCRIPTS_FOLDER", "/usr/share/netveil/scripts")),
            run_timeout: env_secs("NETVEIL_RUN_TIMEOUT_SECS", 600),
            session_ttl: env_secs("NETVEIL_SESSION_TTL_SECS", 3600),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
