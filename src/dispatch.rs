//! Allow-listed dispatch of the bundled reconnaissance scripts.
//!
//! The closed `ScanCommand` enum is the safety boundary: caller input only
//! enters through `ScanCommand::parse`, so an arbitrary path or shell string
//! can never reach process spawn. Scripts run with no caller-supplied
//! arguments and no shell interpretation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanCommand {
    Scan,
    Stealth,
    Monitor,
    Devices,
    Triangulate,
}

impl ScanCommand {
    pub const ALL: [ScanCommand; 5] = [
        ScanCommand::Scan,
        ScanCommand::Stealth,
        ScanCommand::Monitor,
        ScanCommand::Devices,
        ScanCommand::Triangulate,
    ];

    pub fn parse(name: &str) -> Option<ScanCommand> {
        match name {
            "scan" => Some(ScanCommand::Scan),
            "stealth" => Some(ScanCommand::Stealth),
            "monitor" => Some(ScanCommand::Monitor),
            "devices" => Some(ScanCommand::Devices),
            "triangulate" => Some(ScanCommand::Triangulate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanCommand::Scan => "scan",
            ScanCommand::Stealth => "stealth",
            ScanCommand::Monitor => "monitor",
            ScanCommand::Devices => "devices",
            ScanCommand::Triangulate => "triangulate",
        }
    }

    fn script_file(&self) -> &'static str {
        match self {
            ScanCommand::Scan => "scan_lan.sh",
            ScanCommand::Stealth => "arp_stealth.sh",
            ScanCommand::Monitor => "arp_monitor.sh",
            ScanCommand::Devices => "device_scan.sh",
            ScanCommand::Triangulate => "triangulate.sh",
        }
    }
}

impl fmt::Display for ScanCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one script invocation. A non-zero exit is a reported result,
/// not an error; the service stays up.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub succeeded: bool,
    pub combined_output: String,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("failed to start script for {command}: {source}")]
    Spawn { command: ScanCommand, source: std::io::Error },
    #[error("script for {command} exceeded {}s and was killed", .after.as_secs())]
    TimedOut { command: ScanCommand, after: Duration },
}

#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    scripts_root: PathBuf,
    run_timeout: Duration,
}

impl CommandDispatcher {
    pub fn new(scripts_root: impl Into<PathBuf>, run_timeout: Duration) -> Self {
        Self { scripts_root: scripts_root.into(), run_timeout }
    }

    pub fn script_path(&self, command: ScanCommand) -> PathBuf {
        self.scripts_root.join(command.script_file())
    }

    pub fn scripts_root(&self) -> &Path {
        &self.scripts_root
    }

    /// Run the script mapped to a logical command name and capture its
    /// combined stdout/stderr. Blocks the calling task until the script
    /// exits or the timeout fires; monitor and triangulate are open-ended by
    /// nature, so the timeout is generous and configurable.
    pub async fn run(&self, name: &str) -> Result<CommandResult, DispatchError> {
        let command = ScanCommand::parse(name)
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;
        let script = self.script_path(command);
        info!(target: "dispatch", "run command={} script={}", command, script.display());

        let child = Command::new(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DispatchError::Spawn { command, source: e })?;

        let output = match timeout(self.run_timeout, child.wait_with_output()).await {
            Ok(res) => res.map_err(|e| DispatchError::Spawn { command, source: e })?,
            Err(_) => {
                warn!(target: "dispatch", "command={} timed out after {}s", command, self.run_timeout.as_secs());
                return Err(DispatchError::TimedOut { command, after: self.run_timeout });
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(CommandResult { succeeded: true, combined_output: combined })
        } else {
            warn!(target: "dispatch", "command={} exited with {:?}", command, output.status.code());
            Ok(CommandResult { succeeded: false, combined_output: format!("Error:\n{}", combined) })
        }
    }
}
