//! `ps` subprocess listing

use super::ProcessLister;
use crate::error::{CheckError, Result};
use crate::models::ProcessListing;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

const PS_COLUMNS: &str = "stat,uid,pid,ppid,vsz,rss,pcpu,etime,comm,args";

/// Default `ps` command line for the running platform
///
/// Linux and the BSD family take BSD-style `axwwo`, Solaris-likes take `-eo`
/// with the same columns. Anything else gets a plain `ps -e`, which has no CPU
/// column, so its rows keep listing order.
pub fn default_ps_command() -> String {
    match std::env::consts::OS {
        "linux" | "macos" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => {
            format!("ps axwwo {}", PS_COLUMNS)
        }
        "solaris" | "illumos" => format!("ps -eo {}", PS_COLUMNS),
        _ => "ps -e".to_string(),
    }
}

/// Process lister that runs a `ps` command line
#[derive(Debug, Clone)]
pub struct PsCommand {
    command: String,
}

impl PsCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for PsCommand {
    fn default() -> Self {
        Self::new(default_ps_command())
    }
}

#[async_trait]
impl ProcessLister for PsCommand {
    async fn list(&self) -> Result<ProcessListing> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| CheckError::listing("empty ps command"))?;

        debug!(command = %self.command, "Running process listing");

        // No timeout: the check waits as long as the listing takes
        let output = Command::new(program)
            .args(parts)
            .output()
            .await
            .map_err(|e| CheckError::listing(format!("'{}' could not be run: {}", self.command, e)))?;

        if !output.status.success() {
            return Err(CheckError::listing(format!(
                "'{}' exited with non-zero status.",
                self.command
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(ProcessListing::from_lines(stdout.lines()))
    }
}
