//! Load average parsed from `uptime` output
//!
//! Accepts both phrasings seen in the wild:
//! - `... load average: 0.52, 0.58, 0.59` (Linux, Solaris)
//! - `... load averages: 1.23 1.45 1.67` (macOS, BSD)

use super::LoadSource;
use crate::error::{CheckError, Result};
use crate::models::LoadSample;
use async_trait::async_trait;
use tokio::process::Command;

const MARKERS: [&str; 2] = ["load averages:", "load average:"];

/// Load source that runs an `uptime`-like command once
#[derive(Debug, Clone)]
pub struct UptimeLoadSource {
    command: String,
}

impl UptimeLoadSource {
    /// Create a source for a command line such as `/usr/bin/uptime`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl LoadSource for UptimeLoadSource {
    async fn load(&self) -> Result<LoadSample> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| CheckError::load("empty uptime command"))?;

        let output = Command::new(program)
            .args(parts)
            .output()
            .await
            .map_err(|e| CheckError::load(format!("Error opening {}: {}", self.command, e)))?;

        if !output.status.success() {
            return Err(CheckError::load(format!(
                "Error code {} returned in {}",
                output.status.code().unwrap_or(-1),
                self.command
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let first_line = stdout.lines().next().unwrap_or_default();
        parse_uptime(first_line)
    }

    fn name(&self) -> &str {
        "uptime"
    }
}

/// Parse the three load averages out of one line of `uptime` output
pub fn parse_uptime(line: &str) -> Result<LoadSample> {
    let rest = MARKERS
        .iter()
        .find_map(|marker| line.find(marker).map(|pos| &line[pos + marker.len()..]))
        .ok_or_else(|| CheckError::load(format!("could not parse load from uptime: {}", line)))?;

    let tokens: Vec<&str> = rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    // Anything other than exactly three tokens, such as decimal commas, is rejected
    let &[one, five, fifteen] = tokens.as_slice() else {
        return Err(CheckError::load(format!(
            "expected three load values, got '{}'",
            rest.trim()
        )));
    };

    let parse = |token: &str| {
        token
            .parse::<f64>()
            .map_err(|e| CheckError::load(format!("invalid load value '{}': {}", token, e)))
    };

    Ok(LoadSample::new(parse(one)?, parse(five)?, parse(fifteen)?))
}
