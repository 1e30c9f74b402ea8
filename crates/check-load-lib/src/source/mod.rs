//! Load average retrieval
//!
//! Two sources are available: the kernel's load average read through
//! `getloadavg`, and the text printed by an `uptime`-like command. The syscall
//! source is preferred wherever `getloadavg` exists.

mod syscall;
mod uptime;

pub use syscall::{online_cpu_count, LoadAvgReader, SyscallLoadSource, HAS_GETLOADAVG};
pub use uptime::{parse_uptime, UptimeLoadSource};

use crate::error::Result;
use crate::models::LoadSample;
use serde::Deserialize;
use std::sync::Arc;

pub use async_trait::async_trait;

/// Default command for the text-parsing source
pub const DEFAULT_UPTIME_COMMAND: &str = "uptime";

/// Trait for load average sources
#[async_trait]
pub trait LoadSource: Send + Sync {
    /// Read the 1, 5 and 15 minute load averages once
    async fn load(&self) -> Result<LoadSample>;

    /// Short name used in diagnostics
    fn name(&self) -> &str;
}

/// Which load source to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadSourceKind {
    /// Pick by platform
    #[default]
    Auto,
    Syscall,
    Uptime,
}

/// Create the load source for the requested kind
pub fn create_load_source(kind: LoadSourceKind, uptime_command: &str) -> Arc<dyn LoadSource> {
    let kind = match kind {
        LoadSourceKind::Auto if HAS_GETLOADAVG => LoadSourceKind::Syscall,
        LoadSourceKind::Auto => LoadSourceKind::Uptime,
        other => other,
    };

    match kind {
        LoadSourceKind::Uptime => {
            tracing::debug!(command = uptime_command, "Using uptime load source");
            Arc::new(UptimeLoadSource::new(uptime_command))
        }
        _ => {
            tracing::debug!("Using syscall load source");
            Arc::new(SyscallLoadSource::new())
        }
    }
}
