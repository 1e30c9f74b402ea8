//! Top CPU consumer listing
//!
//! Runs a `ps`-style command once, then ranks its rows by CPU usage when the
//! listing exposes a CPU column and prints the header plus the top N rows.

mod ps;
mod ranker;

pub use ps::{default_ps_command, PsCommand};
pub use ranker::{detect_extractor, rank, CpuColumn, NoCpuField, ProcessFieldExtractor};

use crate::error::Result;
use crate::models::ProcessListing;

pub use async_trait::async_trait;

/// Trait for process listing providers
#[async_trait]
pub trait ProcessLister: Send + Sync {
    /// Produce one listing, header first
    async fn list(&self) -> Result<ProcessListing>;
}
