//! Ranking of process listing rows by CPU usage

use crate::error::{CheckError, Result};
use crate::models::ProcessListing;

/// Header names that identify the CPU usage column
const CPU_HEADERS: [&str; 2] = ["%CPU", "PCPU"];

/// Extracts the CPU usage field from a listing row
pub trait ProcessFieldExtractor: Send + Sync {
    /// CPU usage of the row, `None` when the field is absent or unparseable
    fn cpu_usage(&self, line: &str) -> Option<f32>;

    /// Whether rows can be ranked at all
    fn is_available(&self) -> bool;
}

/// Reads CPU usage from a whitespace-delimited column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuColumn {
    pub index: usize,
}

impl ProcessFieldExtractor for CpuColumn {
    fn cpu_usage(&self, line: &str) -> Option<f32> {
        let value: f32 = line.split_whitespace().nth(self.index)?.parse().ok()?;
        value.is_finite().then_some(value)
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Listing without a CPU column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoCpuField;

impl ProcessFieldExtractor for NoCpuField {
    fn cpu_usage(&self, _line: &str) -> Option<f32> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Pick the extractor from the listing header
pub fn detect_extractor(header: &str) -> Box<dyn ProcessFieldExtractor> {
    match header
        .split_whitespace()
        .position(|col| CPU_HEADERS.iter().any(|h| col.eq_ignore_ascii_case(h)))
    {
        Some(index) => Box::new(CpuColumn { index }),
        None => Box::new(NoCpuField),
    }
}

/// Sort data rows by descending CPU usage and keep the header plus `top_n` rows
///
/// `top_n <= 0` returns the listing untouched. The header never moves. Rows
/// with equal usage, or a listing without a CPU column, keep listing order.
pub fn rank(mut listing: ProcessListing, top_n: i64) -> Result<ProcessListing> {
    if top_n <= 0 {
        return Ok(listing);
    }
    if listing.len() < 2 {
        return Err(CheckError::InsufficientData);
    }

    let extractor = detect_extractor(&listing.rows[0].line);
    if extractor.is_available() {
        for row in listing.rows.iter_mut().skip(1) {
            row.cpu = extractor.cpu_usage(&row.line);
        }
        listing.rows[1..].sort_by(|a, b| {
            let a = a.cpu.unwrap_or(0.0);
            let b = b.cpu.unwrap_or(0.0);
            b.total_cmp(&a)
        });
    }

    let keep = usize::try_from(top_n)
        .unwrap_or(usize::MAX)
        .saturating_add(1)
        .min(listing.len());
    listing.rows.truncate(keep);

    Ok(listing)
}
