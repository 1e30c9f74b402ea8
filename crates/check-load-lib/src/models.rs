//! Core data models for the load check

use std::fmt;

/// Averaging windows in minutes, in reporting order
pub const WINDOWS: [u32; 3] = [1, 5, 15];

/// Plugin status, ordered from best to worst
///
/// `Unknown` sorts last so that `max` over evaluated statuses never hides it,
/// but evaluation itself only ever produces `Ok`, `Warning` or `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Process exit code for this status
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold values for the 1, 5 and 15 minute windows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTriplet(pub [f64; 3]);

impl ThresholdTriplet {
    pub fn new(one: f64, five: f64, fifteen: f64) -> Self {
        Self([one, five, fifteen])
    }

    /// Same value for all three windows
    pub fn uniform(value: f64) -> Self {
        Self([value; 3])
    }

    pub fn get(&self, window: usize) -> f64 {
        self.0[window]
    }
}

/// Load averages for the 1, 5 and 15 minute windows
///
/// A negative value signals that the source failed to produce a reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadSample(pub [f64; 3]);

impl LoadSample {
    pub fn new(one: f64, five: f64, fifteen: f64) -> Self {
        Self([one, five, fifteen])
    }

    /// True when any window carries the failure sentinel
    pub fn is_failed(&self) -> bool {
        self.0.iter().any(|v| *v < 0.0)
    }

    /// Divide every window by the CPU count
    ///
    /// Returns `None` when the count is zero.
    pub fn scaled(&self, cpus: usize) -> Option<LoadSample> {
        if cpus == 0 {
            return None;
        }
        let n = cpus as f64;
        Some(LoadSample(self.0.map(|v| v / n)))
    }

    pub fn get(&self, window: usize) -> f64 {
        self.0[window]
    }
}

/// One line of process listing output
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRow {
    /// Verbatim text of the line
    pub line: String,
    /// CPU usage extracted from the line, when the listing exposes it
    pub cpu: Option<f32>,
}

impl ProcessRow {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            cpu: None,
        }
    }
}

/// Output of one process listing invocation; the first row is the header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessListing {
    pub rows: Vec<ProcessRow>,
}

impl ProcessListing {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: lines.into_iter().map(ProcessRow::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> Option<&ProcessRow> {
        self.rows.first()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.line.as_str())
    }
}
