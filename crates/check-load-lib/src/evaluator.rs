//! Load evaluation against warning/critical thresholds
//!
//! Windows are walked in order (1, 5, 15 minutes). A window above its
//! critical threshold ends the walk with CRITICAL; a window above its warning
//! threshold raises the status to WARNING and the walk continues, since a
//! later window may still be critical. When CPU scaling is active every window
//! is compared on its scaled value.

use crate::models::{LoadSample, Status, ThresholdTriplet, WINDOWS};

/// Result of evaluating one load sample
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub status: Status,
    pub load: LoadSample,
    /// Load divided by CPU count, present only in scaled mode
    pub scaled: Option<LoadSample>,
    pub warning: ThresholdTriplet,
    pub critical: ThresholdTriplet,
}

/// Evaluate a load sample
///
/// `cpus` enables scaled mode when it is `Some` and non-zero; a zero count
/// silently falls back to raw comparison.
pub fn evaluate(
    load: LoadSample,
    warning: ThresholdTriplet,
    critical: ThresholdTriplet,
    cpus: Option<usize>,
) -> Evaluation {
    let scaled = cpus.and_then(|n| load.scaled(n));
    let compared = scaled.unwrap_or(load);

    let mut status = Status::Ok;
    for i in 0..WINDOWS.len() {
        let value = compared.get(i);
        if value > critical.get(i) {
            status = Status::Critical;
            break;
        } else if value > warning.get(i) {
            status = Status::Warning;
        }
    }

    Evaluation {
        status,
        load,
        scaled,
        warning,
        critical,
    }
}

impl Evaluation {
    /// Human readable description, without the status prefix
    pub fn summary(&self) -> String {
        let total = format!("total {}", describe(&self.load));
        match &self.scaled {
            Some(scaled) => format!("scaled {} - {}", describe(scaled), total),
            None => total,
        }
    }

    /// Performance data, one entry per window (two in scaled mode)
    pub fn perfdata(&self) -> String {
        let mut entries = Vec::with_capacity(6);
        for (i, window) in WINDOWS.iter().enumerate() {
            match &self.scaled {
                Some(scaled) => {
                    entries.push(format!("load{}={:.3};;;0;", window, self.load.get(i)));
                    entries.push(format!(
                        "scaled_load{}={:.3};{:.3};{:.3};0;",
                        window,
                        scaled.get(i),
                        self.warning.get(i),
                        self.critical.get(i)
                    ));
                }
                None => entries.push(format!(
                    "load{}={:.3};{:.3};{:.3};0;",
                    window,
                    self.load.get(i),
                    self.warning.get(i),
                    self.critical.get(i)
                )),
            }
        }
        entries.join(" ")
    }

    /// Full status line: `LOAD <STATUS> - <summary>|<perfdata>`
    pub fn status_line(&self) -> String {
        format!(
            "LOAD {} - {}|{}",
            self.status,
            self.summary(),
            self.perfdata()
        )
    }
}

fn describe(sample: &LoadSample) -> String {
    format!(
        "load average: {:.2}, {:.2}, {:.2}",
        sample.get(0),
        sample.get(1),
        sample.get(2)
    )
}
