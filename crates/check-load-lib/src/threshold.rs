//! Threshold triplet parsing and validation
//!
//! A threshold argument is one to three comma separated numbers, one per
//! averaging window. Missing trailing windows repeat the last value given, so
//! `-w 4` means `4,4,4` and `-w 4,3` means `4,3,3`.

use crate::error::{CheckError, Result, ThresholdKind};
use crate::models::{ThresholdTriplet, WINDOWS};
use std::str::FromStr;

/// Parse a threshold argument into a triplet
///
/// Fields are read left to right and parsing stops at the first field with no
/// leading number. Fails only when not even the first field yields a number.
pub fn parse_threshold(arg: &str) -> Result<ThresholdTriplet> {
    let mut values = [0.0f64; 3];
    let mut parsed = 0;

    for field in arg.split(',').take(3) {
        match leading_number(field) {
            Some(value) => {
                values[parsed] = value;
                parsed += 1;
            }
            None => break,
        }
    }

    if parsed == 0 {
        return Err(CheckError::InvalidFormat(arg.to_string()));
    }

    let last = values[parsed - 1];
    for slot in values.iter_mut().skip(parsed) {
        *slot = last;
    }

    Ok(ThresholdTriplet(values))
}

impl FromStr for ThresholdTriplet {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        parse_threshold(s)
    }
}

/// Longest numeric prefix of `field`, after leading whitespace
///
/// Accepts an optional sign, digits with an optional fractional part and an
/// optional exponent. Anything after the number is ignored.
fn leading_number(field: &str) -> Option<f64> {
    let s = field.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Check a warning/critical pair before any load is fetched
///
/// Windows are checked in order; within a window the critical threshold is
/// checked first, then the warning threshold, then their ordering. A negative
/// value counts as unspecified.
pub fn validate_thresholds(
    warning: Option<&ThresholdTriplet>,
    critical: Option<&ThresholdTriplet>,
) -> Result<(ThresholdTriplet, ThresholdTriplet)> {
    let critical = critical.ok_or(CheckError::MissingThreshold {
        kind: ThresholdKind::Critical,
        window: WINDOWS[0],
    })?;
    let warning = warning.ok_or(CheckError::MissingThreshold {
        kind: ThresholdKind::Warning,
        window: WINDOWS[0],
    })?;

    for (i, window) in WINDOWS.iter().copied().enumerate() {
        if critical.get(i) < 0.0 {
            return Err(CheckError::MissingThreshold {
                kind: ThresholdKind::Critical,
                window,
            });
        }
        if warning.get(i) < 0.0 {
            return Err(CheckError::MissingThreshold {
                kind: ThresholdKind::Warning,
                window,
            });
        }
        if warning.get(i) > critical.get(i) {
            return Err(CheckError::InconsistentThresholds { window });
        }
    }

    Ok((*warning, *critical))
}
