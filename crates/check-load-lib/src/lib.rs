//! Load average check library
//!
//! This crate provides the core functionality for:
//! - Threshold triplet parsing with fallback fill
//! - Load average retrieval (syscall or `uptime` output)
//! - Escalation of 1/5/15-minute load against warning/critical thresholds
//! - Top CPU consumer listing from `ps` output
//! - Logging setup for the check binary

pub mod check;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod observability;
pub mod procs;
pub mod source;
pub mod threshold;

pub use check::{CheckConfig, LoadCheck, LoadCheckBuilder};
pub use error::{CheckError, Result, ThresholdKind};
pub use evaluator::{evaluate, Evaluation};
pub use models::*;
pub use threshold::{parse_threshold, validate_thresholds};
