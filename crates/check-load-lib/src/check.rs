//! Check orchestration
//!
//! One run is a straight line:
//! validate thresholds -> fetch load -> evaluate -> print report ->
//! optionally list top processes. Threshold and load errors end the run;
//! a failed process listing is reported on the diagnostic stream and leaves
//! the load status untouched.

use crate::error::{CheckError, Result};
use crate::evaluator::{evaluate, Evaluation};
use crate::models::{Status, ThresholdTriplet};
use crate::procs::{rank, ProcessLister};
use crate::source::LoadSource;
use crate::threshold::validate_thresholds;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, warn};

/// Settings for one check run, fixed once arguments are parsed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckConfig {
    pub warning: Option<ThresholdTriplet>,
    pub critical: Option<ThresholdTriplet>,
    /// Divide load by the number of CPUs before comparing
    pub per_cpu: bool,
    /// Number of top processes to print, 0 or less disables the listing
    pub procs_to_show: i64,
}

/// A configured load check
pub struct LoadCheck {
    config: CheckConfig,
    source: Arc<dyn LoadSource>,
    lister: Arc<dyn ProcessLister>,
    cpu_count: Option<usize>,
}

impl LoadCheck {
    /// Validate, fetch and evaluate without printing anything
    pub async fn evaluate(&self) -> Result<Evaluation> {
        let (warning, critical) =
            validate_thresholds(self.config.warning.as_ref(), self.config.critical.as_ref())?;

        let load = self.source.load().await?;
        debug!(source = self.source.name(), ?load, "Load retrieved");
        if load.is_failed() {
            return Err(CheckError::load(format!(
                "Error processing {} output",
                self.source.name()
            )));
        }

        let cpus = if self.config.per_cpu {
            if self.cpu_count.is_none() {
                warn!("CPU count unavailable, comparing unscaled load");
            }
            self.cpu_count
        } else {
            None
        };

        let evaluation = evaluate(load, warning, critical, cpus);
        debug!(status = %evaluation.status, scaled = evaluation.scaled.is_some(), "Load evaluated");
        Ok(evaluation)
    }

    /// Run the check, writing the report to `out` and sub-step failures to `diag`
    ///
    /// Returns the load status. Errors are only returned for failures that
    /// end the whole check.
    pub async fn run<W, E>(&self, out: &mut W, diag: &mut E) -> Result<Status>
    where
        W: Write,
        E: Write,
    {
        let evaluation = self.evaluate().await?;
        writeln!(out, "{}", evaluation.status_line())?;

        if self.config.procs_to_show > 0 {
            if let Err(e) = self.print_top_processes(out).await {
                debug!(error = %e, "Top process listing failed");
                writeln!(diag, "{}", e)?;
            }
        }

        Ok(evaluation.status)
    }

    async fn print_top_processes<W: Write>(&self, out: &mut W) -> Result<()> {
        let listing = self.lister.list().await?;
        let ranked = rank(listing, self.config.procs_to_show)?;
        for line in ranked.lines() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }
}

/// Builder for a load check
pub struct LoadCheckBuilder {
    config: CheckConfig,
    source: Option<Arc<dyn LoadSource>>,
    lister: Option<Arc<dyn ProcessLister>>,
    cpu_count: Option<usize>,
}

impl LoadCheckBuilder {
    pub fn new(config: CheckConfig) -> Self {
        Self {
            config,
            source: None,
            lister: None,
            cpu_count: None,
        }
    }

    /// Set the load source
    pub fn source(mut self, source: Arc<dyn LoadSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the process lister
    pub fn lister(mut self, lister: Arc<dyn ProcessLister>) -> Self {
        self.lister = Some(lister);
        self
    }

    /// Set the CPU count used for scaling
    pub fn cpu_count(mut self, cpus: Option<usize>) -> Self {
        self.cpu_count = cpus.filter(|n| *n > 0);
        self
    }

    pub fn build(self) -> Result<LoadCheck> {
        let source = self
            .source
            .ok_or_else(|| CheckError::config("Load source is required"))?;
        let lister = self
            .lister
            .ok_or_else(|| CheckError::config("Process lister is required"))?;

        Ok(LoadCheck {
            config: self.config,
            source,
            lister,
            cpu_count: self.cpu_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LoadSample, ProcessListing};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock load source returning a fixed result
    struct MockSource {
        sample: Option<LoadSample>,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn new(sample: Option<LoadSample>) -> Arc<Self> {
            Arc::new(Self {
                sample,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LoadSource for MockSource {
        async fn load(&self) -> Result<LoadSample> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sample
                .ok_or_else(|| CheckError::load("mock source failure"))
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    /// Mock lister returning fixed lines, or failing when `None`
    struct MockLister {
        lines: Option<Vec<&'static str>>,
        calls: AtomicUsize,
    }

    impl MockLister {
        fn new(lines: Option<Vec<&'static str>>) -> Arc<Self> {
            Arc::new(Self {
                lines,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProcessLister for MockLister {
        async fn list(&self) -> Result<ProcessListing> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.lines {
                Some(lines) => Ok(ProcessListing::from_lines(lines.iter().copied())),
                None => Err(CheckError::listing("'ps' exited with non-zero status.")),
            }
        }
    }

    fn config(warn: &str, crit: &str) -> CheckConfig {
        CheckConfig {
            warning: Some(warn.parse().unwrap()),
            critical: Some(crit.parse().unwrap()),
            ..Default::default()
        }
    }

    async fn run_check(check: &LoadCheck) -> (Result<Status>, String, String) {
        let mut out = Vec::new();
        let mut diag = Vec::new();
        let status = check.run(&mut out, &mut diag).await;
        (
            status,
            String::from_utf8(out).unwrap(),
            String::from_utf8(diag).unwrap(),
        )
    }

    const LISTING: [&str; 5] = [
        "PID %CPU COMMAND",
        "10 1.0 sshd",
        "20 50.0 make",
        "30 0.0 cron",
        "40 7.5 rustc",
    ];

    #[tokio::test]
    async fn test_ok_report() {
        let check = LoadCheckBuilder::new(config("0.7,0.6,0.5", "0.9,0.8,0.7"))
            .source(MockSource::new(Some(LoadSample::new(0.5, 0.4, 0.3))))
            .lister(MockLister::new(None))
            .build()
            .unwrap();

        let (status, out, diag) = run_check(&check).await;
        assert_eq!(status.unwrap(), Status::Ok);
        assert_eq!(
            out,
            "LOAD OK - total load average: 0.50, 0.40, 0.30|\
             load1=0.500;0.700;0.900;0; load5=0.400;0.600;0.800;0; load15=0.300;0.500;0.700;0;\n"
        );
        assert!(diag.is_empty());
    }

    #[tokio::test]
    async fn test_inconsistent_thresholds_skip_load() {
        let source = MockSource::new(Some(LoadSample::new(0.1, 0.1, 0.1)));
        let check = LoadCheckBuilder::new(config("1,3,1", "2"))
            .source(source.clone())
            .lister(MockLister::new(None))
            .build()
            .unwrap();

        let (status, out, _) = run_check(&check).await;
        assert!(matches!(
            status.unwrap_err(),
            CheckError::InconsistentThresholds { window: 5 }
        ));
        assert!(out.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_critical_is_fatal() {
        let check = LoadCheckBuilder::new(CheckConfig {
            warning: Some(ThresholdTriplet::uniform(1.0)),
            ..Default::default()
        })
        .source(MockSource::new(Some(LoadSample::new(0.1, 0.1, 0.1))))
        .lister(MockLister::new(None))
        .build()
        .unwrap();

        let (status, _, _) = run_check(&check).await;
        assert!(matches!(
            status.unwrap_err(),
            CheckError::MissingThreshold { .. }
        ));
    }

    #[tokio::test]
    async fn test_negative_sentinel_is_retrieval_failure() {
        let lister = MockLister::new(Some(LISTING.to_vec()));
        let check = LoadCheckBuilder::new(CheckConfig {
            procs_to_show: 2,
            ..config("1", "2")
        })
        .source(MockSource::new(Some(LoadSample::new(0.5, -1.0, 0.5))))
        .lister(lister.clone())
        .build()
        .unwrap();

        let (status, out, _) = run_check(&check).await;
        let err = status.unwrap_err();
        assert!(matches!(err, CheckError::LoadRetrieval(_)));
        assert_eq!(err.status(), Status::Unknown);
        assert!(out.is_empty());
        assert_eq!(lister.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_source_error_is_fatal() {
        let check = LoadCheckBuilder::new(config("1", "2"))
            .source(MockSource::new(None))
            .lister(MockLister::new(None))
            .build()
            .unwrap();

        let (status, _, _) = run_check(&check).await;
        assert!(status.unwrap_err().is_fatal());
    }

    #[tokio::test]
    async fn test_failed_getloadavg_prints_no_report() {
        use crate::source::SyscallLoadSource;

        fn unreadable(_averages: &mut [f64; 3]) -> i32 {
            -1
        }

        let check = LoadCheckBuilder::new(config("1", "2"))
            .source(Arc::new(SyscallLoadSource::with_reader(unreadable)))
            .lister(MockLister::new(None))
            .build()
            .unwrap();

        let (status, out, _) = run_check(&check).await;
        let err = status.unwrap_err();
        assert!(matches!(err, CheckError::LoadRetrieval(_)));
        assert_eq!(err.status(), Status::Unknown);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_per_cpu_scaling() {
        let check = LoadCheckBuilder::new(CheckConfig {
            per_cpu: true,
            ..config("1", "2")
        })
        .source(MockSource::new(Some(LoadSample::new(6.0, 4.0, 2.0))))
        .lister(MockLister::new(None))
        .cpu_count(Some(4))
        .build()
        .unwrap();

        let (status, out, _) = run_check(&check).await;
        assert_eq!(status.unwrap(), Status::Warning);
        assert!(out.starts_with(
            "LOAD WARNING - scaled load average: 1.50, 1.00, 0.50 - total load average: 6.00, 4.00, 2.00|"
        ));
        assert!(out.contains("scaled_load1=1.500;1.000;2.000;0;"));
    }

    #[tokio::test]
    async fn test_per_cpu_without_count_uses_raw() {
        let check = LoadCheckBuilder::new(CheckConfig {
            per_cpu: true,
            ..config("1", "2")
        })
        .source(MockSource::new(Some(LoadSample::new(6.0, 4.0, 2.0))))
        .lister(MockLister::new(None))
        .cpu_count(Some(0))
        .build()
        .unwrap();

        let (status, out, _) = run_check(&check).await;
        assert_eq!(status.unwrap(), Status::Critical);
        assert!(!out.contains("scaled"));
    }

    #[tokio::test]
    async fn test_per_cpu_ignored_when_not_requested() {
        let check = LoadCheckBuilder::new(config("1", "2"))
            .source(MockSource::new(Some(LoadSample::new(6.0, 4.0, 2.0))))
            .lister(MockLister::new(None))
            .cpu_count(Some(8))
            .build()
            .unwrap();

        let evaluation = check.evaluate().await.unwrap();
        assert!(evaluation.scaled.is_none());
        assert_eq!(evaluation.status, Status::Critical);
    }

    #[tokio::test]
    async fn test_top_processes_printed() {
        let check = LoadCheckBuilder::new(CheckConfig {
            procs_to_show: 3,
            ..config("1", "2")
        })
        .source(MockSource::new(Some(LoadSample::new(2.5, 2.0, 1.5))))
        .lister(MockLister::new(Some(LISTING.to_vec())))
        .build()
        .unwrap();

        let (status, out, diag) = run_check(&check).await;
        assert_eq!(status.unwrap(), Status::Critical);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("LOAD CRITICAL - "));
        assert_eq!(
            &lines[1..],
            &["PID %CPU COMMAND", "20 50.0 make", "40 7.5 rustc", "10 1.0 sshd"]
        );
        assert!(diag.is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_keeps_status() {
        let check = LoadCheckBuilder::new(CheckConfig {
            procs_to_show: 3,
            ..config("1", "2")
        })
        .source(MockSource::new(Some(LoadSample::new(1.5, 0.5, 0.5))))
        .lister(MockLister::new(None))
        .build()
        .unwrap();

        let (status, out, diag) = run_check(&check).await;
        assert_eq!(status.unwrap(), Status::Warning);
        assert_eq!(out.lines().count(), 1);
        assert_eq!(diag.lines().count(), 1);
        assert!(diag.contains("exited with non-zero status"));
    }

    #[tokio::test]
    async fn test_header_only_listing_reported() {
        let check = LoadCheckBuilder::new(CheckConfig {
            procs_to_show: 3,
            ..config("1", "2")
        })
        .source(MockSource::new(Some(LoadSample::new(0.1, 0.1, 0.1))))
        .lister(MockLister::new(Some(vec!["PID %CPU COMMAND"])))
        .build()
        .unwrap();

        let (status, out, diag) = run_check(&check).await;
        assert_eq!(status.unwrap(), Status::Ok);
        assert_eq!(out.lines().count(), 1);
        assert!(diag.contains("some error occurred getting procs list"));
    }

    #[tokio::test]
    async fn test_zero_procs_skips_listing() {
        let lister = MockLister::new(Some(LISTING.to_vec()));
        let check = LoadCheckBuilder::new(config("1", "2"))
            .source(MockSource::new(Some(LoadSample::new(0.1, 0.1, 0.1))))
            .lister(lister.clone())
            .build()
            .unwrap();

        let (_, out, _) = run_check(&check).await;
        assert_eq!(out.lines().count(), 1);
        assert_eq!(lister.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_builder_requires_source() {
        let result = LoadCheckBuilder::new(CheckConfig::default())
            .lister(MockLister::new(None))
            .build();
        assert!(matches!(result, Err(CheckError::Config(_))));
    }
}
