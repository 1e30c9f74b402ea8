//! check_load
//!
//! Monitoring plugin that tests the current system load average against
//! warning and critical thresholds and prints a status line with
//! performance data. Exit codes: 0 OK, 1 WARNING, 2 CRITICAL, 3 UNKNOWN.

mod config;
mod output;

use anyhow::{bail, Result};
use check_load_lib::observability::init_logging;
use check_load_lib::procs::PsCommand;
use check_load_lib::source::{create_load_source, online_cpu_count};
use check_load_lib::{parse_threshold, CheckConfig, LoadCheckBuilder, Status};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, warn};

/// Check the system load average
#[derive(Parser, Debug)]
#[command(name = "check_load")]
#[command(version, about = "This plugin tests the current system load average.", long_about = None)]
#[command(args_override_self = true)]
#[command(
    override_usage = "check_load [-r] -w WLOAD1,WLOAD5,WLOAD15 -c CLOAD1,CLOAD5,CLOAD15 [-n NUMBER_OF_PROCS]"
)]
pub struct Cli {
    /// Exit with WARNING status if load average exceeds WLOADn
    #[arg(short, long, value_name = "WLOAD1,WLOAD5,WLOAD15")]
    pub warning: Option<String>,

    /// Exit with CRITICAL status if load average exceeds CLOADn
    /// (same format as "uptime" and "w")
    #[arg(short, long, value_name = "CLOAD1,CLOAD5,CLOAD15")]
    pub critical: Option<String>,

    /// Divide the load averages by the number of CPUs (when possible)
    #[arg(short = 'r', long)]
    pub percpu: bool,

    /// Number of top CPU consuming processes to show, 0 disables
    #[arg(
        short = 'n',
        long,
        value_name = "NUMBER_OF_PROCS",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub procs_to_show: i64,

    /// Read options from an INI file section, [section][@file]
    // Consumed by config::expand_extra_opts before clap sees the arguments
    #[allow(dead_code)]
    #[arg(
        long,
        value_name = "[section][@file]",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    pub extra_opts: Option<String>,

    /// Warning then critical thresholds, or critical alone, when -w/-c are not used
    #[arg(value_name = "THRESHOLDS")]
    pub thresholds: Vec<String>,
}

impl Cli {
    /// Resolve flags and positional fallbacks into a check configuration
    pub fn check_config(&self) -> Result<CheckConfig> {
        let (warning, critical) = if self.warning.is_none() && self.critical.is_none() {
            match self.thresholds.as_slice() {
                [warning, critical] => (Some(warning), Some(critical)),
                [critical] => (None, Some(critical)),
                [] => (None, None),
                extra => bail!("Expected at most 2 positional thresholds, got {}", extra.len()),
            }
        } else {
            if !self.thresholds.is_empty() {
                warn!(
                    ignored = ?self.thresholds,
                    "Positional thresholds ignored when -w or -c is given"
                );
            }
            (self.warning.as_ref(), self.critical.as_ref())
        };

        Ok(CheckConfig {
            warning: warning.map(|w| parse_threshold(w)).transpose()?,
            critical: critical.map(|c| parse_threshold(c)).transpose()?,
            per_cpu: self.percpu,
            procs_to_show: self.procs_to_show,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let status = match run().await {
        Ok(status) => status,
        Err(e) => {
            output::print_unknown(&e);
            Status::Unknown
        }
    };

    std::process::exit(status.exit_code());
}

async fn run() -> Result<Status> {
    let settings = config::Settings::load()?;
    init_logging(settings.log_format);
    debug!(?settings, "Settings loaded");

    let args = config::expand_extra_opts(std::env::args().collect())?;
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            output::print_parse_error(&e);
            return Ok(Status::Unknown);
        }
    };

    let check_config = cli.check_config()?;
    let cpu_count = if check_config.per_cpu {
        online_cpu_count()
    } else {
        None
    };

    let check = LoadCheckBuilder::new(check_config)
        .source(create_load_source(
            settings.load_source,
            &settings.uptime_command,
        ))
        .lister(Arc::new(PsCommand::new(settings.ps_command)))
        .cpu_count(cpu_count)
        .build()?;

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();
    let status = check.run(&mut stdout, &mut stderr).await?;
    stdout.flush()?;

    Ok(status)
}
