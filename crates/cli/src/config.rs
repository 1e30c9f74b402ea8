//! Configuration management for the check
//!
//! Two layers feed the command line:
//! - `CHECK_LOAD_*` environment variables for ambient settings
//! - `--extra-opts` INI sections, expanded into `--key=value` arguments

use anyhow::{bail, Context, Result};
use check_load_lib::observability::LogFormat;
use check_load_lib::procs::default_ps_command;
use check_load_lib::source::{LoadSourceKind, DEFAULT_UPTIME_COMMAND};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Section read when `--extra-opts` names none
pub const DEFAULT_SECTION: &str = "check_load";

/// Environment variable naming the extra-opts file
pub const CONFIG_FILE_ENV: &str = "MP_CONFIG_FILE";

/// Searched in order when no extra-opts file is given
const DEFAULT_CONFIG_FILES: &[&str] = &[
    "/etc/nagios/monitoring-plugins.ini",
    "/usr/local/nagios/etc/monitoring-plugins.ini",
    "/usr/local/etc/monitoring-plugins.ini",
    "/etc/monitoring-plugins.ini",
    "/etc/nagios/plugins.ini",
    "/usr/local/nagios/etc/plugins.ini",
    "/usr/local/etc/plugins.ini",
    "/etc/plugins.ini",
];

/// Ambient settings from the environment
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Load source: auto, syscall or uptime
    #[serde(default)]
    pub load_source: LoadSourceKind,

    /// Command line for the uptime load source
    #[serde(default = "default_uptime_command")]
    pub uptime_command: String,

    /// Command line for the top process listing
    #[serde(default = "default_ps_command")]
    pub ps_command: String,

    /// Log format on stderr: text or json
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_uptime_command() -> String {
    DEFAULT_UPTIME_COMMAND.to_string()
}

impl Settings {
    /// Load settings from `CHECK_LOAD_*` environment variables
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("CHECK_LOAD"))
            .build()
            .context("Failed to read CHECK_LOAD_* environment")?;

        config
            .try_deserialize()
            .context("Invalid CHECK_LOAD_* setting")
    }
}

/// Expand every `--extra-opts[=[section][@file]]` in `args`
///
/// Options read from files are inserted right after the program name, so
/// flags given on the command line itself take precedence.
pub fn expand_extra_opts(args: Vec<String>) -> Result<Vec<String>> {
    let mut args = args.into_iter();
    let Some(program) = args.next() else {
        return Ok(Vec::new());
    };

    let mut injected = Vec::new();
    let mut rest = Vec::new();
    for arg in args {
        if arg == "--extra-opts" {
            injected.extend(read_extra_opts("")?);
        } else if let Some(spec) = arg.strip_prefix("--extra-opts=") {
            injected.extend(read_extra_opts(spec)?);
        } else {
            rest.push(arg);
        }
    }

    let mut expanded = Vec::with_capacity(1 + injected.len() + rest.len());
    expanded.push(program);
    expanded.extend(injected);
    expanded.extend(rest);
    Ok(expanded)
}

/// Read one `[section][@file]` spec into command line arguments
fn read_extra_opts(spec: &str) -> Result<Vec<String>> {
    let (section, file) = match spec.split_once('@') {
        Some((section, file)) => (section, Some(file).filter(|f| !f.is_empty())),
        None => (spec, None),
    };
    let section = if section.is_empty() {
        DEFAULT_SECTION
    } else {
        section
    };

    let path = match file {
        Some(file) => PathBuf::from(file),
        None => find_config_file()?,
    };

    read_section(&path, section)
}

fn find_config_file() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        return Ok(PathBuf::from(path));
    }

    DEFAULT_CONFIG_FILES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .context("No extra-opts configuration file found")
}

fn read_section(path: &Path, section: &str) -> Result<Vec<String>> {
    let config = Config::builder()
        .add_source(File::from(path).format(FileFormat::Ini))
        .build()
        .with_context(|| format!("Failed to read extra-opts file {}", path.display()))?;

    let table = match config.get_table(section) {
        Ok(table) => table,
        Err(_) => bail!(
            "Section [{}] not found in {}",
            section,
            path.display()
        ),
    };

    let mut options = Vec::with_capacity(table.len());
    for (key, value) in table {
        let value = value
            .into_string()
            .with_context(|| format!("Invalid value for '{}' in [{}]", key, section))?;
        options.push((key, value));
    }
    options.sort();

    Ok(options
        .into_iter()
        .map(|(key, value)| {
            if value.is_empty() {
                format!("--{}", key)
            } else {
                format!("--{}={}", key, value)
            }
        })
        .collect())
}
