// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging setup shared by fsproxy binaries
//!
//! Installs a `tracing` subscriber with an `EnvFilter` (`RUST_LOG` wins over the configured
//! level) and a plaintext or JSON formatter writing to the console or to a log file.

pub mod logging_config;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use clap;
pub use logging_config::LoggingConfig;
pub use tracing::Level;

/// How log events are rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plaintext,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogFormat::Plaintext => "plaintext",
            LogFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as clap::ValueEnum>::from_str(s, true)
            .map_err(|_| format!("unknown log format {s:?}, expected plaintext or json"))
    }
}

/// Verbosity accepted by `--log-level` and the `[logging]` config table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliLogLevel {
    Error,
    Warn,
    #[default]
    Info,
    /// Adds one event per service operation
    Debug,
    Trace,
}

impl CliLogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            CliLogLevel::Error => "error",
            CliLogLevel::Warn => "warn",
            CliLogLevel::Info => "info",
            CliLogLevel::Debug => "debug",
            CliLogLevel::Trace => "trace",
        }
    }
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging flags shared by fsproxy binaries, flattened into their clap parsers.
///
/// Without `--log-file` or `--log-dir` events go to stderr, keeping stdout for command output.
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliLoggingArgs {
    /// Verbosity when RUST_LOG is unset [default: info]
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CliLogLevel>,

    /// Event rendering [default: plaintext]
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Write `<component>.log` into this directory
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Write to this file, relative to --log-dir when both are given
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl CliLoggingArgs {
    /// Installs the global subscriber described by these flags.
    ///
    /// ```rust,no_run
    /// use fsproxy_logging::{clap::Parser, CliLoggingArgs};
    ///
    /// #[derive(Parser)]
    /// struct Cli {
    ///     #[command(flatten)]
    ///     logging: CliLoggingArgs,
    /// }
    ///
    /// Cli::parse().logging.init("fsproxy").expect("logging");
    /// ```
    pub fn init(self, component: &str) -> anyhow::Result<()> {
        self.init_with_default_level(component, CliLogLevel::Info)
    }

    pub fn init_with_default_level(
        self,
        component: &str,
        default_level: CliLogLevel,
    ) -> anyhow::Result<()> {
        let level = Level::from(self.log_level.unwrap_or(default_level));
        let format = self.log_format.unwrap_or_default();
        if self.logs_to_file() {
            init_to_file(component, level, format, &self.resolve_log_path(component))
        } else {
            init(component, level, format)
        }
    }

    /// Fills every flag left unset on the command line from the config file.
    pub fn merge_config(mut self, config: &LoggingConfig) -> Self {
        self.log_level = self.log_level.or(config.level);
        self.log_format = self.log_format.or(config.format);
        if self.log_dir.is_none() {
            self.log_dir = config.log_dir.clone();
        }
        self
    }

    pub fn logs_to_file(&self) -> bool {
        self.log_file.is_some() || self.log_dir.is_some()
    }

    fn resolve_log_path(&self, component: &str) -> PathBuf {
        match (&self.log_file, &self.log_dir) {
            (Some(log_file), _) if Path::new(log_file).is_absolute() => PathBuf::from(log_file),
            (Some(log_file), Some(log_dir)) => Path::new(log_dir).join(log_file),
            (Some(log_file), None) => PathBuf::from(log_file),
            (None, Some(log_dir)) => Path::new(log_dir).join(log_file_name(component)),
            (None, None) => get_standard_log_path_for_component(component),
        }
    }

    /// True when no logging flag was given.
    pub fn is_empty(&self) -> bool {
        matches!(
            self,
            CliLoggingArgs { log_level: None, log_format: None, log_dir: None, log_file: None }
        )
    }
}

const APP_DIR: &str = "fsproxy";

fn log_file_name(component: &str) -> String {
    format!("{component}.log")
}

/// Per-user directory for fsproxy logs: the XDG state dir on Linux, the local data dir
/// elsewhere, the temp dir as a last resort.
fn standard_log_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

pub fn get_standard_log_path_for_component(component: &str) -> PathBuf {
    standard_log_dir().join(log_file_name(component))
}

pub fn get_standard_log_path() -> PathBuf {
    get_standard_log_path_for_component(APP_DIR)
}

/// Console logging on stderr. `default_level` applies when `RUST_LOG` is unset.
pub fn init(component: &str, default_level: Level, format: LogFormat) -> anyhow::Result<()> {
    init_with_writer(component, default_level, format, io::stderr)
}

/// Appends to `log_path`, creating missing parent directories.
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;
    init_with_writer(component, default_level, format, file)
}

pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},{component}={default_level}")));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_file(cfg!(debug_assertions))
        .with_line_number(cfg!(debug_assertions));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt_layer.json()).try_init()?,
        LogFormat::Plaintext => registry.with(fmt_layer).try_init()?,
    }
    Ok(())
}
