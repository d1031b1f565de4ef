// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging configuration types

use serde::{Deserialize, Serialize};

use crate::{CliLogLevel, LogFormat};

/// `[logging]` table of a config file. Command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Logging verbosity level
    #[serde(rename = "log-level")]
    pub level: Option<CliLogLevel>,
    #[serde(rename = "log-format")]
    pub format: Option<LogFormat>,
    pub log_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_case_keys() {
        let config: LoggingConfig =
            toml::from_str("log-level = \"debug\"\nlog-format = \"json\"\nlog-dir = \"/var/log\"")
                .unwrap();
        assert_eq!(config.level, Some(CliLogLevel::Debug));
        assert_eq!(config.format, Some(LogFormat::Json));
        assert_eq!(config.log_dir.as_deref(), Some("/var/log"));
        assert_eq!(toml::from_str::<LoggingConfig>("").unwrap(), LoggingConfig::default());
    }
}
