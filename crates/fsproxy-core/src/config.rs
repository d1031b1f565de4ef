// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Service configuration loaded from TOML

use fsproxy_proto::{LogMode, SaveDataSpaceId};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("info reader needs at least one save-data space")]
    NoSpaces,
}

/// Tunables of the filesystem-proxy service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServiceConfig {
    /// Initial global access log mode
    pub log_mode: LogMode,
    /// Reported alongside the access log version
    pub access_log_program_index: u32,
    /// Spaces walked by `open_save_data_info_reader`, in order
    pub info_reader_spaces: Vec<SaveDataSpaceId>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_mode: LogMode::LogToSdCard,
            access_log_program_index: 0,
            info_reader_spaces: vec![
                SaveDataSpaceId::NandSystem,
                SaveDataSpaceId::NandUser,
                SaveDataSpaceId::TemporaryStorage,
                SaveDataSpaceId::SdCardUser,
            ],
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.info_reader_spaces.is_empty() {
            return Err(ConfigError::NoSpaces);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.log_mode, LogMode::LogToSdCard);
        assert_eq!(config.info_reader_spaces.len(), 4);
    }

    #[test]
    fn overrides_are_applied() {
        let config = ServiceConfig::from_toml_str(
            r#"
            log-mode = "Off"
            access-log-program-index = 2
            info-reader-spaces = ["SdCardUser"]
            "#,
        )
        .unwrap();
        assert_eq!(config.log_mode, LogMode::Off);
        assert_eq!(config.access_log_program_index, 2);
        assert_eq!(config.info_reader_spaces, vec![SaveDataSpaceId::SdCardUser]);
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(
            ServiceConfig::from_toml_str("info-reader-spaces = []"),
            Err(ConfigError::NoSpaces)
        ));
        assert!(matches!(
            ServiceConfig::from_toml_str("log-mode = \"Loud\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
