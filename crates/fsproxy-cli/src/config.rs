// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Config file of the `fsproxy` binary

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fsproxy_core::ServiceConfig;
use fsproxy_logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Host directories that back each mount point. Unset roots are reported as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageRoots {
    pub nand_system: Option<PathBuf>,
    pub nand_user: Option<PathBuf>,
    pub temporary: Option<PathBuf>,
    pub sd_system: Option<PathBuf>,
    pub sd_user: Option<PathBuf>,
    pub sdmc: Option<PathBuf>,
    pub bis_system: Option<PathBuf>,
    pub bis_user: Option<PathBuf>,
}

impl StorageRoots {
    /// Conventional layout below a single directory.
    pub fn under(base: &Path) -> Self {
        Self {
            nand_system: Some(base.join("nand/system")),
            nand_user: Some(base.join("nand/user")),
            temporary: Some(base.join("nand/temp")),
            sd_system: Some(base.join("sdmc/Nintendo/save/system")),
            sd_user: Some(base.join("sdmc/Nintendo/save/user")),
            sdmc: Some(base.join("sdmc")),
            bis_system: Some(base.join("nand/system")),
            bis_user: Some(base.join("nand/user")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub service: ServiceConfig,
    pub storage: StorageRoots,
    pub logging: LoggingConfig,
}

impl CliConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("parsing config")?;
        config.service.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsproxy_logging::CliLogLevel;
    use fsproxy_proto::{LogMode, SaveDataSpaceId};

    #[test]
    fn sections_share_one_document() {
        let config = CliConfig::from_toml_str(
            r#"
            log-mode = "Log"
            info-reader-spaces = ["NandUser", "SdCardUser"]

            [storage]
            nand-user = "/srv/nand/user"
            sdmc = "/srv/sdmc"

            [logging]
            log-level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.service.log_mode, LogMode::Log);
        assert_eq!(
            config.service.info_reader_spaces,
            vec![SaveDataSpaceId::NandUser, SaveDataSpaceId::SdCardUser]
        );
        assert_eq!(config.storage.sdmc, Some(PathBuf::from("/srv/sdmc")));
        assert_eq!(config.storage.nand_system, None);
        assert_eq!(config.logging.level, Some(CliLogLevel::Debug));
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(CliConfig::from_toml_str("").unwrap(), CliConfig::default());
    }

    #[test]
    fn invalid_service_section_is_rejected() {
        assert!(CliConfig::from_toml_str("info-reader-spaces = []").is_err());
    }

    #[test]
    fn standard_layout() {
        let roots = StorageRoots::under(Path::new("/data"));
        assert_eq!(roots.sdmc, Some(PathBuf::from("/data/sdmc")));
        assert_eq!(roots.nand_user, Some(PathBuf::from("/data/nand/user")));
    }
}
