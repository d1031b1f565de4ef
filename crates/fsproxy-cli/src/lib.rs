// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! `fsproxy` command-line tool: browse host-backed storage through the service layer

pub mod commands;
pub mod config;
pub mod host_controller;

use std::path::PathBuf;

pub use clap::Parser;
use clap::{Subcommand, ValueEnum};
use fsproxy_logging::CliLoggingArgs;
use fsproxy_proto::SaveDataSpaceId;

pub use commands::App;
pub use config::{CliConfig, StorageRoots};
pub use host_controller::{HostController, NoInstalledContent};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect host-backed fsproxy storage")]
pub struct Cli {
    /// TOML config file with service, storage and logging sections
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use the conventional nand/ and sdmc/ layout below this directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub logging: CliLoggingArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
        #[arg(long, value_enum, default_value_t = Mount::Sdmc)]
        mount: Mount,
    },
    /// Print a file to stdout
    Cat {
        path: String,
        #[arg(long, value_enum, default_value_t = Mount::Sdmc)]
        mount: Mount,
    },
    /// List save data, one record per line
    Saves {
        /// Only this space; defaults to the configured info reader spaces
        #[arg(long, value_enum)]
        space: Option<Space>,
    },
    /// Free and total bytes per storage class
    Df,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Space {
    NandSystem,
    NandUser,
    Temporary,
    SdSystem,
    SdUser,
}

impl From<Space> for SaveDataSpaceId {
    fn from(space: Space) -> Self {
        match space {
            Space::NandSystem => SaveDataSpaceId::NandSystem,
            Space::NandUser => SaveDataSpaceId::NandUser,
            Space::Temporary => SaveDataSpaceId::TemporaryStorage,
            Space::SdSystem => SaveDataSpaceId::SdCardSystem,
            Space::SdUser => SaveDataSpaceId::SdCardUser,
        }
    }
}

/// What `ls` and `cat` browse: the SD card or the root of a save-data space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mount {
    Sdmc,
    NandSystem,
    NandUser,
    Temporary,
    SdSystem,
    SdUser,
}

impl Mount {
    pub fn space(self) -> Option<SaveDataSpaceId> {
        let space = match self {
            Mount::Sdmc => return None,
            Mount::NandSystem => Space::NandSystem,
            Mount::NandUser => Space::NandUser,
            Mount::Temporary => Space::Temporary,
            Mount::SdSystem => Space::SdSystem,
            Mount::SdUser => Space::SdUser,
        };
        Some(space.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["fsproxy", "--root", "/data", "ls", "/save", "--mount", "nand-user"])
            .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/data")));
        match cli.command {
            Commands::Ls { path, mount } => {
                assert_eq!(path, "/save");
                assert_eq!(mount.space(), Some(SaveDataSpaceId::NandUser));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["fsproxy", "--log-level", "debug", "saves", "--space", "temporary"])
            .unwrap();
        assert!(!cli.logging.is_empty());
        assert!(matches!(cli.command, Commands::Saves { space: Some(Space::Temporary) }));
        assert_eq!(Mount::Sdmc.space(), None);
    }
}
