// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::{self, Write};

use anyhow::Result;
use fsproxy_cli::{App, Cli, CliConfig, Commands, Parser, StorageRoots};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.storage = StorageRoots::under(root);
    }
    cli.logging.merge_config(&config.logging).init("fsproxy")?;

    let app = App::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Ls { path, mount } => app.ls(mount, &path, &mut out)?,
        Commands::Cat { path, mount } => app.cat(mount, &path, &mut out)?,
        Commands::Saves { space } => app.saves(space.map(Into::into), &mut out)?,
        Commands::Df => app.df(&mut out)?,
    }
    out.flush()?;
    Ok(())
}
