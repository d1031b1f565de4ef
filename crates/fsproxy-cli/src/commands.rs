// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Subcommand implementations

use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use fsproxy_core::{
    storage_for_save_data_space, FileSystemController, FsError, SizeGetter,
    TracingAccessLogReporter,
};
use fsproxy_proto::{EntryType, OpenMode, SaveDataInfo, SaveDataSpaceId, StorageId};
use fsproxy_srv::{FileSystemSession, FspSrv};
use tracing::debug;

use crate::config::CliConfig;
use crate::host_controller::{HostController, NoInstalledContent};
use crate::Mount;

const PAGE: usize = 64;
const CHUNK: usize = 64 * 1024;

fn fs_error(context: &str, err: FsError) -> anyhow::Error {
    anyhow!("{context}: {err} [{}]", err.result_code())
}

fn format_record(info: &SaveDataInfo) -> String {
    let user: String = info.user_id.iter().rev().map(|b| format!("{b:02X}")).collect();
    format!(
        "{:?}\t{:?}\t{:016X}\t{:016X}\t{}\t{}",
        info.space, info.save_type, info.save_id, info.title_id, user, info.save_image_size
    )
}

pub struct App {
    controller: Arc<HostController>,
    srv: FspSrv,
}

impl App {
    pub fn new(config: CliConfig) -> Self {
        let controller = Arc::new(HostController::new(&config.storage));
        let srv = FspSrv::new(
            controller.clone(),
            Arc::new(NoInstalledContent),
            Arc::new(TracingAccessLogReporter),
            config.service,
        );
        Self { controller, srv }
    }

    fn mount(&self, mount: Mount) -> Result<FileSystemSession> {
        let Some(space) = mount.space() else {
            return self
                .srv
                .open_sd_card_file_system()
                .map_err(|e| fs_error("sdmc", e));
        };
        let root = self
            .controller
            .open_save_data_space(space)
            .map_err(|e| fs_error(&format!("{space:?}"), e))?;
        let size =
            SizeGetter::from_storage_id(self.controller.clone(), storage_for_save_data_space(space));
        Ok(FileSystemSession::new(root.read_only(), size))
    }

    pub fn ls(&self, mount: Mount, path: &str, out: &mut impl Write) -> Result<()> {
        let fs = self.mount(mount)?;
        let mut dir = fs.open_directory(path, 0).map_err(|e| fs_error(path, e))?;
        debug!(path, count = dir.get_entry_count(), "listing");
        loop {
            let page = dir.read_entries(PAGE);
            if page.is_empty() {
                break;
            }
            for entry in page {
                let kind = match entry.entry_type {
                    EntryType::Directory => 'd',
                    EntryType::File => 'f',
                };
                writeln!(out, "{kind}\t{}\t{}", entry.size, entry.name)?;
            }
        }
        Ok(())
    }

    pub fn cat(&self, mount: Mount, path: &str, out: &mut impl Write) -> Result<()> {
        let fs = self.mount(mount)?;
        let file = fs
            .open_file(path, OpenMode::Read.raw())
            .map_err(|e| fs_error(path, e))?;
        let mut buf = vec![0u8; CHUNK];
        let mut offset = 0u64;
        loop {
            let read = file
                .read(0, offset as i64, CHUNK as i64, &mut buf)
                .map_err(|e| fs_error(path, e))? as usize;
            if read == 0 {
                break;
            }
            out.write_all(&buf[..read])?;
            offset += read as u64;
        }
        Ok(())
    }

    pub fn saves(&self, space: Option<SaveDataSpaceId>, out: &mut impl Write) -> Result<()> {
        let mut reader = match space {
            Some(space) => self
                .srv
                .open_save_data_info_reader_by_save_data_space_id(space.raw())
                .map_err(|e| fs_error("info reader", e))?,
            None => self.srv.open_save_data_info_reader(),
        };
        loop {
            let page = reader.read_records(PAGE);
            if page.is_empty() {
                break;
            }
            for info in &page {
                writeln!(out, "{}", format_record(info))?;
            }
        }
        Ok(())
    }

    pub fn df(&self, out: &mut impl Write) -> Result<()> {
        for storage in [StorageId::NandSystem, StorageId::NandUser, StorageId::SdCard] {
            writeln!(
                out,
                "{storage:?}\t{}\t{}",
                self.controller.free_space_size(storage),
                self.controller.total_space_size(storage)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageRoots;
    use std::fs;
    use tempfile::TempDir;

    const USER_HEX: &str = "000000000000000100000000000000FF";

    fn app(temp: &TempDir) -> App {
        let base = temp.path();
        fs::create_dir_all(base.join("sdmc/Nintendo")).unwrap();
        fs::write(base.join("sdmc/readme.txt"), b"hello from sd").unwrap();
        let title = base
            .join("nand/user/save/0000000000000003")
            .join(USER_HEX)
            .join("0100000000004000");
        fs::create_dir_all(&title).unwrap();
        fs::write(title.join("progress"), vec![1u8; 10]).unwrap();
        fs::create_dir_all(base.join("nand/system/save/0000000000000000").join(USER_HEX)).unwrap();
        App::new(CliConfig {
            storage: StorageRoots::under(base),
            ..CliConfig::default()
        })
    }

    fn run(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn ls_lists_files_then_directories() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);
        let listing = run(|out| app.ls(Mount::Sdmc, "/", out));
        assert_eq!(listing, "f\t13\treadme.txt\nd\t0\tNintendo\n");

        let saves = run(|out| app.ls(Mount::NandUser, "/save", out));
        assert_eq!(saves, "d\t10\t0000000000000003\n");
        assert!(app.ls(Mount::Sdmc, "/missing", &mut Vec::new()).is_err());
    }

    #[test]
    fn cat_copies_file_bytes() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);
        assert_eq!(run(|out| app.cat(Mount::Sdmc, "/readme.txt", out)), "hello from sd");
        let err = app.cat(Mount::Sdmc, "/Nintendo", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("entity not found"));
    }

    #[test]
    fn saves_prints_one_line_per_record() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);
        let all = run(|out| app.saves(None, out));
        let lines: Vec<&str> = all.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("NandSystem\tSystemSaveData\t0000000000000000\t"));
        assert_eq!(
            lines[1],
            format!("NandUser\tSaveData\t0000000000000003\t0100000000004000\t{USER_HEX}\t10")
        );

        let user_only = run(|out| app.saves(Some(SaveDataSpaceId::NandUser), out));
        assert_eq!(user_only.lines().count(), 1);
    }

    #[test]
    fn df_reports_each_storage_class() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);
        let report = run(|out| app.df(out));
        let names: Vec<&str> = report
            .lines()
            .filter_map(|line| line.split('\t').next())
            .collect();
        assert_eq!(names, ["NandSystem", "NandUser", "SdCard"]);
    }
}
