// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Mount points resolved against host directories

use std::path::{Path, PathBuf};

use fsproxy_core::{save_data_path, ContentProvider, FileSystemController, FsError, FsResult};
use fsproxy_proto::{
    BisPartitionId, ContentRecordType, ContentStorageId, FileSystemType, ImageDirectoryId,
    SaveDataDescriptor, SaveDataSpaceId, StorageId,
};
use fsproxy_vfs::{HostDirectory, VirtualDir, VirtualFile};
use tracing::{debug, warn};

use crate::config::StorageRoots;

/// One configured root. Opened on demand so a missing directory only fails the mounts using it.
#[derive(Debug, Clone, Default)]
struct Root(Option<PathBuf>);

impl Root {
    fn path(&self) -> Option<&Path> {
        self.0.as_deref()
    }

    fn open(&self) -> FsResult<VirtualDir> {
        let path = self.path().ok_or(FsError::EntityNotFound)?;
        let dir = HostDirectory::open_root(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "storage root is unavailable");
            FsError::from(e)
        })?;
        Ok(dir.into_virtual())
    }

    fn open_relative(&self, relative: &str) -> Option<VirtualDir> {
        self.open().ok()?.directory_relative(relative)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HostController {
    nand_system: Root,
    nand_user: Root,
    temporary: Root,
    sd_system: Root,
    sd_user: Root,
    sdmc: Root,
    bis_system: Root,
    bis_user: Root,
}

impl HostController {
    pub fn new(roots: &StorageRoots) -> Self {
        Self {
            nand_system: Root(roots.nand_system.clone()),
            nand_user: Root(roots.nand_user.clone()),
            temporary: Root(roots.temporary.clone()),
            sd_system: Root(roots.sd_system.clone()),
            sd_user: Root(roots.sd_user.clone()),
            sdmc: Root(roots.sdmc.clone()),
            bis_system: Root(roots.bis_system.clone()),
            bis_user: Root(roots.bis_user.clone()),
        }
    }

    fn space_root(&self, space: SaveDataSpaceId) -> FsResult<&Root> {
        match space {
            SaveDataSpaceId::NandSystem | SaveDataSpaceId::ProperSystem => Ok(&self.nand_system),
            SaveDataSpaceId::NandUser => Ok(&self.nand_user),
            SaveDataSpaceId::TemporaryStorage => Ok(&self.temporary),
            SaveDataSpaceId::SdCardSystem => Ok(&self.sd_system),
            SaveDataSpaceId::SdCardUser => Ok(&self.sd_user),
            SaveDataSpaceId::SafeMode => Err(FsError::EntityNotFound),
        }
    }

    fn storage_root(&self, storage: StorageId) -> Option<&Root> {
        match storage {
            StorageId::NandSystem => Some(&self.nand_system),
            StorageId::NandUser => Some(&self.nand_user),
            StorageId::SdCard => Some(&self.sdmc),
            StorageId::None | StorageId::Host | StorageId::GameCard => None,
        }
    }
}

/// Free and total bytes of the host filesystem holding `path`.
#[cfg(unix)]
fn host_space(path: &Path) -> Option<(u64, u64)> {
    match nix::sys::statvfs::statvfs(path) {
        Ok(stat) => {
            let fragment = stat.fragment_size() as u64;
            Some((
                stat.blocks_available() as u64 * fragment,
                stat.blocks() as u64 * fragment,
            ))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "statvfs failed");
            None
        }
    }
}

#[cfg(not(unix))]
fn host_space(_path: &Path) -> Option<(u64, u64)> {
    None
}

impl FileSystemController for HostController {
    fn open_save_data_space(&self, space: SaveDataSpaceId) -> FsResult<VirtualDir> {
        self.space_root(space)?.open()
    }

    fn open_save_data(
        &self,
        space: SaveDataSpaceId,
        descriptor: &SaveDataDescriptor,
    ) -> FsResult<VirtualDir> {
        let path = save_data_path(descriptor);
        debug!(space = ?space, path, "resolve save data");
        self.open_save_data_space(space)?
            .directory_relative(&path)
            .ok_or(FsError::EntityNotFound)
    }

    fn create_save_data(
        &self,
        space: SaveDataSpaceId,
        descriptor: &SaveDataDescriptor,
    ) -> FsResult<VirtualDir> {
        let path = save_data_path(descriptor);
        let root = self.open_save_data_space(space)?;
        if root.directory_relative(&path).is_some() {
            return Err(FsError::PathAlreadyExists);
        }
        root.create_directory_relative(&path)
            .ok_or(FsError::PermissionDenied)
    }

    fn open_sdmc(&self) -> FsResult<VirtualDir> {
        self.sdmc.open().map_err(|_| FsError::SdCardNotFound)
    }

    fn open_bis_partition(&self, partition: BisPartitionId) -> FsResult<VirtualDir> {
        match partition {
            BisPartitionId::System => self.bis_system.open(),
            BisPartitionId::User => self.bis_user.open(),
            _ => Err(FsError::EntityNotFound),
        }
    }

    fn open_bis_partition_storage(&self, _partition: BisPartitionId) -> FsResult<VirtualFile> {
        Err(FsError::EntityNotFound)
    }

    fn image_directory(&self, id: ImageDirectoryId) -> Option<VirtualDir> {
        match id {
            ImageDirectoryId::Nand => self.nand_user.open_relative("Album"),
            ImageDirectoryId::SdCard => self.sdmc.open_relative("Nintendo/Album"),
        }
    }

    fn content_directory(&self, id: ContentStorageId) -> Option<VirtualDir> {
        match id {
            ContentStorageId::System => self.nand_system.open_relative("Contents/registered"),
            ContentStorageId::User => self.nand_user.open_relative("Contents/registered"),
            ContentStorageId::SdCard => self.sdmc.open_relative("Nintendo/Contents/registered"),
        }
    }

    fn open_romfs_current_process(&self) -> FsResult<VirtualFile> {
        Err(FsError::EntityNotFound)
    }

    fn open_romfs(
        &self,
        _title_id: u64,
        _storage: StorageId,
        _record: ContentRecordType,
    ) -> FsResult<VirtualFile> {
        Err(FsError::EntityNotFound)
    }

    fn free_space_size(&self, storage: StorageId) -> u64 {
        self.storage_root(storage)
            .and_then(Root::path)
            .and_then(host_space)
            .map_or(0, |(free, _)| free)
    }

    fn total_space_size(&self, storage: StorageId) -> u64 {
        self.storage_root(storage)
            .and_then(Root::path)
            .and_then(host_space)
            .map_or(0, |(_, total)| total)
    }
}

/// Content provider for hosts without installed titles: nothing to patch or synthesize.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInstalledContent;

impl ContentProvider for NoInstalledContent {
    fn open_patched_section(
        &self,
        _title_id: u64,
        _fs_type: FileSystemType,
        _record: ContentRecordType,
    ) -> Option<VirtualDir> {
        None
    }

    fn patch_romfs(&self, _title_id: u64, base: VirtualFile, _record: ContentRecordType) -> VirtualFile {
        base
    }

    fn synthesize_system_archive(&self, _title_id: u64) -> Option<VirtualFile> {
        None
    }
}
