// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Common helpers for integration tests

use std::collections::HashMap;

use fsproxy_core::{save_data_path, ContentProvider, FileSystemController, FsError, FsResult};
use fsproxy_proto::{
    BisPartitionId, ContentRecordType, ContentStorageId, FileSystemType, ImageDirectoryId,
    SaveDataDescriptor, SaveDataSpaceId, StorageId,
};
use fsproxy_vfs::{VectorDirectory, VectorFile, VirtualDir, VirtualFile};

/// In-memory controller: one tree per save-data space plus an SD card and a data archive.
pub struct FixtureController {
    pub spaces: HashMap<SaveDataSpaceId, VirtualDir>,
    pub sdmc: Option<VirtualDir>,
    pub romfs: HashMap<u64, VirtualFile>,
}

impl FixtureController {
    pub fn new() -> Self {
        let spaces = [
            SaveDataSpaceId::NandSystem,
            SaveDataSpaceId::NandUser,
            SaveDataSpaceId::TemporaryStorage,
            SaveDataSpaceId::SdCardUser,
        ]
        .into_iter()
        .map(|space| (space, VectorDirectory::new("").into_virtual()))
        .collect();
        Self {
            spaces,
            sdmc: Some(VectorDirectory::new("sdmc").into_virtual()),
            romfs: HashMap::new(),
        }
    }

    pub fn with_romfs(mut self, title_id: u64, data: &[u8]) -> Self {
        self.romfs
            .insert(title_id, VectorFile::new("romfs", data.to_vec()).into_virtual());
        self
    }

    fn space(&self, space: SaveDataSpaceId) -> FsResult<&VirtualDir> {
        self.spaces.get(&space).ok_or(FsError::EntityNotFound)
    }
}

impl FileSystemController for FixtureController {
    fn open_save_data_space(&self, space: SaveDataSpaceId) -> FsResult<VirtualDir> {
        self.space(space).cloned()
    }

    fn open_save_data(
        &self,
        space: SaveDataSpaceId,
        descriptor: &SaveDataDescriptor,
    ) -> FsResult<VirtualDir> {
        self.space(space)?
            .directory_relative(&save_data_path(descriptor))
            .ok_or(FsError::EntityNotFound)
    }

    fn create_save_data(
        &self,
        space: SaveDataSpaceId,
        descriptor: &SaveDataDescriptor,
    ) -> FsResult<VirtualDir> {
        self.space(space)?
            .create_directory_relative(&save_data_path(descriptor))
            .ok_or(FsError::PermissionDenied)
    }

    fn open_sdmc(&self) -> FsResult<VirtualDir> {
        self.sdmc.clone().ok_or(FsError::SdCardNotFound)
    }

    fn open_bis_partition(&self, _partition: BisPartitionId) -> FsResult<VirtualDir> {
        Err(FsError::EntityNotFound)
    }

    fn open_bis_partition_storage(&self, _partition: BisPartitionId) -> FsResult<VirtualFile> {
        Err(FsError::EntityNotFound)
    }

    fn image_directory(&self, _id: ImageDirectoryId) -> Option<VirtualDir> {
        None
    }

    fn content_directory(&self, _id: ContentStorageId) -> Option<VirtualDir> {
        None
    }

    fn open_romfs_current_process(&self) -> FsResult<VirtualFile> {
        Err(FsError::EntityNotFound)
    }

    fn open_romfs(
        &self,
        title_id: u64,
        _storage: StorageId,
        _record: ContentRecordType,
    ) -> FsResult<VirtualFile> {
        self.romfs.get(&title_id).cloned().ok_or(FsError::EntityNotFound)
    }

    fn free_space_size(&self, _storage: StorageId) -> u64 {
        0x1000
    }

    fn total_space_size(&self, _storage: StorageId) -> u64 {
        0x4000
    }
}

/// Provider with no installed updates and no synthesized archives.
pub struct NoContent;

impl ContentProvider for NoContent {
    fn open_patched_section(
        &self,
        _title_id: u64,
        _fs_type: FileSystemType,
        _record: ContentRecordType,
    ) -> Option<VirtualDir> {
        None
    }

    fn patch_romfs(
        &self,
        _title_id: u64,
        base: VirtualFile,
        _record: ContentRecordType,
    ) -> VirtualFile {
        base
    }

    fn synthesize_system_archive(&self, _title_id: u64) -> Option<VirtualFile> {
        None
    }
}
