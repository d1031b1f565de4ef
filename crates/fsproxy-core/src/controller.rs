// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Storage collaborators consumed by the service
//!
//! The controller resolves mount points (save-data spaces, SD card, BIS partitions, content
//! and image directories) to virtual nodes. The content provider stands in for archive
//! decoding and update merging, which live outside this workspace.

use std::fmt;
use std::sync::Arc;

use fsproxy_proto::{
    BisPartitionId, ContentRecordType, ContentStorageId, FileSystemType, ImageDirectoryId,
    SaveDataDescriptor, SaveDataSpaceId, StorageId,
};
use fsproxy_vfs::{VirtualDir, VirtualFile};

use crate::error::FsResult;

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
pub trait FileSystemController: Send + Sync {
    /// Root of a save-data space, as walked by the save-data enumerator.
    fn open_save_data_space(&self, space: SaveDataSpaceId) -> FsResult<VirtualDir>;

    fn open_save_data(
        &self,
        space: SaveDataSpaceId,
        descriptor: &SaveDataDescriptor,
    ) -> FsResult<VirtualDir>;

    fn create_save_data(
        &self,
        space: SaveDataSpaceId,
        descriptor: &SaveDataDescriptor,
    ) -> FsResult<VirtualDir>;

    fn open_sdmc(&self) -> FsResult<VirtualDir>;

    fn open_bis_partition(&self, partition: BisPartitionId) -> FsResult<VirtualDir>;

    fn open_bis_partition_storage(&self, partition: BisPartitionId) -> FsResult<VirtualFile>;

    fn image_directory(&self, id: ImageDirectoryId) -> Option<VirtualDir>;

    fn content_directory(&self, id: ContentStorageId) -> Option<VirtualDir>;

    /// Data archive of the calling process.
    fn open_romfs_current_process(&self) -> FsResult<VirtualFile>;

    fn open_romfs(
        &self,
        title_id: u64,
        storage: StorageId,
        record: ContentRecordType,
    ) -> FsResult<VirtualFile>;

    fn free_space_size(&self, storage: StorageId) -> u64;

    fn total_space_size(&self, storage: StorageId) -> u64;
}

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
pub trait ContentProvider: Send + Sync {
    /// Extracted section of an installed title with updates applied, if the title has one.
    fn open_patched_section(
        &self,
        title_id: u64,
        fs_type: FileSystemType,
        record: ContentRecordType,
    ) -> Option<VirtualDir>;

    /// Applies installed updates to a data archive. Returns `base` when there is nothing to merge.
    fn patch_romfs(&self, title_id: u64, base: VirtualFile, record: ContentRecordType)
        -> VirtualFile;

    /// Built-in replacement for a system archive that is not installed.
    fn synthesize_system_archive(&self, title_id: u64) -> Option<VirtualFile>;
}

type SizeFn = Box<dyn Fn() -> u64 + Send + Sync>;

/// Free/total size callbacks bound to one storage class.
pub struct SizeGetter {
    storage: StorageId,
    free: SizeFn,
    total: SizeFn,
}

impl SizeGetter {
    pub fn from_storage_id(controller: Arc<dyn FileSystemController>, storage: StorageId) -> Self {
        let for_total = controller.clone();
        Self {
            storage,
            free: Box::new(move || controller.free_space_size(storage)),
            total: Box::new(move || for_total.total_space_size(storage)),
        }
    }

    /// Reports constant sizes; used for archives that have no backing partition.
    pub fn fixed(storage: StorageId, free: u64, total: u64) -> Self {
        Self {
            storage,
            free: Box::new(move || free),
            total: Box::new(move || total),
        }
    }

    pub fn storage_id(&self) -> StorageId {
        self.storage
    }

    pub fn get_free_size(&self) -> u64 {
        (self.free)()
    }

    pub fn get_total_size(&self) -> u64 {
        (self.total)()
    }
}

impl fmt::Debug for SizeGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeGetter").field("storage", &self.storage).finish()
    }
}
