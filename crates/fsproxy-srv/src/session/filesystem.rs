// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use fsproxy_core::{DirectoryServiceWrapper, FsResult, SizeGetter};
use fsproxy_proto::{EntryType, OpenMode};
use fsproxy_vfs::VirtualDir;
use tracing::{debug, warn};

use super::{decode_raw, DirectorySession, FileSession};

/// Mounted filesystem: path operations over one backing directory plus its size accounting.
#[derive(Debug)]
pub struct FileSystemSession {
    backend: DirectoryServiceWrapper,
    size: SizeGetter,
}

impl FileSystemSession {
    pub fn new(backend: VirtualDir, size: SizeGetter) -> Self {
        Self {
            backend: DirectoryServiceWrapper::new(backend),
            size,
        }
    }

    pub fn backing(&self) -> &VirtualDir {
        self.backend.backing()
    }

    pub fn create_file(&self, path: &str, size: u64) -> FsResult<()> {
        debug!(path, size, "create file");
        self.backend.create_file(path, size)
    }

    pub fn delete_file(&self, path: &str) -> FsResult<()> {
        debug!(path, "delete file");
        self.backend.delete_file(path)
    }

    pub fn create_directory(&self, path: &str) -> FsResult<()> {
        debug!(path, "create directory");
        self.backend.create_directory(path)
    }

    pub fn delete_directory(&self, path: &str) -> FsResult<()> {
        debug!(path, "delete directory");
        self.backend.delete_directory(path)
    }

    pub fn delete_directory_recursively(&self, path: &str) -> FsResult<()> {
        debug!(path, "delete directory recursively");
        self.backend.delete_directory_recursively(path)
    }

    pub fn clean_directory_recursively(&self, path: &str) -> FsResult<()> {
        debug!(path, "clean directory recursively");
        self.backend.clean_directory_recursively(path)
    }

    pub fn rename_file(&self, src: &str, dst: &str) -> FsResult<()> {
        debug!(src, dst, "rename file");
        self.backend.rename_file(src, dst)
    }

    pub fn rename_directory(&self, src: &str, dst: &str) -> FsResult<()> {
        debug!(src, dst, "rename directory");
        self.backend.rename_directory(src, dst)
    }

    pub fn get_entry_type(&self, path: &str) -> FsResult<EntryType> {
        debug!(path, "get entry type");
        self.backend.get_entry_type(path)
    }

    /// Opens a file. Unknown raw modes fail with an invalid-argument code.
    pub fn open_file(&self, path: &str, raw_mode: u32) -> FsResult<FileSession> {
        let mode: OpenMode = decode_raw(raw_mode)?;
        debug!(path, mode = ?mode, "open file");
        let file = self.backend.open_file(path, mode)?;
        Ok(FileSession::new(file, mode))
    }

    pub fn open_directory(&self, path: &str, filter_flags: u32) -> FsResult<DirectorySession> {
        debug!(path, filter_flags, "open directory");
        let dir = self.backend.open_directory(path)?;
        Ok(DirectorySession::new(&dir, filter_flags))
    }

    pub fn commit(&self) -> FsResult<()> {
        warn!(path = %self.backend.backing().full_path(), "commit is a no-op");
        Ok(())
    }

    pub fn get_free_space_size(&self, path: &str) -> u64 {
        debug!(path, storage = ?self.size.storage_id(), "get free space size");
        self.size.get_free_size()
    }

    pub fn get_total_space_size(&self, path: &str) -> u64 {
        debug!(path, storage = ?self.size.storage_id(), "get total space size");
        self.size.get_total_size()
    }
}
