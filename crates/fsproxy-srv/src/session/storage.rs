// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use fsproxy_core::FsResult;
use fsproxy_vfs::VirtualFile;
use tracing::debug;

use super::check_extent;

/// Raw read-only byte storage, e.g. a data archive or a BIS partition image.
#[derive(Debug, Clone)]
pub struct StorageSession {
    backend: VirtualFile,
}

impl StorageSession {
    pub fn new(backend: VirtualFile) -> Self {
        Self { backend }
    }

    /// Reads up to `length` bytes at `offset` into `out`. Returns the byte count read.
    pub fn read(&self, offset: i64, length: i64, out: &mut [u8]) -> FsResult<u64> {
        debug!(offset, length, "storage read");
        let (offset, length) = check_extent(offset, length)?;
        let count = length.min(out.len() as u64) as usize;
        Ok(self.backend.read(&mut out[..count], offset) as u64)
    }

    pub fn get_size(&self) -> u64 {
        let size = self.backend.size();
        debug!(size, "storage get size");
        size
    }
}
