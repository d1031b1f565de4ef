// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use fsproxy_core::{FsError, FsResult};
use fsproxy_proto::OpenMode;
use fsproxy_vfs::VirtualFile;
use tracing::{debug, error};

use super::check_extent;

/// Source of the zero padding written after a short buffer.
static ZEROES: [u8; 0x1000] = [0; 0x1000];

/// Open file handle. Carries the mode it was opened with.
#[derive(Debug, Clone)]
pub struct FileSession {
    backend: VirtualFile,
    mode: OpenMode,
}

impl FileSession {
    pub fn new(backend: VirtualFile, mode: OpenMode) -> Self {
        Self { backend, mode }
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    fn ensure_writable(&self) -> FsResult<()> {
        if !self.mode.needs_write() || !self.backend.is_writable() {
            error!(path = %self.backend.full_path(), mode = ?self.mode, "file is not open for writing");
            return Err(FsError::PermissionDenied);
        }
        Ok(())
    }

    pub fn read(&self, option: u64, offset: i64, length: i64, out: &mut [u8]) -> FsResult<u64> {
        debug!(option, offset, length, "file read");
        let (offset, length) = check_extent(offset, length)?;
        let count = length.min(out.len() as u64) as usize;
        Ok(self.backend.read(&mut out[..count], offset) as u64)
    }

    /// Writes `data` zero-padded to `length` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics when `data` is longer than `length`, or when the backend accepts fewer bytes
    /// than requested. Both mean the request and the node disagree about the file.
    pub fn write(&self, option: u64, offset: i64, length: i64, data: &[u8]) -> FsResult<()> {
        debug!(option, offset, length, "file write");
        let (offset, length) = check_extent(offset, length)?;
        self.ensure_writable()?;
        assert!(
            data.len() as u64 <= length,
            "write buffer of {} bytes exceeds declared length {}",
            data.len(),
            length
        );
        let mut written = self.backend.write(data, offset) as u64;
        if written == data.len() as u64 {
            while written < length {
                let chunk = (length - written).min(ZEROES.len() as u64) as usize;
                let count = self.backend.write(&ZEROES[..chunk], offset + written);
                written += count as u64;
                if count < chunk {
                    break;
                }
            }
        }
        assert_eq!(written, length, "backend wrote {written} of {length} bytes");
        Ok(())
    }

    pub fn flush(&self) -> FsResult<()> {
        debug!("file flush");
        Ok(())
    }

    pub fn set_size(&self, size: u64) -> FsResult<()> {
        debug!(size, "file set size");
        self.ensure_writable()?;
        if !self.backend.resize(size) {
            error!(path = %self.backend.full_path(), size, "resize failed");
            return Err(FsError::OperationFailed);
        }
        Ok(())
    }

    pub fn get_size(&self) -> u64 {
        self.backend.size()
    }
}
