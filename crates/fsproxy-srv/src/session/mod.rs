// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Per-handle session objects

pub mod directory;
pub mod event_notifier;
pub mod file;
pub mod filesystem;
pub mod save_data_info_reader;
pub mod storage;

pub use directory::DirectorySession;
pub use event_notifier::EventNotifierSession;
pub use file::FileSession;
pub use filesystem::FileSystemSession;
pub use save_data_info_reader::SaveDataInfoReaderSession;
pub use storage::StorageSession;

use fsproxy_core::{FsError, FsResult};
use fsproxy_proto::ProtoError;
use tracing::error;

/// Decodes a raw wire value. Values outside the enum are an invalid argument.
pub(crate) fn decode_raw<T, R>(raw: R) -> FsResult<T>
where
    T: TryFrom<R, Error = ProtoError>,
{
    T::try_from(raw).map_err(|e| {
        error!(error = %e, "rejecting raw argument");
        FsError::InvalidArgument
    })
}

/// Validates a signed guest extent. Length is checked before offset.
pub(crate) fn check_extent(offset: i64, length: i64) -> FsResult<(u64, u64)> {
    if length < 0 {
        error!(length, "length is less than 0");
        return Err(FsError::InvalidSize);
    }
    if offset < 0 {
        error!(offset, "offset is less than 0");
        return Err(FsError::InvalidOffset);
    }
    Ok((offset as u64, length as u64))
}

/// Materialized record sequence with a forward-only read position.
#[derive(Debug)]
pub(crate) struct RecordCursor<T> {
    items: Vec<T>,
    next_entry_index: usize,
}

impl<T: Clone> RecordCursor<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self {
            items,
            next_entry_index: 0,
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.items.len() - self.next_entry_index
    }

    pub(crate) fn take(&mut self, max: usize) -> Vec<T> {
        let count = max.min(self.remaining());
        let start = self.next_entry_index;
        self.next_entry_index += count;
        self.items[start..start + count].to_vec()
    }

    /// Packs as many whole records as fit in `out` and advances past them.
    pub(crate) fn pack_into<const N: usize>(
        &mut self,
        out: &mut [u8],
        encode: impl Fn(&T) -> [u8; N],
    ) -> usize {
        let count = (out.len() / N).min(self.remaining());
        let start = self.next_entry_index;
        for (slot, item) in out.chunks_exact_mut(N).zip(&self.items[start..start + count]) {
            slot.copy_from_slice(&encode(item));
        }
        self.next_entry_index += count;
        count
    }
}
