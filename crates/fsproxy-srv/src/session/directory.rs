// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use fsproxy_proto::{DirectoryEntry, EntryType};
use fsproxy_vfs::VirtualDir;
use tracing::debug;

use super::RecordCursor;

const INCLUDE_DIRECTORIES: u32 = 1;
const INCLUDE_FILES: u32 = 2;

/// Directory listing snapshotted at open time and read forward in fixed-size records.
///
/// Files come before subdirectories. `filter_flags` selects directories (bit 0) and files
/// (bit 1); a value with neither bit set lists both.
#[derive(Debug)]
pub struct DirectorySession {
    entries: RecordCursor<DirectoryEntry>,
}

impl DirectorySession {
    pub fn new(backend: &VirtualDir, filter_flags: u32) -> Self {
        let everything = filter_flags & (INCLUDE_DIRECTORIES | INCLUDE_FILES) == 0;
        let mut entries = Vec::new();
        if everything || filter_flags & INCLUDE_FILES != 0 {
            entries.extend(
                backend
                    .files()
                    .iter()
                    .map(|f| DirectoryEntry::new(f.name(), EntryType::File, f.size())),
            );
        }
        if everything || filter_flags & INCLUDE_DIRECTORIES != 0 {
            entries.extend(
                backend
                    .subdirectories()
                    .iter()
                    .map(|d| DirectoryEntry::new(d.name(), EntryType::Directory, d.size())),
            );
        }
        debug!(path = %backend.full_path(), count = entries.len(), "directory snapshot");
        Self {
            entries: RecordCursor::new(entries),
        }
    }

    /// Packs up to `out.len() / 0x310` entries into `out`. Returns the entry count written.
    pub fn read(&mut self, out: &mut [u8]) -> u64 {
        let count = self.entries.pack_into(out, DirectoryEntry::encode);
        debug!(count, "directory read");
        count as u64
    }

    pub fn read_entries(&mut self, max: usize) -> Vec<DirectoryEntry> {
        self.entries.take(max)
    }

    /// Entries not yet read.
    pub fn get_entry_count(&self) -> u64 {
        self.entries.remaining() as u64
    }
}
