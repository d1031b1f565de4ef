// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use fsproxy_core::{FileSystemController, SaveDataEnumerator};
use fsproxy_proto::{SaveDataInfo, SaveDataSpaceId};
use tracing::debug;

use super::RecordCursor;

/// Pages through the save-data records collected when the reader was opened.
#[derive(Debug)]
pub struct SaveDataInfoReaderSession {
    records: RecordCursor<SaveDataInfo>,
}

impl SaveDataInfoReaderSession {
    pub fn new(controller: &dyn FileSystemController, spaces: &[SaveDataSpaceId]) -> Self {
        Self::from_enumerator(SaveDataEnumerator::build(controller, spaces))
    }

    pub fn from_enumerator(enumerator: SaveDataEnumerator) -> Self {
        Self {
            records: RecordCursor::new(enumerator.records().to_vec()),
        }
    }

    /// Packs as many 0x60-byte records as fit in `out`. Returns the record count written.
    pub fn read(&mut self, out: &mut [u8]) -> u32 {
        let count = self.records.pack_into(out, SaveDataInfo::encode);
        debug!(count, "save data info read");
        count as u32
    }

    pub fn read_records(&mut self, max: usize) -> Vec<SaveDataInfo> {
        self.records.take(max)
    }

    pub fn remaining(&self) -> usize {
        self.records.remaining()
    }
}
