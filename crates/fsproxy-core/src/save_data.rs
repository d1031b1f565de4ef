// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Save-data enumeration from the on-disk directory layout
//!
//! A save-data space root holds `save/<save-id>/<user-id>[/<title-id>]`. The temporary
//! storage space additionally holds `<save-id>/<user-id>/<title-id>` trees beside `save`.
//! Directory names are fixed-width hex: 16 digits for save and title ids, 32 for user ids.
//! Names that fail to decode read as zero.

use fsproxy_proto::{
    SaveDataDescriptor, SaveDataInfo, SaveDataRank, SaveDataSpaceId, SaveDataType,
};
use fsproxy_vfs::VirtualDir;
use tracing::{debug, error};

use crate::controller::FileSystemController;

/// Decodes a 16-digit big-endian hex id. Anything else yields 0.
pub fn decode_save_id(name: &str) -> u64 {
    if name.len() != 16 {
        return 0;
    }
    let mut raw = [0u8; 8];
    match hex::decode_to_slice(name, &mut raw) {
        Ok(()) => u64::from_be_bytes(raw),
        Err(_) => 0,
    }
}

/// Decodes a 32-digit hex user id, reversing the byte order. Anything else yields all zeroes.
pub fn decode_user_id(name: &str) -> [u8; 16] {
    let mut raw = [0u8; 16];
    if name.len() != 32 || hex::decode_to_slice(name, &mut raw).is_err() {
        return [0u8; 16];
    }
    raw.reverse();
    raw
}

/// Location of a save inside its space root, in the layout [`SaveDataEnumerator`] walks.
pub fn save_data_path(descriptor: &SaveDataDescriptor) -> String {
    if descriptor.save_id == 0 {
        format!("save/{:016X}/{}", 0, descriptor.user_id_hex())
    } else {
        format!(
            "save/{:016X}/{}/{:016X}",
            descriptor.save_id,
            descriptor.user_id_hex(),
            descriptor.title_id
        )
    }
}

fn record(
    space: SaveDataSpaceId,
    save_type: SaveDataType,
    user_id: [u8; 16],
    save_id: u64,
    title_id: u64,
    size: u64,
) -> SaveDataInfo {
    SaveDataInfo {
        save_id_unknown: 0,
        space,
        save_type,
        user_id,
        save_id,
        title_id,
        save_image_size: size,
        index: 0,
        rank: SaveDataRank::Primary,
    }
}

/// Immutable list of save-data records, built once per info reader.
#[derive(Clone, Debug, Default)]
pub struct SaveDataEnumerator {
    records: Vec<SaveDataInfo>,
}

impl SaveDataEnumerator {
    /// Walks every space in order. Spaces whose root cannot be opened are logged and skipped.
    pub fn build(controller: &dyn FileSystemController, spaces: &[SaveDataSpaceId]) -> Self {
        let mut records = Vec::new();
        for &space in spaces {
            match controller.open_save_data_space(space) {
                Ok(root) => collect_space(space, &root, &mut records),
                Err(e) => {
                    error!(space = ?space, error = %e, "save root for space is unavailable");
                }
            }
        }
        debug!(count = records.len(), "enumerated save data");
        Self { records }
    }

    pub fn from_records(records: Vec<SaveDataInfo>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SaveDataInfo] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn collect_space(space: SaveDataSpaceId, root: &VirtualDir, out: &mut Vec<SaveDataInfo>) {
    for top in root.subdirectories() {
        if top.name() == "save" {
            collect_save_tree(space, &top, out);
        } else if space == SaveDataSpaceId::TemporaryStorage {
            collect_temporary_tree(space, &top, out);
        }
    }
}

fn collect_save_tree(space: SaveDataSpaceId, save: &VirtualDir, out: &mut Vec<SaveDataInfo>) {
    for save_dir in save.subdirectories() {
        let save_id = decode_save_id(&save_dir.name());
        for user_dir in save_dir.subdirectories() {
            let user_id = decode_user_id(&user_dir.name());
            if save_id == 0 {
                out.push(record(
                    space,
                    SaveDataType::SystemSaveData,
                    user_id,
                    save_id,
                    0,
                    user_dir.size(),
                ));
                continue;
            }

            let save_type = if user_id.iter().all(|&b| b == 0) {
                SaveDataType::DeviceSaveData
            } else {
                SaveDataType::SaveData
            };
            for title_dir in user_dir.subdirectories() {
                out.push(record(
                    space,
                    save_type,
                    user_id,
                    save_id,
                    decode_save_id(&title_dir.name()),
                    title_dir.size(),
                ));
            }
        }
    }
}

fn collect_temporary_tree(space: SaveDataSpaceId, top: &VirtualDir, out: &mut Vec<SaveDataInfo>) {
    let save_id = decode_save_id(&top.name());
    for user_dir in top.subdirectories() {
        for title_dir in user_dir.subdirectories() {
            if title_dir.files().is_empty() && title_dir.subdirectories().is_empty() {
                continue;
            }
            out.push(record(
                space,
                SaveDataType::TemporaryStorage,
                decode_user_id(&user_dir.name()),
                save_id,
                decode_save_id(&title_dir.name()),
                title_dir.size(),
            ));
        }
    }
}
