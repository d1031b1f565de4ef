// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use fsproxy_proto::{SaveDataSpaceId, StorageId};

/// Storage class whose free/total sizes are reported for a save-data space.
///
/// Spaces without a physical class of their own (currently only `SafeMode`) map to
/// `StorageId::None`.
pub fn storage_for_save_data_space(space: SaveDataSpaceId) -> StorageId {
    match space {
        SaveDataSpaceId::NandSystem
        | SaveDataSpaceId::ProperSystem
        | SaveDataSpaceId::TemporaryStorage => StorageId::NandSystem,
        SaveDataSpaceId::NandUser => StorageId::NandUser,
        SaveDataSpaceId::SdCardSystem | SaveDataSpaceId::SdCardUser => StorageId::SdCard,
        SaveDataSpaceId::SafeMode => StorageId::None,
    }
}
