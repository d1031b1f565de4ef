// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! fsproxy protocol: identifiers, fixed-layout records and result codes
//!
//! Everything in this crate crosses the guest boundary, so layouts are explicit and
//! little-endian regardless of the host.

pub mod error;
pub mod ids;
pub mod records;
pub mod result;

pub use error::ProtoError;
pub use ids::{
    AccessLogVersion, BisPartitionId, ContentRecordType, ContentStorageId, EntryType,
    FileSystemType, ImageDirectoryId, LogMode, OpenMode, SaveDataRank, SaveDataSpaceId,
    SaveDataType, StorageId,
};
pub use records::{DirectoryEntry, SaveDataDescriptor, SaveDataInfo};
pub use result::ResultCode;
