// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Raw identifiers carried in requests

use serde::{Deserialize, Serialize};

use crate::error::ProtoError;

/// Declares a `#[repr]` enum together with its raw conversion in both directions.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $repr:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr($repr)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            pub const fn raw(self) -> $repr {
                self as $repr
            }
        }

        impl TryFrom<$repr> for $name {
            type Error = ProtoError;

            fn try_from(value: $repr) -> Result<Self, ProtoError> {
                match value {
                    $(v if v == $value => Ok(Self::$variant),)+
                    other => Err(ProtoError::UnknownValue {
                        kind: stringify!($name),
                        value: other as u64,
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Logical partition that holds save data.
    pub enum SaveDataSpaceId: u8 {
        NandSystem = 0,
        NandUser = 1,
        SdCardSystem = 2,
        TemporaryStorage = 3,
        SdCardUser = 4,
        ProperSystem = 100,
        SafeMode = 101,
    }
}

wire_enum! {
    /// Physical storage class, used for free/total size accounting.
    pub enum StorageId: u8 {
        None = 0,
        Host = 1,
        GameCard = 2,
        NandSystem = 3,
        NandUser = 4,
        SdCard = 5,
    }
}

wire_enum! {
    pub enum SaveDataType: u8 {
        SystemSaveData = 0,
        SaveData = 1,
        BcatDeliveryCacheStorage = 2,
        DeviceSaveData = 3,
        TemporaryStorage = 4,
        CacheStorage = 5,
    }
}

wire_enum! {
    pub enum SaveDataRank: u8 {
        Primary = 0,
        Secondary = 1,
    }
}

wire_enum! {
    /// Access requested when opening a file.
    pub enum OpenMode: u32 {
        Read = 1,
        Write = 2,
        ReadWrite = 3,
        Append = 4,
        WriteAppend = 6,
    }
}

impl OpenMode {
    pub fn needs_read(self) -> bool {
        self.raw() & 1 != 0
    }

    /// True for every mode with the write or append bit set.
    pub fn needs_write(self) -> bool {
        self.raw() & 6 != 0
    }
}

wire_enum! {
    pub enum EntryType: u8 {
        Directory = 0,
        File = 1,
    }
}

wire_enum! {
    /// Section of an installed title requested through `open_file_system_with_patch`.
    pub enum FileSystemType: u32 {
        Logo = 2,
        ContentControl = 3,
        ContentManual = 4,
        ContentMeta = 5,
        ContentData = 6,
        ApplicationPackage = 7,
    }
}

impl FileSystemType {
    pub fn content_record_type(self) -> ContentRecordType {
        match self {
            Self::Logo | Self::ApplicationPackage => ContentRecordType::Program,
            Self::ContentControl => ContentRecordType::Control,
            Self::ContentManual => ContentRecordType::HtmlDocument,
            Self::ContentMeta => ContentRecordType::Meta,
            Self::ContentData => ContentRecordType::Data,
        }
    }
}

wire_enum! {
    pub enum ContentRecordType: u8 {
        Meta = 0,
        Program = 1,
        Data = 2,
        Control = 3,
        HtmlDocument = 4,
        LegalInformation = 5,
        DeltaFragment = 6,
    }
}

wire_enum! {
    pub enum ImageDirectoryId: u32 {
        Nand = 0,
        SdCard = 1,
    }
}

wire_enum! {
    pub enum ContentStorageId: u32 {
        System = 0,
        User = 1,
        SdCard = 2,
    }
}

wire_enum! {
    /// Global access log mode. `LogToSdCard` is the union of the two single-bit modes.
    pub enum LogMode: u32 {
        Off = 0,
        Log = 1,
        RedirectToSdCard = 2,
        LogToSdCard = 3,
    }
}

impl Default for LogMode {
    fn default() -> Self {
        Self::LogToSdCard
    }
}

wire_enum! {
    pub enum AccessLogVersion: u32 {
        #[allow(non_camel_case_types)]
        V7_0_0 = 2,
    }
}

impl AccessLogVersion {
    pub const LATEST: Self = Self::V7_0_0;
}

wire_enum! {
    /// Raw NAND partitions reachable through the BIS operations.
    pub enum BisPartitionId: u32 {
        BootPartition1Root = 0,
        BootPartition2Root = 10,
        UserDataRoot = 20,
        BootConfigAndPackage2Part1 = 21,
        BootConfigAndPackage2Part2 = 22,
        BootConfigAndPackage2Part3 = 23,
        BootConfigAndPackage2Part4 = 24,
        BootConfigAndPackage2Part5 = 25,
        BootConfigAndPackage2Part6 = 26,
        CalibrationBinary = 27,
        CalibrationFile = 28,
        SafeMode = 29,
        User = 30,
        System = 31,
        SystemProperEncryption = 32,
        SystemProperPartition = 33,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_round_trip_and_unknowns_are_rejected() {
        assert_eq!(SaveDataSpaceId::try_from(100), Ok(SaveDataSpaceId::ProperSystem));
        assert_eq!(SaveDataSpaceId::SafeMode.raw(), 101);
        assert_eq!(
            SaveDataSpaceId::try_from(5),
            Err(ProtoError::UnknownValue { kind: "SaveDataSpaceId", value: 5 })
        );
        assert!(OpenMode::try_from(5).is_err());
        assert!(FileSystemType::try_from(0).is_err());
        assert_eq!(StorageId::try_from(5), Ok(StorageId::SdCard));
    }

    #[test]
    fn open_mode_bits() {
        assert!(OpenMode::Read.needs_read());
        assert!(!OpenMode::Read.needs_write());
        assert!(OpenMode::Append.needs_write());
        assert!(!OpenMode::Append.needs_read());
        assert!(OpenMode::WriteAppend.needs_write());
        assert!(OpenMode::ReadWrite.needs_read() && OpenMode::ReadWrite.needs_write());
    }

    #[test]
    fn file_system_type_maps_to_record_type() {
        assert_eq!(FileSystemType::Logo.content_record_type(), ContentRecordType::Program);
        assert_eq!(
            FileSystemType::ContentManual.content_record_type(),
            ContentRecordType::HtmlDocument
        );
        assert_eq!(FileSystemType::ContentData.content_record_type(), ContentRecordType::Data);
    }

    #[test]
    fn log_mode_defaults_to_sd_card_and_serializes_by_name() {
        assert_eq!(LogMode::default(), LogMode::LogToSdCard);
        assert_eq!(
            LogMode::LogToSdCard.raw(),
            LogMode::Log.raw() | LogMode::RedirectToSdCard.raw()
        );
        let json = serde_json::to_string(&SaveDataSpaceId::TemporaryStorage).unwrap();
        assert_eq!(json, "\"TemporaryStorage\"");
        assert_eq!(AccessLogVersion::LATEST.raw(), 2);
    }
}
