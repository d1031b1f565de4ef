// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fixed-size records copied into guest buffers

use std::fmt;

use crate::error::ProtoError;
use crate::ids::{EntryType, SaveDataRank, SaveDataSpaceId, SaveDataType};

fn check_len(kind: &'static str, bytes: &[u8], expected: usize) -> Result<(), ProtoError> {
    if bytes.len() < expected {
        return Err(ProtoError::Truncated {
            kind,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn u64_at(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn user_id_at(bytes: &[u8], offset: usize) -> [u8; 16] {
    let mut user_id = [0u8; 16];
    user_id.copy_from_slice(&bytes[offset..offset + 16]);
    user_id
}

/// One directory listing entry.
///
/// Layout: `name[0x301]` (NUL-terminated), 3 pad bytes, type byte at 0x304, 3 pad bytes,
/// little-endian size at 0x308.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub entry_type: EntryType,
    pub size: u64,
}

impl DirectoryEntry {
    pub const SIZE: usize = 0x310;
    const NAME_FIELD: usize = 0x301;
    const TYPE_OFFSET: usize = 0x304;
    const SIZE_OFFSET: usize = 0x308;

    pub fn new(name: impl Into<String>, entry_type: EntryType, size: u64) -> Self {
        Self {
            name: name.into(),
            entry_type,
            size,
        }
    }

    /// Encodes the entry. Names longer than the field are truncated so the terminator fits.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        let name = self.name.as_bytes();
        let len = name.len().min(Self::NAME_FIELD - 1);
        out[..len].copy_from_slice(&name[..len]);
        out[Self::TYPE_OFFSET] = self.entry_type.raw();
        out[Self::SIZE_OFFSET..].copy_from_slice(&self.size.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtoError> {
        check_len("DirectoryEntry", bytes, Self::SIZE)?;
        let name_field = &bytes[..Self::NAME_FIELD];
        let end = name_field.iter().position(|&b| b == 0).unwrap_or(name_field.len());
        Ok(Self {
            name: String::from_utf8_lossy(&name_field[..end]).into_owned(),
            entry_type: EntryType::try_from(bytes[Self::TYPE_OFFSET])?,
            size: u64_at(bytes, Self::SIZE_OFFSET),
        })
    }
}

/// Save-data metadata record returned by the info reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveDataInfo {
    pub save_id_unknown: u64,
    pub space: SaveDataSpaceId,
    pub save_type: SaveDataType,
    pub user_id: [u8; 16],
    pub save_id: u64,
    pub title_id: u64,
    pub save_image_size: u64,
    pub index: u16,
    pub rank: SaveDataRank,
}

impl SaveDataInfo {
    pub const SIZE: usize = 0x60;

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0x00..0x08].copy_from_slice(&self.save_id_unknown.to_le_bytes());
        out[0x08] = self.space.raw();
        out[0x09] = self.save_type.raw();
        out[0x10..0x20].copy_from_slice(&self.user_id);
        out[0x20..0x28].copy_from_slice(&self.save_id.to_le_bytes());
        out[0x28..0x30].copy_from_slice(&self.title_id.to_le_bytes());
        out[0x30..0x38].copy_from_slice(&self.save_image_size.to_le_bytes());
        out[0x38..0x3A].copy_from_slice(&self.index.to_le_bytes());
        out[0x3A] = self.rank.raw();
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtoError> {
        check_len("SaveDataInfo", bytes, Self::SIZE)?;
        Ok(Self {
            save_id_unknown: u64_at(bytes, 0x00),
            space: SaveDataSpaceId::try_from(bytes[0x08])?,
            save_type: SaveDataType::try_from(bytes[0x09])?,
            user_id: user_id_at(bytes, 0x10),
            save_id: u64_at(bytes, 0x20),
            title_id: u64_at(bytes, 0x28),
            save_image_size: u64_at(bytes, 0x30),
            index: u16_at(bytes, 0x38),
            rank: SaveDataRank::try_from(bytes[0x3A])?,
        })
    }
}

/// Identifies a save-data archive in create/open requests (0x40 bytes on the wire).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveDataDescriptor {
    pub title_id: u64,
    pub user_id: [u8; 16],
    pub save_id: u64,
    pub save_type: SaveDataType,
    pub rank: SaveDataRank,
    pub index: u16,
}

impl SaveDataDescriptor {
    pub const SIZE: usize = 0x40;

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0x00..0x08].copy_from_slice(&self.title_id.to_le_bytes());
        out[0x08..0x18].copy_from_slice(&self.user_id);
        out[0x18..0x20].copy_from_slice(&self.save_id.to_le_bytes());
        out[0x20] = self.save_type.raw();
        out[0x21] = self.rank.raw();
        out[0x22..0x24].copy_from_slice(&self.index.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtoError> {
        check_len("SaveDataDescriptor", bytes, Self::SIZE)?;
        Ok(Self {
            title_id: u64_at(bytes, 0x00),
            user_id: user_id_at(bytes, 0x08),
            save_id: u64_at(bytes, 0x18),
            save_type: SaveDataType::try_from(bytes[0x20])?,
            rank: SaveDataRank::try_from(bytes[0x21])?,
            index: u16_at(bytes, 0x22),
        })
    }

    /// User id as printed in logs and on-disk paths: high 64 bits first.
    pub fn user_id_hex(&self) -> String {
        let mut hi = [0u8; 8];
        let mut lo = [0u8; 8];
        lo.copy_from_slice(&self.user_id[..8]);
        hi.copy_from_slice(&self.user_id[8..]);
        format!("{:016X}{:016X}", u64::from_le_bytes(hi), u64::from_le_bytes(lo))
    }
}

impl fmt::Display for SaveDataDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[title_id={:016X}, user_id={}, save_id={:016X}, type={:?}, rank={:?}, index={}]",
            self.title_id,
            self.user_id_hex(),
            self.save_id,
            self.save_type,
            self.rank,
            self.index
        )
    }
}
