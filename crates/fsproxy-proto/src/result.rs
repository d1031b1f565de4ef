// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::fmt;

/// Raw result word returned for every operation: `module | description << 9`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResultCode(pub u32);

impl ResultCode {
    pub const MODULE_FS: u32 = 2;

    pub const SUCCESS: Self = Self(0);
    /// Generic failure with no module or description.
    pub const UNKNOWN: Self = Self(u32::MAX);

    pub const PATH_ALREADY_EXISTS: Self = Self::fs(2);
    pub const ENTITY_NOT_FOUND: Self = Self::fs(1002);
    pub const SD_CARD_NOT_FOUND: Self = Self::fs(2001);
    pub const INVALID_ARGUMENT: Self = Self::fs(6001);
    pub const INVALID_OFFSET: Self = Self::fs(6061);
    pub const INVALID_SIZE: Self = Self::fs(6062);
    pub const PERMISSION_DENIED: Self = Self::fs(6400);

    pub const fn fs(description: u32) -> Self {
        Self(Self::MODULE_FS | (description << 9))
    }

    pub const fn module(self) -> u32 {
        self.0 & 0x1FF
    }

    pub const fn description(self) -> u32 {
        (self.0 >> 9) & 0x1FFF
    }

    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::UNKNOWN {
            return f.write_str("unknown (0xFFFFFFFF)");
        }
        write!(f, "{:04}-{:04} ({:#010x})", 2000 + self.module(), self.description(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_codes_pack_module_and_description() {
        assert_eq!(ResultCode::ENTITY_NOT_FOUND.0, 2 | (1002 << 9));
        assert_eq!(ResultCode::PERMISSION_DENIED.module(), 2);
        assert_eq!(ResultCode::PERMISSION_DENIED.description(), 6400);
        assert_eq!(ResultCode::INVALID_OFFSET.to_string(), "2002-6061 (0x002f5a02)");
        assert!(ResultCode::SUCCESS.is_success());
        assert!(!ResultCode::UNKNOWN.is_success());
    }
}
