// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    #[error("unknown {kind} value {value:#x}")]
    UnknownValue { kind: &'static str, value: u64 },
    #[error("{kind} record needs {expected} bytes, got {actual}")]
    Truncated {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}
