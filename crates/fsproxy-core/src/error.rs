// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for fsproxy

use std::io;

use fsproxy_proto::{ProtoError, ResultCode};

/// Typed failure of a wrapper or session operation
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    #[error("invalid offset")]
    InvalidOffset,
    #[error("invalid size")]
    InvalidSize,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("entity not found")]
    EntityNotFound,
    #[error("path already exists")]
    PathAlreadyExists,
    #[error("permission denied")]
    PermissionDenied,
    #[error("sd card not found")]
    SdCardNotFound,
    #[error("operation failed")]
    OperationFailed,
    #[error("malformed request: {0}")]
    Proto(#[from] ProtoError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    pub fn result_code(&self) -> ResultCode {
        match self {
            FsError::InvalidOffset => ResultCode::INVALID_OFFSET,
            FsError::InvalidSize => ResultCode::INVALID_SIZE,
            FsError::InvalidArgument | FsError::Proto(_) => ResultCode::INVALID_ARGUMENT,
            FsError::EntityNotFound => ResultCode::ENTITY_NOT_FOUND,
            FsError::PathAlreadyExists => ResultCode::PATH_ALREADY_EXISTS,
            FsError::PermissionDenied => ResultCode::PERMISSION_DENIED,
            FsError::SdCardNotFound => ResultCode::SD_CARD_NOT_FOUND,
            FsError::OperationFailed | FsError::Io(_) => ResultCode::UNKNOWN,
        }
    }
}

pub type FsResult<T> = Result<T, FsError>;
