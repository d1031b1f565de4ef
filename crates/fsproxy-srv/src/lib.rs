// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! fsproxy service layer
//!
//! [`FspSrv`] is the entry point: each `open_*` operation returns a session object that owns
//! one backend node. A transport keeps sessions in a [`HandleTable`] and addresses them by
//! [`HandleId`].

pub mod handle_table;
pub mod service;
pub mod session;

pub use handle_table::{HandleId, HandleTable, Session};
pub use service::FspSrv;
pub use session::{
    DirectorySession, EventNotifierSession, FileSession, FileSystemSession,
    SaveDataInfoReaderSession, StorageSession,
};
