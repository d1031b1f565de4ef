// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! fsproxy core: the policy layer between virtual nodes and service sessions

pub mod access_log;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod save_data;
pub mod storage_class;
pub mod wrapper;

pub use access_log::{AccessLogReporter, TracingAccessLogReporter};
pub use config::{ConfigError, ServiceConfig};
pub use controller::{ContentProvider, FileSystemController, SizeGetter};
pub use error::{FsError, FsResult};
pub use events::{Event, SignalEvent};
pub use save_data::{save_data_path, SaveDataEnumerator};
pub use storage_class::storage_for_save_data_space;
pub use wrapper::DirectoryServiceWrapper;
