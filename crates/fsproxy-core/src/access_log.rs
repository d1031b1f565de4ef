// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Guest filesystem access-log sink

use fsproxy_proto::LogMode;
use tracing::info;

/// Receives access-log lines written by the guest.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
pub trait AccessLogReporter: Send + Sync {
    fn save_filesystem_access_report(&self, mode: LogMode, log: &str);
}

/// Forwards access-log lines to the `fsproxy::access_log` tracing target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAccessLogReporter;

impl AccessLogReporter for TracingAccessLogReporter {
    fn save_filesystem_access_report(&self, mode: LogMode, log: &str) {
        if mode == LogMode::Off {
            return;
        }
        info!(target: "fsproxy::access_log", mode = ?mode, "{}", log.trim_end());
    }
}

/// Reads a string out of a fixed-size buffer, stopping at the first NUL.
pub fn string_from_zero_terminated(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
