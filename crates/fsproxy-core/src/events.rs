// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Hot-plug detection events

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

/// Readable side of a signal raised by the host, e.g. on SD card insertion.
pub trait Event: Send + Sync {
    fn name(&self) -> &str;
    fn signal(&self);
    fn clear(&self);
    fn is_signaled(&self) -> bool;
}

/// Manually cleared flag event.
#[derive(Debug)]
pub struct SignalEvent {
    name: String,
    signaled: AtomicBool,
}

impl SignalEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signaled: AtomicBool::new(false),
        }
    }
}

impl Event for SignalEvent {
    fn name(&self) -> &str {
        &self.name
    }

    fn signal(&self) {
        trace!(event = %self.name, "signal");
        self.signaled.store(true, Ordering::Release);
    }

    fn clear(&self) {
        self.signaled.store(false, Ordering::Release);
    }

    fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }
}
