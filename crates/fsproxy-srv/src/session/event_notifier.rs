// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::fmt;
use std::sync::Arc;

use fsproxy_core::Event;

/// Hands out the event a hot-plug notifier was opened for.
#[derive(Clone)]
pub struct EventNotifierSession {
    event: Arc<dyn Event>,
}

impl EventNotifierSession {
    pub fn new(event: Arc<dyn Event>) -> Self {
        Self { event }
    }

    pub fn get_event_handle(&self) -> Arc<dyn Event> {
        self.event.clone()
    }
}

impl fmt::Debug for EventNotifierSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNotifierSession")
            .field("event", &self.event.name())
            .finish()
    }
}
