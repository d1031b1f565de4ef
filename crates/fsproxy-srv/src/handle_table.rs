// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Registry of open sessions addressed by opaque handle ids

use std::collections::HashMap;

use fsproxy_core::{FsError, FsResult};
use tracing::{debug, error};

use crate::session::{
    DirectorySession, EventNotifierSession, FileSession, FileSystemSession,
    SaveDataInfoReaderSession, StorageSession,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl HandleId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug)]
pub enum Session {
    FileSystem(FileSystemSession),
    File(FileSession),
    Directory(DirectorySession),
    Storage(StorageSession),
    SaveDataInfoReader(SaveDataInfoReaderSession),
    EventNotifier(EventNotifierSession),
}

impl Session {
    pub fn kind(&self) -> &'static str {
        match self {
            Session::FileSystem(_) => "filesystem",
            Session::File(_) => "file",
            Session::Directory(_) => "directory",
            Session::Storage(_) => "storage",
            Session::SaveDataInfoReader(_) => "save data info reader",
            Session::EventNotifier(_) => "event notifier",
        }
    }
}

macro_rules! session_from {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(impl From<$ty> for Session {
            fn from(session: $ty) -> Self {
                Session::$variant(session)
            }
        })+
    };
}

session_from!(
    FileSystem(FileSystemSession),
    File(FileSession),
    Directory(DirectorySession),
    Storage(StorageSession),
    SaveDataInfoReader(SaveDataInfoReaderSession),
    EventNotifier(EventNotifierSession),
);

/// Typed lookup; a handle of another kind is reported as an invalid argument.
macro_rules! session_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&mut self, id: HandleId) -> FsResult<&mut $ty> {
            match self.get_mut(id)? {
                Session::$variant(session) => Ok(session),
                other => {
                    error!(handle = id.0, kind = other.kind(), "handle has the wrong kind");
                    Err(FsError::InvalidArgument)
                }
            }
        }
    };
}

/// Open sessions of one client. Ids are never reused.
#[derive(Debug, Default)]
pub struct HandleTable {
    sessions: HashMap<HandleId, Session>,
    next_handle_id: u64,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_handle_id(&mut self) -> HandleId {
        self.next_handle_id += 1;
        HandleId(self.next_handle_id)
    }

    pub fn insert(&mut self, session: impl Into<Session>) -> HandleId {
        let session = session.into();
        let id = self.allocate_handle_id();
        debug!(handle = id.0, kind = session.kind(), "session opened");
        self.sessions.insert(id, session);
        id
    }

    pub fn get_mut(&mut self, id: HandleId) -> FsResult<&mut Session> {
        self.sessions.get_mut(&id).ok_or_else(|| {
            error!(handle = id.0, "unknown handle");
            FsError::InvalidArgument
        })
    }

    session_accessor!(file_system, FileSystem, FileSystemSession);
    session_accessor!(file, File, FileSession);
    session_accessor!(directory, Directory, DirectorySession);
    session_accessor!(storage, Storage, StorageSession);
    session_accessor!(save_data_info_reader, SaveDataInfoReader, SaveDataInfoReaderSession);
    session_accessor!(event_notifier, EventNotifier, EventNotifierSession);

    /// Drops a session and returns it. Its backing nodes are released with it.
    pub fn close(&mut self, id: HandleId) -> FsResult<Session> {
        let session = self.sessions.remove(&id).ok_or(FsError::InvalidArgument)?;
        debug!(handle = id.0, kind = session.kind(), "session closed");
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
