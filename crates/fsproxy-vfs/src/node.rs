// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Capability sets implemented by backing storage

use std::sync::Arc;

/// Byte storage for a single file.
///
/// `read` and `write` never fail on out-of-range arguments; they report how many bytes were
/// actually transferred, which may be zero. Bounds enforcement belongs to the session layer.
pub trait FileNode: Send + Sync {
    fn name(&self) -> String;
    fn size(&self) -> u64;
    fn resize(&self, new_size: u64) -> bool;
    /// Non-owning lookup of the directory holding this file.
    fn containing_directory(&self) -> Option<Arc<dyn DirectoryNode>>;
    fn is_readable(&self) -> bool;
    fn is_writable(&self) -> bool;
    fn read(&self, buf: &mut [u8], offset: u64) -> usize;
    fn write(&self, data: &[u8], offset: u64) -> usize;
    fn rename(&self, name: &str) -> bool;

    fn full_path(&self) -> String {
        match self.containing_directory() {
            Some(dir) => join_path(&dir.full_path(), &self.name()),
            None => self.name(),
        }
    }
}

/// Child enumeration and mutation for a single directory.
pub trait DirectoryNode: Send + Sync {
    fn files(&self) -> Vec<Arc<dyn FileNode>>;
    fn subdirectories(&self) -> Vec<Arc<dyn DirectoryNode>>;
    fn name(&self) -> String;
    /// Non-owning lookup of the enclosing directory; `None` at the root.
    fn parent_directory(&self) -> Option<Arc<dyn DirectoryNode>>;
    fn is_readable(&self) -> bool;
    fn is_writable(&self) -> bool;
    fn create_file(&self, name: &str) -> Option<Arc<dyn FileNode>>;
    fn create_subdirectory(&self, name: &str) -> Option<Arc<dyn DirectoryNode>>;
    fn delete_file(&self, name: &str) -> bool;
    fn delete_subdirectory(&self, name: &str) -> bool;
    fn rename(&self, name: &str) -> bool;

    fn file(&self, name: &str) -> Option<Arc<dyn FileNode>> {
        self.files().into_iter().find(|f| f.name() == name)
    }

    fn subdirectory(&self, name: &str) -> Option<Arc<dyn DirectoryNode>> {
        self.subdirectories().into_iter().find(|d| d.name() == name)
    }

    /// Sum of the sizes of everything below this directory.
    fn size(&self) -> u64 {
        let files: u64 = self.files().iter().map(|f| f.size()).sum();
        let dirs: u64 = self.subdirectories().iter().map(|d| d.size()).sum();
        files + dirs
    }

    fn full_path(&self) -> String {
        match self.parent_directory() {
            Some(parent) => join_path(&parent.full_path(), &self.name()),
            None => self.name(),
        }
    }
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}
