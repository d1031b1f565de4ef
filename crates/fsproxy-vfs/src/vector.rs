// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory backing nodes
//!
//! Used for synthesized archives and as a fixture backing in tests. Children hold a weak link
//! to their parent; the parent owns its children.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::node::{DirectoryNode, FileNode};
use crate::virtual_node::{VirtualDir, VirtualFile};

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub struct VectorFile {
    name: RwLock<String>,
    data: RwLock<Vec<u8>>,
    parent: RwLock<Weak<VectorDirectory>>,
    writable: bool,
}

impl VectorFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Arc<Self> {
        Self::with_access(name, data, true)
    }

    /// A file whose own capability set refuses writes.
    pub fn read_only_backing(name: impl Into<String>, data: Vec<u8>) -> Arc<Self> {
        Self::with_access(name, data, false)
    }

    fn with_access(name: impl Into<String>, data: Vec<u8>, writable: bool) -> Arc<Self> {
        Arc::new(Self {
            name: RwLock::new(name.into()),
            data: RwLock::new(data),
            parent: RwLock::new(Weak::new()),
            writable,
        })
    }

    pub fn into_virtual(self: Arc<Self>) -> VirtualFile {
        VirtualFile::Backed(self)
    }

    fn set_parent(&self, parent: Weak<VectorDirectory>) {
        *write_lock(&self.parent) = parent;
    }
}

impl FileNode for VectorFile {
    fn name(&self) -> String {
        read_lock(&self.name).clone()
    }

    fn size(&self) -> u64 {
        read_lock(&self.data).len() as u64
    }

    fn resize(&self, new_size: u64) -> bool {
        if !self.writable {
            return false;
        }
        let Ok(new_size) = usize::try_from(new_size) else {
            return false;
        };
        write_lock(&self.data).resize(new_size, 0);
        true
    }

    fn containing_directory(&self) -> Option<Arc<dyn DirectoryNode>> {
        let parent = read_lock(&self.parent).upgrade()?;
        Some(parent)
    }

    fn is_readable(&self) -> bool {
        true
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn read(&self, buf: &mut [u8], offset: u64) -> usize {
        let data = read_lock(&self.data);
        let Ok(start) = usize::try_from(offset) else {
            return 0;
        };
        if start >= data.len() {
            return 0;
        }
        let count = buf.len().min(data.len() - start);
        buf[..count].copy_from_slice(&data[start..start + count]);
        count
    }

    fn write(&self, bytes: &[u8], offset: u64) -> usize {
        if !self.writable {
            return 0;
        }
        let Some(end) = usize::try_from(offset)
            .ok()
            .and_then(|start| start.checked_add(bytes.len()))
        else {
            return 0;
        };
        let start = end - bytes.len();
        let mut data = write_lock(&self.data);
        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(bytes);
        bytes.len()
    }

    fn rename(&self, name: &str) -> bool {
        if !self.writable || name.is_empty() {
            return false;
        }
        if let Some(parent) = read_lock(&self.parent).upgrade() {
            if parent.has_child(name) {
                return false;
            }
        }
        *write_lock(&self.name) = name.to_string();
        true
    }
}

pub struct VectorDirectory {
    name: RwLock<String>,
    files: RwLock<Vec<Arc<VectorFile>>>,
    dirs: RwLock<Vec<Arc<VectorDirectory>>>,
    parent: RwLock<Weak<VectorDirectory>>,
    me: Weak<VectorDirectory>,
    writable: bool,
}

impl VectorDirectory {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_access(name, true)
    }

    /// A directory whose own capability set refuses mutation. Children can still be attached
    /// with [`VectorDirectory::add_file`] while the tree is being assembled.
    pub fn read_only_backing(name: impl Into<String>) -> Arc<Self> {
        Self::with_access(name, false)
    }

    fn with_access(name: impl Into<String>, writable: bool) -> Arc<Self> {
        let name = name.into();
        Arc::new_cyclic(|me| Self {
            name: RwLock::new(name),
            files: RwLock::new(Vec::new()),
            dirs: RwLock::new(Vec::new()),
            parent: RwLock::new(Weak::new()),
            me: me.clone(),
            writable,
        })
    }

    pub fn into_virtual(self: Arc<Self>) -> VirtualDir {
        VirtualDir::Backed(self)
    }

    fn has_child(&self, name: &str) -> bool {
        read_lock(&self.files).iter().any(|f| f.name() == name)
            || read_lock(&self.dirs).iter().any(|d| d.name() == name)
    }

    /// Attaches an existing file. Fails when the name is already taken.
    pub fn add_file(&self, file: Arc<VectorFile>) -> bool {
        if self.has_child(&file.name()) {
            return false;
        }
        file.set_parent(self.me.clone());
        write_lock(&self.files).push(file);
        true
    }

    /// Attaches an existing directory. Fails when the name is already taken.
    pub fn add_directory(&self, dir: Arc<VectorDirectory>) -> bool {
        if self.has_child(&dir.name()) {
            return false;
        }
        *write_lock(&dir.parent) = self.me.clone();
        write_lock(&self.dirs).push(dir);
        true
    }

    fn accepts_child(&self, name: &str) -> bool {
        self.writable && !name.is_empty() && !self.has_child(name)
    }
}

impl DirectoryNode for VectorDirectory {
    fn files(&self) -> Vec<Arc<dyn FileNode>> {
        read_lock(&self.files)
            .iter()
            .map(|f| f.clone() as Arc<dyn FileNode>)
            .collect()
    }

    fn subdirectories(&self) -> Vec<Arc<dyn DirectoryNode>> {
        read_lock(&self.dirs)
            .iter()
            .map(|d| d.clone() as Arc<dyn DirectoryNode>)
            .collect()
    }

    fn name(&self) -> String {
        read_lock(&self.name).clone()
    }

    fn parent_directory(&self) -> Option<Arc<dyn DirectoryNode>> {
        let parent = read_lock(&self.parent).upgrade()?;
        Some(parent)
    }

    fn is_readable(&self) -> bool {
        true
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn create_file(&self, name: &str) -> Option<Arc<dyn FileNode>> {
        if !self.accepts_child(name) {
            return None;
        }
        let file = VectorFile::new(name, Vec::new());
        file.set_parent(self.me.clone());
        write_lock(&self.files).push(file.clone());
        Some(file)
    }

    fn create_subdirectory(&self, name: &str) -> Option<Arc<dyn DirectoryNode>> {
        if !self.accepts_child(name) {
            return None;
        }
        let dir = VectorDirectory::new(name);
        *write_lock(&dir.parent) = self.me.clone();
        write_lock(&self.dirs).push(dir.clone());
        Some(dir)
    }

    fn delete_file(&self, name: &str) -> bool {
        if !self.writable {
            return false;
        }
        let mut files = write_lock(&self.files);
        let Some(idx) = files.iter().position(|f| f.name() == name) else {
            return false;
        };
        let removed = files.remove(idx);
        removed.set_parent(Weak::new());
        true
    }

    fn delete_subdirectory(&self, name: &str) -> bool {
        if !self.writable {
            return false;
        }
        let mut dirs = write_lock(&self.dirs);
        let Some(idx) = dirs.iter().position(|d| d.name() == name) else {
            return false;
        };
        if dirs[idx].has_any_child() {
            return false;
        }
        let removed = dirs.remove(idx);
        *write_lock(&removed.parent) = Weak::new();
        true
    }

    fn rename(&self, name: &str) -> bool {
        if !self.writable || name.is_empty() {
            return false;
        }
        if let Some(parent) = read_lock(&self.parent).upgrade() {
            if parent.has_child(name) {
                return false;
            }
        }
        *write_lock(&self.name) = name.to_string();
        true
    }
}

impl VectorDirectory {
    fn has_any_child(&self) -> bool {
        !read_lock(&self.files).is_empty() || !read_lock(&self.dirs).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_extends_and_read_clamps() {
        let file = VectorFile::new("f", vec![1, 2, 3]);
        assert_eq!(file.write(&[9, 9], 4), 2);
        assert_eq!(file.size(), 6);
        let mut buf = [0u8; 8];
        assert_eq!(file.read(&mut buf, 2), 4);
        assert_eq!(&buf[..4], &[3, 0, 9, 9]);
        assert_eq!(file.read(&mut buf, 100), 0);
    }

    #[test]
    fn resize_truncates_and_zero_fills() {
        let file = VectorFile::new("f", vec![5; 4]);
        assert!(file.resize(2));
        assert!(file.resize(3));
        assert_eq!(file.into_virtual().read_all_bytes(), vec![5, 5, 0]);
    }

    #[test]
    fn read_only_backing_refuses_mutation() {
        let file = VectorFile::read_only_backing("f", vec![1]);
        assert_eq!(file.write(&[2], 0), 0);
        assert!(!file.resize(0));
        let dir = VectorDirectory::read_only_backing("d");
        assert!(dir.create_file("x").is_none());
        assert!(dir.add_file(file));
        assert!(!dir.delete_file("f"));
    }

    #[test]
    fn names_are_unique_within_a_directory() {
        let dir = VectorDirectory::new("d");
        assert!(dir.create_file("a").is_some());
        assert!(dir.create_file("a").is_none());
        assert!(dir.create_subdirectory("a").is_none());
        let b = dir.create_file("b").unwrap();
        assert!(!b.rename("a"));
        assert!(b.rename("c"));
        assert!(dir.file("c").is_some());
    }

    #[test]
    fn parent_links_are_weak_and_cleared_on_removal() {
        let root = VectorDirectory::new("root");
        let sub = root.create_subdirectory("sub").unwrap();
        let file = sub.create_file("f").unwrap();
        assert_eq!(file.full_path(), "root/sub/f");
        assert!(!root.delete_subdirectory("sub"));
        assert!(sub.delete_file("f"));
        assert!(file.containing_directory().is_none());
        assert!(root.delete_subdirectory("sub"));
        assert!(sub.parent_directory().is_none());
    }

    #[test]
    fn dropping_the_root_releases_children() {
        let root = VectorDirectory::new("root");
        let file = root.create_file("f").unwrap();
        drop(root);
        assert!(file.containing_directory().is_none());
    }
}
