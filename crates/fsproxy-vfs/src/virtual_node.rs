// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Closed set of node variants handed to the service layer

use std::fmt;
use std::sync::Arc;

use crate::node::{DirectoryNode, FileNode};
use crate::path::split_components;
use crate::read_only::{ReadOnlyDirectory, ReadOnlyFile};

/// A file as seen by the service: either backing storage or a read-only projection of it.
#[derive(Clone)]
pub enum VirtualFile {
    Backed(Arc<dyn FileNode>),
    ReadOnly(ReadOnlyFile),
}

/// A directory as seen by the service: either backing storage or a read-only projection of it.
#[derive(Clone)]
pub enum VirtualDir {
    Backed(Arc<dyn DirectoryNode>),
    ReadOnly(ReadOnlyDirectory),
}

impl VirtualFile {
    pub fn new(node: Arc<dyn FileNode>) -> Self {
        Self::Backed(node)
    }

    /// Projects this file read-only. Projecting a projection returns it unchanged.
    pub fn read_only(self) -> Self {
        ReadOnlyFile::wrap(self)
    }

    pub fn is_read_only_projection(&self) -> bool {
        matches!(self, Self::ReadOnly(_))
    }

    pub fn name(&self) -> String {
        match self {
            Self::Backed(node) => node.name(),
            Self::ReadOnly(ro) => ro.name(),
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Self::Backed(node) => node.size(),
            Self::ReadOnly(ro) => ro.size(),
        }
    }

    pub fn resize(&self, new_size: u64) -> bool {
        match self {
            Self::Backed(node) => node.resize(new_size),
            Self::ReadOnly(ro) => ro.resize(new_size),
        }
    }

    pub fn containing_directory(&self) -> Option<VirtualDir> {
        match self {
            Self::Backed(node) => node.containing_directory().map(VirtualDir::Backed),
            Self::ReadOnly(ro) => ro.containing_directory(),
        }
    }

    pub fn is_readable(&self) -> bool {
        match self {
            Self::Backed(node) => node.is_readable(),
            Self::ReadOnly(ro) => ro.is_readable(),
        }
    }

    pub fn is_writable(&self) -> bool {
        match self {
            Self::Backed(node) => node.is_writable(),
            Self::ReadOnly(ro) => ro.is_writable(),
        }
    }

    pub fn read(&self, buf: &mut [u8], offset: u64) -> usize {
        match self {
            Self::Backed(node) => node.read(buf, offset),
            Self::ReadOnly(ro) => ro.read(buf, offset),
        }
    }

    pub fn write(&self, data: &[u8], offset: u64) -> usize {
        match self {
            Self::Backed(node) => node.write(data, offset),
            Self::ReadOnly(ro) => ro.write(data, offset),
        }
    }

    pub fn rename(&self, name: &str) -> bool {
        match self {
            Self::Backed(node) => node.rename(name),
            Self::ReadOnly(ro) => ro.rename(name),
        }
    }

    pub fn full_path(&self) -> String {
        match self {
            Self::Backed(node) => node.full_path(),
            Self::ReadOnly(ro) => ro.full_path(),
        }
    }

    /// Reads up to `length` bytes at `offset`; the result is truncated to what was available.
    pub fn read_bytes(&self, length: usize, offset: u64) -> Vec<u8> {
        let mut buf = vec![0u8; length];
        let read = self.read(&mut buf, offset);
        buf.truncate(read);
        buf
    }

    pub fn read_all_bytes(&self) -> Vec<u8> {
        self.read_bytes(self.size() as usize, 0)
    }
}

impl VirtualDir {
    pub fn new(node: Arc<dyn DirectoryNode>) -> Self {
        Self::Backed(node)
    }

    /// Projects this directory, and everything reachable from it, read-only.
    pub fn read_only(self) -> Self {
        ReadOnlyDirectory::wrap(self)
    }

    pub fn is_read_only_projection(&self) -> bool {
        matches!(self, Self::ReadOnly(_))
    }

    pub fn files(&self) -> Vec<VirtualFile> {
        match self {
            Self::Backed(node) => node.files().into_iter().map(VirtualFile::Backed).collect(),
            Self::ReadOnly(ro) => ro.files(),
        }
    }

    pub fn subdirectories(&self) -> Vec<VirtualDir> {
        match self {
            Self::Backed(node) => {
                node.subdirectories().into_iter().map(VirtualDir::Backed).collect()
            }
            Self::ReadOnly(ro) => ro.subdirectories(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Backed(node) => node.name(),
            Self::ReadOnly(ro) => ro.name(),
        }
    }

    pub fn parent_directory(&self) -> Option<VirtualDir> {
        match self {
            Self::Backed(node) => node.parent_directory().map(VirtualDir::Backed),
            Self::ReadOnly(ro) => ro.parent_directory(),
        }
    }

    pub fn file(&self, name: &str) -> Option<VirtualFile> {
        match self {
            Self::Backed(node) => node.file(name).map(VirtualFile::Backed),
            Self::ReadOnly(ro) => ro.file(name),
        }
    }

    pub fn subdirectory(&self, name: &str) -> Option<VirtualDir> {
        match self {
            Self::Backed(node) => node.subdirectory(name).map(VirtualDir::Backed),
            Self::ReadOnly(ro) => ro.subdirectory(name),
        }
    }

    pub fn is_readable(&self) -> bool {
        match self {
            Self::Backed(node) => node.is_readable(),
            Self::ReadOnly(ro) => ro.is_readable(),
        }
    }

    pub fn is_writable(&self) -> bool {
        match self {
            Self::Backed(node) => node.is_writable(),
            Self::ReadOnly(ro) => ro.is_writable(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_directory().is_none()
    }

    pub fn size(&self) -> u64 {
        match self {
            Self::Backed(node) => node.size(),
            Self::ReadOnly(ro) => ro.size(),
        }
    }

    pub fn full_path(&self) -> String {
        match self {
            Self::Backed(node) => node.full_path(),
            Self::ReadOnly(ro) => ro.full_path(),
        }
    }

    // Path lookups walk through `file` / `subdirectory` / `parent_directory`, all of which
    // already re-wrap projected children, so they need no per-variant handling.

    pub fn file_relative(&self, path: &str) -> Option<VirtualFile> {
        let components = split_components(path);
        let (last, dirs) = components.split_last()?;
        let mut dir = self.clone();
        for component in dirs {
            dir = dir.subdirectory(component)?;
        }
        dir.file(last)
    }

    pub fn file_absolute(&self, path: &str) -> Option<VirtualFile> {
        match self.parent_directory() {
            Some(parent) => parent.file_absolute(path),
            None => self.file_relative(path),
        }
    }

    /// Resolves `path` below this directory. An empty path resolves to this directory.
    pub fn directory_relative(&self, path: &str) -> Option<VirtualDir> {
        let mut dir = self.clone();
        for component in split_components(path) {
            dir = dir.subdirectory(component)?;
        }
        Some(dir)
    }

    pub fn directory_absolute(&self, path: &str) -> Option<VirtualDir> {
        match self.parent_directory() {
            Some(parent) => parent.directory_absolute(path),
            None => self.directory_relative(path),
        }
    }

    pub fn create_file(&self, name: &str) -> Option<VirtualFile> {
        match self {
            Self::Backed(node) => node.create_file(name).map(VirtualFile::Backed),
            Self::ReadOnly(ro) => ro.create_file(name),
        }
    }

    pub fn create_subdirectory(&self, name: &str) -> Option<VirtualDir> {
        match self {
            Self::Backed(node) => node.create_subdirectory(name).map(VirtualDir::Backed),
            Self::ReadOnly(ro) => ro.create_subdirectory(name),
        }
    }

    /// Creates the file at `path`, creating missing intermediate directories.
    pub fn create_file_relative(&self, path: &str) -> Option<VirtualFile> {
        if let Self::ReadOnly(ro) = self {
            return ro.create_file_relative(path);
        }
        let components = split_components(path);
        let (last, dirs) = components.split_last()?;
        let mut dir = self.clone();
        for component in dirs {
            dir = match dir.subdirectory(component) {
                Some(existing) => existing,
                None => dir.create_subdirectory(component)?,
            };
        }
        dir.create_file(last)
    }

    pub fn create_file_absolute(&self, path: &str) -> Option<VirtualFile> {
        if let Self::ReadOnly(ro) = self {
            return ro.create_file_absolute(path);
        }
        match self.parent_directory() {
            Some(parent) => parent.create_file_absolute(path),
            None => self.create_file_relative(path),
        }
    }

    /// Creates every missing directory along `path` and returns the last one.
    pub fn create_directory_relative(&self, path: &str) -> Option<VirtualDir> {
        if let Self::ReadOnly(ro) = self {
            return ro.create_directory_relative(path);
        }
        let components = split_components(path);
        if components.is_empty() {
            return None;
        }
        let mut dir = self.clone();
        for component in components {
            dir = match dir.subdirectory(component) {
                Some(existing) => existing,
                None => dir.create_subdirectory(component)?,
            };
        }
        Some(dir)
    }

    pub fn create_directory_absolute(&self, path: &str) -> Option<VirtualDir> {
        if let Self::ReadOnly(ro) = self {
            return ro.create_directory_absolute(path);
        }
        match self.parent_directory() {
            Some(parent) => parent.create_directory_absolute(path),
            None => self.create_directory_relative(path),
        }
    }

    pub fn delete_file(&self, name: &str) -> bool {
        match self {
            Self::Backed(node) => node.delete_file(name),
            Self::ReadOnly(ro) => ro.delete_file(name),
        }
    }

    /// Removes an empty subdirectory.
    pub fn delete_subdirectory(&self, name: &str) -> bool {
        match self {
            Self::Backed(node) => node.delete_subdirectory(name),
            Self::ReadOnly(ro) => ro.delete_subdirectory(name),
        }
    }

    pub fn delete_subdirectory_recursive(&self, name: &str) -> bool {
        if let Self::ReadOnly(ro) = self {
            return ro.delete_subdirectory_recursive(name);
        }
        if !self.clean_subdirectory_recursive(name) {
            return false;
        }
        self.delete_subdirectory(name)
    }

    /// Removes everything inside the named subdirectory but keeps the subdirectory itself.
    pub fn clean_subdirectory_recursive(&self, name: &str) -> bool {
        if let Self::ReadOnly(ro) = self {
            return ro.clean_subdirectory_recursive(name);
        }
        let Some(dir) = self.subdirectory(name) else {
            return false;
        };
        let mut success = true;
        for file in dir.files() {
            if !dir.delete_file(&file.name()) {
                success = false;
            }
        }
        for sub in dir.subdirectories() {
            if !dir.delete_subdirectory_recursive(&sub.name()) {
                success = false;
            }
        }
        success
    }

    pub fn rename(&self, name: &str) -> bool {
        match self {
            Self::Backed(node) => node.rename(name),
            Self::ReadOnly(ro) => ro.rename(name),
        }
    }

    /// Copies file `src` to a new sibling file `dest`.
    pub fn copy(&self, src: &str, dest: &str) -> bool {
        if let Self::ReadOnly(ro) = self {
            return ro.copy(src, dest);
        }
        let Some(source) = self.file(src) else {
            return false;
        };
        let Some(target) = self.create_file(dest) else {
            return false;
        };
        if !target.resize(source.size()) {
            self.delete_file(dest);
            return false;
        }
        let data = source.read_all_bytes();
        target.write(&data, 0) as u64 == source.size()
    }
}

impl fmt::Debug for VirtualFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualFile")
            .field("path", &self.full_path())
            .field("read_only", &self.is_read_only_projection())
            .finish()
    }
}

impl fmt::Debug for VirtualDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualDir")
            .field("path", &self.full_path())
            .field("read_only", &self.is_read_only_projection())
            .finish()
    }
}

impl From<Arc<dyn FileNode>> for VirtualFile {
    fn from(node: Arc<dyn FileNode>) -> Self {
        Self::Backed(node)
    }
}

impl From<Arc<dyn DirectoryNode>> for VirtualDir {
    fn from(node: Arc<dyn DirectoryNode>) -> Self {
        Self::Backed(node)
    }
}
