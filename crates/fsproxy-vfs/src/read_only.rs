// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Read-only projection over backing nodes

use std::sync::Arc;

use crate::node::{DirectoryNode, FileNode};
use crate::virtual_node::{VirtualDir, VirtualFile};

/// Read-only view of a backing file. Only constructible through [`ReadOnlyFile::wrap`].
#[derive(Clone)]
pub struct ReadOnlyFile {
    base: Arc<dyn FileNode>,
}

/// Read-only view of a backing directory. Only constructible through [`ReadOnlyDirectory::wrap`].
#[derive(Clone)]
pub struct ReadOnlyDirectory {
    base: Arc<dyn DirectoryNode>,
}

impl ReadOnlyFile {
    pub fn wrap(file: VirtualFile) -> VirtualFile {
        match file {
            VirtualFile::Backed(base) => VirtualFile::ReadOnly(Self { base }),
            projected @ VirtualFile::ReadOnly(_) => projected,
        }
    }

    pub fn name(&self) -> String {
        self.base.name()
    }

    pub fn size(&self) -> u64 {
        self.base.size()
    }

    pub fn resize(&self, _new_size: u64) -> bool {
        false
    }

    pub fn containing_directory(&self) -> Option<VirtualDir> {
        self.base
            .containing_directory()
            .map(|dir| ReadOnlyDirectory::wrap(VirtualDir::Backed(dir)))
    }

    pub fn is_readable(&self) -> bool {
        self.base.is_readable()
    }

    pub fn is_writable(&self) -> bool {
        false
    }

    pub fn read(&self, buf: &mut [u8], offset: u64) -> usize {
        self.base.read(buf, offset)
    }

    pub fn write(&self, _data: &[u8], _offset: u64) -> usize {
        0
    }

    pub fn rename(&self, _name: &str) -> bool {
        false
    }

    pub fn full_path(&self) -> String {
        self.base.full_path()
    }
}

impl ReadOnlyDirectory {
    pub fn wrap(dir: VirtualDir) -> VirtualDir {
        match dir {
            VirtualDir::Backed(base) => VirtualDir::ReadOnly(Self { base }),
            projected @ VirtualDir::ReadOnly(_) => projected,
        }
    }

    fn project_file(file: Arc<dyn FileNode>) -> VirtualFile {
        ReadOnlyFile::wrap(VirtualFile::Backed(file))
    }

    fn project_dir(dir: Arc<dyn DirectoryNode>) -> VirtualDir {
        Self::wrap(VirtualDir::Backed(dir))
    }

    pub fn files(&self) -> Vec<VirtualFile> {
        self.base.files().into_iter().map(Self::project_file).collect()
    }

    pub fn subdirectories(&self) -> Vec<VirtualDir> {
        self.base.subdirectories().into_iter().map(Self::project_dir).collect()
    }

    pub fn name(&self) -> String {
        self.base.name()
    }

    pub fn parent_directory(&self) -> Option<VirtualDir> {
        self.base.parent_directory().map(Self::project_dir)
    }

    pub fn file(&self, name: &str) -> Option<VirtualFile> {
        self.base.file(name).map(Self::project_file)
    }

    pub fn subdirectory(&self, name: &str) -> Option<VirtualDir> {
        self.base.subdirectory(name).map(Self::project_dir)
    }

    pub fn size(&self) -> u64 {
        self.base.size()
    }

    pub fn full_path(&self) -> String {
        self.base.full_path()
    }

    pub fn is_readable(&self) -> bool {
        self.base.is_readable()
    }

    pub fn is_writable(&self) -> bool {
        false
    }

    pub fn create_file(&self, _name: &str) -> Option<VirtualFile> {
        None
    }

    pub fn create_subdirectory(&self, _name: &str) -> Option<VirtualDir> {
        None
    }

    pub fn create_file_relative(&self, _path: &str) -> Option<VirtualFile> {
        None
    }

    pub fn create_file_absolute(&self, _path: &str) -> Option<VirtualFile> {
        None
    }

    pub fn create_directory_relative(&self, _path: &str) -> Option<VirtualDir> {
        None
    }

    pub fn create_directory_absolute(&self, _path: &str) -> Option<VirtualDir> {
        None
    }

    pub fn delete_file(&self, _name: &str) -> bool {
        false
    }

    pub fn delete_subdirectory(&self, _name: &str) -> bool {
        false
    }

    pub fn delete_subdirectory_recursive(&self, _name: &str) -> bool {
        false
    }

    pub fn clean_subdirectory_recursive(&self, _name: &str) -> bool {
        false
    }

    pub fn rename(&self, _name: &str) -> bool {
        false
    }

    pub fn copy(&self, _src: &str, _dest: &str) -> bool {
        false
    }
}
