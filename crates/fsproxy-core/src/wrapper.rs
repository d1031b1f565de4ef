// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Validated, error-typed filesystem operations over a rooted directory
//!
//! The node layer only reports success flags. This wrapper resolves paths against its
//! backing root, checks existence and open modes up front and turns every `false` into an
//! [`FsError`].

use fsproxy_proto::{EntryType, OpenMode};
use fsproxy_vfs::path::{split_components, split_parent};
use fsproxy_vfs::{VirtualDir, VirtualFile};
use tracing::{debug, error};

use crate::error::{FsError, FsResult};

#[derive(Debug)]
pub struct DirectoryServiceWrapper {
    backing: VirtualDir,
}

/// Error for a node-layer refusal: the node is read-only, or the backend simply failed.
fn refusal(writable: bool) -> FsError {
    if writable {
        FsError::OperationFailed
    } else {
        FsError::PermissionDenied
    }
}

impl DirectoryServiceWrapper {
    pub fn new(backing: VirtualDir) -> Self {
        Self { backing }
    }

    pub fn backing(&self) -> &VirtualDir {
        &self.backing
    }

    /// Normalizes a guest path. `.` components are dropped and `..` is rejected.
    fn normalize(path: &str) -> FsResult<String> {
        let mut parts = Vec::new();
        for component in split_components(path) {
            match component {
                "." => {}
                ".." => {
                    debug!(path, "rejecting parent traversal");
                    return Err(FsError::InvalidArgument);
                }
                other => parts.push(other),
            }
        }
        Ok(parts.join("/"))
    }

    /// Resolves the directory holding `path` and the final component's name.
    fn locate(&self, path: &str) -> FsResult<(VirtualDir, String)> {
        let path = Self::normalize(path)?;
        if path.is_empty() {
            return Err(FsError::InvalidArgument);
        }
        let (parent, name) = split_parent(&path);
        let dir = self.backing.directory_relative(parent).ok_or(FsError::EntityNotFound)?;
        Ok((dir, name.to_string()))
    }

    fn exists(dir: &VirtualDir, name: &str) -> bool {
        dir.file(name).is_some() || dir.subdirectory(name).is_some()
    }

    pub fn create_file(&self, path: &str, size: u64) -> FsResult<()> {
        let (dir, name) = self.locate(path)?;
        if Self::exists(&dir, &name) {
            return Err(FsError::PathAlreadyExists);
        }
        let file = dir.create_file(&name).ok_or_else(|| refusal(dir.is_writable()))?;
        if !file.resize(size) {
            let writable = file.is_writable();
            dir.delete_file(&name);
            return Err(refusal(writable));
        }
        Ok(())
    }

    pub fn delete_file(&self, path: &str) -> FsResult<()> {
        let (dir, name) = self.locate(path)?;
        if dir.file(&name).is_none() {
            return Err(FsError::EntityNotFound);
        }
        if !dir.delete_file(&name) {
            return Err(refusal(dir.is_writable()));
        }
        Ok(())
    }

    pub fn create_directory(&self, path: &str) -> FsResult<()> {
        let (dir, name) = self.locate(path)?;
        if Self::exists(&dir, &name) {
            return Err(FsError::PathAlreadyExists);
        }
        dir.create_subdirectory(&name).ok_or_else(|| refusal(dir.is_writable()))?;
        Ok(())
    }

    /// Removes an empty directory.
    pub fn delete_directory(&self, path: &str) -> FsResult<()> {
        let (dir, name) = self.locate(path)?;
        if dir.subdirectory(&name).is_none() {
            return Err(FsError::EntityNotFound);
        }
        if !dir.delete_subdirectory(&name) {
            return Err(refusal(dir.is_writable()));
        }
        Ok(())
    }

    pub fn delete_directory_recursively(&self, path: &str) -> FsResult<()> {
        let (dir, name) = self.locate(path)?;
        if dir.subdirectory(&name).is_none() {
            return Err(FsError::EntityNotFound);
        }
        if !dir.delete_subdirectory_recursive(&name) {
            return Err(refusal(dir.is_writable()));
        }
        Ok(())
    }

    pub fn clean_directory_recursively(&self, path: &str) -> FsResult<()> {
        let (dir, name) = self.locate(path)?;
        if dir.subdirectory(&name).is_none() {
            return Err(FsError::EntityNotFound);
        }
        if !dir.clean_subdirectory_recursive(&name) {
            return Err(refusal(dir.is_writable()));
        }
        Ok(())
    }

    /// Renames within a directory, or moves the bytes when the parents differ.
    pub fn rename_file(&self, src: &str, dst: &str) -> FsResult<()> {
        let (src_dir, src_name) = self.locate(src)?;
        let file = src_dir.file(&src_name).ok_or(FsError::EntityNotFound)?;
        let (dst_dir, dst_name) = self.locate(dst)?;
        if src_dir.full_path() == dst_dir.full_path() && src_name == dst_name {
            return Ok(());
        }
        if Self::exists(&dst_dir, &dst_name) {
            return Err(FsError::PathAlreadyExists);
        }

        if src_dir.full_path() == dst_dir.full_path() {
            if !file.rename(&dst_name) {
                return Err(refusal(file.is_writable()));
            }
            return Ok(());
        }

        if !src_dir.is_writable() {
            return Err(FsError::PermissionDenied);
        }
        let target = dst_dir
            .create_file(&dst_name)
            .ok_or_else(|| refusal(dst_dir.is_writable()))?;
        let data = file.read_all_bytes();
        if !target.resize(data.len() as u64) || target.write(&data, 0) != data.len() {
            dst_dir.delete_file(&dst_name);
            return Err(FsError::OperationFailed);
        }
        if !src_dir.delete_file(&src_name) {
            error!(src, dst, "source survived a move; dropping the copy");
            dst_dir.delete_file(&dst_name);
            return Err(FsError::OperationFailed);
        }
        Ok(())
    }

    /// Renames within a directory, or moves the whole tree when the parents differ.
    pub fn rename_directory(&self, src: &str, dst: &str) -> FsResult<()> {
        let src_path = Self::normalize(src)?;
        let dst_path = Self::normalize(dst)?;
        if dst_path.starts_with(&format!("{}/", src_path)) {
            return Err(FsError::InvalidArgument);
        }
        let (src_dir, src_name) = self.locate(&src_path)?;
        let source = src_dir.subdirectory(&src_name).ok_or(FsError::EntityNotFound)?;
        let (dst_dir, dst_name) = self.locate(&dst_path)?;
        if src_path == dst_path {
            return Ok(());
        }
        if Self::exists(&dst_dir, &dst_name) {
            return Err(FsError::PathAlreadyExists);
        }

        if src_dir.full_path() == dst_dir.full_path() {
            if !source.rename(&dst_name) {
                return Err(refusal(source.is_writable()));
            }
            return Ok(());
        }

        if !src_dir.is_writable() {
            return Err(FsError::PermissionDenied);
        }
        let target = dst_dir
            .create_subdirectory(&dst_name)
            .ok_or_else(|| refusal(dst_dir.is_writable()))?;
        if !copy_tree(&source, &target) {
            dst_dir.delete_subdirectory_recursive(&dst_name);
            return Err(FsError::OperationFailed);
        }
        if !src_dir.delete_subdirectory_recursive(&src_name) {
            // A partially emptied source keeps the copy as the only complete tree.
            if src_dir
                .subdirectory(&src_name)
                .is_some_and(|left| same_tree(&left, &target))
            {
                dst_dir.delete_subdirectory_recursive(&dst_name);
            }
            error!(src, dst, "source survived a move");
            return Err(FsError::OperationFailed);
        }
        Ok(())
    }

    pub fn get_entry_type(&self, path: &str) -> FsResult<EntryType> {
        if Self::normalize(path)?.is_empty() {
            return Ok(EntryType::Directory);
        }
        let (dir, name) = self.locate(path)?;
        if dir.file(&name).is_some() {
            return Ok(EntryType::File);
        }
        if dir.subdirectory(&name).is_some() {
            return Ok(EntryType::Directory);
        }
        Err(FsError::EntityNotFound)
    }

    pub fn open_file(&self, path: &str, mode: OpenMode) -> FsResult<VirtualFile> {
        let (dir, name) = self.locate(path)?;
        let file = dir.file(&name).ok_or(FsError::EntityNotFound)?;
        if mode.needs_read() && !file.is_readable() {
            return Err(FsError::PermissionDenied);
        }
        if mode.needs_write() && !file.is_writable() {
            return Err(FsError::PermissionDenied);
        }
        Ok(file)
    }

    pub fn open_directory(&self, path: &str) -> FsResult<VirtualDir> {
        let path = Self::normalize(path)?;
        self.backing.directory_relative(&path).ok_or(FsError::EntityNotFound)
    }
}

/// Same names and file sizes at every level.
fn same_tree(a: &VirtualDir, b: &VirtualDir) -> bool {
    let files = |d: &VirtualDir| {
        let mut v: Vec<(String, u64)> = d.files().iter().map(|f| (f.name(), f.size())).collect();
        v.sort();
        v
    };
    if files(a) != files(b) {
        return false;
    }
    let (subs_a, subs_b) = (a.subdirectories(), b.subdirectories());
    subs_a.len() == subs_b.len()
        && subs_a.iter().all(|sub| {
            b.subdirectory(&sub.name())
                .is_some_and(|other| same_tree(sub, &other))
        })
}

fn copy_tree(source: &VirtualDir, target: &VirtualDir) -> bool {
    for file in source.files() {
        let Some(copy) = target.create_file(&file.name()) else {
            return false;
        };
        let data = file.read_all_bytes();
        if !copy.resize(data.len() as u64) || copy.write(&data, 0) != data.len() {
            return false;
        }
    }
    for dir in source.subdirectories() {
        let Some(copy) = target.create_subdirectory(&dir.name()) else {
            return false;
        };
        if !copy_tree(&dir, &copy) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsproxy_vfs::{DirectoryNode, FileNode, VectorDirectory, VectorFile};
    use std::sync::Arc;

    /// Writable directory whose own entries cannot be removed.
    struct UndeletableDirectory(Arc<VectorDirectory>);

    impl DirectoryNode for UndeletableDirectory {
        fn files(&self) -> Vec<Arc<dyn FileNode>> {
            self.0.files()
        }
        fn subdirectories(&self) -> Vec<Arc<dyn DirectoryNode>> {
            self.0.subdirectories()
        }
        fn name(&self) -> String {
            DirectoryNode::name(&*self.0)
        }
        fn parent_directory(&self) -> Option<Arc<dyn DirectoryNode>> {
            None
        }
        fn is_readable(&self) -> bool {
            true
        }
        fn is_writable(&self) -> bool {
            true
        }
        fn create_file(&self, name: &str) -> Option<Arc<dyn FileNode>> {
            self.0.create_file(name)
        }
        fn create_subdirectory(&self, name: &str) -> Option<Arc<dyn DirectoryNode>> {
            self.0.create_subdirectory(name)
        }
        fn delete_file(&self, _name: &str) -> bool {
            false
        }
        fn delete_subdirectory(&self, _name: &str) -> bool {
            false
        }
        fn rename(&self, _name: &str) -> bool {
            false
        }
    }

    fn undeletable_root() -> DirectoryServiceWrapper {
        let inner = VectorDirectory::new("");
        inner.add_file(VectorFile::new("slot", b"progress".to_vec()));
        inner.add_directory(VectorDirectory::new("empty"));
        let full = VectorDirectory::new("full");
        full.add_file(VectorFile::new("a", b"abc".to_vec()));
        inner.add_directory(full);
        inner.add_directory(VectorDirectory::new("dst"));
        DirectoryServiceWrapper::new(VirtualDir::new(Arc::new(UndeletableDirectory(inner))))
    }

    fn wrapper() -> DirectoryServiceWrapper {
        let root = VectorDirectory::new("");
        let save = VectorDirectory::new("save");
        save.add_file(VectorFile::new("slot0", b"progress".to_vec()));
        save.add_directory(VectorDirectory::new("empty"));
        root.add_directory(save);
        root.add_file(VectorFile::read_only_backing("locked", b"ro".to_vec()));
        DirectoryServiceWrapper::new(root.into_virtual())
    }

    #[test]
    fn create_file_sizes_and_rejects_duplicates() {
        let w = wrapper();
        w.create_file("/save/new.bin", 16).unwrap();
        assert_eq!(w.open_file("save/new.bin", OpenMode::Read).unwrap().size(), 16);
        assert!(matches!(w.create_file("save//new.bin", 1), Err(FsError::PathAlreadyExists)));
        assert!(matches!(w.create_file("save/empty", 1), Err(FsError::PathAlreadyExists)));
        assert!(matches!(w.create_file("missing/x", 1), Err(FsError::EntityNotFound)));
        assert!(matches!(w.create_file("", 1), Err(FsError::InvalidArgument)));
    }

    #[test]
    fn traversal_is_rejected_and_dot_is_ignored() {
        let w = wrapper();
        assert!(matches!(w.open_directory("save/../.."), Err(FsError::InvalidArgument)));
        assert!(matches!(w.get_entry_type("../etc"), Err(FsError::InvalidArgument)));
        assert_eq!(w.get_entry_type("./save/./slot0").unwrap(), EntryType::File);
    }

    #[test]
    fn entry_types() {
        let w = wrapper();
        assert_eq!(w.get_entry_type("").unwrap(), EntryType::Directory);
        assert_eq!(w.get_entry_type("/").unwrap(), EntryType::Directory);
        assert_eq!(w.get_entry_type("save").unwrap(), EntryType::Directory);
        assert_eq!(w.get_entry_type("\\save\\slot0").unwrap(), EntryType::File);
        assert!(matches!(w.get_entry_type("save/none"), Err(FsError::EntityNotFound)));
    }

    #[test]
    fn open_modes_are_checked_against_node() {
        let w = wrapper();
        assert!(w.open_file("locked", OpenMode::Read).is_ok());
        assert!(matches!(w.open_file("locked", OpenMode::Write), Err(FsError::PermissionDenied)));
        assert!(matches!(w.open_file("locked", OpenMode::Append), Err(FsError::PermissionDenied)));
        assert!(w.open_file("save/slot0", OpenMode::ReadWrite).is_ok());
        assert!(matches!(w.open_file("save/nope", OpenMode::Read), Err(FsError::EntityNotFound)));
    }

    #[test]
    fn directory_lifecycle() {
        let w = wrapper();
        w.create_directory("save/sub").unwrap();
        w.create_file("save/sub/a", 1).unwrap();
        assert!(matches!(w.delete_directory("save/sub"), Err(FsError::OperationFailed)));
        w.clean_directory_recursively("save/sub").unwrap();
        w.delete_directory("save/sub").unwrap();
        assert!(matches!(w.delete_directory("save/sub"), Err(FsError::EntityNotFound)));
        w.delete_directory_recursively("save").unwrap();
        assert!(matches!(w.open_directory("save"), Err(FsError::EntityNotFound)));
    }

    #[test]
    fn rename_file_in_place_and_across_directories() {
        let w = wrapper();
        w.rename_file("save/slot0", "save/slot1").unwrap();
        assert!(w.open_file("save/slot1", OpenMode::Read).is_ok());
        w.rename_file("save/slot1", "save/empty/moved").unwrap();
        let moved = w.open_file("save/empty/moved", OpenMode::Read).unwrap();
        assert_eq!(moved.read_all_bytes(), b"progress");
        assert!(matches!(w.open_file("save/slot1", OpenMode::Read), Err(FsError::EntityNotFound)));
        assert!(matches!(w.rename_file("save/none", "x"), Err(FsError::EntityNotFound)));
    }

    #[test]
    fn rename_directory_moves_tree() {
        let w = wrapper();
        w.create_directory("other").unwrap();
        w.rename_directory("save", "other/save2").unwrap();
        assert_eq!(w.get_entry_type("other/save2/slot0").unwrap(), EntryType::File);
        assert_eq!(w.get_entry_type("other/save2/empty").unwrap(), EntryType::Directory);
        assert!(matches!(w.get_entry_type("save"), Err(FsError::EntityNotFound)));
        assert!(matches!(
            w.rename_directory("other", "other/inner"),
            Err(FsError::InvalidArgument)
        ));
    }

    #[test]
    fn read_only_projection_reports_permission_denied() {
        let w = wrapper();
        let ro = DirectoryServiceWrapper::new(w.backing().clone().read_only());
        assert!(matches!(ro.create_file("save/x", 0), Err(FsError::PermissionDenied)));
        assert!(matches!(ro.create_directory("d"), Err(FsError::PermissionDenied)));
        assert!(matches!(ro.delete_file("save/slot0"), Err(FsError::PermissionDenied)));
        assert!(matches!(
            ro.delete_directory_recursively("save"),
            Err(FsError::PermissionDenied)
        ));
        assert!(matches!(
            ro.rename_file("save/slot0", "save/renamed"),
            Err(FsError::PermissionDenied)
        ));
        assert!(matches!(ro.open_file("save/slot0", OpenMode::Write), Err(FsError::PermissionDenied)));
        let file = ro.open_file("save/slot0", OpenMode::Read).unwrap();
        assert!(file.is_read_only_projection());
        assert!(w.open_file("save/slot0", OpenMode::Read).is_ok());
    }

    #[test]
    fn failed_move_leaves_no_copy_behind() {
        let w = undeletable_root();
        assert!(matches!(w.rename_file("slot", "dst/slot"), Err(FsError::OperationFailed)));
        assert_eq!(w.get_entry_type("slot").unwrap(), EntryType::File);
        assert!(matches!(w.get_entry_type("dst/slot"), Err(FsError::EntityNotFound)));

        assert!(matches!(w.rename_directory("empty", "dst/empty"), Err(FsError::OperationFailed)));
        assert_eq!(w.get_entry_type("empty").unwrap(), EntryType::Directory);
        assert!(matches!(w.get_entry_type("dst/empty"), Err(FsError::EntityNotFound)));
    }

    #[test]
    fn failed_move_of_emptied_source_keeps_the_copy() {
        let w = undeletable_root();
        assert!(matches!(w.rename_directory("full", "dst/full"), Err(FsError::OperationFailed)));
        let kept = w.open_file("dst/full/a", OpenMode::Read).unwrap();
        assert_eq!(kept.read_all_bytes(), b"abc");
    }
}
