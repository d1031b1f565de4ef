// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Backing nodes over a host directory tree
//!
//! Every node is confined to the root it was opened from: names containing separators or
//! dot components are refused, and the root reports no parent.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::node::{DirectoryNode, FileNode};
use crate::virtual_node::VirtualDir;

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c: char| c == '/' || c == '\\')
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub struct HostDirectory {
    path: RwLock<PathBuf>,
    root: Arc<PathBuf>,
}

pub struct HostFile {
    path: RwLock<PathBuf>,
    root: Arc<PathBuf>,
}

impl HostDirectory {
    /// Opens `root` as the top of a confined tree. The directory must already exist.
    pub fn open_root(root: impl Into<PathBuf>) -> io::Result<Arc<Self>> {
        let root = root.into();
        if !fs::metadata(&root)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Arc::new(Self {
            path: RwLock::new(root.clone()),
            root: Arc::new(root),
        }))
    }

    pub fn into_virtual(self: Arc<Self>) -> VirtualDir {
        VirtualDir::Backed(self)
    }

    fn at(&self, path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            path: RwLock::new(path),
            root: self.root.clone(),
        })
    }

    fn path(&self) -> PathBuf {
        self.path.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn is_root(&self) -> bool {
        self.path() == *self.root
    }

    /// Path of the child `name` when it is a regular file (or directory). Symlinks are never
    /// followed, matching what `entries` lists.
    fn child(&self, name: &str, want_dir: bool) -> Option<PathBuf> {
        if !valid_name(name) {
            return None;
        }
        let path = self.path().join(name);
        let kind = fs::symlink_metadata(&path).ok()?.file_type();
        let matches = if want_dir { kind.is_dir() } else { kind.is_file() };
        matches.then_some(path)
    }

    fn entries(&self, want_dirs: bool) -> Vec<PathBuf> {
        let dir = self.path();
        let read = match fs::read_dir(&dir) {
            Ok(read) => read,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to list host directory");
                return Vec::new();
            }
        };
        let mut paths: Vec<PathBuf> = read
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_type()
                    .map(|t| if want_dirs { t.is_dir() } else { t.is_file() })
                    .unwrap_or(false)
            })
            .map(|entry| entry.path())
            .collect();
        paths.sort();
        paths
    }
}

impl DirectoryNode for HostDirectory {
    fn files(&self) -> Vec<Arc<dyn FileNode>> {
        self.entries(false)
            .into_iter()
            .map(|path| {
                Arc::new(HostFile {
                    path: RwLock::new(path),
                    root: self.root.clone(),
                }) as Arc<dyn FileNode>
            })
            .collect()
    }

    fn subdirectories(&self) -> Vec<Arc<dyn DirectoryNode>> {
        self.entries(true)
            .into_iter()
            .map(|path| self.at(path) as Arc<dyn DirectoryNode>)
            .collect()
    }

    fn name(&self) -> String {
        file_name_of(&self.path())
    }

    fn parent_directory(&self) -> Option<Arc<dyn DirectoryNode>> {
        if self.is_root() {
            return None;
        }
        let parent = self.path().parent()?.to_path_buf();
        Some(self.at(parent))
    }

    fn is_readable(&self) -> bool {
        fs::metadata(self.path()).is_ok()
    }

    fn is_writable(&self) -> bool {
        fs::metadata(self.path())
            .map(|m| !m.permissions().readonly())
            .unwrap_or(false)
    }

    fn file(&self, name: &str) -> Option<Arc<dyn FileNode>> {
        let path = self.child(name, false)?;
        Some(Arc::new(HostFile {
            path: RwLock::new(path),
            root: self.root.clone(),
        }))
    }

    fn subdirectory(&self, name: &str) -> Option<Arc<dyn DirectoryNode>> {
        self.child(name, true).map(|path| self.at(path) as Arc<dyn DirectoryNode>)
    }

    fn create_file(&self, name: &str) -> Option<Arc<dyn FileNode>> {
        if !valid_name(name) {
            return None;
        }
        let path = self.path().join(name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Some(Arc::new(HostFile {
                path: RwLock::new(path),
                root: self.root.clone(),
            })),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to create host file");
                None
            }
        }
    }

    fn create_subdirectory(&self, name: &str) -> Option<Arc<dyn DirectoryNode>> {
        if !valid_name(name) {
            return None;
        }
        let path = self.path().join(name);
        match fs::create_dir(&path) {
            Ok(()) => Some(self.at(path)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to create host directory");
                None
            }
        }
    }

    fn delete_file(&self, name: &str) -> bool {
        let Some(path) = self.child(name, false) else {
            return false;
        };
        fs::remove_file(&path)
            .map_err(|e| warn!(path = %path.display(), error = %e, "failed to delete host file"))
            .is_ok()
    }

    fn delete_subdirectory(&self, name: &str) -> bool {
        let Some(path) = self.child(name, true) else {
            return false;
        };
        fs::remove_dir(&path)
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "failed to delete host directory")
            })
            .is_ok()
    }

    fn rename(&self, name: &str) -> bool {
        if self.is_root() || !valid_name(name) {
            return false;
        }
        let mut current = self.path.write().unwrap_or_else(PoisonError::into_inner);
        let Some(parent) = current.parent() else {
            return false;
        };
        let target = parent.join(name);
        if fs::symlink_metadata(&target).is_ok() {
            return false;
        }
        match fs::rename(&*current, &target) {
            Ok(()) => {
                *current = target;
                true
            }
            Err(e) => {
                warn!(path = %current.display(), error = %e, "failed to rename host directory");
                false
            }
        }
    }

    fn full_path(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }
}

impl HostFile {
    fn path(&self) -> PathBuf {
        self.path.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut file = fs::File::open(self.path())?;
        file.seek(SeekFrom::Start(offset))?;
        let mut total = 0;
        while total < buf.len() {
            let n = file.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    fn write_at(&self, data: &[u8], offset: u64) -> io::Result<usize> {
        let mut file = fs::OpenOptions::new().write(true).open(self.path())?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        file.flush()?;
        Ok(data.len())
    }
}

impl FileNode for HostFile {
    fn name(&self) -> String {
        file_name_of(&self.path())
    }

    fn size(&self) -> u64 {
        fs::metadata(self.path()).map(|m| m.len()).unwrap_or(0)
    }

    fn resize(&self, new_size: u64) -> bool {
        let path = self.path();
        let result = fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_len(new_size));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to resize host file");
                false
            }
        }
    }

    fn containing_directory(&self) -> Option<Arc<dyn DirectoryNode>> {
        let parent = self.path().parent()?.to_path_buf();
        Some(Arc::new(HostDirectory {
            path: RwLock::new(parent),
            root: self.root.clone(),
        }))
    }

    fn is_readable(&self) -> bool {
        fs::File::open(self.path()).is_ok()
    }

    fn is_writable(&self) -> bool {
        fs::metadata(self.path())
            .map(|m| !m.permissions().readonly())
            .unwrap_or(false)
    }

    fn read(&self, buf: &mut [u8], offset: u64) -> usize {
        self.read_at(buf, offset).unwrap_or_else(|e| {
            let path = self.path();
            warn!(path = %path.display(), error = %e, "host file read failed");
            0
        })
    }

    fn write(&self, data: &[u8], offset: u64) -> usize {
        self.write_at(data, offset).unwrap_or_else(|e| {
            let path = self.path();
            warn!(path = %path.display(), error = %e, "host file write failed");
            0
        })
    }

    fn rename(&self, name: &str) -> bool {
        if !valid_name(name) {
            return false;
        }
        let mut current = self.path.write().unwrap_or_else(PoisonError::into_inner);
        let Some(parent) = current.parent() else {
            return false;
        };
        let target = parent.join(name);
        if fs::symlink_metadata(&target).is_ok() {
            return false;
        }
        match fs::rename(&*current, &target) {
            Ok(()) => {
                *current = target;
                true
            }
            Err(e) => {
                warn!(path = %current.display(), error = %e, "failed to rename host file");
                false
            }
        }
    }

    fn full_path(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, VirtualDir) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("save/0000000000000001")).unwrap();
        fs::write(tmp.path().join("save/0000000000000001/data.bin"), b"abcdef").unwrap();
        fs::write(tmp.path().join("top.txt"), b"top").unwrap();
        let root = HostDirectory::open_root(tmp.path()).unwrap().into_virtual();
        (tmp, root)
    }

    #[test]
    fn open_root_rejects_files() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("plain");
        fs::write(&file, b"x").unwrap();
        assert!(HostDirectory::open_root(&file).is_err());
        assert!(HostDirectory::open_root(tmp.path().join("missing")).is_err());
    }

    #[test]
    fn lists_and_reads_host_tree() {
        let (_tmp, root) = setup();
        assert!(root.is_root());
        let names: Vec<String> = root.files().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["top.txt"]);
        let data = root.file_relative("save/0000000000000001/data.bin").unwrap();
        assert_eq!(data.read_bytes(3, 2), b"cde");
        assert_eq!(data.size(), 6);
        assert_eq!(root.size(), 9);
    }

    #[test]
    fn root_has_no_parent_and_dot_names_are_refused() {
        let (_tmp, root) = setup();
        assert!(root.parent_directory().is_none());
        assert!(root.subdirectory("..").is_none());
        assert!(root.file("../top.txt").is_none());
        assert!(root.create_file("..").is_none());
        let save = root.subdirectory("save").unwrap();
        assert!(save.parent_directory().unwrap().is_root());
    }

    #[test]
    fn mutations_hit_the_host() {
        let (tmp, root) = setup();
        let file = root.create_file_relative("new/dir/f.bin").unwrap();
        assert_eq!(file.write(b"xyz", 1), 3);
        assert_eq!(fs::read(tmp.path().join("new/dir/f.bin")).unwrap(), b"\0xyz");
        assert!(file.resize(2));
        assert_eq!(file.size(), 2);
        assert!(file.rename("g.bin"));
        assert!(tmp.path().join("new/dir/g.bin").exists());
        assert!(root.delete_subdirectory_recursive("new"));
        assert!(!tmp.path().join("new").exists());
    }

    #[cfg(unix)]
    #[test]
    fn links_leading_out_of_the_root_are_invisible() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret"), b"host-secret").unwrap();
        let (tmp, root) = setup();
        std::os::unix::fs::symlink(outside.path().join("secret"), tmp.path().join("link")).unwrap();
        std::os::unix::fs::symlink(outside.path(), tmp.path().join("dirlink")).unwrap();

        assert!(root.file("link").is_none());
        assert!(root.subdirectory("dirlink").is_none());
        assert!(root.file_relative("dirlink/secret").is_none());
        assert!(!root.delete_file("link"));
        let files: Vec<String> = root.files().iter().map(|f| f.name()).collect();
        assert_eq!(files, vec!["top.txt"]);
        assert!(outside.path().join("secret").exists());
    }

    #[test]
    fn delete_subdirectory_requires_empty() {
        let (_tmp, root) = setup();
        assert!(!root.delete_subdirectory("save"));
        assert!(root.clean_subdirectory_recursive("save"));
        assert!(root.delete_subdirectory("save"));
    }
}
