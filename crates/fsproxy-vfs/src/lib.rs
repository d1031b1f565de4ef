// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Virtual node layer for fsproxy
//!
//! Backing storage implements the [`FileNode`] / [`DirectoryNode`] capability sets. Everything
//! above this crate talks to the closed [`VirtualFile`] / [`VirtualDir`] variants instead, one of
//! which is the read-only projection. Navigating through a projection always yields another
//! projection, so a caller holding a read-only view can never climb back to a writable node.

pub mod host;
pub mod node;
pub mod path;
pub mod read_only;
pub mod vector;
pub mod virtual_node;

pub use host::HostDirectory;
pub use node::{DirectoryNode, FileNode};
pub use read_only::{ReadOnlyDirectory, ReadOnlyFile};
pub use vector::{VectorDirectory, VectorFile};
pub use virtual_node::{VirtualDir, VirtualFile};
