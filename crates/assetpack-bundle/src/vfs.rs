//! # Virtual Filesystem: Hierarchical View over a Bundle
//!
//! Resource names are flat, slash-delimited strings. [`Filesystem::new`]
//! turns them into an owned tree in one pass: every prefix up to a name's
//! last slash becomes a synthesized directory, every full name a file leaf.
//! The tree is built once and is not kept in sync with later bundle
//! updates.
//!
//! ```text
//! /index.html          /
//! /css/app.css    =>   ├── css/
//! /css/print.css       │   ├── app.css
//!                      │   └── print.css
//!                      └── index.html
//! ```
//!
//! [`File`] handles implement [`std::io::Read`] and [`std::io::Seek`] over
//! the resource's unpacked bytes. The bytes are materialized on first use.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::bundle::Bundle;
use crate::error::FsError;
use crate::resource::Resource;

/// Unix directory type bit.
pub const MODE_DIR: u32 = 0o040000;

/// Mode reported for synthesized directories.
pub const DIR_MODE: u32 = MODE_DIR | 0o777;

/// File or directory attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Base name; `/` for the root.
    pub name: String,
    /// Unpacked size for files, 0 for directories.
    pub size: u64,
    /// Permission bits, with [`MODE_DIR`] set for directories.
    pub mode: u32,
    /// Build-time modification time; the Unix epoch for directories.
    pub modified: SystemTime,
    /// True for synthesized directories.
    pub is_dir: bool,
}

impl Metadata {
    fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: 0,
            mode: DIR_MODE,
            modified: UNIX_EPOCH,
            is_dir: true,
        }
    }

    fn file(name: &str, resource: &Resource) -> Self {
        Self {
            name: name.to_string(),
            size: resource.size(),
            mode: resource.mode(),
            modified: resource.modified(),
            is_dir: false,
        }
    }
}

#[derive(Debug)]
enum Node {
    Dir(DirNode),
    File(Arc<Resource>),
}

#[derive(Debug, Default)]
struct DirNode {
    children: BTreeMap<String, Node>,
}

impl DirNode {
    fn insert(&mut self, resource: &Arc<Resource>) {
        let mut parts: Vec<&str> = resource
            .name()
            .split('/')
            .filter(|p| !p.is_empty())
            .collect();
        let Some(leaf) = parts.pop() else {
            tracing::warn!(name = resource.name(), "resource name has no path components, skipped");
            return;
        };

        let mut dir = self;
        for part in parts {
            let child = dir
                .children
                .entry(part.to_string())
                .or_insert_with(|| Node::Dir(DirNode::default()));
            dir = match child {
                Node::Dir(d) => d,
                Node::File(_) => {
                    tracing::warn!(
                        name = resource.name(),
                        conflict = part,
                        "path component is already a file, resource skipped"
                    );
                    return;
                }
            };
        }

        if matches!(dir.children.get(leaf), Some(Node::Dir(_))) {
            tracing::warn!(
                name = resource.name(),
                "name is already a directory, resource skipped"
            );
            return;
        }
        dir.children
            .insert(leaf.to_string(), Node::File(Arc::clone(resource)));
    }
}

/// Read-only hierarchical view of a bundle.
#[derive(Debug, Default)]
pub struct Filesystem {
    root: DirNode,
}

impl Filesystem {
    /// Build the directory tree from every resource in `bundle`.
    pub fn new(bundle: &Bundle) -> Self {
        let mut root = DirNode::default();
        for resource in bundle {
            root.insert(resource);
        }
        Self { root }
    }

    /// Open a file or directory.
    ///
    /// The leading slash is optional and a trailing slash is ignored; `/`
    /// and the empty path open the root.
    pub fn open(&self, path: &str) -> Result<File<'_>, FsError> {
        let mut node = Entry::Dir(&self.root);
        let mut name = "/";
        for part in path.split('/').filter(|p| !p.is_empty()) {
            let Entry::Dir(dir) = node else {
                return Err(FsError::NotFound(path.to_string()));
            };
            node = match dir.children.get(part) {
                Some(Node::Dir(d)) => Entry::Dir(d),
                Some(Node::File(r)) => Entry::File(r),
                None => return Err(FsError::NotFound(path.to_string())),
            };
            name = part;
        }
        Ok(File {
            path: path.to_string(),
            name: name.to_string(),
            entry: node,
            cursor: None,
        })
    }

    /// Every synthesized path in depth-first name order, root excluded.
    pub fn walk(&self) -> Vec<(String, Metadata)> {
        let mut out = Vec::new();
        walk_inner(&self.root, "", &mut out);
        out
    }
}

fn walk_inner(dir: &DirNode, base: &str, out: &mut Vec<(String, Metadata)>) {
    for (name, node) in &dir.children {
        let path = format!("{base}/{name}");
        match node {
            Node::Dir(d) => {
                out.push((path.clone(), Metadata::dir(name)));
                walk_inner(d, &path, out);
            }
            Node::File(r) => out.push((path, Metadata::file(name, r))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Entry<'fs> {
    Dir(&'fs DirNode),
    File(&'fs Arc<Resource>),
}

/// An open file or directory.
#[derive(Debug)]
pub struct File<'fs> {
    path: String,
    name: String,
    entry: Entry<'fs>,
    cursor: Option<Cursor<Bytes>>,
}

impl<'fs> File<'fs> {
    pub fn is_dir(&self) -> bool {
        matches!(self.entry, Entry::Dir(_))
    }

    /// The path this handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The underlying resource, for file handles.
    pub fn resource(&self) -> Option<&'fs Arc<Resource>> {
        match self.entry {
            Entry::File(r) => Some(r),
            Entry::Dir(_) => None,
        }
    }

    pub fn stat(&self) -> Metadata {
        match self.entry {
            Entry::Dir(_) => Metadata::dir(&self.name),
            Entry::File(r) => Metadata::file(&self.name, r),
        }
    }

    /// Immediate children, in name order.
    pub fn read_dir(&self) -> Result<Vec<Metadata>, FsError> {
        let Entry::Dir(dir) = self.entry else {
            return Err(FsError::NotADirectory(self.path.clone()));
        };
        Ok(dir
            .children
            .iter()
            .map(|(name, node)| match node {
                Node::Dir(_) => Metadata::dir(name),
                Node::File(r) => Metadata::file(name, r),
            })
            .collect())
    }

    fn cursor(&mut self) -> io::Result<&mut Cursor<Bytes>> {
        let cursor = match self.cursor.take() {
            Some(c) => c,
            None => {
                let Entry::File(resource) = self.entry else {
                    return Err(io::Error::other(FsError::IsADirectory(self.path.clone())));
                };
                let bytes = resource.unpacked().map_err(io::Error::other)?;
                Cursor::new(bytes)
            }
        };
        Ok(self.cursor.insert(cursor))
    }
}

impl Read for File<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor()?.read(buf)
    }
}

impl Seek for File<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let cursor = self.cursor()?;
        let len = cursor.get_ref().len() as i128;
        let target = match pos {
            SeekFrom::Start(n) => n as i128,
            SeekFrom::Current(delta) => cursor.position() as i128 + delta as i128,
            SeekFrom::End(delta) => len + delta as i128,
        };
        if target < 0 || target > len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to {target} outside 0..={len}"),
            ));
        }
        cursor.set_position(target as u64);
        Ok(target as u64)
    }
}
