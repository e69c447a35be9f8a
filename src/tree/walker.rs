//! Filesystem walker for traversing directory structures
//!
//! Children are visited in byte order of their names at every level, so the
//! visiting order never depends on what the filesystem reports. Symbolic
//! links are reported as links and never followed below the root.

use crate::error::HashError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kind of a non-directory entry that contributes to a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafKind {
    File,
    Symlink,
}

/// Filesystem entry types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A regular file or symlink
    Leaf {
        path: PathBuf,
        relative: PathBuf,
        kind: LeafKind,
    },
    /// A directory below the root
    Directory { path: PathBuf, relative: PathBuf },
    /// Anything else: socket, FIFO, device
    Special { path: PathBuf, relative: PathBuf },
}

impl Entry {
    pub fn path(&self) -> &Path {
        match self {
            Entry::Leaf { path, .. }
            | Entry::Directory { path, .. }
            | Entry::Special { path, .. } => path,
        }
    }

    pub fn relative(&self) -> &Path {
        match self {
            Entry::Leaf { relative, .. }
            | Entry::Directory { relative, .. }
            | Entry::Special { relative, .. } => relative,
        }
    }
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Lazily walk the tree in deterministic order.
    ///
    /// The root directory itself is not yielded. A root that is not a
    /// directory is yielded as a single leaf named after its file name.
    /// Stops early if the consumer stops pulling, so callers can cancel
    /// between entries.
    pub fn entries(&self) -> impl Iterator<Item = Result<Entry, HashError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => return Some(Err(HashError::from(e))),
                };
                let file_type = entry.file_type();
                if entry.depth() == 0 && file_type.is_dir() {
                    return None;
                }

                let path = entry.path().to_path_buf();
                let relative = self.relative_path(&path);

                if file_type.is_dir() {
                    Some(Ok(Entry::Directory { path, relative }))
                } else if file_type.is_symlink() {
                    Some(Ok(Entry::Leaf {
                        path,
                        relative,
                        kind: LeafKind::Symlink,
                    }))
                } else if file_type.is_file() {
                    Some(Ok(Entry::Leaf {
                        path,
                        relative,
                        kind: LeafKind::File,
                    }))
                } else {
                    Some(Ok(Entry::Special { path, relative }))
                }
            })
    }

    /// Walk the filesystem and collect all entries
    pub fn walk(&self) -> Result<Vec<Entry>, HashError> {
        self.entries().collect()
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf()),
        }
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn slash_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
