//! Content-addressable digests of directory trees
//!
//! The digest of a tree is computed from the ordered list of its leaf
//! digests only: file bytes and symlink target strings, in sorted traversal
//! order, after filtering. Paths, the root location, permissions, ownership
//! and timestamps never contribute. Every call recomputes from scratch.
//!
//! Filters are evaluated on leaves only; directories are always descended.

use crate::error::HashError;
use crate::ignore::{FilterChain, PathFilter};
use crate::tree::cancel::CancelToken;
use crate::tree::digest::{Algorithm, Digest};
use crate::tree::walker::{slash_path, Entry, LeafKind, Walker};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

/// Digest of a single leaf that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDigest {
    /// Path below the digest root (not part of the digest)
    pub relative: PathBuf,
    pub kind: LeafKind,
    pub digest: Digest,
}

/// Computes directory digests with a fixed algorithm and filter chain.
#[derive(Debug, Default)]
pub struct TreeDigester {
    algorithm: Algorithm,
    filters: FilterChain,
}

impl TreeDigester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Add a filter; a leaf is skipped if any filter excludes it.
    pub fn with_filter(mut self, filter: impl PathFilter + 'static) -> Self {
        self.filters = self.filters.with(filter);
        self
    }

    /// Replace the filter chain.
    pub fn with_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Digest the tree rooted at `root`.
    pub fn digest(&self, root: &Path) -> Result<Digest, HashError> {
        self.digest_with_cancel(root, &CancelToken::new())
    }

    /// Digest the tree rooted at `root`, stopping with [`HashError::Cancelled`]
    /// once `cancel` fires.
    #[instrument(skip(self, cancel), fields(root = %root.display(), algorithm = %self.algorithm))]
    pub fn digest_with_cancel(
        &self,
        root: &Path,
        cancel: &CancelToken,
    ) -> Result<Digest, HashError> {
        let start = Instant::now();
        let (leaves, excluded) = self.collect(root, cancel)?;
        let digest = self.aggregate(&leaves)?;
        info!(
            leaves = leaves.len(),
            excluded,
            digest = %digest,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Computed tree digest"
        );
        Ok(digest)
    }

    /// Ordered per-leaf digests that feed the tree digest.
    pub fn file_digests(&self, root: &Path) -> Result<Vec<FileDigest>, HashError> {
        self.file_digests_with_cancel(root, &CancelToken::new())
    }

    pub fn file_digests_with_cancel(
        &self,
        root: &Path,
        cancel: &CancelToken,
    ) -> Result<Vec<FileDigest>, HashError> {
        self.collect(root, cancel).map(|(leaves, _)| leaves)
    }

    /// Leaf digests plus the number of leaves the filters rejected.
    fn collect(
        &self,
        root: &Path,
        cancel: &CancelToken,
    ) -> Result<(Vec<FileDigest>, usize), HashError> {
        let walker = Walker::new(root);
        let mut leaves = Vec::new();
        let mut excluded = 0usize;

        for entry in walker.entries() {
            if cancel.is_cancelled() {
                debug!(visited = leaves.len(), "Tree digest cancelled");
                return Err(HashError::Cancelled);
            }

            let entry = entry?;
            if let Entry::Directory { relative, .. } = &entry {
                trace!(path = %slash_path(relative), "Descending");
                continue;
            }

            if self.filters.is_excluded(entry.relative()) {
                trace!(path = %slash_path(entry.relative()), "Excluded by filter");
                excluded += 1;
                continue;
            }

            let (path, relative, kind) = match entry {
                Entry::Leaf {
                    path,
                    relative,
                    kind,
                } => (path, relative, kind),
                Entry::Special { path, .. } => return Err(HashError::UnsupportedEntry(path)),
                Entry::Directory { .. } => continue,
            };

            let digest = self.algorithm.digest(&read_leaf(&path, kind)?);
            debug!(path = %slash_path(&relative), kind = ?kind, digest = %digest, "Hashed entry");
            leaves.push(FileDigest {
                relative,
                kind,
                digest,
            });
        }

        debug!(leaves = leaves.len(), excluded, "Collected leaf digests");
        Ok((leaves, excluded))
    }

    /// Fold ordered leaf digests into one digest.
    ///
    /// The digest strings are encoded as a compact JSON array of strings and
    /// digested with the same algorithm.
    pub fn aggregate(&self, leaves: &[FileDigest]) -> Result<Digest, HashError> {
        let list: Vec<&Digest> = leaves.iter().map(|leaf| &leaf.digest).collect();
        let encoded = serde_json::to_vec(&list)?;
        Ok(self.algorithm.digest(&encoded))
    }
}

/// Bytes that represent a leaf: file content, or the symlink's own target.
fn read_leaf(path: &Path, kind: LeafKind) -> Result<Vec<u8>, HashError> {
    match kind {
        LeafKind::File => fs::read(path).map_err(|e| HashError::io(path, e)),
        LeafKind::Symlink => {
            let target = fs::read_link(path).map_err(|e| HashError::io(path, e))?;
            Ok(link_target_bytes(&target))
        }
    }
}

#[cfg(unix)]
fn link_target_bytes(target: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    target.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn link_target_bytes(target: &Path) -> Vec<u8> {
    target.to_string_lossy().into_owned().into_bytes()
}

/// Digest `root` with SHA-256 and the given filters, returning `sha256:<hex>`.
pub fn hash_folder(root: &Path, filters: Vec<Box<dyn PathFilter>>) -> Result<String, HashError> {
    let chain = filters
        .into_iter()
        .fold(FilterChain::new(), |chain, filter| chain.with_boxed(filter));
    let digester = TreeDigester::new().with_filters(chain);
    Ok(digester.digest(root)?.to_string())
}
