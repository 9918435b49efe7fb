//! Read-only content stores
//!
//! The loader only decides what to fetch. A store maps an opaque key to
//! text and reports a missing key as [`StoreError::NotFound`].

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::StoreError;

/// Maximum size of a single file served by [`FsStore`] (100 KiB)
pub const MAX_CONTENT_SIZE: u64 = 100 * 1024;

/// Key-value lookup of guide and reference bodies
pub trait ContentStore {
    /// Fetch the text stored under `key`
    fn fetch(&self, key: &str) -> Result<String, StoreError>;
}

impl<T: ContentStore + ?Sized> ContentStore for &T {
    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        (**self).fetch(key)
    }
}

impl<T: ContentStore + ?Sized> ContentStore for Box<T> {
    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        (**self).fetch(key)
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, key: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(key.into(), content.into());
    }

    /// Builder form of [`MemoryStore::insert`]
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(key, content);
        self
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentStore for MemoryStore {
    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { key: key.into() })
    }
}

/// Filesystem store; keys are file paths that must live under one of its roots
#[derive(Debug, Clone, Default)]
pub struct FsStore {
    roots: Vec<PathBuf>,
}

impl FsStore {
    /// Create a store serving files below the given roots
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Configured roots
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// The part of `path` below a root must not climb back out
    fn permits(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| {
            path.strip_prefix(root).is_ok_and(|rest| {
                rest.components()
                    .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            })
        })
    }
}

impl ContentStore for FsStore {
    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        let path = Path::new(key);
        let not_found = || StoreError::NotFound { key: key.into() };

        if !self.permits(path) {
            return Err(not_found());
        }

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(source) => {
                return Err(StoreError::Io {
                    key: key.into(),
                    source,
                })
            }
        };

        if !metadata.is_file() {
            return Err(not_found());
        }

        if metadata.len() > MAX_CONTENT_SIZE {
            return Err(StoreError::TooLarge {
                key: key.into(),
                size: metadata.len(),
                limit: MAX_CONTENT_SIZE,
            });
        }

        fs::read_to_string(path).map_err(|source| StoreError::Io {
            key: key.into(),
            source,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new().with_entry("vue", "# Vue");
        assert_eq!(store.fetch("vue").unwrap(), "# Vue");
        assert!(matches!(
            store.fetch("react"),
            Err(StoreError::NotFound { key }) if key == "react"
        ));
    }

    #[test]
    fn test_fs_store_reads_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("guide.md");
        fs::write(&file, "body").unwrap();

        let store = FsStore::new([dir.path()]);
        assert_eq!(store.fetch(&file.to_string_lossy()).unwrap(), "body");
    }

    #[test]
    fn test_fs_store_rejects_outside_root() {
        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let file = other.path().join("secret.md");
        fs::write(&file, "secret").unwrap();

        let store = FsStore::new([root.path()]);
        assert!(matches!(
            store.fetch(&file.to_string_lossy()),
            Err(StoreError::NotFound { .. })
        ));

        let climbing = root.path().join("..").join("secret.md");
        assert!(matches!(
            store.fetch(&climbing.to_string_lossy()),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_fs_store_missing_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new([dir.path()]);
        let missing = dir.path().join("missing.md");
        assert!(matches!(
            store.fetch(&missing.to_string_lossy()),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.fetch(&dir.path().to_string_lossy()),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_fs_store_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("huge.md");
        let size = usize::try_from(MAX_CONTENT_SIZE).unwrap() + 1;
        fs::write(&file, "x".repeat(size)).unwrap();

        let store = FsStore::new([dir.path()]);
        assert!(matches!(
            store.fetch(&file.to_string_lossy()),
            Err(StoreError::TooLarge { .. })
        ));
    }
}
