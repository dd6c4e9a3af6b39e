//! Shared path-to-contents map used to avoid reading the same file twice.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::Result;

/// In-memory file contents shared by the host and every transformer within
/// one invocation context.
///
/// Entries are append-only: once a path has contents they are never revised.
/// A transformer that reads a file itself should go through
/// [`CacheFs::read_to_string`] so later readers reuse the contents.
#[derive(Debug, Default)]
pub struct CacheFs {
    entries: DashMap<PathBuf, Arc<str>>,
}

impl CacheFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<str>> {
        self.entries
            .get(path.as_ref())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Records `contents` for `path` unless an entry already exists.
    ///
    /// Returns the contents now held for `path`, which are the existing ones
    /// if the path was already populated.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Arc<str>>) -> Arc<str> {
        let entry = self.entries.entry(path.into()).or_insert(contents.into());
        Arc::clone(entry.value())
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries.contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached contents of `path`, reading and recording them on a
    /// miss.
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Result<Arc<str>> {
        let path = path.as_ref();
        if let Some(contents) = self.get(path) {
            return Ok(contents);
        }

        let contents = fs::read_to_string(path)?;
        Ok(self.insert(path, contents))
    }
}

impl<P, C> FromIterator<(P, C)> for CacheFs
where
    P: Into<PathBuf>,
    C: Into<Arc<str>>,
{
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let cache = CacheFs::new();
        for (path, contents) in iter {
            cache.insert(path, contents);
        }
        cache
    }
}
