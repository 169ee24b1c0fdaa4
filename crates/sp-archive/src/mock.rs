//! Mock archive implementation for testing.
//!
//! Provides [`MockArchive`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::archive::{Archive, ArchiveError, ArchiveErrorKind, Entry, EntryKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Normalize an archive path into a lookup key.
///
/// Leading and trailing slashes are ignored so that `/docs/`, `/docs` and
/// `docs` all name the same entry. The root is the empty key.
fn key_for(path: &str) -> String {
    path.trim_matches('/').to_owned()
}

/// Mock archive for testing.
///
/// Stores entries in memory and records every path passed to `stat`, in
/// order, so tests can assert on probe order and count.
///
/// # Example
///
/// ```ignore
/// use sp_archive::{Archive, MockArchive};
///
/// let archive = MockArchive::new()
///     .with_file("/index.html", 128)
///     .with_dir("/docs");
///
/// let entry = archive.stat("/index.html").await.unwrap();
/// assert_eq!(archive.probes(), vec!["/index.html"]);
/// ```
#[derive(Debug, Default)]
pub struct MockArchive {
    entries: RwLock<HashMap<String, EntryKindAndSize>>,
    failures: RwLock<HashMap<String, ArchiveErrorKind>>,
    probes: Mutex<Vec<String>>,
}

#[derive(Clone, Copy, Debug)]
struct EntryKindAndSize {
    kind: EntryKind,
    size: u64,
}

impl MockArchive {
    /// Create a new empty mock archive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file entry with the given size.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: &str, size: u64) -> Self {
        self.entries.write().unwrap().insert(
            key_for(path),
            EntryKindAndSize {
                kind: EntryKind::File,
                size,
            },
        );
        self
    }

    /// Add a directory entry.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: &str) -> Self {
        self.entries.write().unwrap().insert(
            key_for(path),
            EntryKindAndSize {
                kind: EntryKind::Directory,
                size: 0,
            },
        );
        self
    }

    /// Make lookups of `path` fail with the given error kind.
    ///
    /// Takes precedence over any entry registered for the same path.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, path: &str, kind: ArchiveErrorKind) -> Self {
        self.failures.write().unwrap().insert(key_for(path), kind);
        self
    }

    /// Paths passed to `stat`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    /// Number of `stat` calls so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn probe_count(&self) -> usize {
        self.probes.lock().unwrap().len()
    }

    /// Forget recorded probes.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_probes(&self) {
        self.probes.lock().unwrap().clear();
    }
}

#[async_trait]
impl Archive for MockArchive {
    async fn stat(&self, path: &str) -> Result<Entry, ArchiveError> {
        self.probes.lock().unwrap().push(path.to_owned());

        let key = key_for(path);

        if let Some(kind) = self.failures.read().unwrap().get(&key).copied() {
            return Err(ArchiveError::new(kind)
                .with_path(path)
                .with_backend(BACKEND));
        }

        self.entries
            .read()
            .unwrap()
            .get(&key)
            .map(|stat| Entry {
                path: path.to_owned(),
                kind: stat.kind,
                size: stat.size,
                modified: None,
            })
            .ok_or_else(|| ArchiveError::not_found(path).with_backend(BACKEND))
    }
}
