//! Archive trait, entry record and error types.
//!
//! Provides the [`Archive`] capability consumed by the path resolver, the
//! [`Entry`] record it returns, and [`ArchiveError`] for unified error
//! handling across backends.
//!
//! # Path Convention
//!
//! All path parameters are **archive paths**, not file paths:
//! - `"/"` or `""` - archive root
//! - `"/index.html"` - file at the root
//! - `"docs/guide.md"` - nested file (leading slash optional)
//!
//! Backends handle the mapping from archive paths to their internal storage.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

/// Kind of archive entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// Stat-like record for a single archive entry.
///
/// Backends fill in `path` with the path they were asked for. Consumers may
/// overwrite it to record which candidate produced the entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Archive path that produced this entry.
    pub path: String,
    /// File or directory.
    pub kind: EntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Last modification time, if the backend tracks it.
    pub modified: Option<SystemTime>,
}

impl Entry {
    /// Create a file entry.
    #[must_use]
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size,
            modified: None,
        }
    }

    /// Create a directory entry.
    #[must_use]
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            size: 0,
            modified: None,
        }
    }

    /// Attach a modification time.
    #[must_use]
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// True if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// True if this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArchiveErrorKind {
    /// Entry does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path (e.g. escapes the archive root).
    InvalidPath,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Other/unknown error category.
    Other,
}

/// Archive error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct ArchiveError {
    kind: ArchiveErrorKind,
    path: Option<PathBuf>,
    backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ArchiveError {
    /// Create a new archive error.
    #[must_use]
    pub fn new(kind: ArchiveErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Semantic error category.
    pub fn kind(&self) -> ArchiveErrorKind {
        self.kind
    }

    /// Path context, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    /// Backend identifier, if any.
    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(ArchiveErrorKind::NotFound).with_path(path)
    }

    /// Create an archive error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory => {
                ArchiveErrorKind::NotFound
            }
            std::io::ErrorKind::PermissionDenied => ArchiveErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidInput | std::io::ErrorKind::InvalidFilename => {
                ArchiveErrorKind::InvalidPath
            }
            _ => ArchiveErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            ArchiveErrorKind::NotFound => "Not found",
            ArchiveErrorKind::PermissionDenied => "Permission denied",
            ArchiveErrorKind::InvalidPath => "Invalid path",
            ArchiveErrorKind::Unavailable => "Unavailable",
            ArchiveErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Read-only archive capability.
///
/// The only operation the resolver needs is `stat`. Implementations must be
/// safe for concurrent reads; independent resolutions share one archive.
#[async_trait]
pub trait Archive: Send + Sync {
    /// Look up the entry at `path`.
    ///
    /// The returned entry's `path` is the path that was requested.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError`] if the entry doesn't exist or can't be read.
    async fn stat(&self, path: &str) -> Result<Entry, ArchiveError>;
}

#[async_trait]
impl<A: Archive + ?Sized> Archive for Arc<A> {
    async fn stat(&self, path: &str) -> Result<Entry, ArchiveError> {
        self.as_ref().stat(path).await
    }
}
