//! Filesystem archive implementation.
//!
//! Provides [`FsArchive`], which serves a local directory as a read-only
//! archive.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::archive::{Archive, ArchiveError, ArchiveErrorKind, Entry, EntryKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Directory-backed archive.
///
/// Archive paths are resolved relative to `root`. The leading `/` of an
/// archive path is optional; `"/"` and `""` both name the root itself.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use sp_archive::{Archive, FsArchive};
///
/// let archive = FsArchive::new(PathBuf::from("site"));
/// let entry = archive.stat("/index.html").await?;
/// ```
#[derive(Clone, Debug)]
pub struct FsArchive {
    /// Root directory of the archive.
    root: PathBuf,
}

impl FsArchive {
    /// Create a new filesystem archive rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of the archive.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an archive path to a filesystem path under the root.
    ///
    /// Rejects paths containing parent directory components (`..`) so that
    /// lookups cannot escape the archive root.
    fn resolve(&self, path: &str) -> Result<PathBuf, ArchiveError> {
        let relative = Path::new(path.trim_start_matches('/'));

        let mut full = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => full.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ArchiveError::new(ArchiveErrorKind::InvalidPath)
                        .with_path(path)
                        .with_backend(BACKEND));
                }
            }
        }

        Ok(full)
    }
}

#[async_trait]
impl Archive for FsArchive {
    async fn stat(&self, path: &str) -> Result<Entry, ArchiveError> {
        let full = self.resolve(path)?;

        let metadata = tokio::fs::metadata(&full)
            .await
            .map_err(|e| ArchiveError::io(e, Some(PathBuf::from(path))).with_backend(BACKEND))?;

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            // Sockets, fifos and the like are never served
            return Err(ArchiveError::not_found(path).with_backend(BACKEND));
        };

        tracing::trace!(path, fs_path = %full.display(), %kind, "Stat archive entry");

        Ok(Entry {
            path: path.to_owned(),
            kind,
            size: if kind == EntryKind::File {
                metadata.len()
            } else {
                0
            },
            modified: metadata.modified().ok(),
        })
    }
}
