//! Read-only archive abstraction for sitepath.
//!
//! This crate provides the [`Archive`] capability the path resolver probes
//! candidate paths against. Keeping it a trait makes the resolver:
//!
//! - **Testable** with an in-memory archive and probe instrumentation
//! - **Backend independent** (local directory, content-addressed store, ...)
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Archive`] trait with a single async `stat()` method
//! - [`Entry`] stat record annotated with the path that produced it
//! - [`FsArchive`] implementation serving a local directory
//! - [`MockArchive`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use sp_archive::{Archive, FsArchive};
//!
//! let archive = FsArchive::new(PathBuf::from("site"));
//! let entry = archive.stat("/index.html").await?;
//! println!("{} ({} bytes)", entry.path, entry.size);
//! ```

mod archive;
mod fs;
#[cfg(feature = "mock")]
mod mock;

pub use archive::{Archive, ArchiveError, ArchiveErrorKind, Entry, EntryKind};
pub use fs::FsArchive;
#[cfg(feature = "mock")]
pub use mock::MockArchive;
