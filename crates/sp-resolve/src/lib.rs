//! Request path resolution for sitepath archives.
//!
//! Maps an incoming request URL to the archive entry that should be served,
//! the way a static site host does: directory indexes, extension guessing
//! from the `Accept` header, rebasing onto the manifest's web root, and a
//! catch-all fallback page.
//!
//! # Architecture
//!
//! - [`RequestUrl`] splits a raw URL into its encoded path and the
//!   [`QueryFlags`] that switch manifest behavior off per request
//! - [`accept_extensions`] turns an `Accept` header into extension guesses
//! - [`resolve_entry`] runs the probe sequence against any
//!   [`Archive`](sp_archive::Archive)
//! - [`PathResolver`] bundles a shared archive with its manifest
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sp_archive::FsArchive;
//! use sp_resolve::PathResolver;
//!
//! let resolver = PathResolver::new(Arc::new(FsArchive::new("site".into())));
//! match resolver.resolve_str("/about", Some("text/html")).await? {
//!     Some(entry) => println!("{} ({})", entry.path, entry.kind),
//!     None => println!("not found"),
//! }
//! ```

mod accept;
mod candidate;
mod error;
mod lookup;
mod request;
mod resolver;

pub use accept::accept_extensions;
pub use error::{PathDecodeError, ResolveError};
pub use lookup::Lookup;
pub use request::{QueryFlags, RequestUrl};
pub use resolver::{PathResolver, resolve_entry};
