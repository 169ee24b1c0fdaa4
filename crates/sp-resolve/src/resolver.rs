//! Request path resolution.
//!
//! Resolution runs in three phases, each a fixed sequence of probes against
//! the archive:
//!
//! 1. **Directory-style** (path ends in `/`): `index.html`, `index.md`, then
//!    the directory itself.
//! 2. **File-style** (otherwise): the bare path, then the bare path with each
//!    extension guessed from the `Accept` header. A directory hit gets one
//!    more chance at `<path>.html` and is kept if that misses.
//! 3. **Fallback page**: when nothing (or only a directory) matched and the
//!    manifest names a fallback page, that page is probed; the earlier
//!    result is kept if it misses.
//!
//! Probes run strictly one after another; the first hit latches and every
//! later probe in the same phase is skipped.

use std::sync::Arc;

use percent_encoding::percent_decode_str;
use sp_archive::{Archive, Entry};
use sp_config::Manifest;

use crate::accept::accept_extensions;
use crate::candidate::candidate_path;
use crate::error::{PathDecodeError, ResolveError};
use crate::lookup::Lookup;
use crate::request::RequestUrl;

/// Resolves request URLs against one archive and its manifest.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use sp_archive::FsArchive;
/// use sp_resolve::PathResolver;
///
/// let resolver = PathResolver::new(Arc::new(FsArchive::new("site".into())))
///     .with_manifest(manifest);
/// if let Some(entry) = resolver.resolve_str("/docs/", Some("text/html")).await? {
///     println!("serving {}", entry.path);
/// }
/// ```
#[derive(Clone)]
pub struct PathResolver {
    archive: Arc<dyn Archive>,
    manifest: Option<Manifest>,
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("manifest", &self.manifest)
            .finish_non_exhaustive()
    }
}

impl PathResolver {
    /// Create a resolver with no manifest.
    #[must_use]
    pub fn new(archive: Arc<dyn Archive>) -> Self {
        Self {
            archive,
            manifest: None,
        }
    }

    /// Set (or clear) the site manifest.
    #[must_use]
    pub fn with_manifest(mut self, manifest: impl Into<Option<Manifest>>) -> Self {
        self.manifest = manifest.into();
        self
    }

    /// Site manifest, if any.
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// Resolve a pre-split request URL.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the path is malformed. A path with no
    /// matching entry yields `Ok(None)`.
    pub async fn resolve(
        &self,
        url: &RequestUrl,
        accept: Option<&str>,
    ) -> Result<Option<Entry>, ResolveError> {
        resolve_entry(self.archive.as_ref(), self.manifest.as_ref(), url, accept).await
    }

    /// Resolve a raw URL string (`/path?query` or `scheme://host/path?query`).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the URL cannot be parsed or its path is
    /// malformed.
    pub async fn resolve_str(
        &self,
        raw_url: &str,
        accept: Option<&str>,
    ) -> Result<Option<Entry>, ResolveError> {
        self.resolve(&RequestUrl::parse(raw_url)?, accept).await
    }
}

/// Find the archive entry to serve for a request.
///
/// Returns the winning entry with its `path` set to the candidate path that
/// matched, or `None` if every probe missed. Archive errors never abort the
/// resolution; each one just counts as a miss.
///
/// # Errors
///
/// Returns [`ResolveError::MalformedPath`] if the URL path contains a `%`
/// that does not start a valid escape, or does not decode to UTF-8.
pub async fn resolve_entry(
    archive: &dyn Archive,
    manifest: Option<&Manifest>,
    url: &RequestUrl,
    accept: Option<&str>,
) -> Result<Option<Entry>, ResolveError> {
    let path = normalize_path(&url.path)?;
    let has_trailing_slash = path.ends_with('/');

    let web_root = manifest
        .and_then(Manifest::web_root)
        .filter(|_| !url.query.disable_web_root);
    let mut prober = Prober {
        archive,
        web_root,
        lookup: Lookup::NotFound,
    };

    if has_trailing_slash {
        prober.try_stat(&format!("{path}index.html")).await;
        prober.try_stat(&format!("{path}index.md")).await;
        prober.try_stat(&path).await;
    } else {
        prober.try_stat(&path).await;
        for ext in accept_extensions(accept) {
            prober.try_stat(&format!("{path}{ext}")).await;
        }

        if prober.lookup.is_dir() {
            let dir = prober.lookup.take();
            prober.try_stat(&format!("{path}.html")).await;
            prober.lookup.restore(dir);
        }
    }

    let fallback_page = manifest
        .and_then(Manifest::fallback_page)
        .filter(|_| !url.query.disable_fallback_page);
    if let Some(fallback_page) = fallback_page
        && (!prober.lookup.is_found() || prober.lookup.is_dir())
    {
        let saved = prober.lookup.take();
        prober.try_stat(fallback_page).await;
        prober.lookup.restore(saved);
    }

    let entry = prober.lookup.into_entry();
    match &entry {
        Some(entry) => tracing::debug!(request = %path, resolved = %entry.path, kind = %entry.kind, "Resolved"),
        None => tracing::debug!(request = %path, "No entry found"),
    }
    Ok(entry)
}

/// Decode the request path into its normalized form.
///
/// The result always starts with `/`. A `?` that only appears after decoding
/// (`%3F`) still ends the path.
fn normalize_path(raw: &str) -> Result<String, ResolveError> {
    let malformed = |source: PathDecodeError| ResolveError::MalformedPath {
        path: raw.to_owned(),
        source,
    };

    check_escapes(raw).map_err(malformed)?;
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|err| malformed(err.into()))?;

    let mut path = decoded.into_owned();
    if let Some(idx) = path.find('?') {
        path.truncate(idx);
    }
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    Ok(path)
}

/// Reject any `%` that is not followed by two hex digits.
fn check_escapes(raw: &str) -> Result<(), PathDecodeError> {
    let bytes = raw.as_bytes();
    for (offset, _) in raw.match_indices('%') {
        let is_escape = bytes
            .get(offset + 1..offset + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !is_escape {
            return Err(PathDecodeError::InvalidEscape { offset });
        }
    }
    Ok(())
}

/// Probe state for a single resolution.
struct Prober<'a> {
    archive: &'a dyn Archive,
    web_root: Option<&'a str>,
    lookup: Lookup,
}

impl Prober<'_> {
    /// Probe one logical path unless an entry is already latched.
    async fn try_stat(&mut self, path: &str) {
        if self.lookup.is_found() {
            return;
        }

        let candidate = candidate_path(path, self.web_root);
        tracing::trace!(path, candidate = %candidate, "Probe");

        match self.archive.stat(&candidate).await {
            Ok(mut entry) => {
                entry.path = candidate;
                self.lookup.record(entry);
            }
            Err(err) => {
                tracing::debug!(candidate = %candidate, error = %err, "Probe missed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sp_archive::{ArchiveErrorKind, MockArchive};

    use super::*;
    use crate::request::QueryFlags;

    async fn resolve(
        archive: &MockArchive,
        manifest: Option<&Manifest>,
        url: &str,
        accept: Option<&str>,
    ) -> Option<Entry> {
        resolve_entry(archive, manifest, &RequestUrl::parse(url).unwrap(), accept)
            .await
            .unwrap()
    }

    fn path_of(entry: Option<Entry>) -> Option<String> {
        entry.map(|e| e.path)
    }

    // Directory-style lookup

    #[tokio::test]
    async fn test_trailing_slash_probe_order() {
        let archive = MockArchive::new();

        let entry = resolve(&archive, None, "/docs/", None).await;

        assert!(entry.is_none());
        assert_eq!(
            archive.probes(),
            vec!["/docs/index.html", "/docs/index.md", "/docs/"]
        );
    }

    #[tokio::test]
    async fn test_trailing_slash_prefers_index_html() {
        let archive = MockArchive::new()
            .with_file("/docs/index.html", 10)
            .with_file("/docs/index.md", 5)
            .with_dir("/docs");

        let entry = resolve(&archive, None, "/docs/", None).await.unwrap();

        assert_eq!(entry.path, "/docs/index.html");
        assert!(entry.is_file());
        assert_eq!(archive.probe_count(), 1);
    }

    #[tokio::test]
    async fn test_trailing_slash_index_md() {
        let archive = MockArchive::new()
            .with_file("/docs/index.md", 5)
            .with_dir("/docs");

        let entry = resolve(&archive, None, "/docs/", None).await;

        assert_eq!(path_of(entry), Some("/docs/index.md".to_owned()));
        assert_eq!(archive.probes(), vec!["/docs/index.html", "/docs/index.md"]);
    }

    #[tokio::test]
    async fn test_trailing_slash_directory_itself() {
        let archive = MockArchive::new().with_dir("/docs");

        let entry = resolve(&archive, None, "/docs/", None).await.unwrap();

        assert_eq!(entry.path, "/docs/");
        assert!(entry.is_dir());
    }

    #[tokio::test]
    async fn test_root_path() {
        let archive = MockArchive::new().with_file("/index.html", 1);

        let entry = resolve(&archive, None, "/", None).await;

        assert_eq!(path_of(entry), Some("/index.html".to_owned()));
    }

    #[tokio::test]
    async fn test_empty_path_is_root() {
        let archive = MockArchive::new().with_file("/index.html", 1);

        let entry = resolve(&archive, None, "dat://abc123", None).await;

        assert_eq!(path_of(entry), Some("/index.html".to_owned()));
    }

    // File-style lookup

    #[tokio::test]
    async fn test_bare_path_first() {
        let archive = MockArchive::new()
            .with_file("/about", 3)
            .with_file("/about.html", 4);

        let entry = resolve(&archive, None, "/about", Some("text/html")).await;

        assert_eq!(path_of(entry), Some("/about".to_owned()));
        assert_eq!(archive.probe_count(), 1);
    }

    #[tokio::test]
    async fn test_html_accept_probe_order() {
        let archive = MockArchive::new();

        let entry = resolve(&archive, None, "/about", Some("image/*,text/html")).await;

        assert!(entry.is_none());
        assert_eq!(
            archive.probes(),
            vec![
                "/about",
                "/about.html",
                "/about.md",
                "/about.png",
                "/about.jpg",
                "/about.jpeg",
                "/about.gif",
            ]
        );
    }

    #[tokio::test]
    async fn test_extension_fallback_md() {
        let archive = MockArchive::new().with_file("/about.md", 7);

        let entry = resolve(&archive, None, "/about", Some("text/html")).await;

        assert_eq!(path_of(entry), Some("/about.md".to_owned()));
        assert_eq!(archive.probes(), vec!["/about", "/about.html", "/about.md"]);
    }

    #[tokio::test]
    async fn test_extension_fallback_image() {
        let archive = MockArchive::new().with_file("/logo.jpeg", 7);

        let entry = resolve(&archive, None, "/logo", Some("image/*")).await;

        assert_eq!(path_of(entry), Some("/logo.jpeg".to_owned()));
        assert_eq!(archive.probe_count(), 4);
    }

    #[tokio::test]
    async fn test_no_accept_probes_bare_path_only() {
        let archive = MockArchive::new().with_file("/about.html", 1);

        let entry = resolve(&archive, None, "/about", None).await;

        assert!(entry.is_none());
        assert_eq!(archive.probes(), vec!["/about"]);
    }

    #[tokio::test]
    async fn test_directory_prefers_html_sibling() {
        let archive = MockArchive::new()
            .with_dir("/foo")
            .with_file("/foo.html", 9);

        let entry = resolve(&archive, None, "/foo", None).await.unwrap();

        assert_eq!(entry.path, "/foo.html");
        assert!(entry.is_file());
        assert_eq!(archive.probes(), vec!["/foo", "/foo.html"]);
    }

    #[tokio::test]
    async fn test_directory_kept_without_html_sibling() {
        let archive = MockArchive::new().with_dir("/foo");

        let entry = resolve(&archive, None, "/foo", None).await.unwrap();

        assert_eq!(entry.path, "/foo");
        assert!(entry.is_dir());
    }

    #[tokio::test]
    async fn test_directory_found_via_extension_retries_html() {
        let archive = MockArchive::new()
            .with_dir("/foo.md")
            .with_file("/foo.html", 2)
            .with_failure("/foo.html", ArchiveErrorKind::Unavailable);

        let entry = resolve(&archive, None, "/foo", Some("text/html")).await.unwrap();

        assert_eq!(entry.path, "/foo.md");
        assert!(entry.is_dir());
        assert_eq!(
            archive.probes(),
            vec!["/foo", "/foo.html", "/foo.md", "/foo.html"]
        );
    }

    // Decoding

    #[tokio::test]
    async fn test_percent_decoded_path() {
        let archive = MockArchive::new().with_file("/a b.html", 1);

        let entry = resolve(&archive, None, "/a%20b.html", None).await;

        assert_eq!(path_of(entry), Some("/a b.html".to_owned()));
    }

    #[tokio::test]
    async fn test_decoded_question_mark_truncates() {
        let archive = MockArchive::new().with_file("/a", 1);

        let entry = resolve(&archive, None, "/a%3Fb=c", None).await;

        assert_eq!(path_of(entry), Some("/a".to_owned()));
    }

    #[tokio::test]
    async fn test_malformed_path_is_error() {
        let archive = MockArchive::new();

        let result = resolve_entry(&archive, None, &RequestUrl::new("/%FF%FE"), None).await;

        assert!(matches!(
            result,
            Err(ResolveError::MalformedPath { ref path, .. }) if path == "/%FF%FE"
        ));
        assert_eq!(archive.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_escape_is_error() {
        let archive = MockArchive::new()
            .with_file("/100%", 1)
            .with_file("/a%ZZ", 1);

        for raw in ["/100%", "/a%ZZ", "/a%4"] {
            let result = resolve_entry(&archive, None, &RequestUrl::new(raw), None).await;

            assert!(
                matches!(
                    result,
                    Err(ResolveError::MalformedPath {
                        ref path,
                        source: PathDecodeError::InvalidEscape { .. },
                    }) if path == raw
                ),
                "{raw} should be rejected"
            );
        }
        assert_eq!(archive.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_escape_from_raw_url() {
        let archive: Arc<dyn Archive> = Arc::new(MockArchive::new().with_file("/100%", 1));
        let resolver = PathResolver::new(archive);

        let result = resolver.resolve_str("dat://abc/100%?disable_web_root=1", None).await;

        assert!(matches!(result, Err(ResolveError::MalformedPath { .. })));
    }

    #[test]
    fn test_check_escapes_offsets() {
        assert!(check_escapes("/a%20b%2F").is_ok());
        assert!(matches!(
            check_escapes("/a%20%%41"),
            Err(PathDecodeError::InvalidEscape { offset: 5 })
        ));
    }

    #[tokio::test]
    async fn test_path_without_leading_slash() {
        let archive = MockArchive::new().with_file("/a.html", 1);

        let entry = resolve_entry(&archive, None, &RequestUrl::new("a.html"), None)
            .await
            .unwrap();

        assert_eq!(path_of(entry), Some("/a.html".to_owned()));
    }

    // Web root

    #[tokio::test]
    async fn test_web_root_root_path() {
        let archive = MockArchive::new().with_dir("docs");
        let manifest = Manifest::default().with_web_root("docs");

        let entry = resolve(&archive, Some(&manifest), "/", None).await.unwrap();

        assert_eq!(entry.path, "docs");
        assert_eq!(
            archive.probes(),
            vec!["docs/index.html", "docs/index.md", "docs"]
        );
    }

    #[tokio::test]
    async fn test_web_root_file_path() {
        let archive = MockArchive::new().with_file("docs/a", 1);
        let manifest = Manifest::default().with_web_root("docs");

        let entry = resolve(&archive, Some(&manifest), "/a", None).await;

        assert_eq!(path_of(entry), Some("docs/a".to_owned()));
        assert_eq!(archive.probes(), vec!["docs/a"]);
    }

    #[tokio::test]
    async fn test_web_root_disabled_by_query() {
        let archive = MockArchive::new().with_file("/a", 1).with_file("docs/a", 1);
        let manifest = Manifest::default().with_web_root("docs");

        let entry = resolve(&archive, Some(&manifest), "/a?disable_web_root=1", None).await;

        assert_eq!(path_of(entry), Some("/a".to_owned()));
        assert_eq!(archive.probes(), vec!["/a"]);
    }

    #[tokio::test]
    async fn test_empty_web_root_ignored() {
        let archive = MockArchive::new().with_file("/a", 1);
        let manifest = Manifest::default().with_web_root("");

        let entry = resolve(&archive, Some(&manifest), "/a", None).await;

        assert_eq!(path_of(entry), Some("/a".to_owned()));
    }

    // Fallback page

    #[tokio::test]
    async fn test_fallback_page_used_when_nothing_found() {
        let archive = MockArchive::new().with_file("/404.html", 3);
        let manifest = Manifest::default().with_fallback_page("/404.html");

        let entry = resolve(&archive, Some(&manifest), "/missing", Some("text/html")).await;

        assert_eq!(path_of(entry), Some("/404.html".to_owned()));
        assert_eq!(
            archive.probes(),
            vec!["/missing", "/missing.html", "/missing.md", "/404.html"]
        );
    }

    #[tokio::test]
    async fn test_fallback_page_missing_yields_none() {
        let archive = MockArchive::new();
        let manifest = Manifest::default().with_fallback_page("/404.html");

        let entry = resolve(&archive, Some(&manifest), "/missing", None).await;

        assert!(entry.is_none());
        assert_eq!(archive.probes(), vec!["/missing", "/404.html"]);
    }

    #[tokio::test]
    async fn test_fallback_page_replaces_directory() {
        let archive = MockArchive::new()
            .with_dir("/app")
            .with_file("/index.html", 3);
        let manifest = Manifest::default().with_fallback_page("/index.html");

        let entry = resolve(&archive, Some(&manifest), "/app", None).await;

        assert_eq!(path_of(entry), Some("/index.html".to_owned()));
    }

    #[tokio::test]
    async fn test_fallback_page_replaces_trailing_slash_directory() {
        let archive = MockArchive::new()
            .with_dir("/app")
            .with_file("/index.html", 3);
        let manifest = Manifest::default().with_fallback_page("/index.html");

        let entry = resolve(&archive, Some(&manifest), "/app/", None).await.unwrap();

        assert_eq!(entry.path, "/index.html");
        assert!(entry.is_file());
        assert_eq!(
            archive.probes(),
            vec!["/app/index.html", "/app/index.md", "/app/", "/index.html"]
        );
    }

    #[tokio::test]
    async fn test_fallback_page_miss_restores_directory() {
        let archive = MockArchive::new().with_dir("/app");
        let manifest = Manifest::default().with_fallback_page("/index.html");

        let entry = resolve(&archive, Some(&manifest), "/app/", None).await.unwrap();

        assert_eq!(entry.path, "/app/");
        assert!(entry.is_dir());
        assert_eq!(
            archive.probes(),
            vec!["/app/index.html", "/app/index.md", "/app/", "/index.html"]
        );
    }

    #[tokio::test]
    async fn test_fallback_page_not_probed_after_file_hit() {
        let archive = MockArchive::new()
            .with_file("/a", 1)
            .with_file("/404.html", 1);
        let manifest = Manifest::default().with_fallback_page("/404.html");

        let entry = resolve(&archive, Some(&manifest), "/a", None).await;

        assert_eq!(path_of(entry), Some("/a".to_owned()));
        assert_eq!(archive.probes(), vec!["/a"]);
    }

    #[tokio::test]
    async fn test_fallback_page_disabled_by_query() {
        let archive = MockArchive::new().with_file("/404.html", 1);
        let manifest = Manifest::default().with_fallback_page("/404.html");

        let entry = resolve(
            &archive,
            Some(&manifest),
            "/missing?disable_fallback_page=1",
            None,
        )
        .await;

        assert!(entry.is_none());
        assert_eq!(archive.probes(), vec!["/missing"]);
    }

    #[tokio::test]
    async fn test_fallback_page_under_web_root() {
        let archive = MockArchive::new().with_file("docs/404.html", 1);
        let manifest = Manifest::default()
            .with_web_root("docs")
            .with_fallback_page("/404.html");

        let entry = resolve(&archive, Some(&manifest), "/missing", None).await;

        assert_eq!(path_of(entry), Some("docs/404.html".to_owned()));
    }

    // Error handling and short-circuit

    #[tokio::test]
    async fn test_archive_errors_are_swallowed() {
        let archive = MockArchive::new()
            .with_failure("/a", ArchiveErrorKind::PermissionDenied)
            .with_failure("/a.html", ArchiveErrorKind::Unavailable)
            .with_file("/a.md", 1);

        let entry = resolve(&archive, None, "/a", Some("text/html")).await;

        assert_eq!(path_of(entry), Some("/a.md".to_owned()));
    }

    #[tokio::test]
    async fn test_short_circuit_after_first_hit() {
        let archive = MockArchive::new()
            .with_file("/a.html", 1)
            .with_file("/a.md", 1)
            .with_file("/a.png", 1);

        let entry = resolve(&archive, None, "/a", Some("text/html,image/*")).await;

        assert_eq!(path_of(entry), Some("/a.html".to_owned()));
        assert_eq!(archive.probes(), vec!["/a", "/a.html"]);
    }

    #[tokio::test]
    async fn test_pre_split_url_flags() {
        let archive = MockArchive::new().with_file("/404.html", 1);
        let manifest = Manifest::default().with_fallback_page("/404.html");
        let url = RequestUrl::new("/missing").with_flags(QueryFlags {
            disable_fallback_page: true,
            ..Default::default()
        });

        let entry = resolve_entry(&archive, Some(&manifest), &url, None)
            .await
            .unwrap();

        assert!(entry.is_none());
    }

    // PathResolver

    #[tokio::test]
    async fn test_path_resolver_resolve_str() {
        let archive = Arc::new(MockArchive::new().with_file("docs/index.html", 1));
        let resolver = PathResolver::new(Arc::clone(&archive) as Arc<dyn Archive>)
            .with_manifest(Manifest::default().with_web_root("docs"));

        let entry = resolver.resolve_str("dat://abc/", None).await.unwrap();

        assert_eq!(path_of(entry), Some("docs/index.html".to_owned()));
        assert_eq!(archive.probe_count(), 1);
    }

    #[tokio::test]
    async fn test_path_resolver_without_manifest() {
        let archive: Arc<dyn Archive> = Arc::new(MockArchive::new().with_file("/a", 1));
        let resolver = PathResolver::new(archive).with_manifest(None);

        assert!(resolver.manifest().is_none());
        let entry = resolver.resolve(&RequestUrl::new("/a"), None).await.unwrap();
        assert_eq!(path_of(entry), Some("/a".to_owned()));
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_share_archive() {
        let archive: Arc<dyn Archive> = Arc::new(
            MockArchive::new()
                .with_file("/a.html", 1)
                .with_file("/b/index.html", 1),
        );
        let resolver = PathResolver::new(archive);

        let (a, b) = tokio::join!(
            resolver.resolve_str("/a", Some("text/html")),
            resolver.resolve_str("/b/", None),
        );

        assert_eq!(path_of(a.unwrap()), Some("/a.html".to_owned()));
        assert_eq!(path_of(b.unwrap()), Some("/b/index.html".to_owned()));
    }

    #[test]
    fn test_resolution_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}

        let resolver = PathResolver::new(Arc::new(MockArchive::new()));
        let url = RequestUrl::new("/");
        let future = resolver.resolve(&url, None);
        assert_send(&future);
    }
}
