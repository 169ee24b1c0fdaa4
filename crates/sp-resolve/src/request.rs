//! Request URL splitting and query override flags.

use std::borrow::Cow;
use std::str::FromStr;

use url::{Url, form_urlencoded};

use crate::error::ResolveError;

/// Origin that origin-form targets (`/path?query`) are parsed against.
const LOCAL_ORIGIN: &str = "dat://localhost";

/// Per-request overrides carried in the query string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryFlags {
    /// Skip rebasing lookups onto the manifest's web root.
    pub disable_web_root: bool,
    /// Never probe the manifest's fallback page.
    pub disable_fallback_page: bool,
}

impl QueryFlags {
    /// Extract the override flags from a raw query string (without `?`).
    ///
    /// A flag is set when its key appears with a non-empty value, so
    /// `disable_web_root=1` and `disable_web_root=0` both set it while a bare
    /// `disable_web_root` does not. Unknown keys are ignored.
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()))
    }

    /// Extract the override flags from decoded `key=value` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
        let mut flags = Self::default();
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "disable_web_root" => flags.disable_web_root = true,
                "disable_fallback_page" => flags.disable_fallback_page = true,
                _ => {}
            }
        }
        flags
    }
}

/// A request URL split into its still-encoded path and its override flags.
///
/// Build one from a raw URL with [`RequestUrl::parse`] (or `str::parse`), or
/// from already-parsed parts with [`RequestUrl::new`] and
/// [`RequestUrl::with_flags`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestUrl {
    /// Path component, percent-encoded.
    pub path: String,
    /// Override flags from the query string.
    pub query: QueryFlags,
}

impl RequestUrl {
    /// Create a request URL from an already-split path with no flags set.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: QueryFlags::default(),
        }
    }

    /// Replace the override flags.
    #[must_use]
    pub fn with_flags(mut self, query: QueryFlags) -> Self {
        self.query = query;
        self
    }

    /// Split a raw URL into path and query flags.
    ///
    /// Accepts absolute URLs (`dat://<key>/path?query#fragment`, any
    /// `scheme://authority` prefix) and origin-form targets (`/path?query`).
    /// The fragment is dropped. The path is kept encoded; bad percent-escapes
    /// are reported when it is resolved.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidUrl`] if the URL cannot be parsed.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let parsed = match Url::parse(raw) {
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let separator = if raw.starts_with('/') { "" } else { "/" };
                Url::parse(&format!("{LOCAL_ORIGIN}{separator}{raw}"))
            }
            result => result,
        }
        .map_err(|source| ResolveError::InvalidUrl {
            url: raw.to_owned(),
            source,
        })?;

        Ok(Self {
            path: parsed.path().to_owned(),
            query: QueryFlags::from_pairs(parsed.query_pairs()),
        })
    }
}

impl FromStr for RequestUrl {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
