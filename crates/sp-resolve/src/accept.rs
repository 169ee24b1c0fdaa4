//! Accept header to file extension guesses.

/// Extensions tried for HTML-ish requests.
const HTML_EXTENSIONS: &[&str] = &[".html", ".md"];

/// Extensions tried for stylesheet requests.
const CSS_EXTENSIONS: &[&str] = &[".css"];

/// Extensions tried for image requests.
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif"];

/// Guess which file extensions to try for an `Accept` header, in probe order.
///
/// The header is split on `,` and each token is compared literally: no
/// whitespace trimming, no parameter or `q`-value parsing. Matching
/// categories are concatenated in a fixed order (html/md, css, images)
/// regardless of their order in the header.
///
/// A missing header behaves like an empty one and yields no guesses; only a
/// header consisting of exactly `*/*` counts as a wildcard.
///
/// # Example
///
/// ```
/// use sp_resolve::accept_extensions;
///
/// assert_eq!(accept_extensions(Some("text/html")), [".html", ".md"]);
/// assert_eq!(accept_extensions(Some("image/*")), [".png", ".jpg", ".jpeg", ".gif"]);
/// assert!(accept_extensions(None).is_empty());
/// ```
pub fn accept_extensions(accept: Option<&str>) -> Vec<&'static str> {
    let tokens: Vec<&str> = accept.unwrap_or_default().split(',').collect();
    let has = |media_type: &str| tokens.iter().any(|token| *token == media_type);

    let mut extensions = Vec::new();
    if has("text/html") || tokens == ["*/*"] {
        extensions.extend_from_slice(HTML_EXTENSIONS);
    }
    if has("text/css") {
        extensions.extend_from_slice(CSS_EXTENSIONS);
    }
    if has("image/*") || has("image/apng") {
        extensions.extend_from_slice(IMAGE_EXTENSIONS);
    }
    extensions
}
