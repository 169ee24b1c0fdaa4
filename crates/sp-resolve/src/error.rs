//! Resolution error types.

/// Error raised for malformed input.
///
/// A path that simply isn't in the archive is not an error; resolution
/// returns `Ok(None)` for that.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The raw URL could not be parsed.
    #[error("Invalid request URL {url:?}: {source}")]
    InvalidUrl {
        /// URL as received.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The request path cannot be percent-decoded.
    #[error("Malformed request path {path:?}: {source}")]
    MalformedPath {
        /// Path as received.
        path: String,
        /// Decoding failure.
        #[source]
        source: PathDecodeError,
    },
}

/// Why a request path failed to decode.
#[derive(Debug, thiserror::Error)]
pub enum PathDecodeError {
    /// A `%` not followed by two hex digits.
    #[error("invalid percent-escape at byte {offset}")]
    InvalidEscape {
        /// Byte offset of the `%`.
        offset: usize,
    },
    /// The decoded bytes are not UTF-8.
    #[error("{0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
