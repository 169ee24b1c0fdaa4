//! Site manifest (`dat.json`).
//!
//! The manifest is owned by the site author and lives at the archive root.
//! Only the fields that influence path resolution are interpreted; anything
//! else in the file is ignored.

use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Per-archive site configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Manifest {
    /// Site title.
    pub title: Option<String>,
    /// Site description.
    pub description: Option<String>,
    /// Path prefix every lookup is rebased onto.
    pub web_root: Option<String>,
    /// Page served when nothing else (or only a directory) matches.
    pub fallback_page: Option<String>,
}

impl Manifest {
    /// Parse a manifest from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Manifest` if the JSON is malformed or a known
    /// field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a manifest file.
    ///
    /// A missing file is not an error: archives without a manifest simply
    /// get no web root and no fallback page.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file exists but can't be read, or
    /// `ConfigError::Manifest` if it can't be parsed.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No manifest found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let manifest = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            web_root = ?manifest.web_root,
            fallback_page = ?manifest.fallback_page,
            "Loaded manifest"
        );
        Ok(Some(manifest))
    }

    /// Web root, if set to a non-empty value.
    pub fn web_root(&self) -> Option<&str> {
        self.web_root.as_deref().filter(|s| !s.is_empty())
    }

    /// Fallback page, if set to a non-empty value.
    pub fn fallback_page(&self) -> Option<&str> {
        self.fallback_page.as_deref().filter(|s| !s.is_empty())
    }

    /// Set the web root.
    #[must_use]
    pub fn with_web_root(mut self, web_root: impl Into<String>) -> Self {
        self.web_root = Some(web_root.into());
        self
    }

    /// Set the fallback page.
    #[must_use]
    pub fn with_fallback_page(mut self, fallback_page: impl Into<String>) -> Self {
        self.fallback_page = Some(fallback_page.into());
        self
    }
}
