//! Configuration management for sitepath.
//!
//! Parses `sitepath.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. The per-archive
//! site manifest (`dat.json`) is loaded through [`Manifest`].
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `archive.root`
//! - `resolve.default_accept`

mod expand;
mod manifest;

pub use manifest::Manifest;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override archive root directory.
    pub archive_root: Option<PathBuf>,
    /// Override manifest filename.
    pub manifest_name: Option<String>,
    /// Override default Accept header.
    pub default_accept: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sitepath.toml";

/// Default manifest filename inside the archive root.
const DEFAULT_MANIFEST: &str = "dat.json";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Archive configuration (paths are relative strings from TOML).
    archive: ArchiveConfigRaw,
    /// Resolution defaults.
    pub resolve: ResolveConfig,

    /// Resolved archive configuration (set after loading).
    #[serde(skip)]
    pub archive_resolved: ArchiveConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw archive configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ArchiveConfigRaw {
    root: Option<String>,
    manifest: Option<String>,
}

/// Resolved archive configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ArchiveConfig {
    /// Directory served as the archive.
    pub root: PathBuf,
    /// Manifest filename inside the archive root.
    pub manifest_name: String,
}

impl ArchiveConfig {
    /// Manifest file path (`<root>/<manifest_name>`).
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest_name)
    }
}

/// Resolution defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Accept header used when the request carries none.
    pub default_accept: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Manifest parsing error.
    #[error("Manifest parse error: {0}")]
    Manifest(#[from] serde_json::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`archive.root`").
        field: String,
        /// Error message (e.g., "${`SITE_ROOT`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sitepath.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            tracing::debug!(path = %discovered.display(), "Discovered config file");
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load the site manifest from the archive root.
    ///
    /// Returns `Ok(None)` when the archive has no manifest.
    ///
    /// # Errors
    ///
    /// Returns error if the manifest exists but can't be read or parsed.
    pub fn load_manifest(&self) -> Result<Option<Manifest>, ConfigError> {
        Manifest::load(&self.archive_resolved.manifest_path())
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.archive_root {
            self.archive_resolved.root.clone_from(root);
        }
        if let Some(manifest_name) = &settings.manifest_name {
            self.archive_resolved.manifest_name.clone_from(manifest_name);
        }
        if let Some(accept) = &settings.default_accept {
            self.resolve.default_accept = Some(accept.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            archive: ArchiveConfigRaw::default(),
            resolve: ResolveConfig::default(),
            archive_resolved: ArchiveConfig {
                root: base.join("site"),
                manifest_name: DEFAULT_MANIFEST.to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.archive_resolved.manifest_name;
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "archive.manifest cannot be empty".to_owned(),
            ));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ConfigError::Validation(format!(
                "archive.manifest must be a bare filename, got {name:?}"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref root) = self.archive.root {
            self.archive.root = Some(expand::expand_env(root, "archive.root")?);
        }
        if let Some(ref accept) = self.resolve.default_accept {
            self.resolve.default_accept =
                Some(expand::expand_env(accept, "resolve.default_accept")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.archive_resolved = ArchiveConfig {
            root: config_dir.join(self.archive.root.as_deref().unwrap_or("site")),
            manifest_name: self
                .archive
                .manifest
                .clone()
                .unwrap_or_else(|| DEFAULT_MANIFEST.to_owned()),
        };
    }
}
