//! `sitepath resolve` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use sp_archive::{Entry, FsArchive};
use sp_config::{CliSettings, Config};
use sp_resolve::PathResolver;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Request URL (`/path?query` or `dat://key/path?query`).
    url: String,

    /// Accept header (overrides config `resolve.default_accept`).
    #[arg(short, long, env = "SITEPATH_ACCEPT")]
    accept: Option<String>,

    /// Archive root directory (overrides config).
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Manifest filename inside the archive root (overrides config).
    #[arg(long)]
    manifest: Option<String>,

    /// Path to configuration file (default: auto-discover sitepath.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore the site manifest (no web root, no fallback page).
    #[arg(long)]
    no_manifest: bool,

    /// Enable verbose output (log every probe).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ResolveArgs {
    /// Execute the resolve command.
    ///
    /// Returns whether an entry was found.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the manifest fails to load, or
    /// the request path is malformed.
    pub(crate) async fn execute(self, output: &Output) -> Result<bool, CliError> {
        let (config, entry) = self.run().await?;

        output.info(&format!(
            "Archive: {}",
            config.archive_resolved.root.display()
        ));

        if let Some(entry) = entry {
            output.result(&describe(&entry));
            Ok(true)
        } else {
            output.warning("not found");
            Ok(false)
        }
    }

    /// Load configuration and resolve the URL.
    async fn run(self) -> Result<(Config, Option<Entry>), CliError> {
        let cli_settings = CliSettings {
            archive_root: self.archive,
            manifest_name: self.manifest,
            default_accept: self.accept,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let manifest = if self.no_manifest {
            None
        } else {
            config.load_manifest()?
        };
        tracing::debug!(
            root = %config.archive_resolved.root.display(),
            has_manifest = manifest.is_some(),
            "Loaded archive"
        );

        let archive = Arc::new(FsArchive::new(config.archive_resolved.root.clone()));
        let resolver = PathResolver::new(archive).with_manifest(manifest);
        let entry = resolver
            .resolve_str(&self.url, config.resolve.default_accept.as_deref())
            .await?;

        Ok((config, entry))
    }
}

/// Format a resolved entry as `<path> (<kind>, <size> bytes)`.
fn describe(entry: &Entry) -> String {
    format!("{} ({}, {} bytes)", entry.path, entry.kind, entry.size)
}
