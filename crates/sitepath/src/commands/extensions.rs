//! `sitepath extensions` command implementation.

use clap::Args;
use sp_resolve::accept_extensions;

use crate::output::Output;

/// Arguments for the extensions command.
#[derive(Args)]
pub(crate) struct ExtensionsArgs {
    /// Accept header value (omit to see the behavior for a missing header).
    accept: Option<String>,
}

impl ExtensionsArgs {
    /// Execute the extensions command.
    pub(crate) fn execute(&self, output: &Output) {
        let extensions = accept_extensions(self.accept.as_deref());
        if extensions.is_empty() {
            output.warning("No extensions guessed; only the bare path is probed");
            return;
        }
        for ext in extensions {
            output.result(ext);
        }
    }
}
