//! CLI command implementations.

pub(crate) mod extensions;
pub(crate) mod resolve;

pub(crate) use extensions::ExtensionsArgs;
pub(crate) use resolve::ResolveArgs;
