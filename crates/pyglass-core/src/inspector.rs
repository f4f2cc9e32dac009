//! Interface to the dynamic-analysis collaborator.
//!
//! Compiled extensions and modules forced into inspection are analyzed by
//! importing them in a real interpreter, outside this crate. The
//! collaborator returns a module tree indistinguishable from static
//! output, apart from its `analysis` origin field.

use std::path::{Path, PathBuf};

use pyglass_model::Object;

/// Dynamic analysis collaborator: introspect a module by importing it.
pub trait Inspector {
    /// Returns a fully populated module for `name`. `filepath` is the
    /// on-disk location when known; `search_paths` are the import roots
    /// the interpreter should use.
    fn inspect(
        &self,
        name: &str,
        filepath: Option<&Path>,
        search_paths: &[PathBuf],
    ) -> anyhow::Result<Object>;
}
