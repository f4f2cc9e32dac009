//! # Pyglass Core - Static Analysis Engine
//!
//! Extracts the public API of Python packages into the Pyglass object
//! model, without importing them.
//!
//! ## Overview
//!
//! Packages are located on a search path, parsed with rustpython, walked
//! into object trees, and stitched into a project-wide collection whose
//! aliases (imports, wildcard re-exports, inherited members) are resolved
//! to a fixed point.
//!
//! ## Example
//!
//! ```no_run
//! use pyglass_core::{load, LoadOptions};
//!
//! let options = LoadOptions {
//!     search_paths: vec!["./src".into()],
//!     resolve_aliases: true,
//!     ..LoadOptions::default()
//! };
//! let loader = load("my_package", options).unwrap();
//! let root = loader.root("my_package").unwrap();
//! println!("{} members", root.members.len());
//! ```
//!
//! ## Architecture
//!
//! 1. **Finding** ([`finder`]) - locate the package on disk
//! 2. **Walking** ([`visitor`]) - per-module AST to object tree
//! 3. **Loading** ([`loader`]) - orchestrate modules and collections
//! 4. **Resolving** ([`resolver`]) - follow aliases across modules
//! 5. **Extending** ([`extensions`]) - lifecycle hooks for collaborators

pub mod error;
pub mod expressions;
pub mod extensions;
pub mod finder;
pub mod git;
pub mod inspector;
pub mod linenos;
pub mod loader;
pub mod resolver;
pub mod testing;
pub mod visitor;

use std::path::Path;

use anyhow::Result;

pub use error::{GitError, LoadError};
pub use extensions::{Agent, Extension, Extensions, HookContext};
pub use finder::{Finder, Package, PackageKind};
pub use git::WorktreeCheckout;
pub use inspector::Inspector;
pub use loader::{LoadOptions, Loader};
pub use resolver::ResolveOptions;
pub use visitor::visit_module;

/// Loads `package` with `options` and returns the loader owning the
/// populated collections. The root module is at `loader.root(package)`.
pub fn load(package: &str, options: LoadOptions) -> Result<Loader> {
    load_with_extensions(package, options, Extensions::new())
}

/// [`load`] with a pre-populated extension registry.
pub fn load_with_extensions(
    package: &str,
    options: LoadOptions,
    extensions: Extensions,
) -> Result<Loader> {
    let mut loader = Loader::new(options).with_extensions(extensions);
    loader.load(package)?;
    Ok(loader)
}

/// Loads `package` out of `repo` at revision `rev`, using a scoped git
/// worktree that is cleaned up before returning.
pub fn load_git(package: &str, repo: &Path, rev: &str, options: LoadOptions) -> Result<Loader> {
    let checkout = WorktreeCheckout::create(repo, rev)?;
    let mut options = options;
    let mut search_paths = checkout.search_paths();
    search_paths.extend(options.search_paths);
    options.search_paths = search_paths;
    let mut loader = Loader::new(options);
    loader.load(package)?;
    Ok(loader)
}
