//! Scoped test helpers: build a throwaway package on disk, load it, and
//! clean everything up when the value goes out of scope.

use std::fs;
use std::path::Path;

use anyhow::Result;
use pyglass_model::Object;
use tempfile::TempDir;

use crate::inspector::Inspector;
use crate::loader::{LoadOptions, Loader};

/// A loaded package backed by a temp directory. Dropping it removes the
/// directory on every exit path, panics included.
pub struct TemporaryPackage {
    pub loader: Loader,
    name: String,
    dir: TempDir,
}

impl TemporaryPackage {
    /// Root module of the loaded package.
    pub fn root(&self) -> &Object {
        self.loader
            .root(&self.name)
            .expect("temporary package was loaded")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The temporary directory holding the package sources.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Builds a one-file module named `mod` from `source` and loads it.
pub fn temporary_visited_module(source: &str) -> Result<TemporaryPackage> {
    temporary_visited_module_with(source, LoadOptions::default())
}

pub fn temporary_visited_module_with(
    source: &str,
    options: LoadOptions,
) -> Result<TemporaryPackage> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("mod.py"), source)?;
    load_from(dir, "mod", options, None)
}

/// Builds a package from `(relative path, source)` pairs and loads it. An
/// `__init__.py` is created when the file map does not provide one.
pub fn temporary_visited_package(
    name: &str,
    files: &[(&str, &str)],
) -> Result<TemporaryPackage> {
    temporary_visited_package_with(name, files, LoadOptions::default())
}

pub fn temporary_visited_package_with(
    name: &str,
    files: &[(&str, &str)],
    options: LoadOptions,
) -> Result<TemporaryPackage> {
    let dir = TempDir::new()?;
    write_package(dir.path(), name, files)?;
    load_from(dir, name, options, None)
}

/// Like [`temporary_visited_module`], but analyzed through the dynamic
/// collaborator instead of the static walker.
pub fn temporary_inspected_module(
    source: &str,
    inspector: Box<dyn Inspector>,
) -> Result<TemporaryPackage> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("mod.py"), source)?;
    let options = LoadOptions {
        force_inspection: true,
        ..LoadOptions::default()
    };
    load_from(dir, "mod", options, Some(inspector))
}

/// Like [`temporary_visited_package`], but analyzed through the dynamic
/// collaborator instead of the static walker.
pub fn temporary_inspected_package(
    name: &str,
    files: &[(&str, &str)],
    inspector: Box<dyn Inspector>,
) -> Result<TemporaryPackage> {
    let dir = TempDir::new()?;
    write_package(dir.path(), name, files)?;
    let options = LoadOptions {
        force_inspection: true,
        ..LoadOptions::default()
    };
    load_from(dir, name, options, Some(inspector))
}

fn write_package(root: &Path, name: &str, files: &[(&str, &str)]) -> Result<()> {
    let package_dir = root.join(name);
    fs::create_dir_all(&package_dir)?;
    for (relative, source) in files {
        let path = package_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, source)?;
    }
    let init = package_dir.join("__init__.py");
    if !init.is_file() {
        fs::write(init, "")?;
    }
    Ok(())
}

fn load_from(
    dir: TempDir,
    name: &str,
    mut options: LoadOptions,
    inspector: Option<Box<dyn Inspector>>,
) -> Result<TemporaryPackage> {
    options.search_paths.insert(0, dir.path().to_path_buf());
    let mut loader = Loader::new(options);
    if let Some(inspector) = inspector {
        loader = loader.with_inspector(inspector);
    }
    loader.load(name)?;
    Ok(TemporaryPackage {
        loader,
        name: name.to_string(),
        dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_module() {
        let package = temporary_visited_module("def f(): ...\n").unwrap();
        assert!(package.root().get_member("f").is_some());
    }

    #[test]
    fn test_temporary_package_adds_init() {
        let package =
            temporary_visited_package("pkg", &[("util.py", "x = 1\n")]).unwrap();
        assert!(package.loader.collection.contains("pkg.util.x"));
        assert!(package.path().join("pkg/__init__.py").is_file());
    }

    #[test]
    fn test_cleanup_on_drop() {
        let path = {
            let package = temporary_visited_module("x = 1\n").unwrap();
            package.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
