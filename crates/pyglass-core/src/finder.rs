//! Package discovery on a search path.
//!
//! Classifies what a name points at (regular package, namespace package,
//! single module, compiled extension) and follows editable-install
//! redirection files to the real location.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::LoadError;

/// How the package materializes on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// Directory with an init file.
    Regular,
    /// Directory (or directories) without an init file.
    Namespace,
    /// Single source file.
    Module,
    /// Compiled extension module.
    Compiled,
}

/// Package descriptor returned by the finder.
#[derive(Debug, Clone)]
pub struct Package {
    /// Import name.
    pub name: String,
    /// Top-level filesystem path: the directory for packages, the file for
    /// modules and compiled extensions.
    pub path: PathBuf,
    pub kind: PackageKind,
}

/// Locates packages in an ordered list of search directories.
#[derive(Debug, Clone, Default)]
pub struct Finder {
    search_paths: Vec<PathBuf>,
}

impl Finder {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Finds `name`, trying each search directory in order. A regular
    /// package or module in an earlier directory wins over a namespace
    /// directory anywhere.
    pub fn find(&self, name: &str) -> Result<Package, LoadError> {
        let mut namespace_candidate: Option<PathBuf> = None;

        for search_dir in &self.search_paths {
            let package_dir = search_dir.join(name);
            if package_dir.is_dir() {
                if init_file(&package_dir).is_some() {
                    return Ok(Package {
                        name: name.to_string(),
                        path: package_dir,
                        kind: PackageKind::Regular,
                    });
                }
                namespace_candidate.get_or_insert(package_dir);
            }

            let module_file = search_dir.join(format!("{name}.py"));
            if module_file.is_file() {
                return Ok(Package {
                    name: name.to_string(),
                    path: module_file,
                    kind: PackageKind::Module,
                });
            }

            if let Some(compiled) = find_compiled(search_dir, name) {
                return Ok(Package {
                    name: name.to_string(),
                    path: compiled,
                    kind: PackageKind::Compiled,
                });
            }

            if let Some(found) = self.find_through_editable(search_dir, name)? {
                return Ok(found);
            }
        }

        if let Some(path) = namespace_candidate {
            debug!(package = name, path = %path.display(), "found namespace package");
            return Ok(Package {
                name: name.to_string(),
                path,
                kind: PackageKind::Namespace,
            });
        }

        Err(LoadError::ModuleNotFound {
            name: name.to_string(),
            searched: self.search_paths.clone(),
        })
    }

    /// Editable installs drop redirection files next to site-packages.
    /// Path-style `.pth` files are followed; hook-based formats cannot be
    /// resolved statically and fail loudly.
    fn find_through_editable(
        &self,
        search_dir: &Path,
        name: &str,
    ) -> Result<Option<Package>, LoadError> {
        let Ok(entries) = fs::read_dir(search_dir) else {
            return Ok(None);
        };
        let mut redirects: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_editable_redirect(path, name))
            .collect();
        redirects.sort();

        for redirect in redirects {
            if redirect.extension().is_some_and(|ext| ext == "py") {
                // Setuptools finder hooks register import machinery at
                // runtime; there is no path to follow.
                return Err(LoadError::UnhandledEditableModule {
                    path: redirect,
                    reason: "import-hook redirection".to_string(),
                });
            }
            let content = fs::read_to_string(&redirect).map_err(|source| LoadError::Read {
                path: redirect.clone(),
                source,
            })?;
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if line.starts_with("import ") {
                    return Err(LoadError::UnhandledEditableModule {
                        path: redirect,
                        reason: "import-hook redirection".to_string(),
                    });
                }
                let target_dir = PathBuf::from(line);
                if target_dir.is_dir() {
                    if let Ok(found) = Finder::new(vec![target_dir]).find(name) {
                        return Ok(Some(found));
                    }
                }
            }
            return Err(LoadError::UnhandledEditableModule {
                path: redirect,
                reason: "no usable path entries".to_string(),
            });
        }
        Ok(None)
    }
}

/// The init file of a directory, if present.
pub fn init_file(dir: &Path) -> Option<PathBuf> {
    let init = dir.join("__init__.py");
    init.is_file().then_some(init)
}

/// Compiled extension next to the search dir root: `name.so`, `name.pyd`
/// or tagged variants like `name.cpython-312-x86_64.so`.
fn find_compiled(search_dir: &Path, name: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(search_dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
                return false;
            };
            (filename.ends_with(".so") || filename.ends_with(".pyd"))
                && filename.strip_prefix(name).is_some_and(|rest| rest.starts_with('.'))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

fn is_editable_redirect(path: &Path, name: &str) -> bool {
    let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
        return false;
    };
    filename.starts_with("__editable__")
        && filename.contains(name)
        && (filename.ends_with(".pth") || filename.ends_with(".py"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_find_regular_package() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("pkg/__init__.py"), "");
        let finder = Finder::new(vec![dir.path().to_path_buf()]);
        let package = finder.find("pkg").unwrap();
        assert_eq!(package.kind, PackageKind::Regular);
        assert!(package.path.ends_with("pkg"));
    }

    #[test]
    fn test_find_single_module() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("single.py"), "x = 1\n");
        let finder = Finder::new(vec![dir.path().to_path_buf()]);
        let package = finder.find("single").unwrap();
        assert_eq!(package.kind, PackageKind::Module);
    }

    #[test]
    fn test_find_namespace_package() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("ns/part")).unwrap();
        let finder = Finder::new(vec![dir.path().to_path_buf()]);
        let package = finder.find("ns").unwrap();
        assert_eq!(package.kind, PackageKind::Namespace);
    }

    #[test]
    fn test_regular_wins_over_namespace() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::create_dir_all(first.path().join("pkg")).unwrap();
        write(&second.path().join("pkg/__init__.py"), "");
        let finder = Finder::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(finder.find("pkg").unwrap().kind, PackageKind::Regular);
    }

    #[test]
    fn test_find_compiled_extension() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("speed.cpython-312-x86_64-linux-gnu.so"), "");
        let finder = Finder::new(vec![dir.path().to_path_buf()]);
        assert_eq!(finder.find("speed").unwrap().kind, PackageKind::Compiled);
    }

    #[test]
    fn test_module_not_found() {
        let dir = TempDir::new().unwrap();
        let finder = Finder::new(vec![dir.path().to_path_buf()]);
        let err = finder.find("missing").unwrap_err();
        assert!(matches!(err, LoadError::ModuleNotFound { .. }));
    }

    #[test]
    fn test_editable_pth_redirection() {
        let site = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        write(&src.path().join("pkg/__init__.py"), "");
        write(
            &site.path().join("__editable__.pkg-1.0.pth"),
            &format!("{}\n", src.path().display()),
        );
        let finder = Finder::new(vec![site.path().to_path_buf()]);
        let package = finder.find("pkg").unwrap();
        assert_eq!(package.kind, PackageKind::Regular);
    }

    #[test]
    fn test_editable_hook_format_fails() {
        let site = TempDir::new().unwrap();
        write(
            &site.path().join("__editable__.pkg-1.0.pth"),
            "import __editable___pkg_finder; __editable___pkg_finder.install()\n",
        );
        let finder = Finder::new(vec![site.path().to_path_buf()]);
        let err = finder.find("pkg").unwrap_err();
        assert!(matches!(err, LoadError::UnhandledEditableModule { .. }));
        assert!(err.to_string().contains("import-hook"));
    }
}
