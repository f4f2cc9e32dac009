//! Loader: drives finding and walking of a package and every reachable
//! submodule, owns the cross-module collections, and triggers alias
//! resolution.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Result};
use pyglass_model::{Analysis, DocstringStyle, LinesCollection, ModuleCollection, Object};
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::extensions::{Agent, Extensions, HookContext};
use crate::finder::{init_file, Finder, Package, PackageKind};
use crate::inspector::Inspector;
use crate::resolver::{self, ResolveOptions};
use crate::visitor::visit_module;

/// Everything `load` can be told to do.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub search_paths: Vec<PathBuf>,
    /// Recurse into submodules.
    pub submodules: bool,
    pub docstring_style: Option<DocstringStyle>,
    /// Fall back to the dynamic collaborator for unanalyzable modules.
    pub allow_inspection: bool,
    /// Inspect every module instead of analyzing statically.
    pub force_inspection: bool,
    /// Run the alias resolver after loading.
    pub resolve_aliases: bool,
    /// Resolve every alias, not just publicly exposed ones.
    pub resolve_implicit: bool,
    /// Resolve aliases whose targets live outside the requested packages.
    /// `None` keeps the conservative default (off).
    pub resolve_external: Option<bool>,
    /// Iteration cap for the resolver's fixed-point loop.
    pub max_iterations: usize,
    /// Keep source lines in the lines collection.
    pub store_source: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            submodules: true,
            docstring_style: None,
            allow_inspection: false,
            force_inspection: false,
            resolve_aliases: false,
            resolve_implicit: false,
            resolve_external: None,
            max_iterations: 5,
            store_source: true,
        }
    }
}

/// Loads packages into a pair of collections and resolves aliases across
/// them. One loader owns its collections; parallel loads need separate
/// loaders.
pub struct Loader {
    pub collection: ModuleCollection,
    pub lines: LinesCollection,
    options: LoadOptions,
    extensions: Extensions,
    inspector: Option<Box<dyn Inspector>>,
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("modules", &self.collection.len())
            .field("options", &self.options)
            .finish()
    }
}

impl Loader {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            collection: ModuleCollection::new(),
            lines: LinesCollection::new(),
            options,
            extensions: Extensions::new(),
            inspector: None,
        }
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_inspector(mut self, inspector: Box<dyn Inspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Root module of an already-loaded package.
    pub fn root(&self, package: &str) -> Option<&Object> {
        self.collection.get(package)
    }

    /// Loads `package` and all reachable submodules, leaving the
    /// collection populated. Re-loading an identical package reuses the
    /// loaded tree; a changed filepath replaces it.
    pub fn load(&mut self, package: &str) -> Result<&Object> {
        let started = Instant::now();
        let finder = Finder::new(self.options.search_paths.clone());
        let descriptor = finder.find(package)?;

        if let Some(existing) = self.collection.get(package) {
            if module_filepath(existing) == descriptor_filepath(&descriptor) {
                debug!(package, "reusing already-loaded package");
                return self
                    .collection
                    .get(package)
                    .ok_or_else(|| anyhow!("package {package} vanished from the collection"));
            }
            // Replacement drops the old subtree along with every cached
            // inheritance map inside it.
            self.collection.remove(package);
        }

        let root = self.load_root(&descriptor)?;
        self.collection.insert(root);

        let ctx = HookContext {
            agent: Agent::Loader,
            module_path: package,
            filepath: None,
        };
        if let Some(root) = self.collection.get_mut(package) {
            self.extensions.call_package_loaded(root, &ctx);
        }

        if self.options.resolve_aliases {
            let resolve_options = ResolveOptions {
                max_iterations: self.options.max_iterations,
                implicit: self.options.resolve_implicit,
                external: self.options.resolve_external.unwrap_or(false),
            };
            resolver::resolve(&mut self.collection, &mut self.extensions, &resolve_options);
        }

        debug!(
            package,
            modules = self.collection.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "package loaded",
        );
        self.collection
            .get(package)
            .ok_or_else(|| anyhow!("package {package} vanished from the collection"))
    }

    fn load_root(&mut self, descriptor: &Package) -> Result<Object> {
        match descriptor.kind {
            PackageKind::Module => {
                self.analyze_module(&descriptor.name, &descriptor.name, &descriptor.path, false)
            }
            PackageKind::Regular => {
                let init = init_file(&descriptor.path)
                    .ok_or_else(|| anyhow!("regular package lost its init file"))?;
                let mut root =
                    self.analyze_module(&descriptor.name, &descriptor.name, &init, true)?;
                if self.options.submodules {
                    self.load_submodules(&mut root, &descriptor.path);
                }
                Ok(root)
            }
            PackageKind::Namespace => {
                let mut root = Object::module(&descriptor.name);
                root.lineno = None;
                root.endlineno = None;
                if self.options.submodules {
                    self.load_submodules(&mut root, &descriptor.path);
                }
                Ok(root)
            }
            PackageKind::Compiled => self.inspect_module(
                &descriptor.name,
                &descriptor.name,
                Some(&descriptor.path),
            ),
        }
    }

    /// Breadth-first walk over the package directory, in sorted order so
    /// loading is deterministic. A failing submodule is logged and
    /// omitted; the load goes on.
    fn load_submodules(&mut self, root: &mut Object, package_dir: &Path) {
        let root_path = root.path.clone();
        let mut queue: VecDeque<(String, PathBuf)> = VecDeque::new();
        queue.push_back((String::new(), package_dir.to_path_buf()));

        while let Some((relative, dir)) = queue.pop_front() {
            for entry in sorted_entries(&dir) {
                let Some(stem) = entry.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if entry.is_dir() {
                    let Some(dirname) = entry.file_name().and_then(|n| n.to_str()) else {
                        continue;
                    };
                    if !is_identifier(dirname) || dirname == "__pycache__" {
                        continue;
                    }
                    let child_relative = join_relative(&relative, dirname);
                    let child_path = format!("{root_path}.{child_relative}");
                    let submodule = match init_file(&entry) {
                        Some(init) => {
                            match self.analyze_module(dirname, &child_path, &init, true) {
                                Ok(module) => module,
                                Err(error) => {
                                    warn!(module = %child_path, %error, "skipping submodule");
                                    continue;
                                }
                            }
                        }
                        None => Object::module(dirname),
                    };
                    attach_submodule(root, &relative, dirname, submodule);
                    queue.push_back((child_relative, entry));
                    continue;
                }

                let Some(filename) = entry.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if filename.ends_with(".py") {
                    if stem == "__init__" || !is_identifier(stem) {
                        continue;
                    }
                    let child_path = format!("{root_path}.{}", join_relative(&relative, stem));
                    match self.analyze_module(stem, &child_path, &entry, false) {
                        Ok(module) => attach_submodule(root, &relative, stem, module),
                        Err(error) => {
                            warn!(module = %child_path, %error, "skipping submodule");
                        }
                    }
                } else if filename.ends_with(".so") || filename.ends_with(".pyd") {
                    let name = stem.split('.').next().unwrap_or(stem);
                    if !is_identifier(name) {
                        continue;
                    }
                    let child_path = format!("{root_path}.{}", join_relative(&relative, name));
                    match self.inspect_module(name, &child_path, Some(&entry)) {
                        Ok(module) => attach_submodule(root, &relative, name, module),
                        Err(error) => {
                            debug!(module = %child_path, %error, "skipping compiled submodule");
                        }
                    }
                }
            }
        }
    }

    fn analyze_module(
        &mut self,
        name: &str,
        path: &str,
        filepath: &Path,
        is_init: bool,
    ) -> Result<Object> {
        if self.options.force_inspection {
            return self.inspect_module(name, path, Some(filepath));
        }
        let source = fs::read_to_string(filepath).map_err(|source| LoadError::Read {
            path: filepath.to_path_buf(),
            source,
        })?;
        if self.options.store_source {
            self.lines.insert(filepath, &source);
        }
        let result = visit_module(
            name,
            path,
            filepath,
            &source,
            is_init,
            self.options.docstring_style,
            &mut self.extensions,
        );
        match result {
            Ok(module) => Ok(module),
            Err(error) if self.options.allow_inspection => {
                debug!(module = path, %error, "static analysis failed, inspecting");
                self.inspect_module(name, path, Some(filepath))
            }
            Err(error) => Err(error),
        }
    }

    fn inspect_module(&mut self, name: &str, path: &str, filepath: Option<&Path>) -> Result<Object> {
        let Some(inspector) = &self.inspector else {
            return Err(LoadError::InspectorRequired {
                name: path.to_string(),
            }
            .into());
        };
        let mut module = inspector.inspect(name, filepath, &self.options.search_paths)?;
        module.path = path.to_string();
        mark_dynamic(&mut module);
        Ok(module)
    }
}

fn mark_dynamic(object: &mut Object) {
    object.analysis = Analysis::Dynamic;
    for member in object.members.values_mut() {
        mark_dynamic(member);
    }
}

fn module_filepath(module: &Object) -> Option<PathBuf> {
    match &module.kind {
        pyglass_model::ObjectKind::Module(data) => data.filepath.clone(),
        _ => None,
    }
}

fn descriptor_filepath(descriptor: &Package) -> Option<PathBuf> {
    match descriptor.kind {
        PackageKind::Regular => init_file(&descriptor.path),
        PackageKind::Namespace => None,
        _ => Some(descriptor.path.clone()),
    }
}

fn attach_submodule(root: &mut Object, relative: &str, name: &str, module: Object) {
    let parent = if relative.is_empty() {
        Some(&mut *root)
    } else {
        root.member_mut(relative)
    };
    if let Some(parent) = parent {
        parent.set_member(name, module);
    }
}

fn join_relative(relative: &str, name: &str) -> String {
    if relative.is_empty() {
        name.to_string()
    } else {
        format!("{relative}.{name}")
    }
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries.filter_map(Result::ok).map(|e| e.path()).collect();
    paths.sort();
    paths
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
