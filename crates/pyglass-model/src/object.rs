//! Object model: the tree of API entities extracted from a package.
//!
//! Every entity is an [`Object`]: shared identity and content fields plus an
//! [`ObjectKind`] payload. Back-references (parent, alias targets, aliases
//! pointing at an object) are dotted-path strings resolved against a
//! [`ModuleCollection`], never owning pointers, so the tree stays acyclic
//! while the model is not.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::docstring::Docstring;
use crate::error::AliasError;
use crate::expr::{Expr, Parameters, TypeParameter};

/// Entity kinds, matching the `kind` discriminator of the JSON dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Module,
    Class,
    Function,
    Attribute,
    TypeAlias,
    Alias,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Module => "module",
            Kind::Class => "class",
            Kind::Function => "function",
            Kind::Attribute => "attribute",
            Kind::TypeAlias => "type_alias",
            Kind::Alias => "alias",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "module" => Some(Kind::Module),
            "class" => Some(Kind::Class),
            "function" => Some(Kind::Function),
            "attribute" => Some(Kind::Attribute),
            "type_alias" => Some(Kind::TypeAlias),
            "alias" => Some(Kind::Alias),
            _ => None,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which analyzer produced an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Analysis {
    Static,
    Dynamic,
}

/// A decorator applied to a function or class, kept as the decorating
/// expression plus its line range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decorator {
    pub value: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineno: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endlineno: Option<usize>,
}

impl Decorator {
    pub fn new(value: Expr, lineno: Option<usize>, endlineno: Option<usize>) -> Self {
        Self {
            value,
            lineno,
            endlineno,
        }
    }

    /// The dotted path of the decorating callable, ignoring call arguments:
    /// `@functools.cache` and `@functools.cache()` both give
    /// `functools.cache`.
    pub fn callable_path(&self) -> String {
        match &self.value {
            Expr::Call { function, .. } => function.to_string(),
            other => other.to_string(),
        }
    }
}

/// One entry of a module's explicit exports list (`__all__`): either a
/// string literal or a name reference the source concatenated in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportItem {
    Literal(String),
    Name { name: String },
}

impl ExportItem {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            ExportItem::Literal(literal) => literal == name,
            ExportItem::Name { .. } => false,
        }
    }
}

/// Module payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModuleData {
    /// Absolute path of the backing file; `None` for namespace modules.
    pub filepath: Option<PathBuf>,
    /// Local name -> absolute target path, one entry per import statement.
    pub imports: IndexMap<String, String>,
    /// Explicit exports (`__all__`), when the source declares one.
    pub exports: Option<Vec<ExportItem>>,
    /// Backed by an `__init__` file.
    pub is_init: bool,
}

/// Class payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassData {
    pub bases: Vec<Expr>,
    /// Keyword arguments to the base list (`class C(Base, metaclass=M)`).
    pub keywords: Vec<Expr>,
    pub decorators: Vec<Decorator>,
    pub type_parameters: Vec<TypeParameter>,
    /// Constructor parameter list, populated from `__init__` when present.
    pub parameters: Option<Parameters>,
    /// Overloaded signatures collected per method name.
    pub overloads: IndexMap<String, Vec<Object>>,
}

/// Function payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionData {
    pub parameters: Parameters,
    pub returns: Option<Expr>,
    pub decorators: Vec<Decorator>,
    pub type_parameters: Vec<TypeParameter>,
    /// Sibling `@overload` declarations preceding this one.
    pub overloads: Vec<Object>,
    /// For properties: the bound setter / deleter functions.
    pub setter: Option<Box<Object>>,
    pub deleter: Option<Box<Object>>,
}

/// Attribute payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeData {
    pub annotation: Option<Expr>,
    pub value: Option<Expr>,
    pub setter: Option<Box<Object>>,
    pub deleter: Option<Box<Object>>,
}

/// Type alias payload (`type X[T] = ...`).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasData {
    pub value: Expr,
    pub type_parameters: Vec<TypeParameter>,
}

/// Alias payload: a symbolic indirection to another entity by path.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasData {
    /// Target path as spelled by the import (or inheritance source).
    pub target: String,
    /// Created by a wildcard import; expanded at resolution time.
    pub wildcard: bool,
    /// Created by inherited-member computation.
    pub inherited: bool,
    /// Final target path, cached once a chain fully resolves.
    pub resolved: Option<String>,
}

impl AliasData {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            wildcard: false,
            inherited: false,
            resolved: None,
        }
    }
}

/// Kind payload of an [`Object`].
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Module(ModuleData),
    Class(ClassData),
    Function(FunctionData),
    Attribute(AttributeData),
    TypeAlias(TypeAliasData),
    Alias(AliasData),
}

impl ObjectKind {
    pub fn kind(&self) -> Kind {
        match self {
            ObjectKind::Module(_) => Kind::Module,
            ObjectKind::Class(_) => Kind::Class,
            ObjectKind::Function(_) => Kind::Function,
            ObjectKind::Attribute(_) => Kind::Attribute,
            ObjectKind::TypeAlias(_) => Kind::TypeAlias,
            ObjectKind::Alias(_) => Kind::Alias,
        }
    }
}

/// A single API entity: shared fields plus the kind payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    /// Canonical dotted path from the root package.
    pub path: String,
    /// Canonical path of the parent; `None` for root modules.
    pub parent: Option<String>,
    pub lineno: Option<usize>,
    pub endlineno: Option<usize>,
    pub docstring: Option<Docstring>,
    pub labels: BTreeSet<String>,
    /// Direct members, in declaration order.
    pub members: IndexMap<String, Object>,
    pub analysis: Analysis,
    /// False when declared inside a type-checking-only branch.
    pub runtime: bool,
    /// Visibility override; takes precedence over every convention.
    pub public: Option<bool>,
    /// Deprecation override (labels may also carry `deprecated`).
    pub deprecated: bool,
    /// Paths of aliases whose target is this object.
    pub aliases: Vec<String>,
    /// Extension scratch space, keyed by extension namespace.
    pub extra: BTreeMap<String, serde_json::Map<String, serde_json::Value>>,
    pub kind: ObjectKind,
}

impl Object {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            parent: None,
            lineno: None,
            endlineno: None,
            docstring: None,
            labels: BTreeSet::new(),
            members: IndexMap::new(),
            analysis: Analysis::Static,
            runtime: true,
            public: None,
            deprecated: false,
            aliases: Vec::new(),
            extra: BTreeMap::new(),
            kind,
        }
    }

    pub fn module(name: impl Into<String>) -> Self {
        Self::new(name, ObjectKind::Module(ModuleData::default()))
    }

    pub fn alias(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, ObjectKind::Alias(AliasData::new(target)))
    }

    pub fn with_lines(mut self, lineno: usize, endlineno: usize) -> Self {
        self.lineno = Some(lineno);
        self.endlineno = Some(endlineno);
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind.kind()
    }

    pub fn is_module(&self) -> bool {
        matches!(self.kind, ObjectKind::Module(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, ObjectKind::Class(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self.kind, ObjectKind::Attribute(_))
    }

    pub fn is_type_alias(&self) -> bool {
        matches!(self.kind, ObjectKind::TypeAlias(_))
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.kind, ObjectKind::Alias(_))
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn has_labels(&self, labels: &[&str]) -> bool {
        labels.iter().all(|label| self.labels.contains(*label))
    }

    // --- module conveniences -------------------------------------------------

    pub fn is_init_module(&self) -> bool {
        matches!(&self.kind, ObjectKind::Module(m) if m.is_init)
    }

    pub fn is_package(&self) -> bool {
        self.is_init_module() && self.parent.is_none()
    }

    pub fn is_subpackage(&self) -> bool {
        self.is_init_module() && self.parent.is_some()
    }

    pub fn is_namespace_module(&self) -> bool {
        matches!(&self.kind, ObjectKind::Module(m) if m.filepath.is_none())
    }

    pub fn is_namespace_package(&self) -> bool {
        self.is_namespace_module() && self.parent.is_none()
    }

    pub fn is_namespace_subpackage(&self) -> bool {
        self.is_namespace_module() && self.parent.is_some()
    }

    /// Module exports list, when one was declared.
    pub fn exports(&self) -> Option<&[ExportItem]> {
        match &self.kind {
            ObjectKind::Module(m) => m.exports.as_deref(),
            _ => None,
        }
    }

    // --- alias intrinsics ----------------------------------------------------

    /// Raw target path of an alias (the next link, for diagnostics).
    pub fn target_path(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Alias(a) => Some(&a.target),
            _ => None,
        }
    }

    pub fn is_wildcard_alias(&self) -> bool {
        matches!(&self.kind, ObjectKind::Alias(a) if a.wildcard)
    }

    pub fn is_inherited_alias(&self) -> bool {
        matches!(&self.kind, ObjectKind::Alias(a) if a.inherited)
    }

    /// Whether a chain has been fully resolved and cached.
    pub fn resolved(&self) -> bool {
        matches!(&self.kind, ObjectKind::Alias(a) if a.resolved.is_some())
    }

    /// Follows the alias chain to its concrete entity. Only the final
    /// target is cached by the resolver; this walks direct paths and
    /// reports loops with the full chain.
    pub fn final_target<'a>(
        &'a self,
        collection: &'a ModuleCollection,
    ) -> Result<&'a Object, AliasError> {
        let ObjectKind::Alias(data) = &self.kind else {
            return Ok(self);
        };
        if let Some(resolved) = &data.resolved {
            return collection
                .get(resolved)
                .ok_or_else(|| AliasError::resolution(&self.path, resolved));
        }
        let mut chain = vec![self.path.clone()];
        let mut current = self;
        loop {
            let ObjectKind::Alias(data) = &current.kind else {
                return Ok(current);
            };
            let next = collection
                .get(&data.target)
                .ok_or_else(|| AliasError::resolution(&current.path, &data.target))?;
            if next.is_alias() {
                if chain.contains(&next.path) {
                    chain.push(next.path.clone());
                    return Err(AliasError::Cyclic { chain });
                }
                chain.push(next.path.clone());
            }
            current = next;
        }
    }

    /// The entity itself, or the final target when this is an alias.
    pub fn delegate<'a>(
        &'a self,
        collection: &'a ModuleCollection,
    ) -> Result<&'a Object, AliasError> {
        if self.is_alias() {
            self.final_target(collection)
        } else {
            Ok(self)
        }
    }

    // --- visibility ----------------------------------------------------------

    /// Dunder-named (`__init__`-style).
    pub fn is_special(&self) -> bool {
        self.name.starts_with("__") && self.name.ends_with("__") && self.name.len() > 4
    }

    pub fn is_private(&self) -> bool {
        self.name.starts_with('_') && !self.is_special()
    }

    pub fn is_class_private(&self) -> bool {
        self.name.starts_with("__") && !self.name.ends_with("__")
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated || self.labels.contains("deprecated")
    }

    /// Listed in the parent module's explicit exports.
    pub fn is_exported(&self, collection: &ModuleCollection) -> bool {
        let Some(parent) = self.parent.as_ref().and_then(|p| collection.get(p)) else {
            return false;
        };
        parent
            .exports()
            .is_some_and(|exports| exports.iter().any(|e| e.matches(&self.name)))
    }

    /// Would `from <parent module> import *` pick this name up.
    pub fn is_wildcard_exposed(&self, collection: &ModuleCollection) -> bool {
        let Some(parent) = self.parent.as_ref().and_then(|p| collection.get(p)) else {
            return false;
        };
        if !parent.is_module() {
            return false;
        }
        match parent.exports() {
            Some(exports) => exports.iter().any(|e| e.matches(&self.name)),
            None => !self.name.starts_with('_') && !self.is_alias(),
        }
    }

    /// Public visibility under the name-convention rule.
    ///
    /// The explicit `public` override wins; then the parent module's
    /// exports list; then the convention: not imported, not
    /// underscore-prefixed (dunder members of classes stay public).
    pub fn is_public(&self, collection: &ModuleCollection) -> bool {
        if let Some(public) = self.public {
            return public;
        }
        let parent = self.parent.as_ref().and_then(|p| collection.get(p));
        match parent {
            Some(parent) if parent.is_module() => {
                if let Some(exports) = parent.exports() {
                    return exports.iter().any(|e| e.matches(&self.name));
                }
                !self.is_alias() && !self.name.starts_with('_')
            }
            Some(_) => !self.is_alias() && (self.is_special() || !self.name.starts_with('_')),
            None => !self.name.starts_with('_'),
        }
    }

    pub fn is_private_in(&self, collection: &ModuleCollection) -> bool {
        !self.is_public(collection)
    }

    // --- members -------------------------------------------------------------

    /// Direct member by exact key. Never computes inheritance.
    pub fn get_member(&self, name: &str) -> Option<&Object> {
        self.members.get(name)
    }

    pub fn get_member_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.members.get_mut(name)
    }

    /// Member by dotted path, descending direct members only.
    pub fn member(&self, path: &str) -> Option<&Object> {
        self.member_parts(&path.split('.').collect::<Vec<_>>())
    }

    /// Member by pre-split path parts.
    pub fn member_parts(&self, parts: &[&str]) -> Option<&Object> {
        let mut current = self;
        for part in parts {
            current = current.get_member(part)?;
        }
        Some(current)
    }

    pub fn member_mut(&mut self, path: &str) -> Option<&mut Object> {
        let mut current = self;
        for part in path.split('.') {
            current = current.get_member_mut(part)?;
        }
        Some(current)
    }

    /// Attaches a member, rewriting the subtree's paths and parent links
    /// under this object's canonical path.
    pub fn set_member(&mut self, name: impl Into<String>, mut child: Object) {
        let name = name.into();
        child.name = name.clone();
        child.reroot(&self.path, &name);
        self.members.insert(name, child);
    }

    fn reroot(&mut self, parent_path: &str, name: &str) {
        self.parent = Some(parent_path.to_string());
        self.path = format!("{parent_path}.{name}");
        let path = self.path.clone();
        for (child_name, child) in &mut self.members {
            let child_name = child_name.clone();
            child.reroot(&path, &child_name);
        }
    }

    // --- inheritance ---------------------------------------------------------

    /// Base-class expressions resolved to concrete classes. Unresolvable
    /// bases are dropped with a debug log.
    pub fn resolved_bases<'a>(&self, collection: &'a ModuleCollection) -> Vec<&'a Object> {
        let ObjectKind::Class(data) = &self.kind else {
            return Vec::new();
        };
        let mut resolved = Vec::new();
        for base in &data.bases {
            let base_expr = strip_subscript(base);
            let Some(path) = base_expr.canonical_path(collection) else {
                debug!(class = %self.path, base = %base, "base expression is not a name, skipping");
                continue;
            };
            let Some(object) = collection.get(&path) else {
                debug!(class = %self.path, base = %path, "base class not loaded, skipping");
                continue;
            };
            match object.delegate(collection) {
                Ok(target) if target.is_class() => resolved.push(target),
                Ok(target) => {
                    debug!(class = %self.path, base = %target.path, "base is not a class, skipping");
                }
                Err(err) => {
                    debug!(class = %self.path, base = %path, error = %err, "base alias unresolved, skipping");
                }
            }
        }
        resolved
    }

    /// C3-linearized method resolution order (paths, `self` first).
    ///
    /// Iterative post-order walk: deep inheritance chains never recurse on
    /// the call stack. Inheritance cycles drop the offending base with a
    /// debug log.
    pub fn mro(&self, collection: &ModuleCollection) -> Vec<String> {
        let mut memo: HashMap<String, Vec<String>> = HashMap::new();
        let mut in_progress: HashSet<String> = HashSet::new();
        let mut stack = vec![(self.path.clone(), false)];

        let lookup = |path: &str| -> Option<&Object> {
            if path == self.path {
                Some(self)
            } else {
                collection.get(path).and_then(|o| o.delegate(collection).ok())
            }
        };

        while let Some((top, expanded)) = stack.pop() {
            if memo.contains_key(&top) {
                continue;
            }
            let Some(class) = lookup(&top).filter(|c| c.is_class()) else {
                memo.insert(top.clone(), vec![top]);
                continue;
            };
            let base_paths: Vec<String> = class
                .resolved_bases(collection)
                .iter()
                .map(|b| b.path.clone())
                .collect();
            if expanded {
                in_progress.remove(&top);
                let known: Vec<String> = base_paths
                    .into_iter()
                    .filter(|p| memo.contains_key(p))
                    .collect();
                let mut sequences: Vec<Vec<String>> =
                    known.iter().map(|p| memo[p].clone()).collect();
                sequences.push(known);
                memo.insert(top.clone(), c3_merge(&top, sequences));
            } else {
                in_progress.insert(top.clone());
                stack.push((top.clone(), true));
                for base in base_paths {
                    if in_progress.contains(&base) {
                        debug!(class = %top, %base, "inheritance cycle detected, dropping base");
                    } else if !memo.contains_key(&base) {
                        stack.push((base, false));
                    }
                }
            }
        }
        memo.remove(&self.path).unwrap_or_else(|| vec![self.path.clone()])
    }

    /// Members inherited from base classes, as fresh aliases flagged
    /// `inherited` and targeting the member's canonical path. Direct
    /// members shadow inherited ones.
    pub fn inherited_members(&self, collection: &ModuleCollection) -> IndexMap<String, Object> {
        let mut inherited = IndexMap::new();
        if !self.is_class() {
            return inherited;
        }
        let mro = self.mro(collection);
        for base_path in mro.iter().skip(1).rev() {
            let Some(base) = collection.get(base_path) else {
                continue;
            };
            for (name, member) in &base.members {
                if self.members.contains_key(name) {
                    continue;
                }
                let mut alias = Object::alias(name.clone(), member.path.clone());
                if let ObjectKind::Alias(data) = &mut alias.kind {
                    data.inherited = true;
                    data.resolved = Some(member.path.clone());
                }
                alias.parent = Some(self.path.clone());
                alias.path = format!("{}.{name}", self.path);
                alias.lineno = member.lineno;
                alias.endlineno = member.endlineno;
                inherited.insert(name.clone(), alias);
            }
        }
        inherited
    }

    /// Direct members merged over inherited ones.
    pub fn all_members(&self, collection: &ModuleCollection) -> IndexMap<String, Object> {
        let mut all = self.inherited_members(collection);
        for (name, member) in &self.members {
            all.insert(name.clone(), member.clone());
        }
        all
    }
}

/// `Base[T]` contributes `Base` to the MRO.
fn strip_subscript(expr: &Expr) -> &Expr {
    match expr {
        Expr::Subscript { left, .. } => left.as_ref(),
        other => other,
    }
}

/// Standard C3 merge; on an inconsistent hierarchy, falls back to
/// left-to-right depth-first dedup with a debug log.
fn c3_merge(head: &str, mut sequences: Vec<Vec<String>>) -> Vec<String> {
    let mut result = vec![head.to_string()];
    sequences.retain(|s| !s.is_empty());
    while !sequences.is_empty() {
        let mut candidate = None;
        for sequence in &sequences {
            let first = &sequence[0];
            let blocked = sequences
                .iter()
                .any(|other| other.len() > 1 && other[1..].contains(first));
            if !blocked {
                candidate = Some(first.clone());
                break;
            }
        }
        let Some(candidate) = candidate else {
            debug!(class = %head, "inconsistent class hierarchy, falling back to declaration order");
            for sequence in &sequences {
                for path in sequence {
                    if !result.contains(path) {
                        result.push(path.clone());
                    }
                }
            }
            return result;
        };
        result.push(candidate.clone());
        for sequence in &mut sequences {
            sequence.retain(|p| p != &candidate);
        }
        sequences.retain(|s| !s.is_empty());
    }
    result
}

/// Root container for loaded packages: unique-key map from package name to
/// root module, with dotted-path navigation into member trees.
#[derive(Debug, Default, Clone)]
pub struct ModuleCollection {
    members: IndexMap<String, Object>,
}

impl ModuleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Inserts a root module under its name, returning any replaced tree.
    pub fn insert(&mut self, root: Object) -> Option<Object> {
        self.members.insert(root.name.clone(), root)
    }

    pub fn remove(&mut self, name: &str) -> Option<Object> {
        self.members.shift_remove(name)
    }

    pub fn roots(&self) -> impl Iterator<Item = &Object> {
        self.members.values()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Entity at `path`, descending direct members only (aliases are not
    /// followed; that is the resolver's job).
    pub fn get(&self, path: &str) -> Option<&Object> {
        let mut parts = path.split('.');
        let mut current = self.members.get(parts.next()?)?;
        for part in parts {
            current = current.get_member(part)?;
        }
        Some(current)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Object> {
        let mut parts = path.split('.');
        let mut current = self.members.get_mut(parts.next()?)?;
        for part in parts {
            current = current.get_member_mut(part)?;
        }
        Some(current)
    }

    /// Resolves `name` within the scope rooted at `scope_path`, consulting
    /// module import maps and walking up the parent chain. Returns the
    /// absolute dotted path, or `None` for unknown (builtin, external)
    /// names.
    pub fn resolve_name(&self, scope_path: &str, name: &str) -> Option<String> {
        let (first, rest) = match name.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        let mut scope = Some(scope_path.to_string());
        while let Some(current) = scope {
            if let Some(object) = self.get(&current) {
                if let ObjectKind::Module(module) = &object.kind {
                    if let Some(target) = module.imports.get(first) {
                        return Some(join_path(target, rest));
                    }
                }
                if object.get_member(first).is_some() {
                    let base = format!("{}.{first}", object.path);
                    return Some(join_path(&base, rest));
                }
            }
            scope = current.rsplit_once('.').map(|(parent, _)| parent.to_string());
        }
        None
    }
}

fn join_path(base: &str, rest: Option<&str>) -> String {
    match rest {
        Some(rest) => format!("{base}.{rest}"),
        None => base.to_string(),
    }
}

/// Source lines per analyzed file, kept for location-aware consumers.
#[derive(Debug, Default, Clone)]
pub struct LinesCollection {
    entries: HashMap<PathBuf, Vec<String>>,
}

impl LinesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filepath: impl Into<PathBuf>, source: &str) {
        self.entries
            .insert(filepath.into(), source.lines().map(str::to_string).collect());
    }

    pub fn get(&self, filepath: &Path) -> Option<&[String]> {
        self.entries.get(filepath).map(Vec::as_slice)
    }

    pub fn line_count(&self, filepath: &Path) -> Option<usize> {
        self.entries.get(filepath).map(Vec::len)
    }
}
