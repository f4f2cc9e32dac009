//! Static analyzer: walks one parsed module and produces a populated
//! [`Object`] tree, leaving imports as unresolved alias placeholders.
//!
//! The walk is depth-first and synchronous. Errors on individual
//! statements are logged with file and line context and the statement is
//! dropped; the module as a whole is still produced.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use pyglass_model::{
    AttributeData, ClassData, Decorator, Docstring, DocstringStyle, Expr, FunctionData, Kind,
    Object, ObjectKind, Parameters, TypeAliasData,
};
use rustpython_ast::{self as ast, Ranged};
use rustpython_parser::{parse, Mode};
use tracing::warn;

use crate::expressions::{build_expr, build_parameters, build_type_params, safe_expr};
use crate::extensions::{Agent, Extensions, HookContext};
use crate::linenos::LineIndex;

mod exports;
mod labels;

use exports::parse_export_items;
use labels::{decorator_labels, is_overload_decorator, property_binding};

/// Walks the syntax tree of a single module.
pub struct ModuleVisitor<'ext> {
    module_path: String,
    filepath: PathBuf,
    is_init: bool,
    docstring_style: Option<DocstringStyle>,
    extensions: &'ext mut Extensions,
    line_index: LineIndex,
    /// Inside an `if TYPE_CHECKING:` branch.
    type_guarded: bool,
    /// Pending `@overload` declarations per container.
    overload_stack: Vec<IndexMap<String, Vec<Object>>>,
}

/// Parses `source` and walks it into a module object.
///
/// `path` is the module's canonical dotted path; `name` its last segment.
pub fn visit_module(
    name: &str,
    path: &str,
    filepath: &Path,
    source: &str,
    is_init: bool,
    docstring_style: Option<DocstringStyle>,
    extensions: &mut Extensions,
) -> Result<Object> {
    let parsed = parse(source, Mode::Module, &filepath.to_string_lossy())
        .with_context(|| format!("failed to parse {}", filepath.display()))?;
    let ast::Mod::Module(module_node) = parsed else {
        bail!("{} did not parse as a module", filepath.display());
    };

    let mut visitor = ModuleVisitor {
        module_path: path.to_string(),
        filepath: filepath.to_path_buf(),
        is_init,
        docstring_style,
        extensions,
        line_index: LineIndex::new(source),
        type_guarded: false,
        overload_stack: Vec::new(),
    };

    let mut module = Object::module(name);
    module.path = path.to_string();
    if let Some((parent, _)) = path.rsplit_once('.') {
        module.parent = Some(parent.to_string());
    }
    module.lineno = Some(1);
    module.endlineno = Some(source.lines().count().max(1));
    if let ObjectKind::Module(data) = &mut module.kind {
        data.filepath = Some(filepath.to_path_buf());
        data.is_init = is_init;
    }
    module.docstring = visitor.docstring_from_body(&module_node.body);

    let ctx = visitor_ctx(path, filepath);
    visitor.extensions.call_module_node(&module_node, &ctx);
    visitor.extensions.call_instance(&mut module, &ctx);

    visitor.visit_body(&mut module, &module_node.body);

    visitor.extensions.call_members(&mut module, &ctx);
    Ok(module)
}

fn visitor_ctx<'a>(module_path: &'a str, filepath: &'a Path) -> HookContext<'a> {
    HookContext {
        agent: Agent::Visitor,
        module_path,
        filepath: Some(filepath),
    }
}

impl ModuleVisitor<'_> {
    fn lines<N: Ranged>(&self, node: &N) -> (usize, usize) {
        (
            self.line_index.line_of(node.range().start()),
            self.line_index.end_line_of(node.range().end()),
        )
    }

    /// Walks a container body: statement loop plus overload bookkeeping.
    fn visit_body(&mut self, container: &mut Object, body: &[ast::Stmt]) {
        self.overload_stack.push(IndexMap::new());
        self.visit_stmts(container, body);
        let pending = self.overload_stack.pop().unwrap_or_default();
        self.flush_overloads(container, pending);
        self.finish_container(container);
    }

    /// Statement loop shared by bodies and nested blocks; one failing
    /// statement never takes the module down.
    fn visit_stmts(&mut self, container: &mut Object, body: &[ast::Stmt]) {
        for (index, stmt) in body.iter().enumerate() {
            let next = body.get(index + 1);
            if let Err(error) = self.visit_stmt(container, stmt, next) {
                let line = self.line_index.line_of(stmt.range().start());
                warn!(
                    file = %self.filepath.display(),
                    line,
                    %error,
                    "skipping statement",
                );
            }
        }
    }

    fn visit_stmt(
        &mut self,
        container: &mut Object,
        stmt: &ast::Stmt,
        next: Option<&ast::Stmt>,
    ) -> Result<()> {
        match stmt {
            ast::Stmt::Import(node) => self.visit_import(container, node, stmt),
            ast::Stmt::ImportFrom(node) => self.visit_import_from(container, node, stmt),
            ast::Stmt::FunctionDef(_) | ast::Stmt::AsyncFunctionDef(_) => {
                self.visit_function(container, stmt)
            }
            ast::Stmt::ClassDef(node) => self.visit_class(container, node, stmt),
            ast::Stmt::Assign(node) => self.visit_assign(container, node, stmt, next),
            ast::Stmt::AnnAssign(node) => self.visit_ann_assign(container, node, stmt, next),
            ast::Stmt::AugAssign(node) => self.visit_aug_assign(container, node),
            ast::Stmt::TypeAlias(node) => self.visit_type_alias(container, node, stmt),
            ast::Stmt::If(node) => self.visit_if(container, node),
            ast::Stmt::Try(node) => self.visit_try(container, node),
            // Other statements carry no API surface.
            _ => Ok(()),
        }
    }

    /// Attaches a member, applying the repeated-assignment merge policy
    /// and firing the instance hooks.
    fn attach(&mut self, container: &mut Object, name: String, mut object: Object) {
        object.runtime = !self.type_guarded && object.runtime;
        if let Some(previous) = container.get_member(&name) {
            merge_previous(&mut object, previous);
        }
        container.set_member(name.clone(), object);
        let ctx = visitor_ctx(&self.module_path, &self.filepath);
        if let Some(child) = container.get_member_mut(&name) {
            self.extensions.call_instance(child, &ctx);
        }
    }

    // --- imports -------------------------------------------------------------

    fn visit_import(
        &mut self,
        container: &mut Object,
        node: &ast::StmtImport,
        stmt: &ast::Stmt,
    ) -> Result<()> {
        let (lineno, endlineno) = self.lines(stmt);
        for alias_node in &node.names {
            let full = alias_node.name.to_string();
            let (local, target) = match &alias_node.asname {
                // `import a.b as c` binds c to the submodule itself.
                Some(asname) => (asname.to_string(), full.clone()),
                // `import a.b` binds the top-level package name.
                None => {
                    let first = full.split('.').next().unwrap_or(full.as_str()).to_string();
                    (first.clone(), first)
                }
            };
            record_import(container, &local, &target);
            let alias = Object::alias(local.clone(), target).with_lines(lineno, endlineno);
            self.attach(container, local, alias);
        }
        Ok(())
    }

    fn visit_import_from(
        &mut self,
        container: &mut Object,
        node: &ast::StmtImportFrom,
        stmt: &ast::Stmt,
    ) -> Result<()> {
        let level = node.level.as_ref().map_or(0, |l| l.to_u32());
        let base = self.resolve_import_base(level, node.module.as_ref().map(|m| m.as_str()))?;
        let (lineno, endlineno) = self.lines(stmt);

        for alias_node in &node.names {
            let name = alias_node.name.to_string();
            if name == "*" {
                let placeholder = format!("*{base}");
                let mut alias = Object::alias(placeholder.clone(), base.clone())
                    .with_lines(lineno, endlineno);
                if let ObjectKind::Alias(data) = &mut alias.kind {
                    data.wildcard = true;
                }
                self.attach(container, placeholder, alias);
                continue;
            }
            let local = alias_node
                .asname
                .as_ref()
                .map_or_else(|| name.clone(), ToString::to_string);
            let target = format!("{base}.{name}");
            if target == self.module_path {
                // Self-import: would alias the module onto itself.
                continue;
            }
            if self.is_init && level >= 1 && node.module.is_none() && base == self.module_path {
                // `from . import sub` inside an init module: the member
                // would shadow the submodule of the same name.
                continue;
            }
            record_import(container, &local, &target);
            let alias = Object::alias(local.clone(), target).with_lines(lineno, endlineno);
            self.attach(container, local, alias);
        }
        Ok(())
    }

    /// Resolves the base path of a (possibly relative) `from` import
    /// against the current module's canonical parent chain.
    fn resolve_import_base(&self, level: u32, module: Option<&str>) -> Result<String> {
        if level == 0 {
            return Ok(module
                .context("import without module or level")?
                .to_string());
        }
        let mut parts: Vec<&str> = self.module_path.split('.').collect();
        // One level reaches the current package: the module itself for
        // init modules, its parent otherwise.
        if !self.is_init {
            parts.pop();
        }
        for _ in 1..level {
            parts.pop();
        }
        if parts.is_empty() {
            bail!("relative import goes beyond the top-level package");
        }
        let mut base = parts.join(".");
        if let Some(module) = module {
            base.push('.');
            base.push_str(module);
        }
        Ok(base)
    }

    // --- assignments ---------------------------------------------------------

    fn visit_assign(
        &mut self,
        container: &mut Object,
        node: &ast::StmtAssign,
        stmt: &ast::Stmt,
        next: Option<&ast::Stmt>,
    ) -> Result<()> {
        for target in &node.targets {
            if let ast::Expr::Name(name_node) = target {
                let name = name_node.id.to_string();
                if name == "__all__" && container.is_module() {
                    self.set_exports(container, &node.value, false);
                } else {
                    self.add_attribute(container, name, None, Some(&node.value), stmt, next);
                }
            }
            // `x.y = z`, tuple unpacking and subscript targets are not
            // declarations; skipped silently.
        }
        Ok(())
    }

    fn visit_ann_assign(
        &mut self,
        container: &mut Object,
        node: &ast::StmtAnnAssign,
        stmt: &ast::Stmt,
        next: Option<&ast::Stmt>,
    ) -> Result<()> {
        let ast::Expr::Name(name_node) = node.target.as_ref() else {
            return Ok(());
        };
        let name = name_node.id.to_string();
        if name == "__all__" && container.is_module() {
            if let Some(value) = &node.value {
                self.set_exports(container, value, false);
            }
            return Ok(());
        }
        self.add_attribute(
            container,
            name,
            Some(&node.annotation),
            node.value.as_deref(),
            stmt,
            next,
        );
        Ok(())
    }

    fn visit_aug_assign(&mut self, container: &mut Object, node: &ast::StmtAugAssign) -> Result<()> {
        let ast::Expr::Name(name_node) = node.target.as_ref() else {
            return Ok(());
        };
        if name_node.id.as_str() == "__all__"
            && container.is_module()
            && matches!(node.op, ast::Operator::Add)
        {
            self.set_exports(container, &node.value, true);
        }
        Ok(())
    }

    fn add_attribute(
        &mut self,
        container: &mut Object,
        name: String,
        annotation: Option<&ast::Expr>,
        value: Option<&ast::Expr>,
        stmt: &ast::Stmt,
        next: Option<&ast::Stmt>,
    ) {
        let ctx = visitor_ctx(&self.module_path, &self.filepath);
        self.extensions.call_node(Kind::Attribute, stmt, &ctx);

        let scope = container.path.clone();
        let (lineno, endlineno) = self.lines(stmt);
        let mut data = AttributeData::default();
        if let Some(annotation) = annotation {
            data.annotation = safe_expr(annotation, &scope, &self.filepath, lineno);
        }
        if let Some(value) = value {
            data.value = safe_expr(value, &scope, &self.filepath, lineno);
        }

        let mut labels = BTreeSet::new();
        if container.is_class() {
            // `ClassVar[U]` unwraps to `U`; the label already says it.
            let unwrapped = match &data.annotation {
                Some(Expr::Subscript { left, slice })
                    if left.to_string() == "ClassVar"
                        || left.to_string() == "typing.ClassVar" =>
                {
                    Some((**slice).clone())
                }
                _ => None,
            };
            if unwrapped.is_some() {
                data.annotation = unwrapped;
            }
            labels.insert("class-attribute".to_string());
        } else if container.is_module() {
            labels.insert("module-attribute".to_string());
        }

        let mut attribute =
            Object::new(name.clone(), ObjectKind::Attribute(data)).with_lines(lineno, endlineno);
        attribute.labels = labels;
        attribute.docstring = self.docstring_from_next(next);
        self.attach(container, name, attribute);
    }

    fn set_exports(&mut self, container: &mut Object, value: &ast::Expr, augment: bool) {
        let Some(items) = parse_export_items(value, &self.filepath) else {
            let line = self.line_index.line_of(value.range().start());
            warn!(
                file = %self.filepath.display(),
                line,
                "unsupported __all__ declaration, ignoring",
            );
            return;
        };
        if let ObjectKind::Module(data) = &mut container.kind {
            match (&mut data.exports, augment) {
                (Some(existing), true) => existing.extend(items),
                (slot, _) => *slot = Some(items),
            }
        }
    }

    // --- functions -----------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn visit_function(&mut self, container: &mut Object, stmt: &ast::Stmt) -> Result<()> {
        let (name, args, returns, decorator_list, type_params, body, is_async) = match stmt {
            ast::Stmt::FunctionDef(f) => (
                f.name.to_string(),
                &f.args,
                &f.returns,
                &f.decorator_list,
                &f.type_params,
                &f.body,
                false,
            ),
            ast::Stmt::AsyncFunctionDef(f) => (
                f.name.to_string(),
                &f.args,
                &f.returns,
                &f.decorator_list,
                &f.type_params,
                &f.body,
                true,
            ),
            _ => return Ok(()),
        };

        let ctx = visitor_ctx(&self.module_path, &self.filepath);
        self.extensions.call_node(Kind::Function, stmt, &ctx);

        let scope = container.path.clone();
        let (lineno, endlineno) = self.lines(stmt);

        let mut decorators = Vec::with_capacity(decorator_list.len());
        for node in decorator_list {
            let (deco_lineno, deco_endlineno) = self.lines(node);
            if let Some(value) = safe_expr(node, &scope, &self.filepath, deco_lineno) {
                decorators.push(Decorator::new(value, Some(deco_lineno), Some(deco_endlineno)));
            }
        }

        let mut labels = BTreeSet::new();
        let mut is_overload = false;
        let mut binding = None;
        for decorator in &decorators {
            let path = decorator.callable_path();
            if let Some(decorator_labels) = decorator_labels(&path) {
                labels.extend(decorator_labels.iter().map(ToString::to_string));
            }
            if is_overload_decorator(&path) {
                is_overload = true;
            }
            if let Some(found) = property_binding(&path, &name) {
                binding = Some(found);
            }
        }
        if is_async {
            labels.insert("async".to_string());
        }

        let mut data = FunctionData {
            parameters: build_parameters(args, &scope)?,
            returns: returns
                .as_ref()
                .and_then(|r| safe_expr(r, &scope, &self.filepath, lineno)),
            decorators,
            type_parameters: build_type_params(type_params, &scope),
            ..FunctionData::default()
        };

        if is_overload {
            let mut function =
                Object::new(name.clone(), ObjectKind::Function(data)).with_lines(lineno, endlineno);
            function.labels = labels;
            function.runtime = !self.type_guarded;
            function.docstring = self.docstring_from_body(body);
            if let Some(pending) = self.overload_stack.last_mut() {
                pending.entry(name).or_default().push(function);
            }
            return Ok(());
        }

        if let Some(pending) = self.overload_stack.last_mut() {
            if let Some(overloads) = pending.shift_remove(&name) {
                data.overloads = overloads;
            }
        }

        let mut function =
            Object::new(name.clone(), ObjectKind::Function(data)).with_lines(lineno, endlineno);
        function.labels = labels;
        function.docstring = self.docstring_from_body(body);

        // `@x.setter` / `@x.deleter` on a method named x binds onto the
        // property x instead of shadowing it.
        if let Some(kind) = binding {
            if container.is_class() {
                if let Some(owner) = container.get_member_mut(&name) {
                    let bound = match (&mut owner.kind, kind) {
                        (ObjectKind::Function(f), labels::PropertyBinding::Setter)
                            if owner.labels.contains("property") =>
                        {
                            f.setter = Some(Box::new(function.clone()));
                            true
                        }
                        (ObjectKind::Function(f), labels::PropertyBinding::Deleter)
                            if owner.labels.contains("property") =>
                        {
                            f.deleter = Some(Box::new(function.clone()));
                            true
                        }
                        (ObjectKind::Attribute(a), labels::PropertyBinding::Setter) => {
                            a.setter = Some(Box::new(function.clone()));
                            true
                        }
                        (ObjectKind::Attribute(a), labels::PropertyBinding::Deleter) => {
                            a.deleter = Some(Box::new(function.clone()));
                            true
                        }
                        _ => false,
                    };
                    if bound {
                        owner.labels.insert(
                            match kind {
                                labels::PropertyBinding::Setter => "writable",
                                labels::PropertyBinding::Deleter => "deletable",
                            }
                            .to_string(),
                        );
                        return Ok(());
                    }
                }
            }
        }

        self.attach(container, name.clone(), function);

        if container.is_class() && name == "__init__" {
            self.scan_instance_attributes(container, body);
        }
        Ok(())
    }

    /// `self.x = ...` assignments inside `__init__` declare instance
    /// attributes on the enclosing class.
    fn scan_instance_attributes(&mut self, class: &mut Object, body: &[ast::Stmt]) {
        let scope = class.path.clone();
        for (index, stmt) in body.iter().enumerate() {
            let next = body.get(index + 1);
            let (name, annotation, value) = match stmt {
                ast::Stmt::Assign(assign) => {
                    let Some(name) = assign.targets.first().and_then(self_attribute_name) else {
                        continue;
                    };
                    (name, None, Some(assign.value.as_ref()))
                }
                ast::Stmt::AnnAssign(assign) => {
                    let Some(name) = self_attribute_name(&assign.target) else {
                        continue;
                    };
                    (name, Some(assign.annotation.as_ref()), assign.value.as_deref())
                }
                _ => continue,
            };
            let (lineno, endlineno) = self.lines(stmt);
            let mut data = AttributeData::default();
            if let Some(annotation) = annotation {
                data.annotation = safe_expr(annotation, &scope, &self.filepath, lineno);
            }
            if let Some(value) = value {
                data.value = safe_expr(value, &scope, &self.filepath, lineno);
            }
            let mut attribute =
                Object::new(name.clone(), ObjectKind::Attribute(data)).with_lines(lineno, endlineno);
            attribute.labels.insert("instance-attribute".to_string());
            attribute.docstring = self.docstring_from_next(next);
            self.attach(class, name, attribute);
        }
    }

    // --- classes -------------------------------------------------------------

    fn visit_class(
        &mut self,
        container: &mut Object,
        node: &ast::StmtClassDef,
        stmt: &ast::Stmt,
    ) -> Result<()> {
        let ctx = visitor_ctx(&self.module_path, &self.filepath);
        self.extensions.call_node(Kind::Class, stmt, &ctx);

        let name = node.name.to_string();
        let scope = container.path.clone();
        let (lineno, endlineno) = self.lines(stmt);

        let mut decorators = Vec::with_capacity(node.decorator_list.len());
        for decorator in &node.decorator_list {
            let (deco_lineno, deco_endlineno) = self.lines(decorator);
            if let Some(value) = safe_expr(decorator, &scope, &self.filepath, deco_lineno) {
                decorators.push(Decorator::new(value, Some(deco_lineno), Some(deco_endlineno)));
            }
        }
        let mut labels = BTreeSet::new();
        for decorator in &decorators {
            if let Some(decorator_labels) = decorator_labels(&decorator.callable_path()) {
                labels.extend(decorator_labels.iter().map(ToString::to_string));
            }
        }

        let mut bases = Vec::with_capacity(node.bases.len());
        for base in &node.bases {
            if let Some(expr) = safe_expr(base, &scope, &self.filepath, lineno) {
                bases.push(expr);
            }
        }
        let mut keywords = Vec::with_capacity(node.keywords.len());
        for keyword in &node.keywords {
            if let Some(value) = safe_expr(&keyword.value, &scope, &self.filepath, lineno) {
                keywords.push(match &keyword.arg {
                    Some(arg) => Expr::Keyword {
                        name: arg.to_string(),
                        value: Box::new(value),
                    },
                    None => Expr::VarKeyword {
                        value: Box::new(value),
                    },
                });
            }
        }

        let data = ClassData {
            bases,
            keywords,
            decorators,
            type_parameters: build_type_params(&node.type_params, &scope),
            ..ClassData::default()
        };
        let mut class =
            Object::new(name.clone(), ObjectKind::Class(data)).with_lines(lineno, endlineno);
        class.labels = labels;
        class.docstring = self.docstring_from_body(&node.body);

        self.attach(container, name.clone(), class);
        if let Some(class) = container.get_member_mut(&name) {
            self.visit_body(class, &node.body);
            let ctx = HookContext {
                agent: Agent::Visitor,
                module_path: &self.module_path,
                filepath: Some(&self.filepath),
            };
            self.extensions.call_members(class, &ctx);
        }
        Ok(())
    }

    /// After a container body: leftover overloads and class constructor
    /// parameters.
    fn finish_container(&mut self, container: &mut Object) {
        if !container.is_class() {
            return;
        }
        let constructor = container.get_member("__init__").and_then(|init| {
            if let ObjectKind::Function(f) = &init.kind {
                Some(
                    f.parameters
                        .iter()
                        .filter(|p| p.name != "self")
                        .cloned()
                        .collect::<Parameters>(),
                )
            } else {
                None
            }
        });
        if let ObjectKind::Class(data) = &mut container.kind {
            if constructor.is_some() {
                data.parameters = constructor;
            }
        }
    }

    fn flush_overloads(&mut self, container: &mut Object, pending: IndexMap<String, Vec<Object>>) {
        for (name, mut overloads) in pending {
            if container.get_member(&name).is_some() {
                continue;
            }
            if container.is_class() {
                if let ObjectKind::Class(data) = &mut container.kind {
                    data.overloads.insert(name, overloads);
                }
            } else if let Some(mut last) = overloads.pop() {
                // Module scope with no implementation: the last overload
                // stands in as the visible declaration.
                if let ObjectKind::Function(f) = &mut last.kind {
                    f.overloads = overloads;
                }
                self.attach(container, name, last);
            }
        }
    }

    // --- type aliases --------------------------------------------------------

    fn visit_type_alias(
        &mut self,
        container: &mut Object,
        node: &ast::StmtTypeAlias,
        stmt: &ast::Stmt,
    ) -> Result<()> {
        let ast::Expr::Name(name_node) = node.name.as_ref() else {
            return Ok(());
        };
        let ctx = visitor_ctx(&self.module_path, &self.filepath);
        self.extensions.call_node(Kind::TypeAlias, stmt, &ctx);

        let name = name_node.id.to_string();
        let scope = container.path.clone();
        let (lineno, endlineno) = self.lines(stmt);
        let data = TypeAliasData {
            value: build_expr(&node.value, &scope)?,
            type_parameters: build_type_params(&node.type_params, &scope),
        };
        let alias =
            Object::new(name.clone(), ObjectKind::TypeAlias(data)).with_lines(lineno, endlineno);
        self.attach(container, name, alias);
        Ok(())
    }

    // --- control flow --------------------------------------------------------

    fn visit_if(&mut self, container: &mut Object, node: &ast::StmtIf) -> Result<()> {
        if is_type_checking(&node.test) {
            let previous = self.type_guarded;
            self.type_guarded = true;
            self.visit_stmts(container, &node.body);
            self.type_guarded = previous;
        } else {
            self.visit_stmts(container, &node.body);
        }
        // The else branch is visited last, so its declarations win.
        self.visit_stmts(container, &node.orelse);
        Ok(())
    }

    fn visit_try(&mut self, container: &mut Object, node: &ast::StmtTry) -> Result<()> {
        // Handlers first: the no-exception path (body and else) wins over
        // fallback declarations.
        for handler in &node.handlers {
            let ast::ExceptHandler::ExceptHandler(handler) = handler;
            self.visit_stmts(container, &handler.body);
        }
        self.visit_stmts(container, &node.body);
        self.visit_stmts(container, &node.orelse);
        self.visit_stmts(container, &node.finalbody);
        Ok(())
    }

    // --- docstrings ----------------------------------------------------------

    fn docstring_from_body(&self, body: &[ast::Stmt]) -> Option<Docstring> {
        self.docstring_from_stmt(body.first()?)
    }

    fn docstring_from_next(&self, next: Option<&ast::Stmt>) -> Option<Docstring> {
        self.docstring_from_stmt(next?)
    }

    fn docstring_from_stmt(&self, stmt: &ast::Stmt) -> Option<Docstring> {
        let ast::Stmt::Expr(expr_stmt) = stmt else {
            return None;
        };
        let ast::Expr::Constant(constant) = expr_stmt.value.as_ref() else {
            return None;
        };
        let ast::Constant::Str(value) = &constant.value else {
            return None;
        };
        let (lineno, endlineno) = self.lines(stmt);
        let mut docstring = Docstring::new(value.clone(), Some(lineno), Some(endlineno));
        docstring.style = self.docstring_style;
        Some(docstring)
    }
}

/// Later declarations override earlier ones, but labels merge and an
/// already-recorded docstring or annotation survives when the newer
/// declaration lacks one.
fn merge_previous(new: &mut Object, previous: &Object) {
    for label in &previous.labels {
        new.labels.insert(label.clone());
    }
    if new.docstring.is_none() {
        new.docstring = previous.docstring.clone();
    }
    if let (ObjectKind::Attribute(new_data), ObjectKind::Attribute(old_data)) =
        (&mut new.kind, &previous.kind)
    {
        if new_data.annotation.is_none() {
            new_data.annotation = old_data.annotation.clone();
        }
        if new_data.value.is_none() {
            new_data.value = old_data.value.clone();
        }
    }
}

fn record_import(container: &mut Object, local: &str, target: &str) {
    if let ObjectKind::Module(data) = &mut container.kind {
        data.imports.insert(local.to_string(), target.to_string());
    }
}

/// `self.<name>` as an assignment target.
fn self_attribute_name(expr: &ast::Expr) -> Option<String> {
    let ast::Expr::Attribute(attribute) = expr else {
        return None;
    };
    let ast::Expr::Name(base) = attribute.value.as_ref() else {
        return None;
    };
    if base.id.as_str() != "self" {
        return None;
    }
    Some(attribute.attr.to_string())
}

/// `if TYPE_CHECKING:` / `if typing.TYPE_CHECKING:` guards.
fn is_type_checking(test: &ast::Expr) -> bool {
    match test {
        ast::Expr::Name(name) => name.id.as_str() == "TYPE_CHECKING",
        ast::Expr::Attribute(attribute) => {
            attribute.attr.as_str() == "TYPE_CHECKING"
                && matches!(
                    attribute.value.as_ref(),
                    ast::Expr::Name(base) if base.id.as_str() == "typing"
                )
        }
        _ => false,
    }
}
