//! Extension bus: user-provided hooks fired while walking and loading.
//!
//! Extensions can rewrite the entity being built (labels, extra data,
//! members) but must not reach into other modules while those are being
//! walked; they receive the current object and a [`HookContext`] describing
//! the firing agent.

use std::path::Path;

use pyglass_model::{Kind, Object};
use rustpython_ast as ast;

/// Which subsystem fired the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agent {
    Visitor,
    Loader,
    Resolver,
}

/// Context handed to every hook.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub agent: Agent,
    /// Canonical path of the module being processed.
    pub module_path: &'a str,
    pub filepath: Option<&'a Path>,
}

/// One extension. Every hook has a no-op default; implement only the
/// events of interest. Node hooks fire before an entity is created,
/// instance hooks right after it is created and attached to its parent,
/// members hooks after a container's body has been walked.
#[allow(unused_variables)]
pub trait Extension {
    fn on_node(&mut self, node: &ast::Stmt, ctx: &HookContext) {}
    fn on_module_node(&mut self, node: &ast::ModModule, ctx: &HookContext) {}
    fn on_class_node(&mut self, node: &ast::Stmt, ctx: &HookContext) {}
    fn on_function_node(&mut self, node: &ast::Stmt, ctx: &HookContext) {}
    fn on_attribute_node(&mut self, node: &ast::Stmt, ctx: &HookContext) {}
    fn on_type_alias_node(&mut self, node: &ast::Stmt, ctx: &HookContext) {}

    fn on_instance(&mut self, object: &mut Object, ctx: &HookContext) {}
    fn on_module_instance(&mut self, object: &mut Object, ctx: &HookContext) {}
    fn on_class_instance(&mut self, object: &mut Object, ctx: &HookContext) {}
    fn on_function_instance(&mut self, object: &mut Object, ctx: &HookContext) {}
    fn on_attribute_instance(&mut self, object: &mut Object, ctx: &HookContext) {}
    fn on_type_alias_instance(&mut self, object: &mut Object, ctx: &HookContext) {}
    fn on_alias_instance(&mut self, object: &mut Object, ctx: &HookContext) {}

    fn on_members(&mut self, object: &mut Object, ctx: &HookContext) {}
    fn on_module_members(&mut self, object: &mut Object, ctx: &HookContext) {}
    fn on_class_members(&mut self, object: &mut Object, ctx: &HookContext) {}

    /// A wildcard placeholder was expanded into a concrete alias.
    fn on_wildcard_expansion(&mut self, alias: &mut Object, ctx: &HookContext) {}
    /// The whole requested package finished loading.
    fn on_package_loaded(&mut self, root: &mut Object, ctx: &HookContext) {}
}

/// Registry of extensions; hooks fire in registration order.
#[derive(Default)]
pub struct Extensions {
    extensions: Vec<Box<dyn Extension>>,
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field("count", &self.extensions.len())
            .finish()
    }
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, extension: impl Extension + 'static) {
        self.extensions.push(Box::new(extension));
    }

    pub fn with(mut self, extension: impl Extension + 'static) -> Self {
        self.add(extension);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// `on_node` plus the kind-specific node hook.
    pub fn call_node(&mut self, kind: Kind, node: &ast::Stmt, ctx: &HookContext) {
        for extension in &mut self.extensions {
            extension.on_node(node, ctx);
            match kind {
                Kind::Class => extension.on_class_node(node, ctx),
                Kind::Function => extension.on_function_node(node, ctx),
                Kind::Attribute => extension.on_attribute_node(node, ctx),
                Kind::TypeAlias => extension.on_type_alias_node(node, ctx),
                Kind::Module | Kind::Alias => {}
            }
        }
    }

    pub fn call_module_node(&mut self, node: &ast::ModModule, ctx: &HookContext) {
        for extension in &mut self.extensions {
            extension.on_module_node(node, ctx);
        }
    }

    /// `on_instance` plus the kind-specific instance hook. Aliases only
    /// fire `on_alias_instance`.
    pub fn call_instance(&mut self, object: &mut Object, ctx: &HookContext) {
        for extension in &mut self.extensions {
            if object.is_alias() {
                extension.on_alias_instance(object, ctx);
                continue;
            }
            extension.on_instance(object, ctx);
            match object.kind() {
                Kind::Module => extension.on_module_instance(object, ctx),
                Kind::Class => extension.on_class_instance(object, ctx),
                Kind::Function => extension.on_function_instance(object, ctx),
                Kind::Attribute => extension.on_attribute_instance(object, ctx),
                Kind::TypeAlias => extension.on_type_alias_instance(object, ctx),
                Kind::Alias => {}
            }
        }
    }

    pub fn call_members(&mut self, object: &mut Object, ctx: &HookContext) {
        for extension in &mut self.extensions {
            extension.on_members(object, ctx);
            match object.kind() {
                Kind::Module => extension.on_module_members(object, ctx),
                Kind::Class => extension.on_class_members(object, ctx),
                _ => {}
            }
        }
    }

    pub fn call_wildcard_expansion(&mut self, alias: &mut Object, ctx: &HookContext) {
        for extension in &mut self.extensions {
            extension.on_wildcard_expansion(alias, ctx);
        }
    }

    pub fn call_package_loaded(&mut self, root: &mut Object, ctx: &HookContext) {
        for extension in &mut self.extensions {
            extension.on_package_loaded(root, ctx);
        }
    }
}
