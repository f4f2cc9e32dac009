//! Alias resolver: follows alias chains to concrete targets across
//! modules and expands wildcard imports, looping to a fixed point.
//!
//! Chains never partially resolve: a cycle leaves every link unresolved,
//! and consumers see the error when they access the alias. The whole pass
//! is pure in-memory; running it twice changes nothing.

use std::collections::HashSet;

use pyglass_model::{ExportItem, ModuleCollection, Object, ObjectKind};
use tracing::{debug, warn};

use crate::extensions::{Agent, Extensions, HookContext};

/// Knobs for one resolution run.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Fixed-point iteration cap; leftover work is logged when exceeded.
    pub max_iterations: usize,
    /// Resolve every alias, not only publicly exposed ones.
    pub implicit: bool,
    /// Follow targets into packages other than the alias's own.
    pub external: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            implicit: false,
            external: false,
        }
    }
}

/// Runs direct and wildcard passes until nothing changes or the iteration
/// budget is exhausted. Returns the number of aliases resolved.
pub fn resolve(
    collection: &mut ModuleCollection,
    extensions: &mut Extensions,
    options: &ResolveOptions,
) -> usize {
    let mut total = 0;
    let mut iteration = 0;
    loop {
        iteration += 1;
        let resolved = direct_pass(collection, options);
        let expanded = wildcard_pass(collection, extensions);
        total += resolved;
        if resolved == 0 && expanded == 0 {
            break;
        }
        if iteration >= options.max_iterations {
            debug!(iteration, "alias resolution budget exhausted");
            break;
        }
    }
    for placeholder in collect_aliases(collection)
        .into_iter()
        .filter(|a| a.wildcard)
    {
        warn!(alias = %placeholder.path, target = %placeholder.target, "wildcard left unexpanded");
    }
    total
}

#[derive(Debug, Clone)]
struct PendingAlias {
    path: String,
    parent: Option<String>,
    target: String,
    wildcard: bool,
    lineno: Option<usize>,
    endlineno: Option<usize>,
}

/// Every unresolved alias in the collection, in deterministic order.
fn collect_aliases(collection: &ModuleCollection) -> Vec<PendingAlias> {
    let mut pending = Vec::new();
    let mut stack: Vec<&Object> = collection.roots().collect();
    while let Some(object) = stack.pop() {
        if let ObjectKind::Alias(data) = &object.kind {
            if data.resolved.is_none() {
                pending.push(PendingAlias {
                    path: object.path.clone(),
                    parent: object.parent.clone(),
                    target: data.target.clone(),
                    wildcard: data.wildcard,
                    lineno: object.lineno,
                    endlineno: object.endlineno,
                });
            }
        }
        for member in object.members.values() {
            stack.push(member);
        }
    }
    pending.sort_by(|a, b| a.path.cmp(&b.path));
    pending
}

/// Pass A: resolve direct aliases to their final targets and record the
/// reverse links.
fn direct_pass(collection: &mut ModuleCollection, options: &ResolveOptions) -> usize {
    let mut updates = Vec::new();
    for alias in collect_aliases(collection) {
        if alias.wildcard {
            continue;
        }
        if !options.implicit {
            let Some(object) = collection.get(&alias.path) else {
                continue;
            };
            if !object.is_public(collection) {
                continue;
            }
        }
        if !options.external && !same_or_loaded_root(collection, &alias.target) {
            // External resolution disabled: leave silently unresolved.
            continue;
        }
        match follow_chain(collection, &alias.path, &alias.target) {
            Follow::Resolved(final_path) => updates.push((alias.path, final_path)),
            Follow::Cyclic(chain) => {
                debug!(chain = chain.join(" -> "), "cyclic alias chain left unresolved");
            }
            Follow::Unresolved => {}
        }
    }

    let mut resolved = 0;
    for (alias_path, final_path) in updates {
        if let Some(object) = collection.get_mut(&alias_path) {
            if let ObjectKind::Alias(data) = &mut object.kind {
                data.resolved = Some(final_path.clone());
                resolved += 1;
            }
        }
        if let Some(target) = collection.get_mut(&final_path) {
            if !target.aliases.contains(&alias_path) {
                target.aliases.push(alias_path);
            }
        }
    }
    resolved
}

fn same_or_loaded_root(collection: &ModuleCollection, target: &str) -> bool {
    let root = target.split('.').next().unwrap_or(target);
    collection.get(root).is_some()
}

enum Follow {
    Resolved(String),
    Unresolved,
    Cyclic(Vec<String>),
}

/// Follows one alias chain with cycle detection. Only the final target is
/// ever cached.
fn follow_chain(collection: &ModuleCollection, alias_path: &str, first_target: &str) -> Follow {
    let mut chain = vec![alias_path.to_string()];
    let mut target = first_target.to_string();
    loop {
        let Some(found_path) = locate(collection, &target) else {
            return Follow::Unresolved;
        };
        let Some(object) = collection.get(&found_path) else {
            return Follow::Unresolved;
        };
        match &object.kind {
            ObjectKind::Alias(data) => {
                if data.wildcard {
                    // Expansion has not produced the concrete alias yet.
                    return Follow::Unresolved;
                }
                if let Some(resolved) = &data.resolved {
                    return Follow::Resolved(resolved.clone());
                }
                if chain.contains(&found_path) {
                    chain.push(found_path);
                    return Follow::Cyclic(chain);
                }
                chain.push(found_path.clone());
                target = data.target.clone();
            }
            _ => return Follow::Resolved(found_path),
        }
    }
}

/// Locates the entity at `path`: the longest prefix naming a loaded
/// module, then member descent, following intra-project import
/// redirections along the way.
fn locate(collection: &ModuleCollection, path: &str) -> Option<String> {
    let mut visited = HashSet::new();
    let mut current = path.to_string();
    'restart: loop {
        if !visited.insert(current.clone()) {
            return None;
        }
        let parts: Vec<&str> = current.split('.').collect();
        let mut object = collection.get(parts[0])?;
        let mut resolved = parts[0].to_string();
        for (index, part) in parts[1..].iter().enumerate() {
            if let Some(child) = object.get_member(part) {
                object = child;
                resolved.push('.');
                resolved.push_str(part);
                continue;
            }
            if let ObjectKind::Module(module) = &object.kind {
                if let Some(redirect) = module.imports.get(*part) {
                    let rest = parts[index + 2..].join(".");
                    current = if rest.is_empty() {
                        redirect.clone()
                    } else {
                        format!("{redirect}.{rest}")
                    };
                    continue 'restart;
                }
            }
            return None;
        }
        return Some(resolved);
    }
}

/// Pass B: expand wildcard placeholders into concrete aliases.
fn wildcard_pass(collection: &mut ModuleCollection, extensions: &mut Extensions) -> usize {
    let pending: Vec<PendingAlias> = collect_aliases(collection)
        .into_iter()
        .filter(|a| a.wildcard)
        .collect();

    let mut expanded_total = 0;
    for placeholder in pending {
        let Some(parent_path) = placeholder.parent.clone() else {
            continue;
        };
        let Some(source_path) = locate(collection, &placeholder.target) else {
            continue;
        };
        let Some(source) = collection.get(&source_path) else {
            continue;
        };
        if !source.is_module() {
            continue;
        }
        // Defer until the source module's own wildcards are expanded; the
        // fixed-point loop orders dependencies for us.
        if source.members.keys().any(|key| key.starts_with('*')) {
            continue;
        }
        let names = exposed_names(source);
        let source_module_path = source.path.clone();

        let Some(module) = collection.get_mut(&parent_path) else {
            continue;
        };
        for name in names {
            if module
                .get_member(&name)
                .is_some_and(|member| !member.is_wildcard_alias())
            {
                // Explicit members win over wildcard-imported names.
                continue;
            }
            let mut alias = Object::alias(name.clone(), format!("{source_module_path}.{name}"));
            alias.lineno = placeholder.lineno;
            alias.endlineno = placeholder.endlineno;
            module.set_member(name.clone(), alias);
            let ctx = HookContext {
                agent: Agent::Resolver,
                module_path: &parent_path,
                filepath: None,
            };
            if let Some(created) = module.get_member_mut(&name) {
                extensions.call_wildcard_expansion(created, &ctx);
            }
            expanded_total += 1;
        }
        let placeholder_key = placeholder
            .path
            .strip_prefix(&format!("{parent_path}."))
            .unwrap_or(&placeholder.path)
            .to_string();
        module.members.shift_remove(&placeholder_key);
    }
    expanded_total
}

/// Names a wildcard import of `module` brings in: the exports list when
/// declared, else public-by-name members that are neither imported nor
/// submodules.
fn exposed_names(module: &Object) -> Vec<String> {
    match module.exports() {
        Some(exports) => exports
            .iter()
            .filter_map(|item| match item {
                ExportItem::Literal(name) => Some(name.clone()),
                ExportItem::Name { .. } => None,
            })
            .collect(),
        None => module
            .members
            .iter()
            .filter(|(name, member)| {
                !name.starts_with('_') && !member.is_alias() && !member.is_module()
            })
            .map(|(name, _)| name.clone())
            .collect(),
    }
}

#[cfg(test)]
mod tests;
