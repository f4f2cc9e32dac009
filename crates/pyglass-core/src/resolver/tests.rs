use pyglass_model::{ClassData, ExportItem, ModuleCollection, Object, ObjectKind};

use crate::extensions::Extensions;

use super::{resolve, ResolveOptions};

fn class(name: &str) -> Object {
    Object::new(name, ObjectKind::Class(ClassData::default()))
}

fn implicit_options() -> ResolveOptions {
    ResolveOptions {
        implicit: true,
        ..ResolveOptions::default()
    }
}

fn wildcard_alias(target: &str) -> Object {
    let mut alias = Object::alias(format!("*{target}"), target);
    if let ObjectKind::Alias(data) = &mut alias.kind {
        data.wildcard = true;
    }
    alias
}

#[test]
fn test_direct_chain_resolves_to_final_target() {
    // c.Z -> b.Y -> a.X (a class)
    let mut module_a = Object::module("a");
    module_a.set_member("X", class("X"));
    let mut module_b = Object::module("b");
    module_b.set_member("Y", Object::alias("Y", "a.X"));
    let mut module_c = Object::module("c");
    module_c.set_member("Z", Object::alias("Z", "b.Y"));
    let mut collection = ModuleCollection::new();
    collection.insert(module_a);
    collection.insert(module_b);
    collection.insert(module_c);

    let mut extensions = Extensions::new();
    let options = ResolveOptions {
        implicit: true,
        external: true,
        ..ResolveOptions::default()
    };
    resolve(&mut collection, &mut extensions, &options);

    let alias = collection.get("c.Z").unwrap();
    assert!(alias.resolved());
    let target = alias.final_target(&collection).unwrap();
    assert_eq!(target.path, "a.X");
    // Reverse link recorded on the target.
    assert!(collection.get("a.X").unwrap().aliases.contains(&"c.Z".to_string()));
}

#[test]
fn test_import_map_redirection() {
    // pkg.api imports `core` as pkg.core; alias target pkg.api.core.Thing
    // descends through the import map.
    let mut api = Object::module("api");
    if let ObjectKind::Module(data) = &mut api.kind {
        data.imports.insert("core".to_string(), "pkg.core".to_string());
    }
    let mut core = Object::module("core");
    core.set_member("Thing", class("Thing"));
    let mut pkg = Object::module("pkg");
    pkg.set_member("api", api);
    pkg.set_member("core", core);
    pkg.set_member("T", Object::alias("T", "pkg.api.core.Thing"));
    let mut collection = ModuleCollection::new();
    collection.insert(pkg);

    let mut extensions = Extensions::new();
    resolve(&mut collection, &mut extensions, &implicit_options());

    let alias = collection.get("pkg.T").unwrap();
    assert_eq!(
        alias.final_target(&collection).unwrap().path,
        "pkg.core.Thing"
    );
}

#[test]
fn test_cycle_leaves_chain_unresolved() {
    let mut module_a = Object::module("a");
    module_a.set_member("X", Object::alias("X", "b.X"));
    let mut module_b = Object::module("b");
    module_b.set_member("X", Object::alias("X", "a.X"));
    let mut collection = ModuleCollection::new();
    collection.insert(module_a);
    collection.insert(module_b);

    let mut extensions = Extensions::new();
    let options = ResolveOptions {
        implicit: true,
        external: true,
        ..ResolveOptions::default()
    };
    resolve(&mut collection, &mut extensions, &options);

    // No link in the chain resolved.
    assert!(!collection.get("a.X").unwrap().resolved());
    assert!(!collection.get("b.X").unwrap().resolved());
}

#[test]
fn test_wildcard_expands_public_members_only() {
    let mut impl_module = Object::module("_impl");
    impl_module.set_member("A", class("A"));
    impl_module.set_member("B", class("B"));
    impl_module.set_member("_C", class("_C"));
    impl_module.set_member("os", Object::alias("os", "os"));
    let mut pkg = Object::module("pkg");
    pkg.set_member("_impl", impl_module);
    pkg.set_member("*pkg._impl", wildcard_alias("pkg._impl"));
    let mut collection = ModuleCollection::new();
    collection.insert(pkg);

    let mut extensions = Extensions::new();
    resolve(&mut collection, &mut extensions, &implicit_options());

    let pkg = collection.get("pkg").unwrap();
    assert_eq!(
        pkg.get_member("A").unwrap().target_path(),
        Some("pkg._impl.A")
    );
    assert_eq!(
        pkg.get_member("B").unwrap().target_path(),
        Some("pkg._impl.B")
    );
    assert!(pkg.get_member("_C").is_none());
    // Imported names are not re-exported by a wildcard.
    assert!(pkg.get_member("os").is_none());
    // The placeholder is gone.
    assert!(pkg.get_member("*pkg._impl").is_none());
}

#[test]
fn test_wildcard_respects_exports_list() {
    let mut impl_module = Object::module("_impl");
    if let ObjectKind::Module(data) = &mut impl_module.kind {
        data.exports = Some(vec![ExportItem::Literal("_C".to_string())]);
    }
    impl_module.set_member("A", class("A"));
    impl_module.set_member("_C", class("_C"));
    let mut pkg = Object::module("pkg");
    pkg.set_member("_impl", impl_module);
    pkg.set_member("*pkg._impl", wildcard_alias("pkg._impl"));
    let mut collection = ModuleCollection::new();
    collection.insert(pkg);

    let mut extensions = Extensions::new();
    resolve(&mut collection, &mut extensions, &implicit_options());

    let pkg = collection.get("pkg").unwrap();
    assert!(pkg.get_member("A").is_none());
    assert!(pkg.get_member("_C").is_some());
}

#[test]
fn test_chained_wildcards_reach_fixed_point() {
    // pkg re-exports * from mid, which re-exports * from base.
    let mut base = Object::module("base");
    base.set_member("thing", class("thing"));
    let mut mid = Object::module("mid");
    mid.set_member("*pkg.base", wildcard_alias("pkg.base"));
    let mut pkg = Object::module("pkg");
    pkg.set_member("base", base);
    pkg.set_member("mid", mid);
    pkg.set_member("*pkg.mid", wildcard_alias("pkg.mid"));
    let mut collection = ModuleCollection::new();
    collection.insert(pkg);

    let mut extensions = Extensions::new();
    resolve(&mut collection, &mut extensions, &implicit_options());

    let pkg = collection.get("pkg").unwrap();
    // `thing` travelled base -> mid -> pkg. The expansion of `mid` created
    // an alias, which the top-level wildcard does not re-export.
    assert!(collection.get("pkg.mid.thing").is_some());
    assert!(pkg.get_member("*pkg.mid").is_none());
}

#[test]
fn test_resolution_is_idempotent() {
    let mut module_a = Object::module("a");
    module_a.set_member("X", class("X"));
    let mut module_b = Object::module("b");
    module_b.set_member("Y", Object::alias("Y", "a.X"));
    let mut collection = ModuleCollection::new();
    collection.insert(module_a);
    collection.insert(module_b);

    let mut extensions = Extensions::new();
    let options = ResolveOptions {
        implicit: true,
        external: true,
        ..ResolveOptions::default()
    };
    resolve(&mut collection, &mut extensions, &options);
    let snapshot = collection.clone();
    let resolved_again = resolve(&mut collection, &mut extensions, &options);
    assert_eq!(resolved_again, 0);
    assert_eq!(collection.get("b.Y"), snapshot.get("b.Y"));
}

#[test]
fn test_external_targets_skipped_when_disabled() {
    let mut module_a = Object::module("a");
    module_a.set_member("X", Object::alias("X", "numpy.ndarray"));
    let mut collection = ModuleCollection::new();
    collection.insert(module_a);

    let mut extensions = Extensions::new();
    resolve(&mut collection, &mut extensions, &implicit_options());
    assert!(!collection.get("a.X").unwrap().resolved());
}
