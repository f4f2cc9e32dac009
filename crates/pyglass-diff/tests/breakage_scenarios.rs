//! End-to-end breakage detection over real loaded packages.

use pyglass_core::testing::{temporary_visited_package, TemporaryPackage};
use pyglass_diff::{check, Breakage, BreakageDetails, BreakageKind, Snapshot};

fn load_pair(old_init: &str, new_init: &str) -> (TemporaryPackage, TemporaryPackage) {
    let old = temporary_visited_package("pkg", &[("__init__.py", old_init)]).unwrap();
    let new = temporary_visited_package("pkg", &[("__init__.py", new_init)]).unwrap();
    (old, new)
}

fn diff(old: &TemporaryPackage, new: &TemporaryPackage) -> Vec<Breakage> {
    check(
        Snapshot::new(old.root(), &old.loader.collection),
        Snapshot::new(new.root(), &new.loader.collection),
    )
}

#[test]
fn test_signature_reorder_reports_both_moves() {
    let (old, new) = load_pair(
        "def greet(prefix, name): ...\n",
        "def greet(name, prefix): ...\n",
    );
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 2);
    assert_eq!(
        breakages[0].details,
        BreakageDetails::ParameterMoved {
            parameter: "prefix".to_string(),
            old_index: 0,
            new_index: 1,
        }
    );
    assert_eq!(
        breakages[1].details,
        BreakageDetails::ParameterMoved {
            parameter: "name".to_string(),
            old_index: 1,
            new_index: 0,
        }
    );
}

#[test]
fn test_parameter_now_required() {
    let (old, new) = load_pair(
        "def greet(name, prefix=\"hello\"): ...\n",
        "def greet(name, prefix): ...\n",
    );
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 1);
    assert_eq!(breakages[0].kind, BreakageKind::ParameterNowRequired);
    assert_eq!(breakages[0].old_path, "pkg.greet");
}

#[test]
fn test_parameter_added_required() {
    let (old, new) = load_pair("def f(a): ...\n", "def f(a, b): ...\n");
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 1);
    assert_eq!(breakages[0].kind, BreakageKind::ParameterAddedRequired);
}

#[test]
fn test_parameter_removed_unless_absorbed() {
    let (old, new) = load_pair("def f(a, b): ...\n", "def f(a): ...\n");
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 1);
    assert_eq!(breakages[0].kind, BreakageKind::ParameterRemoved);

    let (old, new) = load_pair("def f(a, b): ...\n", "def f(a, *args, **kwargs): ...\n");
    assert!(diff(&old, &new).is_empty());
}

#[test]
fn test_parameter_kind_changed() {
    let (old, new) = load_pair("def f(a, b): ...\n", "def f(a, *, b): ...\n");
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 1);
    assert_eq!(breakages[0].kind, BreakageKind::ParameterKindChanged);
}

#[test]
fn test_parameter_default_changed() {
    let (old, new) = load_pair("def f(a=1): ...\n", "def f(a=2): ...\n");
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 1);
    assert_eq!(
        breakages[0].details,
        BreakageDetails::ParameterDefaultChanged {
            parameter: "a".to_string(),
            old_default: "1".to_string(),
            new_default: "2".to_string(),
        }
    );
}

#[test]
fn test_object_removed_and_privatized() {
    let (old, new) = load_pair("def gone(): ...\ndef renamed(): ...\n", "def _renamed(): ...\n");
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 2);
    assert!(breakages
        .iter()
        .all(|b| b.kind == BreakageKind::ObjectRemoved));
}

#[test]
fn test_object_kind_changed() {
    let (old, new) = load_pair("def thing(): ...\n", "thing = 42\n");
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 1);
    assert_eq!(breakages[0].kind, BreakageKind::ObjectKindChanged);
}

#[test]
fn test_attribute_value_changed() {
    let (old, new) = load_pair("TIMEOUT = 30\n", "TIMEOUT = 60\n");
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 1);
    assert_eq!(
        breakages[0].details,
        BreakageDetails::AttributeValueChanged {
            old_value: "30".to_string(),
            new_value: "60".to_string(),
        }
    );
}

#[test]
fn test_class_base_removed() {
    let (old, new) = load_pair(
        "class Base: ...\nclass Impl(Base): ...\n",
        "class Base: ...\nclass Impl: ...\n",
    );
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 1);
    assert_eq!(
        breakages[0].details,
        BreakageDetails::ClassBaseRemoved {
            base: "pkg.Base".to_string(),
        }
    );
}

#[test]
fn test_private_objects_are_not_reported() {
    let (old, new) = load_pair("def _helper(a, b): ...\n", "def _helper(): ...\n");
    assert!(diff(&old, &new).is_empty());
}

#[test]
fn test_method_changes_inside_classes() {
    let (old, new) = load_pair(
        "class C:\n    def m(self, a): ...\n",
        "class C:\n    def m(self, a, b): ...\n",
    );
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 1);
    assert_eq!(breakages[0].kind, BreakageKind::ParameterAddedRequired);
    assert_eq!(breakages[0].old_path, "pkg.C.m");
}

#[test]
fn test_location_points_at_new_object() {
    let (old, new) = load_pair(
        "def f(a=1): ...\n",
        "\n\ndef f(a): ...\n",
    );
    let breakages = diff(&old, &new);
    assert_eq!(breakages[0].lineno, Some(3));
    assert!(breakages[0]
        .filepath
        .as_ref()
        .unwrap()
        .ends_with("pkg/__init__.py"));
}

#[test]
fn test_exported_alias_reports_exposure_path() {
    // pkg exposes `Widget` from an internal module via __all__; the
    // comparison follows the alias but reports the public exposure.
    let files_old = [
        (
            "__init__.py",
            "from pkg._impl import Widget\n__all__ = [\"Widget\"]\n",
        ),
        ("_impl.py", "class Widget:\n    def draw(self, x): ...\n"),
    ];
    let files_new = [
        (
            "__init__.py",
            "from pkg._impl import Widget\n__all__ = [\"Widget\"]\n",
        ),
        ("_impl.py", "class Widget:\n    def draw(self, x, y): ...\n"),
    ];
    let old = temporary_visited_package("pkg", &files_old).unwrap();
    let new = temporary_visited_package("pkg", &files_new).unwrap();
    let breakages = diff(&old, &new);
    assert_eq!(breakages.len(), 1);
    assert_eq!(breakages[0].kind, BreakageKind::ParameterAddedRequired);
    assert!(breakages[0].old_path.starts_with("pkg.Widget"));
}
