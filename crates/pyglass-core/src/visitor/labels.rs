//! Well-known decorators recognized by their callable path.

/// Labels contributed by a decorator, if it is one we know.
pub(super) fn decorator_labels(path: &str) -> Option<&'static [&'static str]> {
    Some(match path {
        "property" | "builtins.property" => &["property"],
        "staticmethod" | "builtins.staticmethod" => &["static"],
        "classmethod" | "builtins.classmethod" => &["classmethod"],
        "abstractmethod" | "abc.abstractmethod" => &["abstractmethod"],
        "cache" | "lru_cache" | "functools.cache" | "functools.lru_cache" => &["cached"],
        "cached_property" | "functools.cached_property" => &["cached", "property"],
        "dataclass" | "dataclasses.dataclass" => &["dataclass"],
        "deprecated" | "warnings.deprecated" | "typing_extensions.deprecated" => &["deprecated"],
        _ => return None,
    })
}

pub(super) fn is_overload_decorator(path: &str) -> bool {
    matches!(path, "overload" | "typing.overload" | "typing_extensions.overload")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PropertyBinding {
    Setter,
    Deleter,
}

/// `@x.setter` / `@x.deleter` on a method named `x`.
pub(super) fn property_binding(path: &str, method_name: &str) -> Option<PropertyBinding> {
    if let Some(owner) = path.strip_suffix(".setter") {
        if owner == method_name {
            return Some(PropertyBinding::Setter);
        }
    }
    if let Some(owner) = path.strip_suffix(".deleter") {
        if owner == method_name {
            return Some(PropertyBinding::Deleter);
        }
    }
    None
}
