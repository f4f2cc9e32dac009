//! Expression model: a tagged tree mirroring source-level Python
//! expressions (annotations, decorators, default values, base classes).
//!
//! Rendering via [`std::fmt::Display`] is source-equivalent, except that
//! attribute chains of plain names are stored flattened (`a.b.c` is one
//! [`Expr::Attribute`] with three values, not a nested chain).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::object::ModuleCollection;

/// The five Python parameter kinds, in signature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    #[serde(rename = "positional-only")]
    PositionalOnly,
    #[serde(rename = "positional-or-keyword")]
    PositionalOrKeyword,
    #[serde(rename = "variadic-positional")]
    VariadicPositional,
    #[serde(rename = "keyword-only")]
    KeywordOnly,
    #[serde(rename = "variadic-keyword")]
    VariadicKeyword,
}

impl ParameterKind {
    pub fn is_positional(self) -> bool {
        matches!(self, Self::PositionalOnly | Self::PositionalOrKeyword)
    }

    pub fn is_variadic(self) -> bool {
        matches!(self, Self::VariadicPositional | Self::VariadicKeyword)
    }
}

/// A single parameter of a function, method or lambda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub kind: ParameterKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Box<Expr>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Box<Expr>>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            kind,
            name: name.into(),
            annotation: None,
            default: None,
        }
    }

    pub fn required(&self) -> bool {
        self.default.is_none() && !self.kind.is_variadic()
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ParameterKind::VariadicPositional => write!(f, "*{}", self.name)?,
            ParameterKind::VariadicKeyword => write!(f, "**{}", self.name)?,
            _ => write!(f, "{}", self.name)?,
        }
        if let Some(annotation) = &self.annotation {
            write!(f, ": {annotation}")?;
            if let Some(default) = &self.default {
                write!(f, " = {default}")?;
            }
        } else if let Some(default) = &self.default {
            write!(f, "={default}")?;
        }
        Ok(())
    }
}

/// Ordered parameter list. Most signatures are short, so the storage is a
/// small vector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(pub SmallVec<[Parameter; 4]>);

impl Parameters {
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    pub fn push(&mut self, parameter: Parameter) {
        self.0.push(parameter);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.0.iter()
    }

    /// Looks a parameter up by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.0.iter().find(|p| p.name == name)
    }

    /// Positional index of a named parameter, if any.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|p| p.name == name)
    }

    /// Any `*args`-style parameter present?
    pub fn has_variadic_positional(&self) -> bool {
        self.0
            .iter()
            .any(|p| p.kind == ParameterKind::VariadicPositional)
    }

    /// Any `**kwargs`-style parameter present?
    pub fn has_variadic_keyword(&self) -> bool {
        self.0
            .iter()
            .any(|p| p.kind == ParameterKind::VariadicKeyword)
    }
}

impl FromIterator<Parameter> for Parameters {
    fn from_iter<T: IntoIterator<Item = Parameter>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for Parameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

/// PEP 695 type parameter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeParameterKind {
    #[serde(rename = "type-var")]
    TypeVar,
    #[serde(rename = "type-var-tuple")]
    TypeVarTuple,
    #[serde(rename = "param-spec")]
    ParamSpec,
}

/// A type parameter declared with the 3.12 `class C[T]` / `def f[T]` syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParameter {
    pub kind: TypeParameterKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<Expr>,
}

impl std::fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TypeParameterKind::TypeVar => write!(f, "{}", self.name)?,
            TypeParameterKind::TypeVarTuple => write!(f, "*{}", self.name)?,
            TypeParameterKind::ParamSpec => write!(f, "**{}", self.name)?,
        }
        if let Some(bound) = &self.bound {
            write!(f, ": {bound}")?;
        }
        Ok(())
    }
}

/// Expression tree. The `cls` serde tag doubles as the wire discriminator
/// mandated for the JSON dump format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cls", rename_all = "snake_case")]
pub enum Expr {
    /// A plain name, carrying the path of its enclosing scope for
    /// resolution against import maps. The scope is rebuilt at load time
    /// and intentionally not serialized.
    Name {
        name: String,
        #[serde(skip)]
        scope: Option<String>,
    },
    /// Flattened attribute access: `a.b.c` has three values.
    Attribute { values: Vec<Expr> },
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Keyword { name: String, value: Box<Expr> },
    VarPositional { value: Box<Expr> },
    VarKeyword { value: Box<Expr> },
    /// Source-rendered literal text (`'x'`, `42`, `None`, `...`).
    Constant { value: String },
    FormattedValue {
        value: Box<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format_spec: Option<Box<Expr>>,
    },
    JoinedStr { values: Vec<Expr> },
    Lambda {
        parameters: Parameters,
        body: Box<Expr>,
    },
    List { elements: Vec<Expr> },
    Tuple {
        elements: Vec<Expr>,
        /// Rendered without parentheses (subscript position).
        implicit: bool,
    },
    Set { elements: Vec<Expr> },
    /// A missing key marks a `**mapping` expansion.
    Dict {
        keys: Vec<Option<Expr>>,
        values: Vec<Expr>,
    },
    /// One `for target in iterable if ...` clause.
    Comprehension {
        target: Box<Expr>,
        iterable: Box<Expr>,
        conditions: Vec<Expr>,
        is_async: bool,
    },
    ListComp {
        element: Box<Expr>,
        generators: Vec<Expr>,
    },
    SetComp {
        element: Box<Expr>,
        generators: Vec<Expr>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Expr>,
    },
    GeneratorExp {
        element: Box<Expr>,
        generators: Vec<Expr>,
    },
    Subscript { left: Box<Expr>, slice: Box<Expr> },
    Slice {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lower: Option<Box<Expr>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upper: Option<Box<Expr>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<Box<Expr>>,
    },
    ExtSlice { dims: Vec<Expr> },
    /// `body if test else orelse`.
    Ternary {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    /// Operators are stored as their source text (`+`, `|`, `not `).
    BinOp {
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
    },
    BoolOp { operator: String, values: Vec<Expr> },
    Compare {
        left: Box<Expr>,
        operators: Vec<String>,
        comparators: Vec<Expr>,
    },
    UnaryOp { operator: String, value: Box<Expr> },
    Yield {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Box<Expr>>,
    },
    YieldFrom { value: Box<Expr> },
    /// Walrus assignment `target := value`.
    NamedExpr { target: Box<Expr>, value: Box<Expr> },
    Parameter(Parameter),
}

impl Expr {
    pub fn name(name: impl Into<String>, scope: Option<String>) -> Self {
        Self::Name {
            name: name.into(),
            scope,
        }
    }

    pub fn constant(value: impl Into<String>) -> Self {
        Self::Constant {
            value: value.into(),
        }
    }

    /// The dotted path this expression names, resolved against the
    /// enclosing scope's imports and parents. `None` when the expression
    /// is not a (dotted) name or the scope cannot resolve it.
    pub fn canonical_path(&self, collection: &ModuleCollection) -> Option<String> {
        match self {
            Expr::Name { name, scope } => match scope {
                Some(scope) => collection.resolve_name(scope, name),
                None => Some(name.clone()),
            },
            Expr::Attribute { values } => {
                let mut parts = values.iter();
                let first = parts.next()?;
                let mut path = first.canonical_path(collection)?;
                for part in parts {
                    if let Expr::Name { name, .. } = part {
                        path.push('.');
                        path.push_str(name);
                    } else {
                        return None;
                    }
                }
                Some(path)
            }
            _ => None,
        }
    }

    /// Rewrites legacy `typing` spellings into their modern builtin or
    /// PEP 604 forms. Applying it twice changes nothing.
    pub fn modernize(&self) -> Expr {
        match self {
            Expr::Subscript { left, slice } => {
                let rendered = left.to_string();
                match rendered.as_str() {
                    "typing.Dict" | "Dict" => Expr::Subscript {
                        left: Box::new(Expr::name("dict", None)),
                        slice: Box::new(slice.modernize()),
                    },
                    "typing.List" | "List" => Expr::Subscript {
                        left: Box::new(Expr::name("list", None)),
                        slice: Box::new(slice.modernize()),
                    },
                    "typing.Set" | "Set" => Expr::Subscript {
                        left: Box::new(Expr::name("set", None)),
                        slice: Box::new(slice.modernize()),
                    },
                    "typing.Tuple" | "Tuple" => Expr::Subscript {
                        left: Box::new(Expr::name("tuple", None)),
                        slice: Box::new(slice.modernize()),
                    },
                    "typing.Union" | "Union" => match slice.as_ref() {
                        Expr::Tuple { elements, .. } if !elements.is_empty() => {
                            join_pep604(elements.iter().map(Expr::modernize))
                        }
                        other => other.modernize(),
                    },
                    "typing.Optional" | "Optional" => Expr::BinOp {
                        left: Box::new(slice.modernize()),
                        operator: "|".to_string(),
                        right: Box::new(Expr::name("None", None)),
                    },
                    _ => Expr::Subscript {
                        left: Box::new(left.modernize()),
                        slice: Box::new(slice.modernize()),
                    },
                }
            }
            Expr::Name { .. } | Expr::Constant { .. } | Expr::Parameter(_) => self.clone(),
            Expr::Attribute { values } => Expr::Attribute {
                values: modernize_all(values),
            },
            Expr::Call {
                function,
                arguments,
            } => Expr::Call {
                function: Box::new(function.modernize()),
                arguments: modernize_all(arguments),
            },
            Expr::Keyword { name, value } => Expr::Keyword {
                name: name.clone(),
                value: Box::new(value.modernize()),
            },
            Expr::VarPositional { value } => Expr::VarPositional {
                value: Box::new(value.modernize()),
            },
            Expr::VarKeyword { value } => Expr::VarKeyword {
                value: Box::new(value.modernize()),
            },
            Expr::FormattedValue { value, format_spec } => Expr::FormattedValue {
                value: Box::new(value.modernize()),
                format_spec: format_spec.as_ref().map(|e| Box::new(e.modernize())),
            },
            Expr::JoinedStr { values } => Expr::JoinedStr {
                values: modernize_all(values),
            },
            Expr::Lambda { parameters, body } => Expr::Lambda {
                parameters: parameters.clone(),
                body: Box::new(body.modernize()),
            },
            Expr::List { elements } => Expr::List {
                elements: modernize_all(elements),
            },
            Expr::Tuple { elements, implicit } => Expr::Tuple {
                elements: modernize_all(elements),
                implicit: *implicit,
            },
            Expr::Set { elements } => Expr::Set {
                elements: modernize_all(elements),
            },
            Expr::Dict { keys, values } => Expr::Dict {
                keys: keys
                    .iter()
                    .map(|k| k.as_ref().map(Expr::modernize))
                    .collect(),
                values: modernize_all(values),
            },
            Expr::Comprehension {
                target,
                iterable,
                conditions,
                is_async,
            } => Expr::Comprehension {
                target: Box::new(target.modernize()),
                iterable: Box::new(iterable.modernize()),
                conditions: modernize_all(conditions),
                is_async: *is_async,
            },
            Expr::ListComp {
                element,
                generators,
            } => Expr::ListComp {
                element: Box::new(element.modernize()),
                generators: modernize_all(generators),
            },
            Expr::SetComp {
                element,
                generators,
            } => Expr::SetComp {
                element: Box::new(element.modernize()),
                generators: modernize_all(generators),
            },
            Expr::DictComp {
                key,
                value,
                generators,
            } => Expr::DictComp {
                key: Box::new(key.modernize()),
                value: Box::new(value.modernize()),
                generators: modernize_all(generators),
            },
            Expr::GeneratorExp {
                element,
                generators,
            } => Expr::GeneratorExp {
                element: Box::new(element.modernize()),
                generators: modernize_all(generators),
            },
            Expr::Slice { lower, upper, step } => Expr::Slice {
                lower: lower.as_ref().map(|e| Box::new(e.modernize())),
                upper: upper.as_ref().map(|e| Box::new(e.modernize())),
                step: step.as_ref().map(|e| Box::new(e.modernize())),
            },
            Expr::ExtSlice { dims } => Expr::ExtSlice {
                dims: modernize_all(dims),
            },
            Expr::Ternary { test, body, orelse } => Expr::Ternary {
                test: Box::new(test.modernize()),
                body: Box::new(body.modernize()),
                orelse: Box::new(orelse.modernize()),
            },
            Expr::BinOp {
                left,
                operator,
                right,
            } => Expr::BinOp {
                left: Box::new(left.modernize()),
                operator: operator.clone(),
                right: Box::new(right.modernize()),
            },
            Expr::BoolOp { operator, values } => Expr::BoolOp {
                operator: operator.clone(),
                values: modernize_all(values),
            },
            Expr::Compare {
                left,
                operators,
                comparators,
            } => Expr::Compare {
                left: Box::new(left.modernize()),
                operators: operators.clone(),
                comparators: modernize_all(comparators),
            },
            Expr::UnaryOp { operator, value } => Expr::UnaryOp {
                operator: operator.clone(),
                value: Box::new(value.modernize()),
            },
            Expr::Yield { value } => Expr::Yield {
                value: value.as_ref().map(|e| Box::new(e.modernize())),
            },
            Expr::YieldFrom { value } => Expr::YieldFrom {
                value: Box::new(value.modernize()),
            },
            Expr::NamedExpr { target, value } => Expr::NamedExpr {
                target: Box::new(target.modernize()),
                value: Box::new(value.modernize()),
            },
        }
    }
}

fn modernize_all(exprs: &[Expr]) -> Vec<Expr> {
    exprs.iter().map(Expr::modernize).collect()
}

/// Folds expressions into a left-associated `a | b | c` chain.
fn join_pep604(mut elements: impl Iterator<Item = Expr>) -> Expr {
    let first = elements
        .next()
        .unwrap_or_else(|| Expr::name("None", None));
    elements.fold(first, |acc, next| Expr::BinOp {
        left: Box::new(acc),
        operator: "|".to_string(),
        right: Box::new(next),
    })
}

fn join_rendered(exprs: &[Expr], separator: &str) -> String {
    exprs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Name { name, .. } => write!(f, "{name}"),
            Expr::Attribute { values } => write!(f, "{}", join_rendered(values, ".")),
            Expr::Call {
                function,
                arguments,
            } => write!(f, "{function}({})", join_rendered(arguments, ", ")),
            Expr::Keyword { name, value } => write!(f, "{name}={value}"),
            Expr::VarPositional { value } => write!(f, "*{value}"),
            Expr::VarKeyword { value } => write!(f, "**{value}"),
            Expr::Constant { value } => write!(f, "{value}"),
            Expr::FormattedValue { value, format_spec } => {
                write!(f, "{{{value}")?;
                if let Some(spec) = format_spec {
                    write!(f, ":{spec}")?;
                }
                write!(f, "}}")
            }
            Expr::JoinedStr { values } => {
                write!(f, "f'")?;
                for value in values {
                    match value {
                        Expr::Constant { value } => write!(f, "{}", value.trim_matches('\''))?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "'")
            }
            Expr::Lambda { parameters, body } => {
                if parameters.is_empty() {
                    write!(f, "lambda: {body}")
                } else {
                    write!(f, "lambda {parameters}: {body}")
                }
            }
            Expr::List { elements } => write!(f, "[{}]", join_rendered(elements, ", ")),
            Expr::Tuple { elements, implicit } => {
                if *implicit {
                    write!(f, "{}", join_rendered(elements, ", "))
                } else if elements.len() == 1 {
                    write!(f, "({},)", elements[0])
                } else {
                    write!(f, "({})", join_rendered(elements, ", "))
                }
            }
            Expr::Set { elements } => write!(f, "{{{}}}", join_rendered(elements, ", ")),
            Expr::Dict { keys, values } => {
                let items: Vec<String> = keys
                    .iter()
                    .zip(values)
                    .map(|(key, value)| match key {
                        Some(key) => format!("{key}: {value}"),
                        None => format!("**{value}"),
                    })
                    .collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Expr::Comprehension {
                target,
                iterable,
                conditions,
                is_async,
            } => {
                if *is_async {
                    write!(f, "async ")?;
                }
                write!(f, "for {target} in {iterable}")?;
                for condition in conditions {
                    write!(f, " if {condition}")?;
                }
                Ok(())
            }
            Expr::ListComp {
                element,
                generators,
            } => write!(f, "[{element} {}]", join_rendered(generators, " ")),
            Expr::SetComp {
                element,
                generators,
            } => write!(f, "{{{element} {}}}", join_rendered(generators, " ")),
            Expr::DictComp {
                key,
                value,
                generators,
            } => write!(f, "{{{key}: {value} {}}}", join_rendered(generators, " ")),
            Expr::GeneratorExp {
                element,
                generators,
            } => write!(f, "({element} {})", join_rendered(generators, " ")),
            Expr::Subscript { left, slice } => write!(f, "{left}[{slice}]"),
            Expr::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    write!(f, "{lower}")?;
                }
                write!(f, ":")?;
                if let Some(upper) = upper {
                    write!(f, "{upper}")?;
                }
                if let Some(step) = step {
                    write!(f, ":{step}")?;
                }
                Ok(())
            }
            Expr::ExtSlice { dims } => write!(f, "{}", join_rendered(dims, ", ")),
            Expr::Ternary { test, body, orelse } => {
                write!(f, "{body} if {test} else {orelse}")
            }
            Expr::BinOp {
                left,
                operator,
                right,
            } => write!(f, "{left} {operator} {right}"),
            Expr::BoolOp { operator, values } => {
                write!(f, "{}", join_rendered(values, &format!(" {operator} ")))
            }
            Expr::Compare {
                left,
                operators,
                comparators,
            } => {
                write!(f, "{left}")?;
                for (operator, comparator) in operators.iter().zip(comparators) {
                    write!(f, " {operator} {comparator}")?;
                }
                Ok(())
            }
            Expr::UnaryOp { operator, value } => write!(f, "{operator}{value}"),
            Expr::Yield { value } => match value {
                Some(value) => write!(f, "yield {value}"),
                None => write!(f, "yield"),
            },
            Expr::YieldFrom { value } => write!(f, "yield from {value}"),
            Expr::NamedExpr { target, value } => write!(f, "{target} := {value}"),
            Expr::Parameter(parameter) => write!(f, "{parameter}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Expr {
        Expr::name(s, None)
    }

    fn typing_attr(member: &str) -> Expr {
        Expr::Attribute {
            values: vec![name("typing"), name(member)],
        }
    }

    #[test]
    fn test_render_flat_attribute() {
        let expr = Expr::Attribute {
            values: vec![name("a"), name("b"), name("c")],
        };
        assert_eq!(expr.to_string(), "a.b.c");
    }

    #[test]
    fn test_render_call_with_keyword() {
        let expr = Expr::Call {
            function: Box::new(name("f")),
            arguments: vec![
                name("x"),
                Expr::Keyword {
                    name: "flag".to_string(),
                    value: Box::new(Expr::constant("True")),
                },
            ],
        };
        assert_eq!(expr.to_string(), "f(x, flag=True)");
    }

    #[test]
    fn test_render_subscript_tuple_implicit() {
        let expr = Expr::Subscript {
            left: Box::new(name("dict")),
            slice: Box::new(Expr::Tuple {
                elements: vec![name("str"), name("int")],
                implicit: true,
            }),
        };
        assert_eq!(expr.to_string(), "dict[str, int]");
    }

    #[test]
    fn test_render_lambda_and_slice() {
        let mut parameters = Parameters::new();
        parameters.push(Parameter::new("x", ParameterKind::PositionalOrKeyword));
        let lambda = Expr::Lambda {
            parameters,
            body: Box::new(Expr::Subscript {
                left: Box::new(name("x")),
                slice: Box::new(Expr::Slice {
                    lower: Some(Box::new(Expr::constant("1"))),
                    upper: None,
                    step: Some(Box::new(Expr::constant("2"))),
                }),
            }),
        };
        assert_eq!(lambda.to_string(), "lambda x: x[1::2]");
    }

    #[test]
    fn test_render_comprehension() {
        let expr = Expr::ListComp {
            element: Box::new(name("x")),
            generators: vec![Expr::Comprehension {
                target: Box::new(name("x")),
                iterable: Box::new(name("items")),
                conditions: vec![name("x")],
                is_async: false,
            }],
        };
        assert_eq!(expr.to_string(), "[x for x in items if x]");
    }

    #[test]
    fn test_modernize_dict() {
        let expr = Expr::Subscript {
            left: Box::new(typing_attr("Dict")),
            slice: Box::new(Expr::Tuple {
                elements: vec![name("str"), name("int")],
                implicit: true,
            }),
        };
        assert_eq!(expr.modernize().to_string(), "dict[str, int]");
    }

    #[test]
    fn test_modernize_union_preserves_order() {
        let expr = Expr::Subscript {
            left: Box::new(typing_attr("Union")),
            slice: Box::new(Expr::Tuple {
                elements: vec![name("int"), name("str"), name("bytes")],
                implicit: true,
            }),
        };
        assert_eq!(expr.modernize().to_string(), "int | str | bytes");
    }

    #[test]
    fn test_modernize_optional() {
        let expr = Expr::Subscript {
            left: Box::new(name("Optional")),
            slice: Box::new(name("int")),
        };
        assert_eq!(expr.modernize().to_string(), "int | None");
    }

    #[test]
    fn test_modernize_nested() {
        let expr = Expr::Subscript {
            left: Box::new(typing_attr("Optional")),
            slice: Box::new(Expr::Subscript {
                left: Box::new(typing_attr("List")),
                slice: Box::new(name("int")),
            }),
        };
        assert_eq!(expr.modernize().to_string(), "list[int] | None");
    }

    #[test]
    fn test_modernize_idempotent() {
        let exprs = vec![
            Expr::Subscript {
                left: Box::new(typing_attr("Union")),
                slice: Box::new(Expr::Tuple {
                    elements: vec![name("int"), name("str")],
                    implicit: true,
                }),
            },
            Expr::Subscript {
                left: Box::new(name("Optional")),
                slice: Box::new(name("int")),
            },
            name("str"),
            Expr::constant("'forward ref'"),
        ];
        for expr in exprs {
            let once = expr.modernize();
            assert_eq!(once.modernize(), once);
        }
    }

    #[test]
    fn test_modernize_leaves_string_annotations_alone() {
        // Forward references stay opaque constants.
        let expr = Expr::constant("'Optional[int]'");
        assert_eq!(expr.modernize(), expr);
    }

    #[test]
    fn test_parameter_rendering() {
        let mut p = Parameter::new("timeout", ParameterKind::KeywordOnly);
        p.annotation = Some(Box::new(name("float")));
        p.default = Some(Box::new(Expr::constant("1.0")));
        assert_eq!(p.to_string(), "timeout: float = 1.0");

        let star = Parameter::new("args", ParameterKind::VariadicPositional);
        assert_eq!(star.to_string(), "*args");
    }

    #[test]
    fn test_expression_cls_discriminator() {
        let expr = name("x");
        let value = serde_json::to_value(&expr).unwrap();
        assert_eq!(value["cls"], "name");
        let back: Expr = serde_json::from_value(value).unwrap();
        assert_eq!(back.to_string(), "x");
    }

    #[test]
    fn test_unknown_cls_fails_loudly() {
        let result: Result<Expr, _> =
            serde_json::from_str(r#"{"cls": "no_such_expression", "value": "x"}"#);
        assert!(result.is_err());
    }
}
