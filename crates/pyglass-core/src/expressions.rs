//! Builds model expressions from parsed AST nodes.
//!
//! Names carry the path of the enclosing scope so they can later be
//! resolved through import maps. Attribute chains of plain names are
//! flattened on construction.

use std::path::Path;

use anyhow::{bail, Result};
use pyglass_model::{Expr, Parameter, ParameterKind, Parameters, TypeParameter, TypeParameterKind};
use rustpython_ast::{self as ast};
use tracing::debug;

/// Converts one AST expression, attaching `scope` to name nodes.
pub fn build_expr(node: &ast::Expr, scope: &str) -> Result<Expr> {
    Ok(match node {
        ast::Expr::Name(name) => Expr::name(name.id.to_string(), Some(scope.to_string())),
        ast::Expr::Attribute(attribute) => build_attribute(attribute, scope)?,
        ast::Expr::Constant(constant) => Expr::constant(render_constant(&constant.value)),
        ast::Expr::Call(call) => {
            let mut arguments = Vec::with_capacity(call.args.len() + call.keywords.len());
            for arg in &call.args {
                arguments.push(build_expr(arg, scope)?);
            }
            for keyword in &call.keywords {
                let value = Box::new(build_expr(&keyword.value, scope)?);
                arguments.push(match &keyword.arg {
                    Some(name) => Expr::Keyword {
                        name: name.to_string(),
                        value,
                    },
                    None => Expr::VarKeyword { value },
                });
            }
            Expr::Call {
                function: Box::new(build_expr(&call.func, scope)?),
                arguments,
            }
        }
        ast::Expr::Starred(starred) => Expr::VarPositional {
            value: Box::new(build_expr(&starred.value, scope)?),
        },
        ast::Expr::BinOp(binop) => Expr::BinOp {
            left: Box::new(build_expr(&binop.left, scope)?),
            operator: binop_str(&binop.op).to_string(),
            right: Box::new(build_expr(&binop.right, scope)?),
        },
        ast::Expr::BoolOp(boolop) => Expr::BoolOp {
            operator: boolop_str(&boolop.op).to_string(),
            values: build_all(&boolop.values, scope)?,
        },
        ast::Expr::UnaryOp(unary) => Expr::UnaryOp {
            operator: unaryop_str(&unary.op).to_string(),
            value: Box::new(build_expr(&unary.operand, scope)?),
        },
        ast::Expr::Compare(compare) => Expr::Compare {
            left: Box::new(build_expr(&compare.left, scope)?),
            operators: compare.ops.iter().map(|op| cmpop_str(op).to_string()).collect(),
            comparators: build_all(&compare.comparators, scope)?,
        },
        ast::Expr::Lambda(lambda) => Expr::Lambda {
            parameters: build_parameters(&lambda.args, scope)?,
            body: Box::new(build_expr(&lambda.body, scope)?),
        },
        ast::Expr::IfExp(ternary) => Expr::Ternary {
            test: Box::new(build_expr(&ternary.test, scope)?),
            body: Box::new(build_expr(&ternary.body, scope)?),
            orelse: Box::new(build_expr(&ternary.orelse, scope)?),
        },
        ast::Expr::List(list) => Expr::List {
            elements: build_all(&list.elts, scope)?,
        },
        ast::Expr::Tuple(tuple) => Expr::Tuple {
            elements: build_all(&tuple.elts, scope)?,
            implicit: false,
        },
        ast::Expr::Set(set) => Expr::Set {
            elements: build_all(&set.elts, scope)?,
        },
        ast::Expr::Dict(dict) => {
            let mut keys = Vec::with_capacity(dict.keys.len());
            for key in &dict.keys {
                keys.push(match key {
                    Some(key) => Some(build_expr(key, scope)?),
                    None => None,
                });
            }
            Expr::Dict {
                keys,
                values: build_all(&dict.values, scope)?,
            }
        }
        ast::Expr::Subscript(subscript) => {
            let slice = match subscript.slice.as_ref() {
                // A bare tuple in subscript position renders without
                // parentheses: `dict[str, int]`.
                ast::Expr::Tuple(tuple) => Expr::Tuple {
                    elements: build_all(&tuple.elts, scope)?,
                    implicit: true,
                },
                other => build_expr(other, scope)?,
            };
            Expr::Subscript {
                left: Box::new(build_expr(&subscript.value, scope)?),
                slice: Box::new(slice),
            }
        }
        ast::Expr::Slice(slice) => Expr::Slice {
            lower: build_opt(&slice.lower, scope)?,
            upper: build_opt(&slice.upper, scope)?,
            step: build_opt(&slice.step, scope)?,
        },
        ast::Expr::ListComp(comp) => Expr::ListComp {
            element: Box::new(build_expr(&comp.elt, scope)?),
            generators: build_generators(&comp.generators, scope)?,
        },
        ast::Expr::SetComp(comp) => Expr::SetComp {
            element: Box::new(build_expr(&comp.elt, scope)?),
            generators: build_generators(&comp.generators, scope)?,
        },
        ast::Expr::DictComp(comp) => Expr::DictComp {
            key: Box::new(build_expr(&comp.key, scope)?),
            value: Box::new(build_expr(&comp.value, scope)?),
            generators: build_generators(&comp.generators, scope)?,
        },
        ast::Expr::GeneratorExp(comp) => Expr::GeneratorExp {
            element: Box::new(build_expr(&comp.elt, scope)?),
            generators: build_generators(&comp.generators, scope)?,
        },
        ast::Expr::JoinedStr(joined) => Expr::JoinedStr {
            values: build_all(&joined.values, scope)?,
        },
        ast::Expr::FormattedValue(formatted) => Expr::FormattedValue {
            value: Box::new(build_expr(&formatted.value, scope)?),
            format_spec: build_opt(&formatted.format_spec, scope)?,
        },
        ast::Expr::Yield(node) => Expr::Yield {
            value: build_opt(&node.value, scope)?,
        },
        ast::Expr::YieldFrom(node) => Expr::YieldFrom {
            value: Box::new(build_expr(&node.value, scope)?),
        },
        ast::Expr::NamedExpr(walrus) => Expr::NamedExpr {
            target: Box::new(build_expr(&walrus.target, scope)?),
            value: Box::new(build_expr(&walrus.value, scope)?),
        },
        other => bail!("unsupported expression construct: {}", expr_kind_name(other)),
    })
}

/// Fallible wrapper: failures are logged with file and line context and
/// collapse to `None` instead of aborting the statement.
pub fn safe_expr(node: &ast::Expr, scope: &str, filepath: &Path, lineno: usize) -> Option<Expr> {
    match build_expr(node, scope) {
        Ok(expr) => Some(expr),
        Err(error) => {
            debug!(
                file = %filepath.display(),
                line = lineno,
                %error,
                "could not reflect expression",
            );
            None
        }
    }
}

fn build_all(nodes: &[ast::Expr], scope: &str) -> Result<Vec<Expr>> {
    nodes.iter().map(|node| build_expr(node, scope)).collect()
}

fn build_opt(node: &Option<Box<ast::Expr>>, scope: &str) -> Result<Option<Box<Expr>>> {
    Ok(match node {
        Some(node) => Some(Box::new(build_expr(node, scope)?)),
        None => None,
    })
}

fn build_generators(generators: &[ast::Comprehension], scope: &str) -> Result<Vec<Expr>> {
    generators
        .iter()
        .map(|generator| {
            Ok(Expr::Comprehension {
                target: Box::new(build_expr(&generator.target, scope)?),
                iterable: Box::new(build_expr(&generator.iter, scope)?),
                conditions: build_all(&generator.ifs, scope)?,
                is_async: generator.is_async,
            })
        })
        .collect()
}

/// Flattens `a.b.c` into a single attribute expression with three values.
/// Only the base name carries the scope; trailing segments are resolved
/// through it.
fn build_attribute(attribute: &ast::ExprAttribute, scope: &str) -> Result<Expr> {
    let mut names = vec![attribute.attr.to_string()];
    let mut base = attribute.value.as_ref();
    while let ast::Expr::Attribute(inner) = base {
        names.push(inner.attr.to_string());
        base = inner.value.as_ref();
    }
    names.reverse();
    let mut values = Vec::with_capacity(names.len() + 1);
    values.push(build_expr(base, scope)?);
    for name in names {
        values.push(Expr::name(name, None));
    }
    Ok(Expr::Attribute { values })
}

/// Builds the five-kind parameter list of a function or lambda.
/// Variadic parameters carry their literal empty defaults (`()` / `{}`).
pub fn build_parameters(args: &ast::Arguments, scope: &str) -> Result<Parameters> {
    let mut parameters = Parameters::new();
    for arg in &args.posonlyargs {
        parameters.push(build_parameter(arg, ParameterKind::PositionalOnly, scope)?);
    }
    for arg in &args.args {
        parameters.push(build_parameter(arg, ParameterKind::PositionalOrKeyword, scope)?);
    }
    if let Some(vararg) = &args.vararg {
        let mut parameter = Parameter::new(vararg.arg.to_string(), ParameterKind::VariadicPositional);
        if let Some(annotation) = &vararg.annotation {
            parameter.annotation = Some(Box::new(build_expr(annotation, scope)?));
        }
        parameter.default = Some(Box::new(Expr::constant("()")));
        parameters.push(parameter);
    }
    for arg in &args.kwonlyargs {
        parameters.push(build_parameter(arg, ParameterKind::KeywordOnly, scope)?);
    }
    if let Some(kwarg) = &args.kwarg {
        let mut parameter = Parameter::new(kwarg.arg.to_string(), ParameterKind::VariadicKeyword);
        if let Some(annotation) = &kwarg.annotation {
            parameter.annotation = Some(Box::new(build_expr(annotation, scope)?));
        }
        parameter.default = Some(Box::new(Expr::constant("{}")));
        parameters.push(parameter);
    }
    Ok(parameters)
}

fn build_parameter(
    arg: &ast::ArgWithDefault,
    kind: ParameterKind,
    scope: &str,
) -> Result<Parameter> {
    let mut parameter = Parameter::new(arg.def.arg.to_string(), kind);
    if let Some(annotation) = &arg.def.annotation {
        parameter.annotation = Some(Box::new(build_expr(annotation, scope)?));
    }
    if let Some(default) = &arg.default {
        parameter.default = Some(Box::new(build_expr(default, scope)?));
    }
    Ok(parameter)
}

/// PEP 695 type parameters on classes, functions and type aliases.
pub fn build_type_params(params: &[ast::TypeParam], scope: &str) -> Vec<TypeParameter> {
    params
        .iter()
        .map(|param| match param {
            ast::TypeParam::TypeVar(tv) => TypeParameter {
                kind: TypeParameterKind::TypeVar,
                name: tv.name.to_string(),
                bound: tv
                    .bound
                    .as_ref()
                    .and_then(|bound| build_expr(bound, scope).ok()),
            },
            ast::TypeParam::TypeVarTuple(tvt) => TypeParameter {
                kind: TypeParameterKind::TypeVarTuple,
                name: tvt.name.to_string(),
                bound: None,
            },
            ast::TypeParam::ParamSpec(ps) => TypeParameter {
                kind: TypeParameterKind::ParamSpec,
                name: ps.name.to_string(),
                bound: None,
            },
        })
        .collect()
}

/// Source rendering of literal constants, Python-spelled.
pub fn render_constant(constant: &ast::Constant) -> String {
    match constant {
        ast::Constant::None => "None".to_string(),
        ast::Constant::Bool(true) => "True".to_string(),
        ast::Constant::Bool(false) => "False".to_string(),
        ast::Constant::Str(value) => {
            format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
        }
        ast::Constant::Bytes(bytes) => format!("b'{}'", bytes.escape_ascii()),
        ast::Constant::Int(value) => value.to_string(),
        ast::Constant::Float(value) => format!("{value:?}"),
        ast::Constant::Complex { real, imag } => {
            if *real == 0.0 {
                format!("{imag:?}j")
            } else {
                format!("({real:?}+{imag:?}j)")
            }
        }
        ast::Constant::Ellipsis => "...".to_string(),
        ast::Constant::Tuple(items) => {
            let rendered: Vec<String> = items.iter().map(render_constant).collect();
            format!("({})", rendered.join(", "))
        }
    }
}

fn binop_str(op: &ast::Operator) -> &'static str {
    match op {
        ast::Operator::Add => "+",
        ast::Operator::Sub => "-",
        ast::Operator::Mult => "*",
        ast::Operator::MatMult => "@",
        ast::Operator::Div => "/",
        ast::Operator::Mod => "%",
        ast::Operator::Pow => "**",
        ast::Operator::LShift => "<<",
        ast::Operator::RShift => ">>",
        ast::Operator::BitOr => "|",
        ast::Operator::BitXor => "^",
        ast::Operator::BitAnd => "&",
        ast::Operator::FloorDiv => "//",
    }
}

fn boolop_str(op: &ast::BoolOp) -> &'static str {
    match op {
        ast::BoolOp::And => "and",
        ast::BoolOp::Or => "or",
    }
}

fn unaryop_str(op: &ast::UnaryOp) -> &'static str {
    match op {
        ast::UnaryOp::Invert => "~",
        ast::UnaryOp::Not => "not ",
        ast::UnaryOp::UAdd => "+",
        ast::UnaryOp::USub => "-",
    }
}

fn cmpop_str(op: &ast::CmpOp) -> &'static str {
    match op {
        ast::CmpOp::Eq => "==",
        ast::CmpOp::NotEq => "!=",
        ast::CmpOp::Lt => "<",
        ast::CmpOp::LtE => "<=",
        ast::CmpOp::Gt => ">",
        ast::CmpOp::GtE => ">=",
        ast::CmpOp::Is => "is",
        ast::CmpOp::IsNot => "is not",
        ast::CmpOp::In => "in",
        ast::CmpOp::NotIn => "not in",
    }
}

fn expr_kind_name(expr: &ast::Expr) -> &'static str {
    match expr {
        ast::Expr::Await(_) => "await",
        _ => "expression",
    }
}
