//! `__all__` parsing: string constants plus unresolved name references.

use std::path::Path;

use pyglass_model::ExportItem;
use rustpython_ast::{self as ast};
use tracing::warn;

/// Parses the value of an `__all__` declaration. Returns `None` when the
/// overall shape is unsupported; individually unsupported entries are
/// logged and dropped.
pub(super) fn parse_export_items(expr: &ast::Expr, filepath: &Path) -> Option<Vec<ExportItem>> {
    match expr {
        ast::Expr::List(list) => Some(collect_items(&list.elts, filepath)),
        ast::Expr::Tuple(tuple) => Some(collect_items(&tuple.elts, filepath)),
        ast::Expr::Set(set) => Some(collect_items(&set.elts, filepath)),
        // `['a'] + other.__all__` concatenations.
        ast::Expr::BinOp(binop) if matches!(binop.op, ast::Operator::Add) => {
            let mut items = parse_export_items(&binop.left, filepath)?;
            items.extend(parse_export_items(&binop.right, filepath)?);
            Some(items)
        }
        ast::Expr::Name(name) => Some(vec![ExportItem::Name {
            name: name.id.to_string(),
        }]),
        ast::Expr::Attribute(_) => dotted_name(expr).map(|name| vec![ExportItem::Name { name }]),
        _ => None,
    }
}

fn collect_items(elts: &[ast::Expr], filepath: &Path) -> Vec<ExportItem> {
    let mut items = Vec::with_capacity(elts.len());
    for elt in elts {
        match elt {
            ast::Expr::Constant(constant) => {
                if let ast::Constant::Str(value) = &constant.value {
                    items.push(ExportItem::Literal(value.clone()));
                } else {
                    warn!(file = %filepath.display(), "non-string constant in __all__, dropped");
                }
            }
            ast::Expr::Name(name) => items.push(ExportItem::Name {
                name: name.id.to_string(),
            }),
            ast::Expr::Starred(starred) => match dotted_name(&starred.value) {
                Some(name) => items.push(ExportItem::Name { name }),
                None => {
                    warn!(file = %filepath.display(), "unsupported starred entry in __all__, dropped");
                }
            },
            _ => {
                warn!(file = %filepath.display(), "unsupported entry in __all__, dropped");
            }
        }
    }
    items
}

fn dotted_name(expr: &ast::Expr) -> Option<String> {
    match expr {
        ast::Expr::Name(name) => Some(name.id.to_string()),
        ast::Expr::Attribute(attribute) => {
            let base = dotted_name(&attribute.value)?;
            Some(format!("{base}.{}", attribute.attr.as_str()))
        }
        _ => None,
    }
}
