use tracing::debug;

use super::{returns::convert_returns, Retargeter, Target};
use crate::domain::ast::{Node, NodeId, SyntaxTree};
use crate::domain::diagnostics::{RewriteReport, RewriteWarning};
use crate::domain::type_shape::TypeShape;

impl Retargeter<'_> {
    /// Patch the declaration that `ident` names: a struct field or a
    /// single-result accessor.
    pub(super) fn patch_declaration(
        &self,
        tree: &mut SyntaxTree,
        ident: NodeId,
        target: &Target<'_>,
        report: &mut RewriteReport,
    ) {
        let Some(decl) = tree.parent(ident) else {
            report.warn(RewriteWarning::UnsupportedDeclaration {
                symbol: target.symbol.name.clone(),
                node: "detached identifier".into(),
            });
            return;
        };

        match tree.node(decl) {
            Node::Field { ty, .. } => {
                let ty = *ty;
                if retype_field(tree, decl, ty, target.override_name) {
                    debug!(symbol = %target.symbol.name, "field declaration retargeted");
                    report.patched_declarations += 1;
                } else {
                    report.warn(unsupported_type(tree, ty, target));
                }
            }
            Node::FuncDecl { name, results, body, .. } if *name == ident => {
                let (results, body) = (results.clone(), *body);
                patch_accessor(tree, &results, body, target, report);
            }
            other => report.warn(RewriteWarning::UnsupportedDeclaration {
                symbol: target.symbol.name.clone(),
                node: other.kind_name().into(),
            }),
        }
    }
}

/// Retype the single result of an accessor and convert its returns. Leaves
/// the function untouched unless the result can be retyped.
fn patch_accessor(
    tree: &mut SyntaxTree,
    results: &[NodeId],
    body: Option<NodeId>,
    target: &Target<'_>,
    report: &mut RewriteReport,
) {
    let [result] = results else {
        report.warn(RewriteWarning::AccessorArity {
            symbol: target.symbol.name.clone(),
            count: results.len(),
        });
        return;
    };
    let result = *result;
    let ty = match tree.node(result) {
        Node::Field { ty, .. } => *ty,
        other => {
            report.warn(RewriteWarning::UnsupportedDeclaredType {
                symbol: target.symbol.name.clone(),
                node: other.kind_name().into(),
                override_type: target.override_name.into(),
            });
            return;
        }
    };

    // must be read before the signature changes
    let original = type_expr_shape(tree, ty);
    if !retype_field(tree, result, ty, target.override_name) {
        report.warn(unsupported_type(tree, ty, target));
        return;
    }
    report.patched_declarations += 1;

    if let (Some(body), Some(original)) = (body, original) {
        let converted = convert_returns(tree, body, &original, &target.override_type);
        debug!(
            symbol = %target.symbol.name,
            from = %original,
            converted,
            "accessor retargeted"
        );
        report.converted_returns += converted;
    }
}

/// Point the declared type of `field` at `override_name`.
///
/// A named type is renamed in place. Pointer and array types are replaced
/// wholesale by a bare identifier: the override already spells out its own
/// shape. Anything else is left alone.
fn retype_field(tree: &mut SyntaxTree, field: NodeId, ty: NodeId, override_name: &str) -> bool {
    if let Node::Ident { name, .. } = tree.node_mut(ty) {
        *name = override_name.to_string();
        return true;
    }
    if matches!(tree.node(ty), Node::PointerType { .. } | Node::ArrayType { .. }) {
        let replacement = tree.ident(override_name);
        return tree.replace_child(field, ty, replacement);
    }
    false
}

/// Shape of a type expression, if it is one the converter understands.
fn type_expr_shape(tree: &SyntaxTree, ty: NodeId) -> Option<TypeShape> {
    match tree.node(ty) {
        Node::Ident { name, .. } => Some(TypeShape::parse(name)),
        Node::PointerType { elem } => type_expr_shape(tree, *elem).map(TypeShape::pointer_to),
        Node::ArrayType { elem } => {
            type_expr_shape(tree, *elem).map(|elem| TypeShape::Array(Box::new(elem)))
        }
        Node::Selector { base, field } => {
            let qualified = format!("{}.{}", tree.ident_name(*base)?, tree.ident_name(*field)?);
            Some(TypeShape::Named(qualified))
        }
        _ => None,
    }
}

fn unsupported_type(tree: &SyntaxTree, ty: NodeId, target: &Target<'_>) -> RewriteWarning {
    RewriteWarning::UnsupportedDeclaredType {
        symbol: target.symbol.name.clone(),
        node: tree.node(ty).kind_name().into(),
        override_type: target.override_name.into(),
    }
}
