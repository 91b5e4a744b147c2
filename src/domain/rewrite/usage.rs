use tracing::debug;

use super::{cast_in_place, Retargeter, Target};
use crate::domain::ast::{Node, NodeId, SyntaxTree, UnaryOp};
use crate::domain::diagnostics::{RewriteReport, RewriteWarning};
use crate::domain::symbols::StaticType;
use crate::domain::type_shape::TypeShape;

/// Type the expression had before the override, and the type it has now.
#[derive(Debug, Clone)]
struct Tracked {
    expr: NodeId,
    original: TypeShape,
    desired: TypeShape,
}

impl Retargeter<'_> {
    /// Insert the conversion a reference to an overridden symbol needs at
    /// its use site.
    pub(super) fn patch_usage(
        &self,
        tree: &mut SyntaxTree,
        ident: NodeId,
        target: &Target<'_>,
        report: &mut RewriteReport,
    ) {
        if self.inside_own_accessor(tree, ident) {
            // already handled when the accessor's returns were converted
            return;
        }
        let (original, desired) = match tracked_types(target) {
            Ok(types) => types,
            Err(warning) => {
                report.warn(warning);
                return;
            }
        };
        let Some(context) = tree.parent(ident) else {
            report.warn(unsupported(target, "detached identifier"));
            return;
        };

        match tree.node(context) {
            Node::KeyValue { key, value } => {
                let (key, value) = (*key, *value);
                let as_type = if key == ident { &desired } else { &original };
                if cast_in_place(tree, context, value, as_type) {
                    report.patched_usages += 1;
                }
            }
            Node::Selector { field, .. } if *field == ident => {
                let tracked = Tracked { expr: context, original, desired };
                patch_ancestors(tree, tracked, target, report);
            }
            other => report.warn(unsupported(target, other.kind_name())),
        }
    }

    fn inside_own_accessor(&self, tree: &SyntaxTree, ident: NodeId) -> bool {
        let Some(func) = tree.enclosing_func(ident) else {
            return false;
        };
        let Node::FuncDecl { name, .. } = tree.node(func) else {
            return false;
        };
        match (tree.ident_name(*name), tree.ident_name(ident)) {
            (Some(func_name), Some(field)) => func_name == self.accessor_name(field),
            _ => false,
        }
    }
}

/// `(original, desired)` for a reference to the target symbol. Functions
/// with other than one result cannot be tracked.
fn tracked_types(target: &Target<'_>) -> Result<(TypeShape, TypeShape), RewriteWarning> {
    let desired = target.override_type.clone();
    match &target.symbol.ty {
        StaticType::Named(name) => Ok((TypeShape::parse(name), desired)),
        StaticType::Pointer(name) => Ok((TypeShape::parse(name).pointer_to(), desired.pointer_to())),
        StaticType::Array(name) => Ok((TypeShape::Array(Box::new(TypeShape::parse(name))), desired)),
        StaticType::Signature { results } => match results.as_slice() {
            [result] => Ok((result.clone(), desired)),
            _ => Err(unsupported(target, "function declaration")),
        },
    }
}

/// Walk up from the tracked expression and convert at the first position
/// where the old and new types meet. Dereference and address-of adjust the
/// tracked types and keep walking; every other context ends the walk.
fn patch_ancestors(
    tree: &mut SyntaxTree,
    mut tracked: Tracked,
    target: &Target<'_>,
    report: &mut RewriteReport,
) {
    while let Some(node) = tree.parent(tracked.expr) {
        match tree.node(node) {
            Node::Unary { op: UnaryOp::Deref, .. } => {
                tracked = Tracked {
                    expr: node,
                    original: tracked.original.strip_pointer(),
                    desired: tracked.desired.strip_pointer(),
                };
            }
            Node::Unary { op: UnaryOp::AddrOf, .. } => {
                tracked = Tracked {
                    expr: node,
                    original: tracked.original.pointer_to(),
                    desired: tracked.desired.pointer_to(),
                };
            }
            Node::KeyValue { key, value } => {
                let (key, value) = (*key, *value);
                let as_type = if key == tracked.expr {
                    &tracked.desired
                } else {
                    &tracked.original
                };
                if cast_in_place(tree, node, value, as_type) {
                    report.patched_usages += 1;
                }
                return;
            }
            Node::Assign { lhs, rhs, .. } => {
                if lhs.len() != rhs.len() {
                    report.warn(unsupported(target, "assignment with unbalanced sides"));
                    return;
                }
                let paired = if let Some(i) = lhs.iter().position(|e| *e == tracked.expr) {
                    Some((rhs[i], &tracked.desired))
                } else {
                    rhs.iter()
                        .position(|e| *e == tracked.expr)
                        .map(|i| (rhs[i], &tracked.original))
                };
                if let Some((expr, as_type)) = paired {
                    if cast_in_place(tree, node, expr, as_type) {
                        report.patched_usages += 1;
                    }
                }
                return;
            }
            Node::Call { fun, args } => {
                let is_arg = args.contains(&tracked.expr);
                let is_callee = *fun == tracked.expr;
                if is_arg {
                    if cast_in_place(tree, node, tracked.expr, &tracked.original) {
                        report.patched_usages += 1;
                    }
                } else if is_callee {
                    patch_call_result(tree, node, &tracked.original, target, report);
                }
                return;
            }
            Node::Binary { .. } => {
                if cast_in_place(tree, node, tracked.expr, &tracked.original) {
                    report.patched_usages += 1;
                }
                return;
            }
            Node::Unary { op: UnaryOp::Neg | UnaryOp::Not, .. }
            | Node::File { .. }
            | Node::StructDecl { .. }
            | Node::Field { .. }
            | Node::FuncDecl { .. }
            | Node::Block { .. }
            | Node::If { .. }
            | Node::Return { .. }
            | Node::ExprStmt { .. }
            | Node::Ident { .. }
            | Node::BasicLit { .. }
            | Node::Selector { .. }
            | Node::Paren { .. }
            | Node::PointerType { .. }
            | Node::ArrayType { .. }
            | Node::MapType { .. }
            | Node::CompositeLit { .. } => {
                let kind = tree.node(node).kind_name();
                report.warn(unsupported(target, kind));
                return;
            }
        }
    }
}

/// The tracked expression is the callee of `call`: convert the call's
/// result where it feeds an assignment or an outer call.
fn patch_call_result(
    tree: &mut SyntaxTree,
    call: NodeId,
    original: &TypeShape,
    target: &Target<'_>,
    report: &mut RewriteReport,
) {
    let Some(outer) = tree.parent(call) else {
        return;
    };
    let feeds_outer = match tree.node(outer) {
        Node::Assign { rhs, .. } => rhs.contains(&call),
        Node::Call { args, .. } => args.contains(&call),
        _ => false,
    };
    if feeds_outer {
        if cast_in_place(tree, outer, call, original) {
            report.patched_usages += 1;
        }
    } else {
        debug!(
            symbol = %target.symbol.name,
            context = tree.node(outer).kind_name(),
            "call result left as is"
        );
    }
}

fn unsupported(target: &Target<'_>, node: &str) -> RewriteWarning {
    RewriteWarning::UnsupportedContext {
        symbol: target.symbol.name.clone(),
        node: node.to_string(),
    }
}
