use crate::domain::ast::{Node, NodeId, SyntaxTree};
use crate::domain::type_shape::{cast, needs_type_conversion, TypeShape};
use crate::domain::zero_value::{create_zero_value, is_zero_value};

/// Rewrite every returned expression in `body`, however deeply nested, for a
/// result type that changed from `original` to `new`. Returns the number of
/// expressions replaced.
pub(super) fn convert_returns(
    tree: &mut SyntaxTree,
    body: NodeId,
    original: &TypeShape,
    new: &TypeShape,
) -> usize {
    let returns: Vec<NodeId> = tree
        .descendants(body)
        .into_iter()
        .filter(|id| matches!(tree.node(*id), Node::Return { .. }))
        .collect();

    let mut converted = 0;
    for ret in returns {
        let results = match tree.node(ret) {
            Node::Return { results } => results.clone(),
            _ => continue,
        };
        for expr in results {
            if let Some(replacement) = convert_return_value(tree, expr, original, new) {
                tree.replace_child(ret, expr, replacement);
                converted += 1;
            }
        }
    }
    converted
}

fn convert_return_value(
    tree: &mut SyntaxTree,
    expr: NodeId,
    original: &TypeShape,
    new: &TypeShape,
) -> Option<NodeId> {
    if is_zero_value(tree, expr, original) {
        return Some(create_zero_value(tree, new));
    }
    if needs_type_conversion(original, new) {
        return Some(cast(tree, new, expr));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::LitKind;

    fn return_of(tree: &mut SyntaxTree, expr: NodeId) -> NodeId {
        tree.alloc(Node::Return { results: vec![expr] })
    }

    fn returned(tree: &SyntaxTree, ret: NodeId) -> NodeId {
        match tree.node(ret) {
            Node::Return { results } => results[0],
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_nested_returns_are_converted() {
        let mut tree = SyntaxTree::new();
        let cond = tree.ident("ok");
        let empty = tree.lit(LitKind::String, "\"\"");
        let inner_ret = return_of(&mut tree, empty);
        let then = tree.alloc(Node::Block { stmts: vec![inner_ret] });
        let if_stmt = tree.alloc(Node::If { cond, then, els: None });
        let x = tree.ident("x");
        let f = tree.ident("Name");
        let sel = tree.selector(x, f);
        let outer_ret = return_of(&mut tree, sel);
        let body = tree.alloc(Node::Block { stmts: vec![if_stmt, outer_ret] });

        let converted = convert_returns(
            &mut tree,
            body,
            &TypeShape::parse("string"),
            &TypeShape::parse("pkg.W"),
        );
        assert_eq!(converted, 2);

        match tree.node(returned(&tree, inner_ret)) {
            Node::CompositeLit { ty: Some(ty), .. } => assert_eq!(tree.ident_name(*ty), Some("pkg.W")),
            other => panic!("expected W{{}}, got {:?}", other),
        }
        match tree.node(returned(&tree, outer_ret)) {
            Node::Call { fun, args } => {
                assert_eq!(tree.ident_name(*fun), Some("pkg.W"));
                assert_eq!(args, &vec![sel]);
            }
            other => panic!("expected W(x.Name), got {:?}", other),
        }
    }

    #[test]
    fn test_same_type_leaves_non_zero_returns() {
        let mut tree = SyntaxTree::new();
        let x = tree.ident("x");
        let ret = return_of(&mut tree, x);
        let body = tree.alloc(Node::Block { stmts: vec![ret] });

        let same = TypeShape::parse("*pkg.T");
        assert_eq!(convert_returns(&mut tree, body, &same, &same), 0);
        assert_eq!(returned(&tree, ret), x);
    }

    #[test]
    fn test_nil_becomes_new_zero_value() {
        let mut tree = SyntaxTree::new();
        let nil = tree.ident("nil");
        let ret = return_of(&mut tree, nil);
        let body = tree.alloc(Node::Block { stmts: vec![ret] });

        convert_returns(
            &mut tree,
            body,
            &TypeShape::parse("*wrapperspb.StringValue"),
            &TypeShape::parse("*nullable.String"),
        );
        let zero = returned(&tree, ret);
        assert_ne!(zero, nil);
        assert_eq!(tree.ident_name(zero), Some("nil"));
        assert_eq!(tree.parent(nil), None);
    }
}
