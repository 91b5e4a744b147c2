//! Zero-value recognition and synthesis.

use crate::domain::ast::{LitKind, Node, NodeId, SyntaxTree};
use crate::domain::type_shape::{ScalarCategory, TypeShape};

/// The universal null reference.
pub const NIL: &str = "nil";

/// True if `expr` is the canonical zero literal for `ty`.
///
/// `nil` counts as a zero value whatever the type, since generated accessors
/// return it for every reference-like field.
pub fn is_zero_value(tree: &SyntaxTree, expr: NodeId, ty: &TypeShape) -> bool {
    match tree.node(expr) {
        Node::BasicLit { value, .. } => match ty.as_scalar().map(|s| s.category()) {
            Some(ScalarCategory::Text) => value == "\"\"",
            Some(ScalarCategory::SignedInt | ScalarCategory::UnsignedInt) => value == "0",
            Some(ScalarCategory::Float) => value == "0" || value == "0.0",
            Some(ScalarCategory::Bool) => value == "false",
            None => false,
        },
        Node::Ident { name, .. } => {
            let is_bool = ty.as_scalar().map(|s| s.category()) == Some(ScalarCategory::Bool);
            name == NIL || (is_bool && name == "false")
        }
        _ => false,
    }
}

/// Allocate the canonical zero value of `ty`.
pub fn create_zero_value(tree: &mut SyntaxTree, ty: &TypeShape) -> NodeId {
    if let Some(scalar) = ty.as_scalar() {
        return match scalar.category() {
            ScalarCategory::Text => tree.lit(LitKind::String, "\"\""),
            ScalarCategory::SignedInt | ScalarCategory::UnsignedInt => tree.lit(LitKind::Int, "0"),
            ScalarCategory::Float => tree.lit(LitKind::Float, "0.0"),
            ScalarCategory::Bool => tree.ident("false"),
        };
    }
    if ty.is_pointer() {
        return tree.ident(NIL);
    }
    // custom, qualified or array type: T{}
    let type_ident = tree.ident(ty.to_string());
    tree.alloc(Node::CompositeLit { ty: Some(type_ident), elts: Vec::new() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::type_shape::Scalar;

    #[test]
    fn test_created_zero_values_are_recognized() {
        let mut tree = SyntaxTree::new();
        for scalar in Scalar::ALL {
            let ty = TypeShape::Scalar(scalar);
            let zero = create_zero_value(&mut tree, &ty);
            assert!(is_zero_value(&tree, zero, &ty), "zero of {} not recognized", scalar.name());
        }
        let ptr = TypeShape::parse("*pkg.T");
        let zero = create_zero_value(&mut tree, &ptr);
        assert!(is_zero_value(&tree, zero, &ptr));
    }

    #[test]
    fn test_zero_value_literals_by_category() {
        let mut tree = SyntaxTree::new();
        let empty = tree.lit(LitKind::String, "\"\"");
        let text = tree.lit(LitKind::String, "\"x\"");
        let zero = tree.lit(LitKind::Int, "0");
        let zero_f = tree.lit(LitKind::Float, "0.0");
        let nil = tree.ident("nil");
        let other = tree.ident("value");

        let string = TypeShape::parse("string");
        assert!(is_zero_value(&tree, empty, &string));
        assert!(!is_zero_value(&tree, text, &string));
        assert!(!is_zero_value(&tree, zero, &string));
        assert!(is_zero_value(&tree, zero, &TypeShape::parse("uint16")));
        assert!(is_zero_value(&tree, zero, &TypeShape::parse("float32")));
        assert!(is_zero_value(&tree, zero_f, &TypeShape::parse("float64")));
        assert!(!is_zero_value(&tree, zero_f, &TypeShape::parse("int")));
        assert!(!is_zero_value(&tree, zero, &TypeShape::parse("pkg.W")));
        assert!(is_zero_value(&tree, nil, &TypeShape::parse("*pkg.W")));
        assert!(is_zero_value(&tree, nil, &string));
        assert!(!is_zero_value(&tree, other, &string));
    }

    #[test]
    fn test_non_scalar_zero_values() {
        let mut tree = SyntaxTree::new();
        let nil = create_zero_value(&mut tree, &TypeShape::parse("*T"));
        assert_eq!(tree.ident_name(nil), Some("nil"));

        for name in ["wrappers.NullString", "[]byte"] {
            let lit = create_zero_value(&mut tree, &TypeShape::parse(name));
            match tree.node(lit) {
                Node::CompositeLit { ty: Some(ty), elts } => {
                    assert_eq!(tree.ident_name(*ty), Some(name));
                    assert!(elts.is_empty());
                }
                other => panic!("unexpected node {:?}", other),
            }
        }
    }
}
