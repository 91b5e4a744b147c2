//! Type descriptors and conversion helpers.
//!
//! Only one level of pointer indirection is ever distinguished when deciding
//! whether a conversion is needed. Deeper pointers and arrays are compared
//! structurally and nothing more.

use std::fmt;

use crate::domain::ast::{NodeId, SyntaxTree};

/// Predeclared scalar types with a literal zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    String,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

/// Zero-value category of a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarCategory {
    Text,
    SignedInt,
    UnsignedInt,
    Float,
    Bool,
}

impl Scalar {
    pub const ALL: [Scalar; 14] = [
        Scalar::String,
        Scalar::Bool,
        Scalar::Int,
        Scalar::Int8,
        Scalar::Int16,
        Scalar::Int32,
        Scalar::Int64,
        Scalar::Uint,
        Scalar::Uint8,
        Scalar::Uint16,
        Scalar::Uint32,
        Scalar::Uint64,
        Scalar::Float32,
        Scalar::Float64,
    ];

    pub fn from_name(name: &str) -> Option<Scalar> {
        Scalar::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Scalar::String => "string",
            Scalar::Bool => "bool",
            Scalar::Int => "int",
            Scalar::Int8 => "int8",
            Scalar::Int16 => "int16",
            Scalar::Int32 => "int32",
            Scalar::Int64 => "int64",
            Scalar::Uint => "uint",
            Scalar::Uint8 => "uint8",
            Scalar::Uint16 => "uint16",
            Scalar::Uint32 => "uint32",
            Scalar::Uint64 => "uint64",
            Scalar::Float32 => "float32",
            Scalar::Float64 => "float64",
        }
    }

    pub fn category(self) -> ScalarCategory {
        match self {
            Scalar::String => ScalarCategory::Text,
            Scalar::Bool => ScalarCategory::Bool,
            Scalar::Int | Scalar::Int8 | Scalar::Int16 | Scalar::Int32 | Scalar::Int64 => {
                ScalarCategory::SignedInt
            }
            Scalar::Uint | Scalar::Uint8 | Scalar::Uint16 | Scalar::Uint32 | Scalar::Uint64 => {
                ScalarCategory::UnsignedInt
            }
            Scalar::Float32 | Scalar::Float64 => ScalarCategory::Float,
        }
    }
}

/// Shape of a type as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Scalar(Scalar),
    /// Any other type name, qualified or not (`Status`, `wrappers.NullString`).
    Named(String),
    Pointer(Box<TypeShape>),
    Array(Box<TypeShape>),
}

impl TypeShape {
    /// Read `*T`, `[]T`, scalar names and other names.
    pub fn parse(text: &str) -> TypeShape {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix('*') {
            return TypeShape::Pointer(Box::new(TypeShape::parse(rest)));
        }
        if let Some(rest) = text.strip_prefix("[]") {
            return TypeShape::Array(Box::new(TypeShape::parse(rest)));
        }
        match Scalar::from_name(text) {
            Some(scalar) => TypeShape::Scalar(scalar),
            None => TypeShape::Named(text.to_string()),
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, TypeShape::Pointer(_))
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            TypeShape::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    pub fn pointer_to(self) -> TypeShape {
        TypeShape::Pointer(Box::new(self))
    }

    /// Strip one pointer level; non-pointers are returned unchanged.
    pub fn strip_pointer(self) -> TypeShape {
        match self {
            TypeShape::Pointer(inner) => *inner,
            other => other,
        }
    }

    /// Callee text used when converting to this type. Pointer types are
    /// parenthesized so `(*T)(x)` parses as one conversion.
    pub fn conversion_head(&self) -> String {
        if self.is_pointer() {
            format!("({})", self)
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Scalar(s) => f.write_str(s.name()),
            TypeShape::Named(name) => f.write_str(name),
            TypeShape::Pointer(inner) => write!(f, "*{}", inner),
            TypeShape::Array(inner) => write!(f, "[]{}", inner),
        }
    }
}

/// Whether a value of `from` must be converted to be used as `to`.
pub fn needs_type_conversion(from: &TypeShape, to: &TypeShape) -> bool {
    if from == to {
        return false;
    }
    match (from, to) {
        // strip exactly one level from both sides and compare the rest
        (TypeShape::Pointer(a), TypeShape::Pointer(b)) => a != b,
        // exactly one side is a pointer, or the names differ
        _ => true,
    }
}

/// Allocate `target(expr)`. The caller puts the result into `expr`'s slot.
pub fn cast(tree: &mut SyntaxTree, target: &TypeShape, expr: NodeId) -> NodeId {
    let head = tree.ident(target.conversion_head());
    tree.call(head, vec![expr])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::Node;

    fn shape(s: &str) -> TypeShape {
        TypeShape::parse(s)
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(shape("string"), TypeShape::Scalar(Scalar::String));
        assert_eq!(shape("wrappers.NullString"), TypeShape::Named("wrappers.NullString".into()));
        assert_eq!(
            shape("*pkg.T"),
            TypeShape::Pointer(Box::new(TypeShape::Named("pkg.T".into())))
        );
        for text in ["int64", "*pkg.T", "[]byte", "**T", "[]*pkg.T", "pkg/v2.T"] {
            assert_eq!(shape(text).to_string(), text);
        }
    }

    #[test]
    fn test_needs_type_conversion() {
        for a in ["string", "*T", "pkg.W", "[]byte"] {
            assert!(!needs_type_conversion(&shape(a), &shape(a)));
        }
        assert!(needs_type_conversion(&shape("*T"), &shape("T")));
        assert!(needs_type_conversion(&shape("T"), &shape("*T")));
        assert!(needs_type_conversion(&shape("*T"), &shape("*U")));
        assert!(!needs_type_conversion(&shape("*T"), &shape("*T")));
        assert!(needs_type_conversion(&shape("string"), &shape("W")));
    }

    #[test]
    fn test_strip_pointer_and_pointer_to() {
        assert_eq!(shape("*T").strip_pointer(), shape("T"));
        assert_eq!(shape("T").strip_pointer(), shape("T"));
        assert_eq!(shape("*T").pointer_to(), shape("**T"));
    }

    #[test]
    fn test_cast_builds_conversion_call() {
        let mut tree = SyntaxTree::new();
        let x = tree.ident("x");
        let call = cast(&mut tree, &shape("*pkg.T"), x);
        match tree.node(call) {
            Node::Call { fun, args } => {
                assert_eq!(tree.ident_name(*fun), Some("(*pkg.T)"));
                assert_eq!(args, &vec![x]);
            }
            other => panic!("unexpected node {:?}", other),
        }
        assert_eq!(tree.parent(x), Some(call));

        let y = tree.ident("y");
        let call = cast(&mut tree, &shape("W"), y);
        match tree.node(call) {
            Node::Call { fun, .. } => assert_eq!(tree.ident_name(*fun), Some("W")),
            other => panic!("unexpected node {:?}", other),
        }
    }
}
