//! Syntax tree arena for generated source units.
//!
//! Nodes live in a flat arena and refer to each other through [`NodeId`].
//! The parent index is filled as nodes are allocated (children are always
//! allocated before their parent), so it is complete before any rewrite
//! starts. [`SyntaxTree::replace_child`] keeps it valid: only the inserted
//! node and the node it displaces change parents, every other entry is left
//! untouched.

use serde::{Deserialize, Serialize};

use crate::domain::symbols::SymbolId;

/// Handle to a node in a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether an identifier declares its symbol or refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Def,
    Use,
}

/// Resolved symbol attached to an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub symbol: SymbolId,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LitKind {
    Int,
    Float,
    String,
    Char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    /// `*x`
    Deref,
    /// `&x`
    AddrOf,
    Neg,
    Not,
}

impl UnaryOp {
    pub fn token(self) -> &'static str {
        match self {
            UnaryOp::Deref => "*",
            UnaryOp::AddrOf => "&",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Closed set of node kinds a generated unit is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    File { package: String, decls: Vec<NodeId> },
    StructDecl { name: String, fields: Vec<NodeId> },
    /// Struct field, parameter or result. `names` may be empty.
    Field { names: Vec<NodeId>, ty: NodeId },
    FuncDecl {
        recv: Option<NodeId>,
        name: NodeId,
        params: Vec<NodeId>,
        results: Vec<NodeId>,
        body: Option<NodeId>,
    },
    Block { stmts: Vec<NodeId> },
    If { cond: NodeId, then: NodeId, els: Option<NodeId> },
    Return { results: Vec<NodeId> },
    Assign { lhs: Vec<NodeId>, rhs: Vec<NodeId>, define: bool },
    ExprStmt { expr: NodeId },
    Ident { name: String, binding: Option<Binding> },
    BasicLit { kind: LitKind, value: String },
    Selector { base: NodeId, field: NodeId },
    Paren { inner: NodeId },
    PointerType { elem: NodeId },
    ArrayType { elem: NodeId },
    MapType { key: NodeId, value: NodeId },
    Unary { op: UnaryOp, operand: NodeId },
    Binary { op: String, lhs: NodeId, rhs: NodeId },
    Call { fun: NodeId, args: Vec<NodeId> },
    CompositeLit { ty: Option<NodeId>, elts: Vec<NodeId> },
    KeyValue { key: NodeId, value: NodeId },
}

impl Node {
    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::File { .. } => "file",
            Node::StructDecl { .. } => "struct declaration",
            Node::Field { .. } => "field",
            Node::FuncDecl { .. } => "function declaration",
            Node::Block { .. } => "block",
            Node::If { .. } => "if statement",
            Node::Return { .. } => "return statement",
            Node::Assign { .. } => "assignment",
            Node::ExprStmt { .. } => "expression statement",
            Node::Ident { .. } => "identifier",
            Node::BasicLit { .. } => "literal",
            Node::Selector { .. } => "selector",
            Node::Paren { .. } => "paren",
            Node::PointerType { .. } => "pointer type",
            Node::ArrayType { .. } => "array type",
            Node::MapType { .. } => "map type",
            Node::Unary { .. } => "unary operation",
            Node::Binary { .. } => "binary operation",
            Node::Call { .. } => "call",
            Node::CompositeLit { .. } => "composite literal",
            Node::KeyValue { .. } => "key/value pair",
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            Node::File { decls: list, .. }
            | Node::StructDecl { fields: list, .. }
            | Node::Block { stmts: list }
            | Node::Return { results: list } => out.extend(list),
            Node::Field { names, ty } => {
                out.extend(names);
                out.push(*ty);
            }
            Node::FuncDecl { recv, name, params, results, body } => {
                out.extend(recv);
                out.push(*name);
                out.extend(params);
                out.extend(results);
                out.extend(body);
            }
            Node::If { cond, then, els } => {
                out.push(*cond);
                out.push(*then);
                out.extend(els);
            }
            Node::Assign { lhs, rhs, .. } => {
                out.extend(lhs);
                out.extend(rhs);
            }
            Node::ExprStmt { expr } => out.push(*expr),
            Node::Ident { .. } | Node::BasicLit { .. } => {}
            Node::Selector { base, field } => {
                out.push(*base);
                out.push(*field);
            }
            Node::Paren { inner: one }
            | Node::PointerType { elem: one }
            | Node::ArrayType { elem: one }
            | Node::Unary { operand: one, .. } => out.push(*one),
            Node::MapType { key, value } | Node::KeyValue { key, value } => {
                out.push(*key);
                out.push(*value);
            }
            Node::Binary { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }
            Node::Call { fun, args } => {
                out.push(*fun);
                out.extend(args);
            }
            Node::CompositeLit { ty, elts } => {
                out.extend(ty);
                out.extend(elts);
            }
        }
        out
    }

    /// Mutable child slots, same order as [`Node::children`].
    fn child_slots_mut(&mut self) -> Vec<&mut NodeId> {
        let mut out: Vec<&mut NodeId> = Vec::new();
        match self {
            Node::File { decls: list, .. }
            | Node::StructDecl { fields: list, .. }
            | Node::Block { stmts: list }
            | Node::Return { results: list } => out.extend(list.iter_mut()),
            Node::Field { names, ty } => {
                out.extend(names.iter_mut());
                out.push(ty);
            }
            Node::FuncDecl { recv, name, params, results, body } => {
                out.extend(recv.iter_mut());
                out.push(name);
                out.extend(params.iter_mut());
                out.extend(results.iter_mut());
                out.extend(body.iter_mut());
            }
            Node::If { cond, then, els } => {
                out.push(cond);
                out.push(then);
                out.extend(els.iter_mut());
            }
            Node::Assign { lhs, rhs, .. } => {
                out.extend(lhs.iter_mut());
                out.extend(rhs.iter_mut());
            }
            Node::ExprStmt { expr } => out.push(expr),
            Node::Ident { .. } | Node::BasicLit { .. } => {}
            Node::Selector { base, field } => {
                out.push(base);
                out.push(field);
            }
            Node::Paren { inner: one }
            | Node::PointerType { elem: one }
            | Node::ArrayType { elem: one }
            | Node::Unary { operand: one, .. } => out.push(one),
            Node::MapType { key, value } | Node::KeyValue { key, value } => {
                out.push(key);
                out.push(value);
            }
            Node::Binary { lhs, rhs, .. } => {
                out.push(lhs);
                out.push(rhs);
            }
            Node::Call { fun, args } => {
                out.push(fun);
                out.extend(args.iter_mut());
            }
            Node::CompositeLit { ty, elts } => {
                out.extend(ty.iter_mut());
                out.extend(elts.iter_mut());
            }
        }
        out
    }
}

/// Arena-backed syntax tree with an O(1) parent index.
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node. Its children become parented to it.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in node.children() {
            self.parents[child.index()] = Some(id);
        }
        self.nodes.push(node);
        self.parents.push(None);
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.index()]
    }

    /// All node ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Pre-order walk of the subtree rooted at `id`, `id` included.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            let children = self.node(next).children();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Put `new` into the slot of `parent` that currently holds `old`.
    ///
    /// Afterwards `new` is parented to `parent`. `old` keeps whatever parent
    /// it was given when `new` was allocated around it (the usual case when
    /// wrapping), otherwise it becomes detached. No other index entry changes.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        let replaced = match self.nodes[parent.index()]
            .child_slots_mut()
            .into_iter()
            .find(|slot| **slot == old)
        {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        };
        if replaced {
            self.parents[new.index()] = Some(parent);
            if self.parents[old.index()] == Some(parent) {
                self.parents[old.index()] = None;
            }
        }
        replaced
    }

    /// Nearest enclosing function declaration.
    pub fn enclosing_func(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.parent(id);
        while let Some(node) = cursor {
            if matches!(self.node(node), Node::FuncDecl { .. }) {
                return Some(node);
            }
            cursor = self.parent(node);
        }
        None
    }

    pub fn ident_name(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            Node::Ident { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn binding(&self, id: NodeId) -> Option<Binding> {
        match self.node(id) {
            Node::Ident { binding, .. } => *binding,
            _ => None,
        }
    }

    pub fn ident(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(Node::Ident { name: name.into(), binding: None })
    }

    pub fn bound_ident(&mut self, name: impl Into<String>, symbol: SymbolId, role: Role) -> NodeId {
        self.alloc(Node::Ident {
            name: name.into(),
            binding: Some(Binding { symbol, role }),
        })
    }

    pub fn lit(&mut self, kind: LitKind, value: impl Into<String>) -> NodeId {
        self.alloc(Node::BasicLit { kind, value: value.into() })
    }

    pub fn selector(&mut self, base: NodeId, field: NodeId) -> NodeId {
        self.alloc(Node::Selector { base, field })
    }

    pub fn call(&mut self, fun: NodeId, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Call { fun, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_index_follows_allocation() {
        let mut tree = SyntaxTree::new();
        let x = tree.ident("x");
        let f = tree.ident("Field");
        let sel = tree.selector(x, f);
        let fun = tree.ident("f");
        let call = tree.call(fun, vec![sel]);

        assert_eq!(tree.parent(x), Some(sel));
        assert_eq!(tree.parent(f), Some(sel));
        assert_eq!(tree.parent(sel), Some(call));
        assert_eq!(tree.parent(call), None);
    }

    #[test]
    fn test_replace_child_wraps_without_touching_siblings() {
        let mut tree = SyntaxTree::new();
        let a = tree.ident("a");
        let b = tree.ident("b");
        let bin = tree.alloc(Node::Binary { op: "+".into(), lhs: a, rhs: b });

        let conv = tree.ident("W");
        let wrapper = tree.call(conv, vec![a]);
        assert!(tree.replace_child(bin, a, wrapper));

        assert_eq!(tree.parent(wrapper), Some(bin));
        assert_eq!(tree.parent(a), Some(wrapper));
        assert_eq!(tree.parent(b), Some(bin));
        match tree.node(bin) {
            Node::Binary { lhs, rhs, .. } => {
                assert_eq!(*lhs, wrapper);
                assert_eq!(*rhs, b);
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_replace_child_detaches_dropped_node() {
        let mut tree = SyntaxTree::new();
        let elem = tree.ident("byte");
        let arr = tree.alloc(Node::ArrayType { elem });
        let name = tree.ident("Data");
        let field = tree.alloc(Node::Field { names: vec![name], ty: arr });

        let replacement = tree.ident("pkg.Bytes");
        assert!(tree.replace_child(field, arr, replacement));
        assert_eq!(tree.parent(arr), None);
        assert_eq!(tree.parent(replacement), Some(field));
        assert!(!tree.replace_child(field, arr, replacement));
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = SyntaxTree::new();
        let zero = tree.lit(LitKind::Int, "0");
        let ret = tree.alloc(Node::Return { results: vec![zero] });
        let block = tree.alloc(Node::Block { stmts: vec![ret] });

        assert_eq!(tree.descendants(block), vec![block, ret, zero]);
    }

    #[test]
    fn test_enclosing_func() {
        let mut tree = SyntaxTree::new();
        let name = tree.ident("GetName");
        let x = tree.ident("x");
        let ret = tree.alloc(Node::Return { results: vec![x] });
        let body = tree.alloc(Node::Block { stmts: vec![ret] });
        let func = tree.alloc(Node::FuncDecl {
            recv: None,
            name,
            params: vec![],
            results: vec![],
            body: Some(body),
        });

        assert_eq!(tree.enclosing_func(x), Some(func));
        assert_eq!(tree.enclosing_func(func), None);
    }
}
