//! Go-style Source Printer
//!
//! Renders a syntax tree as source text. Used for the `source` output format
//! and to keep test assertions readable; it is not a formatter.

use crate::domain::ast::{Node, NodeId, SyntaxTree};

pub struct SourcePrinter;

impl SourcePrinter {
    /// Render the whole tree from its root.
    pub fn print(tree: &SyntaxTree) -> String {
        match tree.root() {
            Some(root) => Self::node(tree, root),
            None => String::new(),
        }
    }

    /// Render a single node and everything below it.
    pub fn node(tree: &SyntaxTree, id: NodeId) -> String {
        let mut out = String::new();
        Self::write(tree, id, 0, &mut out);
        out
    }

    fn write(tree: &SyntaxTree, id: NodeId, depth: usize, out: &mut String) {
        match tree.node(id) {
            Node::File { package, decls } => {
                out.push_str(&format!("package {}\n", package));
                for decl in decls {
                    out.push('\n');
                    Self::write(tree, *decl, depth, out);
                    out.push('\n');
                }
            }
            Node::StructDecl { name, fields } => {
                out.push_str(&format!("type {} struct {{\n", name));
                for field in fields {
                    Self::indent(depth + 1, out);
                    Self::write(tree, *field, depth + 1, out);
                    out.push('\n');
                }
                Self::indent(depth, out);
                out.push('}');
            }
            Node::Field { names, ty } => {
                if !names.is_empty() {
                    Self::list(tree, names, depth, out);
                    out.push(' ');
                }
                Self::write(tree, *ty, depth, out);
            }
            Node::FuncDecl { recv, name, params, results, body } => {
                out.push_str("func ");
                if let Some(recv) = recv {
                    out.push('(');
                    Self::write(tree, *recv, depth, out);
                    out.push_str(") ");
                }
                Self::write(tree, *name, depth, out);
                out.push('(');
                Self::list(tree, params, depth, out);
                out.push(')');
                Self::results(tree, results, depth, out);
                if let Some(body) = body {
                    out.push(' ');
                    Self::write(tree, *body, depth, out);
                }
            }
            Node::Block { stmts } => {
                out.push_str("{\n");
                for stmt in stmts {
                    Self::indent(depth + 1, out);
                    Self::write(tree, *stmt, depth + 1, out);
                    out.push('\n');
                }
                Self::indent(depth, out);
                out.push('}');
            }
            Node::If { cond, then, els } => {
                out.push_str("if ");
                Self::write(tree, *cond, depth, out);
                out.push(' ');
                Self::write(tree, *then, depth, out);
                if let Some(els) = els {
                    out.push_str(" else ");
                    Self::write(tree, *els, depth, out);
                }
            }
            Node::Return { results } => {
                out.push_str("return");
                if !results.is_empty() {
                    out.push(' ');
                    Self::list(tree, results, depth, out);
                }
            }
            Node::Assign { lhs, rhs, define } => {
                Self::list(tree, lhs, depth, out);
                out.push_str(if *define { " := " } else { " = " });
                Self::list(tree, rhs, depth, out);
            }
            Node::ExprStmt { expr } => Self::write(tree, *expr, depth, out),
            Node::Ident { name, .. } => out.push_str(name),
            Node::BasicLit { value, .. } => out.push_str(value),
            Node::Selector { base, field } => {
                Self::write(tree, *base, depth, out);
                out.push('.');
                Self::write(tree, *field, depth, out);
            }
            Node::Paren { inner } => {
                out.push('(');
                Self::write(tree, *inner, depth, out);
                out.push(')');
            }
            Node::PointerType { elem } => {
                out.push('*');
                Self::write(tree, *elem, depth, out);
            }
            Node::ArrayType { elem } => {
                out.push_str("[]");
                Self::write(tree, *elem, depth, out);
            }
            Node::MapType { key, value } => {
                out.push_str("map[");
                Self::write(tree, *key, depth, out);
                out.push(']');
                Self::write(tree, *value, depth, out);
            }
            Node::Unary { op, operand } => {
                out.push_str(op.token());
                Self::write(tree, *operand, depth, out);
            }
            Node::Binary { op, lhs, rhs } => {
                Self::write(tree, *lhs, depth, out);
                out.push_str(&format!(" {} ", op));
                Self::write(tree, *rhs, depth, out);
            }
            Node::Call { fun, args } => {
                Self::write(tree, *fun, depth, out);
                out.push('(');
                Self::list(tree, args, depth, out);
                out.push(')');
            }
            Node::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    Self::write(tree, *ty, depth, out);
                }
                out.push('{');
                Self::list(tree, elts, depth, out);
                out.push('}');
            }
            Node::KeyValue { key, value } => {
                Self::write(tree, *key, depth, out);
                out.push_str(": ");
                Self::write(tree, *value, depth, out);
            }
        }
    }

    fn results(tree: &SyntaxTree, results: &[NodeId], depth: usize, out: &mut String) {
        let unnamed_single = match results {
            [only] => matches!(tree.node(*only), Node::Field { names, .. } if names.is_empty()),
            _ => false,
        };
        if results.is_empty() {
            return;
        }
        out.push(' ');
        if unnamed_single {
            Self::write(tree, results[0], depth, out);
        } else {
            out.push('(');
            Self::list(tree, results, depth, out);
            out.push(')');
        }
    }

    fn list(tree: &SyntaxTree, ids: &[NodeId], depth: usize, out: &mut String) {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            Self::write(tree, *id, depth, out);
        }
    }

    fn indent(depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push('\t');
        }
    }
}
