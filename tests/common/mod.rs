// Builders for small generated-code fixtures shared by the integration tests.
#![allow(dead_code)]

use fieldcast::domain::ast::{LitKind, Node, NodeId, Role, SyntaxTree, UnaryOp};
use fieldcast::domain::diagnostics::RewriteReport;
use fieldcast::domain::rewrite::Retargeter;
use fieldcast::domain::symbols::{OverrideMap, SymbolId};
use fieldcast::domain::Unit;
use fieldcast::ports::source_printer::SourcePrinter;

pub fn unit(name: &str) -> Unit {
    Unit {
        name: name.to_string(),
        ..Unit::default()
    }
}

/// `Name ty`, with `Name` declaring `symbol`.
pub fn field(tree: &mut SyntaxTree, name: &str, symbol: SymbolId, ty: NodeId) -> NodeId {
    let def = tree.bound_ident(name, symbol, Role::Def);
    tree.alloc(Node::Field { names: vec![def], ty })
}

/// Unnamed result or parameter type.
pub fn result(tree: &mut SyntaxTree, ty: NodeId) -> NodeId {
    tree.alloc(Node::Field { names: vec![], ty })
}

pub fn param(tree: &mut SyntaxTree, name: &str, ty: &str) -> NodeId {
    let name = tree.ident(name);
    let ty = tree.ident(ty);
    tree.alloc(Node::Field { names: vec![name], ty })
}

pub fn pointer_type(tree: &mut SyntaxTree, elem: &str) -> NodeId {
    let elem = tree.ident(elem);
    tree.alloc(Node::PointerType { elem })
}

pub fn struct_decl(tree: &mut SyntaxTree, name: &str, fields: Vec<NodeId>) -> NodeId {
    tree.alloc(Node::StructDecl {
        name: name.to_string(),
        fields,
    })
}

/// `recv.name` with `name` referring to `symbol`.
pub fn field_ref(tree: &mut SyntaxTree, recv: &str, name: &str, symbol: SymbolId) -> NodeId {
    let base = tree.ident(recv);
    let field = tree.bound_ident(name, symbol, Role::Use);
    tree.selector(base, field)
}

/// Generated accessor:
///
/// ```text
/// func (x *Owner) GetField() T {
///     if x != nil {
///         return x.Field
///     }
///     return <zero>
/// }
/// ```
pub struct Accessor<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub symbol: SymbolId,
    pub field: &'a str,
    pub field_symbol: SymbolId,
}

impl Accessor<'_> {
    pub fn build(&self, tree: &mut SyntaxTree, result_ty: NodeId, zero: NodeId) -> NodeId {
        let recv_name = tree.ident("x");
        let recv_ty = pointer_type(tree, self.owner);
        let recv = tree.alloc(Node::Field {
            names: vec![recv_name],
            ty: recv_ty,
        });
        let name = tree.bound_ident(self.name, self.symbol, Role::Def);
        let result = result(tree, result_ty);

        let x = tree.ident("x");
        let nil = tree.ident("nil");
        let cond = tree.alloc(Node::Binary {
            op: "!=".into(),
            lhs: x,
            rhs: nil,
        });
        let value = field_ref(tree, "x", self.field, self.field_symbol);
        let ret = tree.alloc(Node::Return { results: vec![value] });
        let then = tree.alloc(Node::Block { stmts: vec![ret] });
        let guard = tree.alloc(Node::If { cond, then, els: None });
        let ret_zero = tree.alloc(Node::Return { results: vec![zero] });
        let body = tree.alloc(Node::Block {
            stmts: vec![guard, ret_zero],
        });

        tree.alloc(Node::FuncDecl {
            recv: Some(recv),
            name,
            params: vec![],
            results: vec![result],
            body: Some(body),
        })
    }
}

/// `func name(params) { stmts }`
pub fn func(tree: &mut SyntaxTree, name: &str, params: Vec<NodeId>, stmts: Vec<NodeId>) -> NodeId {
    let name = tree.ident(name);
    let body = tree.alloc(Node::Block { stmts });
    tree.alloc(Node::FuncDecl {
        recv: None,
        name,
        params,
        results: vec![],
        body: Some(body),
    })
}

pub fn file(tree: &mut SyntaxTree, package: &str, decls: Vec<NodeId>) -> NodeId {
    let file = tree.alloc(Node::File {
        package: package.to_string(),
        decls,
    });
    tree.set_root(file);
    file
}

pub fn string_lit(tree: &mut SyntaxTree, value: &str) -> NodeId {
    tree.lit(LitKind::String, format!("\"{}\"", value))
}

pub fn unary(tree: &mut SyntaxTree, op: UnaryOp, operand: NodeId) -> NodeId {
    tree.alloc(Node::Unary { op, operand })
}

pub fn assign(tree: &mut SyntaxTree, lhs: Vec<NodeId>, rhs: Vec<NodeId>, define: bool) -> NodeId {
    tree.alloc(Node::Assign { lhs, rhs, define })
}

pub fn call_stmt(tree: &mut SyntaxTree, callee: &str, args: Vec<NodeId>) -> NodeId {
    let fun = tree.ident(callee);
    let call = tree.call(fun, args);
    tree.alloc(Node::ExprStmt { expr: call })
}

/// Override the named symbols and run the rewrite over the unit.
pub fn rewrite(unit: &mut Unit, overrides: &[(&str, &str)]) -> RewriteReport {
    let mut map = OverrideMap::new();
    for (name, type_name) in overrides {
        let id = unit
            .symbols
            .lookup(name)
            .unwrap_or_else(|| panic!("fixture has no symbol {name}"));
        map.insert(id, *type_name);
    }
    Retargeter::new(&unit.symbols, &map).run(&mut unit.tree)
}

pub fn print(unit: &Unit) -> String {
    SourcePrinter::print(&unit.tree)
}

pub fn print_node(unit: &Unit, id: NodeId) -> String {
    SourcePrinter::node(&unit.tree, id)
}
