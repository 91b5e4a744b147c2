use serde::{Deserialize, Serialize};

use crate::domain::ast::{Binding, LitKind, Node, NodeId, Role, SyntaxTree, UnaryOp};
use crate::domain::symbols::{StaticType, SymbolId, SymbolTable};
use crate::domain::type_shape::TypeShape;
use crate::domain::Unit;
use crate::error::{Error, Result};

/// Interchange form of one parsed unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDto {
    pub name: String,
    #[serde(default)]
    pub symbols: Vec<SymbolDto>,
    pub root: NodeDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDto {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDto {
    Basic { name: String },
    Pointer { elem: String },
    Array { elem: String },
    Signature { results: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDto {
    File {
        package: String,
        #[serde(default)]
        decls: Vec<NodeDto>,
    },
    StructDecl {
        name: String,
        #[serde(default)]
        fields: Vec<NodeDto>,
    },
    Field {
        #[serde(default)]
        names: Vec<NodeDto>,
        #[serde(rename = "type")]
        ty: Box<NodeDto>,
    },
    FuncDecl {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recv: Option<Box<NodeDto>>,
        name: Box<NodeDto>,
        #[serde(default)]
        params: Vec<NodeDto>,
        #[serde(default)]
        results: Vec<NodeDto>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Box<NodeDto>>,
    },
    Block {
        #[serde(default)]
        stmts: Vec<NodeDto>,
    },
    If {
        cond: Box<NodeDto>,
        then: Box<NodeDto>,
        #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
        els: Option<Box<NodeDto>>,
    },
    Return {
        #[serde(default)]
        results: Vec<NodeDto>,
    },
    Assign {
        lhs: Vec<NodeDto>,
        rhs: Vec<NodeDto>,
        #[serde(default)]
        define: bool,
    },
    ExprStmt {
        expr: Box<NodeDto>,
    },
    Ident {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        symbol: Option<usize>,
        #[serde(default, skip_serializing_if = "is_false")]
        def: bool,
    },
    BasicLit {
        lit: LitKind,
        value: String,
    },
    Selector {
        base: Box<NodeDto>,
        field: Box<NodeDto>,
    },
    Paren {
        inner: Box<NodeDto>,
    },
    PointerType {
        elem: Box<NodeDto>,
    },
    ArrayType {
        elem: Box<NodeDto>,
    },
    MapType {
        key: Box<NodeDto>,
        value: Box<NodeDto>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<NodeDto>,
    },
    Binary {
        op: String,
        lhs: Box<NodeDto>,
        rhs: Box<NodeDto>,
    },
    Call {
        fun: Box<NodeDto>,
        #[serde(default)]
        args: Vec<NodeDto>,
    },
    CompositeLit {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        ty: Option<Box<NodeDto>>,
        #[serde(default)]
        elts: Vec<NodeDto>,
    },
    KeyValue {
        key: Box<NodeDto>,
        value: Box<NodeDto>,
    },
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl UnitDto {
    /// Build the arena form. Fails on identifiers bound to symbols the unit
    /// does not declare.
    pub fn into_unit(self) -> Result<Unit> {
        let mut symbols = SymbolTable::new();
        for symbol in self.symbols {
            symbols.insert(symbol.name, symbol.ty.into());
        }
        let mut tree = SyntaxTree::new();
        let root = lower(&mut tree, self.root, symbols.len())?;
        tree.set_root(root);
        Ok(Unit {
            name: self.name,
            symbols,
            tree,
        })
    }
}

impl From<&Unit> for UnitDto {
    fn from(unit: &Unit) -> Self {
        let symbols = unit
            .symbols
            .iter()
            .map(|(_, symbol)| SymbolDto {
                name: symbol.name.clone(),
                ty: (&symbol.ty).into(),
            })
            .collect();
        let root = match unit.tree.root() {
            Some(root) => raise(&unit.tree, root),
            None => NodeDto::Block { stmts: Vec::new() },
        };
        UnitDto {
            name: unit.name.clone(),
            symbols,
            root,
        }
    }
}

impl From<TypeDto> for StaticType {
    fn from(dto: TypeDto) -> Self {
        match dto {
            TypeDto::Basic { name } => StaticType::Named(name),
            TypeDto::Pointer { elem } => StaticType::Pointer(elem),
            TypeDto::Array { elem } => StaticType::Array(elem),
            TypeDto::Signature { results } => StaticType::Signature {
                results: results.iter().map(|r| TypeShape::parse(r)).collect(),
            },
        }
    }
}

impl From<&StaticType> for TypeDto {
    fn from(ty: &StaticType) -> Self {
        match ty {
            StaticType::Named(name) => TypeDto::Basic { name: name.clone() },
            StaticType::Pointer(elem) => TypeDto::Pointer { elem: elem.clone() },
            StaticType::Array(elem) => TypeDto::Array { elem: elem.clone() },
            StaticType::Signature { results } => TypeDto::Signature {
                results: results.iter().map(ToString::to_string).collect(),
            },
        }
    }
}

fn lower_all(tree: &mut SyntaxTree, dtos: Vec<NodeDto>, declared: usize) -> Result<Vec<NodeId>> {
    dtos.into_iter().map(|dto| lower(tree, dto, declared)).collect()
}

fn lower_opt(
    tree: &mut SyntaxTree,
    dto: Option<Box<NodeDto>>,
    declared: usize,
) -> Result<Option<NodeId>> {
    dto.map(|dto| lower(tree, *dto, declared)).transpose()
}

/// Allocate `dto` bottom-up so the parent index is filled as we go.
fn lower(tree: &mut SyntaxTree, dto: NodeDto, declared: usize) -> Result<NodeId> {
    let node = match dto {
        NodeDto::File { package, decls } => Node::File {
            package,
            decls: lower_all(tree, decls, declared)?,
        },
        NodeDto::StructDecl { name, fields } => Node::StructDecl {
            name,
            fields: lower_all(tree, fields, declared)?,
        },
        NodeDto::Field { names, ty } => Node::Field {
            names: lower_all(tree, names, declared)?,
            ty: lower(tree, *ty, declared)?,
        },
        NodeDto::FuncDecl { recv, name, params, results, body } => Node::FuncDecl {
            recv: lower_opt(tree, recv, declared)?,
            name: lower(tree, *name, declared)?,
            params: lower_all(tree, params, declared)?,
            results: lower_all(tree, results, declared)?,
            body: lower_opt(tree, body, declared)?,
        },
        NodeDto::Block { stmts } => Node::Block {
            stmts: lower_all(tree, stmts, declared)?,
        },
        NodeDto::If { cond, then, els } => Node::If {
            cond: lower(tree, *cond, declared)?,
            then: lower(tree, *then, declared)?,
            els: lower_opt(tree, els, declared)?,
        },
        NodeDto::Return { results } => Node::Return {
            results: lower_all(tree, results, declared)?,
        },
        NodeDto::Assign { lhs, rhs, define } => Node::Assign {
            lhs: lower_all(tree, lhs, declared)?,
            rhs: lower_all(tree, rhs, declared)?,
            define,
        },
        NodeDto::ExprStmt { expr } => Node::ExprStmt {
            expr: lower(tree, *expr, declared)?,
        },
        NodeDto::Ident { name, symbol, def } => {
            let binding = match symbol {
                Some(index) if index >= declared => {
                    return Err(Error::DanglingSymbol { name, index, declared });
                }
                Some(index) => Some(Binding {
                    symbol: SymbolId::from_index(index),
                    role: if def { Role::Def } else { Role::Use },
                }),
                None => None,
            };
            Node::Ident { name, binding }
        }
        NodeDto::BasicLit { lit, value } => Node::BasicLit { kind: lit, value },
        NodeDto::Selector { base, field } => Node::Selector {
            base: lower(tree, *base, declared)?,
            field: lower(tree, *field, declared)?,
        },
        NodeDto::Paren { inner } => Node::Paren {
            inner: lower(tree, *inner, declared)?,
        },
        NodeDto::PointerType { elem } => Node::PointerType {
            elem: lower(tree, *elem, declared)?,
        },
        NodeDto::ArrayType { elem } => Node::ArrayType {
            elem: lower(tree, *elem, declared)?,
        },
        NodeDto::MapType { key, value } => Node::MapType {
            key: lower(tree, *key, declared)?,
            value: lower(tree, *value, declared)?,
        },
        NodeDto::Unary { op, operand } => Node::Unary {
            op,
            operand: lower(tree, *operand, declared)?,
        },
        NodeDto::Binary { op, lhs, rhs } => Node::Binary {
            op,
            lhs: lower(tree, *lhs, declared)?,
            rhs: lower(tree, *rhs, declared)?,
        },
        NodeDto::Call { fun, args } => Node::Call {
            fun: lower(tree, *fun, declared)?,
            args: lower_all(tree, args, declared)?,
        },
        NodeDto::CompositeLit { ty, elts } => Node::CompositeLit {
            ty: lower_opt(tree, ty, declared)?,
            elts: lower_all(tree, elts, declared)?,
        },
        NodeDto::KeyValue { key, value } => Node::KeyValue {
            key: lower(tree, *key, declared)?,
            value: lower(tree, *value, declared)?,
        },
    };
    Ok(tree.alloc(node))
}

fn raise_all(tree: &SyntaxTree, ids: &[NodeId]) -> Vec<NodeDto> {
    ids.iter().map(|id| raise(tree, *id)).collect()
}

fn raise_box(tree: &SyntaxTree, id: NodeId) -> Box<NodeDto> {
    Box::new(raise(tree, id))
}

fn raise(tree: &SyntaxTree, id: NodeId) -> NodeDto {
    match tree.node(id) {
        Node::File { package, decls } => NodeDto::File {
            package: package.clone(),
            decls: raise_all(tree, decls),
        },
        Node::StructDecl { name, fields } => NodeDto::StructDecl {
            name: name.clone(),
            fields: raise_all(tree, fields),
        },
        Node::Field { names, ty } => NodeDto::Field {
            names: raise_all(tree, names),
            ty: raise_box(tree, *ty),
        },
        Node::FuncDecl { recv, name, params, results, body } => NodeDto::FuncDecl {
            recv: recv.map(|r| raise_box(tree, r)),
            name: raise_box(tree, *name),
            params: raise_all(tree, params),
            results: raise_all(tree, results),
            body: body.map(|b| raise_box(tree, b)),
        },
        Node::Block { stmts } => NodeDto::Block {
            stmts: raise_all(tree, stmts),
        },
        Node::If { cond, then, els } => NodeDto::If {
            cond: raise_box(tree, *cond),
            then: raise_box(tree, *then),
            els: els.map(|e| raise_box(tree, e)),
        },
        Node::Return { results } => NodeDto::Return {
            results: raise_all(tree, results),
        },
        Node::Assign { lhs, rhs, define } => NodeDto::Assign {
            lhs: raise_all(tree, lhs),
            rhs: raise_all(tree, rhs),
            define: *define,
        },
        Node::ExprStmt { expr } => NodeDto::ExprStmt {
            expr: raise_box(tree, *expr),
        },
        Node::Ident { name, binding } => NodeDto::Ident {
            name: name.clone(),
            symbol: binding.map(|b| b.symbol.index()),
            def: binding.map_or(false, |b| b.role == Role::Def),
        },
        Node::BasicLit { kind, value } => NodeDto::BasicLit {
            lit: *kind,
            value: value.clone(),
        },
        Node::Selector { base, field } => NodeDto::Selector {
            base: raise_box(tree, *base),
            field: raise_box(tree, *field),
        },
        Node::Paren { inner } => NodeDto::Paren {
            inner: raise_box(tree, *inner),
        },
        Node::PointerType { elem } => NodeDto::PointerType {
            elem: raise_box(tree, *elem),
        },
        Node::ArrayType { elem } => NodeDto::ArrayType {
            elem: raise_box(tree, *elem),
        },
        Node::MapType { key, value } => NodeDto::MapType {
            key: raise_box(tree, *key),
            value: raise_box(tree, *value),
        },
        Node::Unary { op, operand } => NodeDto::Unary {
            op: *op,
            operand: raise_box(tree, *operand),
        },
        Node::Binary { op, lhs, rhs } => NodeDto::Binary {
            op: op.clone(),
            lhs: raise_box(tree, *lhs),
            rhs: raise_box(tree, *rhs),
        },
        Node::Call { fun, args } => NodeDto::Call {
            fun: raise_box(tree, *fun),
            args: raise_all(tree, args),
        },
        Node::CompositeLit { ty, elts } => NodeDto::CompositeLit {
            ty: ty.map(|t| raise_box(tree, t)),
            elts: raise_all(tree, elts),
        },
        Node::KeyValue { key, value } => NodeDto::KeyValue {
            key: raise_box(tree, *key),
            value: raise_box(tree, *value),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: &str = r#"{
        "name": "test.pb.go",
        "symbols": [
            { "name": "Test.Name", "type": { "kind": "basic", "name": "string" } },
            { "name": "Test.GetName", "type": { "kind": "signature", "results": ["string"] } }
        ],
        "root": {
            "kind": "file",
            "package": "tests",
            "decls": [
                {
                    "kind": "struct_decl",
                    "name": "Test",
                    "fields": [
                        {
                            "kind": "field",
                            "names": [{ "kind": "ident", "name": "Name", "symbol": 0, "def": true }],
                            "type": { "kind": "ident", "name": "string" }
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_unit_from_json() {
        let dto: UnitDto = serde_json::from_str(UNIT).unwrap();
        let unit = dto.into_unit().unwrap();

        assert_eq!(unit.name, "test.pb.go");
        assert_eq!(unit.symbols.len(), 2);
        assert_eq!(
            unit.symbols.get(SymbolId::from_index(1)).unwrap().ty,
            StaticType::Signature { results: vec![TypeShape::parse("string")] }
        );

        let def = unit
            .tree
            .ids()
            .find(|id| unit.tree.binding(*id).is_some())
            .unwrap();
        assert_eq!(unit.tree.ident_name(def), Some("Name"));
        assert_eq!(unit.tree.binding(def).unwrap().role, Role::Def);
        match unit.tree.node(unit.tree.parent(def).unwrap()) {
            Node::Field { .. } => {}
            other => panic!("unexpected parent {:?}", other),
        }
    }

    #[test]
    fn test_unit_dto_survives_arena() {
        let dto: UnitDto = serde_json::from_str(UNIT).unwrap();
        let unit = dto.clone().into_unit().unwrap();
        assert_eq!(UnitDto::from(&unit), dto);
    }

    #[test]
    fn test_dangling_symbol_is_rejected() {
        let dto = UnitDto {
            name: "bad.go".into(),
            symbols: vec![],
            root: NodeDto::Ident {
                name: "Name".into(),
                symbol: Some(3),
                def: false,
            },
        };
        match dto.into_unit() {
            Err(Error::DanglingSymbol { index, declared, .. }) => {
                assert_eq!(index, 3);
                assert_eq!(declared, 0);
            }
            other => panic!("expected dangling symbol error, got {:?}", other.map(|u| u.name)),
        }
    }
}
