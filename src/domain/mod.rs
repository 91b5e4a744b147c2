// Domain model: syntax trees, symbols, type shapes and the rewrite engine.

pub mod ast;
pub mod diagnostics;
pub mod rewrite;
pub mod symbols;
pub mod type_shape;
pub mod zero_value;

use crate::domain::ast::SyntaxTree;
use crate::domain::symbols::SymbolTable;

/// One generated source file: its tree and the symbols its identifiers
/// resolve to.
#[derive(Debug, Clone, Default)]
pub struct Unit {
    pub name: String,
    pub symbols: SymbolTable,
    pub tree: SyntaxTree,
}
