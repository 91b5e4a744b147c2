//! Symbol table and override mapping for one generated unit.

use std::collections::{BTreeMap, HashMap};

use crate::domain::type_shape::TypeShape;

/// Stable handle to a symbol, an index into the unit's [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn from_index(index: usize) -> Self {
        SymbolId(index as u32)
    }
}

/// Statically known type of a declared field or function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticType {
    /// Scalar or named type, e.g. `string`, `int64`, `Status`.
    Named(String),
    /// `*name`
    Pointer(String),
    /// `[]name`
    Array(String),
    /// Function or method signature.
    Signature { results: Vec<TypeShape> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Qualified name, e.g. `Test.NullableName`.
    pub name: String,
    pub ty: StaticType,
}

impl Symbol {
    /// Name as it appears at identifier sites (`NullableName`).
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Receiver-qualified prefix (`Test`), if any.
    pub fn owner(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(owner, _)| owner)
    }
}

/// Symbols of one unit, addressed by [`SymbolId`].
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: StaticType) -> SymbolId {
        let name = name.into();
        let id = SymbolId::from_index(self.symbols.len());
        self.by_name.insert(name.clone(), id);
        self.symbols.push(Symbol { name, ty });
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId::from_index(i), s))
    }
}

/// Symbol -> override type name. Iterates in ascending [`SymbolId`] order so
/// repeated runs rewrite in the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideMap {
    entries: BTreeMap<SymbolId, String>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous override when the symbol was already mapped.
    pub fn insert(&mut self, symbol: SymbolId, type_name: impl Into<String>) -> Option<String> {
        self.entries.insert(symbol, type_name.into())
    }

    pub fn get(&self, symbol: SymbolId) -> Option<&str> {
        self.entries.get(&symbol).map(String::as_str)
    }

    pub fn contains(&self, symbol: SymbolId) -> bool {
        self.entries.contains_key(&symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
