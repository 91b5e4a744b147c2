//! Field type retargeting.
//!
//! [`Retargeter`] walks every occurrence of each overridden symbol and
//! patches it in place: declarations get the override type, accessor bodies
//! get converted returns, and every other reference gets a conversion at
//! the position where the old and new type meet.

mod declaration;
mod returns;
mod usage;

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::ast::{NodeId, Role, SyntaxTree};
use crate::domain::diagnostics::RewriteReport;
use crate::domain::symbols::{OverrideMap, Symbol, SymbolId, SymbolTable};
use crate::domain::type_shape::{cast, TypeShape};

pub const DEFAULT_ACCESSOR_PREFIX: &str = "Get";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Prefix that turns a field name into its generated accessor name.
    pub accessor_prefix: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            accessor_prefix: DEFAULT_ACCESSOR_PREFIX.to_string(),
        }
    }
}

/// Rewrites one unit's tree against an override mapping.
pub struct Retargeter<'a> {
    symbols: &'a SymbolTable,
    overrides: &'a OverrideMap,
    options: RewriteOptions,
}

/// The symbol being retargeted and its override.
struct Target<'s> {
    symbol: &'s Symbol,
    override_name: &'s str,
    override_type: TypeShape,
}

impl<'a> Retargeter<'a> {
    pub fn new(symbols: &'a SymbolTable, overrides: &'a OverrideMap) -> Self {
        Self {
            symbols,
            overrides,
            options: RewriteOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Patch every occurrence of every overridden symbol.
    ///
    /// Symbols are visited in ascending id order and each occurrence is
    /// fully rewritten before the next one is looked at.
    pub fn run(&self, tree: &mut SyntaxTree) -> RewriteReport {
        let mut report = RewriteReport::default();
        let occurrences = collect_occurrences(tree, self.overrides);

        for (id, override_name) in self.overrides.iter() {
            let Some(symbol) = self.symbols.get(id) else {
                debug!(symbol = id.index(), "override for unknown symbol ignored");
                continue;
            };
            let sites = occurrences.get(&id).map(Vec::as_slice).unwrap_or_default();
            debug!(
                symbol = %symbol.name,
                override_type = override_name,
                sites = sites.len(),
                "retargeting symbol"
            );

            let target = Target {
                symbol,
                override_name,
                override_type: TypeShape::parse(override_name),
            };
            for &(ident, role) in sites {
                match role {
                    Role::Def => self.patch_declaration(tree, ident, &target, &mut report),
                    Role::Use => self.patch_usage(tree, ident, &target, &mut report),
                }
            }
        }

        report
    }

    fn accessor_name(&self, field: &str) -> String {
        format!("{}{}", self.options.accessor_prefix, field)
    }
}

/// Snapshot of the bound identifiers of every overridden symbol, in arena
/// order. Nodes allocated while rewriting never carry bindings, so the
/// snapshot stays complete for the whole run.
fn collect_occurrences(
    tree: &SyntaxTree,
    overrides: &OverrideMap,
) -> BTreeMap<SymbolId, Vec<(NodeId, Role)>> {
    let mut sites: BTreeMap<SymbolId, Vec<(NodeId, Role)>> = BTreeMap::new();
    for id in tree.ids() {
        if let Some(binding) = tree.binding(id) {
            if overrides.contains(binding.symbol) {
                sites.entry(binding.symbol).or_default().push((id, binding.role));
            }
        }
    }
    sites
}

/// Replace `expr`, a child of `parent`, with `target(expr)`.
fn cast_in_place(tree: &mut SyntaxTree, parent: NodeId, expr: NodeId, target: &TypeShape) -> bool {
    let wrapped = cast(tree, target, expr);
    tree.replace_child(parent, expr, wrapped)
}
