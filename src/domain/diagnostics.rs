//! Recoverable anomalies reported by the rewrite pass.

use thiserror::Error;

/// A declaration or occurrence that was left unpatched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteWarning {
    #[error("unsupported declared type ({node}) for override `{override_type}` on {symbol}")]
    UnsupportedDeclaredType {
        symbol: String,
        node: String,
        override_type: String,
    },

    #[error("accessor {symbol} declares {count} results, expected exactly one")]
    AccessorArity { symbol: String, count: usize },

    #[error("override declared for a non-field object {symbol} ({node})")]
    UnsupportedDeclaration { symbol: String, node: String },

    #[error("unsupported usage context ({node}) for {symbol}")]
    UnsupportedContext { symbol: String, node: String },
}

impl RewriteWarning {
    pub fn symbol(&self) -> &str {
        match self {
            RewriteWarning::UnsupportedDeclaredType { symbol, .. }
            | RewriteWarning::AccessorArity { symbol, .. }
            | RewriteWarning::UnsupportedDeclaration { symbol, .. }
            | RewriteWarning::UnsupportedContext { symbol, .. } => symbol,
        }
    }

    pub fn node(&self) -> &str {
        match self {
            RewriteWarning::UnsupportedDeclaredType { node, .. }
            | RewriteWarning::UnsupportedDeclaration { node, .. }
            | RewriteWarning::UnsupportedContext { node, .. } => node,
            RewriteWarning::AccessorArity { .. } => "function declaration",
        }
    }
}

/// Outcome of rewriting one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub patched_declarations: usize,
    pub converted_returns: usize,
    pub patched_usages: usize,
    pub warnings: Vec<RewriteWarning>,
}

impl RewriteReport {
    /// Record a warning and emit it as a tracing event.
    pub fn warn(&mut self, warning: RewriteWarning) {
        tracing::warn!(symbol = warning.symbol(), node = warning.node(), "{}", warning);
        self.warnings.push(warning);
    }

    pub fn merge(&mut self, other: RewriteReport) {
        self.patched_declarations += other.patched_declarations;
        self.converted_returns += other.converted_returns;
        self.patched_usages += other.patched_usages;
        self.warnings.extend(other.warnings);
    }
}
