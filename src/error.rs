//! Error types for loading, validating and exporting units.
//!
//! The rewrite pass itself never fails; everything it cannot handle is a
//! [`RewriteWarning`](crate::domain::diagnostics::RewriteWarning).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A unit file is not valid interchange JSON
    #[error("Malformed unit {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The override configuration is not valid TOML
    #[error("Malformed override config: {0}")]
    Config(#[from] toml::de::Error),

    /// An override names a bare predeclared type
    ///
    /// **Triggered by:** `"Msg.Name" = "string"`
    /// **Prevention:** use a qualified (`pkg.T`), pointer (`*T`) or slice (`[]T`) type
    #[error("Invalid override type `{type_name}` for {symbol}: must be qualified, a pointer or a slice")]
    InvalidOverrideType { symbol: String, type_name: String },

    /// An identifier in a unit refers past the end of its symbol table
    #[error("Identifier `{name}` refers to symbol #{index}, but the unit declares {declared}")]
    DanglingSymbol {
        name: String,
        index: usize,
        declared: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
