use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::rewrite::{RewriteOptions, DEFAULT_ACCESSOR_PREFIX};
use crate::domain::symbols::{OverrideMap, StaticType, SymbolTable};
use crate::error::{Error, Result};

/// Override configuration read from TOML.
///
/// ```toml
/// accessor_prefix = "Get"
///
/// [overrides]
/// "Test.NullableName" = "wrappers.NullString"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideConfig {
    #[serde(default = "default_prefix")]
    pub accessor_prefix: String,
    /// Qualified symbol name -> override type name.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

fn default_prefix() -> String {
    DEFAULT_ACCESSOR_PREFIX.to_string()
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            accessor_prefix: default_prefix(),
            overrides: BTreeMap::new(),
        }
    }
}

impl OverrideConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: OverrideConfig = toml::from_str(content)?;
        for (symbol, type_name) in &config.overrides {
            if !is_valid_override_type(type_name) {
                return Err(Error::InvalidOverrideType {
                    symbol: symbol.clone(),
                    type_name: type_name.clone(),
                });
            }
        }
        Ok(config)
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            accessor_prefix: self.accessor_prefix.clone(),
        }
    }

    /// Bind the configured names against one unit's symbols.
    ///
    /// A field override also applies to the field's accessor
    /// (`Msg.Field` -> `Msg.GetField`) unless the accessor is listed itself.
    /// Names the unit does not declare are skipped with a warning.
    pub fn resolve(&self, symbols: &SymbolTable) -> OverrideMap {
        let mut map = OverrideMap::new();

        for (name, type_name) in &self.overrides {
            let Some(id) = symbols.lookup(name) else {
                warn!(symbol = %name, "override names a symbol the unit does not declare");
                continue;
            };
            map.insert(id, type_name.clone());

            let Some(symbol) = symbols.get(id) else {
                continue;
            };
            if matches!(symbol.ty, StaticType::Signature { .. }) {
                continue;
            }
            let accessor = match symbol.owner() {
                Some(owner) => format!(
                    "{}.{}{}",
                    owner,
                    self.accessor_prefix,
                    symbol.short_name()
                ),
                None => format!("{}{}", self.accessor_prefix, symbol.short_name()),
            };
            if self.overrides.contains_key(&accessor) {
                continue;
            }
            if let Some(accessor_id) = symbols.lookup(&accessor) {
                debug!(symbol = %name, accessor = %accessor, "override extended to accessor");
                map.insert(accessor_id, type_name.clone());
            }
        }

        map
    }
}

/// A usable override is qualified (`pkg.T`, `example.com/pkg.T`) or spells
/// out a pointer or slice anywhere in it (`*T`, `[]byte`, `map[string]*T`).
/// Bare names such as `string` are rejected.
pub fn is_valid_override_type(type_name: &str) -> bool {
    ['.', '/', '*'].iter().any(|c| type_name.contains(*c)) || type_name.contains("[]")
}
