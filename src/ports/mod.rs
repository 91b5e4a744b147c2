use std::path::{Path, PathBuf};

use crate::domain::Unit;
use crate::error::Result;

pub mod source_printer;

/// Produces parsed units with resolved symbols.
pub trait UnitLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Unit>;
}

/// Writes a rewritten unit into `dir`, returning the written path.
pub trait UnitExporter: Send + Sync {
    fn export(&self, unit: &Unit, dir: &Path) -> Result<PathBuf>;
}
