// Infrastructure implementations for fieldcast.

pub mod concurrency;
pub mod override_loader;

use std::fs;
use std::path::{Path, PathBuf};

use crate::api::dto::UnitDto;
use crate::domain::Unit;
use crate::error::{Error, Result};
use crate::ports::source_printer::SourcePrinter;
use crate::ports::{UnitExporter, UnitLoader};

pub use override_loader::OverrideConfig;

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads units in the JSON interchange format.
pub struct JsonUnitLoader;

impl UnitLoader for JsonUnitLoader {
    fn load(&self, path: &Path) -> Result<Unit> {
        let content = read_file(path)?;
        let dto: UnitDto = serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        dto.into_unit()
    }
}

/// Writes `<dir>/<unit name>.json` in the interchange format.
pub struct JsonUnitExporter;

impl UnitExporter for JsonUnitExporter {
    fn export(&self, unit: &Unit, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.json", unit.name));
        let content =
            serde_json::to_string_pretty(&UnitDto::from(unit)).map_err(|source| Error::Json {
                path: path.clone(),
                source,
            })?;
        write_file(&path, &content)?;
        Ok(path)
    }
}

/// Writes `<dir>/<unit name>` as Go-style source text.
pub struct SourceUnitExporter;

impl UnitExporter for SourceUnitExporter {
    fn export(&self, unit: &Unit, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&unit.name);
        write_file(&path, &SourcePrinter::print(&unit.tree))?;
        Ok(path)
    }
}
