use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::info;

use crate::domain::diagnostics::RewriteReport;
use crate::domain::rewrite::Retargeter;
use crate::domain::Unit;
use crate::infrastructure::OverrideConfig;
use crate::ports::{UnitExporter, UnitLoader};

/// Result of rewriting and exporting one unit.
#[derive(Debug, Clone)]
pub struct UnitSummary {
    pub unit: String,
    pub output: PathBuf,
    pub report: RewriteReport,
}

/// Rewrite a single unit in place.
///
/// Each call builds its own override map and engine, so units can be
/// processed concurrently.
pub fn retarget_unit(unit: &mut Unit, config: &OverrideConfig) -> RewriteReport {
    let overrides = config.resolve(&unit.symbols);
    Retargeter::new(&unit.symbols, &overrides)
        .with_options(config.rewrite_options())
        .run(&mut unit.tree)
}

pub struct RetargetUsecase<'a> {
    pub loader: &'a dyn UnitLoader,
    pub exporter: &'a dyn UnitExporter,
    pub config: &'a OverrideConfig,
}

impl<'a> RetargetUsecase<'a> {
    /// Load, rewrite and export every input in parallel.
    ///
    /// Summaries come back in input order. The first failing unit aborts the
    /// batch.
    pub fn run(&self, inputs: &[PathBuf], output_dir: &Path) -> Result<Vec<UnitSummary>> {
        inputs
            .par_iter()
            .map(|input| self.process(input, output_dir))
            .collect()
    }

    fn process(&self, input: &Path, output_dir: &Path) -> Result<UnitSummary> {
        let mut unit = self
            .loader
            .load(input)
            .with_context(|| format!("Failed to load unit {}", input.display()))?;

        let report = retarget_unit(&mut unit, self.config);

        let output = self
            .exporter
            .export(&unit, output_dir)
            .with_context(|| format!("Failed to export unit {}", unit.name))?;

        info!(
            unit = %unit.name,
            declarations = report.patched_declarations,
            returns = report.converted_returns,
            usages = report.patched_usages,
            warnings = report.warnings.len(),
            "unit rewritten"
        );

        Ok(UnitSummary {
            unit: unit.name,
            output,
            report,
        })
    }
}
