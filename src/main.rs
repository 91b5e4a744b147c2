// Command-line entry point for fieldcast.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldcast::application::RetargetUsecase;
use fieldcast::domain::diagnostics::RewriteReport;
use fieldcast::infrastructure::concurrency::init_thread_pool;
use fieldcast::infrastructure::{JsonUnitExporter, JsonUnitLoader, OverrideConfig, SourceUnitExporter};
use fieldcast::ports::UnitExporter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Rewritten unit in the JSON interchange format
    Json,
    /// Go-style source text
    Source,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Retarget generated struct fields to override types", long_about = None)]
struct Cli {
    /// Input unit file (can specify multiple)
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Override configuration (TOML)
    #[arg(long)]
    overrides: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: Format,

    /// Worker threads (default: half the cores)
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldcast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    init_thread_pool(cli.threads)?;

    let config = OverrideConfig::from_path(&cli.overrides)
        .with_context(|| format!("Failed to load overrides from {}", cli.overrides.display()))?;
    info!(
        overrides = config.overrides.len(),
        prefix = %config.accessor_prefix,
        "loaded override config"
    );

    let exporter: &dyn UnitExporter = match cli.format {
        Format::Json => &JsonUnitExporter,
        Format::Source => &SourceUnitExporter,
    };

    let usecase = RetargetUsecase {
        loader: &JsonUnitLoader,
        exporter,
        config: &config,
    };

    let summaries = usecase.run(&cli.input, &cli.output)?;

    let mut total = RewriteReport::default();
    for summary in summaries {
        println!(
            "{} -> {} ({} declarations, {} usages, {} warnings)",
            summary.unit,
            summary.output.display(),
            summary.report.patched_declarations,
            summary.report.patched_usages,
            summary.report.warnings.len()
        );
        total.merge(summary.report);
    }

    println!(
        "Rewrite completed: {} declarations, {} returns, {} usages patched, {} warnings",
        total.patched_declarations,
        total.converted_returns,
        total.patched_usages,
        total.warnings.len()
    );

    Ok(())
}
