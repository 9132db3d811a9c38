use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use scopegen_dart::{write_output, DartGenerator, GeneratorConfig, Schema};

#[derive(Parser)]
#[command(name = "scopegen")]
#[command(about = "Generate Dart pub/sub packages from parsed schema IR")]
struct Args {
    /// Parsed schema IR (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory (defaults to the config's output_dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Generator config (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    info!("Reading schema: {}", args.input.display());
    let input = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let schema: Schema = serde_json::from_str(&input)
        .with_context(|| format!("invalid schema IR in {}", args.input.display()))?;

    let output = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    let generator = DartGenerator::new(config);
    let report = write_output(&generator, &schema, &output)?;

    info!(
        "Wrote {} files and {} exports to {}",
        report.files.len(),
        report.exports_added,
        report.package_dir.display()
    );
    Ok(())
}
