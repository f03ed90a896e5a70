use anyhow::{Context, Result};
use clap::Parser;
use e2e_summary::cli::Cli;
use e2e_summary::io::{create_output, create_writer, OutputFormat, SummaryWriter};
use e2e_summary::observability::{init_tracing, install_panic_hook};
use e2e_summary::pipeline::{GeneratedSummary, SummaryGenerator};
use std::path::Path;

fn main() -> Result<()> {
    install_panic_hook();
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = cli.summary_config()?;
    let limits = config.render.clone();
    let generator = SummaryGenerator::new(config);
    let summary = generator.generate(&cli.logs_dir, &cli.run_parameters())?;

    let output = cli.output_path();
    write_report(OutputFormat::Html, &output, &summary, &limits)?;
    if let Some(json) = &cli.json {
        write_report(OutputFormat::Json, json, &summary, &limits)?;
    }

    if !summary.document.warnings.is_empty() {
        tracing::warn!(
            "Summary written with {} collection warning(s)",
            summary.document.warnings.len()
        );
    }
    eprintln!("Test summary written to {}", output.display());
    Ok(())
}

fn write_report(
    format: OutputFormat,
    path: &Path,
    summary: &GeneratedSummary,
    limits: &e2e_summary::config::RenderConfig,
) -> Result<()> {
    let file = create_output(path)?;
    create_writer(format, file, limits.clone())
        .write_summary(summary)
        .with_context(|| format!("Failed to write {}", path.display()))
}
