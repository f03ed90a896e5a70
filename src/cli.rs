use crate::config::SummaryConfig;
use crate::pipeline::RunParameters;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

/// File name written inside the logs directory when `-o` is not given.
pub const DEFAULT_OUTPUT_NAME: &str = "test-summary.html";

#[derive(Parser, Debug)]
#[command(name = "e2e-summary")]
#[command(about = "Aggregate an E2E diagnostic dump into a single-file HTML dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding the flat diagnostic dump
    pub logs_dir: PathBuf,

    /// HTML output file (defaults to <LOGS_DIR>/test-summary.html)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the summary document as JSON
    #[arg(long, value_name = "OUTPUT")]
    pub json: Option<PathBuf>,

    /// CI task identifier
    #[arg(long, default_value = "")]
    pub task_id: String,

    /// CI execution number
    #[arg(long, default_value_t = 0)]
    pub execution: u32,

    /// Test type shown in the header
    #[arg(long, default_value = "")]
    pub test_type: String,

    /// Overall status; read from the JUnit report when omitted
    #[arg(long)]
    pub status: Option<String>,

    /// Build variant
    #[arg(long, default_value = "")]
    pub variant: String,

    /// Test name shown in the title
    #[arg(long, default_value = "")]
    pub test_name: String,

    /// TOML configuration file
    #[arg(long, env = "E2E_SUMMARY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cap on error records taken from one log file
    #[arg(long)]
    pub max_errors_per_file: Option<usize>,

    /// Lines embedded per viewable file
    #[arg(long)]
    pub embed_lines: Option<usize>,

    /// Total embedding budget in MiB
    #[arg(long)]
    pub embed_budget_mb: Option<usize>,

    /// Process files sequentially
    #[arg(long)]
    pub no_parallel: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output(&self.logs_dir))
    }

    pub fn run_parameters(&self) -> RunParameters {
        RunParameters {
            task_id: self.task_id.clone(),
            execution: self.execution,
            test_type: self.test_type.clone(),
            status: self.status.clone(),
            variant: self.variant.clone(),
            test_name: self.test_name.clone(),
            generated_at: None,
        }
    }

    /// File configuration (or defaults) with command-line overrides applied.
    pub fn summary_config(&self) -> Result<SummaryConfig> {
        let base = match &self.config {
            Some(path) => SummaryConfig::load(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => SummaryConfig::default(),
        };
        let config = self.apply_overrides(base);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn apply_overrides(&self, mut config: SummaryConfig) -> SummaryConfig {
        if let Some(max) = self.max_errors_per_file {
            config.max_errors_per_file = max;
        }
        if let Some(lines) = self.embed_lines {
            config.embed_lines = lines;
        }
        if let Some(mb) = self.embed_budget_mb {
            config.embed_budget_bytes = mb.saturating_mul(1024 * 1024);
        }
        if self.no_parallel {
            config.parallel = false;
        }
        config
    }
}

pub fn default_output(logs_dir: &Path) -> PathBuf {
    logs_dir.join(DEFAULT_OUTPUT_NAME)
}
