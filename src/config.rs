use crate::artifacts::EmbedPolicy;
use crate::errors::{Result, SummaryError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const MIB: usize = 1024 * 1024;

/// Collector and renderer limits. Every field has a default, so a partial
/// TOML file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Error records kept per log file before scanning stops.
    pub max_errors_per_file: usize,

    /// Lines embedded per viewable file.
    pub embed_lines: usize,

    /// Total bytes of embedded content across all files.
    pub embed_budget_bytes: usize,

    /// Filenames containing any of these are never embedded.
    pub skip_markers: Vec<String>,

    /// Parse dumps and scan logs on the rayon pool.
    pub parallel: bool,

    pub render: RenderConfig,
}

/// Row caps used by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub table_row_limit: usize,
    pub generic_row_limit: usize,
    pub timeline_limit: usize,
    pub top_patterns: usize,
    pub samples_per_pattern: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_errors_per_file: 50,
            embed_lines: 500,
            embed_budget_bytes: 20 * MIB,
            skip_markers: vec!["test-summary".to_string()],
            parallel: true,
            render: RenderConfig::default(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            table_row_limit: 50,
            generic_row_limit: 100,
            timeline_limit: 200,
            top_patterns: 5,
            samples_per_pattern: 3,
        }
    }
}

impl SummaryConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| SummaryError::io(path, e))?;
        let config = Self::parse(&contents)
            .map_err(|e| SummaryError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| SummaryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("max_errors_per_file", self.max_errors_per_file),
            ("embed_lines", self.embed_lines),
            ("embed_budget_bytes", self.embed_budget_bytes),
            ("render.table_row_limit", self.render.table_row_limit),
            ("render.generic_row_limit", self.render.generic_row_limit),
            ("render.timeline_limit", self.render.timeline_limit),
            ("render.top_patterns", self.render.top_patterns),
            ("render.samples_per_pattern", self.render.samples_per_pattern),
        ];
        match limits.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(SummaryError::Config(format!("{name} must be greater than zero"))),
            None => Ok(()),
        }
    }

    pub fn embed_policy(&self) -> EmbedPolicy {
        EmbedPolicy {
            lines: self.embed_lines,
            budget_bytes: self.embed_budget_bytes,
            skip_markers: self.skip_markers.clone(),
        }
    }
}
