//! Sequences the collector stages over one dump directory and assembles
//! the [`TestSummaryDocument`].
//!
//! Listing the directory is the only step allowed to fail the run. Every
//! later stage runs through [`run_isolated`] and per-file problems come back
//! as warnings, so a malformed file never aborts generation.

use crate::analysis::{aggregate_patterns, build_resource_graph, build_timeline, detect_topology, index_diagnostics};
use crate::artifacts::{build_catalog, embed_files, EmbedOutcome};
use crate::config::SummaryConfig;
use crate::core::{EmbeddedContent, ErrorRecord, K8sEventEntry, Meta, TestSummaryDocument};
use crate::io::walker::DumpDirectory;
use crate::logs::{scan_logs, ScanOutcome};
use crate::parsers::{load_events, load_test_run, EventsOutcome};
use crate::patterns::ErrorPatternLibrary;
use crate::pipeline::stage::{run_isolated, FallibleStage, PureStage};
use crate::resources::{build_inventory, InventoryOutcome};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;

/// Values supplied by the caller for the report header.
#[derive(Debug, Clone, Default)]
pub struct RunParameters {
    pub task_id: String,
    pub execution: u32,
    pub test_type: String,
    /// Overall status; taken from the test report when absent.
    pub status: Option<String>,
    pub variant: String,
    pub test_name: String,
    /// Fixed generation time for reproducible output.
    pub generated_at: Option<DateTime<Utc>>,
}

/// Document plus the inline file content that travels beside it.
#[derive(Debug, Clone)]
pub struct GeneratedSummary {
    pub document: TestSummaryDocument,
    pub embedded: EmbeddedContent,
}

pub struct SummaryGenerator {
    config: SummaryConfig,
    library: &'static ErrorPatternLibrary,
}

impl SummaryGenerator {
    pub fn new(config: SummaryConfig) -> Self {
        Self {
            config,
            library: ErrorPatternLibrary::standard(),
        }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Collect everything under `logs_dir`. Fails only when the directory
    /// itself cannot be listed.
    pub fn generate(&self, logs_dir: &Path, params: &RunParameters) -> Result<GeneratedSummary> {
        tracing::info!("Collecting test summary from {}", logs_dir.display());
        let dir = DumpDirectory::scan(logs_dir)
            .with_context(|| format!("Cannot collect summary from {}", logs_dir.display()))?;
        Ok(self.collect(&dir, params))
    }

    fn collect(&self, dir: &DumpDirectory, params: &RunParameters) -> GeneratedSummary {
        let config = &self.config;
        let mut warnings = Vec::new();

        let test_run = run_isolated(
            &FallibleStage::new("test results", load_test_run),
            dir,
            &mut warnings,
        );
        let topology = run_isolated(&PureStage::new("topology", detect_topology), dir, &mut warnings);
        let diagnostics = run_isolated(
            &PureStage::new("diagnostics", index_diagnostics),
            dir,
            &mut warnings,
        );

        let InventoryOutcome {
            inventory,
            warnings: resource_warnings,
        } = run_isolated(
            &PureStage::new("resources", |d: &DumpDirectory| build_inventory(d, config.parallel)),
            dir,
            &mut warnings,
        );
        warnings.extend(resource_warnings);

        let resource_graph = run_isolated(
            &PureStage::new("resource graph", build_resource_graph),
            &inventory,
            &mut warnings,
        );

        let ScanOutcome {
            errors,
            warnings: log_warnings,
            files_scanned,
        } = run_isolated(
            &PureStage::new("logs", |d: &DumpDirectory| {
                scan_logs(d, self.library, config.max_errors_per_file, config.parallel)
            }),
            dir,
            &mut warnings,
        );
        warnings.extend(log_warnings);

        let EventsOutcome {
            events,
            warnings: event_warnings,
        } = run_isolated(
            &PureStage::new("events", |d: &DumpDirectory| load_events(d, config.parallel)),
            dir,
            &mut warnings,
        );
        warnings.extend(event_warnings);

        let timeline = run_isolated(
            &PureStage::new(
                "timeline",
                |(events, errors): (Vec<K8sEventEntry>, &[ErrorRecord])| build_timeline(events, errors),
            ),
            (events, errors.as_slice()),
            &mut warnings,
        );
        let error_patterns = run_isolated(
            &PureStage::new("error patterns", |errors: &[ErrorRecord]| {
                aggregate_patterns(errors, self.library)
            }),
            errors.as_slice(),
            &mut warnings,
        );

        let artifacts = run_isolated(&PureStage::new("artifacts", build_catalog), dir, &mut warnings);
        let policy = config.embed_policy();
        let EmbedOutcome {
            content: embedded,
            warnings: embed_warnings,
            ..
        } = run_isolated(
            &PureStage::new("embed", |d: &DumpDirectory| embed_files(d, &policy)),
            dir,
            &mut warnings,
        );
        warnings.extend(embed_warnings);

        let generated_at = params
            .generated_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let meta = Meta {
            generated_at,
            task_id: params.task_id.clone(),
            execution: params.execution,
            test_type: params.test_type.clone(),
            variant: params.variant.clone(),
            test_name: params.test_name.clone(),
            status: params
                .status
                .clone()
                .unwrap_or_else(|| test_run.status.as_str().to_string()),
        };

        tracing::info!(
            files = dir.files().len(),
            logs = files_scanned,
            pods = inventory.pods.len(),
            errors = errors.len(),
            timeline = timeline.len(),
            warnings = warnings.len(),
            "Collection complete"
        );

        GeneratedSummary {
            document: TestSummaryDocument {
                meta,
                test_run,
                topology,
                resources: inventory,
                resource_graph,
                diagnostics,
                errors,
                error_patterns,
                timeline,
                artifacts,
                warnings,
            },
            embedded,
        }
    }
}
