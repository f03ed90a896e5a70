//! Kind extractors: turn parsed dumps into normalized resource records.
//!
//! Each dump file is parsed independently (optionally on the rayon pool);
//! a file that fails contributes zero records and one warning.

pub mod generic;
pub mod model;
pub mod pods;
pub mod workloads;

use crate::core::{CollectionWarning, ResourceInventory, ResourceRecord};
use crate::errors::SummaryError;
use crate::io::walker::{map_files, DumpDirectory, DumpFile};
use crate::naming::resource_slug;

pub use generic::extract_generic;
pub use pods::{extract_pods, find_pod_files};
pub use workloads::{extract_workloads, WorkloadKind};

const STAGE: &str = "resources";

/// Inventory plus the per-file failures met while building it.
#[derive(Debug, Default)]
pub struct InventoryOutcome {
    pub inventory: ResourceInventory,
    pub warnings: Vec<CollectionWarning>,
}

impl InventoryOutcome {
    fn warn(&mut self, file: &DumpFile, err: impl std::fmt::Display) {
        tracing::warn!("Failed to parse {}: {}", file.name, err);
        self.warnings
            .push(CollectionWarning::new(STAGE, Some(&file.name), err.to_string()));
    }

    /// One warning per item that did not decode; the rest of the file is kept.
    fn reject(&mut self, file: &DumpFile, rejected: &[SummaryError]) {
        for err in rejected {
            self.warn(file, format!("skipped item: {err}"));
        }
    }
}

pub fn build_inventory(dir: &DumpDirectory, parallel: bool) -> InventoryOutcome {
    let mut outcome = InventoryOutcome::default();

    let pod_files = dir.matching(&[pods::POD_DUMP_PATTERN]);
    for (file, result) in map_files(&pod_files, parallel, |f| extract_pods(f, dir)) {
        match result {
            Ok(decoded) => {
                outcome.reject(file, &decoded.rejected);
                decoded
                    .items
                    .into_iter()
                    .for_each(|pod| outcome.inventory.push(ResourceRecord::Pod(pod)));
            }
            Err(err) => outcome.warn(file, err),
        }
    }

    for kind in [WorkloadKind::StatefulSet, WorkloadKind::Deployment] {
        let files = dir.matching(&[kind.dump_pattern()]);
        for (file, result) in map_files(&files, parallel, |f| extract_workloads(kind, f)) {
            match result {
                Ok(decoded) => {
                    outcome.reject(file, &decoded.rejected);
                    decoded
                        .items
                        .into_iter()
                        .for_each(|record| outcome.inventory.push(kind.wrap(record)));
                }
                Err(err) => outcome.warn(file, err),
            }
        }
    }

    extract_generic_groups(dir, parallel, &mut outcome);

    tracing::debug!(
        pods = outcome.inventory.pods.len(),
        statefulsets = outcome.inventory.statefulsets.len(),
        deployments = outcome.inventory.deployments.len(),
        groups = outcome.inventory.generic.len(),
        "Resource inventory built"
    );
    outcome
}

fn extract_generic_groups(dir: &DumpDirectory, parallel: bool, outcome: &mut InventoryOutcome) {
    let slugged: Vec<(&DumpFile, String)> = dir
        .files()
        .iter()
        .filter_map(|file| resource_slug(&file.name).map(|slug| (file, slug)))
        .collect();
    let files: Vec<&DumpFile> = slugged.iter().map(|(file, _)| *file).collect();

    let results = map_files(&files, parallel, |f| {
        let slug = resource_slug(&f.name).unwrap_or_default();
        extract_generic(&slug, f)
    });

    for ((file, result), (_, slug)) in results.into_iter().zip(&slugged) {
        let group = outcome.inventory.group_mut(slug);
        group.source_files.push(generic::source_file(file));
        match result {
            Ok(decoded) => {
                group.items.extend(decoded.items);
                outcome.reject(file, &decoded.rejected);
            }
            Err(err) => outcome.warn(file, err),
        }
    }
}
