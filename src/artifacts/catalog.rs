//! Classification and sizing of every file in the dump.

use crate::core::{ArtifactCatalog, ArtifactFile, ArtifactType};
use crate::io::walker::DumpDirectory;
use crate::naming::{decode_location, is_resource_dump};

/// Closed file-type classification. Rules are checked in order.
pub fn classify_file(name: &str) -> ArtifactType {
    if name.ends_with(".log") {
        ArtifactType::Log
    } else if name.contains("pod-describe") {
        ArtifactType::Describe
    } else if is_resource_dump(name) && name.ends_with(".txt") {
        ArtifactType::ResourceDump
    } else if name.contains("_0_diagnostics.txt") {
        ArtifactType::Diagnostics
    } else if name.contains("events_detailed.yaml") || name.contains("events.txt") {
        ArtifactType::Events
    } else if name.contains("agent-health-status.json") {
        ArtifactType::Health
    } else if name.contains("automation-mongod.conf") || name.contains("cluster-config.json") {
        ArtifactType::Config
    } else if name.ends_with(".xml") {
        ArtifactType::TestResults
    } else if name.ends_with(".json") {
        ArtifactType::Json
    } else if name.ends_with(".yaml") {
        ArtifactType::Yaml
    } else {
        ArtifactType::Other
    }
}

/// One pass over the listing: flat file list, global totals and the
/// per-(cluster, namespace) breakdown.
pub fn build_catalog(dir: &DumpDirectory) -> ArtifactCatalog {
    let mut catalog = ArtifactCatalog::default();

    for file in dir.files() {
        let location = decode_location(&file.name);
        let entry = ArtifactFile {
            name: file.name.clone(),
            kind: classify_file(&file.name),
            size_bytes: file.size_bytes,
            cluster: location.cluster,
            namespace: location.namespace,
        };

        let type_key = entry.kind.as_str().to_string();
        catalog.summary.total_files += 1;
        catalog.summary.total_size_bytes += entry.size_bytes;
        catalog
            .summary
            .by_type
            .entry(type_key.clone())
            .or_default()
            .add(entry.size_bytes);

        let bucket = catalog
            .by_cluster
            .entry(entry.cluster.clone())
            .or_default()
            .entry(entry.namespace.clone())
            .or_default();
        bucket.total_size_bytes += entry.size_bytes;
        bucket.by_type.entry(type_key).or_default().add(entry.size_bytes);
        bucket.files.push(entry.clone());

        catalog.files.push(entry);
    }

    tracing::debug!(
        files = catalog.summary.total_files,
        bytes = catalog.summary.total_size_bytes,
        "Artifacts cataloged"
    );
    catalog
}

/// `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let size = bytes as f64;
    if size < KB {
        format!("{bytes} B")
    } else if size < KB * KB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{:.1} MB", size / (KB * KB))
    }
}
