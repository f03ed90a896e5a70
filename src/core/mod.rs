//! Document model produced by one generation pass.
//!
//! The orchestrator owns a [`TestSummaryDocument`] while the stages fill it;
//! once handed to a writer it is read-only. Embedded file content travels
//! separately as [`EmbeddedContent`] so the copyable JSON stays small.

pub mod resources;

use crate::patterns::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use resources::{
    ContainerState, ContainerStatus, GenericResource, PodCondition, PodFiles, PodRecord,
    ResourceGroup, ResourceInventory, ResourceRecord, SourceFile, WorkloadRecord,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSummaryDocument {
    pub meta: Meta,
    pub test_run: TestRun,
    pub topology: Topology,
    pub resources: ResourceInventory,
    pub resource_graph: ResourceGraph,
    pub diagnostics: BTreeMap<String, DiagnosticsRef>,
    pub errors: Vec<ErrorRecord>,
    pub error_patterns: Vec<ErrorPatternSummary>,
    pub timeline: Vec<TimelineEntry>,
    pub artifacts: ArtifactCatalog,
    pub warnings: Vec<CollectionWarning>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub generated_at: String,
    pub task_id: String,
    pub execution: u32,
    pub test_type: String,
    pub variant: String,
    pub test_name: String,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Test results
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Passed,
    Failed,
    #[default]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestRun {
    pub status: RunStatus,
    pub duration_seconds: f64,
    pub tests: TestCounts,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCounts {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub details: Vec<TestCase>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub status: TestStatus,
    pub duration: f64,
    pub error_message: Option<String>,
    pub file: String,
    pub line: String,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl TestRun {
    /// Result used when no report exists or it cannot be read.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn failed_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.tests
            .details
            .iter()
            .filter(|case| case.status == TestStatus::Failed)
    }
}

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyType {
    #[default]
    SingleCluster,
    MultiCluster,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterRole {
    Single,
    Central,
    Member,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub context: String,
    pub namespaces: Vec<String>,
    pub role: ClusterRole,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    pub kind: TopologyType,
    pub clusters: Vec<ClusterInfo>,
}

impl Topology {
    pub fn single_cluster() -> Self {
        Self {
            kind: TopologyType::SingleCluster,
            clusters: vec![ClusterInfo {
                context: crate::naming::DEFAULT_CLUSTER.to_string(),
                namespaces: Vec::new(),
                role: ClusterRole::Single,
            }],
        }
    }

    pub fn is_multi_cluster(&self) -> bool {
        self.kind == TopologyType::MultiCluster
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::single_cluster()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsRef {
    pub file: String,
    pub cluster: String,
    pub namespace: String,
}

// ---------------------------------------------------------------------------
// Errors and timeline
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSource {
    pub resource: String,
    pub container: String,
    pub file: String,
    pub line: usize,
}

/// One classified log line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub id: String,
    pub timestamp: Option<String>,
    pub severity: Severity,
    pub pattern: String,
    pub source: ErrorSource,
    pub message: String,
    pub context: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPatternSummary {
    pub pattern: String,
    pub count: usize,
    pub description: String,
    pub severity: Severity,
    pub affected_resources: Vec<String>,
    pub error_ids: Vec<String>,
    pub first_occurrence: Option<String>,
    pub last_occurrence: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogErrorEntry {
    pub timestamp: Option<String>,
    pub severity: Option<Severity>,
    pub resource: String,
    pub message: String,
    pub error_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct K8sEventEntry {
    pub timestamp: Option<String>,
    /// Only `Warning` events carry a severity; others serialize as `""`.
    #[serde(with = "blank_severity")]
    pub severity: Option<Severity>,
    pub resource: String,
    pub message: String,
    pub event_type: String,
    pub reason: String,
    pub count: u32,
    pub cluster: String,
    pub namespace: String,
}

/// `Option<Severity>` as a plain string, with `""` for none.
mod blank_severity {
    use crate::patterns::Severity;
    use serde::de::IntoDeserializer;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Severity>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map(|s| s.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Severity>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.is_empty() => Severity::deserialize(raw.as_str().into_deserializer()).map(Some),
            _ => Ok(None),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEntry {
    LogError(LogErrorEntry),
    K8sEvent(K8sEventEntry),
}

impl TimelineEntry {
    pub fn timestamp(&self) -> Option<&str> {
        match self {
            TimelineEntry::LogError(e) => e.timestamp.as_deref(),
            TimelineEntry::K8sEvent(e) => e.timestamp.as_deref(),
        }
    }

    /// Missing timestamps sort as the empty string.
    pub fn sort_key(&self) -> &str {
        self.timestamp().unwrap_or("")
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            TimelineEntry::LogError(e) => e.severity,
            TimelineEntry::K8sEvent(e) => e.severity,
        }
    }

    pub fn resource(&self) -> &str {
        match self {
            TimelineEntry::LogError(e) => &e.resource,
            TimelineEntry::K8sEvent(e) => &e.resource,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            TimelineEntry::LogError(e) => &e.message,
            TimelineEntry::K8sEvent(e) => &e.message,
        }
    }
}

// ---------------------------------------------------------------------------
// Resource graph
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    #[default]
    OwnedBy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGraphEdge {
    pub from: String,
    pub to: String,
    pub relationship: Relationship,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGraph {
    pub edges: Vec<ResourceGraphEdge>,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    Log,
    Describe,
    ResourceDump,
    Diagnostics,
    Events,
    Health,
    Config,
    TestResults,
    Json,
    Yaml,
    Other,
}

impl ArtifactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Log => "log",
            ArtifactType::Describe => "describe",
            ArtifactType::ResourceDump => "resource_dump",
            ArtifactType::Diagnostics => "diagnostics",
            ArtifactType::Events => "events",
            ArtifactType::Health => "health",
            ArtifactType::Config => "config",
            ArtifactType::TestResults => "test_results",
            ArtifactType::Json => "json",
            ArtifactType::Yaml => "yaml",
            ArtifactType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactType::Log => "Logs",
            ArtifactType::Describe => "Describe",
            ArtifactType::ResourceDump => "Resources",
            ArtifactType::Diagnostics => "Diag",
            ArtifactType::Events => "Events",
            ArtifactType::Health => "Health",
            ArtifactType::Config => "Config",
            ArtifactType::TestResults => "Tests",
            ArtifactType::Json => "JSON",
            ArtifactType::Yaml => "YAML",
            ArtifactType::Other => "Other",
        }
    }

    /// Every type, in dashboard column order.
    pub const ALL: [ArtifactType; 11] = [
        ArtifactType::Log,
        ArtifactType::Describe,
        ArtifactType::ResourceDump,
        ArtifactType::Events,
        ArtifactType::Health,
        ArtifactType::Config,
        ArtifactType::Diagnostics,
        ArtifactType::Json,
        ArtifactType::Other,
        ArtifactType::TestResults,
        ArtifactType::Yaml,
    ];
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArtifactType,
    pub size_bytes: u64,
    pub cluster: String,
    pub namespace: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStats {
    pub count: usize,
    pub size_bytes: u64,
}

impl TypeStats {
    pub fn add(&mut self, size_bytes: u64) {
        self.count += 1;
        self.size_bytes += size_bytes;
    }
}

/// Files of one (cluster, namespace) pair with their per-type totals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceArtifacts {
    pub files: Vec<ArtifactFile>,
    pub total_size_bytes: u64,
    pub by_type: BTreeMap<String, TypeStats>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub by_type: BTreeMap<String, TypeStats>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCatalog {
    pub files: Vec<ArtifactFile>,
    pub summary: ArtifactSummary,
    /// cluster -> namespace -> files
    pub by_cluster: BTreeMap<String, BTreeMap<String, NamespaceArtifacts>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    Head,
    Tail,
}

/// Inline-viewable excerpt of one artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedFile {
    pub content: String,
    pub total_lines: usize,
    pub shown_lines: usize,
    pub truncated: bool,
    pub mode: EmbedMode,
}

/// File name -> embedded excerpt. Rendered into its own data island.
pub type EmbeddedContent = BTreeMap<String, EmbeddedFile>;

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// A recoverable failure recorded during collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionWarning {
    pub stage: String,
    pub file: Option<String>,
    pub message: String,
}

impl CollectionWarning {
    pub fn new(stage: impl Into<String>, file: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            file: file.map(str::to_string),
            message: message.into(),
        }
    }
}
