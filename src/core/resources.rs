//! Normalized resource records extracted from `kubectl get -o yaml` dumps.
//!
//! Records are immutable once extracted. The same object captured in two
//! dumps yields two records; nothing is merged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Running,
    Waiting,
    Terminated,
    #[default]
    Unknown,
}

impl ContainerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Running => "running",
            ContainerState::Waiting => "waiting",
            ContainerState::Terminated => "terminated",
            ContainerState::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    pub state: ContainerState,
    pub ready: bool,
    pub restarts: u32,
    pub last_state: Option<String>,
    pub exit_code: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodCondition {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub reason: Option<String>,
}

/// Per-pod diagnostics discovered by file prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodFiles {
    pub describe: Option<String>,
    pub health: Option<String>,
    pub config: Vec<String>,
    pub agent_logs: Vec<String>,
    pub logs: Vec<String>,
}

impl PodFiles {
    /// Every discovered file, sorted by name.
    pub fn all(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self
            .logs
            .iter()
            .chain(&self.agent_logs)
            .chain(&self.config)
            .map(String::as_str)
            .chain(self.describe.as_deref())
            .chain(self.health.as_deref())
            .collect();
        files.sort_unstable();
        files
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRecord {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub cluster: String,
    pub phase: String,
    /// `ready/total` container count.
    pub ready: String,
    pub restarts: u32,
    pub owner_ref: Option<String>,
    pub created: String,
    pub containers: Vec<ContainerStatus>,
    pub conditions: Vec<PodCondition>,
    pub files: PodFiles,
    pub source_file: String,
}

impl PodRecord {
    pub fn is_healthy(&self) -> bool {
        self.phase == "Running"
    }
}

/// StatefulSet or Deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRecord {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub cluster: String,
    pub desired_replicas: u32,
    pub current_replicas: u32,
    pub ready_replicas: u32,
    pub owner_ref: Option<String>,
    pub created: String,
    pub source_file: String,
}

impl WorkloadRecord {
    pub fn is_healthy(&self) -> bool {
        self.ready_replicas == self.desired_replicas
    }
}

/// Fallback record for any other dumped kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericResource {
    pub name: String,
    pub namespace: String,
    pub cluster: String,
    pub kind: String,
    pub api_version: String,
    pub created: String,
    pub source_file: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub cluster: String,
    pub namespace: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub display_name: String,
    pub items: Vec<GenericResource>,
    pub source_files: Vec<SourceFile>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceRecord {
    Pod(PodRecord),
    StatefulSet(WorkloadRecord),
    Deployment(WorkloadRecord),
    Generic(GenericResource),
}

impl ResourceRecord {
    pub fn kind(&self) -> &str {
        match self {
            ResourceRecord::Pod(_) => "Pod",
            ResourceRecord::StatefulSet(_) => "StatefulSet",
            ResourceRecord::Deployment(_) => "Deployment",
            ResourceRecord::Generic(g) => &g.kind,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResourceRecord::Pod(p) => &p.name,
            ResourceRecord::StatefulSet(w) | ResourceRecord::Deployment(w) => &w.name,
            ResourceRecord::Generic(g) => &g.name,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInventory {
    pub pods: Vec<PodRecord>,
    pub statefulsets: Vec<WorkloadRecord>,
    pub deployments: Vec<WorkloadRecord>,
    /// slug -> group, for every `_z_` dump
    pub generic: BTreeMap<String, ResourceGroup>,
}

impl ResourceInventory {
    /// Route a typed record into its table. Generic records go through
    /// [`ResourceInventory::group_mut`] because they are keyed by slug.
    pub fn push(&mut self, record: ResourceRecord) {
        match record {
            ResourceRecord::Pod(pod) => self.pods.push(pod),
            ResourceRecord::StatefulSet(sts) => self.statefulsets.push(sts),
            ResourceRecord::Deployment(deploy) => self.deployments.push(deploy),
            ResourceRecord::Generic(item) => {
                let slug = item.kind.to_lowercase();
                self.group_mut(&slug).items.push(item);
            }
        }
    }

    pub fn group_mut(&mut self, slug: &str) -> &mut ResourceGroup {
        self.generic
            .entry(slug.to_string())
            .or_insert_with(|| ResourceGroup {
                display_name: crate::naming::slug_display_name(slug),
                ..ResourceGroup::default()
            })
    }

    pub fn unhealthy_pod_count(&self) -> usize {
        self.pods
            .iter()
            .filter(|pod| !pod.is_healthy() || pod.restarts > 0)
            .count()
    }
}
