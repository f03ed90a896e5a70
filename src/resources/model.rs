//! Typed views over the parts of Kubernetes manifests the extractors read.
//!
//! Every field is optional or defaulted; dumps come from many API versions
//! and partially-initialized objects must still deserialize.

use serde::Deserialize;
use serde_yaml::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub creation_timestamp: Option<String>,
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    pub fn name_or_unknown(&self) -> String {
        self.name.clone().unwrap_or_else(|| "unknown".to_string())
    }

    pub fn created(&self) -> String {
        self.creation_timestamp.clone().unwrap_or_default()
    }

    /// First owner as `Kind/Name`. Further owners are not modelled.
    pub fn owner_ref(&self) -> Option<String> {
        self.owner_references.first().map(OwnerReference::label)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwnerReference {
    pub kind: String,
    pub name: String,
}

impl OwnerReference {
    pub fn label(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodManifest {
    pub metadata: ObjectMeta,
    pub status: PodStatusManifest,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodStatusManifest {
    pub phase: Option<String>,
    pub container_statuses: Vec<ContainerStatusManifest>,
    pub conditions: Vec<PodConditionManifest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerStatusManifest {
    pub name: Option<String>,
    pub ready: bool,
    pub restart_count: u32,
    pub state: ContainerStateManifest,
    pub last_state: ContainerStateManifest,
}

/// Exactly one of the three is normally set.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContainerStateManifest {
    pub running: Option<Value>,
    pub waiting: Option<Value>,
    pub terminated: Option<TerminatedState>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerminatedState {
    pub exit_code: Option<i32>,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PodConditionManifest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub reason: Option<String>,
}

/// StatefulSet and Deployment share the fields read here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkloadManifest {
    pub metadata: ObjectMeta,
    pub spec: WorkloadSpec,
    pub status: WorkloadStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkloadSpec {
    pub replicas: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkloadStatus {
    pub replicas: Option<u32>,
    pub current_replicas: Option<u32>,
    pub ready_replicas: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenericManifest {
    pub api_version: Option<String>,
    pub kind: Option<String>,
    pub metadata: ObjectMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_pod_manifest_tolerates_missing_fields() {
        let pod: PodManifest = serde_yaml::from_str("kind: Pod\n").unwrap();
        assert!(pod.metadata.name.is_none());
        assert!(pod.status.container_statuses.is_empty());
        assert_eq!(pod.metadata.name_or_unknown(), "unknown");
    }

    #[test]
    fn test_first_owner_reference_only() {
        let meta: ObjectMeta = serde_yaml::from_str(indoc! {"
            name: my-rs-0
            ownerReferences:
            - kind: StatefulSet
              name: my-rs
            - kind: MongoDB
              name: other
        "})
        .unwrap();
        assert_eq!(meta.owner_ref().as_deref(), Some("StatefulSet/my-rs"));
    }

    #[test]
    fn test_container_state() {
        let status: ContainerStatusManifest = serde_yaml::from_str(indoc! {"
            name: mongod
            ready: true
            restartCount: 2
            state:
              running:
                startedAt: '2024-05-01T10:00:00Z'
            lastState:
              terminated:
                exitCode: 137
                reason: OOMKilled
        "})
        .unwrap();
        assert!(status.state.running.is_some());
        assert_eq!(status.restart_count, 2);
        assert_eq!(
            status.last_state.terminated.and_then(|t| t.exit_code),
            Some(137)
        );
    }
}
