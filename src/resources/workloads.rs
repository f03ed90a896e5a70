//! StatefulSet and Deployment extraction.

use super::model::WorkloadManifest;
use crate::core::{ResourceRecord, WorkloadRecord};
use crate::errors::Result;
use crate::io::walker::DumpFile;
use crate::naming::{decode_location, Location};
use crate::parsers::manifest::{decode_each, kind_of, parse_manifest, Decoded};

pub const STATEFULSET_DUMP_PATTERN: &str = "*z_statefulsets.txt";
pub const DEPLOYMENT_DUMP_PATTERN: &str = "*z_deployments.txt";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkloadKind {
    StatefulSet,
    Deployment,
}

impl WorkloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::Deployment => "Deployment",
        }
    }

    pub fn dump_pattern(&self) -> &'static str {
        match self {
            WorkloadKind::StatefulSet => STATEFULSET_DUMP_PATTERN,
            WorkloadKind::Deployment => DEPLOYMENT_DUMP_PATTERN,
        }
    }

    pub fn wrap(&self, record: WorkloadRecord) -> ResourceRecord {
        match self {
            WorkloadKind::StatefulSet => ResourceRecord::StatefulSet(record),
            WorkloadKind::Deployment => ResourceRecord::Deployment(record),
        }
    }
}

pub fn extract_workloads(kind: WorkloadKind, file: &DumpFile) -> Result<Decoded<WorkloadRecord>> {
    let content = file.read_to_string()?;
    let location = decode_location(&file.name);

    let resources = parse_manifest(&file.name, &content)?
        .into_iter()
        .filter(|resource| kind_of(resource) == Some(kind.as_str()));
    let decoded: Decoded<WorkloadManifest> = decode_each(&file.name, resources);
    Ok(decoded.map(|manifest| workload_record(kind, manifest, &location, &file.name)))
}

fn workload_record(
    kind: WorkloadKind,
    manifest: WorkloadManifest,
    location: &Location,
    source_file: &str,
) -> WorkloadRecord {
    let name = manifest.metadata.name_or_unknown();
    let status = manifest.status;

    // Deployments report `replicas`, StatefulSets `currentReplicas`.
    let current_replicas = match kind {
        WorkloadKind::StatefulSet => status.current_replicas,
        WorkloadKind::Deployment => status.replicas,
    };

    WorkloadRecord {
        id: format!("{}/{}/{}", location.cluster, location.namespace, name),
        namespace: location.namespace.clone(),
        cluster: location.cluster.clone(),
        desired_replicas: manifest.spec.replicas.unwrap_or(0),
        current_replicas: current_replicas.unwrap_or(0),
        ready_replicas: status.ready_replicas.unwrap_or(0),
        owner_ref: manifest.metadata.owner_ref(),
        created: manifest.metadata.created(),
        source_file: source_file.to_string(),
        name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::walker::DumpDirectory;
    use indoc::indoc;
    use std::fs;
    use tempfile::TempDir;

    fn dump_file(name: &str, body: &str) -> (TempDir, DumpFile) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(name), body).unwrap();
        let snapshot = DumpDirectory::scan(dir.path()).unwrap();
        let file = snapshot.files()[0].clone();
        (dir, file)
    }

    #[test]
    fn test_statefulset_replicas() {
        let (_tmp, file) = dump_file(
            "central__ns_z_statefulsets.txt",
            indoc! {"
                apiVersion: v1
                items:
                - apiVersion: apps/v1
                  kind: StatefulSet
                  metadata:
                    name: my-rs
                    ownerReferences:
                    - kind: MongoDB
                      name: my-rs
                  spec:
                    replicas: 3
                  status:
                    replicas: 3
                    currentReplicas: 2
                    readyReplicas: 1
                kind: List
            "},
        );
        let records = extract_workloads(WorkloadKind::StatefulSet, &file).unwrap().items;
        assert_eq!(records.len(), 1);
        let sts = &records[0];
        assert_eq!(sts.id, "central/ns/my-rs");
        assert_eq!((sts.desired_replicas, sts.current_replicas, sts.ready_replicas), (3, 2, 1));
        assert_eq!(sts.owner_ref.as_deref(), Some("MongoDB/my-rs"));
        assert!(!sts.is_healthy());
    }

    #[test]
    fn test_deployment_uses_status_replicas() {
        let (_tmp, file) = dump_file(
            "_ns_z_deployments.txt",
            indoc! {"
                kind: Deployment
                apiVersion: apps/v1
                metadata:
                  name: operator
                spec:
                  replicas: 1
                status:
                  replicas: 1
                  readyReplicas: 1
            "},
        );
        let records = extract_workloads(WorkloadKind::Deployment, &file).unwrap().items;
        assert_eq!(records[0].current_replicas, 1);
        assert!(records[0].is_healthy());
        assert_eq!(records[0].owner_ref, None);
    }

    #[test]
    fn test_other_kinds_are_ignored() {
        let (_tmp, file) = dump_file(
            "_ns_z_statefulsets.txt",
            "kind: Deployment\nmetadata:\n  name: x\n",
        );
        assert!(extract_workloads(WorkloadKind::StatefulSet, &file)
            .unwrap()
            .items
            .is_empty());
    }

    #[test]
    fn test_malformed_workload_keeps_siblings() {
        let (_tmp, file) = dump_file(
            "_ns_z_deployments.txt",
            indoc! {"
                items:
                - kind: Deployment
                  metadata:
                    name: broken
                  spec:
                    replicas: many
                - kind: Deployment
                  metadata:
                    name: operator
                  spec:
                    replicas: 1
                kind: List
            "},
        );
        let decoded = extract_workloads(WorkloadKind::Deployment, &file).unwrap();
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].name, "operator");
        assert_eq!(decoded.rejected.len(), 1);
    }
}
