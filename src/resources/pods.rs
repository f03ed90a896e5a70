//! Pod extraction and per-pod file discovery.

use super::model::{ContainerStatusManifest, PodManifest};
use crate::core::{ContainerState, ContainerStatus, PodCondition, PodFiles, PodRecord};
use crate::errors::Result;
use crate::io::walker::{DumpDirectory, DumpFile};
use crate::naming::{decode_location, Location};
use crate::parsers::manifest::{decode_each, kind_of, parse_manifest, Decoded};

pub const POD_DUMP_PATTERN: &str = "*z_pods.txt";

const AGENT_LOG_PREFIXES: [&str; 4] = ["agent-verbose", "agent.", "agent-stderr", "monitoring-agent"];

/// Extract every Pod from one `z_pods.txt` dump. A Pod that does not
/// decode is rejected on its own.
pub fn extract_pods(file: &DumpFile, dir: &DumpDirectory) -> Result<Decoded<PodRecord>> {
    let content = file.read_to_string()?;
    let location = decode_location(&file.name);

    let pods = parse_manifest(&file.name, &content)?
        .into_iter()
        .filter(|resource| kind_of(resource) == Some("Pod"));
    let decoded: Decoded<PodManifest> = decode_each(&file.name, pods);
    Ok(decoded.map(|pod| pod_record(pod, &location, &file.name, dir)))
}

fn pod_record(pod: PodManifest, location: &Location, source_file: &str, dir: &DumpDirectory) -> PodRecord {
    let name = pod.metadata.name_or_unknown();
    let containers: Vec<ContainerStatus> = pod
        .status
        .container_statuses
        .into_iter()
        .map(container_status)
        .collect();

    let conditions = pod
        .status
        .conditions
        .into_iter()
        .map(|c| PodCondition {
            kind: c.kind,
            status: c.status,
            reason: c.reason,
        })
        .collect();

    PodRecord {
        id: format!("{}/{}/{}", location.cluster, location.namespace, name),
        files: find_pod_files(dir, location, &name),
        namespace: location.namespace.clone(),
        cluster: location.cluster.clone(),
        phase: pod.status.phase.unwrap_or_else(|| "unknown".to_string()),
        ready: ready_summary(&containers),
        restarts: containers.iter().fold(0u32, |sum, c| sum.saturating_add(c.restarts)),
        owner_ref: pod.metadata.owner_ref(),
        created: pod.metadata.created(),
        containers,
        conditions,
        source_file: source_file.to_string(),
        name,
    }
}

fn container_status(status: ContainerStatusManifest) -> ContainerStatus {
    let state = if status.state.running.is_some() {
        ContainerState::Running
    } else if status.state.waiting.is_some() {
        ContainerState::Waiting
    } else if status.state.terminated.is_some() {
        ContainerState::Terminated
    } else {
        ContainerState::Unknown
    };

    let last_terminated = status.last_state.terminated;
    ContainerStatus {
        name: status.name.unwrap_or_else(|| "unknown".to_string()),
        state,
        ready: status.ready,
        restarts: status.restart_count,
        last_state: last_terminated.as_ref().map(|_| "terminated".to_string()),
        exit_code: last_terminated.and_then(|t| t.exit_code),
    }
}

/// `ready/total` over container statuses.
pub fn ready_summary(containers: &[ContainerStatus]) -> String {
    let ready = containers.iter().filter(|c| c.ready).count();
    format!("{}/{}", ready, containers.len())
}

/// Index the diagnostics captured for one pod by `{prefix}{pod}-` match.
pub fn find_pod_files(dir: &DumpDirectory, location: &Location, pod_name: &str) -> PodFiles {
    let mut files = PodFiles::default();

    for prefix in location.file_prefixes() {
        let pod_prefix = format!("{prefix}{pod_name}-");
        for file in dir.with_prefix(&pod_prefix) {
            let suffix = &file.name[pod_prefix.len()..];
            let name = file.name.clone();
            match suffix {
                "pod-describe.txt" => files.describe = Some(name),
                "agent-health-status.json" => files.health = Some(name),
                "cluster-config.json" | "automation-mongod.conf" => files.config.push(name),
                s if s.ends_with(".log") && AGENT_LOG_PREFIXES.iter().any(|p| s.starts_with(p)) => {
                    files.agent_logs.push(name)
                }
                s if s.ends_with(".log") => files.logs.push(name),
                _ => {}
            }
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::fs;
    use tempfile::TempDir;

    const PODS: &str = indoc! {"
        ----
        Pods
        ----
        apiVersion: v1
        items:
        - apiVersion: v1
          kind: Pod
          metadata:
            name: my-rs-0
            creationTimestamp: '2024-05-01T10:00:00Z'
            ownerReferences:
            - kind: StatefulSet
              name: my-rs
          status:
            phase: Running
            conditions:
            - type: Ready
              status: 'False'
              reason: ContainersNotReady
            containerStatuses:
            - name: mongod
              ready: true
              restartCount: 1
              state:
                running: {}
              lastState:
                terminated:
                  exitCode: 137
            - name: agent
              ready: false
              restartCount: 2
              state:
                waiting:
                  reason: CrashLoopBackOff
        kind: List
    "};

    fn dump(files: &[(&str, &str)]) -> (TempDir, DumpDirectory) {
        let dir = TempDir::new().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let snapshot = DumpDirectory::scan(dir.path()).unwrap();
        (dir, snapshot)
    }

    #[test]
    fn test_pod_fields() {
        let (_tmp, dir) = dump(&[("_ns_z_pods.txt", PODS)]);
        let pods = extract_pods(dir.get("_ns_z_pods.txt").unwrap(), &dir).unwrap().items;
        assert_eq!(pods.len(), 1);

        let pod = &pods[0];
        assert_eq!(pod.id, "default/ns/my-rs-0");
        assert_eq!(pod.ready, "1/2");
        assert_eq!(pod.restarts, 3);
        assert_eq!(pod.phase, "Running");
        assert_eq!(pod.owner_ref.as_deref(), Some("StatefulSet/my-rs"));
        assert_eq!(pod.created, "2024-05-01T10:00:00Z");
        assert_eq!(pod.containers[0].state, ContainerState::Running);
        assert_eq!(pod.containers[0].last_state.as_deref(), Some("terminated"));
        assert_eq!(pod.containers[0].exit_code, Some(137));
        assert_eq!(pod.containers[1].state, ContainerState::Waiting);
        assert_eq!(pod.containers[1].exit_code, None);
        assert_eq!(pod.conditions[0].reason.as_deref(), Some("ContainersNotReady"));
    }

    #[test]
    fn test_related_files_are_bucketed() {
        let (_tmp, dir) = dump(&[
            ("c1__ns_z_pods.txt", PODS),
            ("c1__ns_my-rs-0-pod-describe.txt", "describe"),
            ("c1__ns_my-rs-0-agent-health-status.json", "{}"),
            ("c1__ns_my-rs-0-cluster-config.json", "{}"),
            ("c1__ns_my-rs-0-automation-mongod.conf", "net: {}"),
            ("c1__ns_my-rs-0-agent-verbose.log", ""),
            ("c1__ns_my-rs-0-agent.log", ""),
            ("c1__ns_my-rs-0-monitoring-agent.log", ""),
            ("c1__ns_my-rs-0-mongod-container.log", ""),
            ("c1__ns_my-rs-0-launcher.log", ""),
            ("c1__ns_my-rs-1-launcher.log", ""),
            ("c2__ns_my-rs-0-launcher.log", ""),
        ]);
        let pods = extract_pods(dir.get("c1__ns_z_pods.txt").unwrap(), &dir).unwrap().items;
        let files = &pods[0].files;

        assert_eq!(files.describe.as_deref(), Some("c1__ns_my-rs-0-pod-describe.txt"));
        assert_eq!(
            files.health.as_deref(),
            Some("c1__ns_my-rs-0-agent-health-status.json")
        );
        assert_eq!(files.config.len(), 2);
        assert_eq!(
            files.agent_logs,
            vec![
                "c1__ns_my-rs-0-agent-verbose.log",
                "c1__ns_my-rs-0-agent.log",
                "c1__ns_my-rs-0-monitoring-agent.log",
            ]
        );
        assert_eq!(
            files.logs,
            vec!["c1__ns_my-rs-0-launcher.log", "c1__ns_my-rs-0-mongod-container.log"]
        );
    }

    #[test]
    fn test_single_cluster_accepts_both_prefixes() {
        let (_tmp, dir) = dump(&[("_ns_my-rs-0-a.log", ""), ("ns_my-rs-0-b.log", "")]);
        let files = find_pod_files(&dir, &Location::new("default", "ns"), "my-rs-0");
        assert_eq!(files.logs, vec!["_ns_my-rs-0-a.log", "ns_my-rs-0-b.log"]);
    }

    #[test]
    fn test_malformed_pod_is_skipped_alone() {
        let content = indoc! {"
            apiVersion: v1
            items:
            - kind: Pod
              metadata:
                name: good
              status:
                phase: Running
            - kind: Pod
              metadata:
                name: bad
              status:
                containerStatuses:
                - name: mongod
                  restartCount: lots
            kind: List
        "};
        let (_tmp, dir) = dump(&[("_ns_z_pods.txt", content)]);
        let decoded = extract_pods(dir.get("_ns_z_pods.txt").unwrap(), &dir).unwrap();

        let names: Vec<_> = decoded.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["good"]);
        assert_eq!(decoded.rejected.len(), 1);
        assert!(decoded.rejected[0].to_string().contains("_ns_z_pods.txt"));
    }

    #[test]
    fn test_restart_sum_saturates() {
        let content = indoc! {"
            kind: Pod
            metadata:
              name: flappy
            status:
              containerStatuses:
              - name: a
                restartCount: 4294967295
              - name: b
                restartCount: 5
        "};
        let (_tmp, dir) = dump(&[("_ns_z_pods.txt", content)]);
        let pods = extract_pods(dir.get("_ns_z_pods.txt").unwrap(), &dir).unwrap().items;
        assert_eq!(pods[0].restarts, u32::MAX);
    }

    #[test]
    fn test_no_containers_is_zero_of_zero() {
        assert_eq!(ready_summary(&[]), "0/0");
    }
}
