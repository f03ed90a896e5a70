#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use e2e_summary::pipeline::RunParameters;
use indoc::indoc;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const PODS_DUMP: &str = indoc! {r#"
    ----
    Pods
    ----
    apiVersion: v1
    items:
    - apiVersion: v1
      kind: Pod
      metadata:
        name: my-rs-0
        namespace: ns
        creationTimestamp: "2024-05-01T11:00:00Z"
        ownerReferences:
        - kind: StatefulSet
          name: my-rs
      status:
        phase: Running
        containerStatuses:
        - name: mongod
          ready: true
          restartCount: 0
          state:
            running: {}
    - apiVersion: v1
      kind: Pod
      metadata:
        name: my-rs-1
        namespace: ns
        creationTimestamp: "2024-05-01T11:00:00Z"
        ownerReferences:
        - kind: StatefulSet
          name: my-rs
      status:
        phase: Pending
        containerStatuses:
        - name: mongod
          ready: false
          restartCount: 3
          state:
            waiting:
              reason: CrashLoopBackOff
"#};

pub const SINGLE_POD_DUMP: &str = indoc! {r#"
    ----
    Pods
    ----
    apiVersion: v1
    items:
    - apiVersion: v1
      kind: Pod
      metadata:
        name: my-rs-0
        namespace: ns
      status:
        phase: Running
"#};

pub const STATEFULSETS_DUMP: &str = indoc! {r#"
    ----
    StatefulSets
    ----
    apiVersion: v1
    items:
    - apiVersion: apps/v1
      kind: StatefulSet
      metadata:
        name: my-rs
        namespace: ns
        creationTimestamp: "2024-05-01T10:59:00Z"
      spec:
        replicas: 2
      status:
        readyReplicas: 1
"#};

pub const EVENTS: &str = indoc! {r#"
    apiVersion: v1
    items:
    - kind: Event
      type: Warning
      reason: BackOff
      message: Back-off restarting failed container
      count: 4
      lastTimestamp: "2024-05-01T11:05:00Z"
      involvedObject:
        kind: Pod
        name: my-rs-1
    - kind: Event
      type: Normal
      reason: Scheduled
      message: Successfully assigned ns/my-rs-0
      firstTimestamp: "2024-05-01T11:00:01Z"
      involvedObject:
        kind: Pod
        name: my-rs-0
"#};

pub const AGENT_LOG: &str = indoc! {r#"
    2024-05-01T11:01:00Z info agent started
    2024-05-01T11:02:00Z error: connection refused to my-rs-1:27017
    2024-05-01T11:03:00Z panic: runtime error: index out of range
"#};

pub const JUNIT: &str = indoc! {r#"
    <?xml version="1.0" encoding="utf-8"?>
    <testsuites>
      <testsuite name="pytest" tests="3" failures="1" errors="0" skipped="1" time="42.5">
        <testcase classname="tests.test_rs" name="test_create" file="tests/test_rs.py" line="10" time="20.0"/>
        <testcase classname="tests.test_rs" name="test_scale" file="tests/test_rs.py" line="42" time="22.0">
          <failure message="AssertionError: expected 2 ready replicas">assert 1 == 2</failure>
        </testcase>
        <testcase classname="tests.test_rs" name="test_backup" time="0.5">
          <skipped message="not supported"/>
        </testcase>
      </testsuite>
    </testsuites>
"#};

pub fn write_files(dir: &Path, files: &[(&str, &str)]) {
    for (name, body) in files {
        fs::write(dir.join(name), body).unwrap();
    }
}

/// A single-cluster dump for namespace `ns`.
pub fn single_cluster_dump() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_files(
        dir.path(),
        &[
            ("_ns_z_pods.txt", PODS_DUMP),
            ("_ns_z_statefulsets.txt", STATEFULSETS_DUMP),
            ("_ns_events_detailed.yaml", EVENTS),
            ("_ns_my-rs-1-agent-verbose.log", AGENT_LOG),
            ("_ns_my-rs-1-pod-describe.txt", "Name: my-rs-1\nStatus: Pending\n"),
            ("_ns_0_diagnostics.txt", "kubectl get all -n ns\n"),
            ("myreport.xml", JUNIT),
        ],
    );
    dir
}

/// Two clusters, each with one namespace `ns` and one pod.
pub fn multi_cluster_dump() -> TempDir {
    let dir = TempDir::new().unwrap();
    for context in ["central-ctx", "member-1"] {
        write_files(
            dir.path(),
            &[
                (&format!("{context}__ns_z_pods.txt"), SINGLE_POD_DUMP),
                (&format!("{context}__ns_0_diagnostics.txt"), "diag\n"),
                (&format!("{context}__ns_my-rs-0-mongod-container.log"), "ok\n"),
            ],
        );
    }
    write_files(dir.path(), &[("myreport.xml", JUNIT)]);
    dir
}

pub fn fixed_params() -> RunParameters {
    RunParameters {
        task_id: "task_abc".into(),
        execution: 1,
        test_type: "e2e".into(),
        variant: "e2e_static".into(),
        test_name: "e2e_replica_set_scale".into(),
        generated_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        ..RunParameters::default()
    }
}

/// Content of the `<script type="application/json">` block with `id`.
pub fn data_island<'a>(html: &'a str, id: &str) -> &'a str {
    let open = format!(r#"<script id="{id}" type="application/json">"#);
    let start = html.find(&open).unwrap() + open.len();
    let end = start + html[start..].find("</script>").unwrap();
    html[start..end].trim()
}
