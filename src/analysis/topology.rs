//! Topology detection and the diagnostics index, both driven by the
//! `*0_diagnostics.txt` files the dump writes once per (cluster, namespace).

use crate::core::{ClusterInfo, ClusterRole, DiagnosticsRef, Topology, TopologyType};
use crate::io::walker::{DumpDirectory, DumpFile};
use crate::naming::decode_location;
use std::collections::BTreeMap;

pub const DIAGNOSTICS_PATTERN: &str = "*0_diagnostics.txt";

fn diagnostics_files(dir: &DumpDirectory) -> Vec<&DumpFile> {
    dir.matching(&[DIAGNOSTICS_PATTERN])
}

/// At most one diagnostics file means a single cluster. With more, every
/// distinct context becomes a cluster entry; contexts containing `central`
/// are the central cluster, all others members.
pub fn detect_topology(dir: &DumpDirectory) -> Topology {
    let files = diagnostics_files(dir);

    if files.len() <= 1 {
        let mut topology = Topology::single_cluster();
        if let Some(file) = files.first() {
            topology.clusters[0].namespaces = vec![decode_location(&file.name).namespace];
        }
        return topology;
    }

    let mut clusters: Vec<ClusterInfo> = Vec::new();
    for file in files {
        let location = decode_location(&file.name);
        match clusters.iter_mut().find(|c| c.context == location.cluster) {
            Some(cluster) => {
                if !cluster.namespaces.contains(&location.namespace) {
                    cluster.namespaces.push(location.namespace);
                }
            }
            None => clusters.push(ClusterInfo {
                role: role_for(&location.cluster),
                context: location.cluster,
                namespaces: vec![location.namespace],
            }),
        }
    }

    Topology {
        kind: TopologyType::MultiCluster,
        clusters,
    }
}

fn role_for(context: &str) -> ClusterRole {
    if context.contains("central") {
        ClusterRole::Central
    } else {
        ClusterRole::Member
    }
}

/// Label (`cluster/ns`, or `ns` for the default cluster) to diagnostics file.
pub fn index_diagnostics(dir: &DumpDirectory) -> BTreeMap<String, DiagnosticsRef> {
    diagnostics_files(dir)
        .into_iter()
        .map(|file| {
            let location = decode_location(&file.name);
            (
                location.label(),
                DiagnosticsRef {
                    file: file.name.clone(),
                    cluster: location.cluster,
                    namespace: location.namespace,
                },
            )
        })
        .collect()
}
