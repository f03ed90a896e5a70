//! Ownership edges between extracted resources.

use crate::core::{Relationship, ResourceGraph, ResourceGraphEdge, ResourceInventory};

/// One `owned_by` edge per Pod and StatefulSet that has an owner. Only the
/// first owner reference is modelled. Deployments keep their `owner_ref`
/// but contribute no edge.
pub fn build_resource_graph(inventory: &ResourceInventory) -> ResourceGraph {
    let pods = inventory
        .pods
        .iter()
        .map(|pod| ("Pod", &pod.id, &pod.owner_ref, &pod.cluster, &pod.namespace));
    let statefulsets = inventory
        .statefulsets
        .iter()
        .map(|sts| ("StatefulSet", &sts.id, &sts.owner_ref, &sts.cluster, &sts.namespace));

    let edges = pods
        .chain(statefulsets)
        .filter_map(|(kind, id, owner, cluster, namespace)| {
            owner.as_ref().map(|owner| ResourceGraphEdge {
                from: format!("{kind}/{id}"),
                to: format!("{owner}/{cluster}/{namespace}"),
                relationship: Relationship::OwnedBy,
            })
        })
        .collect();

    ResourceGraph { edges }
}
