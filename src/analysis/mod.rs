//! Derived views over the collected records: timeline, ownership graph,
//! topology and per-pattern error summaries.

pub mod aggregation;
pub mod graph;
pub mod timeline;
pub mod topology;

pub use aggregation::aggregate_patterns;
pub use graph::build_resource_graph;
pub use timeline::build_timeline;
pub use topology::{detect_topology, index_diagnostics};
