// Export modules for library usage
pub mod analysis;
pub mod artifacts;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod logs;
pub mod naming;
pub mod observability;
pub mod parsers;
pub mod patterns;
pub mod pipeline;
pub mod resources;

// Re-export commonly used types
pub use crate::core::{
    ArtifactCatalog, CollectionWarning, EmbeddedContent, ErrorRecord, Meta, ResourceInventory,
    TestRun, TestSummaryDocument, TimelineEntry, Topology, TopologyType,
};

pub use crate::config::{RenderConfig, SummaryConfig};
pub use crate::errors::{Result, SummaryError};
pub use crate::io::output::{create_writer, OutputFormat, SummaryWriter};
pub use crate::io::writers::render_dashboard;
pub use crate::patterns::{ErrorPatternLibrary, Severity};
pub use crate::pipeline::{GeneratedSummary, RunParameters, SummaryGenerator};
