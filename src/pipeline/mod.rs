//! Generation pipeline: named stages sequenced by the orchestrator.

pub mod orchestrator;
pub mod stage;

pub use orchestrator::{GeneratedSummary, RunParameters, SummaryGenerator};
pub use stage::{run_isolated, FallibleStage, PureStage, Stage};
