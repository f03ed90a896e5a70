//! Parsers for the structured inputs of a dump: resource manifests, the
//! JUnit report and Kubernetes Event lists.

pub mod events;
pub mod junit;
pub mod manifest;

pub use events::{load_events, parse_event_file, parse_events, EventsOutcome};
pub use junit::{load_test_run, parse_junit};
pub use manifest::{decode_each, parse_manifest, strip_banner, Decoded};
