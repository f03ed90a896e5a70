//! Artifact catalog and inline content for the dashboard viewer.

pub mod catalog;
pub mod embed;

pub use catalog::{build_catalog, classify_file, format_size};
pub use embed::{embed_files, EmbedOutcome, EmbedPolicy};
