//! Group classified log errors by pattern.

use crate::core::{ErrorPatternSummary, ErrorRecord};
use crate::patterns::ErrorPatternLibrary;
use std::collections::{BTreeSet, HashMap};

pub const MAX_SAMPLE_IDS: usize = 10;

/// Summaries sorted by count descending. Equal counts keep the order in
/// which their pattern was first seen.
pub fn aggregate_patterns(errors: &[ErrorRecord], library: &ErrorPatternLibrary) -> Vec<ErrorPatternSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&ErrorRecord>> = HashMap::new();

    for error in errors {
        groups
            .entry(error.pattern.as_str())
            .or_insert_with(|| {
                order.push(error.pattern.as_str());
                Vec::new()
            })
            .push(error);
    }

    let mut summaries: Vec<ErrorPatternSummary> = order
        .into_iter()
        .filter_map(|name| groups.remove(name).map(|group| summarize(name, group, library)))
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries
}

fn summarize(name: &str, records: Vec<&ErrorRecord>, library: &ErrorPatternLibrary) -> ErrorPatternSummary {
    let affected: BTreeSet<&str> = records.iter().map(|r| r.source.resource.as_str()).collect();
    let timestamps = records.iter().filter_map(|r| r.timestamp.as_deref());
    let first = timestamps.clone().min().map(str::to_string);
    let last = timestamps.max().map(str::to_string);

    let pattern = library.get(name);
    ErrorPatternSummary {
        pattern: name.to_string(),
        count: records.len(),
        description: pattern
            .map(|p| p.description.clone())
            .unwrap_or_else(|| "Unknown pattern".to_string()),
        // Records carry their pattern's severity already.
        severity: records[0].severity,
        affected_resources: affected.into_iter().map(str::to_string).collect(),
        error_ids: records
            .iter()
            .take(MAX_SAMPLE_IDS)
            .map(|r| r.id.clone())
            .collect(),
        first_occurrence: first,
        last_occurrence: last,
    }
}
