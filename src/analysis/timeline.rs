//! Merge Kubernetes events and log errors into one chronological sequence.

use crate::core::{ErrorRecord, K8sEventEntry, LogErrorEntry, TimelineEntry};

/// Events first, then timestamped log errors, stable-sorted by timestamp.
/// Untimestamped log errors are left out; untimestamped events sort first.
pub fn build_timeline(events: Vec<K8sEventEntry>, errors: &[ErrorRecord]) -> Vec<TimelineEntry> {
    let mut timeline: Vec<TimelineEntry> = events.into_iter().map(TimelineEntry::K8sEvent).collect();

    timeline.extend(
        errors
            .iter()
            .filter(|error| error.timestamp.is_some())
            .map(|error| {
                TimelineEntry::LogError(LogErrorEntry {
                    timestamp: error.timestamp.clone(),
                    severity: Some(error.severity),
                    resource: error.source.resource.clone(),
                    message: error.message.clone(),
                    error_id: error.id.clone(),
                })
            }),
    );

    // `sort_by` is stable; equal timestamps keep insertion order.
    timeline.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
    timeline
}
