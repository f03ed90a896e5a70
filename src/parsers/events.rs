//! Kubernetes Event parsing from `*events_detailed.yaml` dumps.
//!
//! The `*events.txt` companions only carry relative ages ("14m") and are
//! never read here.

use crate::core::{CollectionWarning, K8sEventEntry};
use crate::errors::Result;
use crate::io::walker::{map_files, DumpDirectory, DumpFile};
use crate::naming::decode_location;
use crate::parsers::manifest::{decode_each, kind_of, parse_manifest, Decoded};
use crate::patterns::Severity;
use serde::Deserialize;

pub const EVENT_FILE_PATTERN: &str = "*events_detailed.yaml";

const STAGE: &str = "events";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EventManifest {
    #[serde(rename = "type")]
    event_type: Option<String>,
    reason: Option<String>,
    message: Option<String>,
    count: Option<u32>,
    last_timestamp: Option<String>,
    first_timestamp: Option<String>,
    event_time: Option<String>,
    involved_object: InvolvedObject,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InvolvedObject {
    kind: Option<String>,
    name: Option<String>,
}

/// Parse one structured event dump into timeline entries.
pub fn parse_event_file(file: &DumpFile) -> Result<Decoded<K8sEventEntry>> {
    let content = file.read_to_string()?;
    parse_events(&file.name, &content)
}

/// Events that fail to decode are rejected one by one.
pub fn parse_events(file: &str, content: &str) -> Result<Decoded<K8sEventEntry>> {
    let location = decode_location(file);
    let resources = parse_manifest(file, content)?
        .into_iter()
        .filter(|resource| kind_of(resource) == Some("Event"));
    let decoded: Decoded<EventManifest> = decode_each(file, resources);

    Ok(decoded.map(|event| {
        let event_type = event.event_type.unwrap_or_else(|| "Normal".to_string());
        let resource = match (event.involved_object.kind, event.involved_object.name) {
            (Some(kind), name) if !kind.is_empty() => {
                format!("{}/{}", kind, name.unwrap_or_default())
            }
            _ => "unknown".to_string(),
        };

        K8sEventEntry {
            timestamp: event
                .last_timestamp
                .or(event.first_timestamp)
                .or(event.event_time),
            severity: (event_type == "Warning").then_some(Severity::Warning),
            resource,
            message: event.message.unwrap_or_default(),
            reason: event.reason.unwrap_or_default(),
            count: event.count.unwrap_or(1),
            event_type,
            cluster: location.cluster.clone(),
            namespace: location.namespace.clone(),
        }
    }))
}

#[derive(Debug, Default)]
pub struct EventsOutcome {
    pub events: Vec<K8sEventEntry>,
    pub warnings: Vec<CollectionWarning>,
}

/// Parse every structured event dump of the directory, in name order.
pub fn load_events(dir: &DumpDirectory, parallel: bool) -> EventsOutcome {
    let files = dir.matching(&[EVENT_FILE_PATTERN]);
    let mut outcome = EventsOutcome::default();

    for (file, result) in map_files(&files, parallel, parse_event_file) {
        match result {
            Ok(decoded) => {
                for err in decoded.rejected {
                    tracing::warn!("Skipped an event in {}: {}", file.name, err);
                    outcome.warnings.push(CollectionWarning::new(
                        STAGE,
                        Some(&file.name),
                        format!("skipped item: {err}"),
                    ));
                }
                outcome.events.extend(decoded.items);
            }
            Err(err) => {
                tracing::warn!("Failed to parse events from {}: {}", file.name, err);
                outcome
                    .warnings
                    .push(CollectionWarning::new(STAGE, Some(&file.name), err.to_string()));
            }
        }
    }

    tracing::debug!(files = files.len(), events = outcome.events.len(), "Events parsed");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const EVENTS: &str = indoc! {r#"
        apiVersion: v1
        items:
        - apiVersion: v1
          kind: Event
          type: Warning
          reason: BackOff
          message: Back-off restarting failed container
          count: 7
          firstTimestamp: "2024-05-01T10:00:00Z"
          lastTimestamp: "2024-05-01T10:05:00Z"
          involvedObject:
            kind: Pod
            name: my-rs-0
        - apiVersion: v1
          kind: Event
          reason: Scheduled
          message: Successfully assigned
          firstTimestamp: "2024-05-01T09:59:00Z"
          lastTimestamp: null
          involvedObject:
            kind: Pod
            name: my-rs-0
        - apiVersion: v1
          kind: Event
          type: Normal
          reason: Leader
          eventTime: "2024-05-01T09:58:00.123456Z"
          involvedObject: {}
        - apiVersion: v1
          kind: ConfigMap
          metadata:
            name: not-an-event
        kind: List
    "#};

    #[test]
    fn test_event_fields() {
        let events = parse_events("member-1__ns_events_detailed.yaml", EVENTS).unwrap().items;
        assert_eq!(events.len(), 3);

        let backoff = &events[0];
        assert_eq!(backoff.timestamp.as_deref(), Some("2024-05-01T10:05:00Z"));
        assert_eq!(backoff.severity, Some(Severity::Warning));
        assert_eq!(backoff.resource, "Pod/my-rs-0");
        assert_eq!(backoff.count, 7);
        assert_eq!(backoff.cluster, "member-1");
        assert_eq!(backoff.namespace, "ns");
    }

    #[test]
    fn test_defaults_and_fallbacks() {
        let events = parse_events("_ns_events_detailed.yaml", EVENTS).unwrap().items;

        let scheduled = &events[1];
        assert_eq!(scheduled.timestamp.as_deref(), Some("2024-05-01T09:59:00Z"));
        assert_eq!(scheduled.event_type, "Normal");
        assert_eq!(scheduled.severity, None);
        assert_eq!(scheduled.count, 1);

        let leader = &events[2];
        assert_eq!(leader.timestamp.as_deref(), Some("2024-05-01T09:58:00.123456Z"));
        assert_eq!(leader.resource, "unknown");
        assert_eq!(leader.cluster, "default");
    }

    #[test]
    fn test_empty_event_list() {
        let events = parse_events("_ns_events_detailed.yaml", "apiVersion: v1\nitems: []\n").unwrap().items;
        assert!(events.is_empty());
    }

    #[test]
    fn test_malformed_event_is_skipped_alone() {
        let content = indoc! {r#"
            items:
            - kind: Event
              reason: BackOff
              count: often
            - kind: Event
              type: Warning
              reason: FailedMount
              lastTimestamp: "2024-05-01T10:05:00Z"
            kind: List
        "#};
        let decoded = parse_events("_ns_events_detailed.yaml", content).unwrap();
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].reason, "FailedMount");
        assert_eq!(decoded.rejected.len(), 1);
    }

    #[test]
    fn test_non_warning_severity_serializes_empty() {
        let events = parse_events("_ns_events_detailed.yaml", EVENTS).unwrap().items;
        let json = serde_json::to_value(&events[1]).unwrap();
        assert_eq!(json["severity"], "");
        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["severity"], "warning");

        let back: K8sEventEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, events[0]);
    }

    #[test]
    fn test_malformed_file_becomes_warning() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("c1__ns_events_detailed.yaml"), EVENTS).unwrap();
        std::fs::write(
            dir.path().join("c2__ns_events_detailed.yaml"),
            "apiVersion: v1\nitems: [unclosed\n",
        )
        .unwrap();
        let snapshot = DumpDirectory::scan(dir.path()).unwrap();

        let outcome = load_events(&snapshot, true);
        assert_eq!(outcome.events.len(), 3);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].stage, "events");
        assert_eq!(
            outcome.warnings[0].file.as_deref(),
            Some("c2__ns_events_detailed.yaml")
        );
    }
}
