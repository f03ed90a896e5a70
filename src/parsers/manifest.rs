//! Banner-tolerant parser for `kubectl get -o yaml` dumps.
//!
//! Dump files start with free-form banner text (`----\nPods\n----`) followed
//! by YAML. The payload begins at the first line whose trimmed text starts
//! with `apiVersion:`, `items:` or `kind:`. Both the list form
//! (`items: [...]`) and bare single-resource documents are accepted, as are
//! several `---`-separated documents in one file.

use crate::errors::{Result, SummaryError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;

const PAYLOAD_MARKERS: [&str; 3] = ["apiVersion:", "items:", "kind:"];

/// The YAML payload of a dump, or `None` when no marker line exists.
pub fn strip_banner(content: &str) -> Option<&str> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if PAYLOAD_MARKERS.iter().any(|m| trimmed.starts_with(m)) {
            return Some(&content[offset..]);
        }
        offset += line.len();
    }
    None
}

/// Parse a dump into its resource objects.
///
/// Returns an empty list when the file has no YAML payload or the payload
/// holds no resources. Malformed YAML is an error for the caller to log.
pub fn parse_manifest(file: &str, content: &str) -> Result<Vec<Value>> {
    let Some(payload) = strip_banner(content) else {
        tracing::debug!(file, "No YAML payload marker, treating as raw dump");
        return Ok(Vec::new());
    };

    let mut resources = Vec::new();
    for document in serde_yaml::Deserializer::from_str(payload) {
        let value = Value::deserialize(document).map_err(|e| SummaryError::yaml(file, e))?;
        resources.extend(resources_in(value));
    }
    Ok(resources)
}

/// Flatten one YAML document into resource objects.
fn resources_in(document: Value) -> Vec<Value> {
    let Value::Mapping(mut map) = document else {
        return Vec::new();
    };

    if let Some(items) = map.remove("items") {
        return match items {
            Value::Sequence(items) => items.into_iter().filter(Value::is_mapping).collect(),
            _ => Vec::new(),
        };
    }

    if map.contains_key("kind") || map.contains_key("metadata") {
        return vec![Value::Mapping(map)];
    }

    Vec::new()
}

/// Typed items of one dump, with the items that failed to decode kept apart.
#[derive(Debug)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    pub rejected: Vec<SummaryError>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> Decoded<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Decoded<U> {
        Decoded {
            items: self.items.into_iter().map(f).collect(),
            rejected: self.rejected,
        }
    }
}

/// Decode each resource on its own. A malformed item is rejected and its
/// neighbours are kept.
pub fn decode_each<T: DeserializeOwned>(file: &str, resources: impl IntoIterator<Item = Value>) -> Decoded<T> {
    let mut decoded = Decoded::default();
    for resource in resources {
        match serde_yaml::from_value(resource) {
            Ok(item) => decoded.items.push(item),
            Err(e) => {
                tracing::debug!(file, "Skipping malformed item: {}", e);
                decoded.rejected.push(SummaryError::yaml(file, e));
            }
        }
    }
    decoded
}

/// `kind` of a resource object, if it is a string.
pub fn kind_of(resource: &Value) -> Option<&str> {
    resource.get("kind").and_then(Value::as_str)
}
