//! Filename codec for dump artifacts.
//!
//! The dump script encodes the kube context and namespace in every file name:
//!
//! - multi-cluster: `{context}__{namespace}_{rest}`
//! - single-cluster: `_{namespace}_{rest}` or `{namespace}_{rest}`
//!
//! Namespaces never contain underscores, so the first `_` after the namespace
//! terminates it. Every stage resolves cluster/namespace through this module.

use serde::{Deserialize, Serialize};

/// Cluster label used when a file carries no context prefix.
pub const DEFAULT_CLUSTER: &str = "default";

const CONTEXT_SEPARATOR: &str = "__";
const RESOURCE_DUMP_MARKER: &str = "_z_";
const SECRET_SLUG_PREFIX: &str = "secret_";

pub const SECRETS_SLUG: &str = "secrets";
const POD_DESCRIBE_MARKER: &str = "-pod-describe";

/// Cluster and namespace recovered from a file name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub cluster: String,
    pub namespace: String,
}

impl Location {
    pub fn new(cluster: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            namespace: namespace.into(),
        }
    }

    pub fn is_default_cluster(&self) -> bool {
        self.cluster == DEFAULT_CLUSTER
    }

    /// Display label: `cluster/namespace`, or just the namespace for the
    /// default cluster.
    pub fn label(&self) -> String {
        if self.is_default_cluster() {
            self.namespace.clone()
        } else {
            format!("{}/{}", self.cluster, self.namespace)
        }
    }

    /// Canonical prefix the dump script puts in front of per-namespace files.
    pub fn file_prefix(&self) -> String {
        if self.is_default_cluster() {
            format!("_{}_", self.namespace)
        } else {
            format!("{}{CONTEXT_SEPARATOR}{}_", self.cluster, self.namespace)
        }
    }

    /// All prefixes a file of this location may carry. Single-cluster dumps
    /// appear both with and without the leading underscore.
    pub fn file_prefixes(&self) -> Vec<String> {
        let canonical = self.file_prefix();
        if self.is_default_cluster() {
            let bare = format!("{}_", self.namespace);
            vec![canonical, bare]
        } else {
            vec![canonical]
        }
    }
}

/// Decode cluster and namespace from a dump file name. Never fails.
pub fn decode_location(filename: &str) -> Location {
    if let Some((context, rest)) = filename.split_once(CONTEXT_SEPARATOR) {
        let namespace = rest.split_once('_').map_or(rest, |(ns, _)| ns);
        return Location::new(context, namespace);
    }

    let name = filename.strip_prefix('_').unwrap_or(filename);
    match name.split_once('_') {
        Some((namespace, _)) => Location::new(DEFAULT_CLUSTER, namespace),
        None => Location::new(DEFAULT_CLUSTER, DEFAULT_CLUSTER),
    }
}

/// Strip one trailing `.txt` or `.log` extension.
fn strip_dump_extension(name: &str) -> &str {
    name.strip_suffix(".txt")
        .or_else(|| name.strip_suffix(".log"))
        .unwrap_or(name)
}

/// Resource slug of a `_z_` dump file (`pods`, `configmaps`, `secrets`, ...).
///
/// Returns `None` for files without the dump marker and for pod describe
/// output, which belongs to the pod extractor.
pub fn resource_slug(filename: &str) -> Option<String> {
    let (_, right) = filename.split_once(RESOURCE_DUMP_MARKER)?;
    let right = strip_dump_extension(right);
    if right.starts_with(SECRET_SLUG_PREFIX) {
        return Some(SECRETS_SLUG.to_string());
    }
    if right.contains(POD_DESCRIBE_MARKER) {
        return None;
    }
    Some(right.to_string())
}

/// Secret name encoded after `_z_secret_`; falls back to the whole file name.
pub fn secret_name(filename: &str) -> String {
    match filename.split_once("_z_secret_") {
        Some((_, right)) => strip_dump_extension(right).to_string(),
        None => filename.to_string(),
    }
}

/// Whether a file is a secret dump. Secret contents are never read.
pub fn is_secret_dump(filename: &str) -> bool {
    resource_slug(filename).as_deref() == Some(SECRETS_SLUG)
}

/// Whether a file name carries the resource dump marker.
pub fn is_resource_dump(filename: &str) -> bool {
    filename.contains(RESOURCE_DUMP_MARKER)
}

/// Human readable name for a slug: `persistent_volume_claims` becomes
/// `Persistent Volume Claims`, known acronyms are upper-cased.
pub fn slug_display_name(slug: &str) -> String {
    const ACRONYMS: [&str; 3] = ["pvcs", "crds", "olm"];

    slug.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            if ACRONYMS.contains(&lower.as_str()) {
                word.to_uppercase()
            } else {
                capitalize(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
