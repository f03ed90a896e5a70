//! Slug-keyed fallback extraction for every `_z_` dump.

use super::model::GenericManifest;
use crate::core::{GenericResource, SourceFile};
use crate::errors::Result;
use crate::io::walker::DumpFile;
use crate::naming::{decode_location, secret_name};
pub use crate::naming::SECRETS_SLUG;
use crate::parsers::manifest::{decode_each, parse_manifest, Decoded};

/// Items of one dump. Secrets are named from the file name and their
/// content is never read.
pub fn extract_generic(slug: &str, file: &DumpFile) -> Result<Decoded<GenericResource>> {
    let location = decode_location(&file.name);

    if slug == SECRETS_SLUG {
        return Ok(Decoded {
            items: vec![GenericResource {
                name: secret_name(&file.name),
                namespace: location.namespace,
                cluster: location.cluster,
                kind: "Secret".to_string(),
                api_version: String::new(),
                created: String::new(),
                source_file: file.name.clone(),
            }],
            rejected: Vec::new(),
        });
    }

    let content = file.read_to_string()?;
    let resources = parse_manifest(&file.name, &content)?;
    let decoded: Decoded<GenericManifest> = decode_each(&file.name, resources);
    Ok(decoded.map(|manifest| GenericResource {
        name: manifest.metadata.name_or_unknown(),
        namespace: manifest
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| location.namespace.clone()),
        cluster: location.cluster.clone(),
        kind: manifest.kind.unwrap_or_default(),
        api_version: manifest.api_version.unwrap_or_default(),
        created: manifest.metadata.created(),
        source_file: file.name.clone(),
    }))
}

pub fn source_file(file: &DumpFile) -> SourceFile {
    let location = decode_location(&file.name);
    SourceFile {
        name: file.name.clone(),
        cluster: location.cluster,
        namespace: location.namespace,
    }
}
