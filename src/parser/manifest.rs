//! `package.json` parser.
//!
//! Only versioned sections are read. `bundledDependencies` lists bare names
//! with no specifier and is ignored.

use crate::model::{DependencyRecord, Origin};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    #[serde(default)]
    dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, Value>,
}

pub fn parse(content: &str, source: &str) -> Result<Vec<DependencyRecord>, serde_json::Error> {
    let manifest: Manifest = serde_json::from_str(content)?;

    let sections = [
        (Origin::Dependencies, &manifest.dependencies),
        (Origin::DevDependencies, &manifest.dev_dependencies),
        (Origin::PeerDependencies, &manifest.peer_dependencies),
        (Origin::OptionalDependencies, &manifest.optional_dependencies),
    ];

    let mut records = Vec::new();
    for (origin, deps) in sections {
        for (name, spec) in deps {
            let spec = match spec.as_str().map(str::trim) {
                Some(s) if !s.is_empty() && !name.is_empty() => s,
                _ => {
                    debug!(source, name = %name, section = %origin, "skipping dependency without a version");
                    continue;
                }
            };
            records.push(DependencyRecord::declared(name, spec, origin, source));
        }
    }

    Ok(records)
}
