//! `package-lock.json` parser.
//!
//! npm 7+ (lockfile v2/v3) writes a flat `packages` map keyed by install path:
//!
//! ```json
//! { "packages": { "": {}, "node_modules/@scope/a/node_modules/b": { "version": "1.0.0" } } }
//! ```
//!
//! npm 5/6 (lockfile v1) writes a nested `dependencies` tree instead. When
//! both are present the flat map wins.

use crate::model::{DependencyRecord, Origin};
use serde::Deserialize;
use std::collections::BTreeMap;

const NODE_MODULES: &str = "node_modules/";

#[derive(Debug, Deserialize)]
struct PackageLock {
    #[serde(default)]
    packages: BTreeMap<String, FlatEntry>,
    #[serde(default)]
    dependencies: BTreeMap<String, LegacyEntry>,
}

#[derive(Debug, Deserialize)]
struct FlatEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyEntry {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, LegacyEntry>,
}

pub fn parse(content: &str, source: &str) -> Result<Vec<DependencyRecord>, serde_json::Error> {
    let lock: PackageLock = serde_json::from_str(content)?;

    let mut records = Vec::new();
    if !lock.packages.is_empty() {
        for (path, entry) in &lock.packages {
            let Some(version) = entry.version.as_deref().filter(|v| !v.is_empty()) else {
                continue;
            };
            let Some(name) = package_name(path, entry) else {
                continue;
            };
            records.push(DependencyRecord::resolved(name, version, Origin::PackageLock, source));
        }
    } else {
        flatten_legacy(&lock.dependencies, source, &mut records);
    }

    Ok(records)
}

/// Package name for a flat entry: the segment after the last `node_modules/`.
///
/// The root entry (`""`) has no name. Workspace entries outside
/// `node_modules` fall back to their `name` field.
fn package_name<'a>(path: &'a str, entry: &'a FlatEntry) -> Option<&'a str> {
    if path.is_empty() || path == "." {
        return None;
    }
    match path.rfind(NODE_MODULES) {
        Some(idx) => Some(&path[idx + NODE_MODULES.len()..]).filter(|n| !n.is_empty()),
        None => entry.name.as_deref().filter(|n| !n.is_empty()),
    }
}

fn flatten_legacy(
    deps: &BTreeMap<String, LegacyEntry>,
    source: &str,
    out: &mut Vec<DependencyRecord>,
) {
    for (name, entry) in deps {
        if let Some(version) = entry.version.as_deref().filter(|v| !v.is_empty()) {
            out.push(DependencyRecord::resolved(
                name,
                version,
                Origin::PackageLockLegacy,
                source,
            ));
        }
        flatten_legacy(&entry.dependencies, source, out);
    }
}
