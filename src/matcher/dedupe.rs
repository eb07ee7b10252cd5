use crate::model::{Finding, Severity};
use std::collections::HashSet;

/// Drops findings whose `(package, version, severity)` was already seen.
///
/// Stable: survivors keep their relative order, and on a collision the first
/// finding's location and declared specifier win.
pub fn dedupe(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen: HashSet<(String, String, Severity)> = HashSet::new();

    findings
        .into_iter()
        .filter(|f| {
            let (name, version, severity) = f.key();
            seen.insert((name.to_string(), version.to_string(), severity))
        })
        .collect()
}
