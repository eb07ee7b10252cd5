//! `yarn.lock` parser for both classic (v1) and berry (v2+) formats.
//!
//! ```text
//! "@babel/core@^7.0.0", "@babel/core@^7.1.0":
//!   version "7.1.2"
//!
//! "lodash@npm:^4.17.21":
//!   version: 4.17.21
//! ```
//!
//! Each top-level header opens an entry; the first `version` field at the
//! entry's own indentation level closes it.

use crate::model::{DependencyRecord, Origin};
use regex::Regex;
use std::sync::LazyLock;

static VERSION_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^  version:?\s+"?([^"\s]+)"?\s*$"#).expect("valid yarn version pattern")
});

pub fn parse(content: &str, source: &str) -> Vec<DependencyRecord> {
    let mut records = Vec::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        if !line.starts_with(char::is_whitespace) {
            current = line
                .strip_suffix(':')
                .filter(|_| !line.starts_with('#'))
                .and_then(package_name)
                .map(str::to_string);
            continue;
        }

        let Some(name) = current.as_deref() else {
            continue;
        };
        if let Some(caps) = VERSION_LINE_RE.captures(line) {
            records.push(DependencyRecord::resolved(name, &caps[1], Origin::YarnLock, source));
            current = None;
        }
    }

    records
}

/// Extracts the package name from an entry header.
///
/// Only the first comma-separated descriptor is considered. The name ends at
/// the first `@` after position 0, so scoped names keep their leading `@`.
pub fn package_name(header: &str) -> Option<&str> {
    let first = header.split(',').next()?.trim().trim_matches('"');
    if first.starts_with("__metadata") {
        return None;
    }

    let at = first.get(1..)?.find('@')? + 1;
    Some(&first[..at]).filter(|n| !n.is_empty())
}
