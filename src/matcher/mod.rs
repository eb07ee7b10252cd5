//! Three-tier classification of dependency records against the IoC table.
//!
//! | Record | Test | Finding |
//! |--------|------|---------|
//! | resolved version | exact equality | one `TRANSITIVE` at most |
//! | declared exact pin | exact equality | one `DIRECT` at most |
//! | declared range | range satisfaction | one `POTENTIAL` per covered IoC version |
//!
//! Classification is a pure function of the record and the table. A version
//! or range that cannot be parsed never matches.
//!
//! # Example
//!
//! ```
//! use iocscan::ioc::IocTable;
//! use iocscan::matcher::classify;
//! use iocscan::model::{DependencyRecord, Origin, Severity};
//!
//! let table = IocTable::build([("lodash", "= 4.17.19 || = 4.17.20")]);
//! let record = DependencyRecord::declared("lodash", "^4.17.0", Origin::Dependencies, "package.json");
//!
//! let findings = classify(&record, &table);
//! assert_eq!(findings.len(), 2);
//! assert!(findings.iter().all(|f| f.severity == Severity::Potential));
//! ```

mod dedupe;

pub use dedupe::dedupe;

use crate::ioc::IocTable;
use crate::model::{DependencyKind, DependencyRecord, Finding, Severity};
use crate::version::{equal, is_exact, RangeSpecifier, Version};

/// Classifies one record. Returns zero or more findings.
pub fn classify(record: &DependencyRecord, table: &IocTable) -> Vec<Finding> {
    let versions = table.lookup(&record.name);
    if versions.is_empty() {
        return Vec::new();
    }

    match record.kind {
        DependencyKind::Resolved => first_equal(record, versions, Severity::Transitive)
            .into_iter()
            .collect(),
        DependencyKind::Declared if is_exact(&record.version_text) => {
            first_equal(record, versions, Severity::Direct)
                .into_iter()
                .collect()
        }
        DependencyKind::Declared => covered_by_range(record, versions),
    }
}

/// Classifies every record and concatenates the findings, in record order.
pub fn classify_all<'a, I>(records: I, table: &IocTable) -> Vec<Finding>
where
    I: IntoIterator<Item = &'a DependencyRecord>,
{
    records
        .into_iter()
        .flat_map(|record| classify(record, table))
        .collect()
}

fn first_equal(record: &DependencyRecord, versions: &[String], severity: Severity) -> Option<Finding> {
    versions
        .iter()
        .find(|v| equal(&record.version_text, v))
        .map(|v| Finding {
            package_name: record.name.clone(),
            version: v.clone(),
            severity,
            source_location: record.source_location.clone(),
            declared_specifier: None,
        })
}

fn covered_by_range(record: &DependencyRecord, versions: &[String]) -> Vec<Finding> {
    let range = RangeSpecifier::parse(&record.version_text);
    if !range.is_parseable() {
        return Vec::new();
    }

    versions
        .iter()
        .filter(|v| Version::parse(v).is_some_and(|parsed| range.matches(&parsed)))
        .map(|v| Finding {
            package_name: record.name.clone(),
            version: v.clone(),
            severity: Severity::Potential,
            source_location: record.source_location.clone(),
            declared_specifier: Some(record.version_text.clone()),
        })
        .collect()
}
