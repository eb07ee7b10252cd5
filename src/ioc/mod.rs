//! Indicator-of-Compromise table.
//!
//! Maps a package name to the compromised versions listed for it. The table is
//! built once per scan and only read afterwards, so it can be shared across
//! threads behind an `Arc` without locking.
//!
//! A version cell may hold several versions joined by `||`, each with an
//! optional `=` prefix:
//!
//! ```
//! use iocscan::ioc::IocTable;
//!
//! let table = IocTable::build([
//!     ("@ctrl/tinycolor", "= 4.1.1 || = 4.1.2"),
//!     ("@ctrl/tinycolor", "= 4.1.3"),
//! ]);
//!
//! assert_eq!(table.lookup("@ctrl/tinycolor"), ["4.1.1", "4.1.2", "4.1.3"]);
//! assert_eq!(table.count(), 1);
//! assert_eq!(table.size(), 3);
//! ```

pub mod feed;
pub mod fetch;

pub use fetch::{load_table, provider_for, FileProvider, HttpProvider, IocProvider};

use std::collections::HashMap;

/// Separator between alternative versions inside one cell.
const VERSION_SEPARATOR: &str = "||";

#[derive(Debug, Clone, Default)]
pub struct IocTable {
    versions: HashMap<String, Vec<String>>,
    /// Package names in first-seen order.
    names: Vec<String>,
}

impl IocTable {
    /// Builds a table from `(package name, version cell)` rows.
    ///
    /// Rows whose name or version list is empty after trimming are dropped.
    /// Repeated names accumulate their versions in row order.
    pub fn build<I, N, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut table = IocTable::default();

        for (name, cell) in rows {
            let name = name.as_ref().trim();
            let versions = split_versions(cell.as_ref());
            if name.is_empty() || versions.is_empty() {
                continue;
            }

            match table.versions.get_mut(name) {
                Some(existing) => existing.extend(versions),
                None => {
                    table.names.push(name.to_string());
                    table.versions.insert(name.to_string(), versions);
                }
            }
        }

        table
    }

    /// Parses IoC CSV text and builds a table from it.
    ///
    /// Malformed rows are skipped with a warning; this never fails.
    pub fn from_csv(text: &str) -> Self {
        Self::build(feed::parse_rows(text))
    }

    /// Compromised versions for `name`, or an empty slice. Case-sensitive.
    pub fn lookup(&self, name: &str) -> &[String] {
        self.versions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct package names.
    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// Total number of package/version entries.
    pub fn size(&self) -> usize {
        self.versions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Package names in the order they first appeared.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Splits a version cell such as `"= 1.0.0 || = 1.0.1"` into bare versions.
pub fn split_versions(cell: &str) -> Vec<String> {
    cell.split(VERSION_SEPARATOR)
        .map(|token| {
            let token = token.trim();
            token.strip_prefix('=').unwrap_or(token).trim().to_string()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_repeated_names() {
        let table = IocTable::build([("pkg", "= 1.0.0"), ("pkg", "= 1.0.1")]);
        assert_eq!(table.lookup("pkg"), ["1.0.0", "1.0.1"]);
        assert_eq!(table.count(), 1);
        assert_eq!(table.size(), 2);
    }

    #[test]
    fn test_multi_version_cell() {
        let table = IocTable::build([("a", "= 1.0.0 || = 1.0.1||=2.0.0"), ("b", "3.0.0")]);
        assert_eq!(table.lookup("a"), ["1.0.0", "1.0.1", "2.0.0"]);
        assert_eq!(table.lookup("b"), ["3.0.0"]);
        assert_eq!(table.count(), 2);
        assert_eq!(table.size(), 4);
    }

    #[test]
    fn test_drops_empty_rows() {
        let table = IocTable::build([("", "= 1.0.0"), ("pkg", ""), ("pkg", " = || ")]);
        assert!(table.is_empty());
        assert_eq!(table.size(), 0);
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let table = IocTable::build([("@scope/pkg", "= 1.0.0")]);
        assert_eq!(table.lookup("@scope/pkg"), ["1.0.0"]);
        assert!(table.lookup("@Scope/pkg").is_empty());
        assert!(table.lookup("scope/pkg").is_empty());
        assert!(table.lookup("missing").is_empty());
    }

    #[test]
    fn test_packages_in_insertion_order() {
        let table = IocTable::build([("z", "1.0.0"), ("a", "1.0.0"), ("z", "2.0.0")]);
        assert_eq!(table.packages().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn test_split_versions() {
        assert_eq!(split_versions("= 0.0.7"), vec!["0.0.7"]);
        assert_eq!(split_versions("  = 3.24.1"), vec!["3.24.1"]);
        assert_eq!(split_versions("1.0.0-alpha"), vec!["1.0.0-alpha"]);
        assert!(split_versions("").is_empty());
    }
}
