//! Core data types for dependency records, findings, and scan results.
//!
//! - [`DependencyRecord`] - A normalized dependency taken from a manifest or lockfile
//! - [`DependencyKind`] - Whether the record is a declared specifier or a resolved version
//! - [`Origin`] - The manifest section or lockfile dialect a record came from
//! - [`Finding`] - A match against the IoC list
//! - [`Severity`] - DIRECT, TRANSITIVE or POTENTIAL
//! - [`ScanResult`] - Complete results for one project
//!
//! # Example
//!
//! ```
//! use iocscan::model::{DependencyRecord, Origin};
//!
//! let record = DependencyRecord::declared("lodash", "^4.17.0", Origin::Dependencies, "package.json");
//! assert!(record.is_declared());
//! ```

mod dependency;
mod finding;

pub use dependency::*;
pub use finding::*;
