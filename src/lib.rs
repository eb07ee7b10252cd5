//! Detects npm dependencies on known-compromised package versions.
//!
//! A list of Indicators of Compromise (package name plus compromised
//! versions) is matched against the manifests and lockfiles of one or more
//! projects. Every hit is classified by how certain it is:
//!
//! - **DIRECT**: `package.json` pins an exact compromised version.
//! - **TRANSITIVE**: a lockfile resolved a compromised version.
//! - **POTENTIAL**: a declared range could resolve to a compromised version.
//!
//! # Example
//!
//! ```
//! use iocscan::ioc::IocTable;
//! use iocscan::matcher::classify;
//! use iocscan::model::{DependencyRecord, Origin, Severity};
//!
//! let table = IocTable::build([("@ctrl/tinycolor", "= 4.1.1 || = 4.1.2")]);
//! let record = DependencyRecord::declared("@ctrl/tinycolor", "^4.1.0", Origin::Dependencies, "package.json");
//!
//! let findings = classify(&record, &table);
//! assert_eq!(findings.len(), 2);
//! assert!(findings.iter().all(|f| f.severity == Severity::Potential));
//! ```

pub mod bulk;
pub mod cache;
pub mod config;
pub mod error;
pub mod ioc;
pub mod matcher;
pub mod model;
pub mod output;
pub mod parser;
pub mod scanner;
pub mod version;

pub use cache::Cache;
pub use config::Config;
pub use error::ScanError;
pub use ioc::IocTable;
pub use model::{DependencyRecord, Finding, ScanResult, Severity};
pub use version::Version;
