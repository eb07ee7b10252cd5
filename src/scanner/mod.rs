//! Per-project scanning.
//!
//! A scan walks one project tree, parses every manifest and lockfile it finds,
//! and classifies the resulting dependency records against an [`IocTable`].
//!
//! # Example
//!
//! ```no_run
//! use iocscan::ioc::IocTable;
//! use iocscan::scanner::{scan_project, ScanOptions};
//! use std::path::Path;
//!
//! let table = IocTable::build([("@ctrl/tinycolor", "= 4.1.1")]);
//! let result = scan_project(Path::new("."), &table, &ScanOptions::default(), None)?;
//! for finding in &result.findings {
//!     println!("{} {} {}", finding.severity, finding.package_name, finding.version);
//! }
//! # Ok::<(), iocscan::ScanError>(())
//! ```

mod discover;

pub use discover::discover;

use crate::cache::Cache;
use crate::config::{Config, IgnoreConfig};
use crate::error::{Result, ScanError};
use crate::ioc::{self, IocTable};
use crate::matcher::{classify_all, dedupe};
use crate::model::{Finding, ScanResult};
use crate::parser;
use chrono::Utc;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Skip `package.json` manifests and read lockfiles only.
    pub lockfile_only: bool,
    pub ignore: IgnoreConfig,
}

impl ScanOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            lockfile_only: config.lockfile_only,
            ignore: config.ignore.clone(),
        }
    }
}

/// Scans the project rooted at `root` against `table`.
///
/// Files that fail to parse are logged and skipped. If `cancel` fires, the
/// scan stops before the next file and returns [`ScanError::Cancelled`].
pub fn scan_project(
    root: &Path,
    table: &IocTable,
    options: &ScanOptions,
    cancel: Option<&CancellationToken>,
) -> Result<ScanResult> {
    if !root.exists() {
        return Err(ScanError::PathNotFound(root.to_path_buf()));
    }

    let files = discover(root, options.lockfile_only);
    info!(root = %root.display(), files = files.len(), "scanning project");

    let mut records = Vec::new();
    let mut manifests_scanned = 0;
    let mut lockfiles_scanned = 0;

    for (path, kind) in &files {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(ScanError::Cancelled);
        }

        match parser::parse_file(path, *kind) {
            Ok(parsed) => {
                debug!(path = %path.display(), records = parsed.len(), "parsed");
                if kind.is_lockfile() {
                    lockfiles_scanned += 1;
                } else {
                    manifests_scanned += 1;
                }
                records.extend(parsed);
            }
            Err(e) => warn!(error = %e, "skipping file"),
        }
    }

    let mut findings: Vec<Finding> = dedupe(classify_all(&records, table));
    if !options.ignore.is_empty() {
        let before = findings.len();
        findings.retain(|f| !options.ignore.should_ignore_package(&f.package_name));
        debug!(ignored = before - findings.len(), "applied ignore list");
    }

    Ok(ScanResult {
        manifests_scanned,
        lockfiles_scanned,
        packages_checked: records.len(),
        findings,
        timestamp: Utc::now(),
        ioc_packages: table.count(),
        ioc_entries: table.size(),
    })
}

/// Loads the IoC table from `source` and scans `root` with it.
pub async fn run_scan(
    root: &Path,
    source: &str,
    options: &ScanOptions,
    cache: Option<Cache>,
) -> Result<ScanResult> {
    if !root.exists() {
        return Err(ScanError::PathNotFound(root.to_path_buf()));
    }

    let table = ioc::load_table(source, cache).await?;
    scan_project(root, &table, options, None)
}
