//! Bulk scanning of many projects.
//!
//! A paths file lists one project per line. All projects are scanned against
//! a single shared [`IocTable`] by a bounded pool of workers, and each outcome
//! is written to a timestamped results directory:
//!
//! ```text
//! results/20251126-141503/
//! ├── srv-app.json          # ScanResult for /srv/app
//! ├── srv-missing.error.txt # error message for a failed path
//! └── summary.json          # BulkSummary
//! ```
//!
//! Cancelling the token stops new scans from starting. Scans already running
//! finish and are recorded.

mod paths;

pub use paths::{read_paths_file, sanitize_path};

use crate::error::{Result, ScanError};
use crate::ioc::IocTable;
use crate::model::ScanResult;
use crate::scanner::{scan_project, ScanOptions};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use paths::FileNames;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone)]
pub struct BulkOptions {
    pub paths_file: PathBuf,
    /// Base directory; each run writes into a timestamped subdirectory.
    pub output_dir: PathBuf,
    pub workers: usize,
    pub scan: ScanOptions,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSummary {
    pub path: String,
    pub status: PathStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub manifests_scanned: usize,
    pub lockfiles_scanned: usize,
    pub packages_checked: usize,
    pub findings: usize,
    /// The `.json` or `.error.txt` file written for this path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: String,
    pub total_paths: usize,
    pub successful_scans: usize,
    pub failed_scans: usize,
    pub total_findings: usize,
    pub cancelled: bool,
    pub path_results: BTreeMap<String, PathSummary>,
}

/// Where a bulk run wrote its results, and what it found.
#[derive(Debug)]
pub struct BulkReport {
    pub results_dir: PathBuf,
    pub summary: BulkSummary,
}

/// Scans every path listed in `options.paths_file` against `table`.
///
/// Per-path failures are recorded in the summary and never abort the run.
/// Errors are returned only for an unreadable or empty paths file and for
/// failures writing the results directory.
pub async fn run_bulk(
    options: &BulkOptions,
    table: Arc<IocTable>,
    cancel: CancellationToken,
) -> Result<BulkReport> {
    let start_time = Utc::now();
    let paths = read_paths_file(&options.paths_file)?;
    let workers = options.workers.max(1);

    let results_dir = options
        .output_dir
        .join(start_time.format("%Y%m%d-%H%M%S").to_string());
    fs::create_dir_all(&results_dir).map_err(|e| ScanError::io(&results_dir, e))?;

    info!(
        paths = paths.len(),
        workers,
        results = %results_dir.display(),
        "starting bulk scan"
    );

    let progress = progress_bar(paths.len(), options.show_progress);

    let mut jobs = stream::iter(paths.iter().cloned())
        .map(|path| {
            let table = Arc::clone(&table);
            let scan_options = options.scan.clone();
            let cancel = cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    debug!(path = %path, "skipping path after cancellation");
                    return None;
                }
                let root = PathBuf::from(&path);
                let outcome = tokio::task::spawn_blocking(move || {
                    scan_project(&root, &table, &scan_options, None)
                })
                .await
                .unwrap_or_else(|e| Err(ScanError::Worker(e.to_string())));
                Some((path, outcome))
            }
        })
        .buffer_unordered(workers);

    let mut names = FileNames::default();
    let mut path_results = BTreeMap::new();
    let mut successful_scans = 0;
    let mut failed_scans = 0;
    let mut total_findings = 0;

    while let Some(job) = jobs.next().await {
        let Some((path, outcome)) = job else {
            continue;
        };

        let file_stem = names.claim(&path);
        let summary = write_outcome(&results_dir, &file_stem, &path, outcome)?;
        match summary.status {
            PathStatus::Success => {
                successful_scans += 1;
                total_findings += summary.findings;
            }
            PathStatus::Error => failed_scans += 1,
        }

        progress.set_message(path.clone());
        progress.inc(1);
        path_results.insert(path, summary);
    }

    let cancelled = cancel.is_cancelled();
    if cancelled {
        progress.abandon_with_message("cancelled");
        warn!(
            completed = path_results.len(),
            total = paths.len(),
            "bulk scan cancelled"
        );
    } else {
        progress.finish_and_clear();
    }

    let end_time = Utc::now();
    let summary = BulkSummary {
        start_time,
        end_time,
        duration: format_duration(end_time - start_time),
        total_paths: paths.len(),
        successful_scans,
        failed_scans,
        total_findings,
        cancelled,
        path_results,
    };

    let summary_path = results_dir.join(SUMMARY_FILE);
    write_json(&summary_path, &summary)?;
    info!(
        successful = summary.successful_scans,
        failed = summary.failed_scans,
        findings = summary.total_findings,
        "bulk scan complete"
    );

    Ok(BulkReport {
        results_dir,
        summary,
    })
}

fn write_outcome(
    results_dir: &Path,
    file_stem: &str,
    path: &str,
    outcome: Result<ScanResult>,
) -> Result<PathSummary> {
    match outcome {
        Ok(result) => {
            let file = results_dir.join(format!("{}.json", file_stem));
            write_json(&file, &result)?;
            Ok(PathSummary {
                path: path.to_string(),
                status: PathStatus::Success,
                error: None,
                manifests_scanned: result.manifests_scanned,
                lockfiles_scanned: result.lockfiles_scanned,
                packages_checked: result.packages_checked,
                findings: result.findings.len(),
                result_file: Some(file.display().to_string()),
            })
        }
        Err(e) => {
            warn!(path, error = %e, "scan failed");
            let message = e.to_string();
            let file = results_dir.join(format!("{}.error.txt", file_stem));
            fs::write(&file, &message).map_err(|e| ScanError::io(&file, e))?;
            Ok(PathSummary {
                path: path.to_string(),
                status: PathStatus::Error,
                error: Some(message),
                manifests_scanned: 0,
                lockfiles_scanned: 0,
                packages_checked: 0,
                findings: 0,
                result_file: Some(file.display().to_string()),
            })
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ScanError::io(path, e.into()))?;
    fs::write(path, json).map_err(|e| ScanError::io(path, e))
}

fn format_duration(duration: chrono::TimeDelta) -> String {
    let millis = duration.num_milliseconds().max(0);
    format!("{}.{:03}s", millis / 1000, millis % 1000)
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table() -> Arc<IocTable> {
        Arc::new(IocTable::build([("lodash", "= 4.17.20"), ("debug", "= 4.4.2")]))
    }

    fn make_project(dir: &Path, lock_version: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("package-lock.json"),
            format!(
                r#"{{ "lockfileVersion": 3, "packages": {{ "node_modules/lodash": {{ "version": "{}" }} }} }}"#,
                lock_version
            ),
        )
        .unwrap();
    }

    fn options(tmp: &TempDir, paths: &[String]) -> BulkOptions {
        let paths_file = tmp.path().join("paths.txt");
        fs::write(&paths_file, paths.join("\n")).unwrap();
        BulkOptions {
            paths_file,
            output_dir: tmp.path().join("results"),
            workers: 2,
            scan: ScanOptions::default(),
            show_progress: false,
        }
    }

    #[tokio::test]
    async fn test_run_bulk_writes_results_and_summary() {
        let tmp = TempDir::new().unwrap();
        let infected = tmp.path().join("infected");
        let clean = tmp.path().join("clean");
        make_project(&infected, "4.17.20");
        make_project(&clean, "4.17.21");
        let missing = tmp.path().join("missing");

        let paths: Vec<String> = [&infected, &clean, &missing]
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let opts = options(&tmp, &paths);

        let report = run_bulk(&opts, table(), CancellationToken::new())
            .await
            .unwrap();
        let summary = &report.summary;

        assert_eq!(summary.total_paths, 3);
        assert_eq!(summary.successful_scans, 2);
        assert_eq!(summary.failed_scans, 1);
        assert_eq!(summary.total_findings, 1);
        assert!(!summary.cancelled);

        let failed = &summary.path_results[&paths[2]];
        assert_eq!(failed.status, PathStatus::Error);
        assert!(failed.error.as_deref().unwrap().contains("does not exist"));

        let infected_file = report
            .results_dir
            .join(format!("{}.json", sanitize_path(&paths[0])));
        let saved: ScanResult =
            serde_json::from_str(&fs::read_to_string(infected_file).unwrap()).unwrap();
        assert_eq!(saved.findings.len(), 1);

        assert!(report
            .results_dir
            .join(format!("{}.error.txt", sanitize_path(&paths[2])))
            .exists());

        let written: BulkSummary = serde_json::from_str(
            &fs::read_to_string(report.results_dir.join(SUMMARY_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(written.successful_scans, 2);
        assert_eq!(written.path_results.len(), 3);
    }

    #[tokio::test]
    async fn test_repeated_path_is_scanned_once() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("app");
        make_project(&project, "4.17.20");
        let path = project.display().to_string();
        let opts = options(&tmp, &[path.clone(), path.clone()]);

        let report = run_bulk(&opts, table(), CancellationToken::new())
            .await
            .unwrap();
        let summary = &report.summary;

        assert_eq!(summary.total_paths, 1);
        assert_eq!(summary.successful_scans, 1);
        assert_eq!(summary.total_findings, 1);
        assert_eq!(summary.path_results.len(), summary.total_paths);
        assert!(!report
            .results_dir
            .join(format!("{}-2.json", sanitize_path(&path)))
            .exists());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_nothing() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("app");
        make_project(&project, "4.17.20");
        let opts = options(&tmp, &[project.display().to_string()]);

        let token = CancellationToken::new();
        token.cancel();

        let report = run_bulk(&opts, table(), token).await.unwrap();
        assert!(report.summary.cancelled);
        assert_eq!(report.summary.total_paths, 1);
        assert!(report.summary.path_results.is_empty());
        assert!(report.results_dir.join(SUMMARY_FILE).exists());
    }

    #[tokio::test]
    async fn test_empty_paths_file() {
        let tmp = TempDir::new().unwrap();
        let opts = options(&tmp, &["# nothing".to_string()]);

        let err = run_bulk(&opts, table(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::EmptyPathsFile(_)));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::TimeDelta::milliseconds(1234)), "1.234s");
        assert_eq!(format_duration(chrono::TimeDelta::milliseconds(5)), "0.005s");
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let now = Utc::now();
        let summary = BulkSummary {
            start_time: now,
            end_time: now,
            duration: "0.000s".to_string(),
            total_paths: 0,
            successful_scans: 0,
            failed_scans: 0,
            total_findings: 0,
            cancelled: false,
            path_results: BTreeMap::new(),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("successfulScans").is_some());
        assert!(value.get("pathResults").is_some());
    }
}
