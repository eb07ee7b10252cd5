use crate::parser::FileKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

const SKIPPED_DIR: &str = "node_modules";

/// Finds manifests and lockfiles under `root`, sorted by path.
///
/// `node_modules` is never entered. With `lockfile_only`, manifests are left out.
pub fn discover(root: &Path, lockfile_only: bool) -> Vec<(PathBuf, FileKind)> {
    let mut files: Vec<(PathBuf, FileKind)> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| FileKind::detect(e.path()).map(|kind| (e.into_path(), kind)))
        .filter(|(_, kind)| !lockfile_only || kind.is_lockfile())
        .collect();

    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == SKIPPED_DIR
}
