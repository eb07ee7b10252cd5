use crate::error::{Result, ScanError};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Reads one project path per line, ignoring blank lines and `#` comments.
///
/// A path listed more than once is kept at its first position only.
pub fn read_paths_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;

    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !seen.insert(line) {
            warn!(path = %line, "skipping duplicate path");
            continue;
        }
        paths.push(line.to_string());
    }

    if paths.is_empty() {
        return Err(ScanError::EmptyPathsFile(path.to_path_buf()));
    }
    Ok(paths)
}

/// Converts a project path into a file name stem.
///
/// `"/path/to/my project"` becomes `"path-to-my_project"`.
pub fn sanitize_path(path: &str) -> String {
    let sanitized = path.replace(['/', '\\'], "-").replace(' ', "_");
    let sanitized = sanitized.trim_matches('-');
    if sanitized.is_empty() {
        "root".to_string()
    } else {
        sanitized.to_string()
    }
}

/// Hands out sanitized names, suffixing repeats so two paths never share a file.
#[derive(Debug, Default)]
pub(crate) struct FileNames {
    used: HashSet<String>,
}

impl FileNames {
    pub(crate) fn claim(&mut self, path: &str) -> String {
        let base = sanitize_path(path);
        let mut name = base.clone();
        let mut n = 2;
        while !self.used.insert(name.clone()) {
            name = format!("{}-{}", base, n);
            n += 1;
        }
        name
    }
}
