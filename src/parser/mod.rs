//! Manifest and lockfile parsers.
//!
//! Each parser turns one file into a flat list of [`DependencyRecord`]s:
//!
//! | File | Parser | Records |
//! |------|--------|---------|
//! | `package.json` | [`manifest`] | declared |
//! | `package-lock.json` (v1, v2, v3) | [`lockfile`] | resolved |
//! | `yarn.lock` (classic, berry) | [`yarn`] | resolved |

pub mod lockfile;
pub mod manifest;
pub mod yarn;

use crate::error::{Result, ScanError};
use crate::model::DependencyRecord;
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE: &str = "package.json";
pub const PACKAGE_LOCK_FILE: &str = "package-lock.json";
pub const YARN_LOCK_FILE: &str = "yarn.lock";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Manifest,
    PackageLock,
    YarnLock,
}

impl FileKind {
    /// Detects the file kind from its file name.
    pub fn detect(path: &Path) -> Option<Self> {
        match path.file_name()?.to_str()? {
            MANIFEST_FILE => Some(FileKind::Manifest),
            PACKAGE_LOCK_FILE => Some(FileKind::PackageLock),
            YARN_LOCK_FILE => Some(FileKind::YarnLock),
            _ => None,
        }
    }

    pub fn is_lockfile(&self) -> bool {
        !matches!(self, FileKind::Manifest)
    }
}

/// Reads and parses `path` according to `kind`.
pub fn parse_file(path: &Path, kind: FileKind) -> Result<Vec<DependencyRecord>> {
    let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
    let source = path.display().to_string();

    match kind {
        FileKind::Manifest => {
            manifest::parse(&content, &source).map_err(|source| ScanError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })
        }
        FileKind::PackageLock => {
            lockfile::parse(&content, &source).map_err(|e| ScanError::LockfileParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
        FileKind::YarnLock => Ok(yarn::parse(&content, &source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect() {
        assert_eq!(FileKind::detect(Path::new("/a/package.json")), Some(FileKind::Manifest));
        assert_eq!(
            FileKind::detect(Path::new("/a/package-lock.json")),
            Some(FileKind::PackageLock)
        );
        assert_eq!(FileKind::detect(Path::new("yarn.lock")), Some(FileKind::YarnLock));
        assert_eq!(FileKind::detect(Path::new("/a/pnpm-lock.yaml")), None);
        assert!(FileKind::YarnLock.is_lockfile());
        assert!(!FileKind::Manifest.is_lockfile());
    }

    #[test]
    fn test_parse_file_errors() {
        let tmp = TempDir::new().unwrap();
        let bad = tmp.path().join("package.json");
        fs::write(&bad, "{ not json").unwrap();

        let err = parse_file(&bad, FileKind::Manifest).unwrap_err();
        assert!(matches!(err, ScanError::ManifestParse { .. }));

        let missing = tmp.path().join("package-lock.json");
        let err = parse_file(&missing, FileKind::PackageLock).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }
}
