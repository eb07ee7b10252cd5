//! File-based cache for downloaded IoC feeds.
//!
//! Entries are JSON files named after a sanitized key and expire after a
//! configurable TTL, measured from the file's modification time.
//!
//! # Cache Location
//!
//! - Linux: `~/.cache/iocscan/`
//! - macOS: `~/Library/Caches/iocscan/`
//! - Windows: `%LOCALAPPDATA%\iocscan\`
//!
//! # Example
//!
//! ```no_run
//! use iocscan::Cache;
//!
//! let cache = Cache::new();
//! cache.set("ioc_feed", &"Package,Version\n".to_string()).unwrap();
//! let value: Option<String> = cache.get("ioc_feed");
//! assert!(value.is_some());
//! ```

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Default cache TTL in hours.
const CACHE_TTL_HOURS: u64 = 24;

/// Returns the platform cache directory for iocscan.
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("iocscan")
}

#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
    ttl: Duration,
}

impl Cache {
    /// Creates a cache in the platform cache directory with the default 24-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl_hours(CACHE_TTL_HOURS)
    }

    pub fn with_ttl_hours(hours: u64) -> Self {
        Self {
            dir: cache_dir(),
            ttl: Duration::from_secs(hours * 3600),
        }
    }

    /// Creates a cache rooted at `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Converts a cache key (often a URL) to a safe filename.
    fn cache_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe_key))
    }

    fn is_expired(&self, path: &Path) -> bool {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .map(|elapsed| elapsed > self.ttl)
            .unwrap_or(false)
    }

    /// Returns the cached value, or `None` if missing, expired, or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.cache_path(key);

        if !path.exists() {
            return None;
        }

        if self.is_expired(&path) {
            let _ = fs::remove_file(&path);
            return None;
        }

        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.cache_path(key);
        let content = serde_json::to_string(value)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Removes every cached entry.
    pub fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)?.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false) {
                    let _ = fs::remove_file(path);
                }
            }
        }
        Ok(())
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), Duration::from_secs(3600));

        cache
            .set("ioc_https://example.com/feed.csv", &"Package,Version\n".to_string())
            .unwrap();
        let value: Option<String> = cache.get("ioc_https://example.com/feed.csv");
        assert_eq!(value.as_deref(), Some("Package,Version\n"));
    }

    #[test]
    fn test_missing_key() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), Duration::from_secs(3600));
        assert_eq!(cache.get::<String>("nope"), None);
    }

    #[test]
    fn test_zero_ttl_expires() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), Duration::ZERO);
        cache.set("k", &"v".to_string()).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get::<String>("k"), None);
    }

    #[test]
    fn test_clear() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), Duration::from_secs(3600));
        cache.set("a", &1u32).unwrap();
        cache.set("b", &2u32).unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.get::<u32>("a"), None);
        assert_eq!(cache.get::<u32>("b"), None);
    }

    #[test]
    fn test_cache_path_is_sanitized() {
        let cache = Cache::in_dir("/tmp/x", Duration::ZERO);
        let path = cache.cache_path("ioc_https://a.b/c?d=e");
        assert_eq!(path.file_name().unwrap(), "ioc_https___a_b_c_d_e.json");
        assert_eq!(path.parent().unwrap(), cache.dir());
    }
}
