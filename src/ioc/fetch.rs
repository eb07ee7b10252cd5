//! Retrieval of the raw IoC CSV.
//!
//! The CSV comes either from an HTTP(S) URL, cached on disk between runs, or
//! from a local file for offline scans.

use super::IocTable;
use crate::cache::Cache;
use crate::error::{Result, ScanError};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

#[async_trait]
pub trait IocProvider: Send + Sync {
    /// Human-readable description of where the data comes from.
    fn describe(&self) -> String;

    /// Returns the raw CSV text.
    async fn fetch_csv(&self) -> Result<String>;
}

pub struct HttpProvider {
    client: reqwest::Client,
    url: String,
    cache: Option<Cache>,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn cache_key(&self) -> String {
        format!("ioc_{}", self.url)
    }
}

#[async_trait]
impl IocProvider for HttpProvider {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch_csv(&self) -> Result<String> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get::<String>(&self.cache_key()) {
                debug!(url = %self.url, "using cached IoC list");
                return Ok(body);
            }
        }

        info!(url = %self.url, "fetching IoC list");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::FetchStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;

        if let Some(cache) = &self.cache {
            // A cache write failure only costs a refetch next time.
            if let Err(e) = cache.set(&self.cache_key(), &body) {
                debug!(error = %e, "failed to cache IoC list");
            }
        }

        Ok(body)
    }
}

pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl IocProvider for FileProvider {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_csv(&self) -> Result<String> {
        debug!(path = %self.path.display(), "reading IoC list from file");
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ScanError::io(&self.path, e))
    }
}

/// Picks an HTTP provider for `http(s)://` sources and a file provider otherwise.
pub fn provider_for(source: &str, cache: Option<Cache>) -> Box<dyn IocProvider> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let provider = HttpProvider::new(source);
        match cache {
            Some(cache) => Box::new(provider.with_cache(cache)),
            None => Box::new(provider),
        }
    } else {
        let path = source.strip_prefix("file://").unwrap_or(source);
        Box::new(FileProvider::new(path))
    }
}

/// Fetches the IoC CSV from `source` and builds the lookup table.
pub async fn load_table(source: &str, cache: Option<Cache>) -> Result<IocTable> {
    let provider = provider_for(source, cache);
    let text = provider.fetch_csv().await?;
    let table = IocTable::from_csv(&text);
    info!(
        source = %provider.describe(),
        packages = table.count(),
        entries = table.size(),
        "loaded IoC table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_provider_reads_csv() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("iocs.csv");
        std::fs::write(&path, "Package,Version\nlodash,= 4.17.19\n").unwrap();

        let provider = provider_for(path.to_str().unwrap(), None);
        let body = provider.fetch_csv().await.unwrap();
        assert!(body.contains("lodash"));
    }

    #[tokio::test]
    async fn test_file_provider_missing_file() {
        let provider = FileProvider::new("/definitely/not/here.csv");
        let err = provider.fetch_csv().await.unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[tokio::test]
    async fn test_http_provider_serves_from_cache() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), Duration::from_secs(3600));
        let url = "https://iocs.invalid/feed.csv";
        cache
            .set(&format!("ioc_{}", url), &"Package,Version\nx,= 1.0.0\n".to_string())
            .unwrap();

        let provider = HttpProvider::new(url).with_cache(cache);
        let body = provider.fetch_csv().await.unwrap();
        assert_eq!(body, "Package,Version\nx,= 1.0.0\n");
    }

    #[tokio::test]
    async fn test_load_table_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("iocs.csv");
        std::fs::write(&path, "Package,Version\nlodash,= 4.17.19 || = 4.17.20\nevil,= 1.0.0\n")
            .unwrap();

        let table = load_table(path.to_str().unwrap(), None).await.unwrap();
        assert_eq!(table.count(), 2);
        assert_eq!(table.size(), 3);
    }

    #[test]
    fn test_provider_for_selects_by_scheme() {
        assert_eq!(
            provider_for("https://example.com/a.csv", None).describe(),
            "https://example.com/a.csv"
        );
        assert_eq!(provider_for("file:///tmp/a.csv", None).describe(), "/tmp/a.csv");
        assert_eq!(provider_for("./a.csv", None).describe(), "./a.csv");
    }
}
