//! Configuration file handling.
//!
//! Settings are read from a TOML file; every field is optional and falls back
//! to its default. Command-line flags override whatever is configured here.
//!
//! # Configuration Location
//!
//! - Linux: `~/.config/iocscan/config.toml`
//! - macOS: `~/Library/Application Support/iocscan/config.toml`
//! - Windows: `%APPDATA%\iocscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! ioc_url = "https://example.com/iocs.csv"
//! cache_ttl_hours = 24
//! default_format = "table"
//! lockfile_only = false
//! workers = 4
//! output_dir = "results"
//!
//! [ignore]
//! packages = ["@internal/*"]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Published list of packages compromised in the Shai-Hulud 2.0 campaign.
pub const DEFAULT_IOC_URL: &str =
    "https://raw.githubusercontent.com/wiz-sec-public/wiz-research-iocs/main/reports/shai-hulud-2-packages.csv";

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use iocscan::Config;
///
/// let config = Config::load().unwrap();
/// println!("IoC source: {}", config.ioc_url);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the IoC CSV is fetched from: an `http(s)://` URL or a local path.
    pub ioc_url: String,

    /// How long a downloaded IoC list stays cached, in hours.
    pub cache_ttl_hours: u64,

    /// Output format when no `--format` flag is given: "table", "json" or "sarif".
    pub default_format: String,

    /// Only read lockfiles, skipping `package.json` manifests.
    pub lockfile_only: bool,

    /// Concurrent project scans in bulk mode.
    pub workers: usize,

    /// Base directory for bulk scan results.
    pub output_dir: PathBuf,

    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Packages to drop from the findings, for accepted risks or false positives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Package names. Supports `*` wildcards (e.g. `"@types/*"`).
    pub packages: Vec<String>,
}

impl IgnoreConfig {
    pub fn should_ignore_package(&self, name: &str) -> bool {
        self.packages.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, name)
            } else {
                pattern == name
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    let first = parts[0];
    if !first.is_empty() {
        match remaining.strip_prefix(first) {
            Some(rest) => remaining = rest,
            None => return false,
        }
    }

    let last = parts[parts.len() - 1];
    if !last.is_empty() {
        match remaining.strip_suffix(last) {
            Some(rest) => remaining = rest,
            None => return false,
        }
    }

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ioc_url: DEFAULT_IOC_URL.to_string(),
            cache_ttl_hours: 24,
            default_format: "table".to_string(),
            lockfile_only: false,
            workers: 4,
            output_dir: PathBuf::from("results"),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads the config file, or the defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Writes the config to the default location, creating parent directories.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("iocscan")
            .join("config.toml")
    }

    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}
