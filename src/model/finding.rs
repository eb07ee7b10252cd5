use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// An exact version pin in a manifest matches a compromised version.
    Direct,
    /// A version resolved in a lockfile matches a compromised version.
    Transitive,
    /// A declared range could resolve to a compromised version.
    Potential,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Direct, Severity::Transitive, Severity::Potential];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Direct => "DIRECT",
            Severity::Transitive => "TRANSITIVE",
            Severity::Potential => "POTENTIAL",
        }
    }

    /// Higher is more urgent. A range match is only a possibility, so it ranks lowest.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Direct => 3,
            Severity::Transitive => 2,
            Severity::Potential => 1,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub package_name: String,
    /// The compromised version, as listed in the IoC feed.
    pub version: String,
    pub severity: Severity,
    #[serde(rename = "location")]
    pub source_location: String,
    /// The manifest specifier; only set for [`Severity::Potential`].
    #[serde(rename = "declaredSpec", skip_serializing_if = "Option::is_none")]
    pub declared_specifier: Option<String>,
}

impl Finding {
    /// Identity used for deduplication. Location and specifier are not part of it.
    pub fn key(&self) -> (&str, &str, Severity) {
        (&self.package_name, &self.version, self.severity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub manifests_scanned: usize,
    pub lockfiles_scanned: usize,
    pub packages_checked: usize,
    pub findings: Vec<Finding>,
    pub timestamp: DateTime<Utc>,
    /// Distinct package names in the IoC table.
    pub ioc_packages: usize,
    /// Total package/version entries in the IoC table.
    pub ioc_entries: usize,
}

impl ScanResult {
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity(severity).count()
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// The most urgent severity present, if any.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max_by_key(|s| s.rank())
    }
}
