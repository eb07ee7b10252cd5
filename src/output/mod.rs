mod cli;
mod json;
mod sarif;

pub use cli::{print_cli_table, render_table};
pub use json::{print_json, render_json};
pub use sarif::{generate_sarif_string, print_sarif};

use crate::model::ScanResult;
use anyhow::Result;

/// Output format for scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables grouped by severity
    Table,
    /// JSON format for programmatic use
    Json,
    /// SARIF format for GitHub Actions code scanning
    Sarif,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            _ => Err(format!(
                "Unknown format: {}. Use 'table', 'json', or 'sarif'",
                s
            )),
        }
    }
}

pub fn print_result(result: &ScanResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(result),
        OutputFormat::Json => print_json(result),
        OutputFormat::Sarif => print_sarif(result),
    }
}

/// Format result to string for file output
pub fn format_result_to_string(result: &ScanResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => render_json(result),
        OutputFormat::Sarif => generate_sarif_string(result),
        OutputFormat::Table => Ok(render_table(result, false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Finding, Severity};
    use chrono::Utc;
    use std::str::FromStr;

    pub(super) fn sample_result() -> ScanResult {
        ScanResult {
            manifests_scanned: 1,
            lockfiles_scanned: 1,
            packages_checked: 12,
            findings: vec![
                Finding {
                    package_name: "@ctrl/tinycolor".to_string(),
                    version: "4.1.1".to_string(),
                    severity: Severity::Direct,
                    source_location: "/app/package.json".to_string(),
                    declared_specifier: None,
                },
                Finding {
                    package_name: "lodash".to_string(),
                    version: "4.17.20".to_string(),
                    severity: Severity::Transitive,
                    source_location: "/app/package-lock.json".to_string(),
                    declared_specifier: None,
                },
                Finding {
                    package_name: "lodash".to_string(),
                    version: "4.17.19".to_string(),
                    severity: Severity::Potential,
                    source_location: "/app/package.json".to_string(),
                    declared_specifier: Some("^4.17.0".to_string()),
                },
            ],
            timestamp: Utc::now(),
            ioc_packages: 3,
            ioc_entries: 5,
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("table"), Ok(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("JSON"), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("sarif"), Ok(OutputFormat::Sarif));
        assert!(OutputFormat::from_str("html").is_err());
    }

    #[test]
    fn test_json_uses_camel_case_and_severity_names() {
        let text = format_result_to_string(&sample_result(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["packagesChecked"], 12);
        assert_eq!(value["iocPackages"], 3);
        let findings = value["findings"].as_array().unwrap();
        assert_eq!(findings[0]["severity"], "DIRECT");
        assert_eq!(findings[0]["packageName"], "@ctrl/tinycolor");
        assert_eq!(findings[0]["location"], "/app/package.json");
        assert!(findings[0].get("declaredSpec").is_none());
        assert_eq!(findings[2]["declaredSpec"], "^4.17.0");
    }

    #[test]
    fn test_table_to_string_has_no_color_codes() {
        let text = format_result_to_string(&sample_result(), OutputFormat::Table).unwrap();
        assert!(!text.contains('\x1b'));
        assert!(text.contains("lodash"));
    }
}
