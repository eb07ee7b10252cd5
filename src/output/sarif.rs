//! SARIF (Static Analysis Results Interchange Format) output for GitHub Actions integration.
//!
//! When used with `--format sarif`, the output can be uploaded to GitHub Code Scanning
//! so compromised dependencies show up as annotations on the manifest or lockfile.
//! Each severity maps to one rule; each finding becomes one result.

use crate::model::{Finding, ScanResult, Severity};
use anyhow::Result;
use serde::Serialize;

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// SARIF v2.1.0 schema root
#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: &'static str,
    name: &'static str,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_configuration: SarifRuleConfiguration,
}

#[derive(Serialize)]
struct SarifRuleConfiguration {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: &'static str,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

fn rule_id(severity: Severity) -> &'static str {
    match severity {
        Severity::Direct => "iocscan/direct",
        Severity::Transitive => "iocscan/transitive",
        Severity::Potential => "iocscan/potential",
    }
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Direct | Severity::Transitive => "error",
        Severity::Potential => "warning",
    }
}

fn rule(severity: Severity) -> SarifRule {
    let (name, text) = match severity {
        Severity::Direct => (
            "CompromisedDirectDependency",
            "A manifest pins a known-compromised package version",
        ),
        Severity::Transitive => (
            "CompromisedInstalledDependency",
            "A lockfile resolves a known-compromised package version",
        ),
        Severity::Potential => (
            "CompromisedVersionInRange",
            "A declared version range admits a known-compromised package version",
        ),
    };

    SarifRule {
        id: rule_id(severity),
        name,
        short_description: SarifMessage {
            text: text.to_string(),
        },
        default_configuration: SarifRuleConfiguration {
            level: sarif_level(severity),
        },
    }
}

fn message(finding: &Finding) -> String {
    match &finding.declared_specifier {
        Some(spec) => format!(
            "{} declared as {} may resolve to compromised version {}",
            finding.package_name, spec, finding.version
        ),
        None => format!(
            "{}@{} is a known-compromised version",
            finding.package_name, finding.version
        ),
    }
}

fn build_report(result: &ScanResult) -> SarifReport {
    let results = result
        .findings
        .iter()
        .map(|finding| SarifResult {
            rule_id: rule_id(finding.severity),
            level: sarif_level(finding.severity),
            message: SarifMessage {
                text: message(finding),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation {
                        uri: finding.source_location.clone(),
                    },
                },
            }],
        })
        .collect();

    SarifReport {
        schema: SARIF_SCHEMA,
        version: "2.1.0",
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "iocscan",
                    version: env!("CARGO_PKG_VERSION"),
                    rules: Severity::ALL.into_iter().map(rule).collect(),
                },
            },
            results,
        }],
    }
}

/// Generate and print SARIF output
pub fn print_sarif(result: &ScanResult) -> Result<()> {
    println!("{}", generate_sarif_string(result)?);
    Ok(())
}

/// Generate SARIF as a string (for file output)
pub fn generate_sarif_string(result: &ScanResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&build_report(result))?)
}
