use crate::model::{Finding, ScanResult, Severity};
use anyhow::Result;
use std::fmt::Write;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Location")]
    location: String,
}

#[derive(Tabled)]
struct PotentialRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Declared")]
    declared: String,
    #[tabled(rename = "Compromised Version")]
    version: String,
    #[tabled(rename = "Location")]
    location: String,
}

pub fn print_cli_table(result: &ScanResult) -> Result<()> {
    print!("{}", render_table(result, true));
    Ok(())
}

/// Renders the findings as one table per severity, followed by a summary.
pub fn render_table(result: &ScanResult, color: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Scan completed at: {}",
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for severity in Severity::ALL {
        let findings: Vec<&Finding> = result.by_severity(severity).collect();
        if findings.is_empty() {
            continue;
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} ({}): {}",
            format_severity(severity, color),
            findings.len(),
            describe(severity)
        );
        let _ = writeln!(out);

        let table = match severity {
            Severity::Potential => Table::new(findings.iter().map(|f| PotentialRow {
                package: truncate(&f.package_name, 40),
                declared: f.declared_specifier.clone().unwrap_or_else(|| "-".to_string()),
                version: f.version.clone(),
                location: truncate_start(&f.source_location, 60),
            }))
            .with(Style::rounded())
            .to_string(),
            _ => Table::new(findings.iter().map(|f| FindingRow {
                package: truncate(&f.package_name, 40),
                version: f.version.clone(),
                location: truncate_start(&f.source_location, 60),
            }))
            .with(Style::rounded())
            .to_string(),
        };
        let _ = writeln!(out, "{}", table);
    }

    let _ = writeln!(out);
    write_summary(&mut out, result, color);
    out
}

fn describe(severity: Severity) -> &'static str {
    match severity {
        Severity::Direct => "compromised version pinned in package.json",
        Severity::Transitive => "compromised version installed per lockfile",
        Severity::Potential => "declared range admits a compromised version",
    }
}

fn format_severity(severity: Severity, color: bool) -> String {
    if !color {
        return severity.as_str().to_string();
    }
    match severity {
        Severity::Direct => "\x1b[31mDIRECT\x1b[0m".to_string(),
        Severity::Transitive => "\x1b[91mTRANSITIVE\x1b[0m".to_string(),
        Severity::Potential => "\x1b[33mPOTENTIAL\x1b[0m".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

/// Like [`truncate`] but keeps the end, where a path's file name is.
fn truncate_start(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().skip(len - (max_len - 3)).collect();
        format!("...{}", kept)
    }
}

fn write_summary(out: &mut String, result: &ScanResult, color: bool) {
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(
        out,
        "  Files scanned: {} manifests, {} lockfiles",
        result.manifests_scanned, result.lockfiles_scanned
    );
    let _ = writeln!(out, "  Packages checked: {}", result.packages_checked);
    let _ = writeln!(
        out,
        "  IoC list: {} packages, {} versions",
        result.ioc_packages, result.ioc_entries
    );

    if result.is_clean() {
        let status = if color {
            "\x1b[32mNo compromised packages found.\x1b[0m"
        } else {
            "No compromised packages found."
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", status);
        return;
    }

    let _ = writeln!(
        out,
        "  Findings: {} direct, {} transitive, {} potential",
        result.count(Severity::Direct),
        result.count(Severity::Transitive),
        result.count(Severity::Potential)
    );
}
