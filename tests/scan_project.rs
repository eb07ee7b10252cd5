use iocscan::config::IgnoreConfig;
use iocscan::ioc::IocTable;
use iocscan::scanner::{scan_project, ScanOptions};
use iocscan::{Finding, Severity};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const IOC_CSV: &str = "\
Package,Version
@ctrl/tinycolor,= 4.1.1 || = 4.1.2
lodash,= 4.17.19
debug,= 4.4.2
ms,= 2.0.0
chalk,= 5.6.1
";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small monorepo: a root app with a v3 lockfile, a legacy package with a
/// v1 lockfile, a yarn workspace, and an installed `node_modules` that must be ignored.
fn fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write(
        root,
        "package.json",
        r#"{
            "name": "app",
            "dependencies": { "@ctrl/tinycolor": "^4.0.0", "express": "4.18.2" },
            "devDependencies": { "lodash": "4.17.19" }
        }"#,
    );
    write(
        root,
        "package-lock.json",
        r#"{
            "lockfileVersion": 3,
            "packages": {
                "": { "name": "app" },
                "node_modules/@ctrl/tinycolor": { "version": "4.1.2" },
                "node_modules/lodash": { "version": "4.17.19" },
                "node_modules/express": { "version": "4.18.2" }
            }
        }"#,
    );
    write(
        root,
        "legacy/package-lock.json",
        r#"{
            "lockfileVersion": 1,
            "dependencies": {
                "debug": {
                    "version": "2.6.9",
                    "dependencies": { "ms": { "version": "2.0.0" } }
                }
            }
        }"#,
    );
    write(
        root,
        "web/yarn.lock",
        "# yarn lockfile v1\n\nchalk@^5.0.0:\n  version \"5.6.1\"\n\ndebug@^4.3.0:\n  version \"4.4.1\"\n",
    );
    write(
        root,
        "node_modules/debug/package.json",
        r#"{ "dependencies": { "ms": "2.0.0" } }"#,
    );
    write(
        root,
        "node_modules/.package-lock.json",
        r#"{ "packages": { "node_modules/debug": { "version": "4.4.2" } } }"#,
    );

    tmp
}

fn names(findings: &[&Finding]) -> Vec<String> {
    findings
        .iter()
        .map(|f| format!("{}@{}", f.package_name, f.version))
        .collect()
}

#[test]
fn test_end_to_end_scan() {
    let tmp = fixture();
    let table = IocTable::from_csv(IOC_CSV);
    assert_eq!(table.count(), 5);
    assert_eq!(table.size(), 6);

    let result = scan_project(tmp.path(), &table, &ScanOptions::default(), None).unwrap();

    assert_eq!(result.manifests_scanned, 1);
    assert_eq!(result.lockfiles_scanned, 3);
    // 3 declared + 3 (v3) + 2 (v1) + 2 (yarn)
    assert_eq!(result.packages_checked, 10);

    let direct: Vec<&Finding> = result.by_severity(Severity::Direct).collect();
    assert_eq!(names(&direct), vec!["lodash@4.17.19"]);

    let mut transitive = names(&result.by_severity(Severity::Transitive).collect::<Vec<_>>());
    transitive.sort();
    assert_eq!(
        transitive,
        vec![
            "@ctrl/tinycolor@4.1.2",
            "chalk@5.6.1",
            "lodash@4.17.19",
            "ms@2.0.0",
        ]
    );

    let potential: Vec<&Finding> = result.by_severity(Severity::Potential).collect();
    assert_eq!(
        names(&potential),
        vec!["@ctrl/tinycolor@4.1.1", "@ctrl/tinycolor@4.1.2"]
    );
    assert!(potential
        .iter()
        .all(|f| f.declared_specifier.as_deref() == Some("^4.0.0")));

    assert!(result
        .findings
        .iter()
        .all(|f| !f.source_location.contains("node_modules")));
}

#[test]
fn test_lockfile_only_and_ignore_list() {
    let tmp = fixture();
    let table = IocTable::from_csv(IOC_CSV);
    let options = ScanOptions {
        lockfile_only: true,
        ignore: IgnoreConfig {
            packages: vec!["@ctrl/*".to_string()],
        },
    };

    let result = scan_project(tmp.path(), &table, &options, None).unwrap();

    assert_eq!(result.manifests_scanned, 0);
    assert_eq!(result.count(Severity::Direct), 0);
    assert_eq!(result.count(Severity::Potential), 0);
    assert_eq!(result.count(Severity::Transitive), 3);
    assert!(result
        .findings
        .iter()
        .all(|f| !f.package_name.starts_with("@ctrl/")));
}

#[test]
fn test_rescan_is_stable() {
    let tmp = fixture();
    let table = IocTable::from_csv(IOC_CSV);

    let first = scan_project(tmp.path(), &table, &ScanOptions::default(), None).unwrap();
    let second = scan_project(tmp.path(), &table, &ScanOptions::default(), None).unwrap();
    assert_eq!(first.findings, second.findings);
}
