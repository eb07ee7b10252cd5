//! IoC CSV reader.
//!
//! Expected layout:
//!
//! ```text
//! Package,Version
//! 02-echo,= 0.0.7
//! @ctrl/tinycolor,= 4.1.1 || = 4.1.2
//! ```

use tracing::{debug, warn};

/// Reads `(package, version cell)` rows, skipping the header and malformed rows.
pub fn parse_rows(text: &str) -> Vec<(String, String)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (index, record) in reader.records().enumerate() {
        // Row 1 is the header.
        let line = index + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping unreadable IoC row");
                skipped += 1;
                continue;
            }
        };

        let (name, versions) = match (record.get(0), record.get(1)) {
            (Some(name), Some(versions)) if !name.is_empty() && !versions.is_empty() => {
                (name, versions)
            }
            _ => {
                warn!(line, "skipping malformed IoC row");
                skipped += 1;
                continue;
            }
        };

        rows.push((name.to_string(), versions.to_string()));
    }

    debug!(rows = rows.len(), skipped, "parsed IoC CSV");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ioc::IocTable;

    #[test]
    fn test_parse_rows_basic() {
        let rows = parse_rows("Package,Version\n02-echo,= 0.0.7\n@accordproject/concerto-analysis,= 3.24.1\n");
        assert_eq!(
            rows,
            vec![
                ("02-echo".to_string(), "= 0.0.7".to_string()),
                ("@accordproject/concerto-analysis".to_string(), "= 3.24.1".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_rows_skips_malformed() {
        let text = "Package,Version\n02-echo,= 0.0.7\n\nlonely\nanother-line,\n,= 1.0.0\n";
        let rows = parse_rows(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "02-echo");
    }

    #[test]
    fn test_parse_rows_trims_whitespace() {
        let rows = parse_rows("Package,Version\n  pkg  ,  = 1.2.3  \n");
        assert_eq!(rows, vec![("pkg".to_string(), "= 1.2.3".to_string())]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("Package,Version\n").is_empty());
    }

    #[test]
    fn test_from_csv_quoted_multi_version_cell() {
        let table = IocTable::from_csv(
            "Package,Version\n\"@ctrl/tinycolor\",\"= 4.1.1 || = 4.1.2\"\nvulnerable,= 1.0.0\nvulnerable,= 1.0.1\n",
        );
        assert_eq!(table.lookup("@ctrl/tinycolor"), ["4.1.1", "4.1.2"]);
        assert_eq!(table.lookup("vulnerable"), ["1.0.0", "1.0.1"]);
        assert_eq!(table.count(), 2);
        assert_eq!(table.size(), 4);
    }
}
