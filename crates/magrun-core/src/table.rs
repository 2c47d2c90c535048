//! ODT (OOMMF Data Table) text reader.

use std::fs;
use std::path::Path;

use crate::error::{DriveError, Result};

/// Scalar time-series produced by the engine, one row per saved stage/step.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub units: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl DataTable {
    /// Index of a column whose name contains `needle`.
    pub fn column(&self, needle: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.contains(needle))
    }

    /// Last row of the table, if any.
    pub fn last_row(&self) -> Option<&[f64]> {
        self.rows.last().map(|r| r.as_slice())
    }
}

/// Read an ODT file.
///
/// Column and unit names may be brace-wrapped (`{Simulation time}`) or bare
/// tokens; data rows are whitespace-separated floats. A file with no column
/// header or no data rows is malformed.
pub fn read(path: &Path) -> Result<DataTable> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DriveError::MissingOutput(path.to_path_buf())
        } else {
            DriveError::MalformedOutput {
                path: path.to_path_buf(),
                reason: format!("cannot read table: {e}"),
            }
        }
    })?;

    let mut columns: Vec<String> = Vec::new();
    let mut units: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('#') {
            let rest = rest.trim();
            if let Some(names) = rest.strip_prefix("Columns:") {
                columns = parse_tokens(names);
            } else if let Some(names) = rest.strip_prefix("Units:") {
                units = parse_tokens(names);
            }
            continue;
        }
        if columns.is_empty() {
            return Err(DriveError::MalformedOutput {
                path: path.to_path_buf(),
                reason: "data row before column header".to_string(),
            });
        }
        let mut row = Vec::new();
        for token in line.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| DriveError::MalformedOutput {
                path: path.to_path_buf(),
                reason: format!("non-numeric table value '{token}'"),
            })?;
            row.push(value);
        }
        if row.len() != columns.len() {
            return Err(DriveError::MalformedOutput {
                path: path.to_path_buf(),
                reason: format!(
                    "row has {} values for {} columns",
                    row.len(),
                    columns.len()
                ),
            });
        }
        rows.push(row);
    }

    if columns.is_empty() {
        return Err(DriveError::MalformedOutput {
            path: path.to_path_buf(),
            reason: "no column header found".to_string(),
        });
    }
    if rows.is_empty() {
        return Err(DriveError::MalformedOutput {
            path: path.to_path_buf(),
            reason: "no data rows found".to_string(),
        });
    }

    Ok(DataTable {
        columns,
        units,
        rows,
    })
}

/// Split a header line into tokens, honouring `{...}` grouping.
fn parse_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = line.trim();
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('{') {
            match stripped.find('}') {
                Some(end) => {
                    tokens.push(stripped[..end].trim().to_string());
                    rest = stripped[end + 1..].trim_start();
                }
                None => {
                    // Unterminated brace; take the remainder as one token.
                    tokens.push(stripped.trim().to_string());
                    break;
                }
            }
        } else {
            match rest.find(char::is_whitespace) {
                Some(end) => {
                    tokens.push(rest[..end].to_string());
                    rest = rest[end..].trim_start();
                }
                None => {
                    tokens.push(rest.to_string());
                    break;
                }
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ODT: &str = "\
# ODT 1.0
# Table Start
# Title: magrun sample
# Columns: {Oxs_TimeDriver::Simulation time} {Oxs_TimeDriver::mx} my
# Units: {s} {} {}
1e-11 0.95 0.1
2e-11 0.91 0.2
# Table End
";

    #[test]
    fn test_read_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.odt");
        std::fs::write(&path, SAMPLE_ODT).unwrap();

        let table = read(&path).unwrap();
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[0], "Oxs_TimeDriver::Simulation time");
        assert_eq!(table.columns[2], "my");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.last_row().unwrap()[0], 2e-11);
    }

    #[test]
    fn test_column_lookup_by_substring() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.odt");
        std::fs::write(&path, SAMPLE_ODT).unwrap();

        let table = read(&path).unwrap();
        assert_eq!(table.column("Simulation time"), Some(0));
        assert_eq!(table.column("nope"), None);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(&dir.path().join("absent.odt")).unwrap_err();
        assert!(matches!(err, DriveError::MissingOutput(_)));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.odt");
        std::fs::write(&path, "# Columns: a b c\n1.0 2.0\n").unwrap();
        let err = read(&path).unwrap_err();
        assert!(matches!(err, DriveError::MalformedOutput { .. }));
    }

    #[test]
    fn test_headerless_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.odt");
        std::fs::write(&path, "1.0 2.0\n").unwrap();
        let err = read(&path).unwrap_err();
        assert!(matches!(err, DriveError::MalformedOutput { .. }));
    }

    #[test]
    fn test_row_before_header_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.odt");
        // A stray row ahead of the header must not be adopted silently
        // even if a matching header follows.
        std::fs::write(&path, "1.0 2.0\n# Columns: a b\n3.0 4.0\n").unwrap();
        let err = read(&path).unwrap_err();
        match err {
            DriveError::MalformedOutput { reason, .. } => {
                assert!(reason.contains("before column header"), "got {reason}");
            }
            other => panic!("expected MalformedOutput, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_file_is_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        // Reading a directory as a table fails with a non-NotFound io
        // error, which must stay inside the ingestion taxonomy.
        let err = read(dir.path()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Ingestion);
    }
}
