//! Concatenate per-year award artifacts into one row-per-award table.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::artifacts::{parse_artifact_year, AWARD_ARTIFACT_PREFIX};
use crate::types::FetchResult;

/// Column added to every row.
pub const YEAR_COLUMN: &str = "year";

/// One award record tagged with the year of the artifact it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardRow {
    pub year: i32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Rows from every award artifact, in file-processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AwardTable {
    pub rows: Vec<AwardRow>,
}

impl AwardTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of field names in first-seen order, with `year` last.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for row in &self.rows {
            for key in row.fields.keys() {
                if key != YEAR_COLUMN && !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        columns.push(YEAR_COLUMN.to_string());
        columns
    }

    /// Write one JSON object per line.
    pub fn write_json_lines<W: Write>(&self, writer: &mut W) -> FetchResult<()> {
        for row in &self.rows {
            serde_json::to_writer(&mut *writer, row)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Load every `awards_to_8a_<year>.json` artifact in `input_dir`.
///
/// Artifacts with an unparseable year or malformed content are logged and
/// skipped; only failure to list the directory is an error.
pub fn concatenate(input_dir: &Path) -> FetchResult<AwardTable> {
    let mut names = artifact_names(input_dir)?;
    names.sort();

    let mut table = AwardTable::default();

    for name in names {
        let Some(year) = parse_artifact_year(&name) else {
            tracing::warn!("unable to extract year from filename: {name}");
            continue;
        };

        let text = match std::fs::read_to_string(input_dir.join(&name)) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("error reading {name}: {e}");
                continue;
            }
        };

        match rows_from_artifact(&text, year) {
            Ok(rows) => {
                tracing::debug!("{name}: {} rows", rows.len());
                table.rows.extend(rows);
            }
            Err(reason) => tracing::warn!("error decoding JSON in file {name}: {reason}"),
        }
    }

    tracing::info!("concatenated {} award rows", table.len());
    Ok(table)
}

/// Award artifact file names in `input_dir`, unsorted.
fn artifact_names(input_dir: &Path) -> FetchResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry in {}: {e}", input_dir.display());
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                tracing::warn!("skipping non-UTF-8 file name: {}", raw.to_string_lossy());
                continue;
            }
        };
        if name.contains(AWARD_ARTIFACT_PREFIX) && name.ends_with(".json") {
            names.push(name);
        }
    }
    Ok(names)
}

/// Flatten one artifact (a sequence of per-identifier responses) into rows.
///
/// Array responses are flattened one level. Any other response becomes a
/// single row of its own.
fn rows_from_artifact(text: &str, year: i32) -> Result<Vec<AwardRow>, String> {
    let data: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let Value::Array(batches) = data else {
        return Err("expected a top-level array".into());
    };

    let mut rows = Vec::new();
    for batch in batches {
        match batch {
            Value::Array(items) => rows.extend(items.into_iter().map(|item| to_row(item, year))),
            other => rows.push(to_row(other, year)),
        }
    }
    Ok(rows)
}

fn to_row(item: Value, year: i32) -> AwardRow {
    let mut fields = match item {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    fields.remove(YEAR_COLUMN);
    AwardRow { year, fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_from_artifact_flattens_one_level() {
        let text = r#"[[{"uei":"A"},{"uei":"B"}],[],[{"uei":"C"}]]"#;
        let rows = rows_from_artifact(text, 2022).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.year == 2022));
        assert_eq!(rows[2].fields["uei"], json!("C"));
    }

    #[test]
    fn test_rows_from_artifact_rejects_wrong_shape() {
        assert!(rows_from_artifact(r#"{"uei":"A"}"#, 2022).is_err());
        assert!(rows_from_artifact("not json", 2022).is_err());
    }

    #[test]
    fn test_rows_from_artifact_keeps_object_responses() {
        let text = r#"[[{"name":"a"},{"name":"b"}],{"id":"A1"}]"#;
        let rows = rows_from_artifact(text, 2023).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].fields["id"], json!("A1"));
        assert_eq!(rows[2].year, 2023);

        let rows = rows_from_artifact(r#"[{"id":"A1"}]"#, 2023).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_columns_first_seen_order() {
        let table = AwardTable {
            rows: vec![
                rows_from_artifact(r#"[[{"b":1,"a":2}]]"#, 2020).unwrap().remove(0),
                rows_from_artifact(r#"[[{"c":3,"b":4}]]"#, 2021).unwrap().remove(0),
            ],
        };
        let cols = table.columns();
        assert_eq!(cols.last().map(String::as_str), Some("year"));
        assert_eq!(cols.len(), 4);
        assert!(cols.contains(&"c".to_string()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_file_name_is_skipped() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let odd = std::ffi::OsStr::from_bytes(b"awards_to_8a_\xff.json");
        std::fs::write(dir.path().join(odd), "[[{\"uei\":\"X\"}]]").unwrap();
        std::fs::write(dir.path().join("awards_to_8a_2021.json"), r#"[[{"uei":"A"}]]"#).unwrap();

        let table = concatenate(dir.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].year, 2021);
    }

    #[test]
    fn test_write_json_lines_includes_year() {
        let table = AwardTable {
            rows: rows_from_artifact(r#"[[{"uei":"A"}]]"#, 2019).unwrap(),
        };
        let mut out = Vec::new();
        table.write_json_lines(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let line: Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(line, json!({"uei": "A", "year": 2019}));
    }
}
