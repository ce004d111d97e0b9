//! Flat-file persistence: CSV tables, append-only JSONL, whole-file JSON

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// Save a value as a pretty-printed JSON document, replacing the file.
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let file =
        File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Cannot write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// Load a whole JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Write all rows as one CSV file with a header row, replacing the file.
///
/// Returns the number of rows written.
pub fn write_csv<T: Serialize>(rows: &[T], path: &Path) -> anyhow::Result<usize> {
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Cannot write CSV row to {}", path.display()))?;
    }
    writer.flush()?;
    Ok(rows.len())
}

/// Read one named column from a CSV file, in file order.
///
/// Cells are trimmed; empty cells are kept as empty strings.
pub fn read_csv_column(path: &Path, column: &str) -> anyhow::Result<Vec<String>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let idx = reader
        .headers()
        .with_context(|| format!("Cannot read header of {}", path.display()))?
        .iter()
        .position(|h| h == column)
        .with_context(|| format!("No '{column}' column in {}", path.display()))?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Malformed row in {}", path.display()))?;
        values.push(record.get(idx).unwrap_or_default().trim().to_string());
    }
    Ok(values)
}

/// Append-only JSON Lines file.
///
/// Each [`append`](JsonlSink::append) opens the file in append mode, writes
/// one object per line and closes it again, so content from earlier
/// appends and earlier runs is never truncated.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records, returning how many were written.
    pub fn append<T: Serialize>(&self, records: &[T]) -> std::io::Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        ensure_parent(&self.path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        log::info!(
            "Saved {} results to {}",
            records.len(),
            self.path.display()
        );
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        #[serde(rename = "Author ID")]
        id: String,
        #[serde(rename = "Works Count")]
        works: Option<i64>,
    }

    #[test]
    fn json_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/state.json");
        let value = serde_json::json!({"cursor": "abc", "pages": 3});

        save_json(&value, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'), "expected pretty output");

        let loaded: serde_json::Value = load_json(&path).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn load_json_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_json::<serde_json::Value>(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Cannot open"));
    }

    #[test]
    fn csv_write_and_read_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authors.csv");
        let rows = vec![
            Row {
                id: "https://openalex.org/A1".into(),
                works: Some(3),
            },
            Row {
                id: "https://openalex.org/A2".into(),
                works: None,
            },
        ];
        assert_eq!(write_csv(&rows, &path).unwrap(), 2);

        let header = fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("Author ID,Works Count"));

        let ids = read_csv_column(&path, "Author ID").unwrap();
        assert_eq!(ids, vec!["https://openalex.org/A1", "https://openalex.org/A2"]);
    }

    #[test]
    fn read_column_missing_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.csv");
        fs::write(&path, "Name\nAda\n").unwrap();
        let err = read_csv_column(&path, "Author ID").unwrap_err();
        assert!(err.to_string().contains("Author ID"));
    }

    #[test]
    fn jsonl_appends_across_sinks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("works.jsonl");

        JsonlSink::new(&path)
            .append(&[serde_json::json!({"id": 1})])
            .unwrap();
        // A fresh sink on the same path must not truncate
        JsonlSink::new(&path)
            .append(&[serde_json::json!({"id": 2}), serde_json::json!({"id": 3})])
            .unwrap();

        let lines: Vec<String> = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(String::from)
            .collect();
        assert_eq!(lines, vec![r#"{"id":1}"#, r#"{"id":2}"#, r#"{"id":3}"#]);
    }

    #[test]
    fn jsonl_empty_append_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("works.jsonl");
        let written = JsonlSink::new(&path)
            .append::<serde_json::Value>(&[])
            .unwrap();
        assert_eq!(written, 0);
        assert!(!path.exists());
    }
}
