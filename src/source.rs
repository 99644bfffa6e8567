//! Reading dictionary rows from the CSV export.

use bzip2::read::BzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::entry::{parse_entry, Entry};
use crate::error::{Error, Result};

/// Column names to look up in the export's header row
#[derive(Debug, Clone)]
pub struct Columns {
    pub text: String,
    pub id: String,
    pub name: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            text: "ResultText".to_string(),
            id: "ID".to_string(),
            name: "NAME".to_string(),
        }
    }
}

/// One row of the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub text: String,
}

impl SourceRow {
    /// Parse the raw text and carry the row identifiers onto the entry
    pub fn parse(&self) -> Entry {
        parse_entry(&self.text).with_source_row(self.id.clone(), self.name.clone())
    }
}

fn cell(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Read all rows from a CSV reader. Only the text column is required.
pub fn read_rows(reader: impl Read, columns: &Columns, limit: Option<usize>) -> Result<Vec<SourceRow>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let text_index = position(&columns.text).ok_or_else(|| Error::MissingColumn(columns.text.clone()))?;
    let id_index = position(&columns.id);
    let name_index = position(&columns.name);
    if id_index.is_none() || name_index.is_none() {
        debug!(?id_index, ?name_index, "identifier columns not found, rows will carry none");
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        if limit.map_or(false, |l| rows.len() >= l) {
            break;
        }
        let record = record?;
        rows.push(SourceRow {
            id: cell(&record, id_index),
            name: cell(&record, name_index),
            text: record.get(text_index).unwrap_or_default().to_string(),
        });
    }

    Ok(rows)
}

/// Open an export file, decompressing `.bz2` input transparently
pub fn read_rows_from_path(path: &Path, columns: &Columns, limit: Option<usize>) -> Result<Vec<SourceRow>> {
    let file = File::open(path)?;
    if path.to_string_lossy().ends_with(".bz2") {
        read_rows(BufReader::with_capacity(256 * 1024, BzDecoder::new(file)), columns, limit)
    } else {
        read_rows(BufReader::with_capacity(256 * 1024, file), columns, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "ID,NAME,ResultText\n\
        1,அக்கரம்,\"<Red>அக்கரம்</Red><Super>2</Super><BR><BR><Three_Space>எழுத்து\"\n\
        2,,\"<Red>குளம்</Red>\"\n";

    #[test]
    fn reads_rows_with_identifiers() {
        let rows = read_rows(EXPORT.as_bytes(), &Columns::default(), None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_deref(), Some("1"));
        assert_eq!(rows[0].name.as_deref(), Some("அக்கரம்"));
        assert!(rows[0].text.starts_with("<Red>"));
        assert_eq!(rows[1].name, None);
    }

    #[test]
    fn limit_stops_early() {
        let rows = read_rows(EXPORT.as_bytes(), &Columns::default(), Some(1)).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn missing_text_column_is_an_error() {
        let data = "ID,NAME,Body\n1,x,y\n";
        let err = read_rows(data.as_bytes(), &Columns::default(), None).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "ResultText"));
    }

    #[test]
    fn identifier_columns_are_optional() {
        let data = "ResultText\n<Red>x</Red>\n";
        let rows = read_rows(data.as_bytes(), &Columns::default(), None).unwrap();
        assert_eq!(rows[0].id, None);
        assert_eq!(rows[0].name, None);
    }

    #[test]
    fn custom_column_names() {
        let data = "key,word,raw\n9,w,<Red>w</Red>\n";
        let columns = Columns {
            text: "raw".to_string(),
            id: "key".to_string(),
            name: "word".to_string(),
        };
        let rows = read_rows(data.as_bytes(), &columns, None).unwrap();
        assert_eq!(rows[0].id.as_deref(), Some("9"));
        assert_eq!(rows[0].text, "<Red>w</Red>");
    }

    #[test]
    fn parse_threads_identifiers_through() {
        let rows = read_rows(EXPORT.as_bytes(), &Columns::default(), None).unwrap();
        let entry = rows[0].parse();
        assert_eq!(entry.source_row_id.as_deref(), Some("1"));
        assert_eq!(entry.headword.as_deref(), Some("அக்கரம்"));
        assert_eq!(entry.meanings.len(), 1);
    }
}
