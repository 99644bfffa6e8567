//! Writers for parsed entries: nested documents (JSON, YAML, JSON Lines)
//! and the normalized four-table CSV layout.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::entry::Entry;
use crate::error::Result;

pub const JSON_FILE: &str = "dictionary.json";
pub const YAML_FILE: &str = "dictionary.yaml";
pub const JSONL_FILE: &str = "dictionary.jsonl";
pub const ENTRIES_CSV: &str = "entries.csv";
pub const MEANINGS_CSV: &str = "meanings.csv";
pub const CROSS_REFERENCES_CSV: &str = "cross_references.csv";
pub const ETYMOLOGY_CSV: &str = "etymology.csv";

/// Separator for the italic annotations packed into one meanings.csv cell
const ITALICS_SEPARATOR: &str = " | ";

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::with_capacity(256 * 1024, File::create(path)?))
}

/// Pretty-printed JSON array of all entries
pub fn write_json(mut writer: impl Write, entries: &[Entry]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// YAML sequence of all entries
pub fn write_yaml(mut writer: impl Write, entries: &[Entry]) -> Result<()> {
    serde_yaml::to_writer(&mut writer, entries)?;
    writer.flush()?;
    Ok(())
}

/// One JSON object per line
pub fn write_jsonl(mut writer: impl Write, entries: &[Entry]) -> Result<()> {
    for entry in entries {
        let json = serde_json::to_string(entry)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct EntryRow<'a> {
    csv_id: Option<&'a str>,
    headword: Option<&'a str>,
    headword_id: Option<&'a str>,
    transliteration: Option<&'a str>,
    pos_tamil: Option<&'a str>,
    pos_english: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct MeaningRow<'a> {
    csv_id: Option<&'a str>,
    meaning_index: usize,
    meaning_number: Option<&'a str>,
    tamil: &'a str,
    tamil_italics: String,
    english: &'a str,
    source: Option<&'a str>,
    source_extra: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CrossReferenceRow<'a> {
    csv_id: Option<&'a str>,
    ref_index: usize,
    cross_reference: &'a str,
}

#[derive(Debug, Serialize)]
struct EtymologyRow<'a> {
    csv_id: Option<&'a str>,
    line_no: usize,
    etymology_text: &'a str,
}

/// Destinations for the normalized tables
pub struct TableWriters<W: Write> {
    pub entries: W,
    pub meanings: W,
    pub cross_references: W,
    pub etymology: W,
}

/// Write one row per entry, and one per meaning, cross-reference and
/// etymology line keyed by the entry's `csv_id` with a 1-based position.
pub fn write_tables<W: Write>(writers: TableWriters<W>, entries: &[Entry]) -> Result<()> {
    let mut entry_csv = csv::Writer::from_writer(writers.entries);
    let mut meaning_csv = csv::Writer::from_writer(writers.meanings);
    let mut crossref_csv = csv::Writer::from_writer(writers.cross_references);
    let mut etymology_csv = csv::Writer::from_writer(writers.etymology);

    for entry in entries {
        let csv_id = entry.source_row_id.as_deref();

        entry_csv.serialize(EntryRow {
            csv_id,
            headword: entry.headword.as_deref(),
            headword_id: entry.headword_id.as_deref(),
            transliteration: entry.transliteration.as_deref(),
            pos_tamil: entry.pos_tamil.as_deref(),
            pos_english: entry.pos_english.as_deref(),
        })?;

        for (idx, m) in entry.meanings.iter().enumerate() {
            meaning_csv.serialize(MeaningRow {
                csv_id,
                meaning_index: idx + 1,
                meaning_number: m.meaning_number.as_deref(),
                tamil: &m.tamil,
                tamil_italics: m.tamil_italics.join(ITALICS_SEPARATOR),
                english: &m.english,
                source: m.source.as_deref(),
                source_extra: m.source_extra.as_deref(),
            })?;
        }

        for (idx, cross_reference) in entry.cross_references.iter().enumerate() {
            crossref_csv.serialize(CrossReferenceRow {
                csv_id,
                ref_index: idx + 1,
                cross_reference,
            })?;
        }

        for (idx, etymology_text) in entry.etymology.iter().enumerate() {
            etymology_csv.serialize(EtymologyRow {
                csv_id,
                line_no: idx + 1,
                etymology_text,
            })?;
        }
    }

    entry_csv.flush()?;
    meaning_csv.flush()?;
    crossref_csv.flush()?;
    etymology_csv.flush()?;
    Ok(())
}

/// Output formats that can be requested together
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
    Yaml,
    Jsonl,
    Tables,
}

/// Write each requested format into `dir`, returning the files created
pub fn write_all(dir: &Path, formats: &[Format], entries: &[Entry]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for format in formats {
        match format {
            Format::Json => {
                let path = dir.join(JSON_FILE);
                write_json(create(&path)?, entries)?;
                written.push(path);
            }
            Format::Yaml => {
                let path = dir.join(YAML_FILE);
                write_yaml(create(&path)?, entries)?;
                written.push(path);
            }
            Format::Jsonl => {
                let path = dir.join(JSONL_FILE);
                write_jsonl(create(&path)?, entries)?;
                written.push(path);
            }
            Format::Tables => {
                let paths = [ENTRIES_CSV, MEANINGS_CSV, CROSS_REFERENCES_CSV, ETYMOLOGY_CSV].map(|f| dir.join(f));
                let writers = TableWriters {
                    entries: create(&paths[0])?,
                    meanings: create(&paths[1])?,
                    cross_references: create(&paths[2])?,
                    etymology: create(&paths[3])?,
                };
                write_tables(writers, entries)?;
                written.extend(paths);
            }
        }
    }

    for path in &written {
        info!(path = %path.display(), entries = entries.len(), "wrote output");
    }
    Ok(written)
}
