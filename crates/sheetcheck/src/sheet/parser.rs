//! Sectioned sample-sheet parser.
//!
//! Sample sheets are INI-style sectioned text: `[Header]` and `[Settings]`
//! hold key/value lines, `[Reads]` holds bare values, and `[Data]` is a CSV
//! block with a field-name header row and one row per sample. Excel exports
//! pad section and key/value lines with trailing commas; those are tolerated,
//! as are CRLF line endings and a UTF-8 BOM.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::model::{SampleRecord, SampleSheet, SheetMetadata};
use crate::error::{Result, SheetcheckError};

/// A section header line, e.g. `[Data]` or `[Data],,,` after Excel.
static SECTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[([^\]\[]+)\],*\s*$").unwrap());

/// Parse a sample sheet from disk, returning the model and file metadata.
pub fn parse_file(path: impl AsRef<Path>) -> Result<(SampleSheet, SheetMetadata)> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| SheetcheckError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let hash = format!("sha256:{:x}", hasher.finalize());
    let size_bytes = bytes.len() as u64;

    let text = String::from_utf8(bytes).map_err(|_| SheetcheckError::SheetParse {
        message: format!("'{}' is not valid UTF-8 text", path.display()),
    })?;

    let sheet = parse_str(&text)?;
    let metadata = SheetMetadata::new(path.to_path_buf(), hash, size_bytes);
    Ok((sheet, metadata))
}

/// Parse sample-sheet text into the in-memory model.
pub fn parse_str(text: &str) -> Result<SampleSheet> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut sections: IndexMap<String, Vec<&str>> = IndexMap::new();
    let mut current: Option<String> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim_end_matches('\r');
        if let Some(caps) = SECTION_RE.captures(line.trim()) {
            let name = caps[1].trim().to_string();
            if sections.contains_key(&name) {
                return Err(SheetcheckError::SheetParse {
                    message: format!("section [{name}] appears more than once"),
                });
            }
            sections.insert(name.clone(), Vec::new());
            current = Some(name);
            continue;
        }
        if line.trim().trim_matches(',').is_empty() {
            continue;
        }
        let Some(name) = &current else {
            return Err(SheetcheckError::SheetParse {
                message: format!("content before the first section header: '{line}'"),
            });
        };
        if let Some(body) = sections.get_mut(name) {
            body.push(line);
        }
    }

    let mut sheet = SampleSheet::default();
    for (name, lines) in &sections {
        match name.as_str() {
            "Header" => sheet.header = parse_key_values("Header", lines)?,
            "Settings" => sheet.settings = parse_key_values("Settings", lines)?,
            "Reads" => sheet.reads = parse_reads(lines)?,
            "Data" => sheet.samples = parse_data(lines)?,
            // Unknown sections (e.g. [Manifests]) are carried past unchecked.
            _ => {}
        }
    }
    Ok(sheet)
}

fn section_reader(lines: &[&str], has_headers: bool) -> csv::Reader<std::io::Cursor<String>> {
    csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(std::io::Cursor::new(lines.join("\n")))
}

fn malformed(section: &str, err: &csv::Error) -> SheetcheckError {
    SheetcheckError::SheetParse {
        message: format!("[{section}] section is malformed: {err}"),
    }
}

/// Parse `Key,Value` lines; extra trailing fields from Excel padding are
/// dropped, later duplicates of a key win.
fn parse_key_values(section: &str, lines: &[&str]) -> Result<IndexMap<String, String>> {
    let mut map = IndexMap::new();
    let mut reader = section_reader(lines, false);
    for result in reader.records() {
        let record = result.map_err(|e| malformed(section, &e))?;
        let key = record.get(0).unwrap_or("").trim().to_string();
        if key.is_empty() {
            continue;
        }
        let value = record.get(1).unwrap_or("").trim().to_string();
        map.insert(key, value);
    }
    Ok(map)
}

/// Parse `[Reads]` entries: the first field of every non-empty line.
fn parse_reads(lines: &[&str]) -> Result<Vec<String>> {
    let mut reads = Vec::new();
    let mut reader = section_reader(lines, false);
    for result in reader.records() {
        let record = result.map_err(|e| malformed("Reads", &e))?;
        let value = record.get(0).unwrap_or("").trim();
        if !value.is_empty() {
            reads.push(value.to_string());
        }
    }
    Ok(reads)
}

/// Parse the `[Data]` CSV block: a field-name header row plus sample rows.
fn parse_data(lines: &[&str]) -> Result<Vec<SampleRecord>> {
    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = section_reader(lines, true);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed("Data", &e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(SheetcheckError::SheetParse {
            message: "[Data] section has no field-name header row".to_string(),
        });
    }

    let mut samples = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| malformed("Data", &e))?;
        let mut fields = IndexMap::new();
        for (position, name) in headers.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let value = record.get(position).unwrap_or("").trim().to_string();
            fields.insert(name.clone(), value);
        }
        // Rows that are entirely Excel padding are not samples.
        if fields.values().all(String::is_empty) {
            continue;
        }
        samples.push(SampleRecord::new(fields));
    }
    Ok(samples)
}
