//! Parsed sample-sheet model and source metadata.

use std::path::PathBuf;

use indexmap::IndexMap;

/// Metadata about the sheet file, computed while parsing.
#[derive(Debug, Clone)]
pub struct SheetMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

impl SheetMetadata {
    /// Create metadata for a parsed sheet file.
    pub fn new(path: PathBuf, hash: String, size_bytes: u64) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
        }
    }
}

/// One `[Data]` row: field values keyed by the `[Data]` header row, in order.
#[derive(Debug, Clone, Default)]
pub struct SampleRecord {
    fields: IndexMap<String, String>,
}

impl SampleRecord {
    /// Create a record from parsed field values.
    pub fn new(fields: IndexMap<String, String>) -> Self {
        Self { fields }
    }

    /// Value of a field by name; `None` when the column is absent.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Value of a field, empty string when absent.
    fn get_or_empty(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    /// The `Sample_ID` field.
    pub fn sample_id(&self) -> &str {
        self.get_or_empty("Sample_ID")
    }

    /// The `Sample_Name` field.
    pub fn sample_name(&self) -> &str {
        self.get_or_empty("Sample_Name")
    }

    /// The `Description` field.
    pub fn description(&self) -> &str {
        self.get_or_empty("Description")
    }

    /// The first index sequence.
    pub fn index(&self) -> &str {
        self.get_or_empty("index")
    }

    /// The second index sequence.
    pub fn index2(&self) -> &str {
        self.get_or_empty("index2")
    }

    /// Field names in column order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Parsed sample sheet: header/settings key-values, reads, ordered samples.
///
/// Read-only to every validator stage; classification results are kept in a
/// separate structure keyed by sample position.
#[derive(Debug, Clone, Default)]
pub struct SampleSheet {
    /// `[Header]` key/value pairs.
    pub header: IndexMap<String, String>,
    /// `[Reads]` entries (cycle counts), presence-only for validation.
    pub reads: Vec<String>,
    /// `[Settings]` key/value pairs.
    pub settings: IndexMap<String, String>,
    /// `[Data]` rows in file order.
    pub samples: Vec<SampleRecord>,
}

impl SampleSheet {
    /// Number of samples in the `[Data]` section.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accessors() {
        let record = SampleRecord::new(IndexMap::from([
            ("Sample_ID".to_string(), "S001".to_string()),
            ("Sample_Name".to_string(), "S001".to_string()),
            ("Description".to_string(), "flt3-itd".to_string()),
        ]));

        assert_eq!(record.sample_id(), "S001");
        assert_eq!(record.sample_name(), "S001");
        assert_eq!(record.description(), "flt3-itd");
        assert_eq!(record.index(), "");
        assert_eq!(record.get("Missing"), None);
    }

    #[test]
    fn test_metadata_extracts_file_name() {
        let metadata = SheetMetadata::new(
            PathBuf::from("/tmp/uploads/SampleSheet.csv"),
            "sha256:abc".to_string(),
            42,
        );
        assert_eq!(metadata.file, "SampleSheet.csv");
        assert_eq!(metadata.size_bytes, 42);
    }
}
