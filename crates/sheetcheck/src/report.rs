//! Issue categories and the grouped validation report.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Category a validation finding is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCategory {
    Header,
    Data,
    Settings,
    Filename,
    Slims,
    ParsingError,
    SlimsConnectionError,
}

impl IssueCategory {
    /// Display label, as rendered in reports.
    pub fn label(&self) -> &'static str {
        match self {
            IssueCategory::Header => "[Header]",
            IssueCategory::Data => "[Data]",
            IssueCategory::Settings => "[Settings]",
            IssueCategory::Filename => "Filename",
            IssueCategory::Slims => "SLIMS",
            IssueCategory::ParsingError => "Parsing Error",
            IssueCategory::SlimsConnectionError => "SLIMS Connection Error",
        }
    }
}

/// Grouped validation findings, built incrementally across validator stages.
///
/// A category with no findings is absent from the map; an empty report means
/// the sheet passed. Messages within a category keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct IssueReport {
    issues: IndexMap<IssueCategory, Vec<String>>,
}

impl IssueReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one finding under the given category.
    pub fn push(&mut self, category: IssueCategory, message: impl Into<String>) {
        self.issues.entry(category).or_default().push(message.into());
    }

    /// Findings filed under a category; empty slice if none.
    pub fn get(&self, category: IssueCategory) -> &[String] {
        self.issues
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True when no category holds any finding.
    pub fn is_clean(&self) -> bool {
        self.issues.values().all(Vec::is_empty)
    }

    /// Total number of findings across all categories.
    pub fn len(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    /// True when the report holds no findings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate categories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (IssueCategory, &[String])> {
        self.issues.iter().map(|(c, msgs)| (*c, msgs.as_slice()))
    }
}

impl Serialize for IssueReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.issues.len()))?;
        for (category, messages) in &self.issues {
            map.serialize_entry(category.label(), messages)?;
        }
        map.end()
    }
}
