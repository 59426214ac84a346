//! Required-section structural checks.

use crate::report::{IssueCategory, IssueReport};
use crate::rules::Section;
use crate::sheet::SampleSheet;

/// Check that every declared required section is present and non-empty.
///
/// All structural findings are filed under `[Header]`, matching the legacy
/// report layout.
pub fn validate_structure(sheet: &SampleSheet, required: &[Section], report: &mut IssueReport) {
    for section in required {
        let missing = match section {
            Section::Header => sheet.header.is_empty(),
            Section::Reads => sheet.reads.is_empty(),
            Section::Settings => sheet.settings.is_empty(),
            Section::Data => sheet.samples.is_empty(),
        };
        if missing {
            report.push(
                IssueCategory::Header,
                format!("[{}] section is missing or empty.", section.label()),
            );
        }
    }
}
