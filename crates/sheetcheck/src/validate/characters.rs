//! Allowed-character enforcement per field.

use indexmap::{IndexMap, IndexSet};

use crate::report::{IssueCategory, IssueReport};
use crate::rules::CharacterRule;
use crate::sheet::SampleSheet;

/// Check configured fields against their allowed character classes.
///
/// Invalid characters are listed once each in first-seen order, and samples
/// sharing the same rendered violation text collapse into one grouped
/// message. The pass is deterministic and idempotent.
pub fn validate_characters(sheet: &SampleSheet, rules: &[CharacterRule], report: &mut IssueReport) {
    let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();

    for sample in &sheet.samples {
        for rule in rules {
            let value = sample.get(&rule.field).unwrap_or("").trim();
            if value.is_empty() {
                continue;
            }

            let mut invalid: IndexSet<char> = IndexSet::new();
            for found in rule.invalid.find_iter(value) {
                invalid.extend(found.as_str().chars());
            }
            if invalid.is_empty() {
                continue;
            }

            let formatted = invalid
                .iter()
                .map(|c| format!("'{c}'"))
                .collect::<Vec<_>>()
                .join(", ");
            let message = format!(
                "{} contains invalid characters: {}. Allowed characters: {}.",
                rule.field, formatted, rule.description
            );
            grouped
                .entry(message)
                .or_default()
                .push(format!("{}: {}", rule.field, value));
        }
    }

    for (message, samples) in &grouped {
        report.push(
            IssueCategory::Data,
            format!("{message}:\n\t{}", samples.join("\n\t")),
        );
    }
}
