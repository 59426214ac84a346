//! Required-field, identity and index checks.

use indexmap::IndexMap;

use crate::report::{IssueCategory, IssueReport};
use crate::rules::RuleSet;
use crate::sheet::{SampleRecord, SampleSheet};

/// Sample_ID for messages, falling back to the 1-based sheet position.
fn display_id(sample: &SampleRecord, position: usize) -> String {
    let id = sample.sample_id();
    if id.trim().is_empty() {
        format!("Sample {}", position + 1)
    } else {
        id.to_string()
    }
}

/// Check required fields, the Sample_ID/Sample_Name identity rule and the
/// index/index2 distinctness rule.
pub fn validate_fields(sheet: &SampleSheet, rules: &RuleSet, report: &mut IssueReport) {
    // Required [Header] fields, one combined message.
    let missing_header: Vec<String> = rules
        .required_header_fields
        .iter()
        .filter(|field| {
            sheet
                .header
                .get(field.as_str())
                .is_none_or(|value| value.trim().is_empty())
        })
        .map(|field| format!("'{field}' is missing or empty."))
        .collect();
    if !missing_header.is_empty() {
        report.push(
            IssueCategory::Header,
            format!("Missing Fields:\n\t{}", missing_header.join("\n\t")),
        );
    }

    // Required [Data] fields, offending samples grouped per field.
    let mut missing_by_field: IndexMap<&str, Vec<String>> = IndexMap::new();
    for (position, sample) in sheet.samples.iter().enumerate() {
        for field in &rules.required_data_fields {
            let blank = sample
                .get(field)
                .is_none_or(|value| value.trim().is_empty());
            if blank {
                missing_by_field
                    .entry(field.as_str())
                    .or_default()
                    .push(display_id(sample, position));
            }
        }
    }
    for (field, sample_ids) in &missing_by_field {
        report.push(
            IssueCategory::Data,
            format!(
                "Missing or empty required field '{field}':\n\t{}",
                sample_ids.join("\n\t")
            ),
        );
    }

    // Sample_ID must equal Sample_Name, all mismatches in one message.
    let mismatches: Vec<String> = sheet
        .samples
        .iter()
        .filter(|sample| sample.sample_id() != sample.sample_name())
        .map(|sample| {
            format!(
                "Sample_ID: {}, Sample_Name: {}",
                sample.sample_id(),
                sample.sample_name()
            )
        })
        .collect();
    if !mismatches.is_empty() {
        report.push(
            IssueCategory::Data,
            format!(
                "Sample_ID does not match Sample_Name. Both should be identical:\n\t{}",
                mismatches.join("\n\t")
            ),
        );
    }

    // Dual indexes must differ when both are set.
    for (position, sample) in sheet.samples.iter().enumerate() {
        let index = sample.index().trim();
        let index2 = sample.index2().trim();
        if !index.is_empty() && index == index2 {
            report.push(
                IssueCategory::Data,
                format!(
                    "index and index2 are identical for Sample_ID: {}: both are '{index}'. Dual indexes must differ.",
                    display_id(sample, position)
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;
    use crate::sheet::parse_str;

    fn rules() -> RuleSet {
        RuleSet::from_json(
            r#"{"required_fields": {
                "Header": ["Date", "Investigator Name"],
                "Data": ["Sample_ID", "Description"]
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_complete_sheet_is_clean() {
        let sheet = parse_str(
            "[Header]\nDate,2024-01-05\nInvestigator Name,LJ\n[Data]\nSample_ID,Sample_Name,Description\nS1,S1,panel\n",
        )
        .unwrap();
        let mut report = IssueReport::new();
        validate_fields(&sheet, &rules(), &mut report);
        assert!(report.is_clean());
    }

    #[test]
    fn test_missing_header_fields_combined() {
        let sheet = parse_str("[Header]\nDate, \n[Data]\nSample_ID,Sample_Name,Description\nS1,S1,panel\n")
            .unwrap();
        let mut report = IssueReport::new();
        validate_fields(&sheet, &rules(), &mut report);

        let header = report.get(IssueCategory::Header);
        assert_eq!(header.len(), 1);
        assert!(header[0].starts_with("Missing Fields:"));
        assert!(header[0].contains("'Date' is missing or empty."));
        assert!(header[0].contains("'Investigator Name' is missing or empty."));
    }

    #[test]
    fn test_missing_data_fields_grouped_per_field() {
        let sheet = parse_str(
            "[Header]\nDate,2024-01-05\nInvestigator Name,LJ\n[Data]\nSample_ID,Sample_Name,Description\nS1,S1,\nS2,S2,\n,,panel\n",
        )
        .unwrap();
        let mut report = IssueReport::new();
        validate_fields(&sheet, &rules(), &mut report);

        let data = report.get(IssueCategory::Data);
        let description_message = data
            .iter()
            .find(|m| m.contains("'Description'"))
            .expect("grouped Description message");
        assert!(description_message.contains("S1"));
        assert!(description_message.contains("S2"));
        // The third sample has no Sample_ID, so it reports by position.
        let id_message = data
            .iter()
            .find(|m| m.contains("'Sample_ID'"))
            .expect("grouped Sample_ID message");
        assert!(id_message.contains("Sample 3"));
    }

    #[test]
    fn test_identity_mismatch_single_message() {
        let sheet = parse_str(
            "[Data]\nSample_ID,Sample_Name,Description\nS1,S1-renamed,panel\nS2,S2,panel\nS3,other,panel\n",
        )
        .unwrap();
        let mut report = IssueReport::new();
        validate_fields(&sheet, &RuleSet::default(), &mut report);

        let data = report.get(IssueCategory::Data);
        assert_eq!(data.len(), 1);
        assert!(data[0].contains("Sample_ID: S1, Sample_Name: S1-renamed"));
        assert!(data[0].contains("Sample_ID: S3, Sample_Name: other"));
        assert!(!data[0].contains("Sample_ID: S2,"));
    }

    #[test]
    fn test_identical_indexes_one_message_per_sample() {
        let sheet = parse_str(
            "[Data]\nSample_ID,Sample_Name,index,index2\nS1,S1,ATTACTCG,ATTACTCG\nS2,S2,ATTACTCG,TATAGCCT\nS3,S3,GGCC,GGCC\n",
        )
        .unwrap();
        let mut report = IssueReport::new();
        validate_fields(&sheet, &RuleSet::default(), &mut report);

        let data = report.get(IssueCategory::Data);
        assert_eq!(data.len(), 2);
        assert!(data[0].contains("Sample_ID: S1"));
        assert!(data[1].contains("Sample_ID: S3"));
    }

    #[test]
    fn test_blank_indexes_are_not_duplicates() {
        let sheet =
            parse_str("[Data]\nSample_ID,Sample_Name,index,index2\nS1,S1,,\n").unwrap();
        let mut report = IssueReport::new();
        validate_fields(&sheet, &RuleSet::default(), &mut report);
        assert!(report.is_clean());
    }
}
