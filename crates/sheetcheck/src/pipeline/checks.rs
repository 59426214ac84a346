//! Pipeline-specific rule checks, run after classification.
//!
//! Only samples with exactly one assigned pipeline take part; samples that
//! matched several pipelines are flagged and excluded (fail-closed), unknown
//! samples are skipped.

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};

use super::classifier::{PipelineAssignment, SheetClassification};
use crate::report::{IssueCategory, IssueReport};
use crate::rules::{FilenameRule, Matcher, PipelineRule, RuleSet};
use crate::sheet::{SampleRecord, SampleSheet, SheetMetadata};

/// Gender codes accepted in position 2 of the naming grammar.
const GENDER_CODES: [&str; 3] = ["M", "K", "O"];
/// Role codes accepted in position 5 of the naming grammar.
const ROLE_CODES: [&str; 5] = ["proband", "mor", "far", "tumor", "normal"];
/// Number of underscore-delimited parts the naming grammar requires.
const GRAMMAR_PARTS: usize = 6;

/// Run every pipeline-specific check over the classified samples.
pub fn validate_pipeline_rules(
    sheet: &SampleSheet,
    metadata: &SheetMetadata,
    rules: &RuleSet,
    classification: &SheetClassification,
    report: &mut IssueReport,
) {
    let mut missing_keyword: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut unmatched_ids: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut invalid_ids: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut invalid_names: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut filename_pipelines: IndexSet<String> = IndexSet::new();
    let mut settings_pipelines: IndexSet<String> = IndexSet::new();

    for (sample, sample_class) in sheet.samples.iter().zip(&classification.samples) {
        let pipeline = match &sample_class.assigned {
            PipelineAssignment::Multiple(_) => {
                report.push(
                    IssueCategory::Data,
                    format!(
                        "Sample_ID: {} - Assigned to multiple pipelines: {}. Please clarify the Description.",
                        sample.sample_id(),
                        sample_class.assigned.label()
                    ),
                );
                continue;
            }
            PipelineAssignment::Unknown => continue,
            PipelineAssignment::Single(name) => name.as_str(),
        };
        let Some(rule) = rules.pipelines.get(pipeline) else {
            continue;
        };

        if rule.description_check && !sample_class.is_typo_assigned(pipeline) {
            check_keyword_presence(sample, pipeline, rule, &mut missing_keyword);
        }

        if !rule.sample_id_patterns.is_empty() {
            check_id_date(sample, pipeline, rule, sheet, &mut unmatched_ids, report);
        }

        if rule.enforce_id_and_name {
            if let Matcher::SampleIdRegex { regex } = &rule.matcher {
                if !regex.is_match(sample.sample_id()) {
                    invalid_ids
                        .entry(pipeline.to_string())
                        .or_default()
                        .push(format!("Sample_ID: {}", sample.sample_id()));
                }
                if !regex.is_match(sample.sample_name()) {
                    invalid_names
                        .entry(pipeline.to_string())
                        .or_default()
                        .push(format!("Sample_Name: {}", sample.sample_name()));
                }
            }
        }

        if rule.description_grammar {
            check_description_grammar(sample, pipeline, report);
        }

        if rule.filename.is_some() {
            filename_pipelines.insert(pipeline.to_string());
        }
        if !rule.required_settings.is_empty() {
            settings_pipelines.insert(pipeline.to_string());
        }
    }

    for (pipeline, samples) in &missing_keyword {
        report.push(
            IssueCategory::Data,
            format!(
                "Description does not contain required keyword(s) for pipeline '{pipeline}':\n\t{}",
                samples.join("\n\t")
            ),
        );
    }

    for (pipeline, ids) in &unmatched_ids {
        let formats = rules
            .pipelines
            .get(pipeline)
            .map(|rule| rule.sample_id_display_patterns.join(", "))
            .unwrap_or_default();
        report.push(
            IssueCategory::Data,
            format!(
                "Sample_ID does not match any required pattern for pipeline '{pipeline}'. Expected formats: {formats}:\n\t{}",
                ids.join("\n\t")
            ),
        );
    }

    for (pipeline, ids) in &invalid_ids {
        report.push(
            IssueCategory::Data,
            format!(
                "Sample_ID does not match the required pattern for pipeline '{pipeline}'. Expected format: '{}':\n\t{}",
                format_hint(rules, pipeline),
                ids.join("\n\t")
            ),
        );
    }
    for (pipeline, names) in &invalid_names {
        report.push(
            IssueCategory::Data,
            format!(
                "Sample_Name does not match the required pattern for pipeline '{pipeline}'. Expected format: '{}':\n\t{}",
                format_hint(rules, pipeline),
                names.join("\n\t")
            ),
        );
    }

    if !classification.typo_suggestions.is_empty() {
        let lines: Vec<String> = classification
            .typo_suggestions
            .iter()
            .map(|message| format!("\t{message}"))
            .collect();
        report.push(
            IssueCategory::Data,
            format!("Possible typo in Description:\n{}", lines.join("\n")),
        );
    }

    for pipeline in &filename_pipelines {
        if let Some(rule) = rules.pipelines.get(pipeline) {
            check_filename(pipeline, rule, metadata, report);
        }
    }

    for pipeline in &settings_pipelines {
        if let Some(rule) = rules.pipelines.get(pipeline) {
            check_required_settings(pipeline, rule, sheet, report);
        }
    }
}

fn format_hint(rules: &RuleSet, pipeline: &str) -> String {
    rules
        .pipelines
        .get(pipeline)
        .and_then(|rule| rule.id_format_hint.clone())
        .unwrap_or_default()
}

/// Confirm that at least one real keyword is present in the description.
fn check_keyword_presence(
    sample: &SampleRecord,
    pipeline: &str,
    rule: &PipelineRule,
    missing_keyword: &mut IndexMap<String, Vec<String>>,
) {
    let Matcher::Keyword { keywords, .. } = &rule.matcher else {
        return;
    };
    let description = sample.description();
    let lowered = description.to_lowercase();
    let present = keywords
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()));
    if !present {
        missing_keyword
            .entry(pipeline.to_string())
            .or_default()
            .push(format!(
                "Sample_ID: {}, Description: {}",
                sample.sample_id(),
                description
            ));
    }
}

/// Check the Sample_ID against the configured patterns and compare the
/// captured date with the run date from the `[Header]` Date field.
fn check_id_date(
    sample: &SampleRecord,
    pipeline: &str,
    rule: &PipelineRule,
    sheet: &SampleSheet,
    unmatched_ids: &mut IndexMap<String, Vec<String>>,
    report: &mut IssueReport,
) {
    let sample_id = sample.sample_id();

    // First matching pattern wins, tried in declared order.
    let id_date = rule.sample_id_patterns.iter().find_map(|pattern| {
        pattern
            .captures(sample_id)
            .and_then(|caps| caps.get(1))
            .map(|group| group.as_str().to_string())
    });
    let Some(id_date) = id_date else {
        unmatched_ids
            .entry(pipeline.to_string())
            .or_default()
            .push(format!("Sample_ID: {sample_id}"));
        return;
    };

    let header_date = sheet.header.get("Date").map(String::as_str).unwrap_or("");
    match NaiveDate::parse_from_str(header_date.trim(), "%Y-%m-%d") {
        Ok(date) => {
            let expected = date.format("%y%m%d").to_string();
            if id_date != expected {
                report.push(
                    IssueCategory::Data,
                    format!(
                        "Sample_ID: {sample_id} - date '{id_date}' does not match the run date '{expected}' from the [Header] Date field."
                    ),
                );
            }
        }
        Err(_) => {
            report.push(
                IssueCategory::Data,
                format!(
                    "Sample_ID: {sample_id} - cannot validate the date in Sample_ID, the [Header] Date value '{header_date}' is not a valid YYYY-MM-DD date."
                ),
            );
        }
    }
}

/// Validate the 6-part underscore naming grammar on the description.
///
/// A wrong part count short-circuits the per-part checks for the sample.
fn check_description_grammar(sample: &SampleRecord, pipeline: &str, report: &mut IssueReport) {
    let description = sample.description();
    let parts: Vec<&str> = description.split('_').collect();
    if parts.len() != GRAMMAR_PARTS {
        report.push(
            IssueCategory::Data,
            format!(
                "Sample_ID: {} - Description '{}' for pipeline '{}' must have exactly {} underscore-separated parts, found {}.",
                sample.sample_id(),
                description,
                pipeline,
                GRAMMAR_PARTS,
                parts.len()
            ),
        );
        return;
    }

    let gender = parts[1].trim();
    if !GENDER_CODES.iter().any(|code| gender.eq_ignore_ascii_case(code)) {
        report.push(
            IssueCategory::Data,
            format!(
                "Sample_ID: {} - gender code '{}' in Description is not one of {}.",
                sample.sample_id(),
                gender,
                GENDER_CODES.join(", ")
            ),
        );
    }

    let pcr = parts[2].trim();
    if !pcr.is_empty() && !(pcr.len() == 2 && pcr.chars().all(|c| c.is_ascii_digit())) {
        report.push(
            IssueCategory::Data,
            format!(
                "Sample_ID: {} - PCR cycle flag '{}' in Description must be two digits or blank.",
                sample.sample_id(),
                pcr
            ),
        );
    }

    let role = parts[4].trim();
    if !ROLE_CODES.iter().any(|code| role.eq_ignore_ascii_case(code)) {
        report.push(
            IssueCategory::Data,
            format!(
                "Sample_ID: {} - role code '{}' in Description is not one of {}.",
                sample.sample_id(),
                role,
                ROLE_CODES.join(", ")
            ),
        );
    }
}

/// Check the staged file name against the pipeline's filename convention.
fn check_filename(
    pipeline: &str,
    rule: &PipelineRule,
    metadata: &SheetMetadata,
    report: &mut IssueReport,
) {
    match &rule.filename {
        Some(FilenameRule::Exact { name }) => {
            if metadata.file != *name {
                report.push(
                    IssueCategory::Filename,
                    format!(
                        "For '{pipeline}' pipeline, the samplesheet must be named '{name}', but got '{}'.",
                        metadata.file
                    ),
                );
            }
        }
        Some(FilenameRule::Marker { contains, rejects }) => {
            let lowered = metadata.file.to_lowercase();
            if !lowered.contains(&contains.to_lowercase()) {
                report.push(
                    IssueCategory::Filename,
                    format!(
                        "For '{pipeline}' pipeline, the samplesheet filename must contain '{contains}', but got '{}'.",
                        metadata.file
                    ),
                );
            }
            if let Some(rejects) = rejects {
                if lowered.contains(&rejects.to_lowercase()) {
                    report.push(
                        IssueCategory::Filename,
                        format!(
                            "For '{pipeline}' pipeline, the samplesheet filename must not contain '{rejects}', but got '{}'.",
                            metadata.file
                        ),
                    );
                }
            }
        }
        None => {}
    }
}

/// Check that every settings key the pipeline depends on is present.
fn check_required_settings(
    pipeline: &str,
    rule: &PipelineRule,
    sheet: &SampleSheet,
    report: &mut IssueReport,
) {
    let missing: Vec<&str> = rule
        .required_settings
        .iter()
        .filter(|key| {
            sheet
                .settings
                .get(key.as_str())
                .is_none_or(|value| value.trim().is_empty())
        })
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        report.push(
            IssueCategory::Settings,
            format!(
                "Missing Fields required for the '{pipeline}' pipeline:\n\t{}",
                missing.join("\n\t")
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineClassifier;
    use crate::sheet::parse_str;
    use std::path::PathBuf;

    fn metadata(file: &str) -> SheetMetadata {
        SheetMetadata::new(PathBuf::from(file), "sha256:test".to_string(), 0)
    }

    fn run(sheet_text: &str, rules_json: &str, file: &str) -> IssueReport {
        let sheet = parse_str(sheet_text).unwrap();
        let rules = RuleSet::from_json(rules_json).unwrap();
        let classification = PipelineClassifier::new().classify_all(&sheet.samples, &rules);
        let mut report = IssueReport::new();
        validate_pipeline_rules(&sheet, &metadata(file), &rules, &classification, &mut report);
        report
    }

    const DATE_RULES: &str = r#"{
        "pipelines": {
            "GMS-Myeloid": {
                "type": "keyword",
                "keywords": ["myeloid"],
                "sample_id_patterns": ["D[A-Z](\\d{6})"],
                "sample_id_display_patterns": ["D<letter><YYMMDD>"]
            }
        }
    }"#;

    #[test]
    fn test_matching_id_date_is_clean() {
        let report = run(
            "[Header]\nDate,2024-01-05\n[Data]\nSample_ID,Sample_Name,Description\nDA240105,DA240105,myeloid panel\n",
            DATE_RULES,
            "SampleSheet.csv",
        );
        assert!(report.is_clean());
    }

    #[test]
    fn test_mismatching_id_date_is_reported() {
        let report = run(
            "[Header]\nDate,2024-01-05\n[Data]\nSample_ID,Sample_Name,Description\nDA240106,DA240106,myeloid panel\n",
            DATE_RULES,
            "SampleSheet.csv",
        );
        let data = report.get(IssueCategory::Data);
        assert_eq!(data.len(), 1);
        assert!(data[0].contains("'240106'"));
        assert!(data[0].contains("'240105'"));
    }

    #[test]
    fn test_invalid_header_date_is_reported() {
        let report = run(
            "[Header]\nDate,sometime\n[Data]\nSample_ID,Sample_Name,Description\nDA240105,DA240105,myeloid panel\n",
            DATE_RULES,
            "SampleSheet.csv",
        );
        let data = report.get(IssueCategory::Data);
        assert_eq!(data.len(), 1);
        assert!(data[0].contains("cannot validate"));
    }

    #[test]
    fn test_unmatched_id_grouped_with_display_patterns() {
        let report = run(
            "[Header]\nDate,2024-01-05\n[Data]\nSample_ID,Sample_Name,Description\nBAD-1,BAD-1,myeloid panel\nBAD-2,BAD-2,myeloid panel\n",
            DATE_RULES,
            "SampleSheet.csv",
        );
        let data = report.get(IssueCategory::Data);
        assert_eq!(data.len(), 1);
        assert!(data[0].contains("D<letter><YYMMDD>"));
        assert!(data[0].contains("Sample_ID: BAD-1"));
        assert!(data[0].contains("Sample_ID: BAD-2"));
    }

    #[test]
    fn test_strict_id_and_name_grouped_per_direction() {
        let report = run(
            "[Data]\nSample_ID,Sample_Name,Description\nDA23123456,WRONG,\nNOPE,DA23123456,\n",
            r#"{"pipelines": {"COVID": {
                "type": "regex",
                "sample_id_regex": "D[A-Z]2[0-4]\\d{6}",
                "enforce_id_and_name": true,
                "id_format_hint": "D[A-Z]2[0-4]XXXXXX"
            }}}"#,
            "SampleSheet.csv",
        );
        let data = report.get(IssueCategory::Data);
        // One sample failed the name check, the other never classified
        // (regex matcher drives assignment).
        assert_eq!(data.len(), 1);
        assert!(data[0].contains("Sample_Name does not match"));
        assert!(data[0].contains("D[A-Z]2[0-4]XXXXXX"));
    }

    #[test]
    fn test_description_grammar() {
        let report = run(
            "[Data]\nSample_ID,Sample_Name,Description\nS1,S1,WOPR_M_02_NA128_proband_X\nS2,S2,WOPR_Q_2_NA128_chef_X\nS3,S3,WOPR_M_02\n",
            r#"{"pipelines": {"WOPR": {"type": "custom", "function": "wopr_naming", "description_grammar": true}}}"#,
            "SampleSheet.csv",
        );
        let data = report.get(IssueCategory::Data);
        // S1 clean; S2 violates gender, PCR and role; S3 has a wrong part
        // count which short-circuits its other checks.
        assert_eq!(data.len(), 4);
        assert!(data.iter().any(|m| m.contains("gender code 'Q'")));
        assert!(data.iter().any(|m| m.contains("PCR cycle flag '2'")));
        assert!(data.iter().any(|m| m.contains("role code 'chef'")));
        assert!(data.iter().any(|m| m.contains("exactly 6 underscore-separated parts")));
    }

    #[test]
    fn test_exact_filename_rule() {
        let rules = r#"{"pipelines": {"GMS-Myeloid": {
            "type": "keyword",
            "keywords": ["myeloid"],
            "filename": {"kind": "exact", "name": "SampleSheet.csv"}
        }}}"#;
        let sheet = "[Data]\nSample_ID,Sample_Name,Description\nS1,S1,myeloid panel\n";

        let bad = run(sheet, rules, "renamed.csv");
        assert_eq!(bad.get(IssueCategory::Filename).len(), 1);
        assert!(bad.get(IssueCategory::Filename)[0].contains("must be named 'SampleSheet.csv'"));

        let good = run(sheet, rules, "SampleSheet.csv");
        assert!(good.get(IssueCategory::Filename).is_empty());
    }

    #[test]
    fn test_marker_filename_rule() {
        let rules = r#"{"pipelines": {"Somatic": {
            "type": "custom",
            "function": "somatic_naming",
            "filename": {"kind": "marker", "contains": "somatic", "rejects": "original"}
        }}}"#;
        let sheet = "[Data]\nSample_ID,Sample_Name,Description\nS1,S1,Somatic_M_02_NA128_tumor_X\n";

        let good = run(sheet, rules, "Somatic_run42.csv");
        assert!(good.get(IssueCategory::Filename).is_empty());

        let bad = run(sheet, rules, "Original_run42.csv");
        let filename = bad.get(IssueCategory::Filename);
        assert_eq!(filename.len(), 2);
        assert!(filename[0].contains("must contain 'somatic'"));
        assert!(filename[1].contains("must not contain 'original'"));
    }

    #[test]
    fn test_required_settings_checked_once_per_pipeline() {
        let report = run(
            "[Settings]\nAdapter,CTGTCTCT\n[Data]\nSample_ID,Sample_Name,Description\nS1,S1,myeloid panel\nS2,S2,myeloid panel\n",
            r#"{"pipelines": {"GMS-Myeloid": {
                "type": "keyword",
                "keywords": ["myeloid"],
                "required_settings": ["Adapter", "AdapterRead2", "Read1UMILength"]
            }}}"#,
            "SampleSheet.csv",
        );
        let settings = report.get(IssueCategory::Settings);
        assert_eq!(settings.len(), 1);
        assert!(settings[0].contains("AdapterRead2"));
        assert!(settings[0].contains("Read1UMILength"));
        assert!(!settings[0].contains("Adapter\n"));
    }

    #[test]
    fn test_multiple_pipelines_excluded_from_checks() {
        let report = run(
            "[Data]\nSample_ID,Sample_Name,Description\nS1,S1,alpha beta\n",
            r#"{"pipelines": {
                "A": {"type": "keyword", "keywords": ["alpha"], "required_settings": ["Adapter"]},
                "B": {"type": "keyword", "keywords": ["beta"], "filename": {"kind": "exact", "name": "SampleSheet.csv"}}
            }}"#,
            "renamed.csv",
        );

        let data = report.get(IssueCategory::Data);
        assert_eq!(data.len(), 1);
        assert!(data[0].contains("Multiple Pipelines: A, B"));
        // Ambiguous samples trigger neither settings nor filename checks.
        assert!(report.get(IssueCategory::Settings).is_empty());
        assert!(report.get(IssueCategory::Filename).is_empty());
    }

    #[test]
    fn test_keyword_confirmation_skips_typo_assigned() {
        let report = run(
            "[Data]\nSample_ID,Sample_Name,Description\nS1,S1,flt3itd\n",
            r#"{"pipelines": {"FLT3-ITD": {
                "type": "keyword",
                "keywords": ["FLT3-ITD"],
                "fuzzy": true,
                "description_check": true
            }}}"#,
            "SampleSheet.csv",
        );

        let data = report.get(IssueCategory::Data);
        // Only the aggregated typo suggestion, no missing-keyword message.
        assert_eq!(data.len(), 1);
        assert!(data[0].contains("Possible typo in Description"));
        assert!(data[0].contains("Did you mean"));
    }
}
