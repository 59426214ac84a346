//! Property-based tests for classification and character validation.

use indexmap::IndexMap;
use proptest::prelude::*;

use sheetcheck::{
    IssueCategory, IssueReport, PipelineAssignment, PipelineClassifier, RuleSet, SampleRecord,
    SampleSheet,
};

fn record(sample_id: &str, description: &str) -> SampleRecord {
    SampleRecord::new(IndexMap::from([
        ("Sample_ID".to_string(), sample_id.to_string()),
        ("Sample_Name".to_string(), sample_id.to_string()),
        ("Description".to_string(), description.to_string()),
    ]))
}

fn classifier_rules() -> RuleSet {
    RuleSet::from_json(
        r#"{"pipelines": {
            "FLT3-ITD": {"type": "keyword", "keywords": ["FLT3-ITD"], "fuzzy": true},
            "NPM1": {"type": "keyword", "keywords": ["NPM1"], "fuzzy": true},
            "COVID": {"type": "regex", "sample_id_regex": "D[A-Z]2[0-4]\\d{6}"}
        }}"#,
    )
    .expect("rules compile")
}

proptest! {
    /// Classification is total: every sample ends with exactly one terminal
    /// label, whatever its description and identifier look like.
    #[test]
    fn classification_is_total(
        sample_id in "[ -~]{0,16}",
        description in "[ -~]{0,32}",
    ) {
        let rules = classifier_rules();
        let samples = [record(&sample_id, &description)];
        let run = PipelineClassifier::new().classify_all(&samples, &rules);

        prop_assert_eq!(run.samples.len(), 1);
        let assignment = &run.samples[0].assigned;
        match assignment {
            PipelineAssignment::Single(name) => prop_assert!(rules.pipelines.contains_key(name)),
            PipelineAssignment::Multiple(names) => prop_assert!(names.len() > 1),
            PipelineAssignment::Unknown => {}
        }
        prop_assert!(!assignment.label().is_empty());
    }

    /// An exact keyword substring match never produces a typo flag for that
    /// pipeline.
    #[test]
    fn exact_match_never_flags_typo(prefix in "[a-z ]{0,8}", suffix in "[a-z ]{0,8}") {
        let rules = classifier_rules();
        let description = format!("{prefix}flt3-itd{suffix}");
        let samples = [record("S1", &description)];
        let run = PipelineClassifier::new().classify_all(&samples, &rules);

        prop_assert!(!run.samples[0].is_typo_assigned("FLT3-ITD"));
    }

    /// Character validation is idempotent: two runs over the same model
    /// produce byte-identical grouped messages.
    #[test]
    fn character_validation_is_idempotent(values in prop::collection::vec("[ -~]{1,12}", 1..6)) {
        let rules = RuleSet::from_json(
            r#"{"allowed_characters": {
                "Sample_ID": {"pattern": "a-zA-Z0-9\\-_", "description": "letters, digits, hyphen, underscore"}
            }}"#,
        ).expect("rules compile");

        let mut sheet = SampleSheet::default();
        for (i, value) in values.iter().enumerate() {
            sheet.samples.push(record(&format!("{value}{i}"), ""));
        }

        let mut first = IssueReport::new();
        sheetcheck::validate::validate_characters(&sheet, &rules.character_rules, &mut first);
        let mut second = IssueReport::new();
        sheetcheck::validate::validate_characters(&sheet, &rules.character_rules, &mut second);

        prop_assert_eq!(
            first.get(IssueCategory::Data),
            second.get(IssueCategory::Data)
        );
    }
}
