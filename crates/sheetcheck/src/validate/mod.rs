//! Validation engine: orchestrates all checks over one sample sheet.

mod characters;
mod fields;
mod structure;

pub use characters::validate_characters;
pub use fields::validate_fields;
pub use structure::validate_structure;

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::lims::{LimsClient, SlimsClient, SlimsCredentials};
use crate::pipeline::{validate_pipeline_rules, PipelineClassifier, PredicateRegistry};
use crate::report::{IssueCategory, IssueReport};
use crate::rules::RuleSet;
use crate::sheet::{self, SampleSheet, SheetMetadata};

/// How the terminal LIMS duplicate check is performed.
#[derive(Clone, Default)]
pub enum LimsCheck {
    /// Skip the LIMS phase entirely.
    #[default]
    Disabled,
    /// Connect per run with credentials from the environment; a connection
    /// failure is filed under its own category and the phase is skipped.
    FromEnv,
    /// Use an already-connected client (tests inject a mock here).
    Client(Arc<dyn LimsClient>),
}

/// The validation engine.
///
/// Owns the immutable rule set and the classifier; one instance can be
/// reused across runs, each run's state (sheet, report) is private to the
/// call.
pub struct Validator {
    rules: RuleSet,
    classifier: PipelineClassifier,
    lims: LimsCheck,
}

impl Validator {
    /// Create a validator with the built-in predicate registry and no LIMS
    /// phase.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            classifier: PipelineClassifier::new(),
            lims: LimsCheck::Disabled,
        }
    }

    /// Replace the predicate registry used by `custom` pipeline rules.
    pub fn with_registry(mut self, registry: PredicateRegistry) -> Self {
        self.classifier = self.classifier.with_registry(registry);
        self
    }

    /// Set the similarity cutoff used for fuzzy typo detection.
    pub fn with_fuzzy_cutoff(mut self, cutoff: f64) -> Self {
        self.classifier = self.classifier.with_cutoff(cutoff);
        self
    }

    /// Run the LIMS duplicate check with an already-connected client.
    pub fn with_lims(mut self, client: impl LimsClient + 'static) -> Self {
        self.lims = LimsCheck::Client(Arc::new(client));
        self
    }

    /// Connect to SLIMS from the environment at validation time.
    pub fn with_env_lims(mut self) -> Self {
        self.lims = LimsCheck::FromEnv;
        self
    }

    /// Validate one sample-sheet file and return the grouped report.
    ///
    /// A parse failure produces a single `Parsing Error` entry and returns
    /// immediately, with no partial results. Every later stage only appends
    /// findings.
    pub fn validate_file(&self, path: impl AsRef<Path>) -> IssueReport {
        let mut report = IssueReport::new();

        let (sheet, metadata) = match sheet::parse_file(path.as_ref()) {
            Ok(parsed) => parsed,
            Err(err) => {
                report.push(
                    IssueCategory::ParsingError,
                    format!(
                        "{err}. Note: parsing problems are often caused by unexpected or invisible characters in the sheet."
                    ),
                );
                return report;
            }
        };

        self.validate_sheet(&sheet, &metadata, &mut report);
        self.run_lims_phase(&sheet, &mut report);
        report
    }

    /// Content validation over an already-parsed sheet.
    fn validate_sheet(
        &self,
        sheet: &SampleSheet,
        metadata: &SheetMetadata,
        report: &mut IssueReport,
    ) {
        validate_structure(sheet, &self.rules.required_sections, report);
        validate_fields(sheet, &self.rules, report);
        validate_characters(sheet, &self.rules.character_rules, report);

        if !self.rules.pipelines.is_empty() {
            let classification = self.classifier.classify_all(&sheet.samples, &self.rules);
            validate_pipeline_rules(sheet, metadata, &self.rules, &classification, report);
        }
    }

    /// Terminal phase: ask the LIMS whether any sample already has
    /// sequencing data. Lookups run in sheet order; a positive for a sample
    /// adds it to one aggregated message.
    fn run_lims_phase(&self, sheet: &SampleSheet, report: &mut IssueReport) {
        let client: Arc<dyn LimsClient> = match &self.lims {
            LimsCheck::Disabled => return,
            LimsCheck::Client(client) => Arc::clone(client),
            LimsCheck::FromEnv => {
                match SlimsCredentials::from_env().and_then(SlimsClient::connect) {
                    Ok(client) => Arc::new(client),
                    Err(err) => {
                        report.push(IssueCategory::SlimsConnectionError, err.to_string());
                        return;
                    }
                }
            }
        };

        let existing: Vec<&str> = sheet
            .samples
            .iter()
            .map(|sample| sample.sample_id())
            .filter(|sample_id| client.exists(sample_id))
            .collect();
        if !existing.is_empty() {
            report.push(
                IssueCategory::Slims,
                format!(
                    "Sample_ID already has a fastq object in SLIMS:\n\t{}",
                    existing.join("\n\t")
                ),
            );
        }
    }
}

/// Load rules and validate one sheet in a single call.
pub fn validate_samplesheet(
    sheet_path: impl AsRef<Path>,
    rules_path: impl AsRef<Path>,
) -> Result<IssueReport> {
    let rules = RuleSet::load(rules_path)?;
    Ok(Validator::new(rules).validate_file(sheet_path))
}
