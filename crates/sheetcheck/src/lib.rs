//! Sheetcheck: rule-driven validation for sequencing sample sheets.
//!
//! Sheetcheck parses a sectioned sample sheet (`[Header]`, `[Reads]`,
//! `[Settings]`, `[Data]`), evaluates a configurable layered rule set
//! (structure, required fields, allowed characters, pipeline classification
//! with fuzzy typo detection, pipeline-specific consistency checks) and
//! produces a grouped, human-readable issue report. An optional terminal
//! phase cross-checks every sample against the SLIMS LIMS for pre-existing
//! sequencing data.
//!
//! # Core Principles
//!
//! - **Pure analysis**: the sheet is never mutated or persisted.
//! - **Collect and continue**: content checks never fail, they only append
//!   findings; only the parse/config/connection boundaries fail fast.
//!
//! # Example
//!
//! ```no_run
//! use sheetcheck::{RuleSet, Validator};
//!
//! let rules = RuleSet::load("validation_rules.json").unwrap();
//! let report = Validator::new(rules).validate_file("SampleSheet.csv");
//!
//! if report.is_clean() {
//!     println!("Samplesheet validation passed! No issues found.");
//! }
//! ```

pub mod error;
pub mod lims;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod sheet;
pub mod validate;

pub use error::{Result, SheetcheckError};
pub use lims::{LimsClient, MockLims, SlimsClient, SlimsCredentials};
pub use pipeline::{
    Classification, PipelineAssignment, PipelineClassifier, PredicateRegistry,
    SheetClassification,
};
pub use report::{IssueCategory, IssueReport};
pub use rules::{Matcher, PipelineRule, RuleSet, Section};
pub use sheet::{SampleRecord, SampleSheet, SheetMetadata};
pub use validate::{validate_samplesheet, LimsCheck, Validator};
