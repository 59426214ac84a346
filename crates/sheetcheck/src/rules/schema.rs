//! On-disk schema for the validation-rules document.
//!
//! The rules file is a JSON document; key names follow the legacy
//! configuration layout (`required_sections`, `required_fields`,
//! `allowed_characters`, `pipelines`). Absent keys mean "no checks of that
//! kind run" — no defaults are injected here.

use indexmap::IndexMap;
use serde::Deserialize;

/// Root of the rules document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesDoc {
    #[serde(default)]
    pub required_sections: Vec<String>,
    #[serde(default)]
    pub required_fields: RequiredFieldsDoc,
    #[serde(default)]
    pub allowed_characters: IndexMap<String, CharacterRuleDoc>,
    #[serde(default)]
    pub pipelines: IndexMap<String, PipelineRuleDoc>,
}

/// Required fields per section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequiredFieldsDoc {
    #[serde(default, rename = "Header")]
    pub header: Vec<String>,
    #[serde(default, rename = "Data")]
    pub data: Vec<String>,
}

/// Allowed characters for one field: a regex character-class body plus a
/// human-readable description used in messages.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterRuleDoc {
    pub pattern: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One pipeline definition.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineRuleDoc {
    #[serde(flatten)]
    pub matcher: MatcherDoc,
    /// Require a real keyword in the description (keyword rules only).
    #[serde(default)]
    pub description_check: bool,
    /// Sample_ID patterns, each capturing a YYMMDD date group; first match
    /// wins, tried in declared order.
    #[serde(default)]
    pub sample_id_patterns: Vec<String>,
    /// Human-readable forms of the patterns, for messages.
    #[serde(default)]
    pub sample_id_display_patterns: Vec<String>,
    /// Require both Sample_ID and Sample_Name to match the matcher regex.
    #[serde(default)]
    pub enforce_id_and_name: bool,
    /// Expected-format text shown in strict-identifier messages.
    #[serde(default)]
    pub id_format_hint: Option<String>,
    /// Enforce the 6-part underscore naming grammar on descriptions.
    #[serde(default)]
    pub description_grammar: bool,
    /// Settings keys that must be present when this pipeline is triggered.
    #[serde(default)]
    pub required_settings: Vec<String>,
    /// Filename convention for sheets carrying this pipeline.
    #[serde(default)]
    pub filename: Option<FilenameRuleDoc>,
}

/// How a pipeline is matched to a sample.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatcherDoc {
    /// Case-insensitive keyword substring on the description, with an
    /// optional fuzzy (edit-distance) fallback for typo detection.
    Keyword {
        keywords: Vec<String>,
        #[serde(default)]
        fuzzy: bool,
    },
    /// Anchored-at-start regex on the Sample_ID.
    Regex { sample_id_regex: String },
    /// Named predicate from the injected registry, applied to the
    /// description.
    Custom { function: String },
}

/// Filename convention variants.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilenameRuleDoc {
    /// The staged file must carry exactly this name.
    Exact { name: String },
    /// The file name must contain `contains` (case-insensitive) and must
    /// not contain `rejects`.
    Marker {
        contains: String,
        #[serde(default)]
        rejects: Option<String>,
    },
}
