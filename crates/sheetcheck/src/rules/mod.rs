//! Validation-rule configuration: loading and the compiled rule set.
//!
//! Rules are loaded once per validation run and immutable thereafter. All
//! patterns (character classes, identifier regexes) are compiled at load
//! time, so every later validator stage is a total function over the parsed
//! sheet.

mod schema;

pub use schema::RulesDoc;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{Result, SheetcheckError};
use schema::{CharacterRuleDoc, FilenameRuleDoc, MatcherDoc, PipelineRuleDoc};

/// A sample-sheet section that can be declared required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Reads,
    Settings,
    Data,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Header" => Some(Section::Header),
            "Reads" => Some(Section::Reads),
            "Settings" => Some(Section::Settings),
            "Data" => Some(Section::Data),
            _ => None,
        }
    }

    /// Section name as written in the sheet.
    pub fn label(&self) -> &'static str {
        match self {
            Section::Header => "Header",
            Section::Reads => "Reads",
            Section::Settings => "Settings",
            Section::Data => "Data",
        }
    }
}

/// One allowed-character rule, compiled.
#[derive(Debug, Clone)]
pub struct CharacterRule {
    /// Field the rule applies to.
    pub field: String,
    /// Matches characters OUTSIDE the allowed set.
    pub invalid: Regex,
    /// Human-readable description of the allowed set, for messages.
    pub description: String,
}

/// How a pipeline is matched to a sample, compiled.
#[derive(Debug, Clone)]
pub enum Matcher {
    Keyword { keywords: Vec<String>, fuzzy: bool },
    SampleIdRegex { regex: Regex },
    Custom { function: String },
}

/// Filename convention for sheets carrying a pipeline.
#[derive(Debug, Clone)]
pub enum FilenameRule {
    Exact {
        name: String,
    },
    Marker {
        contains: String,
        rejects: Option<String>,
    },
}

/// One pipeline definition, compiled.
#[derive(Debug, Clone)]
pub struct PipelineRule {
    pub matcher: Matcher,
    pub description_check: bool,
    /// Anchored Sample_ID patterns, each with a captured YYMMDD date group.
    pub sample_id_patterns: Vec<Regex>,
    /// Human-readable pattern forms; falls back to the raw pattern sources.
    pub sample_id_display_patterns: Vec<String>,
    pub enforce_id_and_name: bool,
    pub id_format_hint: Option<String>,
    pub description_grammar: bool,
    pub required_settings: Vec<String>,
    pub filename: Option<FilenameRule>,
}

/// The full compiled rule set for one validation run.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub required_sections: Vec<Section>,
    pub required_header_fields: Vec<String>,
    pub required_data_fields: Vec<String>,
    pub character_rules: Vec<CharacterRule>,
    /// Pipelines in declaration order; classification follows this order.
    pub pipelines: IndexMap<String, PipelineRule>,
}

impl RuleSet {
    /// Load and compile a rules document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SheetcheckError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|e| SheetcheckError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::compile_str(&text, path)
    }

    /// Compile a rules document from JSON text (used by tests and callers
    /// that hold the document in memory).
    pub fn from_json(text: &str) -> Result<Self> {
        Self::compile_str(text, Path::new("<inline>"))
    }

    fn compile_str(text: &str, path: &Path) -> Result<Self> {
        let doc: RulesDoc =
            serde_json::from_str(text).map_err(|e| config_parse(path, e.to_string()))?;
        Self::compile(doc, path)
    }

    fn compile(doc: RulesDoc, path: &Path) -> Result<Self> {
        let mut required_sections = Vec::with_capacity(doc.required_sections.len());
        for name in &doc.required_sections {
            let section = Section::from_name(name)
                .ok_or_else(|| config_parse(path, format!("unknown required section '{name}'")))?;
            required_sections.push(section);
        }

        let mut character_rules = Vec::with_capacity(doc.allowed_characters.len());
        for (field, rule) in doc.allowed_characters {
            character_rules.push(compile_character_rule(path, field, rule)?);
        }

        let mut pipelines = IndexMap::with_capacity(doc.pipelines.len());
        for (name, rule) in doc.pipelines {
            let compiled = compile_pipeline_rule(path, &name, rule)?;
            pipelines.insert(name, compiled);
        }

        Ok(Self {
            required_sections,
            required_header_fields: doc.required_fields.header,
            required_data_fields: doc.required_fields.data,
            character_rules,
            pipelines,
        })
    }
}

fn config_parse(path: &Path, message: String) -> SheetcheckError {
    SheetcheckError::ConfigParse {
        path: PathBuf::from(path),
        message,
    }
}

fn compile_character_rule(
    path: &Path,
    field: String,
    rule: CharacterRuleDoc,
) -> Result<CharacterRule> {
    let invalid = Regex::new(&format!("[^{}]", rule.pattern)).map_err(|e| {
        config_parse(
            path,
            format!("invalid allowed_characters pattern for field '{field}': {e}"),
        )
    })?;
    Ok(CharacterRule {
        description: rule
            .description
            .unwrap_or_else(|| "allowed characters".to_string()),
        field,
        invalid,
    })
}

/// Compile a pattern with `re.match` semantics: anchored at the start,
/// unanchored at the end.
fn compile_anchored(path: &Path, context: &str, pattern: &str) -> Result<Regex> {
    Regex::new(&format!(r"\A(?:{pattern})"))
        .map_err(|e| config_parse(path, format!("invalid {context}: {e}")))
}

fn compile_pipeline_rule(path: &Path, name: &str, doc: PipelineRuleDoc) -> Result<PipelineRule> {
    let raw_id_regex = match &doc.matcher {
        MatcherDoc::Regex { sample_id_regex } => Some(sample_id_regex.clone()),
        _ => None,
    };

    let matcher = match doc.matcher {
        MatcherDoc::Keyword { keywords, fuzzy } => Matcher::Keyword { keywords, fuzzy },
        MatcherDoc::Regex { sample_id_regex } => Matcher::SampleIdRegex {
            regex: compile_anchored(
                path,
                &format!("sample_id_regex for pipeline '{name}'"),
                &sample_id_regex,
            )?,
        },
        MatcherDoc::Custom { function } => Matcher::Custom { function },
    };

    if doc.enforce_id_and_name && !matches!(matcher, Matcher::SampleIdRegex { .. }) {
        return Err(config_parse(
            path,
            format!("pipeline '{name}' sets enforce_id_and_name but has no sample_id_regex"),
        ));
    }

    let mut sample_id_patterns = Vec::with_capacity(doc.sample_id_patterns.len());
    for pattern in &doc.sample_id_patterns {
        let regex = compile_anchored(
            path,
            &format!("sample_id_patterns entry for pipeline '{name}'"),
            pattern,
        )?;
        if regex.captures_len() < 2 {
            return Err(config_parse(
                path,
                format!(
                    "sample_id_patterns entry '{pattern}' for pipeline '{name}' must capture a date group"
                ),
            ));
        }
        sample_id_patterns.push(regex);
    }

    // Messages fall back to the raw pattern sources when no display forms
    // are configured.
    let sample_id_display_patterns = if doc.sample_id_display_patterns.is_empty() {
        doc.sample_id_patterns.clone()
    } else {
        doc.sample_id_display_patterns
    };

    // Strict-identifier messages need an expected-format text; default to
    // the raw regex source.
    let id_format_hint = doc
        .id_format_hint
        .or_else(|| doc.enforce_id_and_name.then_some(raw_id_regex).flatten());

    let filename = doc.filename.map(|rule| match rule {
        FilenameRuleDoc::Exact { name } => FilenameRule::Exact { name },
        FilenameRuleDoc::Marker { contains, rejects } => FilenameRule::Marker { contains, rejects },
    });

    Ok(PipelineRule {
        matcher,
        description_check: doc.description_check,
        sample_id_patterns,
        sample_id_display_patterns,
        enforce_id_and_name: doc.enforce_id_and_name,
        id_format_hint,
        description_grammar: doc.description_grammar,
        required_settings: doc.required_settings,
        filename,
    })
}
