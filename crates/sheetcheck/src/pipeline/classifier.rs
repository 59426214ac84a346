//! Pipeline classification over sample descriptions and identifiers.
//!
//! Each sample is matched against every configured pipeline, in rule
//! declaration order. Keyword rules match case-insensitively on the
//! description and may fall back to fuzzy (edit-distance) matching to catch
//! typos; regex rules match anchored at the start of the Sample_ID; custom
//! rules delegate to a named predicate from the injected registry.
//!
//! Classification results live in a separate structure keyed by sample
//! position, so the parsed sheet stays read-only.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::similarity::similarity;
use crate::rules::{Matcher, RuleSet};
use crate::sheet::SampleRecord;

/// Word-like runs pulled out of a description for token-level fuzzy matching.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w-]+").unwrap());

/// Predicate applied to a lower-cased sample description by `custom` rules.
pub type DescriptionPredicate = fn(&str) -> bool;

/// Named predicates available to `custom`-type pipeline rules.
///
/// Injected into the classifier so rule documents refer to capabilities by
/// name instead of resolving functions from global scope.
#[derive(Debug, Clone)]
pub struct PredicateRegistry {
    predicates: IndexMap<String, DescriptionPredicate>,
}

impl PredicateRegistry {
    /// Registry with no predicates.
    pub fn empty() -> Self {
        Self {
            predicates: IndexMap::new(),
        }
    }

    /// Register a predicate under a name; later registrations win.
    pub fn register(&mut self, name: impl Into<String>, predicate: DescriptionPredicate) {
        self.predicates.insert(name.into(), predicate);
    }

    /// Look up a predicate by name.
    pub fn get(&self, name: &str) -> Option<DescriptionPredicate> {
        self.predicates.get(name).copied()
    }
}

impl Default for PredicateRegistry {
    /// Registry with the built-in naming-convention predicates.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("wopr_naming", |description| {
            first_part_is(description, "wopr")
        });
        registry.register("somatic_naming", |description| {
            first_part_is(description, "somatic")
        });
        registry
    }
}

/// True when the first underscore-delimited part of the description equals
/// the given tag, case-insensitively.
fn first_part_is(description: &str, tag: &str) -> bool {
    description
        .split('_')
        .next()
        .is_some_and(|part| part.trim().eq_ignore_ascii_case(tag))
}

/// Terminal classification label for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineAssignment {
    /// Exactly one pipeline matched.
    Single(String),
    /// More than one pipeline matched; the sample is flagged and excluded
    /// from pipeline-specific checks.
    Multiple(Vec<String>),
    /// No pipeline matched.
    Unknown,
}

impl PipelineAssignment {
    /// Human-readable label, as rendered in reports.
    pub fn label(&self) -> String {
        match self {
            PipelineAssignment::Single(name) => name.clone(),
            PipelineAssignment::Multiple(names) => {
                format!("Multiple Pipelines: {}", names.join(", "))
            }
            PipelineAssignment::Unknown => "Unknown Pipeline".to_string(),
        }
    }
}

/// Classification result for one sample.
#[derive(Debug, Clone)]
pub struct Classification {
    pub assigned: PipelineAssignment,
    /// Pipelines this sample was matched to through a suspected typo.
    pub typo_detected: Vec<String>,
}

impl Classification {
    /// True when the sample reached this pipeline through a fuzzy match.
    pub fn is_typo_assigned(&self, pipeline: &str) -> bool {
        self.typo_detected.iter().any(|p| p == pipeline)
    }
}

/// Outcome of classifying a whole sheet.
#[derive(Debug, Clone, Default)]
pub struct SheetClassification {
    /// One entry per sample, in sheet order.
    pub samples: Vec<Classification>,
    /// "Did you mean" suggestions collected across the run, in sheet order.
    pub typo_suggestions: Vec<String>,
}

/// Assigns pipelines to samples from the configured rules.
pub struct PipelineClassifier {
    registry: PredicateRegistry,
    /// Similarity cutoff for the fuzzy keyword fallback.
    cutoff: f64,
}

impl PipelineClassifier {
    /// Classifier with the built-in predicate registry and a 0.6 cutoff.
    pub fn new() -> Self {
        Self {
            registry: PredicateRegistry::default(),
            cutoff: 0.6,
        }
    }

    /// Replace the predicate registry.
    pub fn with_registry(mut self, registry: PredicateRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the similarity cutoff for fuzzy keyword matching.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Classify every sample in sheet order.
    pub fn classify_all(&self, samples: &[SampleRecord], rules: &RuleSet) -> SheetClassification {
        let mut run = SheetClassification::default();
        for sample in samples {
            let classification = self.classify(sample, rules, &mut run.typo_suggestions);
            run.samples.push(classification);
        }
        run
    }

    /// Classify one sample against every configured pipeline.
    fn classify(
        &self,
        sample: &SampleRecord,
        rules: &RuleSet,
        suggestions: &mut Vec<String>,
    ) -> Classification {
        let description = sample.description().to_lowercase();
        let mut assigned: Vec<String> = Vec::new();
        let mut typo_detected: Vec<String> = Vec::new();

        for (name, rule) in &rules.pipelines {
            match &rule.matcher {
                Matcher::Keyword { keywords, fuzzy } => {
                    let keywords: Vec<String> =
                        keywords.iter().map(|kw| kw.to_lowercase()).collect();
                    if keywords.iter().any(|kw| description.contains(kw)) {
                        // Exact match takes precedence and suppresses the
                        // fuzzy path for this pipeline.
                        assigned.push(name.clone());
                        continue;
                    }
                    if *fuzzy {
                        if let Some(keyword) = self.close_keyword(&description, &keywords) {
                            suggestions.push(format!(
                                "'{}'. Did you mean '{}'?",
                                sample.description(),
                                keyword
                            ));
                            assigned.push(name.clone());
                            typo_detected.push(name.clone());
                        }
                    }
                }
                Matcher::SampleIdRegex { regex } => {
                    if regex.is_match(sample.sample_id()) {
                        assigned.push(name.clone());
                    }
                }
                Matcher::Custom { function } => match self.registry.get(function) {
                    Some(predicate) => {
                        if predicate(&description) {
                            assigned.push(name.clone());
                        }
                    }
                    None => {
                        warn!(function = %function, pipeline = %name, "unknown custom predicate, rule never matches");
                    }
                },
            }
        }

        let assigned = match assigned.len() {
            0 => PipelineAssignment::Unknown,
            1 => PipelineAssignment::Single(assigned.swap_remove(0)),
            _ => PipelineAssignment::Multiple(assigned),
        };

        Classification {
            assigned,
            typo_detected,
        }
    }

    /// First keyword within the similarity cutoff: the whole description is
    /// tried first, then each word-like token; keywords are tried in
    /// declared order.
    fn close_keyword<'a>(&self, description: &str, keywords: &'a [String]) -> Option<&'a str> {
        if let Some(keyword) = keywords
            .iter()
            .find(|kw| similarity(description, kw.as_str()) >= self.cutoff)
        {
            return Some(keyword.as_str());
        }
        for token in WORD_RE.find_iter(description) {
            if let Some(keyword) = keywords
                .iter()
                .find(|kw| similarity(token.as_str(), kw.as_str()) >= self.cutoff)
            {
                return Some(keyword.as_str());
            }
        }
        None
    }
}

impl Default for PipelineClassifier {
    fn default() -> Self {
        Self::new()
    }
}
