//! Mock LIMS client for testing.

use std::collections::HashSet;

use super::LimsClient;

/// Mock LIMS that answers from a fixed set of known sample ids.
pub struct MockLims {
    known: HashSet<String>,
}

impl MockLims {
    /// A mock where no sample exists yet.
    pub fn empty() -> Self {
        Self {
            known: HashSet::new(),
        }
    }

    /// A mock that already holds the given sample ids.
    pub fn with_existing<I, S>(sample_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: sample_ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl LimsClient for MockLims {
    fn exists(&self, sample_id: &str) -> bool {
        self.known.contains(sample_id)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
