use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::workflows::text::fold;

/// Optional keyword expansion table, e.g. `{"work": ["infrastructure", "road"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>")]
pub struct SynonymVocabulary {
    entries: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum SynonymError {
    #[error("failed to read synonym vocabulary: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid synonym vocabulary: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<BTreeMap<String, Vec<String>>> for SynonymVocabulary {
    fn from(raw: BTreeMap<String, Vec<String>>) -> Self {
        let mut entries: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (term, synonyms) in raw {
            let term = fold(term.trim());
            if term.is_empty() {
                continue;
            }
            entries.entry(term).or_default().extend(
                synonyms
                    .iter()
                    .map(|synonym| fold(synonym.trim()))
                    .filter(|synonym| !synonym.is_empty()),
            );
        }
        Self { entries }
    }
}

impl SynonymVocabulary {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SynonymError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SynonymError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Original keywords plus every synonym of each. Never removes a keyword.
    pub fn expand(&self, keywords: &BTreeSet<String>) -> BTreeSet<String> {
        let mut expanded = keywords.clone();
        for keyword in keywords {
            if let Some(synonyms) = self.entries.get(&fold(keyword)) {
                expanded.extend(synonyms.iter().cloned());
            }
        }
        expanded
    }
}
