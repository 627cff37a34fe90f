//! Pattern-based classification of bulletin text into administrative acts.
//!
//! Classification is a pure pipeline per text block: detect the act type from
//! an ordered pattern table, pull optional fields, then score risk. Blocks
//! that match no act-type pattern are dropped by the caller.

mod extraction;
mod patterns;
mod risk;

pub use extraction::ExtractedFields;
pub use risk::{
    is_high_risk_keyword, RiskAssessment, HIGH_RISK_KEYWORDS, LOW_RISK_KEYWORDS,
    MEDIUM_RISK_KEYWORDS,
};

use serde::Serialize;
use tracing::debug;

use super::domain::{ActId, ActType, AdministrativeAct, BulletinPage};
use crate::workflows::text::{collapse_whitespace, truncate_chars};
use patterns::{ACT_TYPE_PATTERNS, BLOCK_SEPARATOR};

const DESCRIPTION_MAX_CHARS: usize = 200;
const FRAGMENT_MAX_CHARS: usize = 500;
const DEFAULT_MIN_BLOCK_CHARS: usize = 50;

/// Result of act-type detection: exactly one type, plus the captured number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDetection {
    pub act_type: ActType,
    pub number: Option<String>,
}

/// Outcome of classifying every block of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageClassification {
    pub acts: Vec<AdministrativeAct>,
    pub blocks_seen: usize,
    pub blocks_too_short: usize,
    pub blocks_unrecognized: usize,
}

#[derive(Debug, Clone)]
pub struct ActClassifier {
    min_block_chars: usize,
}

impl Default for ActClassifier {
    fn default() -> Self {
        Self {
            min_block_chars: DEFAULT_MIN_BLOCK_CHARS,
        }
    }
}

impl ActClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_block_chars(min_block_chars: usize) -> Self {
        Self { min_block_chars }
    }

    /// First matching family wins; unmatched text is [`ActType::Other`].
    pub fn detect_type(&self, text: &str) -> TypeDetection {
        for (act_type, patterns) in ACT_TYPE_PATTERNS.iter() {
            for pattern in patterns {
                if let Some(caps) = pattern.captures(text) {
                    return TypeDetection {
                        act_type: *act_type,
                        number: caps.get(1).map(|number| number.as_str().to_string()),
                    };
                }
            }
        }

        TypeDetection {
            act_type: ActType::Other,
            number: None,
        }
    }

    pub fn extract_fields(&self, text: &str) -> ExtractedFields {
        extraction::extract_fields(text)
    }

    pub fn assess_risk(
        &self,
        text: &str,
        act_type: ActType,
        amount: Option<f64>,
    ) -> RiskAssessment {
        risk::assess(text, act_type, amount)
    }

    /// Classifies one block. Returns `None` when no act-type pattern matches.
    pub fn classify(
        &self,
        text: &str,
        document_id: &str,
        page_number: u32,
        block_index: usize,
    ) -> Option<AdministrativeAct> {
        let detection = self.detect_type(text);
        if detection.act_type == ActType::Other {
            return None;
        }

        let fields = self.extract_fields(text);
        let risk = self.assess_risk(text, detection.act_type, fields.amount);
        let trimmed = text.trim();

        Some(AdministrativeAct {
            id: ActId::for_block(document_id, page_number, block_index),
            act_type: detection.act_type,
            number: detection.number,
            date: fields.date,
            organism: fields.organism,
            beneficiary: fields.beneficiary,
            amount: fields.amount,
            account_code: fields.account_code,
            description: truncate_chars(&collapse_whitespace(trimmed), DESCRIPTION_MAX_CHARS),
            keywords: fields.keywords,
            risk_level: risk.level,
            risk_keywords: risk.matched_keywords,
            source_fragment: truncate_chars(trimmed, FRAGMENT_MAX_CHARS),
            source_document_id: document_id.to_string(),
            page_number,
        })
    }

    /// Blank-line delimited blocks, trimmed.
    pub fn split_blocks<'a>(&self, text: &'a str) -> Vec<&'a str> {
        BLOCK_SEPARATOR
            .split(text)
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .collect()
    }

    /// Classifies each block of a page independently. Blocks shorter than the
    /// minimum length are discarded before classification.
    pub fn classify_page(&self, document_id: &str, page: &BulletinPage) -> PageClassification {
        let mut outcome = PageClassification::default();

        for (block_index, block) in self.split_blocks(&page.text).into_iter().enumerate() {
            outcome.blocks_seen += 1;

            if block.chars().count() < self.min_block_chars {
                outcome.blocks_too_short += 1;
                continue;
            }

            match self.classify(block, document_id, page.page_number, block_index) {
                Some(act) => outcome.acts.push(act),
                None => {
                    debug!(
                        document_id,
                        page = page.page_number,
                        block_index,
                        "block matched no act pattern"
                    );
                    outcome.blocks_unrecognized += 1;
                }
            }
        }

        outcome
    }

    /// Convenience wrapper over [`Self::classify_page`] for a single text body.
    pub fn classify_document(
        &self,
        text: &str,
        document_id: &str,
        page_number: u32,
    ) -> Vec<AdministrativeAct> {
        let page = BulletinPage {
            page_number,
            text: text.to_string(),
        };
        self.classify_page(document_id, &page).acts
    }
}
