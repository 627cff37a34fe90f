//! Linking of administrative acts to budget programs.

mod aliases;
mod normalizer;
mod scorer;
mod synonyms;

pub use aliases::AliasCategory;
pub use normalizer::AliasNormalizer;
pub use scorer::{MatchDetails, MatchScore, MatchScorer, MatchSignal, MatchingMethod};
pub use synonyms::{SynonymError, SynonymVocabulary};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{ActId, AdministrativeAct, BudgetProgram, ProgramId};

/// Links scoring below this are never materialized.
pub const MIN_CONFIDENCE: f64 = 0.4;
pub const DEFAULT_TOP_N: usize = 3;

/// Scored association between one act and one budget program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActProgramLink {
    pub act_id: ActId,
    pub program_id: ProgramId,
    pub confidence_score: f64,
    pub matching_method: MatchingMethod,
    #[serde(default)]
    pub match_details: MatchDetails,
}

/// Ranks catalog programs for an act. Borrows its inputs and never mutates them.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    scorer: MatchScorer,
    min_confidence: f64,
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new(MatchScorer::default())
    }
}

impl LinkResolver {
    pub fn new(scorer: MatchScorer) -> Self {
        Self {
            scorer,
            min_confidence: MIN_CONFIDENCE,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    /// Keeps programs scoring at least the minimum confidence, ordered by
    /// descending score and truncated to `top_n`. Equal scores keep catalog
    /// order.
    pub fn resolve(
        &self,
        act: &AdministrativeAct,
        programs: &[BudgetProgram],
        top_n: usize,
    ) -> Vec<ActProgramLink> {
        let mut links: Vec<ActProgramLink> = programs
            .iter()
            .filter_map(|program| {
                let MatchScore {
                    score,
                    method,
                    details,
                } = self.scorer.score(act, program);
                (score >= self.min_confidence).then(|| ActProgramLink {
                    act_id: act.id.clone(),
                    program_id: program.id.clone(),
                    confidence_score: score,
                    matching_method: method,
                    match_details: details,
                })
            })
            .collect();

        // `sort_by` is stable, which preserves catalog order on ties.
        links.sort_by(|left, right| right.confidence_score.total_cmp(&left.confidence_score));
        links.truncate(top_n);

        debug!(
            act_id = %act.id,
            candidates = programs.len(),
            linked = links.len(),
            "resolved budget links"
        );

        links
    }
}
