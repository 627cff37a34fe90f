use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::normalizer::AliasNormalizer;
use super::synonyms::SynonymVocabulary;
use crate::workflows::bulletin::domain::{AdministrativeAct, BudgetProgram};
use crate::workflows::text::fold;
use crate::workflows::vocabulary::is_strong_keyword;

const EXACT_ACCOUNT_CODE: f64 = 1.0;
const PARTIAL_ACCOUNT_CODE: f64 = 0.85;
const EXACT_ORGANISM: f64 = 0.85;
const SIMILAR_ORGANISM: f64 = 0.70;
const STRONG_KEYWORD_WEIGHT: f64 = 0.65;
const WEAK_KEYWORD_WEIGHT: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMethod {
    ExactAccountCode,
    PartialAccountCode,
    ExactOrganism,
    SimilarOrganism,
    StrongKeywords,
    WeakKeywords,
    NoMatch,
}

impl MatchingMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactAccountCode => "exact_account_code",
            Self::PartialAccountCode => "partial_account_code",
            Self::ExactOrganism => "exact_organism",
            Self::SimilarOrganism => "similar_organism",
            Self::StrongKeywords => "strong_keywords",
            Self::WeakKeywords => "weak_keywords",
            Self::NoMatch => "no_match",
        }
    }
}

/// One sub-scorer that fired, kept so auditors can see why a link exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSignal {
    pub method: MatchingMethod,
    pub score: f64,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub signals: Vec<MatchSignal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchScore {
    pub score: f64,
    pub method: MatchingMethod,
    pub details: MatchDetails,
}

impl MatchScore {
    fn no_match() -> Self {
        Self {
            score: 0.0,
            method: MatchingMethod::NoMatch,
            details: MatchDetails::default(),
        }
    }
}

/// Best-of-N scorer over account code, organism and keyword evidence.
///
/// The final score is the maximum sub-score, never a sum: an authoritative
/// account-code match is not diluted by disagreement elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MatchScorer {
    normalizer: AliasNormalizer,
    synonyms: Option<SynonymVocabulary>,
}

impl MatchScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_synonyms(synonyms: SynonymVocabulary) -> Self {
        Self {
            normalizer: AliasNormalizer,
            synonyms: Some(synonyms),
        }
    }

    pub fn score(&self, act: &AdministrativeAct, program: &BudgetProgram) -> MatchScore {
        let mut details = MatchDetails::default();

        if let Some(signal) = account_code_signal(act, program) {
            details.signals.push(signal);
        }
        if let Some(signal) = self.organism_signal(act, program) {
            details.signals.push(signal);
        }
        if let Some((signal, shared)) = self.keyword_signal(act, program) {
            details.signals.push(signal);
            details.shared_keywords = shared;
        }

        // Strictly greater keeps the earlier strategy on ties.
        let best = details
            .signals
            .iter()
            .fold(None::<&MatchSignal>, |best, signal| match best {
                Some(current) if signal.score <= current.score => Some(current),
                _ => Some(signal),
            })
            .map(|signal| (signal.score, signal.method));

        match best {
            Some((score, method)) => MatchScore {
                score,
                method,
                details,
            },
            None => MatchScore::no_match(),
        }
    }

    fn organism_signal(
        &self,
        act: &AdministrativeAct,
        program: &BudgetProgram,
    ) -> Option<MatchSignal> {
        if !act.has_organism() {
            return None;
        }

        let act_name = self.normalizer.normalize(&act.organism);
        let program_name = self.normalizer.normalize(&program.organism);
        if act_name.is_empty() || program_name.is_empty() {
            return None;
        }

        if act_name == program_name {
            return Some(MatchSignal {
                method: MatchingMethod::ExactOrganism,
                score: EXACT_ORGANISM,
                notes: format!("organism '{act_name}' matches exactly"),
            });
        }

        if act_name.contains(&program_name) || program_name.contains(&act_name) {
            return Some(MatchSignal {
                method: MatchingMethod::SimilarOrganism,
                score: SIMILAR_ORGANISM,
                notes: format!("organism '{act_name}' overlaps '{program_name}'"),
            });
        }

        match (
            self.normalizer.alias_group(&act_name),
            self.normalizer.alias_group(&program_name),
        ) {
            (Some(left), Some(right)) if left == right => Some(MatchSignal {
                method: MatchingMethod::SimilarOrganism,
                score: SIMILAR_ORGANISM,
                notes: format!(
                    "organisms '{act_name}' and '{program_name}' share alias category {}",
                    left.as_str()
                ),
            }),
            _ => None,
        }
    }

    fn keyword_signal(
        &self,
        act: &AdministrativeAct,
        program: &BudgetProgram,
    ) -> Option<(MatchSignal, Vec<String>)> {
        let act_keywords = folded_set(&act.keywords);
        let act_keywords = match &self.synonyms {
            Some(vocabulary) => vocabulary.expand(&act_keywords),
            None => act_keywords,
        };
        let program_keywords = folded_set(&program.keywords);

        let shared: Vec<String> = act_keywords
            .intersection(&program_keywords)
            .cloned()
            .collect();
        if shared.is_empty() {
            return None;
        }

        // Dividing by the smaller set (not the union) is kept deliberately; it
        // inflates scores when one side carries few keywords.
        let denominator = act_keywords.len().min(program_keywords.len()) as f64;
        let proportion = shared.len() as f64 / denominator;

        let (method, weight) = if shared.iter().any(|keyword| is_strong_keyword(keyword)) {
            (MatchingMethod::StrongKeywords, STRONG_KEYWORD_WEIGHT)
        } else {
            (MatchingMethod::WeakKeywords, WEAK_KEYWORD_WEIGHT)
        };

        let signal = MatchSignal {
            method,
            score: weight * shared.len() as f64 / denominator,
            notes: format!(
                "{} shared keyword(s), overlap {:.2}",
                shared.len(),
                proportion
            ),
        };
        Some((signal, shared))
    }
}

fn account_code_signal(act: &AdministrativeAct, program: &BudgetProgram) -> Option<MatchSignal> {
    let act_code = compact_code(act.account_code.as_deref()?);
    let program_code = compact_code(program.account_code.as_deref()?);
    if act_code.is_empty() || program_code.is_empty() {
        return None;
    }

    if act_code == program_code {
        return Some(MatchSignal {
            method: MatchingMethod::ExactAccountCode,
            score: EXACT_ACCOUNT_CODE,
            notes: format!("account code {act_code} matches exactly"),
        });
    }

    if act_code.starts_with(&program_code) || program_code.starts_with(&act_code) {
        return Some(MatchSignal {
            method: MatchingMethod::PartialAccountCode,
            score: PARTIAL_ACCOUNT_CODE,
            notes: format!("account code {act_code} shares prefix with {program_code}"),
        });
    }

    None
}

fn compact_code(code: &str) -> String {
    code.chars().filter(|ch| !ch.is_whitespace()).collect()
}

fn folded_set(keywords: &BTreeSet<String>) -> BTreeSet<String> {
    keywords
        .iter()
        .map(|keyword| fold(keyword.trim()))
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::bulletin::domain::{ActId, ActType, ProgramId, RiskLevel};

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn act(account_code: Option<&str>, organism: &str, keywords: &[&str]) -> AdministrativeAct {
        AdministrativeAct {
            id: ActId::new("act-1").expect("id"),
            act_type: ActType::Tender,
            number: None,
            date: None,
            organism: organism.to_string(),
            beneficiary: None,
            amount: Some(15_000_000.0),
            account_code: account_code.map(str::to_string),
            description: String::new(),
            keywords: set(keywords),
            risk_level: RiskLevel::High,
            risk_keywords: Vec::new(),
            source_fragment: String::new(),
            source_document_id: "doc".to_string(),
            page_number: 1,
        }
    }

    fn program(account_code: Option<&str>, organism: &str, keywords: &[&str]) -> BudgetProgram {
        BudgetProgram {
            id: ProgramId("prog-1".to_string()),
            fiscal_year: 2024,
            organism: organism.to_string(),
            program_code: "16".to_string(),
            subprogram_code: None,
            account_code: account_code.map(str::to_string),
            description: String::new(),
            initial_amount: 10_000_000.0,
            current_amount: 10_000_000.0,
            keywords: set(keywords),
        }
    }

    #[test]
    fn exact_account_code_is_authoritative() {
        let score = MatchScorer::new().score(
            &act(Some("1.2.3.4"), "MINISTRY OF PUBLIC WORKS", &["work", "construction", "route"]),
            &program(Some("1.2.3.4"), "MINISTRY OF HEALTH", &["hospital"]),
        );
        assert_eq!(score.score, 1.0);
        assert_eq!(score.method, MatchingMethod::ExactAccountCode);
    }

    #[test]
    fn account_codes_ignore_whitespace_and_accept_prefixes() {
        let scorer = MatchScorer::new();
        let exact = scorer.score(
            &act(Some("1. 2.3"), "", &[]),
            &program(Some("1.2.3"), "", &[]),
        );
        assert_eq!(exact.method, MatchingMethod::ExactAccountCode);

        let partial = scorer.score(
            &act(Some("1.2"), "", &[]),
            &program(Some("1.2.3.4"), "", &[]),
        );
        assert_eq!(partial.score, 0.85);
        assert_eq!(partial.method, MatchingMethod::PartialAccountCode);
    }

    #[test]
    fn organism_exact_containment_and_alias() {
        let scorer = MatchScorer::new();
        let exact = scorer.score(
            &act(None, "MINISTERIO DE SALUD", &[]),
            &program(None, "Ministerio de Salud", &[]),
        );
        assert_eq!((exact.score, exact.method), (0.85, MatchingMethod::ExactOrganism));

        let contained = scorer.score(
            &act(None, "DIRECCIÓN DE HOSPITALES PÚBLICOS", &[]),
            &program(None, "HOSPITALES", &[]),
        );
        assert_eq!(
            (contained.score, contained.method),
            (0.70, MatchingMethod::SimilarOrganism)
        );

        let alias = scorer.score(
            &act(None, "MINISTERIO DE INFRAESTRUCTURA", &[]),
            &program(None, "DIRECCION PROVINCIAL DE VIALIDAD", &[]),
        );
        assert_eq!((alias.score, alias.method), (0.70, MatchingMethod::SimilarOrganism));
    }

    #[test]
    fn unspecified_organism_never_matches() {
        let score = MatchScorer::new().score(
            &act(None, crate::workflows::bulletin::domain::UNSPECIFIED_ORGANISM, &[]),
            &program(None, "ORGANISM NOT SPECIFIED", &[]),
        );
        assert_eq!(score.method, MatchingMethod::NoMatch);
        assert_eq!(score.score, 0.0);
    }

    #[test]
    fn keyword_proportion_uses_smaller_set() {
        let scorer = MatchScorer::new();
        let strong = scorer.score(
            &act(None, "", &["hospital"]),
            &program(None, "", &["hospital", "health", "equipment", "staff"]),
        );
        assert_eq!(strong.method, MatchingMethod::StrongKeywords);
        assert!((strong.score - 0.65).abs() < 1e-9);
        assert_eq!(strong.details.shared_keywords, vec!["hospital".to_string()]);

        let weak = scorer.score(
            &act(None, "", &["subsidy", "public"]),
            &program(None, "", &["subsidy", "families"]),
        );
        assert_eq!(weak.method, MatchingMethod::WeakKeywords);
        assert!((weak.score - 0.225).abs() < 1e-9);
    }

    #[test]
    fn synonyms_expand_act_keywords() {
        let vocabulary: SynonymVocabulary =
            serde_json::from_str(r#"{"route": ["road"]}"#).expect("vocabulary");
        let scorer = MatchScorer::with_synonyms(vocabulary);
        let score = scorer.score(&act(None, "", &["route"]), &program(None, "", &["road"]));
        assert_eq!(score.details.shared_keywords, vec!["road".to_string()]);
        assert_eq!(score.method, MatchingMethod::WeakKeywords);

        let plain = MatchScorer::new().score(&act(None, "", &["route"]), &program(None, "", &["road"]));
        assert_eq!(plain.method, MatchingMethod::NoMatch);
    }

    #[test]
    fn score_is_maximum_not_sum() {
        let score = MatchScorer::new().score(
            &act(Some("1.2"), "MINISTERIO DE SALUD", &["hospital"]),
            &program(Some("1.2.9"), "MINISTERIO DE SALUD", &["hospital"]),
        );
        assert_eq!(score.details.signals.len(), 3);
        assert_eq!(score.score, 0.85);
        // Account code and organism tie at 0.85; the account code is evaluated first.
        assert_eq!(score.method, MatchingMethod::PartialAccountCode);
    }

    #[test]
    fn disjoint_records_do_not_match() {
        let score = MatchScorer::new().score(
            &act(Some("1.2.3.4"), "MINISTRY OF PUBLIC WORKS", &["work", "construction", "route"]),
            &program(Some("9.9.9.9"), "MINISTRY OF HEALTH", &["hospital"]),
        );
        assert_eq!(score.score, 0.0);
        assert_eq!(score.method, MatchingMethod::NoMatch);
        assert!(score.details.signals.is_empty());
    }
}
