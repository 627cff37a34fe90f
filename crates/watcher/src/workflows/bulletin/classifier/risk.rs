use serde::Serialize;

use crate::workflows::bulletin::domain::{ActType, RiskLevel};
use crate::workflows::text::fold;

/// Risk keyword tiers, folded (lowercase, no accents). The tiers are disjoint.
pub const HIGH_RISK_KEYWORDS: &[&str] = &[
    "contratacion directa",
    "adjudicacion directa",
    "direct contract",
    "direct award",
    "urgencia",
    "emergencia",
    "urgency",
    "emergency",
    "sin licitacion",
    "without tender",
    "excepcion",
    "exception",
];

pub const MEDIUM_RISK_KEYWORDS: &[&str] = &[
    "adjudicacion",
    "adjudicase",
    "award",
    "subsidio",
    "subsidy",
    "redeterminacion",
    "price adjustment",
    "ampliacion",
    "extension",
    "prorroga",
];

pub const LOW_RISK_KEYWORDS: &[&str] = &[
    "licitacion publica",
    "public tender",
    "designacion",
    "appointment",
    "mantenimiento",
    "maintenance",
    "renovacion",
    "renewal",
];

const LARGE_AMOUNT: f64 = 10_000_000.0;

/// Tallies per tier plus the keywords that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub matched_keywords: Vec<String>,
}

/// High wins whenever its tally is positive, regardless of the other tallies.
pub(crate) fn assess(text: &str, act_type: ActType, amount: Option<f64>) -> RiskAssessment {
    let folded = fold(text);
    let mut matched_keywords = Vec::new();
    let mut tally = |keywords: &[&str]| -> u32 {
        let mut hits = 0;
        for keyword in keywords {
            if folded.contains(keyword) {
                hits += 1;
                matched_keywords.push((*keyword).to_string());
            }
        }
        hits
    };

    let mut high = tally(HIGH_RISK_KEYWORDS);
    let mut medium = tally(MEDIUM_RISK_KEYWORDS);
    let mut low = tally(LOW_RISK_KEYWORDS);

    if amount.is_some_and(|value| value > LARGE_AMOUNT) {
        high += 2;
    }
    if matches!(act_type, ActType::DirectContract | ActType::Subsidy) {
        medium += 1;
    }
    if act_type == ActType::Tender {
        low += 1;
    }

    let level = if high > 0 {
        RiskLevel::High
    } else if medium > low {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    RiskAssessment {
        level,
        high,
        medium,
        low,
        matched_keywords,
    }
}

pub fn is_high_risk_keyword(keyword: &str) -> bool {
    HIGH_RISK_KEYWORDS.contains(&keyword)
}
