use serde::{Deserialize, Serialize};

use crate::workflows::bulletin::linking::MIN_CONFIDENCE;

/// Tunable limits for the red-flag rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertThresholds {
    pub min_link_confidence: f64,
    pub excessive_spend_pct: f64,
    pub urgent_contract_amount: f64,
    pub urgency_keywords: Vec<String>,
    pub untraceable_work_amount: f64,
    pub direct_contract_amount: f64,
    pub program_concentration_pct: f64,
    pub depleted_program_ratio: f64,
    pub unidentified_organism_amount: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            min_link_confidence: MIN_CONFIDENCE,
            excessive_spend_pct: 120.0,
            urgent_contract_amount: 5_000_000.0,
            urgency_keywords: ["urgencia", "emergencia", "urgency", "emergency"]
                .into_iter()
                .map(String::from)
                .collect(),
            untraceable_work_amount: 10_000_000.0,
            direct_contract_amount: 3_000_000.0,
            program_concentration_pct: 50.0,
            depleted_program_ratio: 0.5,
            unidentified_organism_amount: 1_000_000.0,
        }
    }
}
