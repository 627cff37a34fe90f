//! Red-flag rules evaluated over an act, its best link and the linked program.

mod config;
mod dedup;
mod rules;

pub use config::AlertThresholds;
pub use dedup::{alert_key, AlertDeduplicationCache};
pub use rules::format_amount;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::domain::{ActId, AdministrativeAct, BudgetProgram, ProgramId};
use super::linking::{ActProgramLink, MatchingMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    TenderWithoutBudget,
    ExcessiveSpend,
    UrgentLargeContract,
    UntraceablePublicWork,
    LargeDirectContract,
    SubsidyWithoutBeneficiary,
    ProgramConcentration,
    DepletedProgram,
    UnidentifiedOrganism,
    HighRiskAct,
}

impl AlertType {
    /// Evaluation order of the rule set.
    pub const fn ordered() -> [Self; 10] {
        [
            Self::TenderWithoutBudget,
            Self::ExcessiveSpend,
            Self::UrgentLargeContract,
            Self::UntraceablePublicWork,
            Self::LargeDirectContract,
            Self::SubsidyWithoutBeneficiary,
            Self::ProgramConcentration,
            Self::DepletedProgram,
            Self::UnidentifiedOrganism,
            Self::HighRiskAct,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TenderWithoutBudget => "tender_without_budget",
            Self::ExcessiveSpend => "excessive_spend",
            Self::UrgentLargeContract => "urgent_large_contract",
            Self::UntraceablePublicWork => "untraceable_public_work",
            Self::LargeDirectContract => "large_direct_contract",
            Self::SubsidyWithoutBeneficiary => "subsidy_without_beneficiary",
            Self::ProgramConcentration => "program_concentration",
            Self::DepletedProgram => "depleted_program",
            Self::UnidentifiedOrganism => "unidentified_organism",
            Self::HighRiskAct => "high_risk_act",
        }
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::TenderWithoutBudget | Self::ExcessiveSpend | Self::UntraceablePublicWork => {
                Severity::High
            }
            Self::UrgentLargeContract
            | Self::LargeDirectContract
            | Self::SubsidyWithoutBeneficiary
            | Self::ProgramConcentration
            | Self::DepletedProgram => Severity::Medium,
            Self::UnidentifiedOrganism | Self::HighRiskAct => Severity::Low,
        }
    }

    pub const fn confidence(self) -> f64 {
        match self {
            Self::TenderWithoutBudget | Self::UntraceablePublicWork => 0.9,
            Self::ExcessiveSpend => 0.95,
            Self::UrgentLargeContract => 0.85,
            Self::LargeDirectContract => 0.8,
            Self::SubsidyWithoutBeneficiary => 0.75,
            Self::ProgramConcentration | Self::DepletedProgram => 0.7,
            Self::UnidentifiedOrganism => 0.6,
            Self::HighRiskAct => 0.65,
        }
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|alert_type| alert_type.as_str() == value)
            .ok_or_else(|| format!("unknown alert type `{value}`"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// Snapshot of the linked program attached to alerts that depend on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetContext {
    pub program_id: ProgramId,
    pub program_code: String,
    pub description: String,
    pub organism: String,
    pub fiscal_year: i32,
    pub initial_amount: f64,
    pub current_amount: f64,
    pub link_confidence: f64,
    pub matching_method: MatchingMethod,
}

impl BudgetContext {
    pub fn new(link: &ActProgramLink, program: &BudgetProgram) -> Self {
        Self {
            program_id: program.id.clone(),
            program_code: program.program_code.clone(),
            description: program.description.clone(),
            organism: program.organism.clone(),
            fiscal_year: program.fiscal_year,
            initial_amount: program.initial_amount,
            current_amount: program.current_amount,
            link_confidence: link.confidence_score,
            matching_method: link.matching_method,
        }
    }
}

/// Evidence-bearing notice produced by one rule for one act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CitizenAlert {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub citizen_action: String,
    pub evidence: BTreeMap<String, Value>,
    #[serde(default)]
    pub budget_context: Option<BudgetContext>,
    pub confidence_score: f64,
    pub act_id: ActId,
    #[serde(default)]
    pub program_id: Option<ProgramId>,
}

/// Evaluates the rule set and suppresses repeats of `(act, rule)` for the
/// lifetime of the engine. Safe to share across threads.
#[derive(Debug, Default)]
pub struct AlertRuleEngine {
    thresholds: AlertThresholds,
    cache: AlertDeduplicationCache,
}

impl AlertRuleEngine {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self {
            thresholds,
            cache: AlertDeduplicationCache::new(),
        }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn cache(&self) -> &AlertDeduplicationCache {
        &self.cache
    }

    /// Evaluates `act` against its highest-confidence link and the program
    /// that link points at.
    pub fn evaluate(
        &self,
        act: &AdministrativeAct,
        links: &[ActProgramLink],
        programs: &[BudgetProgram],
    ) -> Vec<CitizenAlert> {
        let best_link = links.iter().fold(None, |best: Option<&ActProgramLink>, link| {
            match best {
                Some(current) if current.confidence_score >= link.confidence_score => Some(current),
                _ => Some(link),
            }
        });
        let program = best_link
            .and_then(|link| programs.iter().find(|program| program.id == link.program_id));
        self.evaluate_pair(act, best_link, program)
    }

    pub fn evaluate_pair(
        &self,
        act: &AdministrativeAct,
        best_link: Option<&ActProgramLink>,
        program: Option<&BudgetProgram>,
    ) -> Vec<CitizenAlert> {
        let context = rules::RuleContext {
            act,
            link: best_link,
            program,
            thresholds: &self.thresholds,
        };

        let mut alerts = Vec::new();
        for alert_type in AlertType::ordered() {
            let key = alert_key(&act.id, alert_type);
            if self.cache.seen(&key) {
                debug!(act_id = %act.id, alert_type = alert_type.as_str(), "alert already emitted");
                continue;
            }
            let Some(alert) = rules::evaluate(alert_type, &context) else {
                continue;
            };
            if !self.cache.mark(key) {
                continue;
            }
            info!(
                act_id = %act.id,
                alert_type = alert_type.as_str(),
                severity = alert.severity.as_str(),
                "citizen alert raised"
            );
            alerts.push(alert);
        }
        alerts
    }

    /// Forgets every emitted `(act, rule)` pair.
    pub fn reset(&self) {
        self.cache.reset();
    }
}
