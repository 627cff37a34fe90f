use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::config::AlertThresholds;
use super::{AlertType, BudgetContext, CitizenAlert};
use crate::workflows::bulletin::domain::{ActType, AdministrativeAct, BudgetProgram, RiskLevel};
use crate::workflows::bulletin::linking::ActProgramLink;
use crate::workflows::text::{fold, truncate_chars};
use crate::workflows::vocabulary::PUBLIC_WORKS_KEYWORDS;

const EXCERPT_CHARS: usize = 200;

pub(crate) struct RuleContext<'a> {
    pub act: &'a AdministrativeAct,
    pub link: Option<&'a ActProgramLink>,
    pub program: Option<&'a BudgetProgram>,
    pub thresholds: &'a AlertThresholds,
}

impl<'a> RuleContext<'a> {
    fn linked(&self) -> Option<(&'a ActProgramLink, &'a BudgetProgram)> {
        self.link.zip(self.program)
    }

    /// Share of the program's current credit consumed by the act.
    fn spend_percentage(&self) -> Option<(f64, &'a ActProgramLink, &'a BudgetProgram)> {
        let (link, program) = self.linked()?;
        let amount = self.act.amount?;
        if program.current_amount <= 0.0 {
            return None;
        }
        Some((amount / program.current_amount * 100.0, link, program))
    }
}

pub(crate) fn evaluate(alert_type: AlertType, context: &RuleContext<'_>) -> Option<CitizenAlert> {
    match alert_type {
        AlertType::TenderWithoutBudget => tender_without_budget(context),
        AlertType::ExcessiveSpend => excessive_spend(context),
        AlertType::UrgentLargeContract => urgent_large_contract(context),
        AlertType::UntraceablePublicWork => untraceable_public_work(context),
        AlertType::LargeDirectContract => large_direct_contract(context),
        AlertType::SubsidyWithoutBeneficiary => subsidy_without_beneficiary(context),
        AlertType::ProgramConcentration => program_concentration(context),
        AlertType::DepletedProgram => depleted_program(context),
        AlertType::UnidentifiedOrganism => unidentified_organism(context),
        AlertType::HighRiskAct => high_risk_act(context),
    }
}

fn tender_without_budget(context: &RuleContext<'_>) -> Option<CitizenAlert> {
    let act = context.act;
    if !act.act_type.is_procurement() {
        return None;
    }
    let confidence = context.link.map(|link| link.confidence_score);
    if confidence.is_some_and(|score| score >= context.thresholds.min_link_confidence) {
        return None;
    }

    let mut alert = AlertDraft::new(AlertType::TenderWithoutBudget, act)
        .title(format!("{} without an identifiable budget line", act.act_type.label()))
        .description(format!(
            "{} {} of {} could not be matched to any program of the budget catalog.",
            act.act_type.label(),
            number_or_unnumbered(act),
            act.organism
        ))
        .citizen_action(
            "Ask the issuing organism which budget program funds this procurement \
             and request the budget allocation certificate.",
        )
        .evidence("best_link_confidence", json!(confidence.map(round2)))
        .evidence(
            "min_link_confidence",
            json!(context.thresholds.min_link_confidence),
        );
    if let Some((link, program)) = context.linked() {
        alert = alert.budget(link, program);
    }
    Some(alert.finish())
}

fn excessive_spend(context: &RuleContext<'_>) -> Option<CitizenAlert> {
    let (pct, link, program) = context.spend_percentage()?;
    let limit = context.thresholds.excessive_spend_pct;
    if pct <= limit {
        return None;
    }
    let act = context.act;
    Some(
        AlertDraft::new(AlertType::ExcessiveSpend, act)
            .title("Spending exceeds the program's current credit")
            .description(format!(
                "The act commits {:.2}% of the current credit of program {} ({}), above the {:.0}% limit.",
                round2(pct),
                program.program_code,
                program.description,
                limit
            ))
            .citizen_action(
                "Request the budget amendment that authorizes this expense and check \
                 whether the program was reinforced.",
            )
            .evidence("spend_percentage", json!(round2(pct)))
            .evidence("threshold_percentage", json!(limit))
            .evidence("program_current_amount", json!(program.current_amount))
            .budget(link, program)
            .finish(),
    )
}

fn urgent_large_contract(context: &RuleContext<'_>) -> Option<CitizenAlert> {
    let act = context.act;
    let amount = act.amount?;
    if amount < context.thresholds.urgent_contract_amount {
        return None;
    }
    let text = fold(&format!("{} {}", act.source_fragment, act.description));
    let matched: Vec<&String> = context
        .thresholds
        .urgency_keywords
        .iter()
        .filter(|keyword| {
            let folded = fold(keyword);
            text.contains(&folded) || act.keywords.contains(&folded)
        })
        .collect();
    if matched.is_empty() {
        return None;
    }
    Some(
        AlertDraft::new(AlertType::UrgentLargeContract, act)
            .title("Large contract justified by urgency")
            .description(format!(
                "{} for {} invokes urgency or emergency, which usually shortens competition.",
                act.act_type.label(),
                format_amount(amount)
            ))
            .citizen_action(
                "Ask for the emergency declaration that supports this contract and \
                 compare the price with similar ordinary procurements.",
            )
            .evidence("urgency_keywords", json!(matched))
            .evidence(
                "amount_threshold",
                json!(context.thresholds.urgent_contract_amount),
            )
            .finish(),
    )
}

fn untraceable_public_work(context: &RuleContext<'_>) -> Option<CitizenAlert> {
    let act = context.act;
    let amount = act.amount?;
    if amount < context.thresholds.untraceable_work_amount {
        return None;
    }
    if act
        .account_code
        .as_deref()
        .is_some_and(|code| !code.trim().is_empty())
    {
        return None;
    }
    let works: Vec<&str> = PUBLIC_WORKS_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| act.keywords.contains(*keyword))
        .collect();
    if works.is_empty() {
        return None;
    }
    Some(
        AlertDraft::new(AlertType::UntraceablePublicWork, act)
            .title("Public work without a budget account code")
            .description(format!(
                "A public work for {} was published without the account code that \
                 ties it to the budget.",
                format_amount(amount)
            ))
            .citizen_action(
                "Request the budget imputation of the work and follow its execution \
                 in the public works registry.",
            )
            .evidence("public_work_keywords", json!(works))
            .evidence(
                "amount_threshold",
                json!(context.thresholds.untraceable_work_amount),
            )
            .finish(),
    )
}

fn large_direct_contract(context: &RuleContext<'_>) -> Option<CitizenAlert> {
    let act = context.act;
    if act.act_type != ActType::DirectContract {
        return None;
    }
    let amount = act.amount?;
    if amount < context.thresholds.direct_contract_amount {
        return None;
    }
    Some(
        AlertDraft::new(AlertType::LargeDirectContract, act)
            .title("Large direct contract")
            .description(format!(
                "A direct contract for {} was awarded without a competitive tender.",
                format_amount(amount)
            ))
            .citizen_action(
                "Ask for the legal exception that allowed skipping the tender and \
                 for the quotes that were considered.",
            )
            .evidence(
                "amount_threshold",
                json!(context.thresholds.direct_contract_amount),
            )
            .evidence("beneficiary", json!(act.beneficiary))
            .finish(),
    )
}

fn subsidy_without_beneficiary(context: &RuleContext<'_>) -> Option<CitizenAlert> {
    let act = context.act;
    if act.act_type != ActType::Subsidy {
        return None;
    }
    let amount = act.amount?;
    if act
        .beneficiary
        .as_deref()
        .is_some_and(|beneficiary| !beneficiary.trim().is_empty())
    {
        return None;
    }
    Some(
        AlertDraft::new(AlertType::SubsidyWithoutBeneficiary, act)
            .title("Subsidy without an identified beneficiary")
            .description(format!(
                "A subsidy for {} was granted without naming who receives it.",
                format_amount(amount)
            ))
            .citizen_action(
                "Request the list of beneficiaries and the criteria used to grant the subsidy.",
            )
            .finish(),
    )
}

fn program_concentration(context: &RuleContext<'_>) -> Option<CitizenAlert> {
    let (pct, link, program) = context.spend_percentage()?;
    let lower = context.thresholds.program_concentration_pct;
    let upper = context.thresholds.excessive_spend_pct;
    if pct <= lower || pct > upper {
        return None;
    }
    Some(
        AlertDraft::new(AlertType::ProgramConcentration, context.act)
            .title("Single act concentrates most of a program")
            .description(format!(
                "One act takes {:.2}% of the current credit of program {}.",
                round2(pct),
                program.program_code
            ))
            .citizen_action(
                "Check what other commitments the program had and whether the \
                 remaining credit covers them.",
            )
            .evidence("spend_percentage", json!(round2(pct)))
            .evidence("threshold_percentage", json!(lower))
            .evidence("program_current_amount", json!(program.current_amount))
            .budget(link, program)
            .finish(),
    )
}

fn depleted_program(context: &RuleContext<'_>) -> Option<CitizenAlert> {
    let (link, program) = context.linked()?;
    if program.initial_amount <= 0.0 {
        return None;
    }
    let ratio = program.current_amount / program.initial_amount;
    if ratio >= context.thresholds.depleted_program_ratio {
        return None;
    }
    Some(
        AlertDraft::new(AlertType::DepletedProgram, context.act)
            .title("Linked program has lost most of its credit")
            .description(format!(
                "Program {} keeps {:.2}% of its initial credit after amendments.",
                program.program_code,
                round2(ratio * 100.0)
            ))
            .citizen_action(
                "Request the budget amendments that moved funds out of this program.",
            )
            .evidence("remaining_percentage", json!(round2(ratio * 100.0)))
            .evidence(
                "threshold_ratio",
                json!(context.thresholds.depleted_program_ratio),
            )
            .evidence("program_initial_amount", json!(program.initial_amount))
            .evidence("program_current_amount", json!(program.current_amount))
            .budget(link, program)
            .finish(),
    )
}

fn unidentified_organism(context: &RuleContext<'_>) -> Option<CitizenAlert> {
    let act = context.act;
    if act.has_organism() {
        return None;
    }
    let amount = act.amount?;
    if amount < context.thresholds.unidentified_organism_amount {
        return None;
    }
    Some(
        AlertDraft::new(AlertType::UnidentifiedOrganism, act)
            .title("Expense without an identified organism")
            .description(format!(
                "An act for {} does not say which organism issues it.",
                format_amount(amount)
            ))
            .citizen_action("Ask the bulletin editor which organism is responsible for this act.")
            .evidence(
                "amount_threshold",
                json!(context.thresholds.unidentified_organism_amount),
            )
            .finish(),
    )
}

fn high_risk_act(context: &RuleContext<'_>) -> Option<CitizenAlert> {
    let act = context.act;
    if act.risk_level != RiskLevel::High || act.risk_keywords.is_empty() {
        return None;
    }
    Some(
        AlertDraft::new(AlertType::HighRiskAct, act)
            .title("Act with high-risk wording")
            .description(format!(
                "The text of this {} uses terms associated with irregular spending: {}.",
                act.act_type.label().to_lowercase(),
                act.risk_keywords.join(", ")
            ))
            .citizen_action("Read the full act and compare it with the published budget execution.")
            .evidence("risk_level", json!(act.risk_level.as_str()))
            .evidence("risk_keywords", json!(act.risk_keywords))
            .finish(),
    )
}

/// Accumulates one alert; seeds the evidence every alert carries.
struct AlertDraft<'a> {
    alert_type: AlertType,
    act: &'a AdministrativeAct,
    title: String,
    description: String,
    citizen_action: String,
    evidence: BTreeMap<String, Value>,
    budget_context: Option<BudgetContext>,
}

impl<'a> AlertDraft<'a> {
    fn new(alert_type: AlertType, act: &'a AdministrativeAct) -> Self {
        let mut evidence = BTreeMap::new();
        evidence.insert("act_id".to_string(), json!(act.id));
        evidence.insert("act_type".to_string(), json!(act.act_type));
        evidence.insert("organism".to_string(), json!(act.organism));
        evidence.insert("amount".to_string(), json!(act.amount));
        evidence.insert("account_code".to_string(), json!(act.account_code));
        evidence.insert("number".to_string(), json!(act.number));
        evidence.insert(
            "source_document_id".to_string(),
            json!(act.source_document_id),
        );
        evidence.insert("page_number".to_string(), json!(act.page_number));
        evidence.insert(
            "fragment_excerpt".to_string(),
            json!(truncate_chars(&act.source_fragment, EXCERPT_CHARS)),
        );
        Self {
            alert_type,
            act,
            title: String::new(),
            description: String::new(),
            citizen_action: String::new(),
            evidence,
            budget_context: None,
        }
    }

    fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn citizen_action(mut self, action: impl Into<String>) -> Self {
        self.citizen_action = action.into();
        self
    }

    fn evidence(mut self, key: &str, value: Value) -> Self {
        self.evidence.insert(key.to_string(), value);
        self
    }

    fn budget(mut self, link: &ActProgramLink, program: &BudgetProgram) -> Self {
        self.evidence
            .insert("link_confidence".to_string(), json!(link.confidence_score));
        self.budget_context = Some(BudgetContext::new(link, program));
        self
    }

    fn finish(self) -> CitizenAlert {
        let program_id = self
            .budget_context
            .as_ref()
            .map(|context| context.program_id.clone());
        CitizenAlert {
            alert_type: self.alert_type,
            severity: self.alert_type.severity(),
            title: self.title,
            description: self.description,
            citizen_action: self.citizen_action,
            evidence: self.evidence,
            budget_context: self.budget_context,
            confidence_score: self.alert_type.confidence(),
            act_id: self.act.id.clone(),
            program_id,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn number_or_unnumbered(act: &AdministrativeAct) -> String {
    act.number
        .as_deref()
        .map(|number| format!("No. {number}"))
        .unwrap_or_else(|| "(unnumbered)".to_string())
}

/// Whole currency units with thousands separators, e.g. `$20,000,000`.
pub fn format_amount(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if whole < 0 {
        format!("$-{grouped}")
    } else {
        format!("${grouped}")
    }
}
