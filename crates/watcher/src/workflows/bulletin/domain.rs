use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Sentinel stored when no issuing organism could be extracted.
pub const UNSPECIFIED_ORGANISM: &str = "ORGANISM NOT SPECIFIED";

/// Identifier of an administrative act. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActId(String);

impl ActId {
    pub fn new(value: impl Into<String>) -> Result<Self, RecordError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(RecordError::EmptyActId);
        }
        Ok(Self(value))
    }

    /// Stable id for the `block_index`-th block of a bulletin page.
    pub fn for_block(document_id: &str, page_number: u32, block_index: usize) -> Self {
        Self(format!("{document_id}:p{page_number}:b{block_index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActId {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActId> for String {
    fn from(value: ActId) -> Self {
        value.0
    }
}

impl fmt::Display for ActId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub String);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActType {
    Decree,
    Resolution,
    Tender,
    DirectContract,
    Appointment,
    Subsidy,
    BudgetAmendment,
    Other,
}

impl ActType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decree => "DECREE",
            Self::Resolution => "RESOLUTION",
            Self::Tender => "TENDER",
            Self::DirectContract => "DIRECT_CONTRACT",
            Self::Appointment => "APPOINTMENT",
            Self::Subsidy => "SUBSIDY",
            Self::BudgetAmendment => "BUDGET_AMENDMENT",
            Self::Other => "OTHER",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Decree => "Decree",
            Self::Resolution => "Resolution",
            Self::Tender => "Tender",
            Self::DirectContract => "Direct contract",
            Self::Appointment => "Appointment",
            Self::Subsidy => "Subsidy",
            Self::BudgetAmendment => "Budget amendment",
            Self::Other => "Other",
        }
    }

    /// Acts that commit public funds to a supplier.
    pub const fn is_procurement(self) -> bool {
        matches!(self, Self::Tender | Self::DirectContract)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// Structured act extracted from one bulletin text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdministrativeAct {
    pub id: ActId,
    pub act_type: ActType,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub organism: String,
    #[serde(default)]
    pub beneficiary: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub account_code: Option<String>,
    pub description: String,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_keywords: Vec<String>,
    pub source_fragment: String,
    pub source_document_id: String,
    pub page_number: u32,
}

impl AdministrativeAct {
    pub fn has_organism(&self) -> bool {
        let trimmed = self.organism.trim();
        !trimmed.is_empty() && trimmed != UNSPECIFIED_ORGANISM
    }
}

/// Funded line item of the budget catalog for one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetProgram {
    pub id: ProgramId,
    pub fiscal_year: i32,
    pub organism: String,
    pub program_code: String,
    #[serde(default)]
    pub subprogram_code: Option<String>,
    #[serde(default)]
    pub account_code: Option<String>,
    pub description: String,
    pub initial_amount: f64,
    pub current_amount: f64,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

impl BudgetProgram {
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.id.0.trim().is_empty() {
            return Err(RecordError::EmptyProgramId);
        }
        if !self.current_amount.is_finite() || self.current_amount < 0.0 {
            return Err(RecordError::NegativeCurrentAmount {
                program_id: self.id.clone(),
                amount: self.current_amount,
            });
        }
        Ok(())
    }
}

/// One page of extracted bulletin text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulletinPage {
    pub page_number: u32,
    pub text: String,
}

/// Contract violations in records handed to the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("administrative act id must not be empty")]
    EmptyActId,
    #[error("budget program id must not be empty")]
    EmptyProgramId,
    #[error("budget program {program_id} has invalid current amount {amount}")]
    NegativeCurrentAmount { program_id: ProgramId, amount: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn act_id_rejects_blank_values() {
        assert_eq!(ActId::new("  "), Err(RecordError::EmptyActId));
        assert_eq!(ActId::for_block("bo-2024-88", 3, 1).as_str(), "bo-2024-88:p3:b1");
    }

    #[test]
    fn act_id_deserialization_is_validated() {
        let parsed: Result<ActId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
        let parsed: ActId = serde_json::from_str("\"act-1\"").expect("valid id");
        assert_eq!(parsed.as_str(), "act-1");
    }

    #[test]
    fn enums_serialize_as_stable_identifiers() {
        assert_eq!(
            serde_json::to_value(ActType::DirectContract).unwrap(),
            serde_json::json!("DIRECT_CONTRACT")
        );
        assert_eq!(
            serde_json::to_value(RiskLevel::Medium).unwrap(),
            serde_json::json!("MEDIUM")
        );
    }

    #[test]
    fn program_with_negative_amount_is_rejected() {
        let program = BudgetProgram {
            id: ProgramId("p-1".to_string()),
            fiscal_year: 2024,
            organism: "MINISTERIO DE SALUD".to_string(),
            program_code: "10".to_string(),
            subprogram_code: None,
            account_code: None,
            description: "Atención primaria".to_string(),
            initial_amount: 100.0,
            current_amount: -1.0,
            keywords: BTreeSet::new(),
        };

        assert!(matches!(
            program.validate(),
            Err(RecordError::NegativeCurrentAmount { .. })
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = serde_json::json!({
            "page_number": 1,
            "text": "DECRETO 1",
            "ocr_confidence": 0.9
        });
        assert!(serde_json::from_value::<BulletinPage>(raw).is_err());
    }
}
