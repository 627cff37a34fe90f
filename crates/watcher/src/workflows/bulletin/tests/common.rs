use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::bulletin::alerts::CitizenAlert;
use crate::workflows::bulletin::analysis::{BulletinAnalysis, BulletinAnalyzer};
use crate::workflows::bulletin::domain::{
    ActId, ActType, AdministrativeAct, BudgetProgram, BulletinPage, ProgramId, RiskLevel,
};
use crate::workflows::bulletin::linking::{ActProgramLink, MatchDetails, MatchingMethod};
use crate::workflows::bulletin::repository::{AlertFilter, AlertRepository, RepositoryError};
use crate::workflows::bulletin::service::BulletinService;
use crate::workflows::catalog::BudgetCatalog;

pub(super) const TENDER_BLOCK: &str = "LICITACIÓN PÚBLICA N° 12/2024\nMINISTERIO DE INFRAESTRUCTURA, \
construcción de la Ruta Provincial 40 por la suma de $ 15.000.000,00 \
con cargo a la PARTIDA 1.2.3.4. Mendoza, 15/03/2024";

/// Resolution that trips no rule until a test changes it.
pub(super) fn quiet_act() -> AdministrativeAct {
    AdministrativeAct {
        id: ActId::new("bo-2024-88:p1:b0").expect("valid id"),
        act_type: ActType::Resolution,
        number: Some("45/2024".to_string()),
        date: None,
        organism: "MINISTERIO DE SALUD".to_string(),
        beneficiary: None,
        amount: None,
        account_code: Some("1.2.3.4".to_string()),
        description: "Apruébase el gasto del hospital regional".to_string(),
        keywords: keywords(&["hospital"]),
        risk_level: RiskLevel::Low,
        risk_keywords: Vec::new(),
        source_fragment: "RESOLUCIÓN N° 45/2024 Apruébase el gasto del hospital regional"
            .to_string(),
        source_document_id: "bo-2024-88".to_string(),
        page_number: 1,
    }
}

pub(super) fn tender(amount: f64) -> AdministrativeAct {
    AdministrativeAct {
        act_type: ActType::Tender,
        amount: Some(amount),
        source_fragment: "LICITACIÓN PÚBLICA N° 45/2024 para la ampliación del hospital regional"
            .to_string(),
        ..quiet_act()
    }
}

pub(super) fn program(initial_amount: f64, current_amount: f64) -> BudgetProgram {
    BudgetProgram {
        id: ProgramId("prog-salud-12".to_string()),
        fiscal_year: 2024,
        organism: "Ministerio de Salud".to_string(),
        program_code: "12".to_string(),
        subprogram_code: None,
        account_code: Some("1.2.3.4".to_string()),
        description: "Atención hospitalaria".to_string(),
        initial_amount,
        current_amount,
        keywords: keywords(&["hospital"]),
    }
}

pub(super) fn link(act: &AdministrativeAct, program: &BudgetProgram, score: f64) -> ActProgramLink {
    ActProgramLink {
        act_id: act.id.clone(),
        program_id: program.id.clone(),
        confidence_score: score,
        matching_method: MatchingMethod::ExactAccountCode,
        match_details: MatchDetails::default(),
    }
}

pub(super) fn keywords(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn infrastructure_catalog() -> BudgetCatalog {
    BudgetCatalog::new(vec![
        BudgetProgram {
            id: ProgramId("prog-infra-40".to_string()),
            fiscal_year: 2024,
            organism: "Ministerio de Infraestructura".to_string(),
            program_code: "40".to_string(),
            subprogram_code: Some("01".to_string()),
            account_code: Some("1.2.3.4".to_string()),
            description: "Red vial provincial".to_string(),
            initial_amount: 10_000_000.0,
            current_amount: 10_000_000.0,
            keywords: keywords(&["route", "work"]),
        },
        BudgetProgram {
            account_code: Some("9.9.9.9".to_string()),
            ..program(5_000_000.0, 5_000_000.0)
        },
    ])
    .expect("valid catalog")
}

pub(super) fn tender_page() -> BulletinPage {
    BulletinPage {
        page_number: 1,
        text: TENDER_BLOCK.to_string(),
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    alerts: Mutex<Vec<CitizenAlert>>,
}

impl AlertRepository for MemoryRepository {
    fn save_analysis(&self, analysis: &BulletinAnalysis) -> Result<(), RepositoryError> {
        let mut alerts = self.alerts.lock().expect("alerts mutex poisoned");
        alerts.extend(analysis.alerts.iter().cloned());
        Ok(())
    }

    fn alerts(&self, filter: &AlertFilter) -> Result<Vec<CitizenAlert>, RepositoryError> {
        let alerts = self.alerts.lock().expect("alerts mutex poisoned");
        Ok(alerts
            .iter()
            .filter(|alert| filter.matches(alert))
            .cloned()
            .collect())
    }

    fn alerts_for_act(&self, act_id: &ActId) -> Result<Vec<CitizenAlert>, RepositoryError> {
        let alerts = self.alerts.lock().expect("alerts mutex poisoned");
        Ok(alerts
            .iter()
            .filter(|alert| &alert.act_id == act_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl AlertRepository for UnavailableRepository {
    fn save_analysis(&self, _analysis: &BulletinAnalysis) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn alerts(&self, _filter: &AlertFilter) -> Result<Vec<CitizenAlert>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn alerts_for_act(&self, _act_id: &ActId) -> Result<Vec<CitizenAlert>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<BulletinService<MemoryRepository>>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(BulletinService::new(
        infrastructure_catalog(),
        BulletinAnalyzer::default(),
        Arc::clone(&repository),
    ));
    (service, repository)
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
