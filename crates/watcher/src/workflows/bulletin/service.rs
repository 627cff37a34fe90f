use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::alerts::CitizenAlert;
use super::analysis::{BulletinAnalysis, BulletinAnalyzer};
use super::domain::{ActId, AdministrativeAct, BulletinPage};
use super::repository::{AlertFilter, AlertRepository, RepositoryError};
use crate::workflows::catalog::BudgetCatalog;

const AD_HOC_DOCUMENT_ID: &str = "ad-hoc";

/// Bulletin submitted for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzeRequest {
    pub document_id: String,
    #[serde(default)]
    pub pages: Vec<BulletinPage>,
}

/// Single text block submitted for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifyRequest {
    pub text: String,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub page_number: Option<u32>,
}

/// Service composing the budget catalog, analyzer and alert repository.
///
/// The analyzer's deduplication cache lives as long as the service, so an
/// `(act, alert type)` pair is reported once per service lifetime. It grows
/// with every distinct act analyzed until [`Self::reset_alert_history`] runs.
pub struct BulletinService<R> {
    catalog: Arc<BudgetCatalog>,
    analyzer: Arc<BulletinAnalyzer>,
    repository: Arc<R>,
}

impl<R> BulletinService<R>
where
    R: AlertRepository + 'static,
{
    pub fn new(catalog: BudgetCatalog, analyzer: BulletinAnalyzer, repository: Arc<R>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            analyzer: Arc::new(analyzer),
            repository,
        }
    }

    pub fn catalog(&self) -> &BudgetCatalog {
        &self.catalog
    }

    pub fn analyzer(&self) -> &BulletinAnalyzer {
        &self.analyzer
    }

    /// Analyze a bulletin against the loaded catalog and persist the output.
    pub fn analyze(
        &self,
        request: AnalyzeRequest,
    ) -> Result<BulletinAnalysis, BulletinServiceError> {
        let document_id = request.document_id.trim();
        if document_id.is_empty() {
            return Err(BulletinServiceError::InvalidRequest(
                "document_id must not be empty".to_string(),
            ));
        }

        let analysis = self
            .analyzer
            .analyze(document_id, &request.pages, &self.catalog);
        self.repository.save_analysis(&analysis)?;
        Ok(analysis)
    }

    /// Classify a single block without linking or alerting.
    pub fn classify(&self, request: &ClassifyRequest) -> Option<AdministrativeAct> {
        let document_id = request
            .document_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(AD_HOC_DOCUMENT_ID);
        self.analyzer.classifier().classify(
            &request.text,
            document_id,
            request.page_number.unwrap_or(1),
            0,
        )
    }

    /// Forget which alerts were already emitted. Persisted alerts are kept.
    pub fn reset_alert_history(&self) {
        self.analyzer.engine().reset();
    }

    pub fn alerts(&self, filter: &AlertFilter) -> Result<Vec<CitizenAlert>, BulletinServiceError> {
        Ok(self.repository.alerts(filter)?)
    }

    pub fn alerts_for_act(&self, act_id: &ActId) -> Result<Vec<CitizenAlert>, BulletinServiceError> {
        Ok(self.repository.alerts_for_act(act_id)?)
    }
}

/// Error raised by the bulletin service.
#[derive(Debug, thiserror::Error)]
pub enum BulletinServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
