use serde::{Deserialize, Serialize};

use super::alerts::{AlertType, CitizenAlert, Severity};
use super::analysis::BulletinAnalysis;
use super::domain::ActId;

/// Storage abstraction for analysis output so the service can be exercised
/// in isolation.
pub trait AlertRepository: Send + Sync {
    fn save_analysis(&self, analysis: &BulletinAnalysis) -> Result<(), RepositoryError>;
    fn alerts(&self, filter: &AlertFilter) -> Result<Vec<CitizenAlert>, RepositoryError>;
    fn alerts_for_act(&self, act_id: &ActId) -> Result<Vec<CitizenAlert>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Optional narrowing applied when listing persisted alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertFilter {
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub alert_type: Option<AlertType>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &CitizenAlert) -> bool {
        self.severity.map_or(true, |severity| alert.severity == severity)
            && self
                .alert_type
                .map_or(true, |alert_type| alert.alert_type == alert_type)
    }
}
