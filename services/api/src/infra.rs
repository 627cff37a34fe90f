use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;
use watcher::config::EngineConfig;
use watcher::error::AppError;
use watcher::workflows::bulletin::{
    ActClassifier, ActId, AlertFilter, AlertRepository, AlertRuleEngine, AlertThresholds,
    BulletinAnalysis, BulletinAnalyzer, CitizenAlert, LinkResolver, MatchScorer,
    RepositoryError, SynonymVocabulary,
};
use watcher::workflows::catalog::{BudgetCatalog, BudgetCatalogImporter};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local alert store. Alerts are kept in the order they were emitted.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertRepository {
    alerts: Arc<Mutex<Vec<CitizenAlert>>>,
}

impl InMemoryAlertRepository {
    fn stored(&self) -> MutexGuard<'_, Vec<CitizenAlert>> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn len(&self) -> usize {
        self.stored().len()
    }
}

impl AlertRepository for InMemoryAlertRepository {
    fn save_analysis(&self, analysis: &BulletinAnalysis) -> Result<(), RepositoryError> {
        self.stored().extend(analysis.alerts.iter().cloned());
        Ok(())
    }

    fn alerts(&self, filter: &AlertFilter) -> Result<Vec<CitizenAlert>, RepositoryError> {
        Ok(self
            .stored()
            .iter()
            .filter(|alert| filter.matches(alert))
            .cloned()
            .collect())
    }

    fn alerts_for_act(&self, act_id: &ActId) -> Result<Vec<CitizenAlert>, RepositoryError> {
        Ok(self
            .stored()
            .iter()
            .filter(|alert| &alert.act_id == act_id)
            .cloned()
            .collect())
    }
}

/// Imports the catalog and narrows it to one fiscal year when requested.
pub(crate) fn load_catalog(
    path: &Path,
    fiscal_year: Option<i32>,
) -> Result<BudgetCatalog, AppError> {
    let catalog = BudgetCatalogImporter::from_path(path)?;
    Ok(match fiscal_year {
        Some(year) => {
            let narrowed = catalog.for_fiscal_year(year);
            info!(
                fiscal_year = year,
                programs = narrowed.len(),
                "catalog narrowed to fiscal year"
            );
            narrowed
        }
        None => catalog,
    })
}

/// Wires classifier, resolver and rule engine from the engine settings.
pub(crate) fn build_analyzer(
    engine: &EngineConfig,
    synonyms_path: Option<&Path>,
) -> Result<BulletinAnalyzer, AppError> {
    let scorer = match synonyms_path {
        Some(path) => {
            let synonyms = SynonymVocabulary::from_path(path)?;
            info!(entries = synonyms.len(), "synonym vocabulary loaded");
            MatchScorer::with_synonyms(synonyms)
        }
        None => MatchScorer::new(),
    };

    let resolver = LinkResolver::new(scorer).with_min_confidence(engine.min_confidence);
    let thresholds = AlertThresholds {
        min_link_confidence: engine.min_confidence,
        ..AlertThresholds::default()
    };

    Ok(BulletinAnalyzer::new(
        ActClassifier::new(),
        resolver,
        AlertRuleEngine::new(thresholds),
    )
    .with_top_n(engine.top_n))
}
