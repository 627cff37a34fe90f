use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::alerts::{AlertRuleEngine, AlertType, CitizenAlert, Severity};
use super::classifier::ActClassifier;
use super::domain::{AdministrativeAct, BulletinPage};
use super::linking::{ActProgramLink, LinkResolver, DEFAULT_TOP_N};
use crate::workflows::catalog::BudgetCatalog;

const PAGE_BREAK: char = '\u{c}';

/// Splits extracted bulletin text into pages on form feeds. Page numbers
/// start at 1; text without form feeds is a single page.
pub fn pages_from_text(text: &str) -> Vec<BulletinPage> {
    text.split(PAGE_BREAK)
        .enumerate()
        .filter(|(_, body)| !body.trim().is_empty())
        .map(|(index, body)| BulletinPage {
            page_number: index as u32 + 1,
            text: body.to_string(),
        })
        .collect()
}

/// Batch driver running classification, linking and rule evaluation over
/// one bulletin.
#[derive(Debug)]
pub struct BulletinAnalyzer {
    classifier: ActClassifier,
    resolver: LinkResolver,
    engine: AlertRuleEngine,
    top_n: usize,
}

impl Default for BulletinAnalyzer {
    fn default() -> Self {
        Self::new(
            ActClassifier::default(),
            LinkResolver::default(),
            AlertRuleEngine::default(),
        )
    }
}

impl BulletinAnalyzer {
    pub fn new(classifier: ActClassifier, resolver: LinkResolver, engine: AlertRuleEngine) -> Self {
        Self {
            classifier,
            resolver,
            engine,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    pub fn classifier(&self) -> &ActClassifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &LinkResolver {
        &self.resolver
    }

    pub fn engine(&self) -> &AlertRuleEngine {
        &self.engine
    }

    pub fn analyze(
        &self,
        document_id: &str,
        pages: &[BulletinPage],
        catalog: &BudgetCatalog,
    ) -> BulletinAnalysis {
        let mut summary = AnalysisSummary::new(pages.len());
        let mut acts = Vec::new();

        for page in pages {
            let classified = self.classifier.classify_page(document_id, page);
            summary.blocks_seen += classified.blocks_seen;
            summary.blocks_discarded += classified.blocks_too_short + classified.blocks_unrecognized;
            acts.extend(classified.acts);
        }
        summary.acts_classified = acts.len();

        let mut links = Vec::new();
        let mut alerts = Vec::new();
        for act in &acts {
            let act_links = self.resolver.resolve(act, catalog.programs(), self.top_n);
            if !act_links.is_empty() {
                summary.acts_linked += 1;
            }
            let act_alerts = self.engine.evaluate(act, &act_links, catalog.programs());
            debug!(
                act_id = %act.id,
                links = act_links.len(),
                alerts = act_alerts.len(),
                "act evaluated"
            );
            for alert in &act_alerts {
                summary.record_alert(alert);
            }
            links.extend(act_links);
            alerts.extend(act_alerts);
        }

        summary.links = links.len();
        info!(
            document_id,
            pages = summary.pages,
            acts = summary.acts_classified,
            linked = summary.acts_linked,
            alerts = alerts.len(),
            "bulletin analyzed"
        );

        BulletinAnalysis {
            document_id: document_id.to_string(),
            acts,
            links,
            alerts,
            summary,
        }
    }
}

/// Everything produced for one bulletin run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletinAnalysis {
    pub document_id: String,
    pub acts: Vec<AdministrativeAct>,
    pub links: Vec<ActProgramLink>,
    pub alerts: Vec<CitizenAlert>,
    pub summary: AnalysisSummary,
}

impl BulletinAnalysis {
    pub fn alerts_with_severity(&self, severity: Severity) -> impl Iterator<Item = &CitizenAlert> {
        self.alerts
            .iter()
            .filter(move |alert| alert.severity == severity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub pages: usize,
    pub blocks_seen: usize,
    pub blocks_discarded: usize,
    pub acts_classified: usize,
    pub acts_linked: usize,
    pub links: usize,
    pub alerts_by_severity: BTreeMap<Severity, usize>,
    pub alerts_by_type: BTreeMap<AlertType, usize>,
}

impl AnalysisSummary {
    fn new(pages: usize) -> Self {
        Self {
            pages,
            alerts_by_severity: Severity::ordered()
                .into_iter()
                .map(|severity| (severity, 0))
                .collect(),
            ..Self::default()
        }
    }

    fn record_alert(&mut self, alert: &CitizenAlert) {
        *self.alerts_by_severity.entry(alert.severity).or_default() += 1;
        *self.alerts_by_type.entry(alert.alert_type).or_default() += 1;
    }

    pub fn total_alerts(&self) -> usize {
        self.alerts_by_severity.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_split_on_form_feeds() {
        let pages = pages_from_text("first page\u{c}\u{c}third page");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].page_number, 3);
        assert_eq!(pages[1].text, "third page");

        assert_eq!(pages_from_text("only one").len(), 1);
        assert!(pages_from_text("  ").is_empty());
    }

    #[test]
    fn empty_bulletin_yields_zeroed_summary() {
        let analysis = BulletinAnalyzer::default().analyze("bo-empty", &[], &BudgetCatalog::default());
        assert!(analysis.acts.is_empty());
        assert_eq!(analysis.summary.total_alerts(), 0);
        assert_eq!(analysis.summary.alerts_by_severity.get(&Severity::High), Some(&0));
    }
}
