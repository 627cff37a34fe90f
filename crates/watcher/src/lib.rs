//! Semantic linking of official bulletin acts to budget programs and
//! red-flag alerting over the linked pairs.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

pub use workflows::bulletin::{
    ActClassifier, AdministrativeAct, AlertRuleEngine, BudgetProgram, BulletinAnalysis,
    BulletinAnalyzer, CitizenAlert, LinkResolver, MatchScorer,
};
pub use workflows::catalog::{BudgetCatalog, BudgetCatalogImporter};
