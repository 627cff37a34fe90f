//! Official bulletin processing: act classification, act-to-program linking,
//! red-flag rules and the batch pipeline tying them together.

pub mod alerts;
pub mod analysis;
pub mod classifier;
pub mod domain;
pub mod linking;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use alerts::{
    format_amount, AlertDeduplicationCache, AlertRuleEngine, AlertThresholds, AlertType,
    BudgetContext, CitizenAlert, Severity,
};
pub use analysis::{pages_from_text, AnalysisSummary, BulletinAnalysis, BulletinAnalyzer};
pub use classifier::{ActClassifier, ExtractedFields, PageClassification, TypeDetection};
pub use domain::{
    ActId, ActType, AdministrativeAct, BudgetProgram, BulletinPage, ProgramId, RecordError,
    RiskLevel, UNSPECIFIED_ORGANISM,
};
pub use linking::{
    ActProgramLink, AliasCategory, AliasNormalizer, LinkResolver, MatchDetails, MatchScore,
    MatchScorer, MatchSignal, MatchingMethod, SynonymError, SynonymVocabulary,
};
pub use repository::{AlertFilter, AlertRepository, RepositoryError};
pub use router::bulletin_router;
pub use service::{AnalyzeRequest, BulletinService, BulletinServiceError, ClassifyRequest};
