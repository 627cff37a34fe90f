//! Canonical domain keywords and their Spanish/English surface forms.

use std::collections::BTreeSet;

use super::text::fold;

/// Canonical term followed by the folded surface forms that map onto it.
const KEYWORD_VOCABULARY: &[(&str, &[&str])] = &[
    ("work", &["obra", "work"]),
    ("tender", &["licitacion", "tender", "concurso de precios"]),
    ("subsidy", &["subsidio", "subvencion", "subsidy", "grant"]),
    ("appointment", &["designacion", "nombramiento", "designase", "appointment", "appointed"]),
    ("contract", &["contrato", "contratacion", "contract"]),
    ("award", &["adjudicacion", "adjudicase", "adjudica", "award"]),
    ("hospital", &["hospital"]),
    ("school", &["escuela", "colegio", "establecimiento educativo", "school"]),
    ("route", &["ruta", "camino", "route"]),
    ("construction", &["construccion", "construction"]),
    ("service", &["servicio", "service"]),
    ("supply", &["suministro", "provision de", "supply", "supplies"]),
    ("maintenance", &["mantenimiento", "maintenance"]),
    ("acquisition", &["adquisicion", "compra de", "acquisition", "purchase"]),
    ("emergency", &["emergencia", "emergency"]),
    ("urgency", &["urgencia", "urgente", "urgency", "urgent"]),
    ("direct", &["directa", "directo", "direct"]),
    ("public", &["publica", "publico", "public"]),
];

/// Keywords whose overlap counts as strong evidence when linking acts to programs.
pub const STRONG_KEYWORDS: &[&str] = &[
    "hospital",
    "school",
    "route",
    "work",
    "tender",
    "construction",
    "service",
    "supply",
];

/// Keywords that mark an act as related to public works.
pub const PUBLIC_WORKS_KEYWORDS: &[&str] = &["work", "construction", "route", "maintenance"];

/// Returns every canonical term with at least one surface form in `text`.
pub fn detect_keywords(text: &str) -> BTreeSet<String> {
    let folded = fold(text);
    KEYWORD_VOCABULARY
        .iter()
        .filter(|(_, forms)| forms.iter().any(|form| folded.contains(form)))
        .map(|(term, _)| (*term).to_string())
        .collect()
}

pub fn is_strong_keyword(keyword: &str) -> bool {
    STRONG_KEYWORDS.contains(&keyword)
}
