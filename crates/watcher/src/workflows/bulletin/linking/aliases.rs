use serde::{Deserialize, Serialize};

/// Semantic groups used to relate organisms whose names differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AliasCategory {
    Economy,
    Health,
    Education,
    Works,
    Security,
    SocialDevelopment,
    Production,
    Environment,
}

impl AliasCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Economy => "ECONOMY",
            Self::Health => "HEALTH",
            Self::Education => "EDUCATION",
            Self::Works => "WORKS",
            Self::Security => "SECURITY",
            Self::SocialDevelopment => "SOCIAL_DEVELOPMENT",
            Self::Production => "PRODUCTION",
            Self::Environment => "ENVIRONMENT",
        }
    }
}

/// Folded, upper-case name fragments per category. First category with a hit wins.
pub(crate) const ALIAS_TABLE: &[(AliasCategory, &[&str])] = &[
    (
        AliasCategory::Economy,
        &["ECONOMIA", "HACIENDA", "FINANZAS", "ECONOMY", "FINANCE", "TREASURY"],
    ),
    (AliasCategory::Health, &["SALUD", "HOSPITAL", "HEALTH"]),
    (
        AliasCategory::Education,
        &["EDUCACION", "ESCUELA", "ESCOLAR", "EDUCATION", "SCHOOL"],
    ),
    (
        AliasCategory::Works,
        &[
            "OBRAS",
            "INFRAESTRUCTURA",
            "VIALIDAD",
            "VIVIENDA",
            "WORKS",
            "INFRASTRUCTURE",
            "ROADS",
            "HOUSING",
        ],
    ),
    (
        AliasCategory::Security,
        &["SEGURIDAD", "POLICIA", "PENITENCIARI", "SECURITY", "POLICE"],
    ),
    (
        AliasCategory::SocialDevelopment,
        &[
            "DESARROLLO SOCIAL",
            "ACCION SOCIAL",
            "FAMILIA",
            "SOCIAL DEVELOPMENT",
            "SOCIAL WELFARE",
        ],
    ),
    (
        AliasCategory::Production,
        &[
            "PRODUCCION",
            "AGRICULTURA",
            "GANADERIA",
            "INDUSTRIA",
            "PRODUCTION",
            "AGRICULTURE",
            "INDUSTRY",
        ],
    ),
    (
        AliasCategory::Environment,
        &["AMBIENTE", "AMBIENTAL", "RECURSOS NATURALES", "ENVIRONMENT", "NATURAL RESOURCES"],
    ),
];

/// Institutional prefixes removed by the normalizer (folded, upper-case).
pub(crate) const ORGANISM_PREFIXES: &[&str] = &[
    "SUB-SECRETARIAT OF ",
    "SUBSECRETARIAT OF ",
    "SUBSECRETARIA DE ",
    "DIRECCION PROVINCIAL DE ",
    "DIRECCION GENERAL DE ",
    "DIRECTORATE GENERAL OF ",
    "SECRETARIAT OF ",
    "DIRECTORATE OF ",
    "SECRETARIA DE ",
    "MINISTERIO DE ",
    "DIRECCION DE ",
    "MINISTRY OF ",
];
