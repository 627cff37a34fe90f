use std::sync::LazyLock;

use regex::Regex;

use super::aliases::{AliasCategory, ALIAS_TABLE, ORGANISM_PREFIXES};
use crate::workflows::text::{collapse_whitespace, fold_upper};

static LEADING_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(?:[.\d]*\d)?\s*[-–.:]?\s*").expect("invalid leading code pattern")
});

/// Canonicalizes organism names so that budget-catalog spellings and bulletin
/// spellings compare equal. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasNormalizer;

impl AliasNormalizer {
    /// `"12 - Ministerio de Obras Públicas"` becomes `"OBRAS PUBLICAS"`.
    pub fn normalize(&self, name: &str) -> String {
        let mut normalized = collapse_whitespace(&fold_upper(name));

        loop {
            let before = normalized.len();
            normalized = LEADING_CODE.replace(&normalized, "").into_owned();
            if let Some(prefix) = ORGANISM_PREFIXES
                .iter()
                .find(|prefix| normalized.starts_with(*prefix))
            {
                normalized = normalized[prefix.len()..].to_string();
            }
            normalized = normalized.trim().to_string();
            if normalized.len() == before {
                break;
            }
        }

        normalized
    }

    pub fn alias_group(&self, name: &str) -> Option<AliasCategory> {
        let normalized = self.normalize(name);
        if normalized.is_empty() {
            return None;
        }

        ALIAS_TABLE
            .iter()
            .find(|(_, fragments)| fragments.iter().any(|fragment| normalized.contains(fragment)))
            .map(|(category, _)| *category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefixes_codes_and_accents() {
        let normalizer = AliasNormalizer;
        assert_eq!(
            normalizer.normalize("12 - Ministerio de Obras Públicas"),
            "OBRAS PUBLICAS"
        );
        assert_eq!(normalizer.normalize("  MINISTRY OF   PUBLIC WORKS "), "PUBLIC WORKS");
        assert_eq!(
            normalizer.normalize("Dirección General de Escuelas"),
            "ESCUELAS"
        );
        assert_eq!(normalizer.normalize("Hospital Central"), "HOSPITAL CENTRAL");
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn alias_group_maps_synonymous_organisms() {
        let normalizer = AliasNormalizer;
        assert_eq!(
            normalizer.alias_group("Ministerio de Infraestructura"),
            Some(AliasCategory::Works)
        );
        assert_eq!(
            normalizer.alias_group("DIRECCIÓN PROVINCIAL DE VIALIDAD"),
            Some(AliasCategory::Works)
        );
        assert_eq!(
            normalizer.alias_group("Ministry of Health"),
            Some(AliasCategory::Health)
        );
        assert_eq!(normalizer.alias_group("Fiscalía de Estado"), None);
        assert_eq!(normalizer.alias_group(""), None);
    }
}
