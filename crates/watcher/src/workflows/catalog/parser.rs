use std::collections::BTreeSet;
use std::io::Read;

use serde::{Deserialize, Deserializer};

use crate::workflows::bulletin::domain::{BudgetProgram, ProgramId};
use crate::workflows::text::fold;
use crate::workflows::vocabulary::detect_keywords;

const MIN_TOKEN_CHARS: usize = 4;

const STOP_WORDS: &[&str] = &[
    "para", "como", "desde", "sobre", "entre", "hacia", "segun", "otros", "otras", "todos",
    "with", "from", "that", "this", "into", "other", "their", "under",
];

pub(crate) fn parse_programs<R: Read>(reader: R) -> Result<Vec<BudgetProgram>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut programs = Vec::new();

    for record in csv_reader.deserialize::<CatalogRow>() {
        let row = record?;
        programs.push(row.into_program());
    }

    Ok(programs)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    fiscal_year: i32,
    organism: String,
    program_code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    subprogram_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    account_code: Option<String>,
    description: String,
    initial_amount: f64,
    current_amount: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    funding_source: Option<String>,
}

impl CatalogRow {
    fn into_program(self) -> BudgetProgram {
        let keywords = self
            .funding_source
            .as_deref()
            .map(derive_keywords)
            .unwrap_or_default();
        BudgetProgram {
            id: ProgramId(self.id),
            fiscal_year: self.fiscal_year,
            organism: self.organism,
            program_code: self.program_code,
            subprogram_code: self.subprogram_code,
            account_code: self.account_code,
            description: self.description,
            initial_amount: self.initial_amount,
            current_amount: self.current_amount,
            keywords,
        }
    }
}

/// Canonical vocabulary hits plus the significant raw tokens of the text.
pub(crate) fn derive_keywords(text: &str) -> BTreeSet<String> {
    let mut keywords = detect_keywords(text);
    let folded = fold(text);
    keywords.extend(
        folded
            .split(|ch: char| !ch.is_alphabetic())
            .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
            .filter(|token| !STOP_WORDS.contains(token))
            .map(str::to_string),
    );
    keywords
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
