use std::collections::BTreeSet;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use super::patterns::{
    ACCOUNT_CODE_PATTERNS, AMOUNT_PATTERNS, BENEFICIARY_PATTERNS, ENGLISH_DATE, NAME_TERMINATORS,
    NUMERIC_DATE, ORGANISM_PATTERNS, SPANISH_DATE,
};
use crate::workflows::bulletin::domain::UNSPECIFIED_ORGANISM;
use crate::workflows::text::{collapse_whitespace, truncate_chars};
use crate::workflows::vocabulary::detect_keywords;

const ORGANISM_MAX_CHARS: usize = 100;
const BENEFICIARY_MAX_CHARS: usize = 150;

/// Best-effort fields pulled from one text block. Every field is optional
/// except `organism`, which falls back to [`UNSPECIFIED_ORGANISM`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedFields {
    pub amount: Option<f64>,
    pub account_code: Option<String>,
    pub organism: String,
    pub beneficiary: Option<String>,
    pub date: Option<NaiveDate>,
    pub keywords: BTreeSet<String>,
}

pub(crate) fn extract_fields(text: &str) -> ExtractedFields {
    ExtractedFields {
        amount: extract_amount(text),
        account_code: extract_account_code(text),
        organism: extract_organism(text).unwrap_or_else(|| UNSPECIFIED_ORGANISM.to_string()),
        beneficiary: extract_beneficiary(text),
        date: extract_date(text),
        keywords: detect_keywords(text),
    }
}

/// Each pattern gets one attempt; a capture that fails to parse falls through
/// to the next pattern.
pub(crate) fn extract_amount(text: &str) -> Option<f64> {
    AMOUNT_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|raw| parse_amount(raw.as_str()))
    })
}

/// Parses `15.000.000`, `1.234.567,89`, `1,500,000.50` and `1500,5`.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_end_matches(['.', ',']);
    if trimmed.is_empty() {
        return None;
    }

    let dots = trimmed.matches('.').count();
    let commas = trimmed.matches(',').count();

    let normalized = match (dots, commas) {
        (0, 0) => trimmed.to_string(),
        (_, 0) => {
            if dots > 1 || last_group_len(trimmed, '.') == 3 {
                trimmed.replace('.', "")
            } else {
                trimmed.to_string()
            }
        }
        (0, _) => {
            if commas > 1 || last_group_len(trimmed, ',') == 3 {
                trimmed.replace(',', "")
            } else {
                trimmed.replace(',', ".")
            }
        }
        _ => {
            let last_dot = trimmed.rfind('.');
            let last_comma = trimmed.rfind(',');
            if last_comma > last_dot {
                trimmed.replace('.', "").replace(',', ".")
            } else {
                trimmed.replace(',', "")
            }
        }
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn last_group_len(value: &str, separator: char) -> usize {
    value
        .rsplit(separator)
        .next()
        .map(str::len)
        .unwrap_or_default()
}

pub(crate) fn extract_account_code(text: &str) -> Option<String> {
    first_capture(&ACCOUNT_CODE_PATTERNS, text)
}

pub(crate) fn extract_organism(text: &str) -> Option<String> {
    first_capture(&ORGANISM_PATTERNS, text)
        .map(|name| clean_name(&name, ORGANISM_MAX_CHARS))
        .filter(|name| !name.is_empty())
}

pub(crate) fn extract_beneficiary(text: &str) -> Option<String> {
    first_capture(&BENEFICIARY_PATTERNS, text)
        .map(|name| clean_name(&name, BENEFICIARY_MAX_CHARS))
        .filter(|name| !name.is_empty())
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|capture| capture.as_str().trim().to_string())
    })
}

/// Cuts a captured name at the first connector phrase, then trims and truncates.
fn clean_name(raw: &str, max_chars: usize) -> String {
    let collapsed = collapse_whitespace(raw);
    // ASCII upper-casing keeps byte offsets aligned with `collapsed`.
    let upper = format!("{} ", collapsed.to_ascii_uppercase());
    let cut = NAME_TERMINATORS
        .iter()
        .filter_map(|terminator| upper.find(terminator))
        .min()
        .unwrap_or(collapsed.len());
    let name = collapsed[..cut.min(collapsed.len())]
        .trim()
        .trim_end_matches(['.', '-']);
    truncate_chars(name.trim(), max_chars)
}

pub(crate) fn extract_date(text: &str) -> Option<NaiveDate> {
    let numeric = NUMERIC_DATE.captures_iter(text).find_map(|caps| {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    });
    if numeric.is_some() {
        return numeric;
    }

    let spanish = SPANISH_DATE.captures_iter(text).find_map(|caps| {
        let day = caps[1].parse().ok()?;
        let month = spanish_month(&caps[2])?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    });
    if spanish.is_some() {
        return spanish;
    }

    ENGLISH_DATE.captures_iter(text).find_map(|caps| {
        let month = english_month(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn spanish_month(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "enero" => 1,
        "febrero" => 2,
        "marzo" => 3,
        "abril" => 4,
        "mayo" => 5,
        "junio" => 6,
        "julio" => 7,
        "agosto" => 8,
        "septiembre" | "setiembre" => 9,
        "octubre" => 10,
        "noviembre" => 11,
        "diciembre" => 12,
        _ => return None,
    };
    Some(month)
}

fn english_month(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    };
    Some(month)
}
