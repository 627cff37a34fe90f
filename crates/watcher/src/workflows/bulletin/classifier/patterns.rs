//! Ordered regex tables. Order is priority: the first family (and within a
//! family, the first pattern) that matches wins.

use std::sync::LazyLock;

use regex::Regex;

use super::super::domain::ActType;

/// Optional `N°`/`Nro.`/`No.`/`Número` marker followed by a captured act number.
const NUMBER: &str = r"\s*(?:N(?:[°º]|RO\.?|O\.?|[UÚ]MERO|UMBER)?\.?\s*)?(\d+(?:[./-]\d+)*)";

/// Organism and beneficiary captures stop at these delimiters.
const NAME_TAIL: &str = r"[^,;:.\n()]+";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid classifier pattern")
}

fn numbered(prefix: &str) -> Regex {
    compile(&format!("(?i){prefix}{NUMBER}"))
}

/// Start of a line or of a sentence. Decree and resolution headings must sit
/// here so that citations of other acts inside the body ("VISTO el Decreto
/// N° 12...") do not decide the type.
const HEADING: &str = r"(?m)(?:^|[.;]\s+)\s*";

/// Act-type families in evaluation order.
pub(crate) static ACT_TYPE_PATTERNS: LazyLock<Vec<(ActType, Vec<Regex>)>> = LazyLock::new(|| {
    vec![
        (
            ActType::Decree,
            vec![
                numbered(&format!("{HEADING}DECRETO")),
                numbered(&format!("{HEADING}DECREE")),
                compile(&format!(r"(?i){HEADING}(?:DECRETO|DECREE)\b")),
            ],
        ),
        (
            ActType::Resolution,
            vec![
                numbered(&format!("{HEADING}RESOLUCI[OÓ]N")),
                numbered(&format!("{HEADING}RESOLUTION")),
                compile(&format!(r"(?i){HEADING}(?:RESOLUCI[OÓ]N|RESOLUTION)\b")),
            ],
        ),
        (
            ActType::Tender,
            vec![
                numbered(r"\bLICITACI[OÓ]N(?:\s+P[UÚ]BLICA|\s+PRIVADA)?"),
                numbered(r"\b(?:PUBLIC\s+)?TENDER"),
                compile(r"(?i)\bLICITACI[OÓ]N\b"),
                compile(r"(?i)\bCONCURSO\s+DE\s+PRECIOS\b"),
                compile(r"(?i)\b(?:PUBLIC\s+)?TENDER\b"),
            ],
        ),
        (
            ActType::Appointment,
            vec![
                compile(r"(?i)\bDES[IÍ]GNA(?:SE|SELO|SELA)\b"),
                compile(r"(?i)\b(?:N[OÓ]MBRASE|NOMBRAMIENTO)\b"),
                compile(r"(?i)\bDESIGNACI[OÓ]N\b"),
                compile(r"(?i)\bAPPOINT(?:ED|MENT|S)?\b"),
            ],
        ),
        (
            ActType::Subsidy,
            vec![
                compile(r"(?i)\bSUBSIDIO\b"),
                compile(r"(?i)\bSUBVENCI[OÓ]N\b"),
                compile(r"(?i)\bAYUDA\s+ECON[OÓ]MICA\b"),
                compile(r"(?i)\b(?:SUBSIDY|SUBSIDIES|GRANT)\b"),
            ],
        ),
        (
            ActType::DirectContract,
            vec![
                compile(r"(?i)\bCONTRATACI[OÓ]N\s+DIRECTA\b"),
                compile(r"(?i)\bADJUDICACI[OÓ]N\s+DIRECTA\b"),
                compile(r"(?i)\bDIRECT\s+(?:CONTRACT|AWARD|HIRING)\b"),
            ],
        ),
        (
            ActType::BudgetAmendment,
            vec![
                compile(r"(?i)\bMODIFICACI[OÓ]N\s+PRESUPUESTARIA\b"),
                compile(r"(?i)\bREFUERZO\s+PRESUPUESTARIO\b"),
                compile(r"(?i)\bBUDGET\s+(?:AMENDMENT|MODIFICATION|REALLOCATION)\b"),
            ],
        ),
    ]
});

/// `$N`, `PESOS N`, `SUMA DE $N`, `MONTO DE $N`, `IMPORTE DE $N`.
pub(crate) static AMOUNT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(r"\$\s*(\d[\d.,]*)"),
        compile(r"(?i)\bPESOS\s+(\d[\d.,]*)"),
        compile(r"(?i)\bSUMA\s+DE\s+\$?\s*(\d[\d.,]*)"),
        compile(r"(?i)\bMONTO\s+DE\s+\$?\s*(\d[\d.,]*)"),
        compile(r"(?i)\bIMPORTE\s+DE\s+\$?\s*(\d[\d.,]*)"),
    ]
});

const CODE: &str = r"(\d[\d.\-/]*\d|\d)";

/// `PARTIDA N`, `PART. N`, `INCISO N`, `PROGRAMA N`.
pub(crate) static ACCOUNT_CODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(&format!(
            r"(?i)\b(?:PARTIDA(?:\s+PRESUPUESTARIA)?|ACCOUNT\s+CODE)\s*(?:N[°º]?\.?\s*)?:?\s*{CODE}"
        )),
        compile(&format!(r"(?i)\bPART\.\s*{CODE}")),
        compile(&format!(r"(?i)\bINCISO\s*:?\s*{CODE}")),
        compile(&format!(
            r"(?i)\bPROGRAMA?\s*(?:N[°º]?\.?\s*)?:?\s*{CODE}"
        )),
    ]
});

/// Institutional nouns, captured together with the rest of the name.
pub(crate) static ORGANISM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"MINISTERIO\s+DE|MINISTRY\s+OF",
        r"SECRETAR[IÍ]A\s+DE|SECRETARIAT\s+OF",
        r"DIRECCI[OÓ]N\s+(?:GENERAL\s+|PROVINCIAL\s+)?DE|DIRECTORATE\s+(?:GENERAL\s+)?OF",
        r"SUBSECRETAR[IÍ]A\s+DE|SUB-?SECRETARIAT\s+OF",
        r"AGENCIA|AGENCY",
        r"TRIBUNAL\s+DE|TRIBUNAL\s+OF|COURT\s+OF",
    ]
    .iter()
    .map(|noun| compile(&format!(r"(?i)\b((?:{noun})\s+{NAME_TAIL})")))
    .collect()
});

/// Beneficiary labels, honorific-prefixed names and company/cooperative names.
pub(crate) static BENEFICIARY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(r"(?i)\b(?:BENEFICIARI[OA]|BENEFICIARY)\s*:\s*([^,;\n]+)"),
        compile(r"(?i)\b(?:ADJUDICATARI[OA]|AWARDEE)\s*:\s*([^,;\n]+)"),
        compile(r"(?i)\b(?:CONTRATISTA|CONTRACTOR)\s*:\s*([^,;\n]+)"),
        compile(r"(?i)\b(?:PROVEEDOR|SUPPLIER)\s*:\s*([^,;\n]+)"),
        compile(
            r"\b(?i:SRA|SR|DRA|DR|ING|LIC|ARQ|CRA|CR|MRS|MR|MS)\.?\s+(\p{Lu}[\p{L}'-]+(?:\s+\p{Lu}[\p{L}'-]+){0,4})",
        ),
        compile(r"(?i)\b((?:EMPRESA|COMPANY)\s+[^,;\n]+)"),
        compile(r"(?i)\b((?:COOPERATIVA|COOPERATIVE)\s+[^,;\n]+)"),
        compile(r"(?i)\b(?:A\s+FAVOR\s+DE(?:L|\s+LA)?|IN\s+FAVOU?R\s+OF)\s+([^,;\n]+)"),
    ]
});

/// Phrases that end a captured organism or beneficiary name.
pub(crate) const NAME_TERMINATORS: &[&str] = &[
    " POR ",
    " QUE ",
    " PARA ",
    " A FAVOR ",
    " MEDIANTE ",
    " CON DESTINO ",
    " FOR ",
    " BY ",
    " WHICH ",
    " THAT ",
    " TO ",
];

pub(crate) static NUMERIC_DATE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b"));

pub(crate) static SPANISH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(\d{1,2})\s+DE\s+(ENERO|FEBRERO|MARZO|ABRIL|MAYO|JUNIO|JULIO|AGOSTO|SEPTIEMBRE|SETIEMBRE|OCTUBRE|NOVIEMBRE|DICIEMBRE)\s+(?:DE|DEL)\s+(\d{4})\b",
    )
});

pub(crate) static ENGLISH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(JANUARY|FEBRUARY|MARCH|APRIL|MAY|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER)\s+(\d{1,2}),?\s+(\d{4})\b",
    )
});

pub(crate) static BLOCK_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| compile(r"\n[ \t\r]*\n"));
