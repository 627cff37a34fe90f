use crate::infra::{build_analyzer, load_catalog};
use clap::Args;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use watcher::config::AppConfig;
use watcher::error::AppError;
use watcher::workflows::bulletin::{
    format_amount, pages_from_text, ActClassifier, AdministrativeAct, BulletinAnalysis, Severity,
};
use watcher::workflows::catalog::BudgetCatalog;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Bulletin text file; pages are separated by form feeds
    #[arg(long)]
    pub(crate) bulletin: PathBuf,
    /// Budget catalog CSV export
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// Document identifier (defaults to the bulletin file name)
    #[arg(long)]
    pub(crate) document_id: Option<String>,
    /// Optional JSON synonym vocabulary used to widen keyword matching
    #[arg(long)]
    pub(crate) synonyms: Option<PathBuf>,
    /// Print the full analysis as JSON instead of the readable report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Text of a single bulletin block
    #[arg(long)]
    pub(crate) text: String,
    /// Document identifier used to build the act id
    #[arg(long, default_value = "ad-hoc")]
    pub(crate) document_id: String,
    /// Page number used to build the act id
    #[arg(long, default_value_t = 1)]
    pub(crate) page_number: u32,
    /// Print the classified act as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        bulletin,
        catalog,
        document_id,
        synonyms,
        json,
    } = args;

    let engine = AppConfig::load()?.engine;
    let text = std::fs::read_to_string(&bulletin)?;
    let document_id = document_id.unwrap_or_else(|| default_document_id(&bulletin));
    let catalog = load_catalog(&catalog, engine.fiscal_year)?;
    let synonyms = synonyms.or_else(|| engine.synonyms_path.clone());
    let analyzer = build_analyzer(&engine, synonyms.as_deref())?;

    let analysis = analyzer.analyze(&document_id, &pages_from_text(&text), &catalog);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &analysis)?;
        writeln!(out)?;
    } else {
        render_analysis(&mut out, &analysis, &catalog)?;
    }
    Ok(())
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let act = ActClassifier::new().classify(&args.text, &args.document_id, args.page_number, 0);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &act)?;
        writeln!(out)?;
        return Ok(());
    }

    match act {
        Some(act) => render_act(&mut out, &act)?,
        None => writeln!(out, "No administrative act recognized in the supplied text.")?,
    }
    Ok(())
}

fn default_document_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.trim().is_empty())
        .unwrap_or("bulletin")
        .to_string()
}

fn render_act<W: Write>(out: &mut W, act: &AdministrativeAct) -> io::Result<()> {
    writeln!(out, "{} {}", act.act_type.label(), act.number.as_deref().unwrap_or("(unnumbered)"))?;
    writeln!(out, "- id: {}", act.id)?;
    writeln!(out, "- organism: {}", act.organism)?;
    if let Some(beneficiary) = &act.beneficiary {
        writeln!(out, "- beneficiary: {beneficiary}")?;
    }
    if let Some(amount) = act.amount {
        writeln!(out, "- amount: {}", format_amount(amount))?;
    }
    if let Some(code) = &act.account_code {
        writeln!(out, "- account code: {code}")?;
    }
    if let Some(date) = act.date {
        writeln!(out, "- date: {date}")?;
    }
    if act.risk_keywords.is_empty() {
        writeln!(out, "- risk: {}", act.risk_level.as_str())?;
    } else {
        writeln!(
            out,
            "- risk: {} ({})",
            act.risk_level.as_str(),
            act.risk_keywords.join(", ")
        )?;
    }
    if !act.keywords.is_empty() {
        let keywords: Vec<&str> = act.keywords.iter().map(String::as_str).collect();
        writeln!(out, "- keywords: {}", keywords.join(", "))?;
    }
    Ok(())
}

fn render_analysis<W: Write>(
    out: &mut W,
    analysis: &BulletinAnalysis,
    catalog: &BudgetCatalog,
) -> io::Result<()> {
    let summary = &analysis.summary;
    writeln!(out, "Bulletin analysis: {}", analysis.document_id)?;
    writeln!(
        out,
        "- {} pages | {} blocks ({} discarded) | {} acts classified | {} linked | {} alerts",
        summary.pages,
        summary.blocks_seen,
        summary.blocks_discarded,
        summary.acts_classified,
        summary.acts_linked,
        summary.total_alerts()
    )?;

    writeln!(out, "\nActs")?;
    if analysis.acts.is_empty() {
        writeln!(out, "  (none recognized)")?;
    }
    for act in &analysis.acts {
        let amount = act
            .amount
            .map(format_amount)
            .unwrap_or_else(|| "no amount".to_string());
        writeln!(
            out,
            "  - [{}] {} {} | {} | {} | risk {}",
            act.id,
            act.act_type.label(),
            act.number.as_deref().unwrap_or("(unnumbered)"),
            act.organism,
            amount,
            act.risk_level.as_str()
        )?;

        let mut links = analysis
            .links
            .iter()
            .filter(|link| link.act_id == act.id)
            .peekable();
        if links.peek().is_none() {
            writeln!(out, "      no budget program above the confidence floor")?;
        }
        for link in links {
            let description = catalog
                .get(&link.program_id)
                .map(|program| program.description.as_str())
                .unwrap_or("");
            writeln!(
                out,
                "      -> {} ({}, {:.2}) {}",
                link.program_id,
                link.matching_method.as_str(),
                link.confidence_score,
                description
            )?;
        }
    }

    writeln!(out, "\nAlerts")?;
    for severity in Severity::ordered() {
        let alerts: Vec<_> = analysis.alerts_with_severity(severity).collect();
        writeln!(out, "{} ({})", severity.as_str(), alerts.len())?;
        for alert in alerts {
            writeln!(out, "  - {} [{}]", alert.title, alert.act_id)?;
            writeln!(out, "    {}", alert.description)?;
            writeln!(out, "    What you can do: {}", alert.citizen_action)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use watcher::config::EngineConfig;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../crates/watcher/tests/fixtures")
            .join(name)
    }

    fn fixture_analysis() -> (BulletinAnalysis, BudgetCatalog) {
        let catalog = load_catalog(&fixture("catalog_2024.csv"), Some(2024)).expect("catalog");
        let analyzer = build_analyzer(&EngineConfig::default(), None).expect("analyzer");
        let text = std::fs::read_to_string(fixture("bo-2024-051.txt")).expect("bulletin");
        let analysis = analyzer.analyze("bo-2024-051", &pages_from_text(&text), &catalog);
        (analysis, catalog)
    }

    #[test]
    fn document_id_defaults_to_file_stem() {
        assert_eq!(default_document_id(Path::new("/tmp/bo-2024-051.txt")), "bo-2024-051");
        assert_eq!(default_document_id(Path::new("/")), "bulletin");
    }

    #[test]
    fn report_groups_alerts_by_severity() {
        let (analysis, catalog) = fixture_analysis();
        let mut buffer = Vec::new();
        render_analysis(&mut buffer, &analysis, &catalog).expect("renders");
        let report = String::from_utf8(buffer).expect("utf8");

        assert!(report.starts_with("Bulletin analysis: bo-2024-051\n"));
        assert!(report.contains("4 acts classified | 3 linked | 9 alerts"));
        assert!(report.contains("-> prog-infra-40 (exact_account_code, 1.00)"));

        let high = report.find("\nHIGH (2)\n").expect("high section");
        let medium = report.find("\nMEDIUM (4)\n").expect("medium section");
        let low = report.find("\nLOW (3)\n").expect("low section");
        assert!(high < medium && medium < low);
    }

    #[test]
    fn act_rendering_lists_extracted_fields() {
        let act = ActClassifier::new()
            .classify(
                "LICITACIÓN PÚBLICA N° 12/2024\nMINISTERIO DE INFRAESTRUCTURA, construcción de la Ruta Provincial 40 por la suma de $ 15.000.000,00 con cargo a la PARTIDA 1.2.3.4. Mendoza, 15/03/2024",
                "ad-hoc",
                1,
                0,
            )
            .expect("tender recognized");

        let mut buffer = Vec::new();
        render_act(&mut buffer, &act).expect("renders");
        let text = String::from_utf8(buffer).expect("utf8");

        assert!(text.starts_with("Tender 12/2024\n"));
        assert!(text.contains("- id: ad-hoc:p1:b0"));
        assert!(text.contains("- amount: $15,000,000"));
        assert!(text.contains("- account code: 1.2.3.4"));
        assert!(text.contains("- date: 2024-03-15"));
    }
}
