use std::collections::BTreeSet;

use watcher::workflows::bulletin::{
    ActId, ActType, AdministrativeAct, AlertRuleEngine, AlertType, BudgetProgram, LinkResolver,
    MatchScorer, MatchingMethod, ProgramId, RiskLevel, Severity, SynonymVocabulary,
};

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn public_works_tender() -> AdministrativeAct {
    AdministrativeAct {
        id: ActId::new("bo-2024-100:p2:b1").expect("valid id"),
        act_type: ActType::Tender,
        number: Some("31/2024".to_string()),
        date: None,
        organism: "MINISTRY OF PUBLIC WORKS".to_string(),
        beneficiary: None,
        amount: Some(15_000_000.0),
        account_code: Some("1.2.3.4".to_string()),
        description: "Public tender for the paving of route 7".to_string(),
        keywords: set(&["work", "construction", "route"]),
        risk_level: RiskLevel::Low,
        risk_keywords: Vec::new(),
        source_fragment: "PUBLIC TENDER No. 31/2024 MINISTRY OF PUBLIC WORKS paving of route 7"
            .to_string(),
        source_document_id: "bo-2024-100".to_string(),
        page_number: 2,
    }
}

fn program(id: &str, account_code: &str, organism: &str, keywords: &[&str]) -> BudgetProgram {
    BudgetProgram {
        id: ProgramId(id.to_string()),
        fiscal_year: 2024,
        organism: organism.to_string(),
        program_code: "40".to_string(),
        subprogram_code: None,
        account_code: Some(account_code.to_string()),
        description: format!("{organism} program"),
        initial_amount: 50_000_000.0,
        current_amount: 50_000_000.0,
        keywords: set(keywords),
    }
}

#[test]
fn exact_account_code_links_with_full_confidence() {
    let act = public_works_tender();
    let programs = vec![program(
        "works-40",
        "1.2.3.4",
        "MINISTRY OF PUBLIC WORKS",
        &["infrastructure", "road", "work"],
    )];

    let links = LinkResolver::default().resolve(&act, &programs, 3);

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].confidence_score, 1.0);
    assert_eq!(links[0].matching_method, MatchingMethod::ExactAccountCode);
    assert_eq!(links[0].act_id, act.id);
}

#[test]
fn exact_account_code_wins_regardless_of_other_mismatches() {
    let act = public_works_tender();
    let programs = vec![program("odd", "1.2.3.4", "MINISTRY OF HEALTH", &["hospital"])];

    let links = LinkResolver::default().resolve(&act, &programs, 3);

    assert_eq!(links[0].confidence_score, 1.0);
    assert_eq!(links[0].matching_method, MatchingMethod::ExactAccountCode);
}

#[test]
fn unrelated_program_yields_no_link_and_flags_the_tender() {
    let act = public_works_tender();
    let programs = vec![program("health", "9.9.9.9", "MINISTRY OF HEALTH", &["hospital"])];

    let score = MatchScorer::default().score(&act, &programs[0]);
    assert_eq!(score.score, 0.0);
    assert_eq!(score.method, MatchingMethod::NoMatch);

    let links = LinkResolver::default().resolve(&act, &programs, 3);
    assert!(links.is_empty());

    let alerts = AlertRuleEngine::default().evaluate(&act, &links, &programs);
    let tender_alert = alerts
        .iter()
        .find(|alert| alert.alert_type == AlertType::TenderWithoutBudget)
        .expect("tender without budget raised");
    assert_eq!(tender_alert.severity, Severity::High);
}

#[test]
fn resolve_returns_at_most_top_n_in_non_increasing_order() {
    let act = public_works_tender();
    let programs = vec![
        program("keywords", "7.7", "SECRETARIAT OF CULTURE", &["route", "museum"]),
        program("organism", "8.8", "MINISTRY OF PUBLIC WORKS", &[]),
        program("exact", "1.2.3.4", "TREASURY", &[]),
        program("partial", "1.2", "TREASURY", &[]),
    ];

    for top_n in 1..=4 {
        let links = LinkResolver::default().resolve(&act, &programs, top_n);
        assert!(links.len() <= top_n);
        assert!(links
            .windows(2)
            .all(|pair| pair[0].confidence_score >= pair[1].confidence_score));
    }

    let ids: Vec<_> = LinkResolver::default()
        .resolve(&act, &programs, 4)
        .into_iter()
        .map(|link| link.program_id.0)
        .collect();
    assert_eq!(ids, vec!["exact", "organism", "partial"]);
}

#[test]
fn synonyms_from_json_widen_keyword_overlap() {
    let vocabulary = SynonymVocabulary::from_path(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/synonyms.json"
    ))
    .expect("synonyms load");
    let mut act = public_works_tender();
    act.account_code = None;
    act.organism = "MUNICIPALITY OF LAVALLE".to_string();
    act.keywords = set(&["work"]);
    let programs = vec![program("roads", "5.5", "TREASURY", &["infrastructure"])];

    let plain = LinkResolver::default().resolve(&act, &programs, 3);
    assert!(plain.is_empty());

    let expanded =
        LinkResolver::new(MatchScorer::with_synonyms(vocabulary)).resolve(&act, &programs, 3);
    assert_eq!(expanded.len(), 1);
    assert_eq!(expanded[0].matching_method, MatchingMethod::WeakKeywords);
    assert_eq!(expanded[0].match_details.shared_keywords, vec!["infrastructure"]);
}
