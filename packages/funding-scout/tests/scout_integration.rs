//! Integration tests for a full scouting run against in-memory collaborators.
//!
//! These tests drive the same sequence the runner does:
//! 1. Build the research prompt from the sheet's headers
//! 2. Collect documents and run the agent stages
//! 3. Parse the answer into records
//! 4. Reconcile headers and merge into the sheet
//! 5. Send the run report

use funding_scout::pipeline::prompts::format_generate_prompt;
use funding_scout::{
    build_research_prompt, exclusion_text, parse, run_report,
    testing::{MockAI, MockContentFetcher, MockNotifier, MockWebSearcher},
    HeaderRow, MemoryKeywords, MemorySheet, MergeEngine, Notifier, Record, ResearchOrchestrator,
    SchemaReconciler, ScoutError, SheetLayout, SheetStore,
};

const ANSWER: &str = "Nom: Aide CNC\nLien: https://cnc.fr/aide\nPays: France\n\n\
                      Nom: Eurimages\nLien: https://coe.int/eurimages\nPays: Europe\n";

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

fn orchestrator(answer: &str) -> ResearchOrchestrator<MockWebSearcher, MockContentFetcher, MockAI> {
    let searcher = MockWebSearcher::new().with_urls("aide documentaire", &["https://cnc.fr/aides"]);
    let fetcher = MockContentFetcher::new().with_page("https://cnc.fr/aides", "Aide au documentaire");
    // generate, clean, verify
    let ai = MockAI::new()
        .with_reply("brouillon")
        .with_reply("nettoyé")
        .with_default_reply(answer);
    ResearchOrchestrator::new(searcher, fetcher, ai)
}

/// One full run; returns how many rows were appended.
async fn scout_once(store: &MemorySheet, notifier: &MockNotifier) -> funding_scout::Result<usize> {
    let layout = SheetLayout::default();
    let keywords = MemoryKeywords::with_keywords(&["aide documentaire"]);
    let orch = orchestrator(ANSWER);

    let headers = store.get_headers().await?;
    let prompt = build_research_prompt(&headers, &layout);
    let exclusions = exclusion_text(&store.get_all_records().await?);

    let keywords = orch.resolve_keywords(&keywords).await?;
    let documents = orch.collect_documents(&keywords).await?;
    let answer = orch.run_pipeline(&prompt, &exclusions, &documents).await?;

    let records = parse(&answer, &prompt.expected_headers);
    SchemaReconciler::new(layout.clone())
        .reconcile(store, &records[0])
        .await?;
    let outcome = MergeEngine::new(layout)
        .with_timestamp("2025-03-01 10:00")
        .merge_into(store, &records)
        .await?;

    let (subject, body) = run_report(
        outcome.added,
        outcome.duplicates,
        outcome.missing_identity,
        &outcome.added_names(),
        &answer,
    );
    notifier.send(&subject, &body, "team@prod.fr").await?;
    Ok(outcome.added)
}

#[tokio::test]
async fn test_full_run_appends_then_suppresses_duplicates() {
    let store = MemorySheet::with_rows(vec![row(&["Nom", "Lien", "Pays"])]);
    let notifier = MockNotifier::new();

    assert_eq!(scout_once(&store, &notifier).await.unwrap(), 2);
    assert_eq!(
        store.rows(),
        vec![
            row(&["Nom", "Lien", "Pays"]),
            row(&["Aide CNC", "https://cnc.fr/aide", "France"]),
            row(&["Eurimages", "https://coe.int/eurimages", "Europe"]),
        ]
    );

    assert_eq!(scout_once(&store, &notifier).await.unwrap(), 0);
    assert_eq!(store.row_count(), 3);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].subject.contains("2 new opportunities"));
    assert!(sent[0].body.contains("- Eurimages"));
    assert!(sent[1].body.contains("Already known: 2"));
    for message in &sent {
        assert!(message.body.contains("Agent report:"));
        assert!(message.body.contains("Nom: Eurimages\nLien: https://coe.int/eurimages"));
    }
}

#[tokio::test]
async fn test_known_names_are_excluded_from_generate_prompt() {
    let store = MemorySheet::with_rows(vec![
        row(&["Nom", "Lien", "Pays"]),
        row(&["Aide CNC", "https://cnc.fr/aide", "France"]),
    ]);
    let orch = orchestrator(ANSWER);

    let prompt = build_research_prompt(&store.get_headers().await.unwrap(), &SheetLayout::default());
    let exclusions = exclusion_text(&store.get_all_records().await.unwrap());
    let documents = orch.collect_documents(&["aide documentaire".to_string()]).await.unwrap();

    let generate = format_generate_prompt(&prompt, &exclusions, &documents.text, 50_000);
    assert!(generate.contains("- Aide CNC"));
    assert!(generate.contains("Contenu extrait de : https://cnc.fr/aides"));
    assert_eq!(prompt.expected_headers, vec!["Nom", "Lien", "Pays"]);
}

#[tokio::test]
async fn test_end_to_end_headers_only_snapshot() {
    let snapshot = vec![row(&["Nom", "Lien", "Pays"])];
    let records = vec![Record::new()
        .with("Nom", "CNC Aide")
        .with("Lien", "https://cnc.fr/x")
        .with("Pays", "France")];

    let outcome = funding_scout::merge(&snapshot, &records);
    assert_eq!(outcome.rows_to_append, vec![row(&["CNC Aide", "https://cnc.fr/x", "France"])]);
    assert_eq!((outcome.added, outcome.duplicates), (1, 0));
}

#[tokio::test]
async fn test_merge_is_idempotent_across_runs() {
    let store = MemorySheet::with_rows(vec![row(&["Nom", "Lien", "Pays"])]);
    let records: Vec<Record> = (1..=4)
        .map(|i| {
            Record::new()
                .with("Nom", format!("Aide {}", i))
                .with("Lien", format!("https://aides.fr/{}", i))
        })
        .collect();
    let engine = MergeEngine::default();

    let first = engine.merge_into(&store, &records).await.unwrap();
    assert_eq!((first.added, first.duplicates), (4, 0));

    let second = engine.merge_into(&store, &records).await.unwrap();
    assert_eq!((second.added, second.duplicates), (0, 4));
    assert_eq!(store.row_count(), 5);
}

#[tokio::test]
async fn test_intra_batch_duplicates_collapse() {
    let records = vec![
        Record::new().with("Nom", "Aide CNC").with("Lien", "https://cnc.fr/a"),
        Record::new().with("Nom", "aide  cnc").with("Lien", "https://cnc.fr/a"),
    ];
    let outcome = funding_scout::merge(&[row(&["Nom", "Lien"])], &records);
    assert_eq!((outcome.added, outcome.duplicates), (1, 1));
}

#[tokio::test]
async fn test_empty_sheet_gets_headers_from_first_record() {
    let store = MemorySheet::new();
    let records = vec![Record::new().with("Nom", "Aide").with("Lien", "https://cnc.fr/a")];

    let outcome = MergeEngine::default()
        .with_timestamp("2025-03-01 10:00")
        .merge_into(&store, &records)
        .await
        .unwrap();

    assert_eq!(outcome.added, 1);
    assert_eq!(
        store.rows(),
        vec![
            row(&["Nom", "Lien", "Date Ajout"]),
            row(&["Aide", "https://cnc.fr/a", "2025-03-01 10:00"]),
        ]
    );
}

#[test]
fn test_unmapped_field_report() {
    let report = funding_scout::reconcile_schema(
        &["Nom", "Lien"],
        &Record::new().with("Nom", "A").with("Résumé", "x"),
    );
    assert_eq!(report.unmapped, vec!["Résumé"]);

    let report = funding_scout::reconcile_schema(
        &["Nom", "Résumé"],
        &Record::new().with("résumé", "x"),
    );
    assert!(report.unmapped.is_empty());
}

#[tokio::test]
async fn test_store_outage_aborts_run() {
    let store = MemorySheet::with_rows(vec![row(&["Nom", "Lien"])]);
    store.set_unavailable(true);

    let records = vec![Record::new().with("Nom", "Aide").with("Lien", "https://cnc.fr/a")];
    let err = MergeEngine::default().merge_into(&store, &records).await.unwrap_err();
    assert!(matches!(err, ScoutError::StoreUnavailable(_)));
}

#[test]
fn test_header_row_trims_cells() {
    let headers = HeaderRow::new(&[" Nom ", "Lien"]);
    assert_eq!(headers.as_slice(), &["Nom".to_string(), "Lien".to_string()]);
}
