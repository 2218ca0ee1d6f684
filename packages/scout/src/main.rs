//! Film funding scout runner.
//!
//! Searches the web for funding opportunities, has the agents turn the pages
//! into records, and appends the new ones to the shared spreadsheet.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funding_scout::ai::OpenAI;
use funding_scout::stores::GoogleSheetsStore;
use funding_scout::{
    build_research_prompt, exclusion_text, parse, run_report, salvage_records, GoogleWebSearcher,
    HttpContentApi, KeywordStore, MergeEngine, Notifier, Record, ResearchConfig,
    ResearchOrchestrator, SchemaReconciler, SheetStore,
};

use config::Config;

/// URLs kept when salvaging records from an unparseable answer.
const SALVAGE_LIMIT: usize = 10;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Discover film funding opportunities and track them in a spreadsheet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run research, merge new opportunities and email a report
    Run {
        /// Print what would be appended without writing to the sheet
        #[arg(long)]
        dry_run: bool,
        /// Skip the email report
        #[arg(long)]
        no_email: bool,
        /// Recover records from raw URLs when the answer cannot be parsed
        #[arg(long)]
        salvage: bool,
    },

    /// Show the sheet's columns and the research prompt built from them
    Columns,

    /// Manage search keywords
    Keywords {
        #[command(subcommand)]
        action: KeywordAction,
    },

    /// Append a fixed test record through the merge engine
    AppendTest,

    /// Send a test email
    EmailTest,
}

#[derive(Subcommand)]
enum KeywordAction {
    /// List the keywords used for search
    List,
    /// Add keywords, skipping ones already present
    Add { keywords: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,funding_scout=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let store = GoogleSheetsStore::new(config.sheets());

    match cli.command {
        Commands::Run {
            dry_run,
            no_email,
            salvage,
        } => run(&config, &store, dry_run, no_email, salvage).await,
        Commands::Columns => columns(&config, &store).await,
        Commands::Keywords { action } => keywords(&store, action).await,
        Commands::AppendTest => append_test(&config, &store).await,
        Commands::EmailTest => email_test(&config).await,
    }
}

async fn run(
    config: &Config,
    store: &GoogleSheetsStore,
    dry_run: bool,
    no_email: bool,
    salvage: bool,
) -> Result<()> {
    // Fail before any research when the report cannot be sent
    let notifier = if dry_run || no_email {
        None
    } else {
        Some((config.notifier()?, config.recipient()?))
    };

    let (content_url, content_key) = config.content_api()?;
    let orchestrator = ResearchOrchestrator::with_config(
        GoogleWebSearcher::new(config.search_credentials()?),
        HttpContentApi::new(content_url, content_key)?,
        OpenAI::new(config.openai_key()?).with_model(&config.openai_model),
        ResearchConfig::default(),
    );
    let layout = config.layout();

    let headers = store.get_headers().await.context("Failed to read sheet headers")?;
    let prompt = build_research_prompt(&headers, &layout);
    let known = store.get_all_records().await.context("Failed to read sheet rows")?;
    let exclusions = exclusion_text(&known);

    let keywords = orchestrator.resolve_keywords(store).await?;
    tracing::info!(keywords = keywords.len(), known = known.len(), "Starting research");

    let documents = orchestrator.collect_documents(&keywords).await?;
    let answer = orchestrator
        .run_pipeline(&prompt, &exclusions, &documents)
        .await
        .context("Agent pipeline failed")?;

    let mut records = parse(&answer, &prompt.expected_headers);
    if records.is_empty() && salvage {
        records = salvage_records(&answer, SALVAGE_LIMIT);
        tracing::warn!(salvaged = records.len(), "Parser found nothing; salvaged records from URLs");
    }
    if records.is_empty() {
        tracing::warn!(answer_chars = answer.chars().count(), "No records in agent answer");
        println!("No opportunities found.");
        return Ok(());
    }

    let engine = MergeEngine::new(layout.clone());

    if dry_run {
        let snapshot = store.get_all_rows().await?;
        let report = SchemaReconciler::new(layout).plan(headers.as_slice(), &records[0]);
        for action in &report.actions {
            println!("header change: {:?}", action);
        }
        for field in &report.unmapped {
            println!("unmapped field: {}", field);
        }

        let outcome = engine.merge(&snapshot, &records);
        println!("{}", outcome.headers.as_slice().join(" | "));
        for row in &outcome.rows_to_append {
            println!("{}", row.join(" | "));
        }
        print_outcome(outcome.added, outcome.duplicates, outcome.missing_identity);
        return Ok(());
    }

    SchemaReconciler::new(layout)
        .reconcile(store, &records[0])
        .await
        .context("Failed to reconcile sheet headers")?;
    let outcome = engine.merge_into(store, &records).await?;
    print_outcome(outcome.added, outcome.duplicates, outcome.missing_identity);

    if let Some((notifier, recipient)) = notifier {
        let (subject, body) = run_report(
            outcome.added,
            outcome.duplicates,
            outcome.missing_identity,
            &outcome.added_names(),
            &answer,
        );
        match notifier.send(&subject, &body, recipient).await {
            Ok(result) => println!("{}", result),
            // Rows are already written; a failed report does not undo the run
            Err(e) => tracing::error!(error = %e, "Failed to send run report"),
        }
    }

    Ok(())
}

async fn columns(config: &Config, store: &GoogleSheetsStore) -> Result<()> {
    let headers = store.get_headers().await.context("Failed to read sheet headers")?;
    if headers.is_empty() {
        println!("The sheet has no header row yet.");
    } else {
        for (i, header) in headers.iter().enumerate() {
            println!("{:>2}. {}", i + 1, header);
        }
    }

    let prompt = build_research_prompt(&headers, &config.layout());
    println!("\n{}", prompt.text);
    Ok(())
}

async fn keywords(store: &GoogleSheetsStore, action: KeywordAction) -> Result<()> {
    match action {
        KeywordAction::List => {
            let keywords = store.keywords().await?;
            if keywords.is_empty() {
                println!("No keywords; the defaults will be used.");
            }
            for keyword in keywords {
                println!("{}", keyword);
            }
        }
        KeywordAction::Add { keywords } => {
            let added = store.append_keywords(&keywords).await?;
            println!("{} keyword(s) added", added);
        }
    }
    Ok(())
}

async fn append_test(config: &Config, store: &GoogleSheetsStore) -> Result<()> {
    let record = Record::new()
        .with("Nom", "Test Aide CNC")
        .with("Organisme", "CNC Test")
        .with("Pays", "France")
        .with("Deadline", "31/12/2025")
        .with("Lien", "https://test-cnc.fr/aide-123")
        .with("Résumé", "Aide test pour documentaire")
        .with("Email", "contact@test-cnc.fr")
        .with("Conditions", "Documentaire en post-production");

    let outcome = MergeEngine::new(config.layout())
        .merge_into(store, &[record])
        .await?;
    print_outcome(outcome.added, outcome.duplicates, outcome.missing_identity);
    Ok(())
}

async fn email_test(config: &Config) -> Result<()> {
    let notifier = config.notifier()?;
    let result = notifier
        .send(
            "Film funding scout: test",
            "This is a test message from the film funding scout.",
            config.recipient()?,
        )
        .await?;
    println!("{}", result);
    Ok(())
}

fn print_outcome(added: usize, duplicates: usize, missing_identity: usize) {
    println!(
        "{} added, {} already known, {} skipped (no name or link)",
        added, duplicates, missing_identity
    );
}
