//! Film Funding Discovery Library
//!
//! Turns free-form research text about film funding opportunities into rows
//! of a spreadsheet whose columns may be edited by hand at any time.
//!
//! # Design Philosophy
//!
//! **"The sheet is the schema"**
//!
//! - Records are ordered field maps, not structs
//! - Field names match across spelling, case and accent variants
//! - Nothing already in the sheet is ever inserted twice
//! - Library handles mechanics, the runner handles policy
//!
//! # Usage
//!
//! ```rust,ignore
//! use funding_scout::{parse, MergeEngine, MemorySheet, SheetStore};
//!
//! let store = MemorySheet::new();
//! let headers = store.get_headers().await?;
//!
//! let records = parse(&answer, headers.as_slice());
//! let outcome = MergeEngine::default().merge_into(&store, &records).await?;
//! println!("{} added, {} duplicates", outcome.added, outcome.duplicates);
//! ```
//!
//! # Modules
//!
//! - [`normalize`] - Text normalization for keys and cells
//! - [`types`] - Records, header rows, field equivalence and layout
//! - [`pipeline`] - Parsing, schema reconciliation, merge and research
//! - [`traits`] - Collaborator abstractions (store, search, content, AI, email)
//! - [`stores`] - Store implementations (MemorySheet, GoogleSheetsStore)
//! - [`security`] - Secret handling for API keys and tokens
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod normalize;
pub mod notify;
pub mod pipeline;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{Result, ScoutError};
pub use normalize::{clean_text_for_spreadsheet, normalize_key, validate_email, validate_url};
pub use pipeline::{
    build_research_prompt, exclusion_text, merge, parse, reconcile_schema, salvage_records,
    CollectedDocuments, HeaderAction, IdentityKey, MergeEngine, MergeOutcome, OutputParser,
    ResearchOrchestrator, ResearchPrompt, SchemaReconciler, SchemaReport,
};
pub use security::{SearchCredentials, SecretString};
pub use stores::{MemoryKeywords, MemorySheet};
pub use traits::{
    ai::AI,
    content::{ContentFetcher, HttpContentApi},
    notifier::{run_report, Notifier},
    searcher::{GoogleWebSearcher, SearchResult, WebSearcher},
    store::{KeywordStore, SheetStore},
};
pub use types::{
    config::{HeaderPolicy, ResearchConfig, SheetLayout},
    field::{same_field, FieldRole, MatchTier},
    record::{HeaderRow, Record},
};
