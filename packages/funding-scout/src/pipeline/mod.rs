//! Funding pipeline - the core of the library.
//!
//! The pipeline runs:
//! - Research (keywords → pages → generate/clean/verify agent stages)
//! - Parsing of the final answer into records (with salvage as a fallback)
//! - Schema reconciliation of the sheet's header row
//! - Deduplicated merge into the sheet

pub mod enrich;
pub mod merge;
pub mod parse;
pub mod prompts;
pub mod research;
pub mod salvage;
pub mod schema;

pub use enrich::{categorize, extract_year, priority_tier, Category, PriorityTier};
pub use merge::{merge, IdentityKey, MergeEngine, MergeOutcome};
pub use parse::{parse, BlockScan, LineScan, OutputParser, ParseStrategy};
pub use prompts::{build_research_prompt, exclusion_text, ResearchPrompt};
pub use research::{CollectedDocuments, ResearchOrchestrator};
pub use salvage::{salvage_records, SALVAGE_STATUS};
pub use schema::{reconcile_schema, HeaderAction, SchemaReconciler, SchemaReport};
