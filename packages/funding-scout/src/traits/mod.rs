//! Collaborator trait abstractions.
//!
//! These traits define the interfaces the core runs against: the sheet and
//! keyword stores, web search, content extraction, the LLM and email.

pub mod ai;
pub mod content;
pub mod notifier;
pub mod searcher;
pub mod store;
