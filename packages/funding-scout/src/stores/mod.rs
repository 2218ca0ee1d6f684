//! Storage implementations.
//!
//! Available backends:
//! - `MemorySheet` / `MemoryKeywords` - In-memory storage (always available)
//! - `GoogleSheetsStore` - Google Sheets (requires `sheets` feature)

pub mod memory;

#[cfg(feature = "sheets")]
pub mod sheets;

pub use memory::{MemoryKeywords, MemorySheet};

#[cfg(feature = "sheets")]
pub use sheets::{GoogleSheetsStore, SheetsConfig};
