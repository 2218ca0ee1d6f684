//! Storage traits for the funding sheet and the keyword list.
//!
//! - `SheetStore`: a row-oriented table whose first row is the header row
//! - `KeywordStore`: search keywords kept alongside the sheet
//!
//! Rows and columns are 1-based, like spreadsheet coordinates.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::record::{HeaderRow, Record};

/// A spreadsheet-like table of funding opportunities.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// All rows including the header row. An empty store has no rows.
    async fn get_all_rows(&self) -> Result<Vec<Vec<String>>>;

    /// Append one row after the last non-empty row.
    async fn append_row(&self, values: &[String]) -> Result<()>;

    /// Overwrite a single cell.
    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<()>;

    /// Overwrite a row starting at column 1.
    async fn update_row(&self, row: usize, values: &[String]) -> Result<()>;

    /// The header row, trimmed. Empty when the store is empty.
    async fn get_headers(&self) -> Result<HeaderRow> {
        let rows = self.get_all_rows().await?;
        Ok(rows.first().map(|r| HeaderRow::new(r)).unwrap_or_default())
    }

    /// Data rows as records keyed by header.
    ///
    /// Short rows are padded with empty values; fully blank rows are skipped.
    async fn get_all_records(&self) -> Result<Vec<Record>> {
        let rows = self.get_all_rows().await?;
        let Some((header, data)) = rows.split_first() else {
            return Ok(Vec::new());
        };
        let headers = HeaderRow::new(header);

        Ok(data
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| !h.is_empty())
                    .map(|(i, h)| (h, row.get(i).map(String::as_str).unwrap_or_default()))
                    .collect::<Record>()
            })
            .filter(Record::has_content)
            .collect())
    }
}

/// Search keywords, one per row.
#[async_trait]
pub trait KeywordStore: Send + Sync {
    /// Non-blank keywords in stored order.
    async fn keywords(&self) -> Result<Vec<String>>;

    /// Append keywords not already present (case-insensitive).
    ///
    /// Returns the number of keywords actually added.
    async fn append_keywords(&self, keywords: &[String]) -> Result<usize>;
}

/// Keywords from `incoming` missing from `existing`, deduplicated, in order.
pub fn new_keywords(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = existing.iter().map(|k| k.trim().to_lowercase()).collect();
    let mut fresh = Vec::new();
    for keyword in incoming {
        let keyword = keyword.trim();
        let folded = keyword.to_lowercase();
        if keyword.is_empty() || seen.contains(&folded) {
            continue;
        }
        seen.push(folded);
        fresh.push(keyword.to_string());
    }
    fresh
}
