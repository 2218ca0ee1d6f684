//! In-memory storage implementation for testing and dry runs.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::error::{Result, ScoutError};
use crate::traits::store::{new_keywords, KeywordStore, SheetStore};

/// In-memory sheet.
///
/// Useful for testing and for dry runs against a snapshot of the real
/// sheet. Data is lost when dropped.
#[derive(Default)]
pub struct MemorySheet {
    rows: RwLock<Vec<Vec<String>>>,
    append_budget: RwLock<Option<usize>>,
    unavailable: RwLock<bool>,
}

impl MemorySheet {
    /// Create a new empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sheet pre-filled with rows (first row is the header).
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: RwLock::new(rows),
            ..Self::default()
        }
    }

    /// Let only `n` more appends succeed; later appends fail.
    pub fn fail_appends_after(self, n: usize) -> Self {
        *self.append_budget.write().unwrap() = Some(n);
        self
    }

    /// Make every operation fail as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().unwrap() = unavailable;
    }

    /// Snapshot of all rows.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.read().unwrap().clone()
    }

    /// Number of rows including the header row.
    pub fn row_count(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    /// Clear all rows.
    pub fn clear(&self) {
        self.rows.write().unwrap().clear();
    }

    fn check_available(&self) -> Result<()> {
        if *self.unavailable.read().unwrap() {
            return Err(ScoutError::store("memory sheet marked unavailable"));
        }
        Ok(())
    }

    fn row_mut<'a>(rows: &'a mut Vec<Vec<String>>, row: usize) -> Result<&'a mut Vec<String>> {
        if row == 0 {
            return Err(ScoutError::store("rows are 1-based"));
        }
        if rows.len() < row {
            rows.resize_with(row, Vec::new);
        }
        Ok(&mut rows[row - 1])
    }
}

#[async_trait]
impl SheetStore for MemorySheet {
    async fn get_all_rows(&self) -> Result<Vec<Vec<String>>> {
        self.check_available()?;
        Ok(self.rows())
    }

    async fn append_row(&self, values: &[String]) -> Result<()> {
        self.check_available()?;

        let mut budget = self.append_budget.write().unwrap();
        if let Some(remaining) = budget.as_mut() {
            if *remaining == 0 {
                return Err(ScoutError::store("append quota exhausted"));
            }
            *remaining -= 1;
        }

        self.rows.write().unwrap().push(values.to_vec());
        Ok(())
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<()> {
        self.check_available()?;
        if col == 0 {
            return Err(ScoutError::store("columns are 1-based"));
        }

        let mut rows = self.rows.write().unwrap();
        let cells = Self::row_mut(&mut rows, row)?;
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
        Ok(())
    }

    async fn update_row(&self, row: usize, values: &[String]) -> Result<()> {
        self.check_available()?;

        let mut rows = self.rows.write().unwrap();
        let cells = Self::row_mut(&mut rows, row)?;
        if cells.len() < values.len() {
            cells.resize(values.len(), String::new());
        }
        cells[..values.len()].clone_from_slice(values);
        Ok(())
    }
}

/// In-memory keyword list.
#[derive(Default)]
pub struct MemoryKeywords {
    keywords: RwLock<Vec<String>>,
}

impl MemoryKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords(keywords: &[&str]) -> Self {
        Self {
            keywords: RwLock::new(keywords.iter().map(|k| k.to_string()).collect()),
        }
    }
}

#[async_trait]
impl KeywordStore for MemoryKeywords {
    async fn keywords(&self) -> Result<Vec<String>> {
        Ok(self
            .keywords
            .read()
            .unwrap()
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect())
    }

    async fn append_keywords(&self, keywords: &[String]) -> Result<usize> {
        let mut stored = self.keywords.write().unwrap();
        let fresh = new_keywords(&stored, keywords);
        let added = fresh.len();
        stored.extend(fresh);
        Ok(added)
    }
}
