//! Google Sheets storage over the `sheets-client` REST client.

use async_trait::async_trait;
use sheets_client::{a1_cell, a1_range, SheetsClient, SheetsError};

use crate::error::{Result, ScoutError};
use crate::security::SecretString;
use crate::traits::store::{new_keywords, KeywordStore, SheetStore};

/// Where the funding sheet lives and how to reach it.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// Worksheet holding the funding table.
    pub worksheet: String,
    /// Worksheet holding one search keyword per row.
    pub keyword_worksheet: String,
    /// OAuth bearer token with the spreadsheets scope.
    pub access_token: SecretString,
}

impl SheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: "Film Funding".to_string(),
            keyword_worksheet: "MotsClés".to_string(),
            access_token: SecretString::new(access_token),
        }
    }

    pub fn with_worksheet(mut self, worksheet: impl Into<String>) -> Self {
        self.worksheet = worksheet.into();
        self
    }

    pub fn with_keyword_worksheet(mut self, worksheet: impl Into<String>) -> Self {
        self.keyword_worksheet = worksheet.into();
        self
    }
}

/// Google Sheets-backed store for the funding table and keywords.
pub struct GoogleSheetsStore {
    client: SheetsClient,
    config: SheetsConfig,
}

impl GoogleSheetsStore {
    pub fn new(config: SheetsConfig) -> Self {
        let client = SheetsClient::new(config.access_token.expose(), config.spreadsheet_id.clone());
        Self { client, config }
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    fn range(&self, cells: Option<&str>) -> String {
        a1_range(&self.config.worksheet, cells)
    }

    async fn ensure_keyword_worksheet(&self) -> Result<()> {
        let titles = self.client.worksheet_titles().await.map_err(ScoutError::store)?;
        if !titles.iter().any(|t| t == &self.config.keyword_worksheet) {
            self.client
                .add_worksheet(&self.config.keyword_worksheet, 100, 2)
                .await
                .map_err(ScoutError::store)?;
            tracing::info!(worksheet = %self.config.keyword_worksheet, "Created keyword worksheet");
        }
        Ok(())
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn get_all_rows(&self) -> Result<Vec<Vec<String>>> {
        let rows = self
            .client
            .get_values(&self.range(None))
            .await
            .map_err(ScoutError::store)?;
        tracing::debug!(worksheet = %self.config.worksheet, rows = rows.len(), "Read sheet");
        Ok(rows)
    }

    async fn append_row(&self, values: &[String]) -> Result<()> {
        self.client
            .append_values(&self.range(Some("A1")), vec![values.to_vec()])
            .await
            .map_err(ScoutError::store)
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<()> {
        self.client
            .update_values(&self.range(Some(&a1_cell(row, col))), vec![vec![value.to_string()]])
            .await
            .map_err(ScoutError::store)
    }

    async fn update_row(&self, row: usize, values: &[String]) -> Result<()> {
        self.client
            .update_values(&self.range(Some(&a1_cell(row, 1))), vec![values.to_vec()])
            .await
            .map_err(ScoutError::store)
    }
}

#[async_trait]
impl KeywordStore for GoogleSheetsStore {
    async fn keywords(&self) -> Result<Vec<String>> {
        let range = a1_range(&self.config.keyword_worksheet, Some("A:A"));
        match self.client.get_values(&range).await {
            Ok(rows) => {
                let keywords: Vec<String> = rows
                    .into_iter()
                    .filter_map(|row| row.into_iter().next())
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect();
                tracing::info!(count = keywords.len(), "Loaded keywords");
                Ok(keywords)
            }
            Err(SheetsError::WorksheetNotFound(_)) => {
                tracing::warn!(worksheet = %self.config.keyword_worksheet, "No keyword worksheet");
                Ok(Vec::new())
            }
            Err(e) => Err(ScoutError::store(e)),
        }
    }

    async fn append_keywords(&self, keywords: &[String]) -> Result<usize> {
        self.ensure_keyword_worksheet().await?;

        let existing = self.keywords().await?;
        let fresh = new_keywords(&existing, keywords);
        if fresh.is_empty() {
            return Ok(0);
        }

        let range = a1_range(&self.config.keyword_worksheet, Some("A1"));
        let rows = fresh.iter().map(|k| vec![k.clone()]).collect();
        self.client
            .append_values(&range, rows)
            .await
            .map_err(ScoutError::store)?;

        tracing::info!(added = fresh.len(), "Appended keywords");
        Ok(fresh.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SheetsConfig::new("sheet-123", "ya29.token");
        assert_eq!(config.worksheet, "Film Funding");
        assert_eq!(config.keyword_worksheet, "MotsClés");
        assert!(!format!("{:?}", config).contains("ya29"));
    }

    #[test]
    fn test_ranges_target_configured_worksheet() {
        let store = GoogleSheetsStore::new(SheetsConfig::new("id", "t").with_worksheet("Aides"));
        assert_eq!(store.range(None), "'Aides'");
        assert_eq!(store.range(Some("B1")), "'Aides'!B1");
    }
}
