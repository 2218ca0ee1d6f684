//! Pure Google Sheets v4 REST API client.
//!
//! A minimal client over the `values` endpoints of one spreadsheet: read a
//! range, append rows, overwrite a range, and list or add worksheets.
//! Authentication is an OAuth bearer token supplied by the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use sheets_client::{SheetsClient, a1_range};
//!
//! let client = SheetsClient::new(token, spreadsheet_id);
//!
//! let rows = client.get_values(&a1_range("Film Funding", None)).await?;
//! client.append_values("Film Funding", vec![vec!["Aide CNC".into()]]).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{Result, SheetsError};
pub use types::{Sheet, SheetProperties, Spreadsheet, ValueRange};

use reqwest::Url;
use serde::de::DeserializeOwned;
use types::{AddSheetBatch, ErrorEnvelope};

const BASE_URL: &str = "https://sheets.googleapis.com/v4";

pub struct SheetsClient {
    client: reqwest::Client,
    token: String,
    spreadsheet_id: String,
    base_url: String,
}

impl SheetsClient {
    pub fn new(token: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point at a different API root (testing, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Read the cells of an A1 range as formatted strings.
    ///
    /// Trailing empty rows and cells are omitted by the API.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let mut url = self.endpoint(&["values", range])?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "FORMATTED_VALUE")
            .append_pair("majorDimension", "ROWS");

        let resp = self.client.get(url).bearer_auth(&self.token).send().await?;
        let body: ValueRange = Self::parse(resp, range).await?;
        Ok(body.values)
    }

    /// Append rows after the last row of the table found in `range`.
    pub async fn append_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let mut url = self.endpoint(&["values", &format!("{}:append", range)])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let count = rows.len();
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&ValueRange::rows(rows))
            .send()
            .await?;
        let _: serde_json::Value = Self::parse(resp, range).await?;

        tracing::debug!(range, rows = count, "Appended rows");
        Ok(())
    }

    /// Overwrite the cells of `range` starting at its top-left corner.
    pub async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let mut url = self.endpoint(&["values", range])?;
        url.query_pairs_mut().append_pair("valueInputOption", "USER_ENTERED");

        let resp = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&ValueRange::rows(rows))
            .send()
            .await?;
        let _: serde_json::Value = Self::parse(resp, range).await?;

        tracing::debug!(range, "Updated range");
        Ok(())
    }

    /// Titles of the spreadsheet's worksheets, in tab order.
    pub async fn worksheet_titles(&self) -> Result<Vec<String>> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");

        let resp = self.client.get(url).bearer_auth(&self.token).send().await?;
        let spreadsheet: Spreadsheet = Self::parse(resp, &self.spreadsheet_id).await?;
        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }

    /// Add a worksheet with the given grid size.
    pub async fn add_worksheet(&self, title: &str, rows: u32, columns: u32) -> Result<()> {
        let mut url = self.endpoint(&[])?;
        // batchUpdate is a custom method on the spreadsheet resource itself
        let path = format!("{}:batchUpdate", url.path());
        url.set_path(&path);

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&AddSheetBatch::new(title, rows, columns))
            .send()
            .await?;
        let _: serde_json::Value = Self::parse(resp, title).await?;

        tracing::info!(title, "Added worksheet");
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SheetsError::InvalidRequest(format!("bad base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidRequest("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .push("spreadsheets")
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response, target: &str) -> Result<T> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        if status.as_u16() == 400 && message.contains("Unable to parse range") {
            return Err(SheetsError::WorksheetNotFound(target.to_string()));
        }
        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Column letters for a 1-based column index (1 → A, 27 → AA).
pub fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Worksheet title quoted for use in an A1 range.
pub fn quote_worksheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 range for a whole worksheet, or for `cells` within it.
pub fn a1_range(worksheet: &str, cells: Option<&str>) -> String {
    match cells {
        Some(cells) => format!("{}!{}", quote_worksheet(worksheet), cells),
        None => quote_worksheet(worksheet),
    }
}

/// A1 address of a single 1-based cell.
pub fn a1_cell(row: usize, col: usize) -> String {
    format!("{}{}", column_letter(col), row)
}
