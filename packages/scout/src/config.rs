use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use funding_scout::notify::{PostmarkConfig, PostmarkNotifier};
use funding_scout::stores::SheetsConfig;
use funding_scout::{HeaderPolicy, SearchCredentials, SheetLayout};

/// Runner configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub spreadsheet_id: String,
    pub sheets_access_token: String,
    pub worksheet_name: String,
    pub keyword_worksheet_name: String,
    pub canonical_headers: bool,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,
    pub content_api_url: Option<String>,
    pub content_api_key: Option<String>,
    pub postmark_server_token: Option<String>,
    pub email_from: Option<String>,
    pub email_recipient: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            spreadsheet_id: env::var("SPREADSHEET_ID").context("SPREADSHEET_ID must be set")?,
            sheets_access_token: env::var("SHEETS_ACCESS_TOKEN")
                .context("SHEETS_ACCESS_TOKEN must be set")?,
            worksheet_name: env::var("WORKSHEET_NAME")
                .unwrap_or_else(|_| "Film Funding".to_string()),
            keyword_worksheet_name: env::var("KEYWORD_WORKSHEET_NAME")
                .unwrap_or_else(|_| "MotsClés".to_string()),
            canonical_headers: env::var("SCOUT_CANONICAL_HEADERS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .context("SCOUT_CANONICAL_HEADERS must be true or false")?,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| funding_scout::ai::DEFAULT_MODEL.to_string()),
            google_api_key: env::var("GOOGLE_API_KEY").ok(),
            google_cse_id: env::var("GOOGLE_CSE_ID").ok(),
            content_api_url: env::var("CONTENT_API_URL").ok(),
            content_api_key: env::var("CONTENT_API_KEY").ok(),
            postmark_server_token: env::var("POSTMARK_SERVER_TOKEN").ok(),
            email_from: env::var("EMAIL_FROM").ok(),
            email_recipient: env::var("EMAIL_RECIPIENT").ok(),
        })
    }

    pub fn sheets(&self) -> SheetsConfig {
        SheetsConfig::new(&self.spreadsheet_id, &self.sheets_access_token)
            .with_worksheet(&self.worksheet_name)
            .with_keyword_worksheet(&self.keyword_worksheet_name)
    }

    pub fn layout(&self) -> SheetLayout {
        let policy = if self.canonical_headers {
            HeaderPolicy::Canonical
        } else {
            HeaderPolicy::Preserve
        };
        SheetLayout::default().with_header_policy(policy)
    }

    pub fn openai_key(&self) -> Result<&str> {
        required(&self.openai_api_key, "OPENAI_API_KEY")
    }

    pub fn search_credentials(&self) -> Result<SearchCredentials> {
        Ok(SearchCredentials::new(
            required(&self.google_api_key, "GOOGLE_API_KEY")?,
            required(&self.google_cse_id, "GOOGLE_CSE_ID")?,
        ))
    }

    pub fn content_api(&self) -> Result<(&str, &str)> {
        Ok((
            required(&self.content_api_url, "CONTENT_API_URL")?,
            required(&self.content_api_key, "CONTENT_API_KEY")?,
        ))
    }

    pub fn recipient(&self) -> Result<&str> {
        required(&self.email_recipient, "EMAIL_RECIPIENT")
    }

    /// Build the email notifier, failing when any email setting is missing.
    pub fn notifier(&self) -> Result<PostmarkNotifier> {
        let config = PostmarkConfig::new(
            required(&self.postmark_server_token, "POSTMARK_SERVER_TOKEN")?,
            required(&self.email_from, "EMAIL_FROM")?,
        );
        PostmarkNotifier::new(config).context("Invalid email configuration")
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .with_context(|| format!("{} must be set", name))
}
