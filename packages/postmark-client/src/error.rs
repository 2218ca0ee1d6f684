use thiserror::Error;

pub type Result<T> = std::result::Result<T, PostmarkError>;

#[derive(Debug, Error)]
pub enum PostmarkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Postmark API error ({status}, code {code}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid email: {0}")]
    InvalidEmail(String),
}
