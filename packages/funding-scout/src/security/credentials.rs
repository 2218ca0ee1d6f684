//! Redacted wrappers for API keys and bearer tokens.
//!
//! Secrets live in a `secrecy` box that is zeroized on drop and print as
//! `[REDACTED]` in logs and error messages.

use secrecy::ExposeSecret;
use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// An API key or token. Read it only through [`SecretString::expose`].
pub struct SecretString(secrecy::SecretString);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        let value: String = value.into();
        Self(secrecy::SecretString::from(value))
    }

    /// The raw value, for building a request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// True for an empty or whitespace-only value (an unset variable).
    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Google Custom Search credentials.
#[derive(Clone)]
pub struct SearchCredentials {
    /// API key (secret)
    pub api_key: SecretString,

    /// Programmable search engine id (`cx`)
    pub engine_id: String,
}

impl SearchCredentials {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            engine_id: engine_id.into(),
        }
    }
}

impl fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &REDACTED)
            .field("engine_id", &self.engine_id)
            .finish()
    }
}
