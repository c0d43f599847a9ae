//! Fetch configuration
//!
//! Values come from the environment (optionally seeded from a `.env` file),
//! falling back to the defaults below.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PdfFetchError;

pub const ENV_TIMEOUT_SECS: &str = "PDF_FETCH_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "PDF_FETCH_USER_AGENT";
pub const ENV_MAX_BYTES: &str = "PDF_FETCH_MAX_BYTES";

/// Settings for the default HTTP fetch capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Largest response body accepted as a document (default: 64 MiB)
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("pdf-fetch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_document_bytes() -> usize {
    64 * 1024 * 1024
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

impl FetchConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, PdfFetchError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PdfFetchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_var(&lookup, ENV_TIMEOUT_SECS)? {
            config.timeout_secs = secs;
        }
        if let Some(agent) = lookup(ENV_USER_AGENT).filter(|s| !s.trim().is_empty()) {
            config.user_agent = agent;
        }
        if let Some(max) = parse_var(&lookup, ENV_MAX_BYTES)? {
            config.max_document_bytes = max;
        }

        if config.timeout_secs == 0 {
            return Err(PdfFetchError::Configuration(format!(
                "{} must be greater than zero",
                ENV_TIMEOUT_SECS
            )));
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, PdfFetchError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            PdfFetchError::Configuration(format!("Invalid value for {}: {:?} ({})", key, raw, e))
        }),
    }
}
