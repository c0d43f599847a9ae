//! Source URL validation
//!
//! Every load starts here: a URL that is empty, relative, or not http(s)
//! is rejected before any network traffic happens.

use std::fmt;

use url::Url;

use crate::error::PdfFetchError;

/// A validated, absolute http(s) URL pointing at a PDF resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl(Url);

impl SourceUrl {
    /// Parse and validate a caller-supplied URL string
    pub fn parse(input: &str) -> Result<Self, PdfFetchError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PdfFetchError::Configuration("URL must not be empty".into()));
        }

        let url = Url::parse(trimmed).map_err(|e| {
            PdfFetchError::Configuration(format!("Malformed URL {:?}: {}", input, e))
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(PdfFetchError::Configuration(format!(
                    "Unsupported URL scheme: {}",
                    other
                )))
            }
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(PdfFetchError::Configuration(format!(
                "URL has no host: {}",
                input
            )));
        }

        Ok(Self(url))
    }

    /// The full URL as a string, including any credentials or query
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Borrow the parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Scheme, host, port and path only; safe to put in logs
    pub fn redacted(&self) -> String {
        let host = self.0.host_str().unwrap_or_default();
        match self.0.port() {
            Some(port) => format!("{}://{}:{}{}", self.0.scheme(), host, port, self.0.path()),
            None => format!("{}://{}{}", self.0.scheme(), host, self.0.path()),
        }
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
