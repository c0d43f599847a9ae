use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfFetchError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF worker is already configured")]
    AlreadyConfigured,
}

impl PdfFetchError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

impl From<lopdf::Error> for PdfFetchError {
    fn from(err: lopdf::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for PdfFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {}", err))
        } else {
            Self::Network(err.to_string())
        }
    }
}
