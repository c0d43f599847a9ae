//! Injectable fetch capability
//!
//! The loader never talks to the network directly; it goes through a
//! [`Fetch`] implementation. [`HttpFetch`] is the default, and tests or
//! constrained environments can substitute their own.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tracing::{debug, instrument, warn};

use crate::config::FetchConfig;
use crate::error::PdfFetchError;
use crate::source::SourceUrl;

/// Response returned by a fetch capability
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResponse {
    /// A 200 response with the given body
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            content_type: Some("application/pdf".to_string()),
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Accept the body as document bytes if the status is 2xx and the body
    /// fits within `max_bytes`
    pub fn into_pdf_bytes(self, max_bytes: usize) -> Result<Bytes, PdfFetchError> {
        if !self.is_success() {
            return Err(PdfFetchError::Network(format!(
                "unexpected HTTP status {}",
                self.status
            )));
        }
        if self.body.len() > max_bytes {
            return Err(PdfFetchError::Network(format!(
                "response body is {} bytes, limit is {}",
                self.body.len(),
                max_bytes
            )));
        }
        Ok(self.body)
    }
}

/// Retrieves the bytes behind a URL
///
/// Implementations are shared behind `Arc` and only ever invoked.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &SourceUrl) -> Result<FetchResponse, PdfFetchError>;
}

/// Default fetch capability backed by `reqwest`
///
/// Bodies are read chunk by chunk and abandoned as soon as they pass
/// `max_document_bytes`, so an oversized response is never fully buffered.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    client: reqwest::Client,
    max_document_bytes: usize,
}

impl HttpFetch {
    /// Build a client with the configured timeout, user agent and size cap
    pub fn new(config: &FetchConfig) -> Result<Self, PdfFetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| {
                PdfFetchError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            max_document_bytes: config.max_document_bytes,
        })
    }

    /// Wrap an existing client, keeping the default size cap
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            max_document_bytes: FetchConfig::default().max_document_bytes,
        }
    }

    pub fn with_max_document_bytes(mut self, max_document_bytes: usize) -> Self {
        self.max_document_bytes = max_document_bytes;
        self
    }

    fn too_large(&self, len: u64) -> PdfFetchError {
        PdfFetchError::Network(format!(
            "response body is {} bytes, limit is {}",
            len, self.max_document_bytes
        ))
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    #[instrument(skip(self, url), fields(url = %url.redacted()))]
    async fn fetch(&self, url: &SourceUrl) -> Result<FetchResponse, PdfFetchError> {
        let mut response = self.client.get(url.as_url().clone()).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let limit = self.max_document_bytes;
        if let Some(announced) = response.content_length() {
            if announced > limit as u64 {
                warn!(announced, limit, "Rejecting oversized response");
                return Err(self.too_large(announced));
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            let received = body.len() + chunk.len();
            if received > limit {
                warn!(received, limit, "Aborting oversized response body");
                return Err(self.too_large(received as u64));
            }
            body.extend_from_slice(&chunk);
        }
        let body = body.freeze();

        debug!(status, bytes = body.len(), content_type = ?content_type, "Fetch complete");

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_pdf_bytes_accepts_2xx() {
        let resp = FetchResponse {
            status: 206,
            content_type: None,
            body: Bytes::from_static(b"%PDF-1.7"),
        };
        assert_eq!(resp.into_pdf_bytes(1024).unwrap().as_ref(), b"%PDF-1.7");
    }

    #[test]
    fn test_into_pdf_bytes_rejects_error_status() {
        let resp = FetchResponse {
            status: 503,
            content_type: Some("text/html".into()),
            body: Bytes::from_static(b"<html>down</html>"),
        };
        let err = resp.into_pdf_bytes(1024).unwrap_err();
        assert!(err.is_network());
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_into_pdf_bytes_enforces_limit() {
        let resp = FetchResponse::ok(vec![b'x'; 11]);
        assert!(resp.into_pdf_bytes(10).unwrap_err().is_network());
    }

    #[test]
    fn test_http_fetch_keeps_configured_limit() {
        let config = FetchConfig {
            max_document_bytes: 4096,
            ..FetchConfig::default()
        };
        let fetch = HttpFetch::new(&config).unwrap();
        assert_eq!(fetch.max_document_bytes, 4096);

        let err = fetch.too_large(5000);
        assert!(err.is_network());
        assert!(err.to_string().contains("limit is 4096"));
    }
}
