//! Fetch-and-load entry points

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{info, instrument, warn, Span};

use crate::config::FetchConfig;
use crate::document::PdfDocument;
use crate::error::PdfFetchError;
use crate::fetch::{Fetch, HttpFetch};
use crate::source::SourceUrl;
use crate::worker::{global_worker, WorkerSlot};

/// Options for a single load
#[derive(Clone, Default)]
pub struct LoadOptions {
    /// Network location of the PDF
    pub url: String,
    /// Fetch capability to use instead of the fetcher's default
    pub fetch: Option<Arc<dyn Fetch>>,
}

impl LoadOptions {
    /// Load `url` with the fetcher's default fetch capability
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fetch: None,
        }
    }

    /// Override the fetch capability for this load only
    pub fn with_fetch(mut self, fetch: Arc<dyn Fetch>) -> Self {
        self.fetch = Some(fetch);
        self
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("url", &self.url)
            .field("fetch", &self.fetch.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

/// Fetches PDFs and hands them to lopdf
pub struct PdfFetcher {
    default_fetch: Arc<dyn Fetch>,
    worker: &'static WorkerSlot,
    max_document_bytes: usize,
}

impl fmt::Debug for PdfFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfFetcher")
            .field("worker", &self.worker.get())
            .field("max_document_bytes", &self.max_document_bytes)
            .finish()
    }
}

impl PdfFetcher {
    /// Create a fetcher whose default fetch capability is `default_fetch`
    pub fn new(default_fetch: Arc<dyn Fetch>) -> Self {
        Self {
            default_fetch,
            worker: global_worker(),
            max_document_bytes: FetchConfig::default().max_document_bytes,
        }
    }

    /// Create a fetcher backed by [`HttpFetch`]
    pub fn from_config(config: &FetchConfig) -> Result<Self, PdfFetchError> {
        let http = HttpFetch::new(config)?;
        Ok(Self::new(Arc::new(http)).with_max_document_bytes(config.max_document_bytes))
    }

    /// Create a fetcher backed by [`HttpFetch`], configured from the environment
    pub fn from_env() -> Result<Self, PdfFetchError> {
        Self::from_config(&FetchConfig::from_env()?)
    }

    /// Use `slot` instead of the process-wide worker configuration
    pub fn with_worker_slot(mut self, slot: &'static WorkerSlot) -> Self {
        self.worker = slot;
        self
    }

    /// Size cap applied to whatever body a fetch capability returns
    ///
    /// [`HttpFetch`] also enforces its own cap while streaming.
    pub fn with_max_document_bytes(mut self, max_document_bytes: usize) -> Self {
        self.max_document_bytes = max_document_bytes;
        self
    }

    /// Fetch `options.url` and parse the response as a PDF
    ///
    /// # Errors
    ///
    /// - `Configuration` if the URL is empty or malformed (nothing is fetched)
    /// - `Network` if retrieval fails, returns a non-2xx status, or exceeds
    ///   the size limit (nothing is parsed)
    /// - `Parse` if the bytes are not a PDF lopdf can load
    #[instrument(skip(self, options), fields(url, worker))]
    pub async fn fetch_and_load(&self, options: LoadOptions) -> Result<PdfDocument, PdfFetchError> {
        let url = SourceUrl::parse(&options.url)?;
        Span::current().record("url", url.redacted().as_str());

        let worker = self.worker.get_or_init_default();
        Span::current().record("worker", worker.worker_src.as_str());

        let fetch = options.fetch.as_ref().unwrap_or(&self.default_fetch);
        let bytes = fetch
            .fetch(&url)
            .await
            .and_then(|response| response.into_pdf_bytes(self.max_document_bytes))
            .map_err(|e| {
                warn!(error = %e, "Fetch failed");
                e
            })?;

        let document = worker
            .run(move || PdfDocument::from_bytes(bytes, url))
            .await
            .map_err(|e| {
                warn!(error = %e, "Parse failed");
                e
            })?;

        info!(
            pages = document.page_count(),
            version = document.version(),
            "Loaded PDF"
        );

        Ok(document)
    }
}

static DEFAULT_FETCHER: OnceLock<PdfFetcher> = OnceLock::new();

/// Fetch and load using the process-wide default fetcher
///
/// The default fetcher is built from [`FetchConfig::from_env`] on first use.
pub async fn fetch_and_load(options: LoadOptions) -> Result<PdfDocument, PdfFetchError> {
    let fetcher = match DEFAULT_FETCHER.get() {
        Some(fetcher) => fetcher,
        None => {
            let fetcher = PdfFetcher::from_env()?;
            DEFAULT_FETCHER.get_or_init(|| fetcher)
        }
    };
    fetcher.fetch_and_load(options).await
}
