//! Fetch a PDF over the network and load it with lopdf
//!
//! ```no_run
//! use pdf_fetch::{fetch_and_load, LoadOptions};
//!
//! # async fn example() -> Result<(), pdf_fetch::PdfFetchError> {
//! let doc = fetch_and_load(LoadOptions::new("https://example.com/report.pdf")).await?;
//! println!("{} pages", doc.page_count());
//! # Ok(())
//! # }
//! ```
//!
//! Retrieval goes through the [`Fetch`] trait so callers can swap in their
//! own transport. Parsing runs wherever the process-wide [`WorkerOptions`]
//! say (tokio's blocking pool unless [`init_worker`] says otherwise).

pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod source;
pub mod worker;

pub use config::FetchConfig;
pub use document::PdfDocument;
pub use error::PdfFetchError;
pub use fetch::{Fetch, FetchResponse, HttpFetch};
pub use loader::{fetch_and_load, LoadOptions, PdfFetcher};
pub use source::SourceUrl;
pub use worker::{global_worker, init_worker, WorkerOptions, WorkerSlot};
