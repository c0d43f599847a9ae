//! pdf-fetch CLI
//!
//! Fetches one PDF, loads it, and prints a short summary.

use anyhow::{Context, Result};
use clap::Parser;
use pdf_fetch::{init_worker, LoadOptions, PdfDocument, PdfFetcher, WorkerOptions};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pdf-fetch-cli")]
#[command(version, about = "Fetch a PDF over HTTP and summarize it")]
struct Args {
    /// URL of the PDF to load
    url: String,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Parse on the calling task instead of the blocking pool
    #[arg(long)]
    inline_parse: bool,
}

#[derive(Debug, Serialize, PartialEq)]
struct Summary {
    source: String,
    version: String,
    pages: usize,
    title: Option<String>,
    author: Option<String>,
    size_bytes: usize,
    /// First page MediaBox as [x, y, width, height]
    first_page: Option<[f64; 4]>,
}

impl Summary {
    fn from_document(doc: &PdfDocument) -> Self {
        Self {
            source: doc.source().to_string(),
            version: doc.version().to_string(),
            pages: doc.page_count(),
            title: doc.title(),
            author: doc.author(),
            size_bytes: doc.bytes().len(),
            first_page: doc.page_dimensions(1).ok(),
        }
    }

    fn render_text(&self) -> String {
        let mut out = format!(
            "Source:  {}\nVersion: {}\nPages:   {}\nSize:    {} bytes\n",
            self.source, self.version, self.pages, self.size_bytes
        );
        if let Some(title) = &self.title {
            out.push_str(&format!("Title:   {}\n", title));
        }
        if let Some(author) = &self.author {
            out.push_str(&format!("Author:  {}\n", author));
        }
        if let Some([_, _, width, height]) = self.first_page {
            out.push_str(&format!("Page 1:  {} x {} pt\n", width, height));
        }
        out
    }
}

/// Build the fetcher from the environment and load `url`
async fn load(url: &str) -> Result<PdfDocument> {
    let fetcher = PdfFetcher::from_env().context("Failed to configure fetcher")?;
    fetcher
        .fetch_and_load(LoadOptions::new(url))
        .await
        .with_context(|| format!("Failed to load {}", url))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("pdf_fetch=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting pdf-fetch-cli v{}", env!("CARGO_PKG_VERSION"));

    let worker = init_worker(WorkerOptions {
        offload: !args.inline_parse,
        ..WorkerOptions::default()
    })?;
    tracing::info!("Parse worker: {} (offload: {})", worker.worker_src, worker.offload);

    let doc = match load(&args.url).await {
        Ok(doc) => doc,
        Err(e) => {
            tracing::error!(url = %args.url, "{:#}", e);
            std::process::exit(1);
        }
    };

    let summary = Summary::from_document(&doc);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.render_text());
    }

    Ok(())
}
