//! Parse worker configuration
//!
//! Parsing is CPU-bound, so by default it runs on tokio's blocking pool.
//! Where it runs is configured once per process through [`init_worker`];
//! if nobody configures it, the first load installs the defaults.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PdfFetchError;

pub const DEFAULT_WORKER_SRC: &str = "lopdf-blocking-pool";

/// Where and how document parsing runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerOptions {
    /// Name of the parse worker, attached to log spans
    pub worker_src: String,
    /// Parse on the blocking pool (true) or on the calling task (false)
    pub offload: bool,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            worker_src: DEFAULT_WORKER_SRC.to_string(),
            offload: true,
        }
    }
}

impl WorkerOptions {
    /// Run a parse job according to these options
    pub(crate) async fn run<F, T>(&self, job: F) -> Result<T, PdfFetchError>
    where
        F: FnOnce() -> Result<T, PdfFetchError> + Send + 'static,
        T: Send + 'static,
    {
        if !self.offload {
            return job();
        }

        tokio::task::spawn_blocking(job).await.map_err(|e| {
            PdfFetchError::Parse(format!("parse worker {} failed: {}", self.worker_src, e))
        })?
    }
}

/// A write-once holder for [`WorkerOptions`]
#[derive(Debug)]
pub struct WorkerSlot {
    options: OnceLock<WorkerOptions>,
    inits: AtomicUsize,
}

impl WorkerSlot {
    pub const fn new() -> Self {
        Self {
            options: OnceLock::new(),
            inits: AtomicUsize::new(0),
        }
    }

    /// Configure the slot. Fails with `AlreadyConfigured` if it was set before,
    /// whether explicitly or by a load installing the defaults.
    pub fn init(&self, options: WorkerOptions) -> Result<&WorkerOptions, PdfFetchError> {
        let mut installed = false;
        let current = self.options.get_or_init(|| {
            installed = true;
            self.install(options)
        });

        if installed {
            Ok(current)
        } else {
            Err(PdfFetchError::AlreadyConfigured)
        }
    }

    /// Current options, installing the defaults on first use
    pub fn get_or_init_default(&self) -> &WorkerOptions {
        self.options.get_or_init(|| self.install(WorkerOptions::default()))
    }

    pub fn get(&self) -> Option<&WorkerOptions> {
        self.options.get()
    }

    /// How many times the slot has been initialized (0 or 1)
    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    fn install(&self, options: WorkerOptions) -> WorkerOptions {
        self.inits.fetch_add(1, Ordering::SeqCst);
        debug!(
            worker_src = %options.worker_src,
            offload = options.offload,
            "Configured PDF worker"
        );
        options
    }
}

impl Default for WorkerSlot {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_WORKER: WorkerSlot = WorkerSlot::new();

/// Configure the process-wide parse worker
///
/// Call this before the first load; afterwards it returns `AlreadyConfigured`.
pub fn init_worker(options: WorkerOptions) -> Result<&'static WorkerOptions, PdfFetchError> {
    GLOBAL_WORKER.init(options)
}

/// The process-wide worker slot
pub fn global_worker() -> &'static WorkerSlot {
    &GLOBAL_WORKER
}
