//! Asynchronous batch replay strategy
//!
//! This module provides an asynchronous implementation of the
//! ProcessingStrategy trait on a multi-threaded tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, worker_threads)
//!     ├── read_accounts_async (snapshot loading)
//!     ├── AsyncReader (batched command reading)
//!     └── SharedLedger (one lock per command)
//! ```
//!
//! # Ordering
//!
//! Commands are not independent: a payment can depend on a transfer two rows
//! earlier. Each batch is therefore replayed in file order by a single task,
//! and the next batch is only read once that task has finished. Reading the
//! file and replaying run on the runtime's worker threads.

use crate::core::SharedLedger;
use crate::io::async_reader::{read_accounts_async, AsyncReader};
use crate::io::csv_format::write_accounts_csv;
use crate::strategy::{ProcessingStrategy, ReplayReport};
use crate::types::{LedgerCommand, LedgerError};
use std::io::Write;
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{info, warn};

/// Configuration for batch processing
///
/// Controls how many commands are read per batch and how many worker threads
/// the runtime uses.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of commands per batch
    pub batch_size: usize,
    /// Number of tokio worker threads
    pub worker_threads: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            worker_threads: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults.
    pub fn new(batch_size: usize, worker_threads: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let worker_threads = if worker_threads == 0 {
            warn!(
                worker_threads,
                default = default.worker_threads,
                "invalid worker thread count, using default"
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self {
            batch_size,
            worker_threads,
        }
    }
}

/// Asynchronous batch replay strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    /// Batch processing configuration
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    async fn replay(
        &self,
        accounts_path: &Path,
        commands_path: &Path,
    ) -> Result<(SharedLedger, ReplayReport), LedgerError> {
        let accounts = open(accounts_path).await?;
        let ledger = SharedLedger::new(read_accounts_async(accounts.compat()).await?);

        let commands = open(commands_path).await?;
        let mut reader = AsyncReader::new(commands.compat());
        let mut report = ReplayReport::default();

        loop {
            let batch = reader.read_batch(self.config.batch_size).await;
            if batch.is_empty() {
                break;
            }

            let task = tokio::spawn(replay_batch(ledger.clone(), batch));
            let (applied, rejected) = task.await.map_err(|e| LedgerError::IoError {
                message: format!("Replay task failed: {}", e),
            })?;
            report.applied += applied;
            report.rejected += rejected;
        }

        report.malformed = reader.skipped();
        Ok((ledger, report))
    }
}

async fn open(path: &Path) -> Result<tokio::fs::File, LedgerError> {
    tokio::fs::File::open(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LedgerError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LedgerError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        },
    })
}

/// Replay one batch in order, returning (applied, rejected)
async fn replay_batch(ledger: SharedLedger, batch: Vec<LedgerCommand>) -> (usize, usize) {
    let mut applied = 0;
    let mut rejected = 0;

    for command in batch {
        let name = command.name();
        match ledger.apply(command).await {
            Ok(_) => applied += 1,
            Err(e) => {
                rejected += 1;
                warn!(command = name, error = %e, "command rejected");
            }
        }
    }

    (applied, rejected)
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(
        &self,
        accounts_path: &Path,
        commands_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplayReport, LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads)
            .build()
            .map_err(|e| LedgerError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        let (ledger, report) = runtime.block_on(self.replay(accounts_path, commands_path))?;
        let ledger = runtime.block_on(ledger.snapshot());

        write_accounts_csv(&ledger, output)?;

        info!(
            applied = report.applied,
            rejected = report.rejected,
            malformed = report.malformed,
            accounts = ledger.len(),
            "replay finished"
        );
        Ok(report)
    }
}
