//! Replay strategy module
//!
//! This module defines the Strategy pattern for complete replay pipelines:
//! load an account snapshot, replay a command file against it and write the
//! resulting snapshot. Different implementations (synchronous, asynchronous
//! batch) can be selected at runtime.

use crate::cli::StrategyType;
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Counts of what happened during a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Commands the ledger accepted
    pub applied: usize,
    /// Commands the ledger rejected without mutation
    pub rejected: usize,
    /// Rows that could not be parsed into a command
    pub malformed: usize,
}

/// Replay strategy trait
///
/// Each strategy must be able to load the snapshot, replay every command in
/// file order and write the final snapshot to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay `commands_path` against the accounts in `accounts_path`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either input file cannot be opened
    /// - The account snapshot is invalid
    /// - Output cannot be written
    ///
    /// Malformed command rows and rejected commands are logged and counted in
    /// the report; they do not stop the replay.
    fn process(
        &self,
        accounts_path: &Path,
        commands_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplayReport, LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is only used by the async strategy; `None` selects the defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
