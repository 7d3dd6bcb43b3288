use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay ledger commands against a bank account snapshot
#[derive(Parser, Debug)]
#[command(name = "bank-ledger")]
#[command(about = "Replay ledger commands against a bank account snapshot", long_about = None)]
pub struct CliArgs {
    /// Account snapshot CSV (id,owner,kind,balance)
    #[arg(value_name = "ACCOUNTS", help = "Path to the account snapshot CSV file")]
    pub accounts_file: PathBuf,

    /// Command CSV (type,source,dest,amount)
    #[arg(value_name = "COMMANDS", help = "Path to the command CSV file")]
    pub commands_file: PathBuf,

    /// Replay strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Replay strategy: 'sync' for synchronous or 'async' for batched async"
    )]
    pub strategy: StrategyType,

    /// Number of commands per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of runtime worker threads (async mode only)
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of tokio worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,
}

/// Available replay strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; zero values are replaced by
    /// the defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.workers.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.workers.unwrap_or(default.worker_threads),
            )
        } else {
            BatchConfig::default()
        }
    }
}
