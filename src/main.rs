//! Bank ledger CLI
//!
//! Loads an account snapshot, replays a file of ledger commands against it and
//! prints the resulting snapshot to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.csv commands.csv > result.csv
//! cargo run -- --strategy async --batch-size 500 --workers 4 accounts.csv commands.csv
//! RUST_LOG=debug cargo run -- accounts.csv commands.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success (rejected or malformed commands are logged, not fatal)
//! - 1: Error (missing file, invalid snapshot, output not writable, etc.)

use rust_bank_ledger::cli;
use rust_bank_ledger::strategy;
use std::process;

fn main() {
    cli::init_tracing();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.accounts_file, &args.commands_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
