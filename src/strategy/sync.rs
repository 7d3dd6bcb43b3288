//! Synchronous replay strategy
//!
//! Single-threaded implementation of the ProcessingStrategy trait. It loads
//! the snapshot with `read_accounts`, streams commands through `SyncReader`
//! into `Ledger::apply`, and writes the final snapshot with
//! `csv_format::write_accounts_csv`.
//!
//! Memory use is O(accounts): commands are read one at a time.

use crate::core::Ledger;
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::{read_accounts, SyncReader};
use crate::strategy::{ProcessingStrategy, ReplayReport};
use crate::types::{LedgerCommand, LedgerError};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Synchronous replay strategy
///
/// # Examples
///
/// ```no_run
/// use rust_bank_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy
///     .process(Path::new("accounts.csv"), Path::new("commands.csv"), &mut output)
///     .expect("Replay failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

/// Apply one command, logging and counting the outcome
fn replay_command(ledger: &mut Ledger, command: LedgerCommand, report: &mut ReplayReport) {
    let name = command.name();
    match ledger.apply(command) {
        Ok(_) => report.applied += 1,
        Err(e) => {
            report.rejected += 1;
            warn!(command = name, error = %e, "command rejected");
        }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        accounts_path: &Path,
        commands_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplayReport, LedgerError> {
        let mut ledger = read_accounts(accounts_path)?;
        let reader = SyncReader::new(commands_path)?;
        let mut report = ReplayReport::default();

        for result in reader {
            match result {
                Ok(command) => replay_command(&mut ledger, command, &mut report),
                Err(e) => {
                    report.malformed += 1;
                    warn!(error = %e, "skipping malformed command");
                }
            }
        }

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
