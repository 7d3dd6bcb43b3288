//! Synchronous CSV readers
//!
//! Provides a streaming iterator over ledger commands and a loader for
//! account snapshots. Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<LedgerCommand, LedgerError>` for each CSV row:
//!
//! ```no_run
//! use rust_bank_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("commands.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("Replaying: {:?}", command),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record errors are yielded as Err variants carrying the line
//! - A snapshot must be entirely valid: `read_accounts` fails on the first bad
//!   row, since a partially loaded ledger would misstate balances

use crate::core::Ledger;
use crate::io::csv_format::{
    convert_account_record, convert_command_record, AccountRecord, CommandRecord,
};
use crate::types::{LedgerCommand, LedgerError};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Open a CSV file with the settings shared by every reader
fn open_csv(path: &Path) -> Result<csv::Reader<File>, LedgerError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LedgerError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LedgerError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        },
    })?;

    Ok(ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .buffer_capacity(8 * 1024)
        .from_reader(file))
}

/// Load a ledger from an account snapshot file
///
/// # Errors
///
/// Returns an error if the file cannot be opened, any row is malformed, two
/// rows share an id, or a balance is negative.
pub fn read_accounts(path: &Path) -> Result<Ledger, LedgerError> {
    let mut reader = open_csv(path)?;
    let mut accounts = Vec::new();

    for (index, result) in reader.deserialize::<AccountRecord>().enumerate() {
        // Line 1 is the header
        let line = index as u64 + 2;
        let record = result?;
        accounts.push(convert_account_record(record).map_err(|e| e.at_line(line))?);
    }

    Ledger::new(accounts)
}

/// Synchronous command reader
///
/// Provides an iterator interface over ledger commands.
/// Maintains streaming behavior with constant memory usage.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (trailing fields may be omitted)
    /// - Use an 8KB buffer for efficient I/O
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        Ok(Self {
            reader: open_csv(path)?,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<LedgerCommand, LedgerError>;

    /// Get the next command from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(LedgerCommand))` - Successfully parsed command
    /// * `Some(Err(LedgerError))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CommandRecord>();
        let result = deserializer.next()?;
        self.line_num += 1;

        Some(
            result
                .map_err(LedgerError::from)
                .and_then(convert_command_record)
                .map_err(|e| e.at_line(self.line_num)),
        )
    }
}
