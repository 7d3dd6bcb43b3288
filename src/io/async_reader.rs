//! Asynchronous CSV readers with batch interface
//!
//! Provides batched reading of ledger commands and an async snapshot loader.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - futures `AsyncRead` so any compat-wrapped tokio reader can be used
//! - Batch reading so the strategy can hand whole batches to the ledger
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of LedgerCommands
//!                  ↓
//!           csv_format module
//!           (CommandRecord, convert_command_record)
//! ```

use crate::core::Ledger;
use crate::io::csv_format::{
    convert_account_record, convert_command_record, AccountRecord, CommandRecord,
};
use crate::types::{LedgerCommand, LedgerError};
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

fn deserializer<R: AsyncRead + Unpin + Send>(reader: R) -> csv_async::AsyncDeserializer<R> {
    AsyncReaderBuilder::new()
        .flexible(true)
        .trim(csv_async::Trim::All)
        .create_deserializer(reader)
}

/// Load a ledger from an account snapshot
///
/// Same rules as the synchronous loader: the first bad row aborts the load.
pub async fn read_accounts_async<R>(reader: R) -> Result<Ledger, LedgerError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut csv_reader = deserializer(reader);
    let mut records = csv_reader.deserialize::<AccountRecord>();
    let mut accounts = Vec::new();
    let mut line = 1;

    while let Some(result) = records.next().await {
        line += 1;
        let record = result.map_err(|e| LedgerError::from(e).at_line(line))?;
        accounts.push(convert_account_record(record).map_err(|e| e.at_line(line))?);
    }

    Ledger::new(accounts)
}

/// Asynchronous command reader
///
/// Provides batch reading interface over ledger commands.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: u64,
    skipped: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        Self {
            csv_reader: deserializer(reader),
            line_num: 1,
            skipped: 0,
        }
    }

    /// Read a batch of commands
    ///
    /// Reads up to `batch_size` valid commands. Malformed rows are logged and
    /// skipped without counting towards the batch.
    ///
    /// # Returns
    ///
    /// A vector of successfully converted commands.
    /// Returns an empty vector when the end of the file is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<LedgerCommand> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CommandRecord>();

        while batch.len() < batch_size {
            let Some(result) = records.next().await else {
                break;
            };
            self.line_num += 1;

            match result
                .map_err(LedgerError::from)
                .and_then(convert_command_record)
            {
                Ok(command) => batch.push(command),
                Err(e) => {
                    self.skipped += 1;
                    warn!(error = %e.at_line(self.line_num), "skipping malformed command");
                }
            }
        }

        batch
    }

    /// Number of malformed rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountKind;
    use futures::io::Cursor;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_async_reader_read_batch() {
        let csv_content = "type,source,dest,amount\n\
            transfer,1,2,50\n\
            interest,,,\n\
            close,3,,\n";
        let mut async_reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()));

        let batch = async_reader.read_batch(2).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch[0],
            LedgerCommand::Transfer {
                source: 1,
                dest: 2,
                amount: Decimal::from(50)
            }
        );
        assert_eq!(batch[1], LedgerCommand::Interest);

        let batch = async_reader.read_batch(2).await;
        assert_eq!(batch, vec![LedgerCommand::Close { id: 3 }]);

        assert!(async_reader.read_batch(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_empty_csv() {
        let mut async_reader = AsyncReader::new(Cursor::new("type,source,dest,amount\n".as_bytes()));

        let batch = async_reader.read_batch(10).await;
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_skips_invalid_records() {
        let csv_content = "type,source,dest,amount\n\
            refund,1,2,5\n\
            transfer,1,2,abc\n\
            payment,Ben123,Amy456,5\n";
        let mut async_reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()));

        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].name(), "payment");
        assert_eq!(async_reader.skipped(), 2);
    }

    #[tokio::test]
    async fn test_async_reader_case_insensitive_type() {
        let csv_content = "type,source,dest,amount\nINTEREST,,,\nClose,1,,\n";
        let mut async_reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()));

        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 2);
    }

    #[tokio::test]
    async fn test_read_accounts_async() {
        let csv_content = "id,owner,kind,balance\n\
            1,Ben123,Checking,110\n\
            4,Amy456,Savings,1000\n";

        let ledger = read_accounts_async(Cursor::new(csv_content.as_bytes()))
            .await
            .unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get_account(1).unwrap().kind(), AccountKind::Checking);
        assert_eq!(ledger.get_total_bank_balance().unwrap(), Decimal::from(1110));
    }

    #[tokio::test]
    async fn test_read_accounts_async_rejects_bad_row() {
        let csv_content = "id,owner,kind,balance\n1,Ben123,Checking,lots\n";

        let result = read_accounts_async(Cursor::new(csv_content.as_bytes())).await;
        assert!(matches!(
            result,
            Err(LedgerError::ParseError { line: Some(2), .. })
        ));
    }
}
