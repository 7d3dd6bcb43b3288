//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, snapshot output)
//! - `sync_reader` - Synchronous command iterator and snapshot loader
//! - `async_reader` - Asynchronous batched command reader and snapshot loader

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::{read_accounts_async, AsyncReader};
pub use csv_format::{
    convert_account_record, convert_command_record, write_accounts_csv, AccountRecord,
    CommandRecord,
};
pub use sync_reader::{read_accounts, SyncReader};
