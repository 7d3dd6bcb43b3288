//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account, account kinds and identifiers
//! - `command`: Ledger commands replayed by the CLI driver
//! - `error`: Error types for the ledger

pub mod account;
pub mod command;
pub mod error;

pub use account::{Account, AccountId, AccountKind, AccountSpec, UserId};
pub use command::{CommandOutcome, LedgerCommand};
pub use error::LedgerError;
