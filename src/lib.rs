//! Rust Bank Ledger Library
//! # Overview
//!
//! An in-memory ledger for a small set of bank accounts. It tracks balances,
//! pays interest, and moves money between accounts and between users who may
//! hold several accounts, while keeping three invariants:
//!
//! - No account balance is ever negative
//! - Transfers and payments never create or destroy money
//! - Account ids are unique and never reused
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, AccountSpec, LedgerCommand, LedgerError)
//! - [`core`] - Business logic:
//!   - [`core::ledger`] - The ledger and all its operations
//!   - [`core::shared`] - Thread-safe ledger handle
//! - [`io`] - CSV snapshot and command formats, sync and async readers
//! - [`strategy`] - Sync and async replay pipelines
//! - [`cli`] - CLI arguments parsing and log setup
//!
//! # Example
//!
//! ```
//! use rust_bank_ledger::{AccountKind, AccountSpec, Ledger};
//! use rust_decimal::Decimal;
//!
//! let mut ledger = Ledger::new([
//!     (1, AccountSpec::new("Ben123", AccountKind::Checking, Decimal::from(110))),
//!     (2, AccountSpec::new("Amy456", AccountKind::Savings, Decimal::from(1000))),
//! ])
//! .unwrap();
//!
//! ledger.make_payment_between_users("Ben123", "Amy456", Decimal::from(10)).unwrap();
//! assert_eq!(ledger.get_total_user_balance("Amy456"), Ok(Decimal::from(1010)));
//!
//! // Rejected operations change nothing
//! assert!(ledger.transfer(1, 2, Decimal::from(500)).is_err());
//! assert_eq!(ledger.get_total_bank_balance(), Ok(Decimal::from(1110)));
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{Ledger, SharedLedger};
pub use io::write_accounts_csv;
pub use strategy::ReplayReport;
pub use types::{
    Account, AccountId, AccountKind, AccountSpec, CommandOutcome, LedgerCommand, LedgerError,
    UserId,
};
