//! Core business logic module
//!
//! This module contains the ledger components:
//! - `ledger` - Account ownership, lifecycle, interest, transfers and payments
//! - `shared` - Thread-safe handle used by the async strategy

pub mod ledger;
pub mod shared;

pub use ledger::Ledger;
pub use shared::SharedLedger;
