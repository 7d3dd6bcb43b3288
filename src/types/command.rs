//! Ledger commands for the replay driver
//!
//! A command is one mutating call against the ledger, as read from the
//! command CSV. Commands carry already-parsed, typed arguments; parsing and
//! validation of the raw CSV rows lives in `io::csv_format`.

use super::account::{AccountId, AccountSpec, UserId};
use rust_decimal::Decimal;

/// A single ledger mutation
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    /// Move `amount` from one account to another
    Transfer {
        source: AccountId,
        dest: AccountId,
        amount: Decimal,
    },

    /// Pay `amount` from any of the source user's accounts into the first
    /// account of the destination user
    Payment {
        source: UserId,
        dest: UserId,
        amount: Decimal,
    },

    /// Pay interest on every account
    Interest,

    /// Open a new account under a fresh id
    Open(AccountSpec),

    /// Close the account with this id
    Close { id: AccountId },
}

impl LedgerCommand {
    /// Lowercase command name, as written in the CSV `type` column
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCommand::Transfer { .. } => "transfer",
            LedgerCommand::Payment { .. } => "payment",
            LedgerCommand::Interest => "interest",
            LedgerCommand::Open(_) => "open",
            LedgerCommand::Close { .. } => "close",
        }
    }
}

/// What an applied command did
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Transferred,
    Paid,
    /// Total interest paid across all accounts
    InterestPaid(Decimal),
    /// Id assigned to the new account
    Opened(AccountId),
    /// Whether an account was actually removed
    Closed(bool),
}
