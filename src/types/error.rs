//! Error types for the bank ledger
//!
//! This module defines all error types that can occur while loading, replaying
//! or applying ledger operations. Errors are designed to be descriptive and
//! user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed CSV, unknown command types, bad amounts
//! - **Ledger Errors**: Missing accounts, negative amounts, insufficient funds
//!
//! Every ledger error is a rejection: the operation that returned it has not
//! mutated any account.

use super::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
///
/// Each variant includes relevant context to help diagnose the rejected
/// operation or malformed input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Unknown command type in the command file
    #[error("Invalid command type '{command}'")]
    InvalidCommandType {
        /// The unrecognised type string
        command: String,
    },

    /// Unknown account kind
    #[error("Invalid account kind '{kind}'")]
    InvalidAccountKind {
        /// The unrecognised kind string
        kind: String,
    },

    /// A command is missing one of its required fields
    #[error("{command} command is missing the {field} field")]
    MissingField {
        /// Command type
        command: String,
        /// Name of the missing column
        field: String,
    },

    /// Amount could not be parsed as a decimal
    #[error("Invalid amount '{amount}'")]
    InvalidAmount {
        /// The malformed amount string
        amount: String,
    },

    /// Account id could not be parsed
    #[error("Invalid account id '{value}'")]
    InvalidAccountId {
        /// The malformed id string
        value: String,
    },

    /// Two snapshot rows share an account id
    #[error("Duplicate account id {id}")]
    DuplicateAccountId {
        /// The repeated id
        id: AccountId,
    },

    /// An account balance would become negative
    #[error("Balance cannot be negative: requested {requested}")]
    NegativeBalance {
        /// The refused balance
        requested: Decimal,
    },

    /// A negative amount was passed to a money-moving operation
    #[error("Negative amount {amount} for {operation}")]
    NegativeAmount {
        /// Operation that was rejected
        operation: String,
        /// The refused amount
        amount: Decimal,
    },

    /// Account id does not exist in the ledger
    #[error("Account {id} not found for {operation}")]
    AccountNotFound {
        /// Account id that was not found
        id: AccountId,
        /// Operation that failed
        operation: String,
    },

    /// Source account cannot cover a transfer
    #[error("Insufficient funds in account {id}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Source account id
        id: AccountId,
        /// Balance of the source account
        available: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// A user's accounts combined cannot cover a payment
    #[error(
        "Insufficient funds for user {user}: available {available}, requested {requested}"
    )]
    InsufficientUserFunds {
        /// Paying user
        user: String,
        /// Sum of the user's balances
        available: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// Payee holds no account to receive a payment
    #[error("User {user} has no account to receive the payment")]
    NoDestinationAccount {
        /// Receiving user
        user: String,
    },

    /// Payment from a user to themself
    #[error("User {user} cannot pay themself")]
    SameUser {
        /// The user named as both payer and payee
        user: String,
    },

    /// A balance or total would leave the representable range
    ///
    /// The operation is rejected before any balance changes.
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },

    /// Every account id has already been handed out
    #[error("No account ids left to assign")]
    AccountIdsExhausted,
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Conversion from csv_async::Error to LedgerError
// The async readers attach the line number themselves.
impl From<csv_async::Error> for LedgerError {
    fn from(error: csv_async::Error) -> Self {
        LedgerError::ParseError {
            line: None,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(id: AccountId, operation: &str) -> Self {
        LedgerError::AccountNotFound {
            id,
            operation: operation.to_string(),
        }
    }

    /// Create a NegativeAmount error
    pub fn negative_amount(operation: &str, amount: Decimal) -> Self {
        LedgerError::NegativeAmount {
            operation: operation.to_string(),
            amount,
        }
    }

    /// Create a NegativeBalance error
    pub fn negative_balance(requested: Decimal) -> Self {
        LedgerError::NegativeBalance { requested }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(id: AccountId, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            id,
            available,
            requested,
        }
    }

    /// Create an InsufficientUserFunds error
    pub fn insufficient_user_funds(user: &str, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientUserFunds {
            user: user.to_string(),
            available,
            requested,
        }
    }

    /// Create a NoDestinationAccount error
    pub fn no_destination_account(user: &str) -> Self {
        LedgerError::NoDestinationAccount {
            user: user.to_string(),
        }
    }

    /// Create a SameUser error
    pub fn same_user(user: &str) -> Self {
        LedgerError::SameUser {
            user: user.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create a DuplicateAccountId error
    pub fn duplicate_account_id(id: AccountId) -> Self {
        LedgerError::DuplicateAccountId { id }
    }

    /// Create an InvalidCommandType error
    pub fn invalid_command_type(command: &str) -> Self {
        LedgerError::InvalidCommandType {
            command: command.to_string(),
        }
    }

    /// Create an InvalidAccountKind error
    pub fn invalid_account_kind(kind: &str) -> Self {
        LedgerError::InvalidAccountKind {
            kind: kind.to_string(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(command: &str, field: &str) -> Self {
        LedgerError::MissingField {
            command: command.to_string(),
            field: field.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
        }
    }

    /// Create an InvalidAccountId error
    pub fn invalid_account_id(value: &str) -> Self {
        LedgerError::InvalidAccountId {
            value: value.to_string(),
        }
    }

    /// Attach a line number to a parse-time error
    ///
    /// Errors that already carry a position are returned unchanged; other
    /// input errors are folded into `ParseError` so the caller can report
    /// where the bad row was.
    pub fn at_line(self, line: u64) -> Self {
        match self {
            LedgerError::ParseError { line: Some(_), .. } => self,
            LedgerError::ParseError {
                line: None,
                message,
            } => LedgerError::ParseError {
                line: Some(line),
                message,
            },
            other => LedgerError::ParseError {
                line: Some(line),
                message: other.to_string(),
            },
        }
    }
}
