//! Account-related types for the bank ledger
//!
//! This module defines the Account structure, the account kinds that drive
//! interest rates, and the identifiers used to address accounts and users.

use super::error::LedgerError;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Ledger-assigned account identifier
pub type AccountId = u32;

/// Opaque identifier of the user owning an account
pub type UserId = String;

/// Account category
///
/// The kind is fixed when the account is opened and selects the interest
/// rate applied by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    /// Everyday account, earns 5% per interest run
    Checking,

    /// Savings account, earns 10% per interest run
    Savings,
}

impl AccountKind {
    /// Interest rate applied to accounts of this kind
    pub fn interest_rate(self) -> Decimal {
        match self {
            AccountKind::Savings => Decimal::new(10, 2),
            AccountKind::Checking => Decimal::new(5, 2),
        }
    }

    /// Name used in CSV files and log output
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::Checking => "Checking",
            AccountKind::Savings => "Savings",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = LedgerError;

    /// Parse an account kind, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "checking" => Ok(AccountKind::Checking),
            "savings" => Ok(AccountKind::Savings),
            _ => Err(LedgerError::invalid_account_kind(s)),
        }
    }
}

/// Description of an account to open
///
/// Used both for the initial ledger contents and for `Ledger::add_account`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSpec {
    /// User that will own the account
    pub owner: UserId,

    /// Account category
    pub kind: AccountKind,

    /// Opening balance, must be non-negative
    pub balance: Decimal,
}

impl AccountSpec {
    pub fn new(owner: impl Into<UserId>, kind: AccountKind, balance: Decimal) -> Self {
        AccountSpec {
            owner: owner.into(),
            kind,
            balance,
        }
    }
}

/// A single balance-holding record
///
/// Owner and kind never change after the account is opened. The balance can
/// only be changed through [`Account::set_balance`], which refuses to make it
/// negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    owner: UserId,
    kind: AccountKind,
    balance: Decimal,
}

impl Account {
    /// Open an account from its owner, kind and opening balance
    ///
    /// # Errors
    ///
    /// Returns `NegativeBalance` if the opening balance is below zero.
    pub fn new(
        owner: impl Into<UserId>,
        kind: AccountKind,
        balance: Decimal,
    ) -> Result<Self, LedgerError> {
        if balance < Decimal::ZERO {
            return Err(LedgerError::negative_balance(balance));
        }

        Ok(Account {
            owner: owner.into(),
            kind,
            balance,
        })
    }

    /// Open an account from a spec, copying its fields
    pub fn from_spec(spec: &AccountSpec) -> Result<Self, LedgerError> {
        Account::new(spec.owner.clone(), spec.kind, spec.balance)
    }

    /// The user owning this account
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    /// Current balance
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Replace the balance
    ///
    /// Negative balances are refused and leave the account at its prior
    /// balance.
    ///
    /// # Errors
    ///
    /// Returns `NegativeBalance` if `balance` is below zero.
    pub fn set_balance(&mut self, balance: Decimal) -> Result<(), LedgerError> {
        if balance < Decimal::ZERO {
            return Err(LedgerError::negative_balance(balance));
        }

        self.balance = balance;
        Ok(())
    }

    /// Interest rate applied to this account
    pub fn interest_rate(&self) -> Decimal {
        self.kind.interest_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_account_keeps_opening_fields() {
        let account = Account::new("Ben123", AccountKind::Checking, Decimal::from(110)).unwrap();

        assert_eq!(account.owner(), "Ben123");
        assert_eq!(account.kind(), AccountKind::Checking);
        assert_eq!(account.balance(), Decimal::from(110));
    }

    #[test]
    fn test_new_account_rejects_negative_opening_balance() {
        let result = Account::new("Ben123", AccountKind::Checking, Decimal::from(-1));
        assert_eq!(
            result,
            Err(LedgerError::NegativeBalance {
                requested: Decimal::from(-1)
            })
        );
    }

    #[test]
    fn test_set_balance_replaces_balance() {
        let mut account = Account::new("Ben123", AccountKind::Savings, Decimal::from(20)).unwrap();

        assert!(account.set_balance(Decimal::new(255, 1)).is_ok());
        assert_eq!(account.balance(), Decimal::new(255, 1));
    }

    #[test]
    fn test_set_balance_allows_zero() {
        let mut account = Account::new("Ben123", AccountKind::Savings, Decimal::from(20)).unwrap();

        assert!(account.set_balance(Decimal::ZERO).is_ok());
        assert_eq!(account.balance(), Decimal::ZERO);
    }

    #[rstest]
    #[case::minus_five(Decimal::from(-5))]
    #[case::tiny(Decimal::new(-1, 4))]
    fn test_set_balance_rejects_negative(#[case] requested: Decimal) {
        let mut account = Account::new("Ben123", AccountKind::Checking, Decimal::from(110)).unwrap();

        let result = account.set_balance(requested);

        assert!(matches!(result, Err(LedgerError::NegativeBalance { .. })));
        assert_eq!(account.balance(), Decimal::from(110));
    }

    #[rstest]
    #[case(AccountKind::Checking, Decimal::new(5, 2))]
    #[case(AccountKind::Savings, Decimal::new(10, 2))]
    fn test_interest_rate_by_kind(#[case] kind: AccountKind, #[case] expected: Decimal) {
        assert_eq!(kind.interest_rate(), expected);
    }

    #[rstest]
    #[case("Checking", AccountKind::Checking)]
    #[case("savings", AccountKind::Savings)]
    #[case("  SAVINGS ", AccountKind::Savings)]
    fn test_parse_account_kind(#[case] input: &str, #[case] expected: AccountKind) {
        assert_eq!(input.parse::<AccountKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_account_kind() {
        let result = "Brokerage".parse::<AccountKind>();
        assert!(matches!(
            result,
            Err(LedgerError::InvalidAccountKind { .. })
        ));
    }
}
