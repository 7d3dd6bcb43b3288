//! The ledger: sole owner of every account
//!
//! This module provides the `Ledger` struct, which holds all accounts keyed by
//! a ledger-assigned id and implements every operation that has to preserve
//! cross-account invariants:
//! - Account lifecycle (open with a fresh id, close)
//! - Interest accrual
//! - Account-to-account transfers
//! - Payments between users holding several accounts
//!
//! # Invariants
//!
//! - No account balance is ever negative.
//! - Transfers and payments never change the total held by the bank; only
//!   interest adds money.
//! - Ids are never reused: new ids come from a counter that only moves
//!   forward, so closing accounts can never make a fresh id collide with a
//!   live one. Once the last id has been handed out, opening fails.
//! - A rejected operation mutates nothing. All balance arithmetic is checked,
//!   and every new balance is computed before the first one is written.
//!
//! # Ordering
//!
//! Accounts are stored in a `BTreeMap`, so every traversal runs in ascending
//! id order. "First account of a user" and the draw order of a payment follow
//! that order.

use crate::types::{
    Account, AccountId, AccountSpec, CommandOutcome, LedgerCommand, LedgerError, UserId,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

/// In-memory ledger of bank accounts
///
/// Callers only ever see accounts through shared references or ids; all
/// mutation goes through the ledger's own operations.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// Map of account ids to accounts
    accounts: BTreeMap<AccountId, Account>,

    /// Next id handed out by `add_account`
    ///
    /// Wider than `AccountId` so that handing out `AccountId::MAX` leaves
    /// the counter past every valid id instead of wrapping.
    next_id: u64,
}

impl Ledger {
    /// Create a ledger from an initial set of accounts
    ///
    /// Every spec is copied into a ledger-owned `Account`. Ids handed out
    /// later start just above the highest initial id.
    ///
    /// # Errors
    ///
    /// Returns an error if two entries share an id or a spec has a negative
    /// opening balance.
    pub fn new<I>(initial: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (AccountId, AccountSpec)>,
    {
        let mut ledger = Ledger::default();

        for (id, spec) in initial {
            if ledger.accounts.contains_key(&id) {
                return Err(LedgerError::duplicate_account_id(id));
            }
            ledger.accounts.insert(id, Account::from_spec(&spec)?);
            ledger.next_id = ledger.next_id.max(u64::from(id) + 1);
        }

        Ok(ledger)
    }

    /// Open an account under a fresh id
    ///
    /// # Returns
    ///
    /// The id assigned to the new account
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The opening balance is negative
    /// - Every account id has already been used
    pub fn add_account(&mut self, spec: AccountSpec) -> Result<AccountId, LedgerError> {
        let account = Account::from_spec(&spec)?;

        let id =
            AccountId::try_from(self.next_id).map_err(|_| LedgerError::AccountIdsExhausted)?;
        self.next_id += 1;

        debug!(id, owner = %spec.owner, kind = %spec.kind, balance = %spec.balance, "opened account");
        self.accounts.insert(id, account);
        Ok(id)
    }

    /// Close an account
    ///
    /// Closing an id that is not in the ledger does nothing.
    ///
    /// # Returns
    ///
    /// The removed account, if there was one
    pub fn delete_account(&mut self, id: AccountId) -> Option<Account> {
        let removed = self.accounts.remove(&id);
        if removed.is_some() {
            debug!(id, "closed account");
        }
        removed
    }

    /// Look up an account by id
    pub fn get_account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Number of live accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterate over all accounts in ascending id order
    pub fn accounts(&self) -> impl Iterator<Item = (AccountId, &Account)> + '_ {
        self.accounts.iter().map(|(id, account)| (*id, account))
    }

    /// Ids of every account owned by `user`, in ascending order
    pub fn account_ids_for<'a>(&'a self, user: &'a str) -> impl Iterator<Item = AccountId> + 'a {
        self.accounts()
            .filter(move |(_, account)| account.owner() == user)
            .map(|(id, _)| id)
    }

    /// Sum of balances across all accounts owned by `user`
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the sum does not fit in a `Decimal`.
    pub fn get_total_user_balance(&self, user: &str) -> Result<Decimal, LedgerError> {
        checked_sum(
            self.accounts
                .values()
                .filter(|account| account.owner() == user)
                .map(Account::balance),
            "user balance total",
        )
    }

    /// Sum of balances across every account in the ledger
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the sum does not fit in a `Decimal`.
    pub fn get_total_bank_balance(&self) -> Result<Decimal, LedgerError> {
        checked_sum(
            self.accounts.values().map(Account::balance),
            "bank balance total",
        )
    }

    /// Pay interest on every account
    ///
    /// Each account earns interest at the rate of its own kind (10% for
    /// savings, 5% otherwise), credited to its balance.
    ///
    /// Every new balance is computed before any is written, so an overflow
    /// on one account leaves all of them untouched.
    ///
    /// # Returns
    ///
    /// Total interest paid across all accounts
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if any new balance, or the total paid,
    /// does not fit in a `Decimal`.
    pub fn generate_interest(&mut self) -> Result<Decimal, LedgerError> {
        let overflow = || LedgerError::arithmetic_overflow("interest");
        let mut total_interest = Decimal::ZERO;
        let mut new_balances = Vec::with_capacity(self.accounts.len());

        for (id, account) in self.accounts() {
            let interest = account
                .balance()
                .checked_mul(account.interest_rate())
                .ok_or_else(overflow)?;
            let new_balance = account
                .balance()
                .checked_add(interest)
                .ok_or_else(overflow)?;
            total_interest = total_interest.checked_add(interest).ok_or_else(overflow)?;
            new_balances.push((id, new_balance));
        }

        for (id, new_balance) in new_balances {
            if let Some(account) = self.accounts.get_mut(&id) {
                // Never negative: both the old balance and the rate are non-negative.
                account.set_balance(new_balance)?;
            }
        }

        debug!(total = %total_interest, "paid interest");
        Ok(total_interest)
    }

    /// Move `amount` from one account to another
    ///
    /// Both sides are checked before either is touched: the call either moves
    /// the full amount or changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either account does not exist
    /// - The amount is negative
    /// - The source balance is smaller than the amount
    /// - The destination balance would overflow
    pub fn transfer(
        &mut self,
        source: AccountId,
        dest: AccountId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let source_balance = self
            .get_account(source)
            .ok_or_else(|| LedgerError::account_not_found(source, "transfer"))?
            .balance();

        if !self.accounts.contains_key(&dest) {
            return Err(LedgerError::account_not_found(dest, "transfer"));
        }

        if amount < Decimal::ZERO {
            return Err(LedgerError::negative_amount("transfer", amount));
        }

        if source_balance < amount {
            return Err(LedgerError::insufficient_funds(
                source,
                source_balance,
                amount,
            ));
        }

        self.move_funds(source, dest, amount, "transfer")?;

        debug!(source, dest, amount = %amount, "transferred funds");
        Ok(())
    }

    /// Pay `amount` from one user to another
    ///
    /// Funds are drawn from the source user's accounts in ascending id order:
    /// an account that covers the remainder pays it and ends the draw,
    /// otherwise it is drained and the next account is tried. Everything lands
    /// in the destination user's first account. The whole draw is planned
    /// before any balance changes. Only the source user's accounts and that
    /// one destination account are touched; a user paying themself is
    /// rejected instead of shuffling money between their own accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is negative
    /// - Source and destination are the same user
    /// - The destination user holds no account
    /// - The source user's accounts combined hold less than the amount
    /// - The destination balance would overflow
    pub fn make_payment_between_users(
        &mut self,
        source_user: &str,
        dest_user: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::negative_amount("payment", amount));
        }

        if source_user == dest_user {
            return Err(LedgerError::same_user(source_user));
        }

        let dest = self
            .account_ids_for(dest_user)
            .next()
            .ok_or_else(|| LedgerError::no_destination_account(dest_user))?;

        let (plan, shortfall) = self.plan_draw(source_user, amount);
        if shortfall > Decimal::ZERO {
            // The plan drained every account, so it drew exactly what the user holds.
            return Err(LedgerError::insufficient_user_funds(
                source_user,
                amount - shortfall,
                amount,
            ));
        }

        // Draws only shrink source balances; the destination gains `amount` in total.
        self.get_account(dest)
            .and_then(|account| account.balance().checked_add(amount))
            .ok_or_else(|| LedgerError::arithmetic_overflow("payment"))?;

        for &(source, draw) in &plan {
            self.move_funds(source, dest, draw, "payment")?;
        }

        debug!(
            source_user,
            dest_user,
            dest,
            amount = %amount,
            accounts_drawn = plan.len(),
            "paid between users"
        );
        Ok(())
    }

    /// Apply a replayed command
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying operation rejected the command
    /// with. Nothing has been mutated in that case.
    pub fn apply(&mut self, command: LedgerCommand) -> Result<CommandOutcome, LedgerError> {
        match command {
            LedgerCommand::Transfer {
                source,
                dest,
                amount,
            } => self
                .transfer(source, dest, amount)
                .map(|()| CommandOutcome::Transferred),
            LedgerCommand::Payment {
                source,
                dest,
                amount,
            } => self
                .make_payment_between_users(&source, &dest, amount)
                .map(|()| CommandOutcome::Paid),
            LedgerCommand::Interest => self.generate_interest().map(CommandOutcome::InterestPaid),
            LedgerCommand::Open(spec) => self.add_account(spec).map(CommandOutcome::Opened),
            LedgerCommand::Close { id } => {
                Ok(CommandOutcome::Closed(self.delete_account(id).is_some()))
            }
        }
    }

    /// Work out how much to take from each of the user's accounts
    ///
    /// Accounts with nothing to give are skipped. Returns the draws and the
    /// part of `amount` the user's accounts could not cover.
    fn plan_draw(&self, user: &str, amount: Decimal) -> (Vec<(AccountId, Decimal)>, Decimal) {
        let mut remaining = amount;
        let mut plan = Vec::new();

        for (id, account) in self.accounts() {
            if remaining <= Decimal::ZERO {
                break;
            }
            if account.owner() != user || account.balance().is_zero() {
                continue;
            }

            let draw = remaining.min(account.balance());
            plan.push((id, draw));
            remaining -= draw;
        }

        (plan, remaining)
    }

    /// Debit `source` and credit `dest` by `amount`
    ///
    /// Callers must have checked that both accounts exist and that the source
    /// covers the amount. Both new balances are computed before either is
    /// written. When `source == dest` the credit applies to the debited
    /// balance, so the transfer nets to zero.
    fn move_funds(
        &mut self,
        source: AccountId,
        dest: AccountId,
        amount: Decimal,
        operation: &str,
    ) -> Result<(), LedgerError> {
        let balance_of = |id: AccountId| {
            self.get_account(id)
                .map(Account::balance)
                .ok_or_else(|| LedgerError::account_not_found(id, operation))
        };

        let new_source = balance_of(source)?
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow(operation))?;
        let dest_balance = if source == dest {
            new_source
        } else {
            balance_of(dest)?
        };
        let new_dest = dest_balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow(operation))?;

        if let Some(account) = self.accounts.get_mut(&source) {
            account.set_balance(new_source)?;
        }
        if let Some(account) = self.accounts.get_mut(&dest) {
            account.set_balance(new_dest)?;
        }
        Ok(())
    }
}

/// Sum balances, failing instead of panicking when the sum leaves the `Decimal` range
fn checked_sum<I>(balances: I, operation: &str) -> Result<Decimal, LedgerError>
where
    I: IntoIterator<Item = Decimal>,
{
    balances.into_iter().try_fold(Decimal::ZERO, |total, balance| {
        total
            .checked_add(balance)
            .ok_or_else(|| LedgerError::arithmetic_overflow(operation))
    })
}
