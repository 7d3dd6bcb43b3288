//! Thread-safe ledger handle for async processing
//!
//! This module provides the `SharedLedger` struct, a cloneable handle that
//! lets several tasks drive one `Ledger`.
//!
//! # Design
//!
//! Transfers and payments read and write several accounts and have to look
//! atomic to every other caller. Per-account locking cannot give that, so the
//! whole ledger sits behind a single `tokio::sync::Mutex` and each method holds
//! the lock for exactly one logical operation.

use crate::core::ledger::Ledger;
use crate::types::{
    Account, AccountId, AccountSpec, CommandOutcome, LedgerCommand, LedgerError,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cloneable, thread-safe handle to a ledger
///
/// Clones share the same underlying ledger.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    /// Wrap a ledger for shared use
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Apply one command under a single lock acquisition
    pub async fn apply(&self, command: LedgerCommand) -> Result<CommandOutcome, LedgerError> {
        self.inner.lock().await.apply(command)
    }

    pub async fn add_account(&self, spec: AccountSpec) -> Result<AccountId, LedgerError> {
        self.inner.lock().await.add_account(spec)
    }

    pub async fn delete_account(&self, id: AccountId) -> Option<Account> {
        self.inner.lock().await.delete_account(id)
    }

    /// Snapshot of one account
    ///
    /// Returns a clone; later changes to the ledger are not reflected in it.
    pub async fn get_account(&self, id: AccountId) -> Option<Account> {
        self.inner.lock().await.get_account(id).cloned()
    }

    pub async fn transfer(
        &self,
        source: AccountId,
        dest: AccountId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        self.inner.lock().await.transfer(source, dest, amount)
    }

    pub async fn make_payment_between_users(
        &self,
        source_user: &str,
        dest_user: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        self.inner
            .lock()
            .await
            .make_payment_between_users(source_user, dest_user, amount)
    }

    pub async fn generate_interest(&self) -> Result<Decimal, LedgerError> {
        self.inner.lock().await.generate_interest()
    }

    pub async fn get_total_user_balance(&self, user: &str) -> Result<Decimal, LedgerError> {
        self.inner.lock().await.get_total_user_balance(user)
    }

    pub async fn get_total_bank_balance(&self) -> Result<Decimal, LedgerError> {
        self.inner.lock().await.get_total_bank_balance()
    }

    /// Copy of the whole ledger, taken under the lock
    pub async fn snapshot(&self) -> Ledger {
        self.inner.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountKind;

    fn shared() -> SharedLedger {
        let ledger = Ledger::new([
            (
                1,
                AccountSpec::new("Ben123", AccountKind::Checking, Decimal::from(110)),
            ),
            (
                2,
                AccountSpec::new("Amy456", AccountKind::Savings, Decimal::from(1000)),
            ),
        ])
        .unwrap();
        SharedLedger::new(ledger)
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let a = shared();
        let b = a.clone();

        a.transfer(1, 2, Decimal::from(10)).await.unwrap();

        assert_eq!(
            b.get_account(1).await.unwrap().balance(),
            Decimal::from(100)
        );
    }

    #[tokio::test]
    async fn test_concurrent_transfers_conserve_total() {
        let ledger = shared();
        let before = ledger.get_total_bank_balance().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..50 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                let (source, dest) = if i % 2 == 0 { (1, 2) } else { (2, 1) };
                let _ = ledger.transfer(source, dest, Decimal::from(7)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(ledger.get_total_bank_balance().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_concurrent_payments_never_overdraw() {
        let ledger = shared();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .make_payment_between_users("Ben123", "Amy456", Decimal::from(30))
                    .await
                    .is_ok()
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }

        // 110 covers exactly three payments of 30
        assert_eq!(succeeded, 3);
        assert_eq!(
            ledger.get_total_user_balance("Ben123").await.unwrap(),
            Decimal::from(20)
        );
    }

    #[tokio::test]
    async fn test_apply_and_snapshot() {
        let ledger = shared();

        let outcome = ledger.apply(LedgerCommand::Interest).await.unwrap();
        assert_eq!(outcome, CommandOutcome::InterestPaid(Decimal::new(1055, 1)));

        let id = ledger
            .add_account(AccountSpec::new(
                "Cat789",
                AccountKind::Checking,
                Decimal::ONE,
            ))
            .await
            .unwrap();
        assert!(ledger.delete_account(id).await.is_some());

        let snapshot = ledger.snapshot().await;
        assert_eq!(snapshot.len(), 2);
    }

    #[tokio::test]
    async fn test_overflowing_transfer_leaves_state_for_next_caller() {
        let ledger = SharedLedger::new(
            Ledger::new([
                (
                    1,
                    AccountSpec::new("Ben123", AccountKind::Checking, Decimal::MAX),
                ),
                (
                    2,
                    AccountSpec::new("Amy456", AccountKind::Checking, Decimal::ONE),
                ),
            ])
            .unwrap(),
        );

        let task = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.transfer(2, 1, Decimal::ONE).await })
        };
        assert!(matches!(
            task.await.unwrap(),
            Err(LedgerError::ArithmeticOverflow { .. })
        ));

        assert_eq!(ledger.get_account(1).await.unwrap().balance(), Decimal::MAX);
        assert_eq!(ledger.get_account(2).await.unwrap().balance(), Decimal::ONE);
    }
}
