use crate::domain::account::{Account, AccountKey, Bank};
use crate::domain::money::Balance;
use crate::domain::payment::Payment;
use crate::domain::ports::{LedgerStore, PaymentStore};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory ledger of accounts and banks.
///
/// Each balance adjustment runs while holding the entry's shard guard, so
/// concurrent deltas on the same account or bank never lose an update.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    accounts: Arc<DashMap<AccountKey, Account>>,
    banks: Arc<DashMap<String, Bank>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `accounts` and `banks`.
    pub fn seeded(accounts: Vec<Account>, banks: Vec<Bank>) -> Self {
        let store = Self::new();
        for account in accounts {
            store.accounts.insert(account.key(), account);
        }
        for bank in banks {
            store.banks.insert(bank.bank_code.clone(), bank);
        }
        store
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn account(&self, key: &AccountKey) -> Result<Option<Account>> {
        Ok(self.accounts.get(key).map(|entry| entry.value().clone()))
    }

    async fn bank(&self, bank_code: &str) -> Result<Option<Bank>> {
        Ok(self.banks.get(bank_code).map(|entry| entry.value().clone()))
    }

    async fn adjust_account_balance(&self, key: &AccountKey, delta: Balance) -> Result<Balance> {
        let mut entry = self
            .accounts
            .get_mut(key)
            .ok_or_else(|| PaymentError::NotFound(format!("Account {}", key)))?;
        Ok(entry.apply(delta))
    }

    async fn adjust_liquidity(&self, bank_code: &str, delta: Balance) -> Result<Balance> {
        let mut entry = self
            .banks
            .get_mut(bank_code)
            .ok_or_else(|| PaymentError::NotFound(format!("Bank {}", bank_code)))?;
        Ok(entry.apply(delta))
    }

    async fn put_account(&self, account: Account) -> Result<()> {
        self.accounts.insert(account.key(), account);
        Ok(())
    }

    async fn put_bank(&self, bank: Bank) -> Result<()> {
        self.banks.insert(bank.bank_code.clone(), bank);
        Ok(())
    }

    async fn accounts(&self) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(Account::key);
        Ok(accounts)
    }

    async fn banks(&self) -> Result<Vec<Bank>> {
        let mut banks: Vec<Bank> = self.banks.iter().map(|entry| entry.value().clone()).collect();
        banks.sort_by(|a, b| a.bank_code.cmp(&b.bank_code));
        Ok(banks)
    }
}

/// Payments seen by one simulated bank, indexed by id and by reference.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    inner: Arc<RwLock<PaymentIndex>>,
}

#[derive(Default)]
struct PaymentIndex {
    by_id: HashMap<Uuid, Payment>,
    by_reference: HashMap<String, Uuid>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut index = self.inner.write().await;
        if let Some(reference) = payment.reference.clone() {
            index.by_reference.insert(reference, payment.id());
        }
        index.by_id.insert(payment.id(), payment);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payment>> {
        let index = self.inner.read().await;
        Ok(index.by_id.get(&id).cloned())
    }

    async fn get_by_reference(&self, reference: &str) -> Result<Option<Payment>> {
        let index = self.inner.read().await;
        Ok(index
            .by_reference
            .get(reference)
            .and_then(|id| index.by_id.get(id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Movement;
    use crate::domain::money::Amount;
    use rust_decimal_macros::dec;

    fn ledger() -> InMemoryLedgerStore {
        InMemoryLedgerStore::seeded(
            vec![Account::new("1001", "BANKA", "Alice", Balance::new(dec!(100.0)))],
            vec![Bank::new("BANKA", "Bank A", Balance::new(dec!(1000.0)))],
        )
    }

    #[tokio::test]
    async fn test_account_lookup_uses_compound_key() {
        let store = ledger();
        assert!(store.account(&AccountKey::new("1001", "BANKA")).await.unwrap().is_some());
        assert!(store.account(&AccountKey::new("1001", "BANKB")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_adjust_returns_new_balance() {
        let store = ledger();
        let key = AccountKey::new("1001", "BANKA");
        let amount = Amount::new(dec!(30)).unwrap();

        let after = store
            .adjust_account_balance(&key, Movement::Debit.delta(amount))
            .await
            .unwrap();
        assert_eq!(after, Balance::new(dec!(70.0)));

        let after = store
            .adjust_liquidity("BANKA", Movement::Credit.delta(amount))
            .await
            .unwrap();
        assert_eq!(after, Balance::new(dec!(1030.0)));
    }

    #[tokio::test]
    async fn test_adjust_missing_entity() {
        let store = ledger();
        let result = store.adjust_liquidity("NOPE", Balance::new(dec!(1))).await;
        assert!(matches!(result, Err(PaymentError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_adjustments_are_not_lost() {
        let store = ledger();
        let key = AccountKey::new("1001", "BANKA");

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                let key = key.clone();
                tokio::spawn(async move {
                    store
                        .adjust_account_balance(&key, Balance::new(dec!(1.5)))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let account = store.account(&key).await.unwrap().unwrap();
        assert_eq!(account.balance, Balance::new(dec!(196.0)));
    }

    #[tokio::test]
    async fn test_payment_store_by_reference() {
        let store = InMemoryPaymentStore::new();
        let mut payment = Payment::new();
        payment.reference = Some("REF-1".to_string());
        store.store(payment.clone()).await.unwrap();

        assert_eq!(store.get(payment.id()).await.unwrap(), Some(payment.clone()));
        assert_eq!(store.get_by_reference("REF-1").await.unwrap(), Some(payment));
        assert!(store.get_by_reference("REF-2").await.unwrap().is_none());
    }
}
