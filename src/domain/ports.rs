use super::account::{Account, AccountKey, Bank};
use super::money::Balance;
use super::payment::Payment;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Authoritative store of accounts and banks.
///
/// Lookups hand out clones; callers must not hold on to them across operations.
/// `adjust_*` must apply the delta as one atomic read-modify-write on the
/// addressed entity and return the resulting balance.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn account(&self, key: &AccountKey) -> Result<Option<Account>>;
    async fn bank(&self, bank_code: &str) -> Result<Option<Bank>>;
    async fn adjust_account_balance(&self, key: &AccountKey, delta: Balance) -> Result<Balance>;
    async fn adjust_liquidity(&self, bank_code: &str, delta: Balance) -> Result<Balance>;
    async fn put_account(&self, account: Account) -> Result<()>;
    async fn put_bank(&self, bank: Bank) -> Result<()>;
    async fn accounts(&self) -> Result<Vec<Account>>;
    async fn banks(&self) -> Result<Vec<Bank>>;
}

/// Record of payments seen by one simulated bank.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn get_by_reference(&self, reference: &str) -> Result<Option<Payment>>;
}

/// Source of "now" for message timestamps and value dates.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant, for reproducible documents.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type ClockBox = Box<dyn Clock>;
pub type LedgerStoreFactory = Box<dyn Fn() -> LedgerStoreBox + Send + Sync>;
