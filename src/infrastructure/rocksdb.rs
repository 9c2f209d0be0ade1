use crate::domain::account::{Account, AccountKey, Bank};
use crate::domain::money::Balance;
use crate::domain::ports::LedgerStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for account records, keyed `bank_code/account_number`.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for bank records, keyed by bank code.
pub const CF_BANKS: &str = "banks";

/// A persistent ledger implementation using RocksDB.
///
/// Reads go straight to the database. Read-modify-write adjustments are
/// serialized behind one writer lock so two deltas on the same record never
/// interleave.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBLedgerStore {
    db: Arc<DB>,
    writer: Arc<Mutex<()>>,
}

impl RocksDBLedgerStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("accounts" and "banks") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_accounts = ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default());
        let cf_banks = ColumnFamilyDescriptor::new(CF_BANKS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_accounts, cf_banks])?;

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(Mutex::new(())),
        })
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.db.cf_handle(cf_name).ok_or_else(|| {
            PaymentError::internal(format!("{} column family not found", cf_name))
        })?;

        match self.db.get_cf(&cf, key)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|e| {
                    PaymentError::internal(format!("Deserialization error: {}", e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.db.cf_handle(cf_name).ok_or_else(|| {
            PaymentError::internal(format!("{} column family not found", cf_name))
        })?;
        let bytes = serde_json::to_vec(value)
            .map_err(|e| PaymentError::internal(format!("Serialization error: {}", e)))?;
        self.db.put_cf(&cf, key, bytes)?;
        Ok(())
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.db.cf_handle(cf_name).ok_or_else(|| {
            PaymentError::internal(format!("{} column family not found", cf_name))
        })?;

        let mut records = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            let record = serde_json::from_slice(&value)
                .map_err(|e| PaymentError::internal(format!("Deserialization error: {}", e)))?;
            records.push(record);
        }
        Ok(records)
    }
}

fn account_key(key: &AccountKey) -> Vec<u8> {
    key.to_string().into_bytes()
}

#[async_trait]
impl LedgerStore for RocksDBLedgerStore {
    async fn account(&self, key: &AccountKey) -> Result<Option<Account>> {
        self.read(CF_ACCOUNTS, &account_key(key))
    }

    async fn bank(&self, bank_code: &str) -> Result<Option<Bank>> {
        self.read(CF_BANKS, bank_code.as_bytes())
    }

    async fn adjust_account_balance(&self, key: &AccountKey, delta: Balance) -> Result<Balance> {
        let _guard = self.writer.lock().await;
        let mut account: Account = self
            .read(CF_ACCOUNTS, &account_key(key))?
            .ok_or_else(|| PaymentError::NotFound(format!("Account {}", key)))?;
        let balance = account.apply(delta);
        self.write(CF_ACCOUNTS, &account_key(key), &account)?;
        Ok(balance)
    }

    async fn adjust_liquidity(&self, bank_code: &str, delta: Balance) -> Result<Balance> {
        let _guard = self.writer.lock().await;
        let mut bank: Bank = self
            .read(CF_BANKS, bank_code.as_bytes())?
            .ok_or_else(|| PaymentError::NotFound(format!("Bank {}", bank_code)))?;
        let balance = bank.apply(delta);
        self.write(CF_BANKS, bank_code.as_bytes(), &bank)?;
        Ok(balance)
    }

    async fn put_account(&self, account: Account) -> Result<()> {
        let _guard = self.writer.lock().await;
        self.write(CF_ACCOUNTS, &account_key(&account.key()), &account)
    }

    async fn put_bank(&self, bank: Bank) -> Result<()> {
        let _guard = self.writer.lock().await;
        self.write(CF_BANKS, bank.bank_code.as_bytes(), &bank)
    }

    async fn accounts(&self) -> Result<Vec<Account>> {
        self.scan(CF_ACCOUNTS)
    }

    async fn banks(&self) -> Result<Vec<Bank>> {
        self.scan(CF_BANKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBLedgerStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_ACCOUNTS).is_some());
        assert!(store.db.cf_handle(CF_BANKS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_ledger_round_trip() {
        let dir = tempdir().unwrap();
        let key = AccountKey::new("1001", "BANKA");
        {
            let store = RocksDBLedgerStore::open(dir.path()).unwrap();
            store
                .put_account(Account::new("1001", "BANKA", "Alice", Balance::new(dec!(100))))
                .await
                .unwrap();
            store
                .put_bank(Bank::new("BANKA", "Bank A", Balance::new(dec!(1000))))
                .await
                .unwrap();
            store
                .adjust_account_balance(&key, Balance::new(dec!(-40)))
                .await
                .unwrap();
        }

        let store = RocksDBLedgerStore::open(dir.path()).unwrap();
        let account = store.account(&key).await.unwrap().unwrap();
        assert_eq!(account.balance, Balance::new(dec!(60)));
        assert_eq!(store.banks().await.unwrap().len(), 1);
        assert!(store.account(&AccountKey::new("1001", "BANKB")).await.unwrap().is_none());
    }
}
