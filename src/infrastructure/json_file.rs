use crate::domain::account::{Account, AccountKey, Bank};
use crate::domain::money::Balance;
use crate::domain::ports::LedgerStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const ACCOUNTS_FILE: &str = "Accounts.json";
pub const BANKS_FILE: &str = "Banks.json";

#[derive(Default)]
struct Ledger {
    accounts: Vec<Account>,
    banks: Vec<Bank>,
}

/// Ledger persisted as `Accounts.json` and `Banks.json` in one directory.
///
/// The whole ledger is held in memory behind a single writer lock. Every
/// mutation rewrites the affected file through a temp file and rename, so a
/// crash never leaves a half-written file behind.
#[derive(Clone)]
pub struct JsonFileLedgerStore {
    dir: PathBuf,
    ledger: Arc<Mutex<Ledger>>,
}

impl JsonFileLedgerStore {
    /// Loads both files from `dir`, creating the directory and empty files as needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let accounts: Vec<Account> = load_or_create(&dir.join(ACCOUNTS_FILE))?;
        let banks: Vec<Bank> = load_or_create(&dir.join(BANKS_FILE))?;
        info!(
            dir = %dir.display(),
            accounts = accounts.len(),
            banks = banks.len(),
            "loaded ledger"
        );

        Ok(Self {
            dir,
            ledger: Arc::new(Mutex::new(Ledger { accounts, banks })),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn load_or_create<T: DeserializeOwned + Serialize>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        write_atomically(path, &Vec::<T>::new())?;
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn write_atomically<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| PaymentError::internal(format!("{} has no parent", path.display())))?;
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), records = records.len(), "persisted");
    Ok(())
}

#[async_trait]
impl LedgerStore for JsonFileLedgerStore {
    async fn account(&self, key: &AccountKey) -> Result<Option<Account>> {
        let ledger = self.ledger.lock().await;
        Ok(ledger
            .accounts
            .iter()
            .find(|a| a.account_number == key.account_number && a.bank_code == key.bank_code)
            .cloned())
    }

    async fn bank(&self, bank_code: &str) -> Result<Option<Bank>> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.banks.iter().find(|b| b.bank_code == bank_code).cloned())
    }

    async fn adjust_account_balance(&self, key: &AccountKey, delta: Balance) -> Result<Balance> {
        let mut ledger = self.ledger.lock().await;
        let account = ledger
            .accounts
            .iter_mut()
            .find(|a| a.account_number == key.account_number && a.bank_code == key.bank_code)
            .ok_or_else(|| PaymentError::NotFound(format!("Account {}", key)))?;
        let balance = account.apply(delta);
        write_atomically(&self.dir.join(ACCOUNTS_FILE), &ledger.accounts)?;
        Ok(balance)
    }

    async fn adjust_liquidity(&self, bank_code: &str, delta: Balance) -> Result<Balance> {
        let mut ledger = self.ledger.lock().await;
        let bank = ledger
            .banks
            .iter_mut()
            .find(|b| b.bank_code == bank_code)
            .ok_or_else(|| PaymentError::NotFound(format!("Bank {}", bank_code)))?;
        let balance = bank.apply(delta);
        write_atomically(&self.dir.join(BANKS_FILE), &ledger.banks)?;
        Ok(balance)
    }

    async fn put_account(&self, account: Account) -> Result<()> {
        let mut ledger = self.ledger.lock().await;
        match ledger
            .accounts
            .iter_mut()
            .find(|a| a.account_number == account.account_number && a.bank_code == account.bank_code)
        {
            Some(existing) => *existing = account,
            None => ledger.accounts.push(account),
        }
        write_atomically(&self.dir.join(ACCOUNTS_FILE), &ledger.accounts)
    }

    async fn put_bank(&self, bank: Bank) -> Result<()> {
        let mut ledger = self.ledger.lock().await;
        match ledger.banks.iter_mut().find(|b| b.bank_code == bank.bank_code) {
            Some(existing) => *existing = bank,
            None => ledger.banks.push(bank),
        }
        write_atomically(&self.dir.join(BANKS_FILE), &ledger.banks)
    }

    async fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.ledger.lock().await.accounts.clone())
    }

    async fn banks(&self) -> Result<Vec<Bank>> {
        Ok(self.ledger.lock().await.banks.clone())
    }
}
