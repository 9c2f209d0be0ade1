#![allow(dead_code)]

use ips_sim::application::SettlementEngine;
use ips_sim::application::dto::CreditTransferRequest;
use ips_sim::config::SimulatorConfig;
use ips_sim::domain::account::{Account, Bank};
use ips_sim::domain::money::Balance;
use ips_sim::infrastructure::in_memory::InMemoryLedgerStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs;
use std::io::Error;
use std::path::Path;

pub const BANK_A: &str = "BANKAMV0";
pub const BANK_B: &str = "BANKBMV0";
pub const PAYER: &str = "7700001001";
pub const PAYEE: &str = "7700002002";

/// Payer with 5000 MVR at bank A, payee with 200 MVR at bank B, both banks
/// holding 1,000,000 of liquidity.
pub fn maldives_accounts() -> Vec<Account> {
    vec![
        Account::new(PAYER, BANK_A, "Aishath Nazim", Balance::new(dec!(5000))).with_currency("MVR"),
        Account::new(PAYEE, BANK_B, "Mohamed Rasheed", Balance::new(dec!(200))).with_currency("MVR"),
    ]
}

pub fn maldives_banks() -> Vec<Bank> {
    vec![
        Bank::new(BANK_A, "Bank A", Balance::new(dec!(1000000))),
        Bank::new(BANK_B, "Bank B", Balance::new(dec!(1000000))),
    ]
}

pub fn seeded_store() -> InMemoryLedgerStore {
    InMemoryLedgerStore::seeded(maldives_accounts(), maldives_banks())
}

pub fn engine(store: &InMemoryLedgerStore) -> SettlementEngine {
    SettlementEngine::new(Box::new(store.clone()), SimulatorConfig::default())
}

pub fn transfer(amount: Decimal) -> CreditTransferRequest {
    CreditTransferRequest {
        initiator_bic: BANK_A.to_string(),
        initiator_account_number: PAYER.to_string(),
        recipient_bic: BANK_B.to_string(),
        recipient_account_number: PAYEE.to_string(),
        amount,
        currency: Some("MVR".to_string()),
        end_to_end_id: Some("E2E-TEST-1".to_string()),
    }
}

/// Writes `Accounts.json` and `Banks.json` for the binary to load.
pub fn write_data_dir(dir: &Path) -> Result<(), Error> {
    fs::write(
        dir.join("Accounts.json"),
        serde_json::to_string_pretty(&maldives_accounts())?,
    )?;
    fs::write(
        dir.join("Banks.json"),
        serde_json::to_string_pretty(&maldives_banks())?,
    )?;
    Ok(())
}
