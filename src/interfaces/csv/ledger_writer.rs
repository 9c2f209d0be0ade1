use crate::domain::account::{Account, AccountStatus, Bank};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

const ACCOUNT_HEADER: [&str; 6] = [
    "bank_code",
    "account_number",
    "account_holder_name",
    "status",
    "currency",
    "balance",
];
const BANK_HEADER: [&str; 3] = ["bank_code", "bank_name", "liquidity_balance"];

#[derive(Serialize)]
struct AccountRow<'a> {
    bank_code: &'a str,
    account_number: &'a str,
    account_holder_name: &'a str,
    status: AccountStatus,
    currency: &'a str,
    balance: String,
}

#[derive(Serialize)]
struct BankRow<'a> {
    bank_code: &'a str,
    bank_name: &'a str,
    liquidity_balance: String,
}

/// Writes the ledger as CSV: the accounts table, then the banks table, each
/// with its own header row. Balances are printed at two decimal places.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_accounts(&mut self, accounts: &[Account]) -> Result<()> {
        self.writer.write_record(ACCOUNT_HEADER)?;
        for account in accounts {
            self.writer.serialize(AccountRow {
                bank_code: &account.bank_code,
                account_number: &account.account_number,
                account_holder_name: &account.account_holder_name,
                status: account.status,
                currency: account.currency.as_deref().unwrap_or_default(),
                balance: account.balance.to_iso_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_banks(&mut self, banks: &[Bank]) -> Result<()> {
        self.writer.write_record(BANK_HEADER)?;
        for bank in banks {
            self.writer.serialize(BankRow {
                bank_code: &bank.bank_code,
                bank_name: &bank.bank_name,
                liquidity_balance: bank.liquidity_balance.to_iso_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Accounts first, then banks.
    pub fn write_ledger(&mut self, accounts: &[Account], banks: &[Bank]) -> Result<()> {
        self.write_accounts(accounts)?;
        self.write_banks(banks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Balance;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_output() {
        let accounts = vec![
            Account::new("1001", "BANKA", "Aishath", Balance::new(dec!(4900))).with_currency("MVR"),
        ];
        let banks = vec![Bank::new("BANKA", "Bank A", Balance::new(dec!(-12.345)))];

        let mut buf = Vec::new();
        LedgerWriter::new(&mut buf)
            .write_ledger(&accounts, &banks)
            .unwrap();
        let output = String::from_utf8(buf).unwrap();

        let expected = "\
bank_code,account_number,account_holder_name,status,currency,balance
BANKA,1001,Aishath,ACTIVE,MVR,4900.00
bank_code,bank_name,liquidity_balance
BANKA,Bank A,-12.35
";
        assert_eq!(output, expected);
    }
}
