use super::money::Balance;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Closed,
}

/// Compound natural key of an account: the number is only unique within its bank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountKey {
    pub account_number: String,
    pub bank_code: String,
}

impl AccountKey {
    pub fn new(account_number: impl Into<String>, bank_code: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            bank_code: bank_code.into(),
        }
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bank_code, self.account_number)
    }
}

/// A customer account held at one of the simulated banks.
///
/// The field names follow the persisted `Accounts.json` layout (camelCase).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_number: String,
    /// Code of the servicing bank; doubles as its BIC.
    pub bank_code: String,
    pub account_holder_name: String,
    /// `NIC` or `PASSPORT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_identification_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_identification_number: Option<String>,
    pub balance: Balance,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl Account {
    pub fn new(
        account_number: impl Into<String>,
        bank_code: impl Into<String>,
        account_holder_name: impl Into<String>,
        balance: Balance,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            bank_code: bank_code.into(),
            account_holder_name: account_holder_name.into(),
            holder_identification_type: None,
            holder_identification_number: None,
            balance,
            status: AccountStatus::Active,
            currency: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn key(&self) -> AccountKey {
        AccountKey::new(self.account_number.clone(), self.bank_code.clone())
    }

    /// Applies a signed delta. Balances are only ever moved relatively.
    pub fn apply(&mut self, delta: Balance) -> Balance {
        self.balance += delta;
        self.balance
    }
}

/// A participant bank and its settlement position with the clearing system.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    pub bank_code: String,
    pub bank_name: String,
    pub liquidity_balance: Balance,
}

impl Bank {
    pub fn new(
        bank_code: impl Into<String>,
        bank_name: impl Into<String>,
        liquidity_balance: Balance,
    ) -> Self {
        Self {
            bank_code: bank_code.into(),
            bank_name: bank_name.into(),
            liquidity_balance,
        }
    }

    pub fn apply(&mut self, delta: Balance) -> Balance {
        self.liquidity_balance += delta;
        self.liquidity_balance
    }
}

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Debit,
    Credit,
}

impl Movement {
    /// Signed delta for an unsigned amount.
    pub fn delta(self, amount: impl Into<Balance>) -> Balance {
        let amount = amount.into();
        match self {
            Movement::Credit => amount,
            Movement::Debit => -amount,
        }
    }
}
