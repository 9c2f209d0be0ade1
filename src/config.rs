use serde::{Deserialize, Serialize};

/// Static identifiers and defaults shared by the codecs and the settlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulatorConfig {
    /// Bank A identifier in MT headers (12 characters, logical terminal form).
    pub mt_sender_bic: String,
    /// Bank B identifier in MT headers.
    pub mt_receiver_bic: String,
    /// Debtor agent BIC in pacs.008.
    pub iso_sender_bic: String,
    /// Creditor agent BIC in pacs.008.
    pub iso_receiver_bic: String,
    /// Currency used when a request or account carries none.
    pub default_currency: String,
    /// Appended to the currency code to form the synthetic nostro account.
    pub nostro_suffix: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            mt_sender_bic: "BKAALKLXADVP".to_string(),
            mt_receiver_bic: "BKBKDEFFMVP".to_string(),
            iso_sender_bic: "BKAALKLX".to_string(),
            iso_receiver_bic: "BKBKDEFF".to_string(),
            default_currency: "LKR".to_string(),
            nostro_suffix: "12345678".to_string(),
        }
    }
}

impl SimulatorConfig {
    pub fn nostro_account(&self, currency: &str) -> String {
        format!("{}{}", currency, self.nostro_suffix)
    }
}
