//! SWIFT-style MT text messages: MT103 customer credit transfer and MT910
//! confirmation of credit.
//!
//! Messages use the block grammar
//! `{1:…}{2:…}{3:{108:ref}}{4: fields -}{5:{CHK:…}}`, one block per line and
//! one field per line inside block 4. Amounts carry a comma decimal separator.

use crate::config::SimulatorConfig;
use crate::domain::money::Amount;
use crate::domain::payment::{Party, Payment, PaymentStatus};
use crate::error::{PaymentError, Result};
use chrono::NaiveDate;
use std::fmt;
use tracing::debug;

const MT103_CHECKSUM: &str = "AB12CD34EF56";
const MT910_CHECKSUM: &str = "ZX98YU76TR54";

/// Writes blocks 1 to 3 and opens block 4.
fn write_header(
    f: &mut fmt::Formatter<'_>,
    message_type: &str,
    sender: &str,
    receiver: &str,
    reference: &str,
) -> fmt::Result {
    writeln!(f, "{{1:F01{}0000000000}}", sender)?;
    writeln!(f, "{{2:I{}{}N}}", message_type, receiver)?;
    writeln!(f, "{{3:{{108:{}}}}}", reference)?;
    writeln!(f, "{{4:")
}

/// Closes block 4 and writes the trailer.
fn write_trailer(f: &mut fmt::Formatter<'_>, checksum: &str) -> fmt::Result {
    writeln!(f, "-}}")?;
    writeln!(f, "{{5:{{CHK:{}}}}}", checksum)
}

fn write_party(f: &mut fmt::Formatter<'_>, tag: &str, party: &Party) -> fmt::Result {
    writeln!(f, "{}/{}", tag, party.account.as_deref().unwrap_or_default())?;
    writeln!(f, "{}", party.name.as_deref().unwrap_or_default())?;
    writeln!(f, "{}", party.address.as_deref().unwrap_or_default())
}

/// Customer credit transfer, ready to be written.
#[derive(Debug, Clone)]
pub struct Mt103 {
    pub sender_bic: String,
    pub receiver_bic: String,
    pub reference: String,
    pub value_date: NaiveDate,
    pub currency: String,
    pub amount: Amount,
    pub debtor: Party,
    pub creditor: Party,
    pub remittance_info: Option<String>,
}

impl fmt::Display for Mt103 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.amount.to_mt_string();
        write_header(f, "103", &self.sender_bic, &self.receiver_bic, &self.reference)?;
        writeln!(f, ":20:{}", self.reference)?;
        writeln!(f, ":23B:CRED")?;
        writeln!(
            f,
            ":32A:{}{}{}",
            self.value_date.format("%y%m%d"),
            self.currency,
            amount
        )?;
        writeln!(f, ":33B:{}{}", self.currency, amount)?;
        write_party(f, ":50K:", &self.debtor)?;
        write_party(f, ":59:", &self.creditor)?;
        writeln!(f, ":70:{}", self.remittance_info.as_deref().unwrap_or_default())?;
        writeln!(f, ":71A:SHA")?;
        write_trailer(f, MT103_CHECKSUM)
    }
}

/// Confirmation of credit sent back by the creditor bank.
#[derive(Debug, Clone)]
pub struct Mt910 {
    pub sender_bic: String,
    pub receiver_bic: String,
    pub reference: String,
    pub nostro_account: String,
    pub value_date: NaiveDate,
    pub currency: String,
    pub amount: Amount,
    pub ordering_institution: String,
    pub creditor_account: Option<String>,
}

impl fmt::Display for Mt910 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_header(f, "910", &self.sender_bic, &self.receiver_bic, &self.reference)?;
        writeln!(f, ":20:{}", self.reference)?;
        writeln!(f, ":21:{}", self.reference)?;
        writeln!(f, ":25:{}", self.nostro_account)?;
        writeln!(
            f,
            ":32A:{}{}{}",
            self.value_date.format("%y%m%d"),
            self.currency,
            self.amount.to_mt_string()
        )?;
        writeln!(f, ":52A:{}", self.ordering_institution)?;
        writeln!(
            f,
            ":72:/ACC/{} CREDITED",
            self.creditor_account.as_deref().unwrap_or_default()
        )?;
        write_trailer(f, MT910_CHECKSUM)
    }
}

/// Renders and parses MT messages between the two simulated banks.
#[derive(Debug, Clone)]
pub struct MtCodec {
    config: SimulatorConfig,
}

impl MtCodec {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Builds the MT103 for `payment`, stores it as the outbound message and
    /// marks the payment sent.
    pub fn render_mt103(&self, payment: &mut Payment, value_date: NaiveDate) -> Result<String> {
        let (reference, amount, currency) = payment.renderable("MT103")?;
        payment.ensure_transition(PaymentStatus::Sent)?;

        let message = Mt103 {
            sender_bic: self.config.mt_sender_bic.clone(),
            receiver_bic: self.config.mt_receiver_bic.clone(),
            reference: reference.to_string(),
            value_date,
            currency: currency.to_string(),
            amount,
            debtor: payment.debtor.clone(),
            creditor: payment.creditor.clone(),
            remittance_info: payment.remittance_info.clone(),
        }
        .to_string();

        payment.mark_sent(message.clone())?;
        debug!(reference = %reference_of(payment), "rendered MT103");
        Ok(message)
    }

    /// Builds the MT910 confirming `payment` and marks it credited.
    ///
    /// Block 1 carries the creditor bank, block 2 addresses the debtor bank.
    pub fn render_mt910(&self, payment: &mut Payment, value_date: NaiveDate) -> Result<String> {
        let (reference, amount, currency) = payment.renderable("MT910")?;
        payment.ensure_transition(PaymentStatus::Credited)?;

        let message = Mt910 {
            sender_bic: self.config.mt_receiver_bic.clone(),
            receiver_bic: self.config.mt_sender_bic.clone(),
            reference: reference.to_string(),
            nostro_account: self.config.nostro_account(currency),
            value_date,
            currency: currency.to_string(),
            amount,
            ordering_institution: self.config.mt_sender_bic.clone(),
            creditor_account: payment.creditor.account.clone(),
        }
        .to_string();

        payment.mark_credited(message.clone())?;
        debug!(reference = %reference_of(payment), "rendered MT910");
        Ok(message)
    }

    /// Reads an MT103 back into a payment.
    ///
    /// Only `:20:`, `:32A:`, `:50K:`, `:59:` and `:70:` are read; every other
    /// tag is skipped.
    pub fn parse_mt103(&self, raw: &str) -> Result<Payment> {
        if raw.trim().is_empty() {
            return Err(PaymentError::ValidationError(
                "Raw MT103 message cannot be null or empty".to_string(),
            ));
        }

        let mut payment = Payment::new();
        let lines: Vec<&str> = raw.lines().collect();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i].trim();

            if let Some(value) = line.strip_prefix(":20:") {
                payment.reference = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix(":32A:") {
                if let Some((currency, amount)) = parse_value_date_field(value.trim())? {
                    payment.currency = Some(currency);
                    payment.amount = Some(amount);
                }
            } else if let Some(value) = line.strip_prefix(":50K:") {
                payment.debtor = read_party(value, &lines, &mut i);
            } else if let Some(value) = line.strip_prefix(":59:") {
                payment.creditor = read_party(value, &lines, &mut i);
            } else if let Some(value) = line.strip_prefix(":70:") {
                payment.remittance_info = Some(value.trim().to_string());
            }

            i += 1;
        }

        if payment.reference.is_some() {
            payment.mark_sent(raw.to_string())?;
        } else {
            payment.raw_outbound_message = Some(raw.to_string());
        }
        Ok(payment)
    }
}

fn reference_of(payment: &Payment) -> &str {
    payment.reference.as_deref().unwrap_or_default()
}

/// Splits `YYMMDD` + currency + amount. The date is not kept.
///
/// Fields shorter than date plus currency are ignored.
fn parse_value_date_field(data: &str) -> Result<Option<(String, Amount)>> {
    if data.len() < 9 {
        return Ok(None);
    }
    let (currency, amount) = data
        .get(6..9)
        .zip(data.get(9..))
        .ok_or_else(|| PaymentError::ValidationError(format!("Malformed :32A: field '{}'", data)))?;
    Ok(Some((currency.to_string(), Amount::parse_mt(amount)?)))
}

/// Reads `/account`, then a name line, then an optional address line.
///
/// The name line is taken unconditionally; the address only if it does not
/// start a new tag. `i` is left on the last consumed line.
fn read_party(account_field: &str, lines: &[&str], i: &mut usize) -> Party {
    let account = account_field.trim();
    let account = account.strip_prefix('/').unwrap_or(account);

    let mut party = Party {
        account: Some(account.to_string()),
        ..Party::default()
    };

    if *i + 1 < lines.len() {
        *i += 1;
        party.name = Some(lines[*i].trim().to_string());
    }
    if *i + 1 < lines.len() && !lines[*i + 1].trim().starts_with(':') {
        *i += 1;
        party.address = Some(lines[*i].trim().to_string());
    }
    party
}

/// Reference of an MT910: `:20:`, falling back to `:21:`.
pub fn parse_mt910_reference(raw: &str) -> Option<String> {
    let field = |tag: &str| {
        raw.lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix(tag))
            .map(|value| value.trim().to_string())
    };
    field(":20:").or_else(|| field(":21:"))
}
