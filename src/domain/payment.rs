use super::money::Amount;
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle of a payment, shared by the MT and ISO 20022 flows.
///
/// `New -> Sent -> Credited`. Transitions only move forward; `Credited` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    #[default]
    New,
    Sent,
    Credited,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::New => "NEW",
            PaymentStatus::Sent => "SENT",
            PaymentStatus::Credited => "CREDITED",
        }
    }

    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        next >= self
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debtor or creditor details carried on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: Option<String>,
    pub account: Option<String>,
    pub address: Option<String>,
}

impl Party {
    pub fn new(
        name: impl Into<String>,
        account: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            account: Some(account.into()),
            address: Some(address.into()),
        }
    }
}

/// One simulated transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    id: Uuid,
    /// End-to-end identifier correlating the payment across both wire formats.
    pub reference: Option<String>,
    pub amount: Option<Amount>,
    pub currency: Option<String>,
    pub debtor: Party,
    pub creditor: Party,
    pub remittance_info: Option<String>,
    status: PaymentStatus,
    /// Transfer message (MT103 or pacs.008) last rendered or received.
    pub raw_outbound_message: Option<String>,
    /// Confirmation (MT910 or camt.054) last rendered or received.
    pub raw_inbound_confirmation: Option<String>,
}

impl Default for Payment {
    fn default() -> Self {
        Self::new()
    }
}

impl Payment {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            reference: None,
            amount: None,
            currency: None,
            debtor: Party::default(),
            creditor: Party::default(),
            remittance_info: None,
            status: PaymentStatus::New,
            raw_outbound_message: None,
            raw_inbound_confirmation: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Fails with `ValidationError` when the payment cannot be rendered yet.
    ///
    /// Returns the reference, amount and currency so renderers never have to
    /// unwrap them again.
    pub fn renderable(&self, message_type: &str) -> Result<(&str, Amount, &str)> {
        let reference = self
            .reference
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                PaymentError::ValidationError(format!(
                    "Payment reference must be set before building {}",
                    message_type
                ))
            })?;
        match (self.amount, self.currency.as_deref()) {
            (Some(amount), Some(currency)) => Ok((reference, amount, currency)),
            _ => Err(PaymentError::ValidationError(format!(
                "Currency and amount must be set before building {}",
                message_type
            ))),
        }
    }

    /// Moves the payment forward in its lifecycle.
    pub fn transition(&mut self, next: PaymentStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(PaymentError::ValidationError(format!(
                "Illegal payment status transition {} -> {}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    pub fn ensure_transition(&self, next: PaymentStatus) -> Result<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(PaymentError::ValidationError(format!(
                "Illegal payment status transition {} -> {}",
                self.status, next
            )))
        }
    }

    /// Records a rendered or received transfer message and marks the payment sent.
    pub fn mark_sent(&mut self, raw: String) -> Result<()> {
        self.transition(PaymentStatus::Sent)?;
        self.raw_outbound_message = Some(raw);
        Ok(())
    }

    /// Records a rendered or received confirmation and marks the payment credited.
    pub fn mark_credited(&mut self, raw: String) -> Result<()> {
        self.transition(PaymentStatus::Credited)?;
        self.raw_inbound_confirmation = Some(raw);
        Ok(())
    }
}
