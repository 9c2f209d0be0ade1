//! Request and response shapes exchanged with callers. Field names follow
//! the camelCase JSON layout clients send.

use crate::domain::money::Amount;
use crate::domain::payment::{Payment, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// pacs.008-style credit transfer between two participant banks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransferRequest {
    /// Debtor agent.
    pub initiator_bic: String,
    pub initiator_account_number: String,
    /// Creditor agent.
    pub recipient_bic: String,
    pub recipient_account_number: String,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub end_to_end_id: Option<String>,
}

/// camt.003-style account lookup, used for verification and balance inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountVerificationRequest {
    pub requesting_bank_bic: String,
    /// Bank holding the account.
    pub target_bank_bic: String,
    pub account_number: String,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTransferRequest {
    pub initiator: String,
    pub initiator_account_number: String,
    pub recipient: String,
    pub recipient_account_number: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyVerificationRequest {
    #[serde(default)]
    pub message_id: Option<String>,
    pub initiator: String,
    pub sender: String,
    pub receiver: String,
    pub account_number: String,
}

/// Customer payment entered at bank A.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub debtor_name: Option<String>,
    pub debtor_account: Option<String>,
    pub debtor_address: Option<String>,
    pub creditor_name: Option<String>,
    pub creditor_account: Option<String>,
    pub creditor_address: Option<String>,
    pub remittance_info: Option<String>,
}

/// HTTP-equivalent outcome attached to every engine response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Ok,
    BadRequest,
    NotFound,
    InternalError,
}

impl ResponseStatus {
    pub fn http_code(&self) -> u16 {
        match self {
            ResponseStatus::Ok => 200,
            ResponseStatus::BadRequest => 400,
            ResponseStatus::NotFound => 404,
            ResponseStatus::InternalError => 500,
        }
    }
}

/// An ISO 20022 document plus the status a transport would answer with.
#[derive(Debug, Clone, PartialEq)]
pub struct IsoResponse {
    pub status: ResponseStatus,
    pub document: String,
}

impl IsoResponse {
    pub fn new(status: ResponseStatus, document: String) -> Self {
        Self { status, document }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountVerificationData {
    pub account_number: String,
    pub bank_name: String,
    pub bank_code: String,
    pub account_holder_name: String,
}

/// JSON envelope of the legacy endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultResponse {
    /// HTTP-style code reported inside the body.
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AccountVerificationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub message_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_status: Option<String>,
}

impl DefaultResponse {
    pub fn new(status: ResponseStatus, message: impl Into<String>, message_type: &str) -> Self {
        Self {
            status: status.http_code(),
            message: message.into(),
            data: None,
            message_id: None,
            message_type: message_type.to_string(),
            message_status: None,
        }
    }

    pub fn with_message_status(mut self, message_status: &str) -> Self {
        self.message_status = Some(message_status.to_string());
        self
    }

    pub fn with_message_id(mut self, message_id: Option<String>) -> Self {
        self.message_id = message_id;
        self
    }

    pub fn with_data(mut self, data: AccountVerificationData) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPayment {
    pub payment_id: Uuid,
    pub reference: String,
    pub status: PaymentStatus,
    /// The MT103 or pacs.008 that was sent.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusView {
    pub payment_id: Uuid,
    pub reference: Option<String>,
    pub status: PaymentStatus,
    pub amount: Option<Amount>,
    pub currency: Option<String>,
}

impl From<&Payment> for PaymentStatusView {
    fn from(payment: &Payment) -> Self {
        Self {
            payment_id: payment.id(),
            reference: payment.reference.clone(),
            status: payment.status(),
            amount: payment.amount,
            currency: payment.currency.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_credit_transfer_request_defaults() {
        let req: CreditTransferRequest = serde_json::from_str(
            r#"{"initiatorBic":"BANKA","initiatorAccountNumber":"1001",
                "recipientBic":"BANKB","recipientAccountNumber":"2002","amount":100.50}"#,
        )
        .unwrap();
        assert_eq!(req.amount, dec!(100.50));
        assert!(req.currency.is_none());
        assert!(req.end_to_end_id.is_none());
    }

    #[test]
    fn test_default_response_layout() {
        let resp = DefaultResponse::new(ResponseStatus::NotFound, "Account not found", "camt.004")
            .with_message_status("RJCT");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["messageType"], "camt.004");
        assert_eq!(json["messageStatus"], "RJCT");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_status_view_from_payment() {
        let mut payment = Payment::new();
        payment.reference = Some("REF-1".to_string());
        let view = PaymentStatusView::from(&payment);
        assert_eq!(view.payment_id, payment.id());
        assert_eq!(view.status, PaymentStatus::New);
    }
}
