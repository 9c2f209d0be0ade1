//! camt.054.001.08 - Bank to Customer Debit Credit Notification
//! Root BkToCstmrDbtCdtNtfctn: GrpHdr, Ntfctn with a single credit Ntry.

use super::xml::{XmlWriter, extract_between, unescape};
use crate::config::SimulatorConfig;
use crate::domain::money::Amount;
use crate::domain::payment::Payment;
use crate::error::Result;
use chrono::{DateTime, Utc};

pub const MESSAGE_TYPE: &str = "camt.054.001.08";

#[derive(Debug, Clone, PartialEq)]
pub struct Camt054 {
    pub msg_id: String,
    pub created_at: DateTime<Utc>,
    pub notification_id: String,
    pub nostro_account: String,
    pub amount: Amount,
    pub currency: String,
    pub end_to_end_id: String,
    pub transaction_id: String,
    pub debtor_name: Option<String>,
    pub creditor_name: Option<String>,
}

impl Camt054 {
    pub fn for_payment(
        payment: &Payment,
        config: &SimulatorConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let (reference, amount, currency) = payment.renderable("camt.054")?;
        Ok(Self {
            msg_id: format!("NOTIF-{}", reference),
            created_at: now,
            notification_id: format!("N-{}", reference),
            nostro_account: config.nostro_account(currency),
            amount,
            currency: currency.to_string(),
            end_to_end_id: reference.to_string(),
            transaction_id: format!("TX-{}", reference),
            debtor_name: payment.debtor.name.clone(),
            creditor_name: payment.creditor.name.clone(),
        })
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut w = XmlWriter::document(MESSAGE_TYPE);
        w.open("BkToCstmrDbtCdtNtfctn");

        w.open("GrpHdr")
            .leaf("MsgId", &self.msg_id)
            .leaf(
                "CreDtTm",
                &self.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            )
            .close();

        w.open("Ntfctn").leaf("Id", &self.notification_id);
        w.open("Acct").open("Id").open("Othr");
        w.leaf("Id", &self.nostro_account).close().close().close();

        w.open("Ntry")
            .amount("Amt", &self.currency, &self.amount.to_iso_string())
            .leaf("CdtDbtInd", "CRDT");
        w.open("BookgDt")
            .leaf("Dt", &self.created_at.format("%Y-%m-%d").to_string())
            .close();
        w.open("NtryDtls").open("TxDtls");
        w.open("Refs")
            .leaf("EndToEndId", &self.end_to_end_id)
            .leaf("TxId", &self.transaction_id)
            .close();
        w.open("RltdPties");
        w.open("Dbtr")
            .leaf("Nm", self.debtor_name.as_deref().unwrap_or_default())
            .close();
        w.open("Cdtr")
            .leaf("Nm", self.creditor_name.as_deref().unwrap_or_default())
            .close();

        w.finish()
    }
}

/// First `EndToEndId` of a camt.054, used to find the payment it confirms.
pub fn parse_reference(xml: &str) -> Option<String> {
    extract_between(xml, "<EndToEndId>", "</EndToEndId>")
        .filter(|r| !r.is_empty())
        .map(unescape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::Party;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn payment() -> Payment {
        let mut p = Payment::new();
        p.reference = Some("REF20251209-AB12CD34".to_string());
        p.amount = Some(Amount::new(dec!(75.5)).unwrap());
        p.currency = Some("EUR".to_string());
        p.debtor = Party::new("Alice", "LK01", "Colombo");
        p.creditor = Party::new("Bob", "DE02", "Berlin");
        p
    }

    #[test]
    fn test_notification_layout() {
        let now = Utc.with_ymd_and_hms(2025, 12, 9, 11, 22, 33).unwrap();
        let xml = Camt054::for_payment(&payment(), &SimulatorConfig::default(), now)
            .unwrap()
            .to_xml()
            .unwrap();

        assert!(xml.contains("<MsgId>NOTIF-REF20251209-AB12CD34</MsgId>"));
        assert!(xml.contains("<CreDtTm>2025-12-09T11:22:33</CreDtTm>"));
        assert!(xml.contains("<Id>N-REF20251209-AB12CD34</Id>"));
        assert!(xml.contains("<Id>EUR12345678</Id>"));
        assert!(xml.contains("<Amt Ccy=\"EUR\">75.50</Amt>"));
        assert!(xml.contains("<CdtDbtInd>CRDT</CdtDbtInd>"));
        assert!(xml.contains("<Dt>2025-12-09</Dt>"));
        assert!(xml.contains("<TxId>TX-REF20251209-AB12CD34</TxId>"));
        assert!(xml.ends_with("</Document>\n"));
        assert_eq!(parse_reference(&xml).as_deref(), Some("REF20251209-AB12CD34"));
    }

    #[test]
    fn test_parse_reference_missing() {
        assert_eq!(parse_reference("<Document/>"), None);
        assert_eq!(parse_reference("<EndToEndId> </EndToEndId>"), None);
    }
}
