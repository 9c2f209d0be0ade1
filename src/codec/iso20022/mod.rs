//! ISO 20022 documents exchanged by the simulated banks and the clearing engine.
//!
//! Each message type is a typed record rendered through [`xml::XmlWriter`].
//! Parsing is substring based and only reads the fields the simulation needs.

pub mod camt004;
pub mod camt054;
pub mod pacs002;
pub mod pacs008;
pub mod xml;

pub use camt004::{AccountReport, Camt004Response, ClosingBalance, ReportOrError};
pub use camt054::Camt054;
pub use pacs002::{OriginalTxRef, Pacs002Report, TransactionStatus};
pub use pacs008::Pacs008;

use crate::config::SimulatorConfig;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::error::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Renders and parses the payment-carrying ISO documents (pacs.008, camt.054).
#[derive(Debug, Clone)]
pub struct IsoCodec {
    config: SimulatorConfig,
}

impl IsoCodec {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Builds the pacs.008 for `payment` and marks it sent.
    pub fn render_pacs008(&self, payment: &mut Payment, now: DateTime<Utc>) -> Result<String> {
        payment.ensure_transition(PaymentStatus::Sent)?;
        let document = Pacs008::for_payment(payment, &self.config, now)?.to_xml()?;
        payment.mark_sent(document.clone())?;
        debug!(reference = ?payment.reference, "rendered pacs.008");
        Ok(document)
    }

    pub fn parse_pacs008(&self, xml: &str) -> Result<Payment> {
        pacs008::parse(xml)
    }

    /// Builds the camt.054 credit notification for `payment` and marks it credited.
    pub fn render_camt054(&self, payment: &mut Payment, now: DateTime<Utc>) -> Result<String> {
        payment.ensure_transition(PaymentStatus::Credited)?;
        let document = Camt054::for_payment(payment, &self.config, now)?.to_xml()?;
        payment.mark_credited(document.clone())?;
        debug!(reference = ?payment.reference, "rendered camt.054");
        Ok(document)
    }

    pub fn parse_camt054_reference(&self, xml: &str) -> Option<String> {
        camt054::parse_reference(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Amount;
    use crate::domain::payment::Party;
    use crate::error::PaymentError;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 9, 10, 0, 0).unwrap()
    }

    fn payment() -> Payment {
        let mut p = Payment::new();
        p.reference = Some("REF-ISO-1".to_string());
        p.amount = Some(Amount::new(dec!(1000)).unwrap());
        p.currency = Some("EUR".to_string());
        p.debtor = Party::new("Alice", "LK01", "Colombo");
        p.creditor = Party::new("Bob", "DE02", "Berlin");
        p
    }

    #[test]
    fn test_render_pacs008_marks_sent() {
        let codec = IsoCodec::new(&SimulatorConfig::default());
        let mut p = payment();
        let xml = codec.render_pacs008(&mut p, now()).unwrap();
        assert_eq!(p.status(), PaymentStatus::Sent);
        assert_eq!(p.raw_outbound_message.as_deref(), Some(xml.as_str()));
    }

    #[test]
    fn test_render_without_reference_leaves_new() {
        let codec = IsoCodec::new(&SimulatorConfig::default());
        let mut p = payment();
        p.reference = None;
        assert!(codec.render_pacs008(&mut p, now()).is_err());
        assert_eq!(p.status(), PaymentStatus::New);
        assert!(p.raw_outbound_message.is_none());
    }

    #[test]
    fn test_camt054_confirms_parsed_pacs008() {
        let codec = IsoCodec::new(&SimulatorConfig::default());
        let mut sent = payment();
        let pacs008 = codec.render_pacs008(&mut sent, now()).unwrap();

        let mut received = codec.parse_pacs008(&pacs008).unwrap();
        let camt054 = codec.render_camt054(&mut received, now()).unwrap();

        assert_eq!(received.status(), PaymentStatus::Credited);
        assert_eq!(received.raw_inbound_confirmation.as_deref(), Some(camt054.as_str()));
        assert_eq!(
            codec.parse_camt054_reference(&camt054).as_deref(),
            Some("REF-ISO-1")
        );
    }

    #[test]
    fn test_render_camt054_preconditions() {
        let codec = IsoCodec::new(&SimulatorConfig::default());
        let cases: [fn(&mut Payment); 3] = [
            |p| p.reference = None,
            |p| p.amount = None,
            |p| p.currency = None,
        ];
        for clear in cases {
            let mut p = payment();
            codec.render_pacs008(&mut p, now()).unwrap();
            clear(&mut p);

            let result = codec.render_camt054(&mut p, now());
            assert!(matches!(result, Err(PaymentError::ValidationError(_))));
            assert_eq!(p.status(), PaymentStatus::Sent);
            assert!(p.raw_inbound_confirmation.is_none());
        }
    }

    #[test]
    fn test_nothing_leaves_credited() {
        let codec = IsoCodec::new(&SimulatorConfig::default());
        let mut p = payment();
        codec.render_camt054(&mut p, now()).unwrap();
        assert!(codec.render_pacs008(&mut p, now()).is_err());
        assert_eq!(p.status(), PaymentStatus::Credited);
    }
}
