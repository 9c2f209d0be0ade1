//! pacs.008.001.08 - FI to FI Customer Credit Transfer
//! Root FIToFICstmrCdtTrf: GrpHdr, then one CdtTrfTxInf.

use super::xml::{XmlWriter, extract_between, strip_tags, unescape};
use crate::config::SimulatorConfig;
use crate::domain::money::Amount;
use crate::domain::payment::{Party, Payment};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};

pub const MESSAGE_TYPE: &str = "pacs.008.001.08";

/// One credit transfer as it goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacs008 {
    pub msg_id: String,
    pub created_at: DateTime<Utc>,
    pub instruction_id: String,
    pub end_to_end_id: String,
    pub transaction_id: String,
    pub amount: Amount,
    pub currency: String,
    pub debtor: Party,
    pub debtor_agent_bic: String,
    pub creditor: Party,
    pub creditor_agent_bic: String,
    pub remittance_info: Option<String>,
}

impl Pacs008 {
    pub fn for_payment(
        payment: &Payment,
        config: &SimulatorConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let (reference, amount, currency) = payment.renderable("pacs.008")?;
        Ok(Self {
            msg_id: reference.to_string(),
            created_at: now,
            instruction_id: format!("INST-{}", reference),
            end_to_end_id: reference.to_string(),
            transaction_id: format!("TX-{}", reference),
            amount,
            currency: currency.to_string(),
            debtor: payment.debtor.clone(),
            debtor_agent_bic: config.iso_sender_bic.clone(),
            creditor: payment.creditor.clone(),
            creditor_agent_bic: config.iso_receiver_bic.clone(),
            remittance_info: payment.remittance_info.clone(),
        })
    }

    pub fn to_xml(&self) -> Result<String> {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let mut w = XmlWriter::document(MESSAGE_TYPE);

        w.open("FIToFICstmrCdtTrf");
        w.open("GrpHdr")
            .leaf("MsgId", &self.msg_id)
            .leaf(
                "CreDtTm",
                &self.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            )
            .leaf("NbOfTxs", "1");
        w.open("SttlmInf").leaf("SttlmMtd", "CLRG").close();
        w.close();

        w.open("CdtTrfTxInf");
        w.open("PmtId")
            .leaf("InstrId", &self.instruction_id)
            .leaf("EndToEndId", &self.end_to_end_id)
            .leaf("TxId", &self.transaction_id)
            .close();
        w.amount("IntrBkSttlmAmt", &self.currency, &self.amount.to_iso_string())
            .leaf(
                "IntrBkSttlmDt",
                &self.created_at.format("%Y-%m-%d").to_string(),
            )
            .leaf("ChrgBr", "SHAR");

        w.open("Dbtr").leaf("Nm", &text(&self.debtor.name));
        w.open("PstlAdr")
            .leaf("AdrLine", &text(&self.debtor.address))
            .close();
        w.close();
        w.open("DbtrAcct").open("Id").open("Othr");
        w.leaf("Id", &text(&self.debtor.account));
        w.close().close().close();

        w.open("DbtrAgt").open("FinInstnId");
        w.leaf("BICFI", &self.debtor_agent_bic).close().close();
        w.open("CdtrAgt").open("FinInstnId");
        w.leaf("BICFI", &self.creditor_agent_bic).close().close();

        w.open("Cdtr").leaf("Nm", &text(&self.creditor.name));
        w.open("PstlAdr")
            .leaf("AdrLine", &text(&self.creditor.address))
            .close();
        w.close();
        w.open("CdtrAcct").open("Id");
        w.leaf("IBAN", &text(&self.creditor.account)).close().close();

        w.open("RmtInf")
            .leaf("Ustrd", &text(&self.remittance_info))
            .close();

        w.finish()
    }
}

fn field(block: &str, start: &str, end: &str) -> Option<String> {
    extract_between(block, start, end).map(unescape)
}

/// Reads a pacs.008 by first-match substring search.
///
/// `Dbtr`/`Cdtr` blocks are sliced out before `Nm`/`AdrLine` are looked up
/// inside them. The debtor account is the first `<Id>` slice of `DbtrAcct`
/// with any leftover tags stripped; the creditor account is its `IBAN`.
/// The returned payment is `Sent` when an `EndToEndId` was found.
pub fn parse(xml: &str) -> Result<Payment> {
    if xml.trim().is_empty() {
        return Err(PaymentError::ValidationError(
            "pacs.008 XML cannot be null or empty".to_string(),
        ));
    }

    let mut payment = Payment::new();
    payment.reference = field(xml, "<EndToEndId>", "</EndToEndId>");

    if let Some(tag_start) = xml.find("<IntrBkSttlmAmt") {
        let tail = &xml[tag_start..];
        if let Some(ccy_start) = tail.find("Ccy=\"").map(|i| i + 5) {
            if let Some(ccy_len) = tail[ccy_start..].find('"').filter(|len| *len > 0) {
                payment.currency = Some(unescape(&tail[ccy_start..ccy_start + ccy_len]));
            }
        }
        if let Some(open_end) = tail.find('>') {
            if let Some(close) = tail[open_end..].find("</IntrBkSttlmAmt>") {
                let body = &tail[open_end + 1..open_end + close];
                payment.amount = Some(Amount::parse_iso(body)?);
            }
        }
    }

    if let Some(block) = extract_between(xml, "<Dbtr>", "</Dbtr>") {
        payment.debtor.name = field(block, "<Nm>", "</Nm>");
        payment.debtor.address = field(block, "<AdrLine>", "</AdrLine>");
    }
    if let Some(block) = extract_between(xml, "<DbtrAcct>", "</DbtrAcct>") {
        if let Some(id) = extract_between(block, "<Id>", "</Id>") {
            let inner = extract_between(id, "<Id>", "</Id>").unwrap_or(id);
            payment.debtor.account = Some(unescape(&strip_tags(inner)));
        }
    }

    if let Some(block) = extract_between(xml, "<Cdtr>", "</Cdtr>") {
        payment.creditor.name = field(block, "<Nm>", "</Nm>");
        payment.creditor.address = field(block, "<AdrLine>", "</AdrLine>");
    }
    if let Some(block) = extract_between(xml, "<CdtrAcct>", "</CdtrAcct>") {
        payment.creditor.account = field(block, "<IBAN>", "</IBAN>");
    }

    payment.remittance_info = field(xml, "<Ustrd>", "</Ustrd>");

    if payment.reference.is_some() {
        payment.mark_sent(xml.to_string())?;
    } else {
        payment.raw_outbound_message = Some(xml.to_string());
    }
    Ok(payment)
}
