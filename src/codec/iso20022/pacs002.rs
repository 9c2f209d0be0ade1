//! pacs.002.001.12 - FI to FI Payment Status Report
//! Root FIToFIPmtStsRpt: GrpHdr, OrgnlGrpInfAndSts, OrgnlPmtInfAndSts.

use super::pacs008;
use super::xml::XmlWriter;
use crate::domain::money::at_wire_scale;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MESSAGE_TYPE: &str = "pacs.002.001.12";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Accepted, settlement completed.
    Acsc,
    Rjct,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Acsc => "ACSC",
            TransactionStatus::Rjct => "RJCT",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Echo of the original transfer carried in `OrgnlTxRef`.
///
/// The amount is echoed as received, so a rejected negative amount shows up
/// here unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalTxRef {
    pub amount: Decimal,
    pub currency: String,
    pub debtor_account: Option<String>,
    pub creditor_account: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pacs002Report {
    pub msg_id: String,
    pub created_at: DateTime<Utc>,
    pub original_msg_id: String,
    pub end_to_end_id: String,
    pub debtor_agent_bic: String,
    pub creditor_agent_bic: String,
    pub status: TransactionStatus,
    pub reason_code: Option<String>,
    pub additional_info: Option<String>,
    pub original_tx: Option<OriginalTxRef>,
}

impl Pacs002Report {
    /// Pure: the same report always renders to the same bytes.
    pub fn to_xml(&self) -> Result<String> {
        let mut w = XmlWriter::document(MESSAGE_TYPE);
        w.open("FIToFIPmtStsRpt");

        w.open("GrpHdr")
            .leaf("MsgId", &self.msg_id)
            .leaf(
                "CreDtTm",
                &self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        // Instructing agent is the creditor side answering the debtor agent.
        w.open("InstgAgt").open("FinInstnId");
        w.leaf("BICFI", &self.creditor_agent_bic).close().close();
        w.open("InstdAgt").open("FinInstnId");
        w.leaf("BICFI", &self.debtor_agent_bic).close().close();
        w.close();

        w.open("OrgnlGrpInfAndSts")
            .leaf("OrgnlMsgId", &self.original_msg_id)
            .leaf("OrgnlMsgNmId", pacs008::MESSAGE_TYPE)
            .leaf("GrpSts", self.status.as_str())
            .close();

        w.open("OrgnlPmtInfAndSts").open("TxInfAndSts");
        w.leaf("OrgnlInstrId", &self.original_msg_id)
            .leaf("OrgnlEndToEndId", &self.end_to_end_id)
            .leaf("TxSts", self.status.as_str());

        if self.reason_code.is_some() || self.additional_info.is_some() {
            w.open("StsRsnInf");
            if let Some(code) = &self.reason_code {
                w.open("Rsn").leaf("Cd", code).close();
            }
            w.leaf_opt("AddtlInf", self.additional_info.as_deref());
            w.close();
        }

        if let Some(tx) = &self.original_tx {
            w.open("OrgnlTxRef");
            w.open("Amt")
                .amount("InstdAmt", &tx.currency, &at_wire_scale(tx.amount).to_string())
                .close();
            if let Some(account) = &tx.debtor_account {
                w.open("DbtrAcct").open("Id").open("Othr");
                w.leaf("Id", account).close().close().close();
            }
            if let Some(account) = &tx.creditor_account {
                w.open("CdtrAcct").open("Id").open("Othr");
                w.leaf("Id", account).close().close().close();
            }
            w.close();
        }

        w.finish()
    }
}
