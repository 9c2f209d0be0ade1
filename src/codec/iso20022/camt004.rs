//! camt.004.001.08 - Return Account
//! Root GetAcctResponse: MsgHdr, RptOrErr.

use super::xml::XmlWriter;
use crate::domain::money::Balance;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};

pub const MESSAGE_TYPE: &str = "camt.004.001.08";

/// Closing booked balance attached to a balance inquiry report.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosingBalance {
    pub amount: Balance,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountReport {
    pub account_number: String,
    pub holder_name: String,
    pub servicer_bic: String,
    pub balance: Option<ClosingBalance>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOrError {
    Report(AccountReport),
    Error { code: String, description: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camt004Response {
    pub msg_id: String,
    pub created_at: DateTime<Utc>,
    pub requesting_bic: Option<String>,
    pub body: ReportOrError,
}

impl Camt004Response {
    pub fn report(
        msg_id: impl Into<String>,
        created_at: DateTime<Utc>,
        requesting_bic: Option<String>,
        report: AccountReport,
    ) -> Self {
        Self {
            msg_id: msg_id.into(),
            created_at,
            requesting_bic,
            body: ReportOrError::Report(report),
        }
    }

    /// `requesting_bic` is echoed in `ReqngPty` when given; internal errors pass `None`.
    pub fn error(
        msg_id: impl Into<String>,
        created_at: DateTime<Utc>,
        requesting_bic: Option<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            msg_id: msg_id.into(),
            created_at,
            requesting_bic,
            body: ReportOrError::Error {
                code: code.into(),
                description: description.into(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, ReportOrError::Error { .. })
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut w = XmlWriter::document(MESSAGE_TYPE);
        w.open("GetAcctResponse");

        w.open("MsgHdr")
            .leaf("MsgId", &self.msg_id)
            .leaf(
                "CreDtTm",
                &self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        if let Some(bic) = &self.requesting_bic {
            w.open("ReqngPty").open("Pty").open("Id").open("OrgId");
            w.leaf("AnyBIC", bic).close().close().close().close();
        }
        w.close();

        w.open("RptOrErr");
        match &self.body {
            ReportOrError::Report(report) => {
                w.open("Rpt").open("Acct");
                w.open("Id").open("Othr");
                w.leaf("Id", &report.account_number).close().close();
                w.leaf("Nm", &report.holder_name.to_uppercase());
                w.open("Svcr").open("FinInstnId");
                w.leaf("BICFI", &report.servicer_bic).close().close();
                w.leaf("Sts", "ACTV");
                if let Some(balance) = &report.balance {
                    w.open("Bal");
                    w.open("Tp").open("CdOrPrtry");
                    w.leaf("Cd", "CLBD").close().close();
                    w.amount("Amt", &balance.currency, &balance.amount.to_iso_string());
                    w.close();
                }
                w.close().close();
            }
            ReportOrError::Error { code, description } => {
                w.open("Err")
                    .leaf("ErrCd", code)
                    .leaf("Desc", description)
                    .close();
            }
        }

        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 9, 8, 0, 0).unwrap()
    }

    fn report(balance: Option<ClosingBalance>) -> Camt004Response {
        Camt004Response::report(
            "AV-20251209080000",
            now(),
            Some("BANKAMV0".to_string()),
            AccountReport {
                account_number: "1001".to_string(),
                holder_name: "Aishath Nazim".to_string(),
                servicer_bic: "BANKBMV0".to_string(),
                balance,
            },
        )
    }

    #[test]
    fn test_verification_report() {
        let xml = report(None).to_xml().unwrap();
        assert!(xml.contains("<GetAcctResponse>"));
        assert!(xml.contains("<AnyBIC>BANKAMV0</AnyBIC>"));
        assert!(xml.contains("<Nm>AISHATH NAZIM</Nm>"));
        assert!(xml.contains("<BICFI>BANKBMV0</BICFI>"));
        assert!(xml.contains("<Sts>ACTV</Sts>"));
        assert!(!xml.contains("<Bal>"));
    }

    #[test]
    fn test_balance_report() {
        let xml = report(Some(ClosingBalance {
            amount: Balance::new(dec!(4900.5)),
            currency: "MVR".to_string(),
        }))
        .to_xml()
        .unwrap();
        assert!(xml.contains("<Cd>CLBD</Cd>"));
        assert!(xml.contains("<Amt Ccy=\"MVR\">4900.50</Amt>"));
    }

    #[test]
    fn test_error_response() {
        let resp = Camt004Response::error(
            "BI-20251209080000",
            now(),
            None,
            "AC04",
            "Unknown account for balance inquiry.",
        );
        assert!(resp.is_error());
        let xml = resp.to_xml().unwrap();
        assert!(xml.contains("<ErrCd>AC04</ErrCd>"));
        assert!(xml.contains("<Desc>Unknown account for balance inquiry.</Desc>"));
        assert!(!xml.contains("<ReqngPty>"));
        assert!(!xml.contains("<Rpt>"));
    }

    #[test]
    fn test_unknown_account_error_keeps_requesting_party() {
        let xml = Camt004Response::error(
            "AV-20251209080000",
            now(),
            Some("BANKAMV0".to_string()),
            "AC04",
            "Invalid or unknown account at target agent.",
        )
        .to_xml()
        .unwrap();

        let header = xml.find("<ReqngPty>").unwrap();
        let error = xml.find("<Err>").unwrap();
        assert!(header < error);
        assert!(xml.contains("<AnyBIC>BANKAMV0</AnyBIC>"));
        assert!(xml.contains("<ErrCd>AC04</ErrCd>"));
    }
}
