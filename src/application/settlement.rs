use crate::application::dto::{
    AccountVerificationData, AccountVerificationRequest, CreditTransferRequest, DefaultResponse,
    IsoResponse, LegacyTransferRequest, LegacyVerificationRequest, ResponseStatus,
};
use crate::codec::iso20022::{
    AccountReport, Camt004Response, ClosingBalance, OriginalTxRef, Pacs002Report,
    TransactionStatus,
};
use crate::config::SimulatorConfig;
use crate::domain::account::{Account, AccountKey, Bank, Movement};
use crate::domain::money::Amount;
use crate::domain::ports::{ClockBox, LedgerStoreBox, SystemClock};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

/// How far a transfer got through the ledger.
///
/// Effects applied before a rejection stay applied: the debtor bank's
/// liquidity hold is never released.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Settlement {
    Settled,
    DebtorAccountMissing,
    CreditorAccountMissing,
    AgentMissing(String),
}

struct Transfer {
    debtor: AccountKey,
    creditor: AccountKey,
    amount: Amount,
}

/// The clearing system: moves liquidity between participant banks and
/// balances between their customers' accounts.
///
/// Every operation yields exactly one response in the caller's wire format;
/// ledger and store failures are reported inside it, never returned as `Err`.
pub struct SettlementEngine {
    ledger: LedgerStoreBox,
    clock: ClockBox,
    config: SimulatorConfig,
}

impl SettlementEngine {
    pub fn new(ledger: LedgerStoreBox, config: SimulatorConfig) -> Self {
        Self {
            ledger,
            clock: Box::new(SystemClock),
            config,
        }
    }

    /// Replaces the clock stamping message ids and timestamps.
    pub fn with_clock(mut self, clock: ClockBox) -> Self {
        self.clock = clock;
        self
    }

    /// Runs the five settlement steps in order.
    ///
    /// 1. resolve the debtor account
    /// 2. hold liquidity at the debtor bank
    /// 3. resolve the creditor account
    /// 4. credit liquidity at the creditor bank
    /// 5. debit the debtor, credit the creditor
    async fn settle(&self, transfer: &Transfer) -> Result<Settlement> {
        if self.ledger.account(&transfer.debtor).await?.is_none() {
            warn!(account = %transfer.debtor, "debtor account not found");
            return Ok(Settlement::DebtorAccountMissing);
        }

        let hold = Movement::Debit.delta(transfer.amount);
        match self
            .ledger
            .adjust_liquidity(&transfer.debtor.bank_code, hold)
            .await
        {
            Ok(liquidity) => info!(
                bank = %transfer.debtor.bank_code,
                %liquidity,
                "liquidity held at debtor agent"
            ),
            Err(PaymentError::NotFound(_)) => {
                return Ok(Settlement::AgentMissing(transfer.debtor.bank_code.clone()));
            }
            Err(e) => return Err(e),
        }

        if self.ledger.account(&transfer.creditor).await?.is_none() {
            warn!(
                account = %transfer.creditor,
                "creditor account not found, liquidity hold stays applied"
            );
            return Ok(Settlement::CreditorAccountMissing);
        }

        let clear = Movement::Credit.delta(transfer.amount);
        match self
            .ledger
            .adjust_liquidity(&transfer.creditor.bank_code, clear)
            .await
        {
            Ok(liquidity) => info!(
                bank = %transfer.creditor.bank_code,
                %liquidity,
                "liquidity cleared to creditor agent"
            ),
            Err(PaymentError::NotFound(_)) => {
                return Ok(Settlement::AgentMissing(transfer.creditor.bank_code.clone()));
            }
            Err(e) => return Err(e),
        }

        self.ledger
            .adjust_account_balance(&transfer.debtor, Movement::Debit.delta(transfer.amount))
            .await?;
        self.ledger
            .adjust_account_balance(&transfer.creditor, Movement::Credit.delta(transfer.amount))
            .await?;
        info!(
            debtor = %transfer.debtor,
            creditor = %transfer.creditor,
            amount = %transfer.amount,
            "accounts settled"
        );

        Ok(Settlement::Settled)
    }

    /// Settles a credit transfer and answers with a pacs.002 status report.
    pub async fn process_credit_transfer(&self, request: CreditTransferRequest) -> IsoResponse {
        let now = self.clock.now();
        let currency = request
            .currency
            .clone()
            .unwrap_or_else(|| self.config.default_currency.clone());
        let end_to_end_id = request.end_to_end_id.clone().unwrap_or_else(|| {
            format!(
                "E2E-{}-{}",
                request.initiator_account_number, request.recipient_account_number
            )
        });
        let report = Pacs002Report {
            msg_id: format!("BM{}", compact_timestamp(now)),
            created_at: now,
            original_msg_id: format!("CT-{}", short_hex(12)),
            end_to_end_id,
            debtor_agent_bic: request.initiator_bic.clone(),
            creditor_agent_bic: request.recipient_bic.clone(),
            status: TransactionStatus::Rjct,
            reason_code: None,
            additional_info: None,
            original_tx: Some(OriginalTxRef {
                amount: request.amount,
                currency,
                debtor_account: Some(request.initiator_account_number.clone()),
                creditor_account: Some(request.recipient_account_number.clone()),
            }),
        };
        let reject = |code: &str, info: String, status: ResponseStatus| {
            let document = Pacs002Report {
                status: TransactionStatus::Rjct,
                reason_code: Some(code.to_string()),
                additional_info: Some(info),
                ..report.clone()
            }
            .to_xml();
            respond(status, document)
        };

        info!(
            end_to_end_id = %report.end_to_end_id,
            debtor_agent = %request.initiator_bic,
            creditor_agent = %request.recipient_bic,
            amount = %request.amount,
            "credit transfer received"
        );

        let amount = match Amount::new(request.amount) {
            Ok(amount) => amount,
            Err(_) => {
                warn!(amount = %request.amount, "rejecting negative amount");
                return reject(
                    "AM12",
                    "Amount must not be negative.".to_string(),
                    ResponseStatus::BadRequest,
                );
            }
        };
        let transfer = Transfer {
            debtor: AccountKey::new(&request.initiator_account_number, &request.initiator_bic),
            creditor: AccountKey::new(&request.recipient_account_number, &request.recipient_bic),
            amount,
        };

        match self.settle(&transfer).await {
            Ok(Settlement::Settled) => {
                let document = Pacs002Report {
                    status: TransactionStatus::Acsc,
                    additional_info: Some("Transaction successfully settled through IPS.".to_string()),
                    ..report.clone()
                }
                .to_xml();
                respond(ResponseStatus::Ok, document)
            }
            Ok(Settlement::DebtorAccountMissing) => reject(
                "AC04",
                "Initiator account not found at debtor agent.".to_string(),
                ResponseStatus::BadRequest,
            ),
            Ok(Settlement::CreditorAccountMissing) => reject(
                "AC04",
                "Recipient account not found at creditor agent.".to_string(),
                ResponseStatus::BadRequest,
            ),
            Ok(Settlement::AgentMissing(bank)) => {
                warn!(%bank, "participant bank not found");
                reject(
                    "AC04",
                    format!("Participant bank {} not found.", bank),
                    ResponseStatus::BadRequest,
                )
            }
            Err(e) => {
                error!(error = %e, "credit transfer failed");
                reject(
                    "U999",
                    "Internal server error while processing credit transfer.".to_string(),
                    ResponseStatus::InternalError,
                )
            }
        }
    }

    /// The older JSON variant of [`Self::process_credit_transfer`].
    pub async fn process_transaction(&self, request: LegacyTransferRequest) -> DefaultResponse {
        info!(
            debtor_agent = %request.initiator,
            creditor_agent = %request.recipient,
            amount = %request.amount,
            "transfer received"
        );

        let amount = match Amount::new(request.amount) {
            Ok(amount) => amount,
            Err(_) => {
                return DefaultResponse::new(
                    ResponseStatus::BadRequest,
                    "Amount must not be negative",
                    "pacs.002",
                )
                .with_message_status("RJCT");
            }
        };
        let transfer = Transfer {
            debtor: AccountKey::new(&request.initiator_account_number, &request.initiator),
            creditor: AccountKey::new(&request.recipient_account_number, &request.recipient),
            amount,
        };

        match self.settle(&transfer).await {
            Ok(Settlement::Settled) => {
                DefaultResponse::new(ResponseStatus::Ok, "Transaction Successful", "pacs.002")
                    .with_message_status("ACCP")
            }
            Ok(Settlement::DebtorAccountMissing) => DefaultResponse::new(
                ResponseStatus::NotFound,
                "Initiator account not found",
                "camt.004",
            )
            .with_message_status("RJCT"),
            Ok(Settlement::CreditorAccountMissing) => DefaultResponse::new(
                ResponseStatus::NotFound,
                "Payee account not found",
                "pacs.002",
            )
            .with_message_status("RJCT"),
            Ok(Settlement::AgentMissing(bank)) => DefaultResponse::new(
                ResponseStatus::NotFound,
                format!("Bank {} not found", bank),
                "pacs.002",
            )
            .with_message_status("RJCT"),
            Err(e) => {
                error!(error = %e, "transfer failed");
                DefaultResponse::new(
                    ResponseStatus::InternalError,
                    "Internal Server Error",
                    "pacs.002",
                )
                .with_message_status("RJCT")
            }
        }
    }

    /// Confirms an account exists at the target bank. Read-only.
    pub async fn verify_account(&self, request: AccountVerificationRequest) -> IsoResponse {
        let now = self.clock.now();
        let msg_id = format!("AV-{}", compact_timestamp(now));
        info!(
            requesting_bank = %request.requesting_bank_bic,
            target_bank = %request.target_bank_bic,
            account = %request.account_number,
            "account verification received"
        );

        match self.lookup(&request).await {
            Ok(Some(account)) => {
                let response = Camt004Response::report(
                    msg_id,
                    now,
                    Some(request.requesting_bank_bic.clone()),
                    AccountReport {
                        account_number: request.account_number.clone(),
                        holder_name: account.account_holder_name,
                        servicer_bic: request.target_bank_bic.clone(),
                        balance: None,
                    },
                );
                respond(ResponseStatus::Ok, response.to_xml())
            }
            Ok(None) => {
                warn!(account = %request.account_number, "account not found");
                let response = Camt004Response::error(
                    msg_id,
                    now,
                    Some(request.requesting_bank_bic.clone()),
                    "AC04",
                    "Invalid or unknown account at target agent.",
                );
                respond(ResponseStatus::BadRequest, response.to_xml())
            }
            Err(e) => {
                error!(error = %e, "account verification failed");
                let response = Camt004Response::error(
                    msg_id,
                    now,
                    None,
                    "U999",
                    "Internal error during account verification.",
                );
                respond(ResponseStatus::InternalError, response.to_xml())
            }
        }
    }

    /// Reports the closing booked balance of an account. Read-only.
    pub async fn balance_inquiry(&self, request: AccountVerificationRequest) -> IsoResponse {
        let now = self.clock.now();
        let msg_id = request
            .reference
            .clone()
            .unwrap_or_else(|| format!("BI-{}", compact_timestamp(now)));
        info!(
            requesting_bank = %request.requesting_bank_bic,
            target_bank = %request.target_bank_bic,
            account = %request.account_number,
            "balance inquiry received"
        );

        match self.lookup(&request).await {
            Ok(Some(account)) => {
                let currency = account
                    .currency
                    .clone()
                    .unwrap_or_else(|| self.config.default_currency.clone());
                let response = Camt004Response::report(
                    msg_id,
                    now,
                    Some(request.requesting_bank_bic.clone()),
                    AccountReport {
                        account_number: request.account_number.clone(),
                        holder_name: account.account_holder_name,
                        servicer_bic: request.target_bank_bic.clone(),
                        balance: Some(ClosingBalance {
                            amount: account.balance,
                            currency,
                        }),
                    },
                );
                respond(ResponseStatus::Ok, response.to_xml())
            }
            Ok(None) => {
                warn!(account = %request.account_number, "account not found");
                let response = Camt004Response::error(
                    msg_id,
                    now,
                    None,
                    "AC04",
                    "Unknown account for balance inquiry.",
                );
                respond(ResponseStatus::BadRequest, response.to_xml())
            }
            Err(e) => {
                error!(error = %e, "balance inquiry failed");
                let response = Camt004Response::error(
                    msg_id,
                    now,
                    None,
                    "U999",
                    "Internal error during balance inquiry.",
                );
                respond(ResponseStatus::InternalError, response.to_xml())
            }
        }
    }

    /// Resolves the target bank, then the account held there. Either one
    /// missing reads as an unknown account.
    async fn lookup(&self, request: &AccountVerificationRequest) -> Result<Option<Account>> {
        if self.ledger.bank(&request.target_bank_bic).await?.is_none() {
            warn!(bank = %request.target_bank_bic, "target bank not found");
            return Ok(None);
        }
        self.ledger
            .account(&AccountKey::new(
                &request.account_number,
                &request.target_bank_bic,
            ))
            .await
    }

    /// JSON account verification: all three banks must be known, then the
    /// account is looked up at the receiver.
    pub async fn verify_account_legacy(
        &self,
        request: LegacyVerificationRequest,
    ) -> DefaultResponse {
        let rejected = |message: &str| {
            DefaultResponse::new(ResponseStatus::NotFound, message, "camt.004")
                .with_message_id(request.message_id.clone())
                .with_message_status("RJCT")
        };

        let outcome: Result<DefaultResponse> = async {
            if self.ledger.bank(&request.initiator).await?.is_none() {
                return Ok(rejected("Initiator bank not found"));
            }
            if self.ledger.bank(&request.sender).await?.is_none() {
                return Ok(rejected("Sender bank not found"));
            }
            let Some(receiver) = self.ledger.bank(&request.receiver).await? else {
                return Ok(rejected("Receiver bank not found"));
            };

            info!(bank = %receiver.bank_code, "verifying account at receiver bank");
            let key = AccountKey::new(&request.account_number, &request.receiver);
            let Some(account) = self.ledger.account(&key).await? else {
                return Ok(rejected("Account not found"));
            };

            Ok(DefaultResponse::new(
                ResponseStatus::Ok,
                "Account verification successful",
                "camt.004",
            )
            .with_message_id(request.message_id.clone())
            .with_message_status("ACCP")
            .with_data(verification_data(account, receiver)))
        }
        .await;

        outcome.unwrap_or_else(|e| {
            error!(error = %e, "account verification failed");
            DefaultResponse::new(
                ResponseStatus::InternalError,
                format!("Internal server error: {}", e),
                "camt.004",
            )
            .with_message_id(request.message_id.clone())
        })
    }

    /// Current accounts and banks, for reporting.
    pub async fn ledger_snapshot(&self) -> Result<(Vec<Account>, Vec<Bank>)> {
        Ok((self.ledger.accounts().await?, self.ledger.banks().await?))
    }
}

fn verification_data(account: Account, bank: Bank) -> AccountVerificationData {
    AccountVerificationData {
        account_number: account.account_number,
        bank_name: bank.bank_name,
        bank_code: bank.bank_code,
        account_holder_name: account.account_holder_name,
    }
}

/// A document that failed to render becomes an empty internal-error response.
fn respond(status: ResponseStatus, document: Result<String>) -> IsoResponse {
    match document {
        Ok(document) => IsoResponse::new(status, document),
        Err(e) => {
            error!(error = %e, "failed to render response document");
            IsoResponse::new(ResponseStatus::InternalError, String::new())
        }
    }
}

fn compact_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

fn short_hex(len: usize) -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(len);
    hex
}
