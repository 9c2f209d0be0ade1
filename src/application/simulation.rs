use crate::application::dto::{CreatePaymentRequest, CreatedPayment, PaymentStatusView};
use crate::codec::mt::parse_mt910_reference;
use crate::codec::{IsoCodec, MtCodec};
use crate::config::SimulatorConfig;
use crate::domain::money::Amount;
use crate::domain::payment::{Party, Payment};
use crate::domain::ports::{ClockBox, PaymentStoreBox, SystemClock};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

/// Two correspondent banks exchanging payments over MT or ISO 20022.
///
/// Bank A originates payments and receives confirmations; bank B receives
/// transfers and confirms them. Each bank keeps its own payment records.
pub struct PaymentSimulator {
    mt: MtCodec,
    iso: IsoCodec,
    bank_a: PaymentStoreBox,
    bank_b: PaymentStoreBox,
    clock: ClockBox,
}

impl PaymentSimulator {
    pub fn new(config: &SimulatorConfig, bank_a: PaymentStoreBox, bank_b: PaymentStoreBox) -> Self {
        Self {
            mt: MtCodec::new(config),
            iso: IsoCodec::new(config),
            bank_a,
            bank_b,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: ClockBox) -> Self {
        self.clock = clock;
        self
    }

    /// Bank A: records a customer payment and sends it as MT103.
    pub async fn create_mt_payment(&self, request: CreatePaymentRequest) -> Result<CreatedPayment> {
        let now = self.clock.now();
        let mut payment = new_payment(request, now)?;
        let message = self.mt.render_mt103(&mut payment, now.date_naive())?;
        info!(reference = ?payment.reference, "bank A sent MT103");
        self.bank_a.store(payment.clone()).await?;
        created(&payment, message)
    }

    /// Bank B: accepts an MT103 and answers with the MT910 confirming it.
    pub async fn receive_mt103(&self, raw: &str) -> Result<String> {
        let mut payment = self.mt.parse_mt103(raw)?;
        let confirmation = self
            .mt
            .render_mt910(&mut payment, self.clock.now().date_naive())?;
        info!(reference = ?payment.reference, "bank B credited MT103");
        self.bank_b.store(payment).await?;
        Ok(confirmation)
    }

    /// Bank A: matches an MT910 to the payment it confirms and marks it credited.
    pub async fn receive_mt910(&self, raw: &str) -> Result<PaymentStatusView> {
        let reference = parse_mt910_reference(raw).ok_or_else(|| {
            PaymentError::ValidationError("MT910 carries no :20: or :21: reference".to_string())
        })?;
        self.confirm(&reference, raw).await
    }

    /// Bank A: records a customer payment and sends it as pacs.008.
    pub async fn create_iso_payment(&self, request: CreatePaymentRequest) -> Result<CreatedPayment> {
        let now = self.clock.now();
        let mut payment = new_payment(request, now)?;
        let message = self.iso.render_pacs008(&mut payment, now)?;
        info!(reference = ?payment.reference, "bank A sent pacs.008");
        self.bank_a.store(payment.clone()).await?;
        created(&payment, message)
    }

    /// Bank B: accepts a pacs.008 and answers with a camt.054 credit notification.
    pub async fn receive_pacs008(&self, xml: &str) -> Result<String> {
        let mut payment = self.iso.parse_pacs008(xml)?;
        let notification = self.iso.render_camt054(&mut payment, self.clock.now())?;
        info!(reference = ?payment.reference, "bank B credited pacs.008");
        self.bank_b.store(payment).await?;
        Ok(notification)
    }

    /// Bank A: matches a camt.054 to the payment it confirms and marks it credited.
    pub async fn receive_camt054(&self, xml: &str) -> Result<PaymentStatusView> {
        let reference = self.iso.parse_camt054_reference(xml).ok_or_else(|| {
            PaymentError::ValidationError("camt.054 carries no EndToEndId".to_string())
        })?;
        self.confirm(&reference, xml).await
    }

    async fn confirm(&self, reference: &str, raw: &str) -> Result<PaymentStatusView> {
        let mut payment = self
            .bank_a
            .get_by_reference(reference)
            .await?
            .ok_or_else(|| PaymentError::NotFound(format!("Payment {}", reference)))?;
        payment.mark_credited(raw.to_string())?;
        info!(%reference, "bank A payment credited");
        self.bank_a.store(payment.clone()).await?;
        Ok(PaymentStatusView::from(&payment))
    }

    pub async fn bank_a_payment(&self, id: Uuid) -> Result<Option<Payment>> {
        self.bank_a.get(id).await
    }

    pub async fn bank_b_payment(&self, reference: &str) -> Result<Option<Payment>> {
        self.bank_b.get_by_reference(reference).await
    }
}

/// `REF<yyyyMMdd>-<8 upper-case hex>`, e.g. `REF20251209-AB12CD34`.
pub fn new_reference(now: DateTime<Utc>) -> String {
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(8);
    format!("REF{}-{}", now.format("%Y%m%d"), suffix.to_uppercase())
}

fn new_payment(request: CreatePaymentRequest, now: DateTime<Utc>) -> Result<Payment> {
    let mut payment = Payment::new();
    payment.reference = Some(new_reference(now));
    payment.amount = request.amount.map(Amount::new).transpose()?;
    payment.currency = request.currency;
    payment.debtor = Party {
        name: request.debtor_name,
        account: request.debtor_account,
        address: request.debtor_address,
    };
    payment.creditor = Party {
        name: request.creditor_name,
        account: request.creditor_account,
        address: request.creditor_address,
    };
    payment.remittance_info = request.remittance_info;
    Ok(payment)
}

fn created(payment: &Payment, message: String) -> Result<CreatedPayment> {
    let reference = payment
        .reference
        .clone()
        .ok_or_else(|| PaymentError::internal("rendered payment has no reference"))?;
    Ok(CreatedPayment {
        payment_id: payment.id(),
        reference,
        status: payment.status(),
        message,
    })
}
