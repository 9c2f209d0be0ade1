use chrono::{NaiveDate, TimeZone, Utc};
use ips_sim::codec::{IsoCodec, MtCodec};
use ips_sim::config::SimulatorConfig;
use ips_sim::domain::money::Amount;
use ips_sim::domain::payment::{Party, Payment, PaymentStatus};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Free text that survives both wire formats: no line breaks, no leading tag
/// marker, no surrounding whitespace.
fn text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 .,&<>/-]{0,30}[A-Za-z0-9]"
}

fn account() -> impl Strategy<Value = String> {
    "[A-Z]{2}[0-9]{8,20}"
}

fn amount() -> impl Strategy<Value = Amount> {
    (0i64..10_000_000_000, 0u32..=2)
        .prop_map(|(units, scale)| Amount::new(Decimal::new(units, scale)).unwrap())
}

prop_compose! {
    fn party()(name in text(), account in account(), address in text()) -> Party {
        Party::new(name, account, address)
    }
}

prop_compose! {
    fn payment()(
        reference in "REF[0-9]{8}-[0-9A-F]{8}",
        amount in amount(),
        currency in "[A-Z]{3}",
        debtor in party(),
        creditor in party(),
        remittance in text(),
    ) -> Payment {
        let mut p = Payment::new();
        p.reference = Some(reference);
        p.amount = Some(amount);
        p.currency = Some(currency);
        p.debtor = debtor;
        p.creditor = creditor;
        p.remittance_info = Some(remittance);
        p
    }
}

fn at_wire_scale(amount: Amount) -> Amount {
    Amount::parse_iso(&amount.to_iso_string()).unwrap()
}

proptest! {
    #[test]
    fn mt103_round_trip(original in payment()) {
        let codec = MtCodec::new(&SimulatorConfig::default());
        let mut sent = original.clone();
        let text = codec
            .render_mt103(&mut sent, NaiveDate::from_ymd_opt(2025, 12, 9).unwrap())
            .unwrap();
        let parsed = codec.parse_mt103(&text).unwrap();

        prop_assert_eq!(parsed.status(), PaymentStatus::Sent);
        prop_assert_eq!(&parsed.reference, &original.reference);
        prop_assert_eq!(&parsed.currency, &original.currency);
        prop_assert_eq!(parsed.amount, original.amount.map(at_wire_scale));
        prop_assert_eq!(&parsed.debtor, &original.debtor);
        prop_assert_eq!(&parsed.creditor, &original.creditor);
        prop_assert_eq!(&parsed.remittance_info, &original.remittance_info);
    }

    #[test]
    fn pacs008_round_trip(original in payment()) {
        let codec = IsoCodec::new(&SimulatorConfig::default());
        let mut sent = original.clone();
        let now = Utc.with_ymd_and_hms(2025, 12, 9, 10, 0, 0).unwrap();
        let xml = codec.render_pacs008(&mut sent, now).unwrap();
        let parsed = codec.parse_pacs008(&xml).unwrap();

        prop_assert_eq!(parsed.status(), PaymentStatus::Sent);
        prop_assert_eq!(&parsed.reference, &original.reference);
        prop_assert_eq!(&parsed.currency, &original.currency);
        prop_assert_eq!(parsed.amount, original.amount.map(at_wire_scale));
        prop_assert_eq!(&parsed.debtor, &original.debtor);
        prop_assert_eq!(&parsed.creditor, &original.creditor);
        prop_assert_eq!(&parsed.remittance_info, &original.remittance_info);
    }

    #[test]
    fn wire_amounts_agree(amount in amount()) {
        prop_assert_eq!(amount.to_mt_string().replace(',', "."), amount.to_iso_string());
        let iso = amount.to_iso_string();
        let (_, fraction) = iso.split_once('.').unwrap();
        prop_assert_eq!(fraction.len(), 2);
    }
}

#[test]
fn test_amount_contract() {
    let amount = Amount::new(Decimal::from(1000)).unwrap();
    assert_eq!(amount.to_mt_string(), "1000,00");
    assert_eq!(amount.to_iso_string(), "1000.00");
}
