use ips_sim::domain::account::{Account, AccountKey, Bank};
use ips_sim::domain::money::Balance;
use ips_sim::domain::payment::Payment;
use ips_sim::domain::ports::{LedgerStoreBox, LedgerStoreFactory, PaymentStoreBox};
use ips_sim::infrastructure::in_memory::{InMemoryLedgerStore, InMemoryPaymentStore};
use ips_sim::infrastructure::json_file::JsonFileLedgerStore;
use rust_decimal_macros::dec;
use std::path::PathBuf;

#[tokio::test]
async fn test_factory_instantiation() {
    let factory: LedgerStoreFactory =
        Box::new(|| Box::new(InMemoryLedgerStore::new()) as LedgerStoreBox);

    let store = factory();
    store
        .put_account(Account::new("1001", "BANKAMV0", "Ali", Balance::new(dec!(10))))
        .await
        .unwrap();
    let retrieved = store
        .account(&AccountKey::new("1001", "BANKAMV0"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(retrieved.account_holder_name, "Ali");
}

#[tokio::test]
async fn test_json_factory_in_task() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().to_path_buf();
    let factory: LedgerStoreFactory = Box::new(move || {
        Box::new(JsonFileLedgerStore::open(&path).unwrap()) as LedgerStoreBox
    });

    let handle = tokio::spawn(async move {
        let store = factory();
        store
            .put_bank(Bank::new("BANKAMV0", "Bank A", Balance::new(dec!(100))))
            .await
            .unwrap();
        store.adjust_liquidity("BANKAMV0", Balance::new(dec!(-40))).await.unwrap()
    });

    assert_eq!(handle.await.unwrap(), Balance::new(dec!(60)));
}

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let ledger: LedgerStoreBox = Box::new(InMemoryLedgerStore::new());
    let payments: PaymentStoreBox = Box::new(InMemoryPaymentStore::new());

    let mut payment = Payment::new();
    payment.reference = Some("REF20251209-0A1B2C3D".to_string());
    let id = payment.id();

    // Send + Sync: both boxes move into spawned tasks.
    let ledger_handle = tokio::spawn(async move {
        ledger
            .put_bank(Bank::new("BANKBMV0", "Bank B", Balance::new(dec!(5))))
            .await
            .unwrap();
        ledger.banks().await.unwrap()
    });
    let payment_handle = tokio::spawn(async move {
        payments.store(payment).await.unwrap();
        (
            payments.get(id).await.unwrap(),
            payments.get_by_reference("REF20251209-0A1B2C3D").await.unwrap(),
        )
    });

    let banks = ledger_handle.await.unwrap();
    assert_eq!(banks.len(), 1);
    let (by_id, by_reference) = payment_handle.await.unwrap();
    assert_eq!(by_id.unwrap().id(), id);
    assert_eq!(by_reference.unwrap().id(), id);
}
