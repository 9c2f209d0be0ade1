use clap::{Parser, Subcommand, ValueEnum};
use ips_sim::application::dto::{
    AccountVerificationRequest, CreatePaymentRequest, CreditTransferRequest, IsoResponse,
    LegacyTransferRequest, LegacyVerificationRequest,
};
use ips_sim::application::{PaymentSimulator, SettlementEngine};
use ips_sim::config::SimulatorConfig;
use ips_sim::domain::ports::LedgerStoreBox;
use ips_sim::infrastructure::in_memory::InMemoryPaymentStore;
use ips_sim::infrastructure::json_file::JsonFileLedgerStore;
#[cfg(feature = "storage-rocksdb")]
use ips_sim::infrastructure::rocksdb::RocksDBLedgerStore;
use ips_sim::interfaces::csv::ledger_writer::LedgerWriter;
use ips_sim::interfaces::json::{read_message, read_request, write_response};
use miette::{IntoDiagnostic, Result};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding Accounts.json and Banks.json
    #[arg(long, env = "IPS_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "IPS_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Currency used when a request or account carries none
    #[arg(long, env = "IPS_DEFAULT_CURRENCY", global = true)]
    default_currency: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Settle a credit transfer (JSON request) and print the pacs.002 report
    CreditTransfer { request: PathBuf },
    /// Settle a legacy transfer (JSON request) and print the JSON response
    Transfer { request: PathBuf },
    /// Verify an account and print the camt.004 response
    VerifyAccount { request: PathBuf },
    /// Verify an account against the bank directory and print the JSON response
    VerifyAccountLegacy { request: PathBuf },
    /// Print the camt.004 closing balance of an account
    BalanceInquiry { request: PathBuf },
    /// Send a payment from bank A to bank B and print every message exchanged
    Simulate {
        request: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Mt)]
        format: Format,
    },
    /// Parse one received message and print what was read from it
    Inspect {
        message: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Mt)]
        format: Format,
    },
    /// Print accounts and banks as CSV
    Ledger,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// MT103 / MT910
    Mt,
    /// pacs.008 / camt.054
    Iso,
}

#[cfg(feature = "storage-rocksdb")]
fn open_ledger(cli: &Cli) -> Result<LedgerStoreBox> {
    if let Some(db_path) = &cli.db_path {
        let store = RocksDBLedgerStore::open(db_path).into_diagnostic()?;
        return Ok(Box::new(store));
    }
    let store = JsonFileLedgerStore::open(&cli.data_dir).into_diagnostic()?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_ledger(cli: &Cli) -> Result<LedgerStoreBox> {
    if cli.db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to the JSON ledger."
        );
    }
    let store = JsonFileLedgerStore::open(&cli.data_dir).into_diagnostic()?;
    Ok(Box::new(store))
}

fn print_document(response: IsoResponse) -> Result<()> {
    info!(status = response.status.http_code(), "response ready");
    io::stdout()
        .lock()
        .write_all(response.document.as_bytes())
        .into_diagnostic()
}

async fn simulate(config: &SimulatorConfig, request: &Path, format: Format) -> Result<()> {
    let payment: CreatePaymentRequest = read_request(request).into_diagnostic()?;
    let simulator = PaymentSimulator::new(
        config,
        Box::new(InMemoryPaymentStore::new()),
        Box::new(InMemoryPaymentStore::new()),
    );

    let (created, confirmation, view) = match format {
        Format::Mt => {
            let created = simulator.create_mt_payment(payment).await.into_diagnostic()?;
            let mt910 = simulator.receive_mt103(&created.message).await.into_diagnostic()?;
            let view = simulator.receive_mt910(&mt910).await.into_diagnostic()?;
            (created, mt910, view)
        }
        Format::Iso => {
            let created = simulator.create_iso_payment(payment).await.into_diagnostic()?;
            let camt054 = simulator
                .receive_pacs008(&created.message)
                .await
                .into_diagnostic()?;
            let view = simulator.receive_camt054(&camt054).await.into_diagnostic()?;
            (created, camt054, view)
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", created.message).into_diagnostic()?;
    writeln!(out, "{}", confirmation).into_diagnostic()?;
    write_response(&mut out, &view).into_diagnostic()
}

fn inspect(config: &SimulatorConfig, message: &Path, format: Format) -> Result<()> {
    let raw = read_message(message).into_diagnostic()?;
    let payment = match format {
        Format::Mt => ips_sim::codec::MtCodec::new(config).parse_mt103(&raw),
        Format::Iso => ips_sim::codec::IsoCodec::new(config).parse_pacs008(&raw),
    }
    .into_diagnostic()?;
    write_response(io::stdout().lock(), &payment).into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    let mut config = SimulatorConfig::default();
    if let Some(currency) = &cli.default_currency {
        config.default_currency = currency.clone();
    }

    match &cli.command {
        Command::Simulate { request, format } => return simulate(&config, request, *format).await,
        Command::Inspect { message, format } => return inspect(&config, message, *format),
        _ => {}
    }

    let engine = SettlementEngine::new(open_ledger(&cli)?, config);

    match &cli.command {
        Command::CreditTransfer { request } => {
            let request: CreditTransferRequest = read_request(request).into_diagnostic()?;
            print_document(engine.process_credit_transfer(request).await)?;
        }
        Command::Transfer { request } => {
            let request: LegacyTransferRequest = read_request(request).into_diagnostic()?;
            let response = engine.process_transaction(request).await;
            write_response(io::stdout().lock(), &response).into_diagnostic()?;
        }
        Command::VerifyAccount { request } => {
            let request: AccountVerificationRequest = read_request(request).into_diagnostic()?;
            print_document(engine.verify_account(request).await)?;
        }
        Command::VerifyAccountLegacy { request } => {
            let request: LegacyVerificationRequest = read_request(request).into_diagnostic()?;
            let response = engine.verify_account_legacy(request).await;
            write_response(io::stdout().lock(), &response).into_diagnostic()?;
        }
        Command::BalanceInquiry { request } => {
            let request: AccountVerificationRequest = read_request(request).into_diagnostic()?;
            print_document(engine.balance_inquiry(request).await)?;
        }
        Command::Ledger => {
            let (accounts, banks) = engine.ledger_snapshot().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = LedgerWriter::new(stdout.lock());
            writer.write_ledger(&accounts, &banks).into_diagnostic()?;
        }
        Command::Simulate { .. } | Command::Inspect { .. } => {}
    }

    Ok(())
}
