use clap::Parser;
use loan_desk::application::workflow::DocumentWorkflow;
use loan_desk::config::Config;
use loan_desk::domain::ports::{DocumentStoreBox, NotifierBox};
use loan_desk::domain::ticket::RandomTicketGenerator;
use loan_desk::infrastructure::in_memory::InMemoryDocumentStore;
use loan_desk::infrastructure::mailer::{LogNotifier, MailRelayNotifier};
use loan_desk::infrastructure::razorpay::RazorpayGateway;
use loan_desk::interfaces::http;
use miette::{IntoDiagnostic, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn open_store(config: &Config) -> Result<DocumentStoreBox> {
    match &config.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => {
            let store = loan_desk::infrastructure::rocksdb::RocksDBStore::open(db_path)
                .into_diagnostic()?;
            tracing::info!(path = %db_path.display(), "using RocksDB document store");
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryDocumentStore::new()))
        }
        None => Ok(Box::new(InMemoryDocumentStore::new())),
    }
}

fn notifier(config: &Config) -> Result<NotifierBox> {
    match &config.mail_relay_url {
        Some(url) => Ok(Box::new(
            MailRelayNotifier::new(
                url.clone(),
                config.mail_relay_token.clone(),
                config.gateway_timeout(),
            )
            .into_diagnostic()?,
        )),
        None => {
            eprintln!("WARNING: No mail relay configured via --mail-relay-url. Emails will only be logged.");
            Ok(Box::new(LogNotifier))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let payments = RazorpayGateway::new(
        config.razorpay_url.clone(),
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
        config.gateway_timeout(),
    )
    .into_diagnostic()?;

    let workflow = DocumentWorkflow::new(
        open_store(&config)?,
        Box::new(RandomTicketGenerator::new()),
        Box::new(payments),
        notifier(&config)?,
        config.payment_settings().into_diagnostic()?,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    tracing::info!(%addr, "server is running");

    axum::serve(listener, http::router(Arc::new(workflow)))
        .await
        .into_diagnostic()?;

    Ok(())
}
