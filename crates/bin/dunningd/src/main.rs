//! # dunningd: dunning daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialise structured logging
//! - Open the JSON state document and seed the invoice snapshot
//! - Construct the mailer, the scheduler and the application services
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (Ctrl-C), stopping the scheduler
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod invoices;

use std::sync::Arc;

use anyhow::Context;
use dunning_adapter_http_axum::state::AppState;
use dunning_adapter_mail_resend::ResendMailer;
use dunning_adapter_storage_json::JsonStateStore;
use dunning_app::invoice_snapshot::SharedInvoiceSnapshot;
use dunning_app::ports::SystemClock;
use dunning_app::scheduler::Scheduler;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Adapters
    let store = Arc::new(JsonStateStore::open(&config.storage.state_path).await);
    let invoices = Arc::new(SharedInvoiceSnapshot::default());
    if let Some(path) = &config.invoices.path {
        match invoices::load(path).await {
            Ok(rows) => invoices.replace(rows),
            Err(err) => tracing::warn!(
                path = %path.display(),
                error = %err,
                "invoice file unusable, starting with no invoices"
            ),
        }
    }
    let mailer = Arc::new(ResendMailer::new(config.resend()).context("building mail client")?);
    let clock = Arc::new(SystemClock);

    // Scheduler
    let scheduler = Scheduler::new(
        Arc::clone(&store),
        Arc::clone(&invoices),
        Arc::clone(&mailer),
        Arc::clone(&clock),
        config.tick_period(),
    );
    if config.scheduler.enabled {
        scheduler.start();
    } else {
        tracing::info!("scheduler disabled by configuration");
    }

    // HTTP
    let state = AppState::new(store, invoices, mailer, clock, scheduler.clone());
    let app = dunning_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(%bind_addr, "dunningd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await;
    tracing::info!("dunningd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
