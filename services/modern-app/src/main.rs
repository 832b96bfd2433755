//! modern-app
//!
//! Simulated order processing service: traces to an OTLP collector, counters
//! on `/metrics`, logs on stdout mirrored into a file.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::Registry;

use modern_app::{
    create_router, logging, server, summary, AppState, AtomicCounters, Config, RandomPolicy,
    Telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_file = match logging::open_log_file(&config.log_path) {
        Ok(file) => file,
        Err(e) => {
            let stdout = logging::early_dispatch(config.log_format, std::io::stdout);
            tracing::dispatcher::with_default(&stdout, || {
                error!(error = %e, "Failed to open log file");
            });
            return Err(e.into());
        }
    };

    let telemetry = Telemetry::init(&config.service_name, &config.traces_endpoint());
    let otel_layer = telemetry.as_ref().ok().map(|t| t.layer::<Registry>());
    logging::init_logging(config.log_format, log_file.clone(), otel_layer)?;

    let telemetry =
        telemetry.inspect_err(|e| error!(error = %e, "Failed to initialize OpenTelemetry"))?;
    info!(endpoint = %config.traces_endpoint(), "OpenTelemetry initialized");

    let counters = Arc::new(AtomicCounters::new());
    let policy = Arc::new(RandomPolicy::from_entropy(
        config.out_of_stock_rate,
        config.payment_decline_rate,
    ));
    let state = AppState::new(config.service_name.as_str(), counters, policy);

    let addr = config.listen_addr();
    let listener = server::bind(addr)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to start HTTP listener"))?;
    info!("{} starting on {}", config.service_name, addr);

    let shutdown = CancellationToken::new();
    tokio::spawn(server::watch_signals(shutdown.clone()));

    let summary_task = tokio::spawn(summary::run_summary_logger(
        state.counters.clone(),
        state.service_name.clone(),
        config.summary_interval(),
        shutdown.clone(),
    ));

    let served = server::serve(listener, create_router(state), shutdown.clone()).await;

    // Also reached when the server fails, so the summary task always stops
    shutdown.cancel();
    if let Err(e) = summary_task.await {
        warn!(error = %e, "Summary logger task failed");
    }

    if let Err(e) = &served {
        error!(error = %e, "HTTP server stopped with an error");
    }

    telemetry.shutdown();
    if let Err(e) = log_file.sync_all() {
        warn!(error = %e, "Failed to sync log file");
    }

    served.context("HTTP server failed")?;
    info!("Shutdown complete");

    Ok(())
}
