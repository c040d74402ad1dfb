//! wxstream daemon
//!
//! Runs the producer on a fixed tick, feeds both consumers from the
//! in-process stream, and serves the HTTP surface until Ctrl+C.

mod scheduler;
mod wiring;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use wxs_config::AppConfig;

use crate::scheduler::Scheduler;
use crate::wiring::build_pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    wxs_obs::init("wxsd");

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(
        stream = %config.stream.name,
        bucket = %config.archive.bucket,
        poll_interval = config.daemon.poll_interval,
        batch_size = config.daemon.batch_size,
        "Loaded configuration"
    );

    let pipeline = build_pipeline(&config)?;
    let (app, state) = wxs_http::build_app(pipeline.consumers.clone())?;

    let mut scheduler = Scheduler::new(
        pipeline.producer,
        pipeline.stream,
        pipeline.consumers,
        state.clone(),
        Duration::from_secs(config.daemon.poll_interval),
        config.daemon.batch_size,
    );

    let addr: SocketAddr = config
        .daemon
        .http_bind
        .parse()
        .with_context(|| format!("Invalid HTTP bind address {}", config.daemon.http_bind))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut server_shutdown = shutdown_rx.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.changed().await;
            })
            .await
    });
    let scheduler_task = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    wxs_http::set_ready(&state, true);
    info!(%addr, "wxsd running - press Ctrl+C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");
    wxs_http::set_ready(&state, false);
    let _ = shutdown_tx.send(true);

    if let Err(e) = scheduler_task.await {
        error!(error = %e, "Scheduler task failed");
    }
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "HTTP server error"),
        Err(e) => error!(error = %e, "HTTP server task failed"),
    }

    info!("wxsd stopped");
    Ok(())
}
