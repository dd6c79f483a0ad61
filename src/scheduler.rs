//! The periodic driver (spec §5, §9): runs one reconciliation cycle, then
//! sleeps, repeating until the process is asked to stop. Cycles never
//! overlap — the sleep starts only once the previous cycle (fetch, reconcile,
//! checkin) has fully finished, rather than ticking on a fixed-rate timer.

use std::sync::Arc;
use std::time::Duration;

use rsa::RsaPrivateKey;

use crate::config::Config;
use crate::core::reconcile::checkin::run_cycle;
use crate::core::registry::ConnectionRegistry;
use crate::transport::ControlPlaneClient;

/// Runs cycles until a Ctrl-C / SIGTERM is observed. Returns once shutdown
/// has been requested and the in-flight cycle (if any) has finished.
pub async fn run(config: &Config, client: &ControlPlaneClient, private_key: Arc<RsaPrivateKey>) -> anyhow::Result<()> {
    let interval = Duration::from_secs(config.cycle_interval_secs);

    notify_ready();

    loop {
        tokio::select! {
            () = run_one_cycle(client, &private_key) => {}
            _ = shutdown_signal() => {
                tracing::info!("shutdown requested, exiting after current cycle");
                return Ok(());
            }
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = shutdown_signal() => {
                tracing::info!("shutdown requested during sleep");
                return Ok(());
            }
        }
    }
}

async fn run_one_cycle(client: &ControlPlaneClient, private_key: &RsaPrivateKey) {
    let spec = match client.fetch_grants().await {
        Ok(spec) => spec,
        Err(err) => {
            tracing::error!("failed to fetch grant specification, skipping cycle: {err:#}");
            return;
        }
    };

    let registry = ConnectionRegistry::build(&spec, private_key).await;
    let checkin = run_cycle(&spec, &registry, private_key).await;

    if let Err(err) = client.send_checkin(&checkin).await {
        tracing::error!("failed to post checkin report: {err:#}");
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(unix)]
fn notify_ready() {
    if let Err(err) = sd_notify::notify(false, &[sd_notify::NotifyState::Ready]) {
        tracing::debug!("sd_notify READY failed (not running under systemd?): {err}");
    }
}

#[cfg(not(unix))]
fn notify_ready() {}
