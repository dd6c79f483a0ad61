//! Logging setup (spec §9 "Global state" design note): the core never
//! touches a process-wide logger directly, it only calls `tracing` macros.
//! This module is the one place that decides how those events are rendered.

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Installs the global `tracing` subscriber. Honors `RUST_LOG` when set;
/// otherwise falls back to `default_level` (typically driven by `-v`/`-q`
/// on the CLI).
pub fn init(default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_line_number(cfg!(debug_assertions))
            .with_target(cfg!(debug_assertions))
            .with_thread_ids(false)
            .with_thread_names(false),
    );

    tracing::subscriber::set_global_default(subscriber).context("failed to set global default tracing subscriber")
}
