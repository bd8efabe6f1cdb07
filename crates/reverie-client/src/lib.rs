//! # reverie-client
//!
//! Embeddable facade for the Reverie dream journal: configuration, logging,
//! the shared [`AppState`] and the command functions a host UI invokes.

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use reverie_ai::CancellationToken;
pub use state::AppState;

/// Install the global `tracing` subscriber.  Later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("reverie_client=debug,reverie_ai=debug,reverie_store=info,warn")
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Initialise logging, read the environment and open application state.
pub fn bootstrap() -> anyhow::Result<AppState> {
    init_tracing();

    let config = ClientConfig::from_env();
    tracing::info!(?config, "starting Reverie");
    if config.api_key.is_none() {
        tracing::warn!("no API key configured; completion requests will be unauthenticated");
    }

    AppState::open(config).context("failed to open application state")
}
