// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fxhook: provider dashboard and webhook callback receiver.

pub mod config;
pub mod credential;
pub mod error;
pub mod events;
pub mod provider;
pub mod signature;
pub mod state;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::credential::refresher::spawn_refresher;
use crate::state::AppState;
use crate::transport::build_router;

/// Run the server until shutdown.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let refresh_interval = config.refresh_interval();
    let state = Arc::new(AppState::new(config, shutdown.clone())?);

    let _refresher = spawn_refresher(Arc::clone(&state.token), refresh_interval, shutdown.clone());

    // Ctrl-C cancels the token; the refresher and the serve loop both watch it.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
                shutdown.cancel();
            }
        });
    }

    tracing::info!("fxhook listening on {addr}");
    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}
