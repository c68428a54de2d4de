// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic background task that keeps the shared credential warm.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::credential::manager::TokenManager;

/// Spawn the background refresher.
///
/// Calls `ensure_valid()` on every tick so the first request after a quiet
/// period does not pay the exchange latency. An exchange failure is logged
/// and retried on the next tick; the loop exits when `cancel` fires, letting
/// an in-flight exchange finish rather than aborting it.
pub fn spawn_refresher(
    manager: Arc<TokenManager>,
    interval: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if let Err(e) = manager.ensure_valid().await {
                tracing::warn!(err = %e, "background token refresh failed");
            }
        }
    })
}
