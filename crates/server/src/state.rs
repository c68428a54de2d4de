// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::credential::manager::TokenManager;
use crate::events::CallbackHub;
use crate::provider::client::ProviderClient;

/// Shared server state.
pub struct AppState {
    pub config: AppConfig,
    pub token: Arc<TokenManager>,
    pub provider: ProviderClient,
    pub hub: CallbackHub,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: AppConfig, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let token = Arc::new(TokenManager::new(config.auth_settings())?);
        let provider = ProviderClient::new(config.api_url.clone(), Arc::clone(&token))?;
        Ok(Self { config, token, provider, hub: CallbackHub::new(), shutdown })
    }
}

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
