// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::credential::AuthSettings;

/// Configuration for the fxhook server.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "fxhook", about = "Provider dashboard and webhook callback receiver")]
pub struct AppConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "FXHOOK_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 5000, env = "FXHOOK_PORT")]
    pub port: u16,

    /// Provider authentication base URL.
    #[arg(long, default_value = "https://auth-sandbox.ebury.io/", env = "FXHOOK_AUTH_URL")]
    pub auth_url: String,

    /// Provider API base URL.
    #[arg(long, default_value = "https://sandbox.ebury.io/", env = "FXHOOK_API_URL")]
    pub api_url: String,

    /// OAuth client id registered with the provider.
    #[arg(long, env = "FXHOOK_AUTH_CLIENT_ID")]
    pub auth_client_id: String,

    /// OAuth client secret.
    #[arg(long, env = "FXHOOK_AUTH_CLIENT_SECRET")]
    pub auth_client_secret: String,

    /// OpenID Connect redirect URL; must match the provider registration.
    #[arg(
        long,
        default_value = "http://127.0.0.1:5000/auth/callback",
        env = "FXHOOK_REDIRECT_URL"
    )]
    pub redirect_url: String,

    /// Login email for the host-to-host flow. Unset means the operator must
    /// authenticate through the browser /login flow.
    #[arg(long, env = "FXHOOK_LOGIN_EMAIL")]
    pub login_email: Option<String>,

    /// Login password for the host-to-host flow.
    #[arg(long, env = "FXHOOK_LOGIN_PASSWORD")]
    pub login_password: Option<String>,

    /// Shared secret used to verify webhook callback signatures.
    #[arg(long, env = "FXHOOK_WEBHOOK_SECRET")]
    pub webhook_secret: String,

    /// External base URL the provider delivers callbacks to. The signature
    /// covers this URL, not the address we happen to be bound on.
    #[arg(long, default_value = "http://127.0.0.1:5000", env = "FXHOOK_PUBLIC_URL")]
    pub public_url: String,

    /// Background token refresh interval in seconds.
    #[arg(long, default_value_t = 30, env = "FXHOOK_REFRESH_INTERVAL_SECS")]
    pub refresh_interval_secs: u64,
}

impl AppConfig {
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval_secs)
    }

    /// The externally visible callback URL, as signed by the provider.
    pub fn callback_url(&self) -> String {
        format!("{}/callback", self.public_url.trim_end_matches('/'))
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            auth_url: self.auth_url.clone(),
            client_id: self.auth_client_id.clone(),
            client_secret: self.auth_client_secret.clone(),
            redirect_url: self.redirect_url.clone(),
            login_email: self.login_email.clone(),
            login_password: self.login_password.clone(),
        }
    }
}
