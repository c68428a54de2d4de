// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential lifecycle: the shared provider token, its staleness rules,
//! and the refresh discipline that keeps it valid.

pub mod identity;
pub mod manager;
pub mod refresher;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Seconds subtracted from the server-declared expiry so the record goes
/// stale slightly before the provider actually invalidates the token.
pub const REFRESH_MARGIN_SECS: u64 = 60;

/// One client account the authenticated user may act on behalf of,
/// decoded from the identity payload of the `id_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAccount {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

/// The process-wide credential record.
///
/// Created empty at startup and replaced wholesale by every successful
/// exchange; a failed exchange never touches it.
#[derive(Debug, Default)]
pub struct CredentialRecord {
    pub access_token: Option<String>,
    /// Absence forces a fresh login rather than a refresh.
    pub refresh_token: Option<String>,
    /// Epoch seconds; the record is stale at or after this instant.
    pub expires_at: u64,
    /// Ordered list from the identity payload; replaced, never merged.
    pub authorized_accounts: Vec<ClientAccount>,
}

impl CredentialRecord {
    /// Return the access token if it is still fresh at `now`.
    pub fn fresh_token(&self, now: u64) -> Option<&str> {
        match &self.access_token {
            Some(token) if now < self.expires_at => Some(token),
            _ => None,
        }
    }
}

/// Provider token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

/// Provider authentication settings for the token manager.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Authentication base URL (`login`, `token`, `authorize` live here).
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// OpenID Connect redirect URL registered with the provider.
    pub redirect_url: String,
    /// Host-to-host login email. If unset, the browser flow is required.
    pub login_email: Option<String>,
    pub login_password: Option<String>,
}

/// Errors from the token lifecycle manager.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider rejected a login or token exchange.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    /// The `id_token` identity payload was missing or undecodable.
    #[error("malformed identity payload: {0}")]
    MalformedIdentityPayload(String),
    /// The HTTP client could not be built at startup.
    #[error("http client init failed: {0}")]
    ClientInit(#[from] reqwest::Error),
}

/// Compute the staleness deadline for a freshly issued token.
pub fn expiry_deadline(now: u64, expires_in: u64) -> u64 {
    (now + expires_in).saturating_sub(REFRESH_MARGIN_SECS)
}

/// Current epoch seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Build a URL-encoded query string.
pub fn urlencoded(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding(k), urlencoding(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn urlencoding(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => c.to_string(),
            _ => format!("%{:02X}", c as u8),
        })
        .collect()
}

/// Join a base URL and a path segment, normalizing slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
