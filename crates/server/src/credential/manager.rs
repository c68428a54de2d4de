// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token lifecycle manager: login-or-refresh exchange under an exclusive lock.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::credential::identity::decode_identity;
use crate::credential::{
    epoch_secs, expiry_deadline, join_url, urlencoded, AuthError, AuthSettings, ClientAccount,
    CredentialRecord, TokenResponse,
};

/// Fixed `state` value for the host-to-host login handshake. The code is
/// exchanged immediately over the same connection, so the parameter only
/// satisfies the endpoint's requirement that one be present.
const LOGIN_STATE: &str = "fxhook-login";

/// Owns the process-wide credential record and performs exchanges with the
/// provider's authentication endpoint.
///
/// Reads (`status`, `authorized_accounts`) go through the record's `RwLock`
/// and never wait on an in-flight exchange. Exchanges serialize on a separate
/// mutex: a caller that waited re-checks freshness after acquiring it, so at
/// most one exchange hits the provider per staleness episode.
pub struct TokenManager {
    record: RwLock<CredentialRecord>,
    /// Held for the full duration of a login or refresh exchange.
    exchange_lock: Mutex<()>,
    settings: AuthSettings,
    http: reqwest::Client,
}

impl TokenManager {
    pub fn new(settings: AuthSettings) -> Result<Self, AuthError> {
        // Redirects stay disabled so the login handshake's 302 can be read.
        // A client that cannot be built this way is a startup failure, not
        // something to paper over with a redirect-following default.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            record: RwLock::new(CredentialRecord::default()),
            exchange_lock: Mutex::new(()),
            settings,
            http,
        })
    }

    /// Return a valid access token, performing a login or refresh exchange
    /// if the record is stale. No network calls happen while it is fresh.
    pub async fn ensure_valid(&self) -> Result<String, AuthError> {
        if let Some(token) = self.record.read().await.fresh_token(epoch_secs()) {
            return Ok(token.to_owned());
        }

        let _guard = self.exchange_lock.lock().await;

        // Another caller may have completed the exchange while we waited.
        if let Some(token) = self.record.read().await.fresh_token(epoch_secs()) {
            return Ok(token.to_owned());
        }

        let refresh_token = self.record.read().await.refresh_token.clone();
        let response = match refresh_token {
            Some(refresh) => self.exchange_refresh(&refresh).await?,
            None => {
                let code = self.password_login().await?;
                self.exchange_code(&code).await?
            }
        };

        let token = response.access_token.clone();
        self.apply(response).await?;
        Ok(token)
    }

    /// Complete the OAuth browser-redirect flow with an externally supplied
    /// authorization code.
    pub async fn complete_login(&self, code: &str) -> Result<(), AuthError> {
        let _guard = self.exchange_lock.lock().await;
        let response = self.exchange_code(code).await?;
        self.apply(response).await
    }

    /// Provider authorize URL for the browser-redirect login flow.
    pub fn authorize_url(&self) -> String {
        let query = urlencoded(&[
            ("client_id", self.settings.client_id.as_str()),
            ("redirect_uri", self.settings.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", "openid"),
            ("state", LOGIN_STATE),
        ]);
        format!("{}?{}", join_url(&self.settings.auth_url, "authorize"), query)
    }

    /// Snapshot of the authorized accounts list.
    pub async fn authorized_accounts(&self) -> Vec<ClientAccount> {
        self.record.read().await.authorized_accounts.clone()
    }

    /// Status summary for the dashboard.
    pub async fn status(&self) -> TokenStatus {
        let record = self.record.read().await;
        let now = epoch_secs();
        TokenStatus {
            authenticated: record.fresh_token(now).is_some(),
            expires_in_secs: (record.expires_at > now).then(|| record.expires_at - now),
            has_refresh_token: record.refresh_token.is_some(),
            account_count: record.authorized_accounts.len(),
        }
    }

    /// Replace the record wholesale from a successful token response.
    ///
    /// The identity payload is decoded before any field is written, so a
    /// malformed response leaves the record untouched.
    async fn apply(&self, response: TokenResponse) -> Result<(), AuthError> {
        let id_token = response.id_token.as_deref().ok_or_else(|| {
            AuthError::MalformedIdentityPayload("token response has no id_token".into())
        })?;
        let accounts = decode_identity(id_token)?;

        let mut record = self.record.write().await;
        record.access_token = Some(response.access_token);
        record.refresh_token = response.refresh_token;
        record.expires_at = expiry_deadline(epoch_secs(), response.expires_in);
        record.authorized_accounts = accounts;
        Ok(())
    }

    /// Bypass the provider's hosted login page with configured credentials.
    ///
    /// The endpoint answers a successful form login with a 302 whose
    /// `Location` query string carries the authorization code.
    async fn password_login(&self) -> Result<String, AuthError> {
        let (email, password) = match (&self.settings.login_email, &self.settings.login_password) {
            (Some(e), Some(p)) => (e.clone(), p.clone()),
            _ => {
                return Err(AuthError::AuthenticationFailed(
                    "no login credentials configured; authenticate via the /login flow".into(),
                ))
            }
        };

        let url = join_url(&self.settings.auth_url, "login");
        let resp = self
            .http
            .post(&url)
            .form(&[
                ("email", email.as_str()),
                ("password", password.as_str()),
                ("client_id", self.settings.client_id.as_str()),
                ("state", LOGIN_STATE),
            ])
            .send()
            .await
            .map_err(|e| AuthError::AuthenticationFailed(format!("login request failed: {e}")))?;

        // A 200 here means the account needs the hosted login page (2FA);
        // only the 302 handshake works host-to-host.
        if resp.status() != reqwest::StatusCode::FOUND {
            return Err(AuthError::AuthenticationFailed(format!(
                "unexpected login status {} (host-to-host login requires a 302 redirect)",
                resp.status()
            )));
        }

        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AuthError::AuthenticationFailed("login redirect has no Location header".into())
            })?;

        extract_code(location).ok_or_else(|| {
            AuthError::AuthenticationFailed("no authorization code in login redirect".into())
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.settings.redirect_url.as_str()),
        ])
        .await
    }

    async fn exchange_refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    /// POST to the token endpoint with Basic client authentication.
    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let url = join_url(&self.settings.auth_url, "token");
        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| AuthError::AuthenticationFailed(format!("token request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::AuthenticationFailed(format!(
                "token exchange rejected ({status}): {body}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| AuthError::AuthenticationFailed(format!("malformed token response: {e}")))
    }
}

/// Token state reported on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct TokenStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_secs: Option<u64>,
    pub has_refresh_token: bool,
    pub account_count: usize,
}

/// Pull the `code` query parameter out of a redirect URL.
fn extract_code(location: &str) -> Option<String> {
    let query = location.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| pair.strip_prefix("code=").map(str::to_owned))
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
