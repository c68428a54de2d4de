// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the dashboard API and the webhook receiver.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::events::CallbackEvent;
use crate::provider::ProviderError;
use crate::signature;
use crate::state::{epoch_ms, AppState};

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub callbacks_received: usize,
}

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWebhookRequest {
    /// Defaults to the first authorized account.
    #[serde(default)]
    pub client_id: Option<String>,
    pub url: String,
    pub types: Vec<String>,
    pub secret: String,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        callbacks_received: s.hub.count().await,
    })
}

/// `GET /login` — send the operator's browser to the provider's hosted login.
pub async fn login_redirect(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Redirect::temporary(&s.token.authorize_url())
}

/// `GET /auth/callback` — complete the browser login flow.
pub async fn auth_callback(
    State(s): State<Arc<AppState>>,
    Query(query): Query<AuthCallbackQuery>,
) -> impl IntoResponse {
    tracing::debug!(state = ?query.state, "auth callback hit");
    let Some(code) = query.code else {
        return ApiError::BadRequest
            .to_http_response("missing authorization code")
            .into_response();
    };
    match s.token.complete_login(&code).await {
        Ok(()) => {
            tracing::info!("operator login completed");
            Redirect::temporary("/").into_response()
        }
        // The code came from the operator's browser redirect, so a rejection
        // is their input being refused, not an upstream outage.
        Err(e) => ApiError::Unauthorized.to_http_response(e.to_string()).into_response(),
    }
}

/// `GET /api/v1/token` — current credential status.
pub async fn token_status(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(s.token.status().await)
}

/// `GET /api/v1/accounts` — authorized client accounts.
pub async fn accounts(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(s.token.authorized_accounts().await)
}

/// `GET /api/v1/balances` — balances for every authorized account.
pub async fn balances(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    match s.provider.balances().await {
        Ok(balances) => Json(serde_json::Value::Object(balances)).into_response(),
        Err(e) => provider_error_response(e),
    }
}

/// `GET /api/v1/webhooks` — subscriptions for every authorized account.
pub async fn list_webhooks(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    match s.provider.list_subscriptions().await {
        Ok(subs) => Json(serde_json::Value::Object(subs)).into_response(),
        Err(e) => provider_error_response(e),
    }
}

/// `POST /api/v1/webhooks` — create a subscription.
pub async fn create_webhook(
    State(s): State<Arc<AppState>>,
    Json(req): Json<CreateWebhookRequest>,
) -> impl IntoResponse {
    let client_id = match req.client_id {
        Some(id) => id,
        None => {
            // Fall back to the first authorized account, matching the other
            // subscription mutations.
            match s.token.authorized_accounts().await.into_iter().next() {
                Some(account) => account.client_id,
                None => {
                    return ApiError::BadRequest
                        .to_http_response("no client_id given and no authorized accounts")
                        .into_response()
                }
            }
        }
    };
    match s.provider.create_subscription(&client_id, &req.url, &req.types, &req.secret).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => provider_error_response(e),
    }
}

/// `POST /api/v1/webhooks/{id}/enable`
pub async fn enable_webhook(
    State(s): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match s.provider.set_subscription_active(&id, true).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => provider_error_response(e),
    }
}

/// `POST /api/v1/webhooks/{id}/disable`
pub async fn disable_webhook(
    State(s): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match s.provider.set_subscription_active(&id, false).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => provider_error_response(e),
    }
}

/// `DELETE /api/v1/webhooks/{id}`
pub async fn delete_webhook(
    State(s): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match s.provider.delete_subscription(&id).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => provider_error_response(e),
    }
}

/// `POST /api/v1/webhooks/{id}/ping`
pub async fn ping_webhook(
    State(s): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match s.provider.ping_subscription(&id).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => provider_error_response(e),
    }
}

/// `GET /api/v1/webhooks/types` — available subscription event types.
pub async fn webhook_types(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    match s.provider.subscription_types().await {
        Ok(value) => Json(value).into_response(),
        Err(e) => provider_error_response(e),
    }
}

/// `POST /api/v1/graphql` — forward a raw GraphQL document to the provider.
pub async fn graphql_proxy(
    State(s): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    match s.provider.graphql_raw(body).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => provider_error_response(e),
    }
}

/// `POST /callback` — provider webhook receiver.
///
/// The signature is verified but a mismatch does not reject the delivery:
/// the event is recorded and flagged so the operator can see it on the
/// live feed.
pub async fn receive_callback(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let header = headers.get(signature::SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let signed_url = s.config.callback_url();
    let signature_valid = match signature::verify(
        s.config.webhook_secret.as_bytes(),
        &signed_url,
        &body,
        header,
    ) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(err = %e, "callback signature rejected");
            false
        }
    };

    let data: serde_json::Value =
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    let event = CallbackEvent {
        id: uuid::Uuid::new_v4().to_string(),
        received_at_ms: epoch_ms(),
        signature_valid,
        body: data.clone(),
    };
    tracing::info!(event_id = %event.id, signature_valid, "webhook callback received");
    s.hub.publish(event).await;

    Json(serde_json::json!({ "status": "success", "data": data }))
}

/// Map a provider failure onto the API error envelope.
fn provider_error_response(err: ProviderError) -> axum::response::Response {
    match &err {
        ProviderError::Auth(_) => ApiError::AuthFailed.to_http_response(err.to_string()),
        ProviderError::NoAuthorizedAccounts => {
            ApiError::BadRequest.to_http_response(err.to_string())
        }
        ProviderError::UpstreamRequestFailed { .. } | ProviderError::Transport(_) => {
            ApiError::UpstreamError.to_http_response(err.to_string())
        }
    }
    .into_response()
}
