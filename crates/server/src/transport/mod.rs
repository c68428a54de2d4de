// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + WebSocket transport: dashboard, provider proxy, webhook receiver.

pub mod http;
pub mod ws;

use std::sync::Arc;

use axum::response::Html;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Embedded dashboard HTML.
const DASHBOARD_HTML: &str = include_str!("../web/dashboard.html");

/// Build the axum `Router` with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health + dashboard
        .route("/api/v1/health", get(http::health))
        .route("/", get(|| async { Html(DASHBOARD_HTML) }))
        // Authentication
        .route("/login", get(http::login_redirect))
        .route("/auth/callback", get(http::auth_callback))
        .route("/api/v1/token", get(http::token_status))
        // Provider data
        .route("/api/v1/accounts", get(http::accounts))
        .route("/api/v1/balances", get(http::balances))
        // Webhook subscription management
        .route("/api/v1/webhooks", get(http::list_webhooks).post(http::create_webhook))
        .route("/api/v1/webhooks/types", get(http::webhook_types))
        .route("/api/v1/webhooks/{id}", delete(http::delete_webhook))
        .route("/api/v1/webhooks/{id}/enable", post(http::enable_webhook))
        .route("/api/v1/webhooks/{id}/disable", post(http::disable_webhook))
        .route("/api/v1/webhooks/{id}/ping", post(http::ping_webhook))
        // Raw GraphQL passthrough
        .route("/api/v1/graphql", post(http::graphql_proxy))
        // Provider-facing webhook receiver + live feed
        .route("/callback", post(http::receive_callback))
        .route("/ws/callbacks", get(ws::ws_callbacks))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
