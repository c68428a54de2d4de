// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::credential::AuthSettings;

fn auth_settings(auth_url: &str) -> AuthSettings {
    AuthSettings {
        auth_url: auth_url.to_owned(),
        client_id: "client-1".to_owned(),
        client_secret: "secret-1".to_owned(),
        redirect_url: "http://127.0.0.1:5000/auth/callback".to_owned(),
        login_email: Some("ops@example.com".to_owned()),
        login_password: Some("hunter2".to_owned()),
    }
}

fn make_id_token(clients: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"clients":{clients}}}"#));
    format!("{header}.{payload}.signature")
}

/// Mount login + token mocks granting accounts "A" and "B".
async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(302).insert_header(
            "Location",
            "http://127.0.0.1:5000/auth/callback?code=c&state=fxhook-login",
        ))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-1",
            "refresh_token": "refresh-1",
            "expires_in": 3600,
            "id_token": make_id_token(r#"[{"client_id":"A"},{"client_id":"B"}]"#),
        })))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> ProviderClient {
    let token =
        Arc::new(TokenManager::new(auth_settings(&server.uri())).expect("token manager"));
    ProviderClient::new(server.uri(), token).expect("provider client")
}

#[tokio::test]
async fn balances_fetch_every_account_with_bearer() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/balances"))
        .and(query_param("client_id", "A"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"currency":"EUR"}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/balances"))
        .and(query_param("client_id", "B"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"currency":"USD"}])))
        .expect(1)
        .mount(&server)
        .await;

    let balances = client_for(&server).balances().await?;
    assert_eq!(balances.len(), 2);
    assert_eq!(balances["A"][0]["currency"], "EUR");
    assert_eq!(balances["B"][0]["currency"], "USD");
    Ok(())
}

#[tokio::test]
async fn list_subscriptions_scopes_by_client_header() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/webhooks/graphql"))
        .and(header("x-client-id", "A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "subscriptions": { "totalCount": 1 } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhooks/graphql"))
        .and(header("x-client-id", "B"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "subscriptions": { "totalCount": 0 } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let subs = client_for(&server).list_subscriptions().await?;
    assert_eq!(subs["A"]["data"]["subscriptions"]["totalCount"], 1);
    assert_eq!(subs["B"]["data"]["subscriptions"]["totalCount"], 0);
    Ok(())
}

#[tokio::test]
async fn disable_sends_update_mutation_with_variables() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/webhooks/graphql"))
        .and(header("x-client-id", "A"))
        .and(body_partial_json(serde_json::json!({
            "variables": { "id": "sub-1", "active": false }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "updateSubscription": { "subscription": { "id": "sub-1", "active": false } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let value = client_for(&server).set_subscription_active("sub-1", false).await?;
    assert_eq!(value["data"]["updateSubscription"]["subscription"]["active"], false);
    Ok(())
}

#[tokio::test]
async fn non_2xx_resource_response_is_upstream_failure() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/webhooks/graphql"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client_for(&server).delete_subscription("sub-1").await.unwrap_err();
    match err {
        ProviderError::UpstreamRequestFailed { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => anyhow::bail!("unexpected error: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn mutations_without_accounts_are_rejected() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    // Authenticates fine but the identity payload grants no accounts.
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(302).insert_header(
            "Location",
            "http://127.0.0.1:5000/auth/callback?code=c&state=fxhook-login",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-1",
            "expires_in": 3600,
            "id_token": make_id_token("[]"),
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).ping_subscription("sub-1").await.unwrap_err();
    assert!(matches!(err, ProviderError::NoAuthorizedAccounts), "got: {err}");
    Ok(())
}
