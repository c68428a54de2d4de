// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the provider's REST and GraphQL surfaces.
//!
//! Every call fetches a valid access token first and attaches it as a bearer
//! credential. GraphQL documents use variables rather than spliced arguments
//! so operator input never reaches the query text.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::credential::manager::TokenManager;
use crate::provider::ProviderError;

const SUBSCRIPTIONS_QUERY: &str = "{ subscriptions { totalCount nodes { id clientId createdAt url active types } } }";

const CREATE_SUBSCRIPTION: &str = "mutation($url: String!, $types: [WebhookType!]!, $secret: String!) { createSubscription(input: {subscription: {url: $url, types: $types, active: true, secret: $secret}}) { subscription { id url types active } } }";

const UPDATE_ACTIVE: &str = "mutation($id: ID!, $active: Boolean!) { updateSubscription(input: {id: $id, patch: {active: $active}}) { subscription { id active } } }";

const DELETE_SUBSCRIPTION: &str =
    "mutation($id: ID!) { deleteSubscription(input: {id: $id}) { subscription { id } } }";

const PING_SUBSCRIPTION: &str =
    "mutation($id: ID!) { pingSubscription(input: {id: $id}) { subscription { id } } }";

const TYPES_QUERY: &str =
    "{ __type(name: \"WebhookType\") { name enumValues { name } } webhookTypes }";

/// Client for one provider environment.
pub struct ProviderClient {
    api_url: String,
    token: Arc<TokenManager>,
    http: reqwest::Client,
}

impl ProviderClient {
    pub fn new(api_url: String, token: Arc<TokenManager>) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { api_url: api_url.trim_end_matches('/').to_owned(), token, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    /// Balances for every authorized account, keyed by client id.
    pub async fn balances(&self) -> Result<Map<String, Value>, ProviderError> {
        let token = self.token.ensure_valid().await?;
        let mut out = Map::new();
        for account in self.token.authorized_accounts().await {
            let resp = self
                .http
                .get(self.url("balances"))
                .query(&[("client_id", account.client_id.as_str())])
                .bearer_auth(&token)
                .send()
                .await?;
            out.insert(account.client_id, read_json(resp).await?);
        }
        Ok(out)
    }

    /// Webhook subscriptions for every authorized account, keyed by client id.
    pub async fn list_subscriptions(&self) -> Result<Map<String, Value>, ProviderError> {
        self.token.ensure_valid().await?;
        let mut out = Map::new();
        for account in self.token.authorized_accounts().await {
            let value = self
                .graphql_as(&account.client_id, &json!({ "query": SUBSCRIPTIONS_QUERY }))
                .await?;
            out.insert(account.client_id, value);
        }
        Ok(out)
    }

    /// Create a subscription for one client account (active from the start).
    pub async fn create_subscription(
        &self,
        client_id: &str,
        url: &str,
        types: &[String],
        secret: &str,
    ) -> Result<Value, ProviderError> {
        let body = json!({
            "query": CREATE_SUBSCRIPTION,
            "variables": { "url": url, "types": types, "secret": secret },
        });
        self.graphql_as(client_id, &body).await
    }

    /// Flip a subscription's `active` flag.
    pub async fn set_subscription_active(
        &self,
        id: &str,
        active: bool,
    ) -> Result<Value, ProviderError> {
        let body = json!({
            "query": UPDATE_ACTIVE,
            "variables": { "id": id, "active": active },
        });
        self.graphql_default(&body).await
    }

    /// Delete a subscription. Provider-side flakiness here surfaces as an
    /// ordinary upstream failure; there are no repair semantics.
    pub async fn delete_subscription(&self, id: &str) -> Result<Value, ProviderError> {
        let body = json!({
            "query": DELETE_SUBSCRIPTION,
            "variables": { "id": id },
        });
        self.graphql_default(&body).await
    }

    /// Ask the provider to deliver a test event to a subscription.
    pub async fn ping_subscription(&self, id: &str) -> Result<Value, ProviderError> {
        let body = json!({
            "query": PING_SUBSCRIPTION,
            "variables": { "id": id },
        });
        self.graphql_default(&body).await
    }

    /// Enumerate the event types a subscription can be created for.
    pub async fn subscription_types(&self) -> Result<Value, ProviderError> {
        self.graphql_default(&json!({ "query": TYPES_QUERY })).await
    }

    /// Forward an operator-supplied GraphQL document unchanged.
    pub async fn graphql_raw(&self, body: Value) -> Result<Value, ProviderError> {
        self.graphql_default(&body).await
    }

    /// GraphQL call scoped to a specific client account via `X-Client-ID`.
    async fn graphql_as(&self, client_id: &str, body: &Value) -> Result<Value, ProviderError> {
        let token = self.token.ensure_valid().await?;
        let resp = self
            .http
            .post(self.url("webhooks/graphql"))
            .bearer_auth(&token)
            .header("X-Client-ID", client_id)
            .json(body)
            .send()
            .await?;
        read_json(resp).await
    }

    /// GraphQL call issued as the first authorized account. Subscription
    /// mutations are accepted from any client the user may act for.
    async fn graphql_default(&self, body: &Value) -> Result<Value, ProviderError> {
        // Exchange first: the accounts list is only populated by a
        // successful exchange.
        self.token.ensure_valid().await?;
        let account = self
            .token
            .authorized_accounts()
            .await
            .into_iter()
            .next()
            .ok_or(ProviderError::NoAuthorizedAccounts)?;
        self.graphql_as(&account.client_id, body).await
    }
}

/// Turn a provider response into JSON, mapping non-2xx to a typed failure.
async fn read_json(resp: reqwest::Response) -> Result<Value, ProviderError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::UpstreamRequestFailed { status: status.as_u16(), body });
    }
    let bytes = resp.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| ProviderError::UpstreamRequestFailed {
        status: status.as_u16(),
        body: format!("invalid JSON in response: {e}"),
    })
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
