// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider API adapter: balances and webhook subscription management.

pub mod client;

use crate::credential::AuthError;

/// Errors from provider resource calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Non-2xx from a resource endpoint.
    #[error("upstream request failed ({status}): {body}")]
    UpstreamRequestFailed { status: u16, body: String },
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The identity payload granted no client accounts to act for.
    #[error("no authorized client accounts")]
    NoAuthorizedAccounts,
}
