// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identity payload decoding for the provider's `id_token`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::credential::{AuthError, ClientAccount};

/// Decode the `clients` list from an OpenID Connect `id_token`.
///
/// The token is a three-part dot-separated string whose middle segment is a
/// base64url JSON payload. Padding is stripped before decoding since the
/// provider emits both padded and unpadded segments.
pub fn decode_identity(id_token: &str) -> Result<Vec<ClientAccount>, AuthError> {
    let payload = id_token.split('.').nth(1).ok_or_else(|| {
        AuthError::MalformedIdentityPayload("id_token is not a three-part token".into())
    })?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::MalformedIdentityPayload(format!("base64 decode: {e}")))?;

    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::MalformedIdentityPayload(format!("payload is not JSON: {e}")))?;

    let clients = value.get("clients").cloned().ok_or_else(|| {
        AuthError::MalformedIdentityPayload("payload has no clients list".into())
    })?;

    serde_json::from_value(clients)
        .map_err(|e| AuthError::MalformedIdentityPayload(format!("clients list: {e}")))
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
