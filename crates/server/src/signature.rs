// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook callback signature verification.
//!
//! The provider signs each delivery with HMAC-SHA3-256 over the external
//! callback URL concatenated with the raw request body, and sends the hex
//! digest in an `X-EBURY-SIGNATURE: sha3-256=<hex>` header.

use hmac::{Hmac, Mac};
use sha3::Sha3_256;

type HmacSha3 = Hmac<Sha3_256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "X-EBURY-SIGNATURE";

const SCHEME_PREFIX: &str = "sha3-256=";

/// Signature verification failures. A failure is reported, not fatal:
/// the callback is still accepted and flagged for the operator.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing {SIGNATURE_HEADER} header")]
    Missing,
    #[error("malformed signature header: {0}")]
    Malformed(String),
    #[error("signature mismatch")]
    Invalid,
}

/// Verify a signature header against the signed URL and raw body.
///
/// The digest comparison is constant-time via `Mac::verify_slice`.
pub fn verify(
    secret: &[u8],
    url: &str,
    body: &[u8],
    header: Option<&str>,
) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;
    let hex = header
        .strip_prefix(SCHEME_PREFIX)
        .ok_or_else(|| SignatureError::Malformed(format!("expected {SCHEME_PREFIX}<hex>")))?;
    let claimed = hex_decode(hex)
        .ok_or_else(|| SignatureError::Malformed("signature is not hex".into()))?;

    let mut mac = hmac_for(secret)?;
    mac.update(url.as_bytes());
    mac.update(body);
    mac.verify_slice(&claimed).map_err(|_| SignatureError::Invalid)
}

/// Compute the hex digest the provider would send for `url` + `body`.
pub fn compute_digest(secret: &[u8], url: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = hmac_for(secret)?;
    mac.update(url.as_bytes());
    mac.update(body);
    Ok(hex_encode(&mac.finalize().into_bytes()))
}

fn hmac_for(secret: &[u8]) -> Result<HmacSha3, SignatureError> {
    // HMAC accepts keys of any length, so this only fails on an empty-key
    // misconfiguration class of problem the caller should hear about.
    HmacSha3::new_from_slice(secret)
        .map_err(|e| SignatureError::Malformed(format!("hmac key: {e}")))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| s.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
