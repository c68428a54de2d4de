// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SECRET: &[u8] = b"webhook-secret";
const URL: &str = "https://dashboard.example.com/callback";
const BODY: &[u8] = br#"{"event":"trade.settled","id":"t-1"}"#;

#[test]
fn digest_matches_reference_vector() -> anyhow::Result<()> {
    // Computed with an independent HMAC-SHA3-256 implementation over the
    // URL bytes followed by the body bytes.
    assert_eq!(
        compute_digest(SECRET, URL, BODY)?,
        "1a8c6e85cf69cfbbd6b886633d2a063fcf49db790acc6fd538b8f7c6b65b413f"
    );
    Ok(())
}

#[test]
fn reference_vector_header_verifies() -> anyhow::Result<()> {
    let header =
        "sha3-256=1a8c6e85cf69cfbbd6b886633d2a063fcf49db790acc6fd538b8f7c6b65b413f";
    verify(SECRET, URL, BODY, Some(header))?;
    Ok(())
}

#[test]
fn digest_is_lowercase_hex() -> anyhow::Result<()> {
    let digest = compute_digest(SECRET, URL, BODY)?;
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    Ok(())
}

#[test]
fn digest_is_deterministic_and_input_sensitive() -> anyhow::Result<()> {
    let d1 = compute_digest(SECRET, URL, BODY)?;
    let d2 = compute_digest(SECRET, URL, BODY)?;
    assert_eq!(d1, d2);
    assert_ne!(d1, compute_digest(SECRET, URL, b"{}")?);
    assert_ne!(d1, compute_digest(SECRET, "https://other.example/callback", BODY)?);
    assert_ne!(d1, compute_digest(b"other-secret", URL, BODY)?);
    Ok(())
}

#[test]
fn valid_header_verifies() -> anyhow::Result<()> {
    let header = format!("sha3-256={}", compute_digest(SECRET, URL, BODY)?);
    verify(SECRET, URL, BODY, Some(&header))?;
    Ok(())
}

#[test]
fn uppercase_hex_verifies() -> anyhow::Result<()> {
    let header = format!("sha3-256={}", compute_digest(SECRET, URL, BODY)?.to_uppercase());
    verify(SECRET, URL, BODY, Some(&header))?;
    Ok(())
}

#[test]
fn altered_body_is_rejected() -> anyhow::Result<()> {
    let header = format!("sha3-256={}", compute_digest(SECRET, URL, BODY)?);
    let err = verify(SECRET, URL, br#"{"event":"tampered"}"#, Some(&header)).unwrap_err();
    assert_eq!(err, SignatureError::Invalid);
    Ok(())
}

#[test]
fn wrong_secret_is_rejected() -> anyhow::Result<()> {
    let header = format!("sha3-256={}", compute_digest(b"other-secret", URL, BODY)?);
    assert_eq!(verify(SECRET, URL, BODY, Some(&header)).unwrap_err(), SignatureError::Invalid);
    Ok(())
}

#[test]
fn missing_header_is_reported() {
    assert_eq!(verify(SECRET, URL, BODY, None).unwrap_err(), SignatureError::Missing);
}

#[test]
fn unknown_scheme_is_malformed() {
    let err = verify(SECRET, URL, BODY, Some("sha256=deadbeef")).unwrap_err();
    assert!(matches!(err, SignatureError::Malformed(_)), "got: {err}");
}

#[test]
fn non_hex_digest_is_malformed() {
    let err = verify(SECRET, URL, BODY, Some("sha3-256=not-hex!")).unwrap_err();
    assert!(matches!(err, SignatureError::Malformed(_)), "got: {err}");
}

#[test]
fn odd_length_digest_is_malformed() {
    let err = verify(SECRET, URL, BODY, Some("sha3-256=abc")).unwrap_err();
    assert!(matches!(err, SignatureError::Malformed(_)), "got: {err}");
}
