//! Stripe signature verification.
//!
//! The `stripe-signature` header carries `t=<unix seconds>` and one or more
//! `v1=<hex hmac>` entries. The signed payload is `{t}.{raw body}`, keyed
//! with the endpoint's shared secret (HMAC-SHA256). Timestamps outside the
//! tolerance window are rejected to blunt replay of captured requests.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur verifying a signature header.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,

    #[error("signature timestamp outside tolerance window")]
    Stale,

    #[error("no signature matched the payload")]
    NoMatch,
}

/// Parsed `stripe-signature` header.
#[derive(Debug)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<String>,
}

/// Parse the comma-separated `k=v` header format.
pub fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            return Err(SignatureError::Malformed);
        };
        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| SignatureError::Malformed)?);
            }
            "v1" => signatures.push(value.to_string()),
            // Unknown schemes (v0, future versions) are ignored.
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed);
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Compute the hex signature for `{timestamp}.{payload}`.
pub fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a header against the payload.
pub fn verify(
    secret: &str,
    header: &str,
    payload: &[u8],
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let parsed = parse_header(header)?;

    let age = (Utc::now().timestamp() - parsed.timestamp).abs();
    if age > tolerance_secs {
        return Err(SignatureError::Stale);
    }

    for candidate in &parsed.signatures {
        let Ok(candidate_bytes) = hex::decode(candidate) else {
            continue;
        };
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
        mac.update(parsed.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        // Constant-time comparison via the MAC itself.
        if mac.verify_slice(&candidate_bytes).is_ok() {
            return Ok(());
        }
    }
    Err(SignatureError::NoMatch)
}
