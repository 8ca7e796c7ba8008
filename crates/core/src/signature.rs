//! Webhook signature verification for inbound video-provider events.
//!
//! The provider sends a header of the form `t=<unix seconds>,v1=<hex>` where
//! each `v1` value is the HMAC-SHA256 of `"<t>.<raw body>"` keyed with the
//! shared webhook secret. Several `v1` entries may be present during secret
//! rotation; any one matching is sufficient.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "mux-signature";

/// Maximum accepted age (and clock skew) of a signed delivery, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

/// Reasons a delivery fails verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Missing signature header")]
    MissingHeader,

    #[error("Malformed signature header")]
    Malformed,

    #[error("Signature timestamp {timestamp} is outside the {tolerance_secs}s tolerance")]
    Expired { timestamp: i64, tolerance_secs: i64 },

    #[error("Signature does not match payload")]
    Mismatch,
}

/// Compute the hex-encoded `v1` signature for a body signed at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mac = keyed_mac(secret, timestamp, body);
    hex::encode(mac.finalize().into_bytes())
}

/// Build a complete header value (`t=..,v1=..`) for a body signed at `timestamp`.
pub fn signature_header_value(secret: &str, timestamp: i64, body: &[u8]) -> String {
    format!("t={timestamp},v1={}", compute_signature(secret, timestamp, body))
}

/// Verify a delivery's signature header against the raw body.
///
/// `now` is the current Unix time in seconds; deliveries whose timestamp
/// differs from it by more than `tolerance_secs` are rejected.
pub fn verify_signature(
    secret: &str,
    header: Option<&str>,
    body: &[u8],
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::MissingHeader)?;
    let parsed = parse_header(header)?;

    if (now - parsed.timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Expired {
            timestamp: parsed.timestamp,
            tolerance_secs,
        });
    }

    for candidate in &parsed.signatures {
        let Some(bytes) = hex::decode(candidate) else {
            continue;
        };
        // verify_slice compares in constant time.
        if keyed_mac(secret, parsed.timestamp, body)
            .verify_slice(&bytes)
            .is_ok()
        {
            return Ok(());
        }
    }

    Err(SignatureError::Mismatch)
}

struct ParsedHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Result<ParsedHeader<'_>, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(SignatureError::Malformed)?;
        match key {
            "t" => {
                timestamp = Some(value.parse::<i64>().map_err(|_| SignatureError::Malformed)?);
            }
            "v1" => signatures.push(value),
            // Unknown schemes are ignored.
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(ParsedHeader {
            timestamp,
            signatures,
        }),
        _ => Err(SignatureError::Malformed),
    }
}

fn keyed_mac(secret: &str, timestamp: i64, body: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    mac
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string, returning `None` on odd length or non-hex input.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        let bytes = s.as_bytes();
        if bytes.len() % 2 != 0 {
            return None;
        }
        bytes
            .chunks_exact(2)
            .map(|pair| Some((nibble(pair[0])? << 4) | nibble(pair[1])?))
            .collect()
    }

    /// Value of one hex digit; signs and other characters are rejected.
    fn nibble(c: u8) -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            b'A'..=b'F' => Some(c - b'A' + 10),
            _ => None,
        }
    }
}
