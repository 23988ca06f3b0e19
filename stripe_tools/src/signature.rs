//! Webhook signature verification.
//!
//! Stripe signs every webhook delivery with a `Stripe-Signature` header of the form `t=<unix time>,v1=<hex hmac>`,
//! where the HMAC-SHA256 is computed over `"<t>.<raw body>"` with the endpoint's webhook secret as the key. The
//! header may carry several `v1` entries while a secret is being rotated; a delivery is valid if any of them match.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("The signature header has no timestamp")]
    MissingTimestamp,
    #[error("The signature header has no v1 signature")]
    MissingSignature,
    #[error("The signature timestamp is not a unix time: {0}")]
    InvalidTimestamp(String),
    #[error("The signature timestamp is more than {0}s old")]
    StaleTimestamp(i64),
    #[error("The signature does not match the payload")]
    SignatureMismatch,
}

/// Checks a `Stripe-Signature` header value against the raw request body.
///
/// `tolerance` is the maximum age of the signature timestamp in seconds; deliveries older than that are rejected
/// as replays even when the HMAC itself is valid. A tolerance of zero disables the age check.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::with_capacity(1);
    for field in header.split(',') {
        match field.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {},
        }
    }
    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    let timestamp =
        timestamp.parse::<i64>().map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_string()))?;
    if tolerance > 0 && chrono::Utc::now().timestamp() - timestamp > tolerance {
        return Err(SignatureError::StaleTimestamp(tolerance));
    }
    let expected = sign_payload(payload, secret, timestamp);
    if signatures.iter().any(|sig| *sig == expected) {
        Ok(())
    } else {
        Err(SignatureError::SignatureMismatch)
    }
}

/// Computes the hex HMAC-SHA256 signature for a payload, as Stripe would. Useful for signing test deliveries.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";
    const PAYLOAD: &[u8] = b"{\"type\":\"payment_intent.succeeded\"}";

    fn signed_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
        format!("t={timestamp},v1={}", sign_payload(payload, secret, timestamp))
    }

    #[test]
    fn a_valid_signature_is_accepted() {
        let now = chrono::Utc::now().timestamp();
        let header = signed_header(PAYLOAD, SECRET, now);
        assert_eq!(verify_webhook_signature(PAYLOAD, &header, SECRET, 300), Ok(()));
    }

    #[test]
    fn a_signature_from_the_wrong_secret_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        let header = signed_header(PAYLOAD, "whsec_wrong_secret", now);
        assert_eq!(verify_webhook_signature(PAYLOAD, &header, SECRET, 300), Err(SignatureError::SignatureMismatch));
    }

    #[test]
    fn a_modified_payload_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        let header = signed_header(PAYLOAD, SECRET, now);
        let tampered = b"{\"type\":\"payment_intent.succeeded\",\"amount\":1}";
        assert_eq!(verify_webhook_signature(tampered, &header, SECRET, 300), Err(SignatureError::SignatureMismatch));
    }

    #[test]
    fn an_old_timestamp_is_rejected_as_a_replay() {
        // 10 minutes ago, beyond the 5 minute tolerance
        let stale = chrono::Utc::now().timestamp() - 600;
        let header = signed_header(PAYLOAD, SECRET, stale);
        assert_eq!(verify_webhook_signature(PAYLOAD, &header, SECRET, 300), Err(SignatureError::StaleTimestamp(300)));
    }

    #[test]
    fn a_zero_tolerance_disables_the_age_check() {
        let stale = chrono::Utc::now().timestamp() - 600;
        let header = signed_header(PAYLOAD, SECRET, stale);
        assert_eq!(verify_webhook_signature(PAYLOAD, &header, SECRET, 0), Ok(()));
    }

    #[test]
    fn a_header_without_a_timestamp_is_rejected() {
        let header = "v1=74b9a1e3e318f0b22e64b3b47d8dbf7a4e8b16f6b2f05ab9c8b94fdbd2a897f1";
        assert_eq!(verify_webhook_signature(PAYLOAD, header, SECRET, 300), Err(SignatureError::MissingTimestamp));
    }

    #[test]
    fn a_header_without_a_signature_is_rejected() {
        let header = "t=1712345678";
        assert_eq!(verify_webhook_signature(PAYLOAD, header, SECRET, 300), Err(SignatureError::MissingSignature));
    }

    #[test]
    fn a_garbage_timestamp_is_rejected() {
        let header = "t=yesterday,v1=deadbeef";
        assert_eq!(
            verify_webhook_signature(PAYLOAD, header, SECRET, 300),
            Err(SignatureError::InvalidTimestamp("yesterday".to_string()))
        );
    }

    #[test]
    fn any_matching_v1_entry_is_enough() {
        // Secret rotations put the signatures from both secrets in the header.
        let now = chrono::Utc::now().timestamp();
        let old = sign_payload(PAYLOAD, "whsec_retired_secret", now);
        let current = sign_payload(PAYLOAD, SECRET, now);
        let header = format!("t={now},v1={old},v1={current}");
        assert_eq!(verify_webhook_signature(PAYLOAD, &header, SECRET, 300), Ok(()));
    }
}
