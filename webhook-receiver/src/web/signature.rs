//! Webhook signature verification.
//!
//! Senders sign the raw request body with HMAC-SHA256 using the shared
//! secret and send:
//! - `X-Webhook-Signature`: lowercase hex digest of the body
//! - `X-Webhook-Timestamp`: RFC 3339 time the webhook was sent
//!
//! Verification runs over the exact bytes received, before any decoding.

use std::time::Duration;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Default freshness window (5 minutes).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);

/// Reasons a request fails the signature gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Missing X-Webhook-Signature header")]
    MissingSignature,

    #[error("Missing X-Webhook-Timestamp header")]
    MissingTimestamp,

    #[error("Invalid timestamp format")]
    InvalidTimestampFormat,

    #[error("Webhook timestamp too old")]
    StaleTimestamp,

    #[error("Invalid signature")]
    SignatureMismatch,
}

impl SignatureError {
    /// Every signature failure is a 401.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

/// Verifies webhook signatures against a shared secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    max_age: Duration,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl SignatureVerifier {
    /// Create a verifier for `secret` accepting timestamps at most `max_age`
    /// away from the current time.
    pub fn new(secret: impl Into<String>, max_age: Duration) -> Self {
        Self {
            secret: secret.into(),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Run the full check against the current time.
    pub fn verify(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        self.verify_at(Utc::now(), signature, timestamp, body)
    }

    /// Run the full check as of `now`.
    pub fn verify_at(
        &self,
        now: DateTime<Utc>,
        signature: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        let signature = self.check_timestamp(now, signature, timestamp)?;
        self.verify_signature(body, signature)
    }

    /// Header-only part of the check: presence of both headers and timestamp
    /// freshness. Returns the signature to verify against the body.
    ///
    /// A timestamp exactly `max_age` away is still accepted. Timestamps in the
    /// future are held to the same window.
    pub fn check_timestamp<'a>(
        &self,
        now: DateTime<Utc>,
        signature: Option<&'a str>,
        timestamp: Option<&str>,
    ) -> Result<&'a str, SignatureError> {
        let signature = signature.ok_or(SignatureError::MissingSignature)?;
        let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;

        let sent_at = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|_| {
                warn!(timestamp = %timestamp, "webhook_signature_invalid_timestamp");
                SignatureError::InvalidTimestampFormat
            })?
            .with_timezone(&Utc);

        let age_ms = u128::from(now.signed_duration_since(sent_at).num_milliseconds().unsigned_abs());
        if age_ms > self.max_age.as_millis() {
            warn!(
                webhook_time = %sent_at.to_rfc3339(),
                current_time = %now.to_rfc3339(),
                age_ms = %age_ms,
                max_age_seconds = self.max_age.as_secs(),
                "webhook_signature_stale"
            );
            return Err(SignatureError::StaleTimestamp);
        }

        Ok(signature)
    }

    /// Compare `signature` with the HMAC of `body` in constant time.
    pub fn verify_signature(&self, body: &[u8], signature: &str) -> Result<(), SignatureError> {
        let expected = sign_payload(&self.secret, body);

        let valid: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();
        if !valid {
            warn!(
                expected_length = expected.len(),
                actual_length = signature.len(),
                "webhook_signature_mismatch"
            );
            return Err(SignatureError::SignatureMismatch);
        }

        Ok(())
    }
}

/// Hex-encoded HMAC-SHA256 of `body` keyed with `secret`.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    // HMAC takes keys of any length; longer keys are hashed first
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    const SECRET: &str = "test-signing-key";
    const BODY: &[u8] = br#"{"data_type":"bills","trigger_type":"paid"}"#;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SECRET, DEFAULT_MAX_AGE)
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-10-09T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_sign_payload_known_vector() {
        // RFC 4231 test case 2
        let signature = sign_payload("Jefe", b"what do ya want for nothing?");
        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_verify_valid() {
        let signature = sign_payload(SECRET, BODY);
        let timestamp = now().to_rfc3339();

        assert_eq!(
            verifier().verify_at(now(), Some(&signature), Some(&timestamp), BODY),
            Ok(())
        );
    }

    #[test]
    fn test_verify_with_current_time() {
        let signature = sign_payload(SECRET, BODY);
        let timestamp = Utc::now().to_rfc3339();

        assert!(verifier().verify(Some(&signature), Some(&timestamp), BODY).is_ok());
    }

    #[test]
    fn test_verify_missing_headers() {
        let timestamp = now().to_rfc3339();

        assert_eq!(
            verifier().verify_at(now(), None, Some(&timestamp), BODY),
            Err(SignatureError::MissingSignature)
        );
        assert_eq!(
            verifier().verify_at(now(), Some("abc"), None, BODY),
            Err(SignatureError::MissingTimestamp)
        );
        // Signature is checked first
        assert_eq!(
            verifier().verify_at(now(), None, None, BODY),
            Err(SignatureError::MissingSignature)
        );
    }

    #[test]
    fn test_verify_invalid_timestamp() {
        let signature = sign_payload(SECRET, BODY);

        for timestamp in ["1760011200", "2025-10-09 12:00:00", "not-a-time"] {
            assert_eq!(
                verifier().verify_at(now(), Some(&signature), Some(timestamp), BODY),
                Err(SignatureError::InvalidTimestampFormat)
            );
        }
    }

    #[test]
    fn test_verify_freshness_boundary() {
        let signature = sign_payload(SECRET, BODY);

        let at_boundary = (now() - ChronoDuration::seconds(300)).to_rfc3339();
        assert_eq!(
            verifier().verify_at(now(), Some(&signature), Some(&at_boundary), BODY),
            Ok(())
        );

        let past_boundary = (now() - ChronoDuration::seconds(301)).to_rfc3339();
        assert_eq!(
            verifier().verify_at(now(), Some(&signature), Some(&past_boundary), BODY),
            Err(SignatureError::StaleTimestamp)
        );

        let one_ms_past = (now() - ChronoDuration::milliseconds(300_001)).to_rfc3339();
        assert_eq!(
            verifier().verify_at(now(), Some(&signature), Some(&one_ms_past), BODY),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn test_verify_future_timestamp_window() {
        let signature = sign_payload(SECRET, BODY);

        let slightly_ahead = (now() + ChronoDuration::seconds(30)).to_rfc3339();
        assert!(verifier()
            .verify_at(now(), Some(&signature), Some(&slightly_ahead), BODY)
            .is_ok());

        let far_ahead = (now() + ChronoDuration::hours(2)).to_rfc3339();
        assert_eq!(
            verifier().verify_at(now(), Some(&signature), Some(&far_ahead), BODY),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn test_verify_stale_checked_before_signature() {
        let stale = (now() - ChronoDuration::days(3)).to_rfc3339();

        assert_eq!(
            verifier().verify_at(now(), Some("bogus"), Some(&stale), BODY),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn test_verify_timestamp_with_offset() {
        let signature = sign_payload(SECRET, BODY);

        // Same instant as now(), expressed in UTC-5
        assert!(verifier()
            .verify_at(now(), Some(&signature), Some("2025-10-09T07:00:00-05:00"), BODY)
            .is_ok());
    }

    #[test]
    fn test_body_byte_flip_fails() {
        let signature = sign_payload(SECRET, BODY);
        let timestamp = now().to_rfc3339();

        for i in 0..BODY.len() {
            let mut tampered = BODY.to_vec();
            tampered[i] ^= 0x01;
            assert_eq!(
                verifier().verify_at(now(), Some(&signature), Some(&timestamp), &tampered),
                Err(SignatureError::SignatureMismatch),
                "flipping body byte {} should fail",
                i
            );
        }
    }

    #[test]
    fn test_signature_byte_flip_fails() {
        let signature = sign_payload(SECRET, BODY);
        let timestamp = now().to_rfc3339();

        for i in 0..signature.len() {
            let mut tampered = signature.clone().into_bytes();
            tampered[i] ^= 0x01;
            let tampered = String::from_utf8(tampered).unwrap();
            assert_eq!(
                verifier().verify_at(now(), Some(&tampered), Some(&timestamp), BODY),
                Err(SignatureError::SignatureMismatch),
                "flipping signature byte {} should fail",
                i
            );
        }
    }

    #[test]
    fn test_wrong_secret_or_truncated_signature_fails() {
        let timestamp = now().to_rfc3339();
        let other = sign_payload("another-secret", BODY);
        assert_eq!(
            verifier().verify_at(now(), Some(&other), Some(&timestamp), BODY),
            Err(SignatureError::SignatureMismatch)
        );

        let signature = sign_payload(SECRET, BODY);
        assert_eq!(
            verifier().verify_at(now(), Some(&signature[..32]), Some(&timestamp), BODY),
            Err(SignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn test_uppercase_signature_rejected() {
        let signature = sign_payload(SECRET, BODY).to_uppercase();
        let timestamp = now().to_rfc3339();

        assert_eq!(
            verifier().verify_at(now(), Some(&signature), Some(&timestamp), BODY),
            Err(SignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", verifier());
        assert!(!debug.contains(SECRET));
    }

    #[test]
    fn test_status_codes() {
        for error in [
            SignatureError::MissingSignature,
            SignatureError::MissingTimestamp,
            SignatureError::InvalidTimestampFormat,
            SignatureError::StaleTimestamp,
            SignatureError::SignatureMismatch,
        ] {
            assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_sign_payload_empty_and_long_keys() {
        assert_eq!(sign_payload("", BODY).len(), 64);

        let long_key = "k".repeat(512);
        let signature = sign_payload(&long_key, BODY);
        let timestamp = now().to_rfc3339();
        assert!(SignatureVerifier::new(long_key, DEFAULT_MAX_AGE)
            .verify_at(now(), Some(&signature), Some(&timestamp), BODY)
            .is_ok());
    }
}
