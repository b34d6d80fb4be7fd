//! Webhook signature verification.
//!
//! Providers sign `"{timestamp}.{raw_body}"` with HMAC-SHA256 over a shared
//! secret and send the hex digest in a header.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `"{timestamp}.{raw_body}"`.
pub fn sign(secret: &str, timestamp: &str, raw_body: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(raw_body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a provider-sent hex signature.
pub fn verify(secret: &str, timestamp: &str, raw_body: &str, signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(raw_body.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let sig = sign("segredo", "1700000000", r#"{"order_id":"abc"}"#);
        assert!(verify("segredo", "1700000000", r#"{"order_id":"abc"}"#, &sig));
    }

    #[test]
    fn test_rejects_tampered_body() {
        let sig = sign("segredo", "1700000000", r#"{"net_value_cents":100}"#);
        assert!(!verify("segredo", "1700000000", r#"{"net_value_cents":99900}"#, &sig));
    }

    #[test]
    fn test_rejects_wrong_secret_and_timestamp() {
        let sig = sign("segredo", "1700000000", "body");
        assert!(!verify("outro", "1700000000", "body", &sig));
        assert!(!verify("segredo", "1700000001", "body", &sig));
    }

    #[test]
    fn test_rejects_non_hex_signature() {
        assert!(!verify("segredo", "ts", "body", "not hex at all"));
        assert!(!verify("segredo", "ts", "body", ""));
    }

    #[test]
    fn test_signature_tolerates_surrounding_whitespace() {
        let sig = sign("segredo", "ts", "body");
        assert!(verify("segredo", "ts", "body", &format!("  {sig}\n")));
    }
}
