use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Gateway order reference: `order_<unix millis>_<first 8 chars of the order id>`.
pub fn provider_order_id(order_id: Uuid, now: DateTime<Utc>) -> String {
    let simple = order_id.simple().to_string();
    format!("order_{}_{}", now.timestamp_millis(), &simple[..8])
}

/// Signature the gateway sends for a settled payment.
pub fn expected_signature(secret: &str, provider_order_id: &str, provider_payment_id: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid webhook secret: {}", e)))?;
    mac.update(format!("{}|{}", provider_order_id, provider_payment_id).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks the hex HMAC-SHA256 of `"{provider_order_id}|{provider_payment_id}"`.
pub fn verify_signature(
    secret: &str,
    provider_order_id: &str,
    provider_payment_id: &str,
    signature: &str,
) -> Result<bool> {
    let expected = expected_signature(secret, provider_order_id, provider_payment_id)?;
    let signature = signature.trim().to_ascii_lowercase();
    Ok(expected.as_bytes().ct_eq(signature.as_bytes()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_provider_order_id_format() {
        let id = Uuid::parse_str("1b4e28ba-2fa1-11d2-883f-0016d3cca427").unwrap();
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(provider_order_id(id, now), "order_1700000000123_1b4e28ba");
    }

    #[test]
    fn test_signature_accepts_only_matching_pair() {
        let sig = expected_signature("whsec", "order_1_abc", "pay_9").unwrap();
        assert!(verify_signature("whsec", "order_1_abc", "pay_9", &sig).unwrap());
        assert!(verify_signature("whsec", "order_1_abc", "pay_9", &sig.to_uppercase()).unwrap());
        assert!(!verify_signature("whsec", "order_1_abc", "pay_8", &sig).unwrap());
        assert!(!verify_signature("other", "order_1_abc", "pay_9", &sig).unwrap());
        assert!(!verify_signature("whsec", "order_1_abc", "pay_9", "deadbeef").unwrap());
    }
}
