//! # Stripe Webhook Handling
//!
//! Signature verification, event parsing and dispatch for Stripe webhooks.
//!
//! Stripe signs `"{timestamp}.{raw body}"` with HMAC-SHA256 keyed by the
//! endpoint secret and sends `t=<timestamp>,v1=<hex>` in the
//! `Stripe-Signature` header. Verification runs over the raw bytes, so the
//! body must reach this module unmodified.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use pay_core::{ChargeSucceeded, PaymentError, PaymentResult, WebhookEvent, CHARGE_SUCCEEDED};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use tracing::{debug, info};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

const SIGNATURE_SCHEME: &str = "v1";

/// Events that should be enabled in the Stripe Dashboard for this endpoint
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[CHARGE_SUCCEEDED];

// =============================================================================
// Signature Verification
// =============================================================================

#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> PaymentResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            SIGNATURE_SCHEME => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        PaymentError::WebhookVerificationFailed(
            "Unable to extract timestamp and signatures from header".to_string(),
        )
    })?;

    if signatures.is_empty() {
        return Err(PaymentError::WebhookVerificationFailed(
            "No signatures found with expected scheme".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn signed_payload_mac(secret: &str, timestamp: i64, payload: &[u8]) -> PaymentResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Compute the hex `v1` signature Stripe would send for `payload` at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> PaymentResult<String> {
    let mac = signed_payload_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a `Stripe-Signature` header value for a payload.
///
/// Used by tests and local tooling to produce deliveries that verify.
pub fn generate_test_header(secret: &str, timestamp: i64, payload: &[u8]) -> PaymentResult<String> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},{}={}", timestamp, SIGNATURE_SCHEME, signature))
}

/// Verify `signature_header` against the raw `payload`.
///
/// `now` is the current unix time; signatures older than `tolerance_secs`
/// are rejected. A non-positive tolerance disables the age check.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> PaymentResult<()> {
    let header = parse_signature_header(signature_header)?;
    let mac = signed_payload_mac(secret, header.timestamp, payload)?;

    // Comparison goes through `verify_slice`, which is constant-time.
    let matched = header.signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if !matched {
        return Err(PaymentError::WebhookVerificationFailed(
            "No signatures found matching the expected signature for payload".to_string(),
        ));
    }

    if tolerance_secs > 0 && now - header.timestamp > tolerance_secs {
        return Err(PaymentError::WebhookVerificationFailed(
            "Timestamp outside the tolerance zone".to_string(),
        ));
    }

    Ok(())
}

// =============================================================================
// Event Parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct StripeCharge {
    id: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    receipt_url: Option<String>,
}

/// Parse a (verified) event body into a [`WebhookEvent`].
pub fn parse_event(payload: &[u8]) -> PaymentResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
        PaymentError::WebhookParseError(format!("Failed to parse webhook: {}", e))
    })?;

    debug!("Parsed Stripe event: id={}, type={}", event.id, event.event_type);

    match event.event_type.as_str() {
        CHARGE_SUCCEEDED => {
            let charge: StripeCharge =
                serde_json::from_value(event.data.object).map_err(|e| {
                    PaymentError::WebhookParseError(format!("Invalid charge object: {}", e))
                })?;

            Ok(WebhookEvent::ChargeSucceeded(ChargeSucceeded {
                charge_id: charge.id,
                order_id: charge.metadata.get("orderId").cloned(),
                receipt_url: charge.receipt_url,
            }))
        }
        other => Ok(WebhookEvent::Other {
            event_type: other.to_string(),
        }),
    }
}

/// Verify the signature, then parse the event.
pub fn construct_event(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> PaymentResult<WebhookEvent> {
    verify_signature(payload, signature_header, secret, tolerance_secs, now)?;
    parse_event(payload)
}

// =============================================================================
// Dispatch
// =============================================================================

/// Webhook event handler trait
///
/// Implement this trait to react to verified events. Each variant of
/// [`WebhookEvent`] has its own method.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Called when a charge succeeds
    async fn on_charge_succeeded(&self, charge: ChargeSucceeded) -> PaymentResult<()> {
        info!("Charge succeeded: {}", charge.charge_id);
        Ok(())
    }

    /// Called for every event without a dedicated method
    async fn on_unhandled_event(&self, event_type: &str) -> PaymentResult<()> {
        info!("Event {} not handled", event_type);
        Ok(())
    }
}

/// Dispatch a webhook event to the appropriate handler method
pub async fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: WebhookEvent,
) -> PaymentResult<()> {
    match event {
        WebhookEvent::ChargeSucceeded(charge) => handler.on_charge_succeeded(charge).await,
        WebhookEvent::Other { event_type } => handler.on_unhandled_event(&event_type).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_000;

    fn charge_event(order_id: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_1",
            "object": "event",
            "type": "charge.succeeded",
            "created": NOW,
            "data": {
                "object": {
                    "id": "ch_3Nabc",
                    "object": "charge",
                    "metadata": { "orderId": order_id },
                    "receipt_url": "https://pay.stripe.com/receipts/r_1"
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_signature_header() {
        let header = "t=1234567890,v1=abc123,v1=def456,v0=old";
        let parsed = parse_signature_header(header).unwrap();

        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signatures, vec!["abc123", "def456"]);
    }

    #[test]
    fn test_parse_signature_header_without_v1() {
        let err = parse_signature_header("t=1234567890,v0=abc").unwrap_err();
        assert!(matches!(err, PaymentError::WebhookVerificationFailed(_)));
    }

    #[test]
    fn test_compute_signature_is_hex_sha256() {
        let sig = compute_signature(SECRET, NOW, b"{}").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_accepts_generated_header() {
        let payload = charge_event("abc123");
        let header = generate_test_header(SECRET, NOW, &payload).unwrap();

        assert!(verify_signature(&payload, &header, SECRET, 300, NOW + 10).is_ok());
    }

    #[test]
    fn test_verify_accepts_any_matching_v1() {
        let payload = b"{\"id\":\"evt_1\"}";
        let good = compute_signature(SECRET, NOW, payload).unwrap();
        let header = format!("t={},v1={},v1={}", NOW, "00".repeat(32), good);

        assert!(verify_signature(payload, &header, SECRET, 300, NOW).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let payload = charge_event("abc123");
        let header = generate_test_header("whsec_other", NOW, &payload).unwrap();

        let err = verify_signature(&payload, &header, SECRET, 300, NOW).unwrap_err();
        assert!(err.to_string().contains("No signatures found matching"));
    }

    #[test]
    fn test_verify_is_byte_exact() {
        let payload = charge_event("abc123");
        let header = generate_test_header(SECRET, NOW, &payload).unwrap();

        // Re-serializing changes whitespace and breaks the signature.
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        let reformatted = serde_json::to_vec_pretty(&value).unwrap();

        assert!(verify_signature(&reformatted, &header, SECRET, 300, NOW).is_err());
    }

    #[test]
    fn test_verify_rejects_stale_timestamp() {
        let payload = charge_event("abc123");
        let header = generate_test_header(SECRET, NOW, &payload).unwrap();

        let err = verify_signature(&payload, &header, SECRET, 300, NOW + 301).unwrap_err();
        assert!(err.to_string().contains("tolerance"));

        // Zero tolerance disables the age check
        assert!(verify_signature(&payload, &header, SECRET, 0, NOW + 10_000).is_ok());
    }

    #[test]
    fn test_parse_charge_succeeded() {
        let event = parse_event(&charge_event("abc123")).unwrap();

        assert_eq!(
            event,
            WebhookEvent::ChargeSucceeded(ChargeSucceeded {
                charge_id: "ch_3Nabc".to_string(),
                order_id: Some("abc123".to_string()),
                receipt_url: Some("https://pay.stripe.com/receipts/r_1".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_charge_without_metadata() {
        let payload = serde_json::to_vec(&json!({
            "id": "evt_2",
            "type": "charge.succeeded",
            "data": { "object": { "id": "ch_1", "receipt_url": null } }
        }))
        .unwrap();

        match parse_event(&payload).unwrap() {
            WebhookEvent::ChargeSucceeded(charge) => {
                assert_eq!(charge.charge_id, "ch_1");
                assert!(charge.order_id.is_none());
                assert!(charge.receipt_url.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_other_event() {
        let payload = serde_json::to_vec(&json!({
            "id": "evt_3",
            "type": "charge.failed",
            "data": { "object": { "id": "ch_2" } }
        }))
        .unwrap();

        assert_eq!(
            parse_event(&payload).unwrap(),
            WebhookEvent::Other {
                event_type: "charge.failed".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_event(b"not json").unwrap_err();
        assert!(matches!(err, PaymentError::WebhookParseError(_)));
    }

    #[test]
    fn test_construct_event_requires_signature() {
        let payload = charge_event("abc123");
        let result = construct_event(&payload, "t=1,v1=deadbeef", SECRET, 300, NOW);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dispatch_webhook() {
        struct TestHandler {
            charges: AtomicUsize,
            unhandled: AtomicUsize,
        }

        #[async_trait]
        impl WebhookHandler for TestHandler {
            async fn on_charge_succeeded(&self, _charge: ChargeSucceeded) -> PaymentResult<()> {
                self.charges.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }

            async fn on_unhandled_event(&self, _event_type: &str) -> PaymentResult<()> {
                self.unhandled.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let handler = TestHandler {
            charges: AtomicUsize::new(0),
            unhandled: AtomicUsize::new(0),
        };

        dispatch_webhook_event(&handler, parse_event(&charge_event("abc123")).unwrap())
            .await
            .unwrap();
        dispatch_webhook_event(
            &handler,
            WebhookEvent::Other {
                event_type: "payment_intent.created".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(handler.charges.load(Ordering::SeqCst), 1);
        assert_eq!(handler.unhandled.load(Ordering::SeqCst), 1);
    }
}
