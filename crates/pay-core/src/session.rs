//! # Payment Session Types
//!
//! Request and result types for hosted checkout sessions.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};

/// Decimal places assumed for every currency when converting prices.
pub const MINOR_UNIT_DECIMALS: i32 = 2;

/// Largest `unit_amount` Stripe accepts (eight digits in the smallest unit).
pub const MAX_UNIT_AMOUNT: i64 = 99_999_999;

/// Convert a major-unit amount (e.g. dollars) to the smallest currency unit.
///
/// Rounds half away from zero, so `19.999` becomes `2000`.
pub fn to_smallest_unit(amount: f64) -> i64 {
    let multiplier = 10_f64.powi(MINOR_UNIT_DECIMALS);
    (amount * multiplier).round() as i64
}

/// A single item the customer is paying for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSessionItem {
    /// Display name shown on the hosted checkout page
    pub name: String,

    /// Unit price in major currency units
    pub price: f64,

    /// Quantity (>= 1)
    pub quantity: u32,
}

impl PaymentSessionItem {
    pub fn new(name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Unit price in the smallest currency unit
    pub fn unit_amount(&self) -> i64 {
        to_smallest_unit(self.price)
    }
}

/// Order description submitted to create a checkout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionRequest {
    /// ISO 4217 code, passed to the provider as-is
    pub currency: String,

    /// Caller's order id, echoed back through payment intent metadata
    pub order_id: String,

    /// Line items, in display order
    pub items: Vec<PaymentSessionItem>,
}

impl PaymentSessionRequest {
    pub fn new(currency: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            order_id: order_id.into(),
            items: Vec::new(),
        }
    }

    /// Builder: append an item
    pub fn with_item(mut self, name: impl Into<String>, price: f64, quantity: u32) -> Self {
        self.items.push(PaymentSessionItem::new(name, price, quantity));
        self
    }

    /// Check the request invariants before anything is sent to the provider.
    pub fn validate(&self) -> PaymentResult<()> {
        if self.currency.trim().is_empty() {
            return Err(PaymentError::InvalidRequest("currency is required".to_string()));
        }
        if self.order_id.trim().is_empty() {
            return Err(PaymentError::InvalidRequest("orderId is required".to_string()));
        }
        if self.items.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "items must contain at least one entry".to_string(),
            ));
        }

        for (i, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(PaymentError::InvalidRequest(format!(
                    "items[{}].name is required",
                    i
                )));
            }
            if !item.price.is_finite() || item.price < 0.0 {
                return Err(PaymentError::InvalidRequest(format!(
                    "items[{}].price must be a non-negative number",
                    i
                )));
            }
            if item.unit_amount() > MAX_UNIT_AMOUNT {
                return Err(PaymentError::InvalidRequest(format!(
                    "items[{}].price exceeds the maximum of {} smallest currency units",
                    i, MAX_UNIT_AMOUNT
                )));
            }
            if item.quantity < 1 {
                return Err(PaymentError::InvalidRequest(format!(
                    "items[{}].quantity must be at least 1",
                    i
                )));
            }
        }

        Ok(())
    }
}

/// Redirect URLs issued by the provider for a new checkout session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionResult {
    pub cancel_url: String,
    pub success_url: String,
    /// Hosted checkout page the customer is redirected to
    #[serde(rename = "url")]
    pub checkout_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> PaymentSessionRequest {
        PaymentSessionRequest::new("usd", "abc123")
            .with_item("Keyboard", 49.99, 1)
            .with_item("Mouse", 19.999, 2)
    }

    #[test]
    fn test_to_smallest_unit_rounding() {
        assert_eq!(to_smallest_unit(19.999), 2000);
        assert_eq!(to_smallest_unit(20.0), 2000);
        assert_eq!(to_smallest_unit(0.125), 13);
        assert_eq!(to_smallest_unit(0.0), 0);
        assert_eq!(to_smallest_unit(49.99), 4999);
    }

    #[test]
    fn test_item_unit_amount() {
        let item = PaymentSessionItem::new("Mouse", 19.999, 3);
        assert_eq!(item.unit_amount(), 2000);
        assert_eq!(item.quantity, 3);
    }

    #[test]
    fn test_validate_accepts_valid_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_items() {
        let request = PaymentSessionRequest::new("usd", "abc123");
        assert!(matches!(
            request.validate(),
            Err(PaymentError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let request = PaymentSessionRequest::new("usd", "abc123").with_item("Refund?", -1.0, 1);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_price_ceiling() {
        let at_limit = PaymentSessionRequest::new("usd", "abc123").with_item("Car", 999_999.99, 1);
        assert_eq!(at_limit.items[0].unit_amount(), MAX_UNIT_AMOUNT);
        assert!(at_limit.validate().is_ok());

        for price in [1_000_000.0, 1e300] {
            let request = PaymentSessionRequest::new("usd", "abc123").with_item("Car", price, 1);
            let err = request.validate().unwrap_err();
            assert!(err.to_string().contains("items[0].price"));
        }
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let request = PaymentSessionRequest::new("usd", "abc123").with_item("Keyboard", 10.0, 0);
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn test_validate_rejects_missing_order_id() {
        let request = PaymentSessionRequest::new("usd", " ").with_item("Keyboard", 10.0, 1);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: PaymentSessionRequest = serde_json::from_str(
            r#"{"currency":"usd","orderId":"abc123","items":[{"name":"Keyboard","price":19.999,"quantity":2}]}"#,
        )
        .unwrap();

        assert_eq!(request.order_id, "abc123");
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].unit_amount(), 2000);
    }

    #[test]
    fn test_result_serializes_checkout_url_as_url() {
        let result = PaymentSessionResult {
            cancel_url: "https://shop.test/cancel".to_string(),
            success_url: "https://shop.test/success".to_string(),
            checkout_url: "https://checkout.stripe.com/c/pay/cs_test_1".to_string(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["url"], "https://checkout.stripe.com/c/pay/cs_test_1");
        assert_eq!(json["cancelUrl"], "https://shop.test/cancel");
        assert_eq!(json["successUrl"], "https://shop.test/success");
    }
}
