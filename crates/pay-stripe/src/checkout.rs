//! # Stripe Checkout Sessions
//!
//! Implementation of Stripe Checkout Sessions API.
//! This is the only payment flow the gateway offers.

use crate::config::StripeConfig;
use crate::webhook;
use async_trait::async_trait;
use chrono::Utc;
use pay_core::{
    PaymentError, PaymentResult, PaymentSessionRequest, PaymentSessionResult, PaymentStrategy,
    WebhookEvent,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Metadata key carrying the caller's order id on the payment intent
pub const ORDER_ID_METADATA_KEY: &str = "orderId";

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page for one-time payments.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Build form parameters for `POST /v1/checkout/sessions`
    fn build_form_params(
        request: &PaymentSessionRequest,
        success_url: &str,
        cancel_url: &str,
    ) -> Vec<(String, String)> {
        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            (
                format!("payment_intent_data[metadata][{}]", ORDER_ID_METADATA_KEY),
                request.order_id.clone(),
            ),
        ];

        for (i, item) in request.items.iter().enumerate() {
            form_params.push((
                format!("line_items[{}][price_data][currency]", i),
                request.currency.clone(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                item.name.clone(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                item.unit_amount().to_string(),
            ));
            form_params.push((
                format!("line_items[{}][quantity]", i),
                item.quantity.to_string(),
            ));
        }

        form_params
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn create_checkout(
        &self,
        request: &PaymentSessionRequest,
        success_url: &str,
        cancel_url: &str,
    ) -> PaymentResult<PaymentSessionResult> {
        let form_params = Self::build_form_params(request, success_url, cancel_url);

        debug!(
            "Creating Stripe checkout session: {} items, currency={}",
            request.items.len(),
            request.currency
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            // Parse Stripe error
            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(PaymentError::ProviderError {
                    provider: "stripe".to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(PaymentError::ProviderError {
                provider: "stripe".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let session: StripeCheckoutSessionResponse =
            serde_json::from_str(&body).map_err(|e| {
                PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        let checkout_url = session.url.ok_or_else(|| PaymentError::ProviderError {
            provider: "stripe".to_string(),
            message: format!("Checkout session {} has no url", session.id),
        })?;

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session.id, checkout_url
        );

        Ok(PaymentSessionResult {
            cancel_url: session.cancel_url.unwrap_or_else(|| cancel_url.to_string()),
            success_url: session.success_url.unwrap_or_else(|| success_url.to_string()),
            checkout_url,
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> PaymentResult<WebhookEvent> {
        let event = webhook::construct_event(
            payload,
            signature,
            &self.config.webhook_secret,
            self.config.webhook_tolerance_secs,
            Utc::now().timestamp(),
        )?;

        debug!("Verified Stripe webhook: type={}", event.event_type());
        Ok(event)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    success_url: Option<String>,
    #[serde(default)]
    cancel_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
