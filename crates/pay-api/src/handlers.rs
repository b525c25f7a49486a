//! # Request Handlers
//!
//! Axum request handlers for the payments API.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pay_core::{PaymentError, PaymentSessionRequest, PaymentSessionResult};
use pay_stripe::SIGNATURE_HEADER;
use serde::Serialize;
use tracing::{error, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Body of the checkout redirect landing pages
#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub ok: bool,
    pub message: &'static str,
}

fn payment_error_to_response(err: PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn webhook_rejection(message: impl std::fmt::Display) -> Response {
    (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", message)).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "payments-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a hosted checkout session
///
/// Malformed bodies are rejected with the same 400 `ErrorResponse` as
/// requests that fail validation.
#[instrument(skip(state, request))]
pub async fn create_payment_session(
    State(state): State<AppState>,
    request: Result<Json<PaymentSessionRequest>, JsonRejection>,
) -> Result<Json<PaymentSessionResult>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = request.map_err(|rejection| {
        payment_error_to_response(PaymentError::InvalidRequest(rejection.body_text()))
    })?;

    let session = state
        .service
        .create_payment_session(&request)
        .await
        .map_err(|e| {
            error!("Failed to create payment session: {}", e);
            payment_error_to_response(e)
        })?;

    Ok(Json(session))
}

/// Checkout success landing page
pub async fn payment_success() -> Json<RedirectResponse> {
    Json(RedirectResponse {
        ok: true,
        message: "Payment successful",
    })
}

/// Checkout cancel landing page
pub async fn payment_cancel() -> Json<RedirectResponse> {
    Json(RedirectResponse {
        ok: false,
        message: "Payment cancelled",
    })
}

/// Handle Stripe webhook
///
/// The body is taken as raw `Bytes`; signature verification needs it unmodified.
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(value) = headers.get(SIGNATURE_HEADER) else {
        return webhook_rejection("Missing stripe-signature header");
    };
    let Ok(signature) = value.to_str() else {
        return webhook_rejection("stripe-signature header is not valid ASCII");
    };

    match state.service.handle_webhook(&body, signature).await {
        Ok(()) => (StatusCode::OK, Json(signature.to_string())).into_response(),
        Err(e) if e.is_webhook_rejection() => webhook_rejection(e),
        Err(e) => {
            error!("Webhook handler error: {}", e);
            payment_error_to_response(e).into_response()
        }
    }
}
