//! # Payments Gateway
//!
//! Stripe checkout sessions in, `payment.succeeded` events out.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET=sk_test_...
//! export STRIPE_ENDPOINT_SECRET=whsec_...
//! export STRIPE_SUCCESS_URL=http://localhost:3003/payments/success
//! export STRIPE_CANCEL_URL=http://localhost:3003/payments/cancel
//! export NATS_SERVERS=nats://localhost:4222
//!
//! # Run the server
//! payments-gateway
//! ```

use pay_api::{routes, state::AppState};
use pay_stripe::REQUIRED_WEBHOOK_EVENTS;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Initialize application state
    let state = AppState::new().await?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("NATS servers: {:?}", state.config.nats_servers);
    info!("Charge dedup: {}", state.config.dedup_charges);

    // Create router
    let app = routes::create_router(state);

    info!("Payments gateway starting on http://{}", addr);

    if !is_prod {
        info!("Checkout: POST http://{}/payments/create-payment-session", addr);
        info!(
            "Webhook: POST http://{}/payments/webhook (events: {})",
            addr,
            REQUIRED_WEBHOOK_EVENTS.join(", ")
        );
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` filters (default `info`); `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}
