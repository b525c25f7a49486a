//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the payments service and the loaded configuration.

use crate::service::PaymentsService;
use pay_bus::NatsPublisher;
use pay_core::{BoxedEventPublisher, BoxedPaymentStrategy, PaymentError, PaymentResult};
use pay_stripe::{StripeCheckoutStrategy, StripeConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Redirect after a completed checkout
    pub success_url: String,
    /// Redirect after an abandoned checkout
    pub cancel_url: String,
    /// NATS server URLs
    pub nats_servers: Vec<String>,
    /// Publish each charge at most once per process
    pub dedup_charges: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> PaymentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PaymentError::Configuration(format!("{} not set", key)))
        };

        let port = match lookup("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| PaymentError::Configuration(format!("PORT is not a number: {}", p)))?,
            None => 3003,
        };

        let nats_servers: Vec<String> = required("NATS_SERVERS")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let dedup_charges = lookup("WEBHOOK_DEDUP_CHARGES")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            success_url: required("STRIPE_SUCCESS_URL")?,
            cancel_url: required("STRIPE_CANCEL_URL")?,
            nats_servers,
            dedup_charges,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> PaymentResult<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| PaymentError::Configuration(format!("Invalid socket address: {}", e)))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// A live Stripe key outside production charges real cards from a
    /// development or staging deployment.
    pub fn is_live_key_misplaced(&self, stripe: &StripeConfig) -> bool {
        stripe.is_live_mode() && !self.is_production()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Session creation and webhook relaying
    pub service: Arc<PaymentsService>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState with the Stripe strategy and a NATS publisher
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let stripe = StripeConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        info!(
            live = stripe.is_live_mode(),
            webhook_tolerance_secs = stripe.webhook_tolerance_secs,
            "Stripe configured"
        );
        if config.is_live_key_misplaced(&stripe) {
            warn!(
                environment = %config.environment,
                "Live Stripe key in use outside production"
            );
        }

        let strategy = StripeCheckoutStrategy::new(stripe);

        let publisher = NatsPublisher::connect(&config.nats_servers)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize NATS: {}", e))?;

        Ok(Self::with_components(
            config,
            Arc::new(strategy),
            Arc::new(publisher),
        ))
    }

    /// Assemble state from already-built collaborators
    pub fn with_components(
        config: AppConfig,
        strategy: BoxedPaymentStrategy,
        publisher: BoxedEventPublisher,
    ) -> Self {
        let service = PaymentsService::new(
            strategy,
            publisher,
            config.success_url.clone(),
            config.cancel_url.clone(),
        )
        .with_charge_dedup(config.dedup_charges);

        Self {
            service: Arc::new(service),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("STRIPE_SUCCESS_URL", "http://localhost:3003/payments/success"),
        ("STRIPE_CANCEL_URL", "http://localhost:3003/payments/cancel"),
        ("NATS_SERVERS", "nats://localhost:4222, nats://localhost:4223"),
    ];

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_lookup(lookup_from(REQUIRED)).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3003);
        assert_eq!(config.environment, "development");
        assert!(!config.dedup_charges);
        assert_eq!(
            config.nats_servers,
            vec!["nats://localhost:4222", "nats://localhost:4223"]
        );
    }

    #[test]
    fn test_app_config_missing_success_url() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("STRIPE_CANCEL_URL", "http://localhost/cancel"),
            ("NATS_SERVERS", "nats://localhost:4222"),
        ]));

        let err = result.unwrap_err();
        assert!(err.to_string().contains("STRIPE_SUCCESS_URL"));
    }

    #[test]
    fn test_app_config_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("ENVIRONMENT", "production"),
            ("WEBHOOK_DEDUP_CHARGES", "true"),
        ]);

        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.is_production());
        assert!(config.dedup_charges);
    }

    #[test]
    fn test_app_config_bad_port() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));

        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let mut config = AppConfig::from_lookup(lookup_from(REQUIRED)).unwrap();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_live_key_outside_production() {
        let live = StripeConfig::new("sk_live_abc", "whsec_xyz");
        let test = StripeConfig::new("sk_test_abc", "whsec_xyz");

        let mut config = AppConfig::from_lookup(lookup_from(REQUIRED)).unwrap();
        assert!(config.is_live_key_misplaced(&live));
        assert!(!config.is_live_key_misplaced(&test));

        config.environment = "production".to_string();
        assert!(!config.is_live_key_misplaced(&live));
    }
}
