use log::*;
use spg_common::Secret;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";
/// Maximum age, in seconds, of a webhook signature timestamp before the delivery is treated as a replay.
pub const DEFAULT_SIGNATURE_TOLERANCE: i64 = 300;

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub api_url: String,
    pub secret_key: Secret<String>,
    pub webhook_secret: Secret<String>,
    pub signature_tolerance: i64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_STRIPE_API_URL.to_string(),
            secret_key: Secret::default(),
            webhook_secret: Secret::default(),
            signature_tolerance: DEFAULT_SIGNATURE_TOLERANCE,
        }
    }
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("SPG_STRIPE_API_URL").unwrap_or_else(|_| {
            info!("SPG_STRIPE_API_URL not set, using {DEFAULT_STRIPE_API_URL}");
            DEFAULT_STRIPE_API_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("SPG_STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("SPG_STRIPE_SECRET_KEY not set, using (probably useless) default");
            "sk_test_00000000000000".to_string()
        }));
        let webhook_secret = Secret::new(std::env::var("SPG_STRIPE_WEBHOOK_SECRET").unwrap_or_else(|_| {
            warn!("SPG_STRIPE_WEBHOOK_SECRET not set, using (probably useless) default");
            "whsec_00000000000000".to_string()
        }));
        let signature_tolerance = std::env::var("SPG_STRIPE_SIGNATURE_TOLERANCE")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(DEFAULT_SIGNATURE_TOLERANCE);
        Self { api_url, secret_key, webhook_secret, signature_tolerance }
    }
}
