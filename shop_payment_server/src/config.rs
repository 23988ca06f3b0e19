use std::env;

use chrono::Duration;
use log::*;
use stripe_tools::StripeConfig;

const DEFAULT_SPG_HOST: &str = "127.0.0.1";
const DEFAULT_SPG_PORT: u16 = 8560;
const DEFAULT_SPG_DATABASE_URL: &str = "sqlite://data/spg.db";
const DEFAULT_UNPAID_ORDER_TIMEOUT: Duration = Duration::hours(48);
const DEFAULT_EXPIRY_CHECK_INTERVAL: u64 = 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The time an order may sit unpaid before the expiry sweep annuls it.
    pub unpaid_order_timeout: Duration,
    /// How often, in seconds, the expiry sweep runs.
    pub expiry_check_interval: u64,
    /// Stripe credentials and webhook verification settings.
    pub stripe_config: StripeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPG_HOST.to_string(),
            port: DEFAULT_SPG_PORT,
            database_url: DEFAULT_SPG_DATABASE_URL.to_string(),
            unpaid_order_timeout: DEFAULT_UNPAID_ORDER_TIMEOUT,
            expiry_check_interval: DEFAULT_EXPIRY_CHECK_INTERVAL,
            stripe_config: StripeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPG_HOST").ok().unwrap_or_else(|| DEFAULT_SPG_HOST.into());
        let port = env::var("SPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPG_PORT. {e} Using the default, {DEFAULT_SPG_PORT}, instead."
                    );
                    DEFAULT_SPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPG_PORT);
        let database_url = env::var("SPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SPG_DATABASE_URL is not set. Using the default, {DEFAULT_SPG_DATABASE_URL}, instead.");
            DEFAULT_SPG_DATABASE_URL.to_string()
        });
        let stripe_config = StripeConfig::new_from_env_or_default();
        let unpaid_order_timeout = configure_unpaid_order_timeout();
        let expiry_check_interval = env::var("SPG_EXPIRY_CHECK_INTERVAL")
            .map_err(|_| {
                info!(
                    "🪛️ SPG_EXPIRY_CHECK_INTERVAL is not set. Using the default value of \
                     {DEFAULT_EXPIRY_CHECK_INTERVAL} s."
                )
            })
            .and_then(|s| {
                s.parse::<u64>().map_err(|e| warn!("🪛️ Invalid configuration value for SPG_EXPIRY_CHECK_INTERVAL. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_EXPIRY_CHECK_INTERVAL);
        Self { host, port, database_url, unpaid_order_timeout, expiry_check_interval, stripe_config }
    }
}

fn configure_unpaid_order_timeout() -> Duration {
    env::var("SPG_UNPAID_ORDER_TIMEOUT")
        .map_err(|_| {
            info!(
                "🪛️ SPG_UNPAID_ORDER_TIMEOUT is not set. Using the default value of {} hrs.",
                DEFAULT_UNPAID_ORDER_TIMEOUT.num_hours()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::hours)
                .map_err(|e| warn!("🪛️ Invalid configuration value for SPG_UNPAID_ORDER_TIMEOUT. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_UNPAID_ORDER_TIMEOUT)
}
