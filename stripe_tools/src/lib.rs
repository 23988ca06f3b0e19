//! A thin async client for the slice of the Stripe REST API that the payment server uses: creating and cancelling
//! payment intents, and verifying the signatures on incoming webhook event deliveries.
//!
//! [`StripeApi`] implements the engine's `PaymentGateway` trait, so it can be plugged straight into an
//! `OrderFlowApi` instance.
mod api;
mod config;
mod data_objects;
mod error;
mod signature;

pub use api::StripeApi;
pub use config::{StripeConfig, DEFAULT_SIGNATURE_TOLERANCE, DEFAULT_STRIPE_API_URL};
pub use data_objects::{PaymentEvent, PaymentIntentObject, WebhookEvent, WebhookEventData};
pub use error::StripeApiError;
pub use signature::{sign_payload, verify_webhook_signature, SignatureError};
