//! # Shop payment server
//! This crate hosts the HTTP face of the Shop Payment Gateway. It is responsible for:
//! * Serving checkout requests from the storefront and replying with the payment intent's client secret.
//! * Listening for signed webhook event deliveries from Stripe and feeding them into the payment engine.
//! * Running the background sweep that reclaims orders that were never paid.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/payment/checkout`: Creates a pending order and a payment intent for it.
//! * `/payment/webhook`: The webhook route for receiving payment events from Stripe.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod stripe_routes;

#[cfg(test)]
mod endpoint_tests;
