//! # Shop payment engine public API
//!
//! The `spe_api` module exposes the programmatic API for the Shop Payment Engine.
//!
//! * [`order_flow_api`] is the primary API for handling checkout and settlement flows in response to storefront
//!   requests and payment-provider webhook events.
//! * [`order_objects`] holds the request/response objects those flows exchange with callers.
//!
//! An API instance is created by supplying a database backend that implements the traits required by the API, plus a
//! payment-provider client:
//!
//! ```rust,ignore
//! use shop_payment_engine::{events::EventProducers, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let gateway = StripeApi::new(config);
//! // SqliteDatabase implements PaymentGatewayDatabase, StripeApi implements PaymentGateway
//! let api = OrderFlowApi::new(db, gateway, EventProducers::default());
//! let summary = api.checkout(request).await?;
//! ```

pub mod order_flow_api;
pub mod order_objects;
