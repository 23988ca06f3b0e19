//! Shop Payment Engine
//!
//! The Shop Payment Engine is the order/payment reconciliation core of the storefront. It owns the order, line-item,
//! product and cart records, and it drives the two flows that mutate them:
//!
//! 1. **Checkout**: a customer's cart becomes a durable pending order plus a payment intent at the payment provider.
//! 2. **Settlement**: a payment-provider webhook event confirms the order and commits the stock decrement, or marks
//!    the payment as failed.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@db`]). Currently Sqlite is the only supported backend. You should never
//!    need to access the database directly; use the public API instead. The exception is the data types used in the
//!    database, which are defined in the `db_types` module and are public.
//! 2. The engine public API ([`OrderFlowApi`]). Specific backends need to implement the traits in the [`traits`]
//!    module to act as a storage backend, and payment providers implement [`traits::PaymentGateway`] to act as the
//!    payment seam.
//!
//! The engine also emits events when orders are confirmed, annulled or fail payment. A simple actor setup lets the
//! server hook into these and perform custom actions (logging, cancelling the provider-side intent, and so on).
mod db;

pub mod db_types;
pub mod events;
mod spe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{self, SqliteDatabase};
pub use spe_api::{order_flow_api::OrderFlowApi, order_objects};
pub use traits::{
    CartManagement,
    CatalogManagement,
    OrderManagement,
    PaymentGateway,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    PaymentProviderError,
};
