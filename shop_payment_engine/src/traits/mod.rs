//! # Storage and provider interface contracts.
//!
//! This module defines the interfaces that payment-engine database *backends* and payment *providers* implement.
//!
//! ## Traits
//! * [`PaymentGatewayDatabase`] defines the highest level of behaviour for storage backends: order creation at
//!   checkout, webhook settlement (order confirmation + stock decrement in one transaction), payment failure and
//!   the expiry sweep. It is the trait the order flows run against.
//! * [`OrderManagement`] provides queries over orders and their line items.
//! * [`CartManagement`] is the cart-snapshot collaborator interface: read a customer's stored cart, replace it, and
//!   clear it once an order has been created from it.
//! * [`CatalogManagement`] is the catalog collaborator interface: product lookup for pricing, and the upsert used by
//!   fulfilment tooling.
//! * [`PaymentGateway`] is the payment-provider seam. The checkout flow uses it to create payment intents, and the
//!   annulment hook uses it to cancel intents for reclaimed orders.
mod cart_management;
mod catalog_management;
mod data_objects;
mod order_management;
mod payment_gateway;
mod payment_gateway_database;

pub use cart_management::CartManagement;
pub use catalog_management::CatalogManagement;
pub use data_objects::{NewPaymentIntent, PaymentIntent};
pub use order_management::OrderManagement;
pub use payment_gateway::{PaymentGateway, PaymentProviderError};
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
