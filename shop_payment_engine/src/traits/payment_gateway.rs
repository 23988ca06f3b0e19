use thiserror::Error;

use crate::traits::{NewPaymentIntent, PaymentIntent};

/// The payment-provider seam.
///
/// The checkout flow calls [`PaymentGateway::create_payment_intent`] after the pending order has been stored, and
/// hands the returned client secret to the storefront so it can collect payment. The annulment hook calls
/// [`PaymentGateway::cancel_payment_intent`] when the expiry sweep reclaims an order whose intent was never paid.
///
/// Settlement does *not* go through this trait: the provider reports payment outcomes asynchronously via signed
/// webhook events, which the server feeds into the engine by intent id.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// Creates a payment intent for the given order total. The order id travels along as provider-side metadata so
    /// that provider dashboards and webhook payloads can be correlated with the order.
    async fn create_payment_intent(&self, request: NewPaymentIntent) -> Result<PaymentIntent, PaymentProviderError>;

    /// Cancels a payment intent that will never be paid (the corresponding order was annulled).
    async fn cancel_payment_intent(&self, payment_intent_id: &str) -> Result<(), PaymentProviderError>;
}

#[derive(Debug, Clone, Error)]
pub enum PaymentProviderError {
    #[error("Could not reach the payment provider: {0}")]
    RequestFailed(String),
    #[error("The payment provider rejected the request: {0}")]
    RequestRejected(String),
}
