use futures::future::BoxFuture;
use log::*;
use shop_payment_engine::{
    db_types::PaymentStatusType,
    events::{EventHandlers, EventHooks, OrderAnnulledEvent},
};
use stripe_tools::{StripeApi, StripeApiError, StripeConfig};

pub const STRIPE_EVENT_BUFFER_SIZE: usize = 25;

/// Assigns the event handlers that keep Stripe in sync with the payment engine.
///
/// Only annulments need reporting back. When an order is cancelled while its payment intent is still collectable,
/// the intent is cancelled on Stripe too, so that the customer cannot pay for an order that no longer exists.
/// Confirmations and payment failures originate at Stripe in the first place, so nothing is sent for those.
pub fn create_stripe_event_handlers(config: StripeConfig) -> Result<EventHandlers, StripeApiError> {
    let mut hooks = EventHooks::default();
    let api = StripeApi::new(config)?;
    // --- On OrderAnnulled Handler ---
    hooks.on_order_annulled(move |ev| {
        let OrderAnnulledEvent { order, status } = ev;
        if order.payment_status != PaymentStatusType::Pending {
            debug!(
                "💳️ Annulled order {} has payment status {}; its intent is no longer collectable",
                order.order_id, order.payment_status
            );
            return no_op();
        }
        let Some(intent_id) = order.payment_intent_id else {
            debug!("💳️ Annulled order {} never got a payment intent. Nothing to cancel", order.order_id);
            return no_op();
        };
        let api = api.clone();
        debug!("💳️ Order {} is now {status}. Sending a cancellation for intent {intent_id} to Stripe", order.order_id);
        Box::pin(async move {
            match api.cancel_intent(&intent_id).await {
                Ok(intent) => info!("💳️ Intent {} has been cancelled on Stripe. Status: {}", intent.id, intent.status),
                Err(e) => error!("💳️ Error cancelling intent {intent_id} on Stripe. {e}"),
            }
        })
    });
    let handlers = EventHandlers::new(STRIPE_EVENT_BUFFER_SIZE, hooks);
    Ok(handlers)
}

fn no_op() -> BoxFuture<'static, ()> {
    Box::pin(async {})
}
