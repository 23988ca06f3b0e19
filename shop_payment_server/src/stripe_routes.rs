//----------------------------------------------   Checkout  ----------------------------------------------------

use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info, trace, warn};
use shop_payment_engine::{
    db_types::SettlementOutcome,
    order_objects::CheckoutRequest,
    OrderFlowApi,
    PaymentGateway,
    PaymentGatewayDatabase,
};
use stripe_tools::{verify_webhook_signature, PaymentEvent, StripeConfig, WebhookEvent};

use crate::{
    data_objects::{CheckoutPayload, CheckoutResult, WebhookAck},
    errors::ServerError,
    route,
};

route!(checkout => Post "/checkout" impl PaymentGatewayDatabase, PaymentGateway);
/// Route handler for the checkout endpoint.
///
/// Stores a pending order for the customer (pricing the line items against the catalog), asks Stripe for a payment
/// intent over the order total, and returns the intent's client secret to the storefront. When the request carries
/// no line items, the customer's stored cart is used and emptied in the same transaction.
///
/// No stock moves here. Stock is decremented when Stripe reports the payment as settled on the webhook route.
pub async fn checkout<BPay, GPay>(
    body: web::Json<CheckoutPayload>,
    api: web::Data<OrderFlowApi<BPay, GPay>>,
) -> Result<HttpResponse, ServerError>
where
    BPay: PaymentGatewayDatabase,
    GPay: PaymentGateway,
{
    let payload = body.into_inner();
    debug!("🛒️ POST checkout for customer {}", payload.customer_id);
    let summary = api.checkout(CheckoutRequest::from(payload)).await?;
    Ok(HttpResponse::Ok().json(CheckoutResult::from(summary)))
}

//----------------------------------------------   Webhook  ----------------------------------------------------

route!(stripe_webhook => Post "/webhook" impl PaymentGatewayDatabase, PaymentGateway);
/// Route handler for Stripe webhook event deliveries.
///
/// The signature in the `Stripe-Signature` header is verified against the raw body *before* anything is parsed;
/// unauthenticated deliveries are rejected with a 401. Recognized events are fed into the engine:
/// * `payment_intent.succeeded` settles the order: confirmation and the stock decrement commit atomically, and a
///   repeat delivery for an already settled order is acknowledged without doing anything.
/// * `payment_intent.payment_failed` marks the order's payment as failed.
///
/// Every other event type is acknowledged and ignored. Error responses are chosen for Stripe's retry behaviour:
/// anything outside the 2xx range is redelivered with backoff, so transient problems (a busy database, an intent
/// whose order has not committed yet) return non-2xx, while conflicts that a redelivery can never fix are logged
/// loudly by the engine and also surface as errors for the operator to act on.
pub async fn stripe_webhook<BPay, GPay>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<OrderFlowApi<BPay, GPay>>,
    config: web::Data<StripeConfig>,
) -> Result<HttpResponse, ServerError>
where
    BPay: PaymentGatewayDatabase,
    GPay: PaymentGateway,
{
    trace!("🪝️ Received webhook delivery: {}", req.uri());
    let signature = req
        .headers()
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::InvalidSignature("The Stripe-Signature header is missing".to_string()))?;
    verify_webhook_signature(&body, signature, config.webhook_secret.reveal(), config.signature_tolerance).map_err(
        |e| {
            warn!("🪝️ A webhook delivery failed signature verification. {e}");
            ServerError::from(e)
        },
    )?;
    let event = serde_json::from_slice::<WebhookEvent>(&body).map_err(|e| {
        warn!("🪝️ Could not parse a verified webhook payload. {e}");
        ServerError::CouldNotDeserializePayload
    })?;
    debug!("🪝️ Verified {} delivery {}", event.event_type, event.id);
    match PaymentEvent::from(event) {
        PaymentEvent::PaymentSucceeded(intent) => match api.settle_webhook_payment(&intent.id).await? {
            SettlementOutcome::Settled(order) => {
                info!("🪝️ Order {} is confirmed and paid via intent {}", order.order_id, intent.id);
            },
            SettlementOutcome::AlreadySettled(order) => {
                debug!("🪝️ Repeat success delivery for settled order {}. Acknowledged", order.order_id);
            },
        },
        PaymentEvent::PaymentFailed(intent) => match api.fail_webhook_payment(&intent.id).await? {
            Some(order) => info!("🪝️ Payment for order {} failed. The order remains open", order.order_id),
            None => debug!("🪝️ Failure event for intent {} changed nothing. Acknowledged", intent.id),
        },
        PaymentEvent::Unhandled(event_type) => {
            debug!("🪝️ Ignoring {event_type} event");
        },
    }
    Ok(HttpResponse::Ok().json(WebhookAck::received()))
}
