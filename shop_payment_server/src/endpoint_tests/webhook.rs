use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use shop_payment_engine::{
    db_types::{OrderStatusType, PaymentStatusType, SettlementOutcome},
    events::EventProducers,
    OrderFlowApi,
    PaymentGatewayError,
};

use super::{
    helpers::{post_request, sample_order, signature_header, stripe_test_config},
    mocks::{MockGateway, MockPaymentDb},
};
use crate::stripe_routes::StripeWebhookRoute;

#[actix_web::test]
async fn a_signed_success_event_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let payload = success_event("pi_3FAKEfakefake");
    let signature = signature_header(&payload);
    let (status, body) =
        post_request("/webhook", payload, &signature, configure_settling_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ACK_JSON);
}

#[actix_web::test]
async fn a_repeat_success_delivery_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let payload = success_event("pi_3FAKEfakefake");
    let signature = signature_header(&payload);
    let (status, body) =
        post_request("/webhook", payload, &signature, configure_already_settled).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ACK_JSON);
}

#[actix_web::test]
async fn an_unsigned_delivery_is_rejected() {
    let _ = env_logger::try_init().ok();
    let payload = success_event("pi_3FAKEfakefake");
    let (status, body) =
        post_request("/webhook", payload, "", configure_untouched_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        r#"{"error":"Webhook delivery could not be authenticated. The Stripe-Signature header is missing"}"#
    );
}

#[actix_web::test]
async fn a_tampered_delivery_is_rejected() {
    let _ = env_logger::try_init().ok();
    let payload = success_event("pi_3FAKEfakefake");
    let signature = signature_header(&payload);
    let tampered = payload.replace("pi_3FAKEfakefake", "pi_3EvilEvilEvil");
    let (status, body) =
        post_request("/webhook", tampered, &signature, configure_untouched_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Webhook delivery could not be authenticated. The signature does not match the payload"}"#);
}

#[actix_web::test]
async fn a_signed_but_garbled_delivery_is_rejected() {
    let _ = env_logger::try_init().ok();
    // Authenticates, but carries no data object.
    let payload = json!({ "id": "evt_3PIqyKFQ3zHcyo1x", "type": "payment_intent.succeeded" }).to_string();
    let signature = signature_header(&payload);
    let (status, body) =
        post_request("/webhook", payload, &signature, configure_untouched_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Payload deserialization error"}"#);
}

#[actix_web::test]
async fn a_failed_payment_marks_the_order() {
    let _ = env_logger::try_init().ok();
    let payload = failure_event("pi_3FAKEfakefake");
    let signature = signature_header(&payload);
    let (status, body) =
        post_request("/webhook", payload, &signature, configure_failing_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ACK_JSON);
}

#[actix_web::test]
async fn an_unrecognized_event_type_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let payload = success_event("pi_3FAKEfakefake").replace("payment_intent.succeeded", "charge.refunded");
    let signature = signature_header(&payload);
    let (status, body) =
        post_request("/webhook", payload, &signature, configure_untouched_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ACK_JSON);
}

#[actix_web::test]
async fn an_event_for_an_unknown_intent_is_not_acknowledged() {
    let _ = env_logger::try_init().ok();
    let payload = success_event("pi_3FAKEfakefake");
    let signature = signature_header(&payload);
    let (status, body) =
        post_request("/webhook", payload, &signature, configure_unknown_intent).await.expect("Request failed");
    // Stripe redelivers on 404, and a redelivery succeeds once the matching checkout has committed.
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        r#"{"error":"The data was not found. No order is associated with payment intent pi_3FAKEfakefake"}"#
    );
}

#[actix_web::test]
async fn settlement_without_stock_is_an_operator_problem() {
    let _ = env_logger::try_init().ok();
    let payload = success_event("pi_3FAKEfakefake");
    let signature = signature_header(&payload);
    let (status, body) =
        post_request("/webhook", payload, &signature, configure_out_of_stock).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        r#"{"error":"An error occurred on the backend of the server. Insufficient stock of product prod-leaf-tea: 2 requested, 1 available"}"#
    );
}

fn success_event(intent_id: &str) -> String {
    json!({
        "id": "evt_3PIqyKFQ3zHcyo1x",
        "type": "payment_intent.succeeded",
        "data": { "object": {
            "id": intent_id,
            "amount": 5500,
            "currency": "usd",
            "status": "succeeded",
            "metadata": { "order_id": "ord-00c0ffee5ca1ab1e", "customer_id": "cust-1001" }
        } }
    })
    .to_string()
}

fn failure_event(intent_id: &str) -> String {
    json!({
        "id": "evt_3PIqyLFQ9zHcyo2y",
        "type": "payment_intent.payment_failed",
        "data": { "object": {
            "id": intent_id,
            "amount": 5500,
            "currency": "usd",
            "status": "requires_payment_method",
            "metadata": { "order_id": "ord-00c0ffee5ca1ab1e", "customer_id": "cust-1001" }
        } }
    })
    .to_string()
}

fn configure_settling_backend(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentDb::new();
    db.expect_settle_order_by_intent().returning(|intent_id| {
        let mut order = sample_order(Some(intent_id));
        order.status = OrderStatusType::Confirmed;
        order.payment_status = PaymentStatusType::Paid;
        Ok(SettlementOutcome::Settled(order))
    });
    register_routes(cfg, db);
}

fn configure_already_settled(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentDb::new();
    db.expect_settle_order_by_intent().returning(|intent_id| {
        let mut order = sample_order(Some(intent_id));
        order.status = OrderStatusType::Confirmed;
        order.payment_status = PaymentStatusType::Paid;
        Ok(SettlementOutcome::AlreadySettled(order))
    });
    register_routes(cfg, db);
}

fn configure_untouched_backend(cfg: &mut ServiceConfig) {
    register_routes(cfg, MockPaymentDb::new());
}

fn configure_failing_backend(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentDb::new();
    db.expect_fail_order_by_intent().returning(|intent_id| {
        let mut order = sample_order(Some(intent_id));
        order.payment_status = PaymentStatusType::Failed;
        Ok(Some(order))
    });
    register_routes(cfg, db);
}

fn configure_unknown_intent(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentDb::new();
    db.expect_settle_order_by_intent()
        .returning(|intent_id| Err(PaymentGatewayError::OrderNotFoundForIntent(intent_id.to_string())));
    register_routes(cfg, db);
}

fn configure_out_of_stock(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentDb::new();
    db.expect_settle_order_by_intent().returning(|_| {
        Err(PaymentGatewayError::InsufficientStock {
            product_id: "prod-leaf-tea".to_string(),
            requested: 2,
            available: 1,
        })
    });
    register_routes(cfg, db);
}

fn register_routes(cfg: &mut ServiceConfig, db: MockPaymentDb) {
    let api = OrderFlowApi::new(db, MockGateway::new(), EventProducers::default());
    cfg.service(StripeWebhookRoute::<MockPaymentDb, MockGateway>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(stripe_test_config()));
}

const ACK_JSON: &str = r#"{"received":true}"#;
