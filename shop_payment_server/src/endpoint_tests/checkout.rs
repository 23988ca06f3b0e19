use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use shop_payment_engine::{
    db_types::OrderStatusType,
    events::EventProducers,
    traits::PaymentIntent,
    OrderFlowApi,
    PaymentProviderError,
};
use spg_common::Cents;

use super::{
    helpers::{post_request, sample_order},
    mocks::{MockGateway, MockPaymentDb},
};
use crate::stripe_routes::CheckoutRoute;

#[actix_web::test]
async fn checkout_with_explicit_items() {
    let _ = env_logger::try_init().ok();
    let body = valid_payload();
    let (status, body) = post_request("/checkout", body, "", configure_accepting_gateway).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, CHECKOUT_JSON);
}

#[actix_web::test]
async fn checkout_without_an_address_is_rejected() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "customerId": "cust-1001",
        "shippingAddress": "",
        "items": [{ "productId": "prod-leaf-tea", "quantity": 2 }]
    })
    .to_string();
    let (status, body) = post_request("/checkout", body, "", configure_untouched_backend).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        r#"{"error":"Could not read request body: The checkout request is missing the required field shipping_address"}"#
    );
}

#[actix_web::test]
async fn checkout_with_an_empty_cart_is_rejected() {
    let _ = env_logger::try_init().ok();
    // No explicit items, so the order is built from the stored cart, which is empty.
    let body = json!({ "customerId": "cust-1001", "shippingAddress": "14 Wallaby Way, Sydney" }).to_string();
    let (status, body) = post_request("/checkout", body, "", configure_empty_cart).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: Cannot create an order with no line items"}"#);
}

#[actix_web::test]
async fn checkout_rolls_back_when_the_gateway_refuses() {
    let _ = env_logger::try_init().ok();
    let body = valid_payload();
    let (status, body) = post_request("/checkout", body, "", configure_refusing_gateway).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        r#"{"error":"The payment provider could not complete the request. The payment provider rejected the request: Amount must be at least $0.50 usd"}"#
    );
}

fn valid_payload() -> String {
    json!({
        "customerId": "cust-1001",
        "shippingAddress": "14 Wallaby Way, Sydney",
        "items": [{ "productId": "prod-leaf-tea", "quantity": 2 }]
    })
    .to_string()
}

fn configure_accepting_gateway(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentDb::new();
    db.expect_create_pending_order().returning(|_, _| Ok(sample_order(None)));
    db.expect_attach_payment_intent().returning(|_, intent_id| Ok(sample_order(Some(intent_id))));
    let mut gateway = MockGateway::new();
    gateway.expect_create_payment_intent().withf(|request| request.amount == Cents::from(5500)).returning(|_| {
        Ok(PaymentIntent {
            id: "pi_3FAKEfakefake".to_string(),
            client_secret: "pi_3FAKEfakefake_secret_b0gU5".to_string(),
        })
    });
    register_routes(cfg, db, gateway);
}

fn configure_untouched_backend(cfg: &mut ServiceConfig) {
    register_routes(cfg, MockPaymentDb::new(), MockGateway::new());
}

fn configure_empty_cart(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentDb::new();
    db.expect_cart_for_customer().returning(|_| Ok(vec![]));
    register_routes(cfg, db, MockGateway::new());
}

fn configure_refusing_gateway(cfg: &mut ServiceConfig) {
    let mut db = MockPaymentDb::new();
    db.expect_create_pending_order().returning(|_, _| Ok(sample_order(None)));
    db.expect_cancel_order().times(1).returning(|_, _| {
        let mut order = sample_order(None);
        order.status = OrderStatusType::Cancelled;
        Ok(order)
    });
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_payment_intent()
        .returning(|_| Err(PaymentProviderError::RequestRejected("Amount must be at least $0.50 usd".to_string())));
    register_routes(cfg, db, gateway);
}

fn register_routes(cfg: &mut ServiceConfig, db: MockPaymentDb, gateway: MockGateway) {
    let api = OrderFlowApi::new(db, gateway, EventProducers::default());
    cfg.service(CheckoutRoute::<MockPaymentDb, MockGateway>::new()).app_data(web::Data::new(api));
}

const CHECKOUT_JSON: &str =
    r#"{"success":true,"orderId":"ord-00c0ffee5ca1ab1e","clientSecret":"pi_3FAKEfakefake_secret_b0gU5"}"#;
