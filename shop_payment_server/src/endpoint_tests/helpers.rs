use actix_web::{
    body::MessageBody,
    http::{header::ContentType, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use log::debug;
use shop_payment_engine::db_types::{Order, OrderId, OrderStatusType, PaymentStatusType};
use spg_common::{Cents, Secret};
use stripe_tools::{sign_payload, StripeConfig};

// The secret used to sign test webhook deliveries. DO NOT re-use this secret anywhere.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_3fb5ae4059b0f1c2ab19e34d";

pub fn stripe_test_config() -> StripeConfig {
    StripeConfig { webhook_secret: Secret::new(TEST_WEBHOOK_SECRET.to_string()), ..StripeConfig::default() }
}

/// Signs `payload` the way Stripe does, producing a `Stripe-Signature` header value that verifies against
/// [`stripe_test_config`].
pub fn signature_header(payload: &str) -> String {
    let timestamp = Utc::now().timestamp();
    let signature = sign_payload(payload.as_bytes(), TEST_WEBHOOK_SECRET, timestamp);
    format!("t={timestamp},v1={signature}")
}

pub async fn post_request(
    path: &str,
    body: String,
    signature: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post().uri(path).insert_header(ContentType::json());
    if !signature.is_empty() {
        req = req.insert_header(("Stripe-Signature", signature));
    }
    let req = req.set_payload(body).to_request();
    let app = App::new().configure(configure);

    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

// Mock order record returned from `create_pending_order` and the settlement calls
pub fn sample_order(payment_intent_id: Option<&str>) -> Order {
    Order {
        id: 1,
        order_id: OrderId("ord-00c0ffee5ca1ab1e".into()),
        customer_id: "cust-1001".to_string(),
        shipping_address: "14 Wallaby Way, Sydney".to_string(),
        memo: None,
        total_amount: Cents::from(5500),
        currency: "usd".to_string(),
        payment_intent_id: payment_intent_id.map(String::from),
        created_at: Utc.with_ymd_and_hms(2024, 7, 22, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 7, 22, 13, 30, 0).unwrap(),
        status: OrderStatusType::New,
        payment_status: PaymentStatusType::Pending,
    }
}
