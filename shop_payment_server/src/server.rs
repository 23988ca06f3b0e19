use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use shop_payment_engine::{events::EventProducers, OrderFlowApi, SqliteDatabase};
use stripe_tools::StripeApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    integrations::stripe::create_stripe_event_handlers,
    routes::health,
    stripe_routes::{CheckoutRoute, StripeWebhookRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_stripe_event_handlers(config.stripe_config.clone())?;
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let gateway = StripeApi::new(config.stripe_config.clone())?;
    let _expiry_worker = start_expiry_worker(
        db.clone(),
        gateway.clone(),
        producers.clone(),
        config.expiry_check_interval,
        config.unpaid_order_timeout,
    );
    info!("📬️ Event handlers and expiry worker are running");
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: StripeApi,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let stripe_config = config.stripe_config.clone();
    let srv = HttpServer::new(move || {
        let order_api = OrderFlowApi::new(db.clone(), gateway.clone(), producers.clone());
        let payment_scope = web::scope("/payment")
            .service(CheckoutRoute::<SqliteDatabase, StripeApi>::new())
            .service(StripeWebhookRoute::<SqliteDatabase, StripeApi>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("spg::access_log"))
            .app_data(web::Data::new(order_api))
            .app_data(web::Data::new(stripe_config.clone()))
            .service(health)
            .service(payment_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
