use chrono::Duration;
use log::*;
use shop_payment_engine::{db_types::Order, events::EventProducers, OrderFlowApi, SqliteDatabase};
use stripe_tools::StripeApi;
use tokio::task::JoinHandle;

/// Starts the expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_expiry_worker(
    db: SqliteDatabase,
    gateway: StripeApi,
    producers: EventProducers,
    check_interval: u64,
    unpaid_limit: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(check_interval));
        let api = OrderFlowApi::new(db, gateway, producers);
        info!("🕰️ Unpaid order expiry worker started");
        loop {
            timer.tick().await;
            trace!("🕰️ Running unpaid order expiry job");
            match api.expire_old_orders(unpaid_limit).await {
                Ok(expired) if expired.is_empty() => trace!("🕰️ No orders have expired"),
                Ok(expired) => {
                    info!("🕰️ {} orders expired", expired.len());
                    debug!("🕰️ Expired orders: {}", order_list(&expired));
                },
                Err(e) => error!("🕰️ Error running unpaid order expiry job: {e}"),
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] order_id: {} cust_id: {}", o.id, o.order_id, o.customer_id))
        .collect::<Vec<String>>()
        .join(", ")
}
