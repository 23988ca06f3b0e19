use chrono::Duration;
use mockall::mock;
use shop_payment_engine::{
    db_types::{
        CartItem,
        NewOrder,
        NewOrderItem,
        NewProduct,
        Order,
        OrderId,
        OrderItem,
        OrderItemSource,
        Product,
        SettlementOutcome,
    },
    traits::{NewPaymentIntent, PaymentIntent},
    CartManagement,
    CatalogManagement,
    OrderManagement,
    PaymentGateway,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    PaymentProviderError,
};

mock! {
    pub PaymentDb {}

    impl Clone for PaymentDb {
        fn clone(&self) -> Self;
    }

    impl OrderManagement for PaymentDb {
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_order_by_payment_intent(&self, payment_intent_id: &str) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, PaymentGatewayError>;
        async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, PaymentGatewayError>;
    }

    impl CartManagement for PaymentDb {
        async fn cart_for_customer(&self, customer_id: &str) -> Result<Vec<CartItem>, PaymentGatewayError>;
        async fn replace_cart(&self, customer_id: &str, items: &[NewOrderItem]) -> Result<Vec<CartItem>, PaymentGatewayError>;
        async fn clear_cart(&self, customer_id: &str) -> Result<u64, PaymentGatewayError>;
    }

    impl CatalogManagement for PaymentDb {
        async fn upsert_product(&self, product: NewProduct) -> Result<Product, PaymentGatewayError>;
        async fn fetch_product(&self, product_id: &str) -> Result<Option<Product>, PaymentGatewayError>;
    }

    impl PaymentGatewayDatabase for PaymentDb {
        fn url(&self) -> &str;
        async fn create_pending_order(&self, order: NewOrder, source: OrderItemSource) -> Result<Order, PaymentGatewayError>;
        async fn attach_payment_intent(&self, order_id: &OrderId, payment_intent_id: &str) -> Result<Order, PaymentGatewayError>;
        async fn cancel_order(&self, order_id: &OrderId, reason: &str) -> Result<Order, PaymentGatewayError>;
        async fn settle_order_by_intent(&self, payment_intent_id: &str) -> Result<SettlementOutcome, PaymentGatewayError>;
        async fn fail_order_by_intent(&self, payment_intent_id: &str) -> Result<Option<Order>, PaymentGatewayError>;
        async fn expire_old_orders(&self, unpaid_limit: Duration) -> Result<Vec<Order>, PaymentGatewayError>;
    }
}

mock! {
    pub Gateway {}

    impl Clone for Gateway {
        fn clone(&self) -> Self;
    }

    impl PaymentGateway for Gateway {
        async fn create_payment_intent(&self, request: NewPaymentIntent) -> Result<PaymentIntent, PaymentProviderError>;
        async fn cancel_payment_intent(&self, payment_intent_id: &str) -> Result<(), PaymentProviderError>;
    }
}
