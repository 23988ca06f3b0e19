use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use spg_common::{Cents, DEFAULT_CURRENCY};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        ---------------------------------------------------------

/// A lightweight wrapper around the public order identifier. Order ids are assigned by the gateway at checkout and
/// are the handle the storefront and the payment provider use to refer to an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Generates a fresh order id. Ids are random, not sequential, so they leak nothing about order volume.
    pub fn random() -> Self {
        Self(format!("ord-{:016x}", rand::random::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order is newly created. Payment has not been settled yet.
    New,
    /// Payment has settled and the stock decrement has been committed.
    Confirmed,
    /// The order was annulled before payment settled (checkout compensation, or the expiry sweep).
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "New"),
            OrderStatusType::Confirmed => write!(f, "Confirmed"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(Self::New),
            "Confirmed" => Ok(Self::Confirmed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. Defaulting to New");
            OrderStatusType::New
        })
    }
}

//--------------------------------------  PaymentStatusType    ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatusType {
    /// No settlement event has been received for the order yet.
    Pending,
    /// The payment provider reported a successful payment and the order has been settled.
    Paid,
    /// The payment provider reported that the payment attempt failed.
    Failed,
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatusType::Pending => write!(f, "Pending"),
            PaymentStatusType::Paid => write!(f, "Paid"),
            PaymentStatusType::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for PaymentStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

impl From<String> for PaymentStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status: {value}. Defaulting to Pending");
            PaymentStatusType::Pending
        })
    }
}

//--------------------------------------        Order         ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_id: String,
    pub shipping_address: String,
    pub memo: Option<String>,
    pub total_amount: Cents,
    pub currency: String,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: OrderStatusType,
    pub payment_status: PaymentStatusType,
}

impl Order {
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatusType::New && self.payment_status == PaymentStatusType::Pending
    }
}

//--------------------------------------       NewOrder       ---------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The order id assigned by the gateway at creation.
    pub order_id: OrderId,
    /// The storefront user placing the order.
    pub customer_id: String,
    /// Free-text delivery address captured at checkout.
    pub shipping_address: String,
    /// An optional annotation for the order.
    pub memo: Option<String>,
    /// The currency of the order.
    pub currency: String,
    /// The requested line items. Unit prices are not carried here; the storage layer prices each line against the
    /// catalog when the order is created.
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new<S1, S2>(customer_id: S1, shipping_address: S2, items: Vec<NewOrderItem>) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            order_id: OrderId::random(),
            customer_id: customer_id.into(),
            shipping_address: shipping_address.into(),
            memo: None,
            currency: DEFAULT_CURRENCY.to_string(),
            items,
        }
    }

    pub fn with_memo(mut self, memo: String) -> Self {
        self.memo = Some(memo);
        self
    }
}

//--------------------------------------     NewOrderItem     ---------------------------------------------------------

/// A (product, quantity) pair as requested by the customer. Used both for explicit checkout payloads and for cart
/// contents handed to the checkout flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
}

impl NewOrderItem {
    pub fn new<S: Into<String>>(product_id: S, quantity: i64) -> Self {
        Self { product_id: product_id.into(), quantity }
    }
}

//--------------------------------------      OrderItem       ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: String,
    pub quantity: i64,
    /// The catalog price captured when the order was created. The order total is the sum of `unit_price * quantity`
    /// over its items.
    pub unit_price: Cents,
}

impl OrderItem {
    pub fn line_total(&self) -> Cents {
        self.unit_price * self.quantity
    }
}

//--------------------------------------   OrderItemSource    ---------------------------------------------------------

/// Where the line items of a new order came from. Orders created from the stored cart clear that cart in the same
/// transaction that creates the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderItemSource {
    /// The items were supplied explicitly in the checkout payload.
    Explicit,
    /// The items were read from the customer's stored cart.
    CustomerCart,
}

//--------------------------------------       Product        ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub product_id: String,
    pub name: String,
    pub price: Cents,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewProduct      ---------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub product_id: String,
    pub name: String,
    pub price: Cents,
    pub stock: i64,
}

impl NewProduct {
    pub fn new<S1, S2>(product_id: S1, name: S2, price: Cents, stock: i64) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self { product_id: product_id.into(), name: name.into(), price, stock }
    }
}

//--------------------------------------       CartItem       ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub id: i64,
    pub customer_id: String,
    pub product_id: String,
    pub quantity: i64,
}

impl From<CartItem> for NewOrderItem {
    fn from(item: CartItem) -> Self {
        Self { product_id: item.product_id, quantity: item.quantity }
    }
}

//--------------------------------------  SettlementOutcome   ---------------------------------------------------------

/// The result of settling a successful payment against an order.
#[derive(Debug, Clone)]
pub enum SettlementOutcome {
    /// This delivery confirmed the order and committed the stock decrement.
    Settled(Order),
    /// A previous delivery of the same event already settled the order. Nothing was modified.
    AlreadySettled(Order),
}

impl SettlementOutcome {
    pub fn order(&self) -> &Order {
        match self {
            SettlementOutcome::Settled(order) | SettlementOutcome::AlreadySettled(order) => order,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, SettlementOutcome::AlreadySettled(_))
    }
}
