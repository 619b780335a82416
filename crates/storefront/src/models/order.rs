//! Order domain types.

use chrono::{DateTime, Utc};
use myshop_core::{OrderId, OrderItemId, Price, ProductId};

/// A placed order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

/// One product line of an order, priced at checkout time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub price: Price,
    pub quantity: i32,
}

impl OrderItem {
    /// Price of this line.
    #[must_use]
    pub fn cost(&self) -> Price {
        self.price.times(u32::try_from(self.quantity).unwrap_or(0))
    }
}

/// Customer details for an order that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
}

/// A line to store with a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub price: Price,
    pub quantity: u32,
}

/// An order with its computed total, for listings.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderSummary {
    #[sqlx(flatten)]
    pub order: Order,
    pub total: Price,
}
