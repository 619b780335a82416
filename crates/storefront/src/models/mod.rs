//! Domain models for the storefront.
//!
//! These types represent rows after they leave the database layer. The cart
//! keeps its own session representation in [`crate::cart`].

pub mod order;
pub mod product;

pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderSummary};
pub use product::{Category, Product};
