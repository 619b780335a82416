//! Order repository.

use myshop_core::OrderId;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{NewOrder, NewOrderItem, Order, OrderItem, OrderSummary};

const ORDER_COLUMNS: &str =
    "id, first_name, last_name, email, address, postal_code, city, paid, created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store an order and its lines in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a quantity does not fit
    /// the column, or `RepositoryError::Database` if any insert fails (nothing
    /// is stored in that case).
    pub async fn create(
        &self,
        order: &NewOrder,
        items: &[NewOrderItem],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO shop.orders (first_name, last_name, email, address, postal_code, city) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ORDER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Order>(&sql)
            .bind(&order.first_name)
            .bind(&order.last_name)
            .bind(&order.email)
            .bind(&order.address)
            .bind(&order.postal_code)
            .bind(&order.city)
            .fetch_one(&mut *tx)
            .await?;

        for item in items {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "quantity {} out of range for product {}",
                    item.quantity, item.product_id
                ))
            })?;

            sqlx::query(
                "INSERT INTO shop.order_items (order_id, product_id, price, quantity) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(created.id)
            .bind(item.product_id)
            .bind(item.price)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(order_id = %created.id, lines = items.len(), "order created");
        Ok(created)
    }

    /// An order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there is no such order.
    pub async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Lines of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, price, quantity \
             FROM shop.order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Most recent orders with their totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<OrderSummary>, RepositoryError> {
        let summaries = sqlx::query_as::<_, OrderSummary>(
            "SELECT o.id, o.first_name, o.last_name, o.email, o.address, o.postal_code, o.city, \
                    o.paid, o.created_at, \
                    COALESCE(SUM(i.price * i.quantity), 0)::NUMERIC(12, 2) AS total \
             FROM shop.orders o \
             LEFT JOIN shop.order_items i ON i.order_id = o.id \
             GROUP BY o.id \
             ORDER BY o.created_at DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(summaries)
    }
}
