//! Read-only admin overview.
//!
//! Lists categories, every product (available or not) and the most recent
//! orders with their totals, plus a detail page per order. There is no
//! editing here; catalog changes go through `myshop-cli seed`. Deploy behind a
//! network restriction.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use myshop_core::{OrderId, Price, ProductId};
use tracing::instrument;

use crate::catalog::ProductCatalog;
use crate::error::{AppError, Result};
use crate::models::{Category, Order};
use crate::state::AppState;
use crate::urls;

/// Number of orders shown on the overview.
const RECENT_ORDERS: i64 = 20;

/// Product row.
#[derive(Debug, Clone)]
pub struct AdminProductRow {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub available: bool,
    pub url: String,
    pub updated_at: DateTime<Utc>,
}

/// Order row.
#[derive(Debug, Clone)]
pub struct AdminOrderRow {
    pub id: OrderId,
    pub customer: String,
    pub email: String,
    pub city: String,
    pub paid: bool,
    pub total: Price,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

/// Line of the order detail page.
#[derive(Debug, Clone)]
pub struct AdminOrderLine {
    pub product_id: ProductId,
    /// Current catalog name, empty if the product has been deleted.
    pub product_name: String,
    pub price: Price,
    pub quantity: i32,
    pub cost: Price,
}

/// Admin overview template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminIndexTemplate {
    pub categories: Vec<Category>,
    pub products: Vec<AdminProductRow>,
    pub orders: Vec<AdminOrderRow>,
    pub shop_url: String,
}

/// Admin order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/order.html")]
pub struct AdminOrderTemplate {
    pub order: Order,
    pub lines: Vec<AdminOrderLine>,
    pub total: Price,
    pub index_url: String,
}

/// Admin overview page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<AdminIndexTemplate> {
    let categories = state.categories().list().await?;
    let products = state
        .products()
        .list_all()
        .await?
        .into_iter()
        .map(|product| AdminProductRow {
            category: categories
                .iter()
                .find(|c| c.id == product.category_id)
                .map_or_else(String::new, |c| c.name.clone()),
            url: urls::product_detail(product.id, &product.slug),
            id: product.id,
            name: product.name,
            price: product.price,
            available: product.available,
            updated_at: product.updated_at,
        })
        .collect();

    let orders = state
        .orders()
        .recent(RECENT_ORDERS)
        .await?
        .into_iter()
        .map(|summary| AdminOrderRow {
            url: urls::admin_order(summary.order.id),
            id: summary.order.id,
            customer: format!("{} {}", summary.order.first_name, summary.order.last_name),
            email: summary.order.email,
            city: summary.order.city,
            paid: summary.order.paid,
            total: summary.total,
            created_at: summary.order.created_at,
        })
        .collect();

    Ok(AdminIndexTemplate {
        categories,
        products,
        orders,
        shop_url: urls::product_list(),
    })
}

/// One order with its lines, priced as they were at checkout.
#[instrument(skip(state))]
pub async fn order_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<AdminOrderTemplate> {
    let order_id: OrderId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("order {id}")))?;

    let orders = state.orders();
    let order = orders.get(order_id).await?;
    let items = orders.items(order_id).await?;

    let ids: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
    let products = state.products().find_by_ids(&ids).await?;

    let lines: Vec<AdminOrderLine> = items
        .iter()
        .map(|item| AdminOrderLine {
            product_id: item.product_id,
            product_name: products
                .iter()
                .find(|p| p.id == item.product_id)
                .map_or_else(String::new, |p| p.name.clone()),
            price: item.price,
            quantity: item.quantity,
            cost: item.cost(),
        })
        .collect();
    let total = lines.iter().map(|line| line.cost).sum();

    Ok(AdminOrderTemplate {
        order,
        lines,
        total,
        index_url: urls::admin_index(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{get, test_app};

    #[tokio::test]
    async fn test_order_detail_rejects_non_numeric_id() {
        let app = test_app(false);
        let response = get(app, "/admin/orders/latest/").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
