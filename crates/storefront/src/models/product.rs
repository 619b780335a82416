//! Catalog domain types.

use chrono::{DateTime, Utc};
use myshop_core::{CategoryId, Price, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Current catalog price. Carts snapshot this when a line is created.
    pub price: Price,
    /// Path of the uploaded image, relative to the media root.
    pub image: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Public URL of the product image under the given media prefix.
    #[must_use]
    pub fn image_url(&self, media_url: &str) -> Option<String> {
        self.image.as_ref().map(|path| {
            format!(
                "{}/{}",
                media_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        })
    }
}
