//! Catalog repositories.

use myshop_core::{CategoryId, ProductId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::catalog::ProductCatalog;
use crate::models::{Category, Product};

const PRODUCT_COLUMNS: &str = "id, category_id, name, slug, description, price, image, \
                               available, created_at, updated_at";

/// Repository for product queries.
#[derive(Clone, Copy)]
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Available products, optionally limited to one category, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_available(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products \
             WHERE available AND ($1::INT IS NULL OR category_id = $1) \
             ORDER BY name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(category_id)
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// An available product by ID, only if its slug also matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_available(
        &self,
        id: ProductId,
        slug: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products \
             WHERE id = $1 AND slug = $2 AND available"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Any product by ID, available or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = $1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Every product, newest first (admin overview).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.products ORDER BY created_at DESC");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }
}

impl ProductCatalog for ProductRepository<'_> {
    type Error = RepositoryError;

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, Self::Error> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = ANY($1)");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(ids)
            .fetch_all(self.pool)
            .await?;
        tracing::debug!(requested = ids.len(), found = products.len(), "catalog batch lookup");
        Ok(products)
    }
}

/// Repository for category queries.
#[derive(Clone, Copy)]
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug FROM shop.categories ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// A category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug FROM shop.categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(category)
    }

    /// A category by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug FROM shop.categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(category)
    }
}
