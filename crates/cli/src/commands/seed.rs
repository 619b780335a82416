//! Seed the catalog from a YAML file.
//!
//! Categories are matched by slug and products by `(category, slug)`, so the
//! command can be re-run after editing the file: existing rows are updated,
//! new ones inserted, nothing is deleted.
//!
//! ```yaml
//! categories:
//!   - name: Tea
//!     slug: tea
//!     products:
//!       - name: Green tea
//!         slug: green-tea
//!         description: Steamed sencha.
//!         price: "9.99"
//!         image: products/green-tea.jpg
//! ```
//!
//! Prices must be quoted so they stay exact decimals.

use std::collections::HashSet;
use std::path::Path;

use myshop_core::{CategoryId, Price};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use super::migrate::database_url;

/// Top-level layout of the seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub categories: Vec<CategorySeed>,
}

#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

/// Rows written by a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
}

/// Slugs are lowercase ASCII letters, digits, `-` and `_`.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

/// Check the file before touching the database. Returns every problem found.
#[must_use]
pub fn validate(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut category_slugs = HashSet::new();

    for category in &catalog.categories {
        if category.name.trim().is_empty() {
            errors.push(format!("category {:?}: name is empty", category.slug));
        }
        if !is_valid_slug(&category.slug) {
            errors.push(format!("category {:?}: invalid slug", category.slug));
        }
        if !category_slugs.insert(category.slug.as_str()) {
            errors.push(format!("category {:?}: duplicate slug", category.slug));
        }

        let mut product_slugs = HashSet::new();
        for product in &category.products {
            let at = format!("{}/{}", category.slug, product.slug);
            if product.name.trim().is_empty() {
                errors.push(format!("product {at:?}: name is empty"));
            }
            if !is_valid_slug(&product.slug) {
                errors.push(format!("product {at:?}: invalid slug"));
            }
            if !product_slugs.insert(product.slug.as_str()) {
                errors.push(format!("product {at:?}: duplicate slug"));
            }
            if product.price < Price::ZERO {
                errors.push(format!("product {at:?}: price is negative"));
            }
        }
    }

    errors
}

/// Seed categories and products from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database write fails (in which case nothing is written).
pub async fn catalog(path: &Path) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let database_url = database_url()?;

    info!(path = %path.display(), "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    let errors = validate(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = PgPool::connect(database_url.expose_secret()).await?;
    info!("Connected to database");

    Ok(write_catalog(&pool, &catalog).await?)
}

/// Upsert the whole catalog in one transaction.
async fn write_catalog(pool: &PgPool, catalog: &CatalogFile) -> Result<SeedSummary, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for category in &catalog.categories {
        let category_id: CategoryId = sqlx::query_scalar(
            "INSERT INTO shop.categories (name, slug) VALUES ($1, $2) \
             ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id",
        )
        .bind(&category.name)
        .bind(&category.slug)
        .fetch_one(&mut *tx)
        .await?;
        summary.categories += 1;

        for product in &category.products {
            sqlx::query(
                "INSERT INTO shop.products \
                     (category_id, name, slug, description, price, image, available) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (category_id, slug) DO UPDATE SET \
                     name = EXCLUDED.name, \
                     description = EXCLUDED.description, \
                     price = EXCLUDED.price, \
                     image = EXCLUDED.image, \
                     available = EXCLUDED.available, \
                     updated_at = NOW()",
            )
            .bind(category_id)
            .bind(&product.name)
            .bind(&product.slug)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.image.as_deref())
            .bind(product.available)
            .execute(&mut *tx)
            .await?;
            summary.products += 1;
        }

        info!(category = %category.slug, products = category.products.len(), "Seeded category");
    }

    tx.commit().await?;
    Ok(summary)
}
