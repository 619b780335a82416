//! Catalog lookup used by the cart.
//!
//! The cart only needs one operation from the product store: resolve a batch of
//! product IDs in a single round trip. [`crate::db::ProductRepository`] is the
//! `PostgreSQL` implementation.

use std::future::Future;

use myshop_core::ProductId;

use crate::models::Product;

/// Batch product lookup.
pub trait ProductCatalog {
    /// Error returned by the underlying store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch every product whose ID is in `ids`.
    ///
    /// Unknown IDs are skipped. The returned order is unspecified.
    fn find_by_ids(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send;
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::db::RepositoryError;

    /// In-memory catalog that counts how many batch lookups it served.
    #[derive(Default)]
    pub struct InMemoryCatalog {
        products: Mutex<Vec<Product>>,
        lookups: AtomicUsize,
    }

    impl InMemoryCatalog {
        pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
            Self {
                products: Mutex::new(products.into_iter().collect()),
                lookups: AtomicUsize::new(0),
            }
        }

        pub fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        /// Replace a product, e.g. to simulate a price change.
        #[allow(clippy::unwrap_used)]
        pub fn upsert(&self, product: Product) {
            let mut products = self.products.lock().unwrap();
            products.retain(|p| p.id != product.id);
            products.push(product);
        }

        #[allow(clippy::unwrap_used)]
        pub fn delete(&self, id: ProductId) {
            self.products.lock().unwrap().retain(|p| p.id != id);
        }
    }

    impl ProductCatalog for InMemoryCatalog {
        type Error = RepositoryError;

        #[allow(clippy::unwrap_used)]
        async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, Self::Error> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let products = self.products.lock().unwrap();
            // Reverse order on purpose: callers must not rely on result order.
            Ok(products
                .iter()
                .rev()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }
    }
}
