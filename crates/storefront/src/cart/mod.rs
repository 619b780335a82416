//! Session-backed shopping cart.
//!
//! A [`Cart`] is loaded from the visitor's [`Session`] at the start of a
//! request, mutated in memory, and written back under a single reserved key
//! (`CART_SESSION_ID`, see [`crate::config::StoreConfig::cart_session_key`]).
//! Every mutating operation commits immediately; tower-sessions persists the
//! record once the response is produced.
//!
//! Prices are snapshotted when a product is first added. Reading the cart for
//! display goes through [`Cart::items`], which resolves all products with a
//! single catalog lookup and yields [`CartItem`] views. The stored lines are
//! never modified by reading.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut cart = Cart::load(session, &config.cart_session_key).await?;
//! cart.add(&product, 2, QuantityUpdate::Increment).await?;
//! assert_eq!(cart.len(), 2);
//! ```

mod lines;

use std::collections::HashMap;

use myshop_core::{Price, ProductId};
use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::ProductCatalog;
use crate::models::Product;

pub use lines::{CartLine, CartLines};

/// Errors from reading or writing the cart in the session.
#[derive(Debug, Error)]
pub enum CartError {
    /// The session store failed, or the stored cart could not be decoded.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// How [`Cart::add`] combines the submitted quantity with the existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantityUpdate {
    /// Add to the quantity already in the cart.
    #[default]
    Increment,
    /// Overwrite the quantity already in the cart.
    Replace,
}

impl From<bool> for QuantityUpdate {
    /// Maps the form's `update` flag: `true` replaces, `false` increments.
    fn from(update: bool) -> Self {
        if update { Self::Replace } else { Self::Increment }
    }
}

/// A visitor's cart bound to their session.
#[derive(Debug)]
pub struct Cart {
    session: Session,
    key: String,
    lines: CartLines,
}

impl Cart {
    /// Load the cart stored under `key`, creating an empty one if the session
    /// has none yet.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails or the stored
    /// value is not a cart.
    #[instrument(skip(session))]
    pub async fn load(session: Session, key: &str) -> Result<Self, CartError> {
        let lines = match session.get::<CartLines>(key).await? {
            Some(lines) if !lines.is_empty() => lines,
            _ => {
                let lines = CartLines::default();
                session.insert(key, &lines).await?;
                lines
            }
        };

        Ok(Self {
            session,
            key: key.to_owned(),
            lines,
        })
    }

    /// Add `quantity` of `product`, or set its quantity when `update` is
    /// [`QuantityUpdate::Replace`].
    ///
    /// A product not yet in the cart gets a new line priced at the product's
    /// current price; later adds keep that snapshot. Quantities are not
    /// range-checked here, that is the form's job.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the cart cannot be written back.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(
        &mut self,
        product: &Product,
        quantity: u32,
        update: QuantityUpdate,
    ) -> Result<(), CartError> {
        let new_quantity =
            self.lines
                .update_quantity(product.id, product.price, |current| match update {
                    QuantityUpdate::Replace => quantity,
                    QuantityUpdate::Increment => current.saturating_add(quantity),
                });
        tracing::debug!(quantity = new_quantity, "cart line updated");

        self.save().await
    }

    /// Remove a product from the cart. Removing a product that is not in the
    /// cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the cart cannot be written back.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, product_id: ProductId) -> Result<(), CartError> {
        if self.lines.remove(product_id) {
            tracing::debug!("cart line removed");
            self.save().await?;
        }
        Ok(())
    }

    /// Write the cart back into the session, marking the session modified so
    /// the session layer persists it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    pub async fn save(&self) -> Result<(), CartError> {
        self.session.insert(&self.key, &self.lines).await?;
        Ok(())
    }

    /// Resolve the cart's products and return the lines as display items.
    ///
    /// All product IDs are looked up in one `find_by_ids` call. Lines whose
    /// product has disappeared from the catalog are still yielded, with
    /// `product` set to `None`. Each call performs a fresh lookup.
    ///
    /// # Errors
    ///
    /// Returns the catalog's error if the lookup fails.
    pub async fn items<C: ProductCatalog>(&self, catalog: &C) -> Result<CartItems<'_>, C::Error> {
        let products = if self.lines.is_empty() {
            HashMap::new()
        } else {
            let ids: Vec<ProductId> = self.lines.product_ids().collect();
            catalog
                .find_by_ids(&ids)
                .await?
                .into_iter()
                .map(|product| (product.id, product))
                .collect()
        };

        Ok(CartItems {
            lines: self.lines.iter(),
            products,
        })
    }

    /// Total number of units in the cart (sum of quantities, not of lines).
    #[must_use]
    pub fn len(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |total, line| total.saturating_add(line.quantity))
    }

    /// Whether the cart holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of `price × quantity` over all lines, from the stored snapshots.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::total_price).sum()
    }

    /// Quantity of `product_id` in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines.get(product_id).map_or(0, |line| line.quantity)
    }

    /// Whether `product_id` has a line in the cart.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.lines.get(product_id).is_some()
    }

    /// The stored lines, in the order products were first added.
    #[must_use]
    pub const fn lines(&self) -> &CartLines {
        &self.lines
    }

    /// Drop the cart from the session entirely.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), CartError> {
        self.session.remove_value(&self.key).await?;
        self.lines.clear();
        tracing::debug!("cart cleared");
        Ok(())
    }
}

/// A cart line joined with its catalog product, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: ProductId,
    /// The live catalog record, `None` if the product no longer exists.
    pub product: Option<Product>,
    pub quantity: u32,
    /// Unit price captured when the product was added.
    pub price: Price,
    pub total_price: Price,
}

/// Iterator returned by [`Cart::items`].
#[derive(Debug)]
pub struct CartItems<'a> {
    lines: std::slice::Iter<'a, CartLine>,
    products: HashMap<ProductId, Product>,
}

impl Iterator for CartItems<'_> {
    type Item = CartItem;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        Some(CartItem {
            product_id: line.product_id,
            product: self.products.remove(&line.product_id),
            quantity: line.quantity,
            price: line.price,
            total_price: line.total_price(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.lines.size_hint()
    }
}

impl ExactSizeIterator for CartItems<'_> {}
