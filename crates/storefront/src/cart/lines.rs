//! Session representation of a cart.
//!
//! Stored under the cart key as a JSON object keyed by product ID:
//!
//! ```json
//! {"7": {"quantity": 2, "price": "9.99"}, "3": {"quantity": 1, "price": "12.00"}}
//! ```
//!
//! Keys are strings because JSON object keys must be. Prices are decimal
//! strings, never JSON numbers. Entry order is the order products were first
//! added.

use std::fmt;

use myshop_core::{Price, ProductId};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One product's quantity and price snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Catalog price captured when the line was created.
    pub price: Price,
}

impl CartLine {
    /// Price of this line (`price × quantity`).
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Value half of a stored entry.
#[derive(Serialize, Deserialize)]
struct LineEntry {
    quantity: u32,
    price: Price,
}

/// Ordered set of cart lines, unique by product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartLines(Vec<CartLine>);

impl CartLines {
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLine> {
        self.0.iter().find(|line| line.product_id == product_id)
    }

    /// Set the quantity of the line for `product_id` to `quantity(current)`.
    ///
    /// A missing line is created first with quantity 0 and `price`; an
    /// existing line keeps its price. Returns the new quantity.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        price: Price,
        quantity: impl FnOnce(u32) -> u32,
    ) -> u32 {
        if let Some(line) = self.0.iter_mut().find(|line| line.product_id == product_id) {
            line.quantity = quantity(line.quantity);
            return line.quantity;
        }

        let quantity = quantity(0);
        self.0.push(CartLine {
            product_id,
            quantity,
            price,
        });
        quantity
    }

    /// Insert `line`, replacing any line for the same product in place.
    fn insert(&mut self, line: CartLine) {
        match self.0.iter_mut().find(|existing| existing.product_id == line.product_id) {
            Some(existing) => *existing = line,
            None => self.0.push(line),
        }
    }

    /// Remove the line for `product_id`. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|line| line.product_id != product_id);
        self.0.len() != before
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartLine> {
        self.0.iter()
    }

    pub fn product_ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.0.iter().map(|line| line.product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<'a> IntoIterator for &'a CartLines {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for CartLines {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|line| {
            (
                line.product_id.to_string(),
                LineEntry {
                    quantity: line.quantity,
                    price: line.price,
                },
            )
        }))
    }
}

impl<'de> Deserialize<'de> for CartLines {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CartLinesVisitor)
    }
}

struct CartLinesVisitor;

impl<'de> Visitor<'de> for CartLinesVisitor {
    type Value = CartLines;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of product id to {quantity, price}")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut lines = CartLines(Vec::with_capacity(map.size_hint().unwrap_or(0)));
        while let Some((key, entry)) = map.next_entry::<String, LineEntry>()? {
            let product_id = key
                .parse::<ProductId>()
                .map_err(|_| de::Error::custom(format!("invalid product id key: {key:?}")))?;
            lines.insert(CartLine {
                product_id,
                quantity: entry.quantity,
                price: entry.price,
            });
        }
        Ok(lines)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    #[test]
    fn test_serialized_shape() {
        let mut lines = CartLines::default();
        lines.update_quantity(ProductId::new(7), price("9.99"), |_| 2);
        lines.update_quantity(ProductId::new(3), price("12.00"), |_| 1);

        let value = serde_json::to_value(&lines).unwrap();
        assert_eq!(
            value,
            json!({
                "7": {"quantity": 2, "price": "9.99"},
                "3": {"quantity": 1, "price": "12.00"},
            })
        );
    }

    #[test]
    fn test_entry_order_survives_json() {
        let mut lines = CartLines::default();
        for id in [9, 2, 5] {
            lines.update_quantity(ProductId::new(id), price("1.00"), |_| 1);
        }

        let text = serde_json::to_string(&lines).unwrap();
        let back: CartLines = serde_json::from_str(&text).unwrap();
        let ids: Vec<i32> = back.product_ids().map(|id| id.as_i32()).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn test_rejects_non_numeric_key() {
        let result: Result<CartLines, _> =
            serde_json::from_value(json!({"abc": {"quantity": 1, "price": "1.00"}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_keeps_first_price() {
        let mut lines = CartLines::default();
        assert_eq!(lines.update_quantity(ProductId::new(1), price("5.00"), |q| q + 2), 2);
        assert_eq!(lines.update_quantity(ProductId::new(1), price("7.00"), |q| q + 1), 3);

        let line = lines.get(ProductId::new(1)).unwrap();
        assert_eq!(line.price, price("5.00"));
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn test_duplicate_key_keeps_position_and_last_value() {
        let lines: CartLines = serde_json::from_str(
            r#"{"1": {"quantity": 1, "price": "1.00"}, "2": {"quantity": 1, "price": "2.00"}, "1": {"quantity": 4, "price": "1.50"}}"#,
        )
        .unwrap();

        let ids: Vec<i32> = lines.product_ids().map(|id| id.as_i32()).collect();
        assert_eq!(ids, vec![1, 2]);
        let line = lines.get(ProductId::new(1)).unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(line.price, price("1.50"));
    }

    #[test]
    fn test_remove_reports_change() {
        let mut lines = CartLines::default();
        lines.update_quantity(ProductId::new(1), price("5.00"), |_| 1);
        assert!(lines.remove(ProductId::new(1)));
        assert!(!lines.remove(ProductId::new(1)));
        assert!(lines.is_empty());
    }
}
