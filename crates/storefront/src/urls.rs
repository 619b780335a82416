//! Named routes.
//!
//! Handlers redirect and templates link through these helpers instead of
//! spelling paths out, so a path changes in one place.

use myshop_core::{OrderId, ProductId};

pub const CART_PREFIX: &str = "/cart";
pub const ORDERS_PREFIX: &str = "/orders";
pub const ADMIN_PREFIX: &str = "/admin";
pub const STATIC_PREFIX: &str = "/static";

/// `shop:product_list`
#[must_use]
pub fn product_list() -> String {
    "/".to_string()
}

/// `shop:product_list_by_category`
#[must_use]
pub fn product_list_by_category(category_slug: &str) -> String {
    format!("/{category_slug}/")
}

/// `shop:product_detail`
#[must_use]
pub fn product_detail(id: ProductId, slug: &str) -> String {
    format!("/{id}/{slug}/")
}

/// `cart:cart_detail`
#[must_use]
pub fn cart_detail() -> String {
    format!("{CART_PREFIX}/")
}

/// `cart:cart_add`
#[must_use]
pub fn cart_add(product_id: ProductId) -> String {
    format!("{CART_PREFIX}/add/{product_id}/")
}

/// `cart:cart_remove`
#[must_use]
pub fn cart_remove(product_id: ProductId) -> String {
    format!("{CART_PREFIX}/remove/{product_id}/")
}

/// `orders:order_create`
#[must_use]
pub fn order_create() -> String {
    format!("{ORDERS_PREFIX}/create/")
}

/// `admin:index`
#[must_use]
pub fn admin_index() -> String {
    format!("{ADMIN_PREFIX}/")
}

/// `admin:order_detail`
#[must_use]
pub fn admin_order(id: OrderId) -> String {
    format!("{ADMIN_PREFIX}/orders/{id}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(product_list(), "/");
        assert_eq!(product_list_by_category("tea"), "/tea/");
        assert_eq!(product_detail(ProductId::new(7), "green-tea"), "/7/green-tea/");
        assert_eq!(cart_detail(), "/cart/");
        assert_eq!(cart_add(ProductId::new(7)), "/cart/add/7/");
        assert_eq!(cart_remove(ProductId::new(7)), "/cart/remove/7/");
        assert_eq!(order_create(), "/orders/create/");
        assert_eq!(admin_index(), "/admin/");
        assert_eq!(admin_order(OrderId::new(3)), "/admin/orders/3/");
    }
}
