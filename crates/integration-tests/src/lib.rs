//! Integration tests for the Myshop storefront.
//!
//! The tests in `tests/` talk HTTP to a running storefront with a seeded
//! catalog and are ignored by default:
//!
//! ```bash
//! cargo run -p myshop-cli -- migrate
//! cargo run -p myshop-cli -- seed catalog.yaml
//! cargo run -p myshop-storefront &
//! cargo test -p myshop-integration-tests -- --ignored
//! ```
//!
//! `MYSHOP_TEST_URL` overrides the server address (default
//! `http://localhost:8000`).

use myshop_core::ProductId;
use reqwest::Client;

/// Base URL of the storefront under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("MYSHOP_TEST_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// A client with its own cookie jar, i.e. its own session and cart.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn client() -> reqwest::Result<Client> {
    Client::builder().cookie_store(true).build()
}

/// Product detail links (`/{id}/{slug}/`) found in an HTML page, in order.
#[must_use]
pub fn product_links(html: &str) -> Vec<(ProductId, String)> {
    html.split("href=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter_map(|href| {
            let mut parts = href.strip_prefix('/')?.strip_suffix('/')?.split('/');
            let id = parts.next()?.parse::<ProductId>().ok()?;
            let slug = parts.next()?;
            if parts.next().is_some() || slug.is_empty() {
                return None;
            }
            Some((id, href.to_string()))
        })
        .collect()
}

/// The first product listed on the shop front page.
///
/// # Errors
///
/// Returns an error if the request fails or no product is listed.
pub async fn first_product(client: &Client) -> Result<ProductId, Box<dyn std::error::Error>> {
    let html = client
        .get(format!("{}/", base_url()))
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    product_links(&html)
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| "no products listed; seed the catalog first".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_links() {
        let html = r#"
            <a href="/">All</a>
            <a href="/tea/">Tea</a>
            <a href="/7/green-tea/">Green tea</a>
            <a href="/cart/add/7/">x</a>
            <a href="/12/black-tea/">Black tea</a>
        "#;
        let links = product_links(html);
        assert_eq!(
            links,
            vec![
                (ProductId::new(7), "/7/green-tea/".to_string()),
                (ProductId::new(12), "/12/black-tea/".to_string()),
            ]
        );
    }
}
