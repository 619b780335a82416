//! Shop route handlers: product listings and product detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use myshop_core::{Price, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::Cart;
use crate::error::{AppError, Result};
use crate::forms::{CartAddProductForm, QuantityChoice};
use crate::models::{Category, Product};
use crate::routes::CartSummary;
use crate::state::AppState;
use crate::urls;

/// Product card data for listings.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub name: String,
    pub price: Price,
    pub url: String,
    pub image_url: Option<String>,
}

impl ProductCard {
    fn new(product: &Product, media_url: &str) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            url: urls::product_detail(product.id, &product.slug),
            image_url: product.image_url(media_url),
        }
    }
}

/// Category link for the sidebar.
#[derive(Debug, Clone)]
pub struct CategoryLink {
    pub name: String,
    pub url: String,
    pub selected: bool,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/list.html")]
pub struct ProductListTemplate {
    pub cart_summary: CartSummary,
    pub title: String,
    pub all_url: String,
    pub all_selected: bool,
    pub categories: Vec<CategoryLink>,
    pub products: Vec<ProductCard>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/detail.html")]
pub struct ProductDetailTemplate {
    pub cart_summary: CartSummary,
    pub product: ProductCard,
    pub category: Option<CategoryLink>,
    pub description: String,
    pub add_action: String,
    pub choices: Vec<QuantityChoice>,
    /// Units of this product already in the cart.
    pub in_cart: u32,
}

async fn render_list(
    state: &AppState,
    session: Session,
    category: Option<Category>,
) -> Result<ProductListTemplate> {
    let cart = Cart::load(session, &state.config().cart_session_key).await?;
    let media_url = &state.config().media_url;

    let products = state
        .products()
        .list_available(category.as_ref().map(|c| c.id))
        .await?;
    let selected = category.as_ref().map(|c| c.id);
    let categories = state
        .categories()
        .list()
        .await?
        .into_iter()
        .map(|c| CategoryLink {
            url: urls::product_list_by_category(&c.slug),
            selected: selected == Some(c.id),
            name: c.name,
        })
        .collect();

    Ok(ProductListTemplate {
        cart_summary: CartSummary::from(&cart),
        title: category.map_or_else(|| "Products".to_string(), |c| c.name),
        all_url: urls::product_list(),
        all_selected: selected.is_none(),
        categories,
        products: products
            .iter()
            .map(|product| ProductCard::new(product, media_url))
            .collect(),
    })
}

/// List all available products.
#[instrument(skip(state, session))]
pub async fn product_list(
    State(state): State<AppState>,
    session: Session,
) -> Result<ProductListTemplate> {
    render_list(&state, session, None).await
}

/// List the available products of one category.
#[instrument(skip(state, session))]
pub async fn product_list_by_category(
    State(state): State<AppState>,
    session: Session,
    Path(category_slug): Path<String>,
) -> Result<ProductListTemplate> {
    let category = state
        .categories()
        .get_by_slug(&category_slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {category_slug}")))?;
    render_list(&state, session, Some(category)).await
}

/// Show one available product with the add-to-cart form.
///
/// Both the ID and the slug must match.
#[instrument(skip(state, session))]
pub async fn product_detail(
    State(state): State<AppState>,
    session: Session,
    Path((id, slug)): Path<(String, String)>,
) -> Result<ProductDetailTemplate> {
    let not_found = || AppError::NotFound(format!("product {id}/{slug}"));
    let product_id: ProductId = id.parse().map_err(|_| not_found())?;
    let product = state
        .products()
        .get_available(product_id, &slug)
        .await?
        .ok_or_else(not_found)?;

    let category = state
        .categories()
        .get(product.category_id)
        .await?
        .map(|c| CategoryLink {
            url: urls::product_list_by_category(&c.slug),
            selected: true,
            name: c.name,
        });

    let cart = Cart::load(session, &state.config().cart_session_key).await?;
    let form = CartAddProductForm {
        quantity: "1".to_string(),
        update: false,
    };

    Ok(ProductDetailTemplate {
        cart_summary: CartSummary::from(&cart),
        product: ProductCard::new(&product, &state.config().media_url),
        category,
        description: product.description.clone(),
        add_action: urls::cart_add(product.id),
        choices: form.choices(),
        in_cart: cart.quantity_of(product.id),
    })
}
