//! Cart route handlers.
//!
//! The cart is stored in the visitor's session under the configured cart key.
//! Mutations redirect back to the cart page; an invalid quantity re-renders
//! the cart page with the form errors and `422 Unprocessable Entity`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use myshop_core::{Price, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{Cart, CartItem};
use crate::catalog::ProductCatalog;
use crate::db::RepositoryError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::forms::{CartAddProductForm, FormErrors, QuantityChoice};
use crate::routes::CartSummary;
use crate::state::AppState;
use crate::urls;

/// One cart line as displayed on the cart page.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: Price,
    pub total_price: Price,
    /// Options of the quantity `<select>` for the update form.
    pub choices: Vec<QuantityChoice>,
    /// `None` when the product is gone; such lines can only be removed.
    pub update_action: Option<String>,
    pub remove_action: String,
}

impl CartItemView {
    fn new(item: CartItem, media_url: &str) -> Self {
        let available = item.product.is_some();
        let (name, url, image_url) = match &item.product {
            Some(product) => (
                product.name.clone(),
                Some(urls::product_detail(product.id, &product.slug)),
                product.image_url(media_url),
            ),
            None => (
                format!("Product {} (no longer available)", item.product_id),
                None,
                None,
            ),
        };

        Self {
            product_id: item.product_id,
            name,
            url,
            image_url,
            quantity: item.quantity,
            price: item.price,
            total_price: item.total_price,
            choices: CartAddProductForm::for_update(item.quantity).choices(),
            update_action: available.then(|| urls::cart_add(item.product_id)),
            remove_action: urls::cart_remove(item.product_id),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/detail.html")]
pub struct CartDetailTemplate {
    pub cart_summary: CartSummary,
    pub items: Vec<CartItemView>,
    pub total_price: Price,
    /// Errors from a rejected add/update submission.
    pub errors: Vec<String>,
    pub checkout_url: String,
    pub continue_url: String,
}

/// Render the cart page for the given cart.
async fn render_detail<C>(
    catalog: &C,
    media_url: &str,
    cart: &Cart,
    errors: &FormErrors,
) -> Result<CartDetailTemplate>
where
    C: ProductCatalog<Error = RepositoryError>,
{
    let items = cart
        .items(catalog)
        .await?
        .map(|item| CartItemView::new(item, media_url))
        .collect();

    Ok(CartDetailTemplate {
        cart_summary: CartSummary::from(cart),
        items,
        total_price: cart.total_price(),
        errors: errors.iter().map(|error| error.message.clone()).collect(),
        checkout_url: urls::order_create(),
        continue_url: urls::product_list(),
    })
}

fn parse_product_id(product_id: &str) -> Result<ProductId> {
    product_id
        .parse()
        .map_err(|_| AppError::NotFound(format!("product {product_id}")))
}

/// Validate `form` and apply it to `cart`.
///
/// Redirects to the cart page on success and re-renders it with `422` on an
/// invalid form. A product missing from `catalog` is a 404.
async fn add_product<C>(
    catalog: &C,
    media_url: &str,
    mut cart: Cart,
    product_id: &str,
    form: &CartAddProductForm,
) -> Result<Response>
where
    C: ProductCatalog<Error = RepositoryError>,
{
    let id = parse_product_id(product_id)?;
    let product = catalog
        .find_by_ids(&[id])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    match form.validate() {
        Ok(submission) => {
            cart.add(&product, submission.quantity.get(), submission.update)
                .await?;
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[
                    ("product_id", product_id),
                    ("quantity", form.quantity.as_str()),
                ]),
            );
            Ok(Redirect::to(&urls::cart_detail()).into_response())
        }
        Err(errors) => {
            tracing::debug!(%errors, "rejected cart form");
            let page = render_detail(catalog, media_url, &cart, &errors).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// Display the cart page.
#[instrument(skip(state, session))]
pub async fn detail(
    State(state): State<AppState>,
    session: Session,
) -> Result<CartDetailTemplate> {
    let cart = Cart::load(session, &state.config().cart_session_key).await?;
    render_detail(
        &state.products(),
        &state.config().media_url,
        &cart,
        &FormErrors::default(),
    )
    .await
}

/// Add a product to the cart, or replace its quantity when `update` is set.
#[instrument(skip(state, session, form))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<String>,
    Form(form): Form<CartAddProductForm>,
) -> Result<Response> {
    let cart = Cart::load(session, &state.config().cart_session_key).await?;
    add_product(
        &state.products(),
        &state.config().media_url,
        cart,
        &product_id,
        &form,
    )
    .await
}

/// Remove a product from the cart.
///
/// The catalog is not consulted, so lines whose product has been deleted can
/// still be removed.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<String>,
) -> Result<Redirect> {
    let id = parse_product_id(&product_id)?;
    let mut cart = Cart::load(session, &state.config().cart_session_key).await?;
    cart.remove(id).await?;
    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("product_id", product_id.as_str())]),
    );
    Ok(Redirect::to(&urls::cart_detail()))
}
