//! Checkout route handlers.
//!
//! Placing an order copies every cart line (with its price snapshot) into
//! `shop.order_items` and then clears the cart. Checkout is refused while any
//! line refers to a product that has been deleted from the catalog; the
//! visitor has to remove it from the cart first, so the stored order always
//! matches the total shown.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use myshop_core::{OrderId, Price};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{Cart, CartItem};
use crate::catalog::ProductCatalog;
use crate::db::RepositoryError;
use crate::error::{Result, add_breadcrumb};
use crate::forms::{FormErrors, OrderCreateForm};
use crate::models::{NewOrder, NewOrderItem};
use crate::routes::CartSummary;
use crate::state::AppState;
use crate::urls;

/// One line of the order summary next to the checkout form.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub total_price: Price,
}

/// A form field with its submitted value and errors.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub errors: Vec<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/create.html")]
pub struct OrderCreateTemplate {
    pub cart_summary: CartSummary,
    pub lines: Vec<OrderLineView>,
    pub total_price: Price,
    /// Lines that block checkout because their product is gone.
    pub unavailable: Vec<String>,
    pub fields: Vec<FieldView>,
    pub action: String,
    pub cart_url: String,
}

/// Order placed confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/created.html")]
pub struct OrderCreatedTemplate {
    pub cart_summary: CartSummary,
    pub order_id: OrderId,
    pub continue_url: String,
}

fn field_views(form: &OrderCreateForm, errors: &FormErrors) -> Vec<FieldView> {
    let field = |name: &'static str, label: &'static str, input_type: &'static str, value: &str| {
        FieldView {
            name,
            label,
            input_type,
            value: value.to_owned(),
            errors: errors.for_field(name).map(str::to_owned).collect(),
        }
    };

    vec![
        field("first_name", "First name", "text", &form.first_name),
        field("last_name", "Last name", "text", &form.last_name),
        field("email", "Email", "email", &form.email),
        field("address", "Address", "text", &form.address),
        field("postal_code", "Postal code", "text", &form.postal_code),
        field("city", "City", "text", &form.city),
    ]
}

fn line_view(item: &CartItem) -> OrderLineView {
    OrderLineView {
        name: item
            .product
            .as_ref()
            .map_or_else(|| format!("Product {}", item.product_id), |p| p.name.clone()),
        quantity: item.quantity,
        total_price: item.total_price,
    }
}

async fn render_form<C>(
    catalog: &C,
    cart: &Cart,
    form: &OrderCreateForm,
    errors: &FormErrors,
) -> Result<OrderCreateTemplate>
where
    C: ProductCatalog<Error = RepositoryError>,
{
    let mut lines = Vec::new();
    let mut unavailable = Vec::new();
    for item in cart.items(catalog).await? {
        let view = line_view(&item);
        if item.product.is_none() {
            unavailable.push(view.name.clone());
        }
        lines.push(view);
    }

    Ok(OrderCreateTemplate {
        cart_summary: CartSummary::from(cart),
        lines,
        total_price: cart.total_price(),
        unavailable,
        fields: field_views(form, errors),
        action: urls::order_create(),
        cart_url: urls::cart_detail(),
    })
}

/// Order lines for every cart line, or `None` if any product is gone.
fn order_items(items: impl Iterator<Item = CartItem>) -> Option<Vec<NewOrderItem>> {
    items
        .map(|item| {
            item.product.is_some().then(|| NewOrderItem {
                product_id: item.product_id,
                price: item.price,
                quantity: item.quantity,
            })
        })
        .collect()
}

/// Outcome of checking a checkout submission.
enum Checkout {
    Ready {
        order: NewOrder,
        items: Vec<NewOrderItem>,
    },
    Rejected(OrderCreateTemplate),
}

/// Validate the form and make sure every cart line can be ordered.
async fn prepare<C>(catalog: &C, cart: &Cart, form: &OrderCreateForm) -> Result<Checkout>
where
    C: ProductCatalog<Error = RepositoryError>,
{
    let validated = form.validate();
    let items = order_items(cart.items(catalog).await?);

    match (validated, items) {
        (Ok(order), Some(items)) => Ok(Checkout::Ready { order, items }),
        (validated, _) => {
            let errors = validated.err().unwrap_or_default();
            let page = render_form(catalog, cart, form, &errors).await?;
            Ok(Checkout::Rejected(page))
        }
    }
}

/// Show the checkout form. An empty cart goes back to the cart page.
#[instrument(skip(state, session))]
pub async fn create_form(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart = Cart::load(session, &state.config().cart_session_key).await?;
    if cart.is_empty() {
        return Ok(Redirect::to(&urls::cart_detail()).into_response());
    }

    let page = render_form(
        &state.products(),
        &cart,
        &OrderCreateForm::default(),
        &FormErrors::default(),
    )
    .await?;
    Ok(page.into_response())
}

/// Place the order and clear the cart.
#[instrument(skip(state, session, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OrderCreateForm>,
) -> Result<Response> {
    let mut cart = Cart::load(session, &state.config().cart_session_key).await?;
    if cart.is_empty() {
        return Ok(Redirect::to(&urls::cart_detail()).into_response());
    }

    let (new_order, items) = match prepare(&state.products(), &cart, &form).await? {
        Checkout::Ready { order, items } => (order, items),
        Checkout::Rejected(page) => {
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let order = state.orders().create(&new_order, &items).await?;
    cart.clear().await?;
    add_breadcrumb(
        "orders",
        "Order placed",
        Some(&[("order_id", order.id.to_string().as_str())]),
    );

    Ok(OrderCreatedTemplate {
        cart_summary: CartSummary::default(),
        order_id: order.id,
        continue_url: urls::product_list(),
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::{StatusCode, header};
    use myshop_core::ProductId;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::cart::QuantityUpdate;
    use crate::catalog::memory::InMemoryCatalog;
    use crate::models::product::fixtures::product;
    use crate::routes::test_support::{get, post_form, test_app};

    fn valid_form() -> OrderCreateForm {
        OrderCreateForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            address: "12 St James's Square".to_string(),
            postal_code: "SW1Y 4JH".to_string(),
            city: "London".to_string(),
        }
    }

    /// Cart holding 2 x product 1 (2.00) and 1 x product 5 (3.00).
    async fn cart_with_two_lines() -> Cart {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let mut cart = Cart::load(session, "cart").await.unwrap();
        cart.add(&product(1, "2.00"), 2, QuantityUpdate::Increment)
            .await
            .unwrap();
        cart.add(&product(5, "3.00"), 1, QuantityUpdate::Increment)
            .await
            .unwrap();
        cart
    }

    #[tokio::test]
    async fn test_empty_cart_redirects_to_cart() {
        let response = get(test_app(false), "/orders/create/").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/cart/");

        let response = post_form(test_app(false), "/orders/create/", "first_name=Ada").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn test_field_views_carry_values_and_errors() {
        let form = OrderCreateForm {
            email: "ada".to_string(),
            ..OrderCreateForm::default()
        };
        let errors = form.validate().unwrap_err();
        let fields = field_views(&form, &errors);

        assert_eq!(fields.len(), 6);
        let email = fields.iter().find(|f| f.name == "email").unwrap();
        assert_eq!(email.value, "ada");
        assert_eq!(email.input_type, "email");
        assert_eq!(email.errors, vec!["Enter a valid email address."]);

        let city = fields.iter().find(|f| f.name == "city").unwrap();
        assert_eq!(city.errors, vec!["This field is required."]);
    }

    #[test]
    fn test_line_view_for_deleted_product() {
        let item = CartItem {
            product_id: myshop_core::ProductId::new(5),
            product: None,
            quantity: 3,
            price: "1.50".parse().unwrap(),
            total_price: "4.50".parse().unwrap(),
        };
        let view = line_view(&item);
        assert_eq!(view.name, "Product 5");
        assert_eq!(view.total_price.to_string(), "4.50");
    }

    #[tokio::test]
    async fn test_prepare_copies_every_line() {
        let catalog = InMemoryCatalog::with_products([product(1, "2.00"), product(5, "3.00")]);
        let cart = cart_with_two_lines().await;

        let Checkout::Ready { order, items } = prepare(&catalog, &cart, &valid_form()).await.unwrap()
        else {
            panic!("checkout should be ready");
        };
        assert_eq!(order.email, "ada@example.com");
        assert_eq!(items.len(), 2);
        let stored: Price = items.iter().map(|item| item.price.times(item.quantity)).sum();
        assert_eq!(stored, cart.total_price());
    }

    #[tokio::test]
    async fn test_prepare_refuses_cart_with_deleted_product() {
        let catalog = InMemoryCatalog::with_products([product(1, "2.00")]);
        let cart = cart_with_two_lines().await;

        let Checkout::Rejected(page) = prepare(&catalog, &cart, &valid_form()).await.unwrap() else {
            panic!("checkout should be rejected");
        };
        assert_eq!(page.unavailable, vec!["Product 5"]);
        assert_eq!(page.lines.len(), 2);
        assert_eq!(page.total_price, cart.total_price());
        assert!(page.fields.iter().all(|field| field.errors.is_empty()));
    }

    #[tokio::test]
    async fn test_prepare_refuses_cart_with_only_deleted_products() {
        let catalog = InMemoryCatalog::default();
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let mut cart = Cart::load(session, "cart").await.unwrap();
        cart.add(&product(5, "3.00"), 2, QuantityUpdate::Increment)
            .await
            .unwrap();

        let checkout = prepare(&catalog, &cart, &valid_form()).await.unwrap();
        assert!(matches!(checkout, Checkout::Rejected(_)));
        assert_eq!(cart.quantity_of(ProductId::new(5)), 2);
    }

    #[tokio::test]
    async fn test_prepare_reports_form_errors() {
        let catalog = InMemoryCatalog::with_products([product(1, "2.00"), product(5, "3.00")]);
        let cart = cart_with_two_lines().await;
        let form = OrderCreateForm {
            city: String::new(),
            ..valid_form()
        };

        let Checkout::Rejected(page) = prepare(&catalog, &cart, &form).await.unwrap() else {
            panic!("checkout should be rejected");
        };
        assert!(page.unavailable.is_empty());
        let city = page.fields.iter().find(|f| f.name == "city").unwrap();
        assert_eq!(city.errors, vec!["This field is required."]);
    }
}
