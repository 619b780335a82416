//! Form parsing and validation.
//!
//! Raw form structs deserialize whatever the browser sent (all text) and
//! `validate()` turns them into typed values or a [`FormErrors`] list that the
//! handler re-renders next to the form. Validation never fails a request.

use std::fmt;

use myshop_core::Quantity;
use serde::{Deserialize, Deserializer};

use crate::cart::QuantityUpdate;
use crate::models::NewOrder;

/// Validation errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<FieldError>);

/// A single field's validation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field, in the order they were added.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |error| error.field == field)
            .map(|error| error.message.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed validation.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

// =============================================================================
// Add to cart
// =============================================================================

/// Submitted add-to-cart / update-quantity form.
///
/// `quantity` is a `<select>` of 1 to 20. `update` is a hidden field set by
/// the page: the product page leaves it off (add to what is in the cart), the
/// cart page sets it (replace the quantity).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartAddProductForm {
    #[serde(default)]
    pub quantity: String,
    #[serde(default, deserialize_with = "deserialize_checkbox")]
    pub update: bool,
}

/// A validated add-to-cart submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartAddProduct {
    pub quantity: Quantity,
    pub update: QuantityUpdate,
}

impl CartAddProductForm {
    /// Prefilled form for a cart line: current quantity, update mode on.
    #[must_use]
    pub fn for_update(quantity: u32) -> Self {
        Self {
            quantity: quantity.to_string(),
            update: true,
        }
    }

    /// Validate the submission.
    ///
    /// # Errors
    ///
    /// Returns `FormErrors` on the `quantity` field if it is missing or not
    /// one of the offered choices.
    pub fn validate(&self) -> Result<CartAddProduct, FormErrors> {
        match Quantity::parse(&self.quantity) {
            Ok(quantity) => Ok(CartAddProduct {
                quantity,
                update: QuantityUpdate::from(self.update),
            }),
            Err(error) => {
                let mut errors = FormErrors::default();
                errors.add("quantity", error.to_string());
                Err(errors)
            }
        }
    }

    /// Options for the quantity `<select>`, with the current value marked.
    #[must_use]
    pub fn choices(&self) -> Vec<QuantityChoice> {
        Quantity::CHOICES
            .map(|value| QuantityChoice {
                value,
                selected: self.quantity == value.to_string(),
            })
            .collect()
    }
}

/// One option of the quantity `<select>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityChoice {
    pub value: u32,
    pub selected: bool,
}

/// Checkbox / hidden boolean semantics: absent, empty, `false` (any case) and
/// `0` are false, anything else is true.
fn deserialize_checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.is_some_and(|value| {
        let value = value.trim();
        !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
    }))
}

// =============================================================================
// Checkout
// =============================================================================

/// Submitted checkout form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderCreateForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
}

impl OrderCreateForm {
    const NAME_MAX: usize = 50;
    const EMAIL_MAX: usize = 254;
    const ADDRESS_MAX: usize = 250;
    const POSTAL_CODE_MAX: usize = 20;
    const CITY_MAX: usize = 100;

    /// Validate and normalize (trim) the checkout fields.
    ///
    /// # Errors
    ///
    /// Returns `FormErrors` listing every field that is missing, too long,
    /// or (for `email`) malformed.
    pub fn validate(&self) -> Result<NewOrder, FormErrors> {
        let mut errors = FormErrors::default();

        let first_name = required(&mut errors, "first_name", &self.first_name, Self::NAME_MAX);
        let last_name = required(&mut errors, "last_name", &self.last_name, Self::NAME_MAX);
        let email = required(&mut errors, "email", &self.email, Self::EMAIL_MAX);
        let address = required(&mut errors, "address", &self.address, Self::ADDRESS_MAX);
        let postal_code = required(
            &mut errors,
            "postal_code",
            &self.postal_code,
            Self::POSTAL_CODE_MAX,
        );
        let city = required(&mut errors, "city", &self.city, Self::CITY_MAX);

        if !email.is_empty() && !looks_like_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        errors.into_result(NewOrder {
            first_name,
            last_name,
            email,
            address,
            postal_code,
            city,
        })
    }
}

const REQUIRED: &str = "This field is required.";

/// Trim `value`, recording an error if it ends up empty or longer than `max`.
fn required(errors: &mut FormErrors, field: &'static str, value: &str, max: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if value.chars().count() > max {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {max} characters (it has {}).",
                value.chars().count()
            ),
        );
    }
    value.to_owned()
}

/// One `@`, non-empty local part, and a dotted domain without spaces.
fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.contains(char::is_whitespace)
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn quantity_form(quantity: &str) -> CartAddProductForm {
        CartAddProductForm {
            quantity: quantity.to_string(),
            update: false,
        }
    }

    #[test]
    fn test_accepts_twenty_rejects_twenty_one() {
        assert_eq!(quantity_form("20").validate().unwrap().quantity.get(), 20);

        let errors = quantity_form("21").validate().unwrap_err();
        let messages: Vec<&str> = errors.for_field("quantity").collect();
        assert_eq!(
            messages,
            vec!["Select a valid choice. 21 is not one of the available choices."]
        );
    }

    #[test]
    fn test_missing_quantity_is_required() {
        let errors = quantity_form("").validate().unwrap_err();
        assert_eq!(
            errors.for_field("quantity").collect::<Vec<_>>(),
            vec!["This field is required."]
        );
    }

    #[test]
    fn test_update_flag_selects_mode() {
        let mut form = quantity_form("3");
        assert_eq!(form.validate().unwrap().update, QuantityUpdate::Increment);

        form.update = true;
        assert_eq!(form.validate().unwrap().update, QuantityUpdate::Replace);
    }

    #[test]
    fn test_update_flag_parsing() {
        let cases = [
            (r#"{"quantity":"2"}"#, false),
            (r#"{"quantity":"2","update":""}"#, false),
            (r#"{"quantity":"2","update":"False"}"#, false),
            (r#"{"quantity":"2","update":"0"}"#, false),
            (r#"{"quantity":"2","update":"True"}"#, true),
            (r#"{"quantity":"2","update":"on"}"#, true),
        ];
        for (json, expected) in cases {
            let form: CartAddProductForm = serde_json::from_str(json).unwrap();
            assert_eq!(form.update, expected, "input: {json}");
        }
    }

    #[test]
    fn test_for_update_prefills_and_marks_choice() {
        let form = CartAddProductForm::for_update(4);
        assert!(form.update);

        let choices = form.choices();
        assert_eq!(choices.len(), 20);
        assert_eq!(choices.iter().filter(|c| c.selected).count(), 1);
        assert!(choices.iter().any(|c| c.value == 4 && c.selected));
    }

    fn checkout_form() -> OrderCreateForm {
        OrderCreateForm {
            first_name: " Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            address: "12 St James's Square".to_string(),
            postal_code: "SW1Y 4JH".to_string(),
            city: "London".to_string(),
        }
    }

    #[test]
    fn test_checkout_trims_fields() {
        let order = checkout_form().validate().unwrap();
        assert_eq!(order.first_name, "Ada");
    }

    #[test]
    fn test_checkout_reports_every_missing_field() {
        let errors = OrderCreateForm::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["first_name", "last_name", "email", "address", "postal_code", "city"]
        );
    }

    #[test]
    fn test_checkout_rejects_bad_email() {
        for email in ["ada", "@example.com", "ada@", "ada@localhost", "a da@example.com"] {
            let mut form = checkout_form();
            form.email = email.to_string();
            let errors = form.validate().unwrap_err();
            assert_eq!(errors.for_field("email").count(), 1, "email: {email}");
        }
    }

    #[test]
    fn test_checkout_rejects_long_postal_code() {
        let mut form = checkout_form();
        form.postal_code = "9".repeat(21);
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.for_field("postal_code").collect::<Vec<_>>(),
            vec!["Ensure this value has at most 20 characters (it has 21)."]
        );
    }
}
