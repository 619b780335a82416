//! Validated quantity for the add-to-cart form.

use core::fmt;
use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Nothing was submitted.
    #[error("This field is required.")]
    Missing,
    /// The submitted text is not one of the offered choices.
    #[error("Select a valid choice. {0} is not one of the available choices.")]
    InvalidChoice(String),
}

/// A quantity a shopper may pick in one add-to-cart submission.
///
/// Only the whole numbers `1` to `20` are offered, and the submitted text
/// must match one of them exactly (`"05"` or `" 5"` are rejected, the way a
/// `<select>` would never send them).
///
/// ```
/// use myshop_core::Quantity;
///
/// assert_eq!(Quantity::parse("20").unwrap().get(), 20);
/// assert!(Quantity::parse("21").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest selectable quantity.
    pub const MIN: u32 = 1;
    /// Largest selectable quantity.
    pub const MAX: u32 = 20;

    /// The selectable values, in display order.
    pub const CHOICES: RangeInclusive<u32> = Self::MIN..=Self::MAX;

    /// Parse a quantity from submitted form text.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Missing`] for empty input and
    /// [`QuantityError::InvalidChoice`] for anything that is not exactly one
    /// of `"1"` through `"20"`.
    pub fn parse(s: &str) -> Result<Self, QuantityError> {
        if s.is_empty() {
            return Err(QuantityError::Missing);
        }

        Self::CHOICES
            .clone()
            .find(|choice| choice.to_string() == s)
            .map(Self)
            .ok_or_else(|| QuantityError::InvalidChoice(s.to_owned()))
    }

    /// The quantity as an integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if Self::CHOICES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(QuantityError::InvalidChoice(value.to_string()))
        }
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl std::str::FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
