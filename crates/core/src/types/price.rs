//! Type-safe price representation using decimal arithmetic.
//!
//! Prices never touch binary floating point. In serialized form (session
//! records, JSON) a price is a decimal string such as `"9.99"`, because JSON
//! numbers would round-trip through `f64`.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-currency-tagged amount in the shop's currency (e.g. dollars, not cents).
///
/// ```
/// use myshop_core::Price;
///
/// let unit: Price = "9.99".parse().unwrap();
/// assert_eq!(unit.times(2).to_string(), "19.98");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an integer number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

// SQLx support (with postgres feature): stored as NUMERIC.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times_is_exact() {
        let price: Price = "0.10".parse().unwrap();
        assert_eq!(price.times(3), "0.30".parse().unwrap());
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(1999).to_string(), "19.99");
        assert_eq!(Price::from_cents(-250).to_string(), "-2.50");
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let total: Price = std::iter::empty().sum();
        assert_eq!(total, Price::ZERO);
        assert_eq!(total.to_string(), "0.00");
    }

    #[test]
    fn test_serializes_as_string() {
        let price: Price = "9.99".parse().unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"9.99\"");

        let back: Price = serde_json::from_str("\"9.99\"").unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("nine".parse::<Price>().is_err());
    }
}
