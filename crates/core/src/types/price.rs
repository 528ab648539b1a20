//! Type-safe price representation using decimal arithmetic.
//!
//! Prices travel as plain JSON numbers (the catalog API and the persisted
//! cart snapshot both use `"price": 10.5`), but are held as [`Decimal`] so
//! subtotals never accumulate floating point error.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A unit price in the store's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in the smallest currency unit (e.g. cents).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        self * quantity
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

/// Format for display (e.g., "$19.99").
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

/// Saturates at `Decimal::MAX` so totals over untrusted prices never panic.
impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

/// Saturates at `Decimal::MAX`.
impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(rhs)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_serializes_as_number() {
        let price = Price::from_cents(1050);
        assert_eq!(serde_json::to_string(&price).unwrap(), "10.5");
    }

    #[test]
    fn test_price_deserializes_from_integer() {
        let price: Price = serde_json::from_str("10").unwrap();
        assert_eq!(price, Price::new(Decimal::from(10)));
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
        assert_eq!(Price::new(Decimal::from(3)).to_string(), "$3.00");
    }

    #[test]
    fn test_price_times_and_sum() {
        let total: Price = [Price::from_cents(250).times(2), Price::from_cents(100)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(600));
    }

    #[test]
    fn test_sum_of_huge_prices_saturates() {
        let huge: Price = serde_json::from_str("5e28").unwrap();
        let total: Price = [huge, huge].into_iter().sum();
        assert_eq!(total, Price::new(Decimal::MAX));
    }

    #[test]
    fn test_times_huge_quantity_saturates() {
        let price: Price = serde_json::from_str("4e19").unwrap();
        assert_eq!(price.times(4_000_000_000), Price::new(Decimal::MAX));
    }
}
