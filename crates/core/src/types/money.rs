//! Monetary amounts using decimal arithmetic.
//!
//! The API sends prices as JSON numbers (`9.99`). They are decoded into a
//! [`Decimal`] so that displayed values never pick up binary floating point
//! noise, and encoded back as JSON numbers.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in the store's single currency.
///
/// The client never computes totals itself; this type only carries values
/// the server returned (or a product price captured for an add-to-cart call).
///
/// ```
/// use mid_shop_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::new(Decimal::new(1998, 2));
/// assert_eq!(price.to_string(), "$19.98");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    /// Zero amount, used by the empty cart.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so column widths apply
        f.pad(&format!("${:.2}", self.0))
    }
}
