//! Rupee prices with decimal arithmetic and Indian digit grouping.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency symbol prefixed to every formatted amount.
pub const CURRENCY_SYMBOL: &str = "₹";

/// A price or order total in rupees.
///
/// Stored as `NUMERIC(12, 2)`; the value is kept as entered and only rounded
/// when formatted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a rupee amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units (a cart line subtotal).
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Format with the rupee symbol and lakh/crore grouping, e.g. `₹12,34,567.50`.
    #[must_use]
    pub fn display_inr(&self) -> String {
        format_inr(self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
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

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_inr())
    }
}

impl core::str::FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<Decimal>().map(Self)
    }
}

/// Format a rupee amount: two decimals, last three integer digits grouped,
/// then groups of two (`1234567.5` → `₹12,34,567.50`).
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{CURRENCY_SYMBOL}{sign}{}.{frac}", group_indian(whole))
}

/// Apply Indian grouping to a string of ASCII digits.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }

    let (rest, last3) = digits.split_at(digits.len() - 3);
    let head_len = rest.len() % 2;
    let mut groups: Vec<&str> = Vec::with_capacity(rest.len() / 2 + 2);
    if head_len > 0 {
        groups.push(&rest[..head_len]);
    }
    let mut start = head_len;
    while start < rest.len() {
        groups.push(&rest[start..start + 2]);
        start += 2;
    }
    groups.push(last3);
    groups.join(",")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_small_amounts_are_not_grouped() {
        assert_eq!(format_inr(dec("0")), "₹0.00");
        assert_eq!(format_inr(dec("999")), "₹999.00");
        assert_eq!(format_inr(dec("12.5")), "₹12.50");
    }

    #[test]
    fn test_lakh_and_crore_grouping() {
        assert_eq!(format_inr(dec("1000")), "₹1,000.00");
        assert_eq!(format_inr(dec("123456")), "₹1,23,456.00");
        assert_eq!(format_inr(dec("1234567.5")), "₹12,34,567.50");
        assert_eq!(format_inr(dec("123456789.129")), "₹12,34,56,789.13");
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(format_inr(dec("10.005")), "₹10.01");
        assert_eq!(format_inr(dec("10.004")), "₹10.00");
    }

    #[test]
    fn test_negative_amounts_keep_grouping() {
        assert_eq!(format_inr(dec("-1234")), "₹-1,234.00");
        assert_eq!(format_inr(dec("-123")), "₹-123.00");
    }

    #[test]
    fn test_line_subtotals_sum() {
        let price: Price = "499.50".parse().unwrap();
        let total: Price = [price.times(2), Price::new(dec("1"))].into_iter().sum();
        assert_eq!(total.amount(), dec("1000.00"));
        assert_eq!(total.to_string(), "₹1,000.00");
    }
}
