//! Per-size stock counters and the guarded arithmetic used by the back-office.
//!
//! There are two ways a counter changes:
//!
//! - Checkout subtracts the ordered quantity with [`StockLevels::decrement_unchecked`].
//!   No availability check happens there, so a counter can go negative when
//!   checkouts oversubscribe a size.
//! - Admin adjustments go through [`StockOperation::apply`], which refuses any
//!   result below zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::size::Size;

/// Stock counters keyed by size, stored as a JSON object (`{"S": 2, "M": 0}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockLevels(BTreeMap<Size, i64>);

impl StockLevels {
    /// No counters at all.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A counter for every size, all zero (the product form default).
    #[must_use]
    pub fn zeroed() -> Self {
        Size::ALL.into_iter().map(|size| (size, 0)).collect()
    }

    /// The counter for `size`, if the product tracks it.
    #[must_use]
    pub fn get(&self, size: Size) -> Option<i64> {
        self.0.get(&size).copied()
    }

    /// The counter for `size`, treating an untracked size as zero.
    #[must_use]
    pub fn level(&self, size: Size) -> i64 {
        self.get(size).unwrap_or(0)
    }

    /// Whether at least one unit of `size` is available.
    #[must_use]
    pub fn in_stock(&self, size: Size) -> bool {
        self.level(size) > 0
    }

    /// Replace the counter for `size`.
    pub fn set(&mut self, size: Size, quantity: i64) {
        self.0.insert(size, quantity);
    }

    /// Subtract `quantity` if `size` is tracked, without any floor.
    ///
    /// Returns `false` (and changes nothing) when the size has no counter.
    pub fn decrement_unchecked(&mut self, size: Size, quantity: i64) -> bool {
        match self.0.get_mut(&size) {
            Some(level) => {
                *level -= quantity;
                true
            }
            None => false,
        }
    }

    /// Iterate counters in size order.
    pub fn iter(&self) -> impl Iterator<Item = (Size, i64)> + '_ {
        self.0.iter().map(|(size, level)| (*size, *level))
    }
}

impl FromIterator<(Size, i64)> for StockLevels {
    fn from_iter<I: IntoIterator<Item = (Size, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A back-office stock action, as posted in the `action` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockOperation {
    /// Replace the counter.
    Set,
    /// Add to the counter.
    #[serde(rename = "inc")]
    Increment,
    /// Subtract from the counter, refusing to go below zero.
    #[serde(rename = "dec")]
    Decrement,
}

/// Why an admin stock adjustment was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StockAdjustError {
    /// Size tag outside `S`, `M`, `L`, `XL`.
    #[error("Invalid size")]
    InvalidSize(String),
    /// Value did not parse as an integer.
    #[error("Invalid value")]
    InvalidValue(String),
    /// `set` with a negative value.
    #[error("Stock cannot be negative")]
    NegativeValue(i64),
    /// Action tag other than `set`, `inc`, `dec`.
    #[error("Invalid action")]
    UnknownOperation(String),
    /// The result would drop below zero; nothing was applied.
    #[error("Resulting stock would be negative")]
    WouldUnderflow {
        /// Counter before the adjustment.
        current: i64,
        /// Signed change that was requested.
        delta: i64,
    },
}

impl StockAdjustError {
    /// Whether this is a malformed-input rejection (as opposed to an underflow).
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        !matches!(self, Self::WouldUnderflow { .. })
    }
}

impl StockOperation {
    /// Parse the `action` form field.
    ///
    /// # Errors
    ///
    /// [`StockAdjustError::UnknownOperation`] for anything but `set`, `inc`, `dec`.
    pub fn parse(tag: &str) -> Result<Self, StockAdjustError> {
        match tag {
            "set" => Ok(Self::Set),
            "inc" => Ok(Self::Increment),
            "dec" => Ok(Self::Decrement),
            other => Err(StockAdjustError::UnknownOperation(other.to_owned())),
        }
    }

    /// The form tag for this operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Increment => "inc",
            Self::Decrement => "dec",
        }
    }

    /// Compute the new counter from `current` and the parsed form `value`.
    ///
    /// `value` is a non-negative amount: `inc` adds it, `dec` subtracts it.
    ///
    /// # Errors
    ///
    /// [`StockAdjustError::NegativeValue`] for `set` below zero,
    /// [`StockAdjustError::InvalidValue`] for a negative `inc`/`dec` amount or
    /// if the arithmetic overflows,
    /// [`StockAdjustError::WouldUnderflow`] when the result would be negative.
    pub fn apply(self, current: i64, value: i64) -> Result<i64, StockAdjustError> {
        let delta = match self {
            Self::Set => {
                if value < 0 {
                    return Err(StockAdjustError::NegativeValue(value));
                }
                return Ok(value);
            }
            _ if value < 0 => return Err(StockAdjustError::InvalidValue(value.to_string())),
            Self::Increment => value,
            Self::Decrement => -value,
        };

        let next = current
            .checked_add(delta)
            .ok_or_else(|| StockAdjustError::InvalidValue(value.to_string()))?;
        if next < 0 {
            return Err(StockAdjustError::WouldUnderflow { current, delta });
        }
        Ok(next)
    }
}

/// Parse the `size` form field.
///
/// # Errors
///
/// [`StockAdjustError::InvalidSize`] for an unknown tag.
pub fn parse_size(raw: &str) -> Result<Size, StockAdjustError> {
    raw.parse()
        .map_err(|_| StockAdjustError::InvalidSize(raw.to_owned()))
}

/// Parse the `value` form field as a non-negative integer.
///
/// # Errors
///
/// [`StockAdjustError::InvalidValue`] if it is not an integer or is negative.
pub fn parse_value(raw: &str) -> Result<i64, StockAdjustError> {
    raw.trim()
        .parse()
        .ok()
        .filter(|value: &i64| *value >= 0)
        .ok_or_else(|| StockAdjustError::InvalidValue(raw.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_counter_exactly() {
        for (current, value) in [(0, 0), (3, 10), (-4, 7), (100, 1)] {
            assert_eq!(StockOperation::Set.apply(current, value), Ok(value));
        }
    }

    #[test]
    fn test_set_rejects_negative_value() {
        assert_eq!(
            StockOperation::Set.apply(5, -1),
            Err(StockAdjustError::NegativeValue(-1))
        );
    }

    #[test]
    fn test_dec_beyond_current_underflows() {
        let err = StockOperation::Decrement.apply(5, 10).unwrap_err();
        assert_eq!(
            err,
            StockAdjustError::WouldUnderflow {
                current: 5,
                delta: -10
            }
        );
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_dec_to_exactly_zero_is_allowed() {
        assert_eq!(StockOperation::Decrement.apply(5, 5), Ok(0));
    }

    #[test]
    fn test_negative_inc_or_dec_amount_is_rejected() {
        assert!(matches!(
            StockOperation::Increment.apply(2, -1),
            Err(StockAdjustError::InvalidValue(_))
        ));
        assert!(matches!(
            StockOperation::Decrement.apply(2, -5),
            Err(StockAdjustError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_overflow_is_invalid_value() {
        assert!(matches!(
            StockOperation::Increment.apply(i64::MAX, 1),
            Err(StockAdjustError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_parse_operation_tags() {
        assert_eq!(StockOperation::parse("inc"), Ok(StockOperation::Increment));
        assert!(matches!(
            StockOperation::parse("add"),
            Err(StockAdjustError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_parse_form_fields() {
        assert_eq!(parse_size("XL"), Ok(Size::XL));
        assert!(parse_size("XXL").unwrap_err().is_invalid_input());
        assert_eq!(parse_value(" 12 "), Ok(12));
        assert_eq!(parse_value("0"), Ok(0));
        for raw in ["1.5", "-5", "-0.5", ""] {
            assert!(matches!(
                parse_value(raw),
                Err(StockAdjustError::InvalidValue(_))
            ));
        }
    }

    #[test]
    fn test_unchecked_decrement_goes_negative() {
        let mut levels: StockLevels = [(Size::S, 2), (Size::M, 0)].into_iter().collect();
        assert!(levels.decrement_unchecked(Size::S, 3));
        assert_eq!(levels.get(Size::S), Some(-1));
        assert!(!levels.decrement_unchecked(Size::XL, 1));
        assert_eq!(levels.get(Size::XL), None);
    }

    #[test]
    fn test_levels_serialize_as_object() {
        let levels: StockLevels = [(Size::S, 2), (Size::XL, 1)].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&levels).unwrap(),
            r#"{"S":2,"XL":1}"#
        );
        let parsed: StockLevels = serde_json::from_str(r#"{"M":4}"#).unwrap();
        assert_eq!(parsed.level(Size::M), 4);
        assert_eq!(parsed.level(Size::L), 0);
    }
}
