//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## The Rounding Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  WHERE ROUNDING IS ALLOWED                                          │
//! │                                                                     │
//! │  line subtotal ──► line net ──► per-rate net sum ──► per-rate tax   │
//! │        (full decimal precision, NEVER rounded)                      │
//! │                                │                                    │
//! │                                ▼                                    │
//! │            Display / ticket text / CSV export                       │
//! │            (THE ONLY rounding point: 2 dp, banker's)                │
//! │                                                                     │
//! │  Rounding per line and summing the rounded cents drifts:            │
//! │    3 × $0.333 → 3 × $0.33 = $0.99   ❌ (true total is $0.999)       │
//! │  Summing first and rounding once does not:                          │
//! │    3 × $0.333 = $0.999 → $1.00      ✅                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caja_core::money::Money;
//! use rust_decimal_macros::dec;
//!
//! let price = Money::new(dec!(10.99));
//! let line = price * dec!(3);
//! assert_eq!(line, Money::new(dec!(32.97)));
//! assert_eq!(line.to_string(), "$32.97");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount carried at full decimal precision.
///
/// ## Design Decisions
/// - **`rust_decimal::Decimal`**: exact base-10 arithmetic, so mixed-rate VAT
///   sums never accumulate binary-float noise
/// - **Unrounded internally**: [`Money::rounded`] is the single place an
///   amount collapses to currency precision
/// - **Single-field tuple struct**: zero-cost wrapper, serializes as the
///   bare decimal
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the exact, unrounded amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Rounds to currency precision: two decimal places, banker's rounding
    /// (round half to even, so long runs of `.xx5` amounts carry no
    /// systematic bias). The returned decimal always has scale 2.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::new(dec!(0.375)).rounded(), dec!(0.38));
    /// assert_eq!(Money::new(dec!(0.365)).rounded(), dec!(0.36));
    /// assert_eq!(Money::new(dec!(5)).rounded().to_string(), "5.00");
    /// ```
    pub fn rounded(&self) -> Decimal {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(2);
        rounded
    }

    /// Parses a lenient numeric string, accepting `,` as a decimal
    /// separator the way the import CSVs of European suppliers write
    /// prices (`"12,50"` parses as 12.50).
    ///
    /// Returns `None` when the cell does not hold a number.
    pub fn parse(input: &str) -> Option<Self> {
        let cleaned = input.trim().replace(',', ".");
        Decimal::from_str(&cleaned).ok().map(Money)
    }

    /// Checks if the amount is exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the amount is negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders the rounded amount as `$1,234.56`, thousands grouped. This is
/// the display edge where rounding happens.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let text = rounded.abs().to_string();
        let (units, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
        write!(f, "{}${}.{}", sign, group_thousands(units), cents)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a decimal factor (quantities, rate fractions).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Groups a digit string in threes: `1234567` becomes `1,234,567`.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_grouping() {
        assert_eq!(Money::new(dec!(10.99)).to_string(), "$10.99");
        assert_eq!(Money::new(dec!(5)).to_string(), "$5.00");
        assert_eq!(Money::new(dec!(1234.5)).to_string(), "$1,234.50");
        assert_eq!(Money::new(dec!(1234567.89)).to_string(), "$1,234,567.89");
        assert_eq!(Money::new(dec!(-5.5)).to_string(), "-$5.50");
        assert_eq!(Money::new(dec!(0)).to_string(), "$0.00");
    }

    #[test]
    fn test_rounding_is_bankers() {
        assert_eq!(Money::new(dec!(0.825)).rounded(), dec!(0.82));
        assert_eq!(Money::new(dec!(0.835)).rounded(), dec!(0.84));
        assert_eq!(Money::new(dec!(0.375)).rounded(), dec!(0.38));
    }

    #[test]
    fn test_rounded_has_scale_two() {
        assert_eq!(Money::new(dec!(5)).rounded().to_string(), "5.00");
        assert_eq!(Money::new(dec!(5.1)).rounded().to_string(), "5.10");
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(Money::parse("12,50"), Some(Money::new(dec!(12.50))));
        assert_eq!(Money::parse(" 10.00 "), Some(Money::new(dec!(10))));
        assert_eq!(Money::parse("0"), Some(Money::zero()));
        assert_eq!(Money::parse("abc"), None);
        assert_eq!(Money::parse(""), None);
    }

    #[test]
    fn test_arithmetic_keeps_full_precision() {
        let third = Money::new(dec!(0.125));
        let sum = third + third + third;
        assert_eq!(sum.amount(), dec!(0.375));
        // Only the final rounding step collapses precision.
        assert_eq!(sum.rounded(), dec!(0.38));
    }

    #[test]
    fn test_sum_iterator() {
        let amounts = [
            Money::new(dec!(1.10)),
            Money::new(dec!(2.20)),
            Money::new(dec!(3.30)),
        ];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::new(dec!(6.60)));
    }

    #[test]
    fn test_is_negative() {
        assert!(Money::new(dec!(-0.01)).is_negative());
        assert!(!Money::zero().is_negative());
        assert!(!Money::new(dec!(0.01)).is_negative());
    }
}
