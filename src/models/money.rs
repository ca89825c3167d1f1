//! Money type for representing accounting amounts
//!
//! Internally stores amounts in hundredths of the currency unit (i64) to avoid
//! floating-point drift when summing lines. Percentages and ratios are the only
//! places where floating point appears.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount stored as hundredths of the currency unit
///
/// FCFA has no circulating minor unit, but entries imported from other
/// journals may carry decimals, so two decimal places are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Smallest difference treated as a real discrepancy (0.01)
    pub const EPSILON: Money = Money(1);

    /// Create a Money amount from hundredths
    ///
    /// # Examples
    /// ```
    /// use ohada_composer::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole currency units
    ///
    /// `units` must stay within `i64::MAX / 100`; use [`Money::parse`] for
    /// untrusted input.
    ///
    /// # Examples
    /// ```
    /// use ohada_composer::models::Money;
    /// let amount = Money::from_units(50_000);
    /// assert_eq!(amount.cents(), 5_000_000);
    /// ```
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Create a Money amount from units and hundredths
    ///
    /// Same range restriction as [`Money::from_units`].
    pub const fn from_units_cents(units: i64, cents: i64) -> Self {
        Self(units * 100 + cents)
    }

    /// Create a Money amount from a floating-point value, rounded to 0.01
    pub fn from_f64(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in hundredths
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole units portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Get the hundredths portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Get the amount as a floating-point number of units
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Portion of this amount for a percentage, rounded to 0.01
    pub fn percent_of(&self, percentage: f64) -> Self {
        Self((self.0 as f64 * percentage / 100.0).round() as i64)
    }

    /// Parse an amount as typed in a French-locale form
    ///
    /// Accepts "50000", "1 500,50", "1500.5", "-200" and a trailing or
    /// leading currency marker ("FCFA", "XOF", "XAF", "€", "$").
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let mut cleaned = s.trim().to_uppercase();
        for marker in ["FCFA", "XOF", "XAF", "CFA", "€", "$"] {
            cleaned = cleaned.replace(marker, "");
        }
        let cleaned: String = cleaned
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\u{202f}')
            .map(|c| if c == ',' { '.' } else { c })
            .collect();

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let invalid = || MoneyParseError::InvalidFormat(s.to_string());

        let cents = match digits.split_once('.') {
            Some((units, fraction)) => {
                let units: i64 = if units.is_empty() {
                    0
                } else {
                    units.parse().map_err(|_| invalid())?
                };
                let cents: i64 = match fraction.len() {
                    0 => 0,
                    1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
                    _ => fraction
                        .get(..2)
                        .and_then(|f| f.parse().ok())
                        .ok_or_else(invalid)?,
                };
                units
                    .checked_mul(100)
                    .and_then(|u| u.checked_add(cents))
                    .ok_or_else(invalid)?
            }
            None => digits
                .parse::<i64>()
                .map_err(|_| invalid())?
                .checked_mul(100)
                .ok_or_else(invalid)?,
        };

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Format with a trailing currency symbol ("50000.00 FCFA")
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        format!("{} {}", self, symbol)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "{}.{:02}", self.units(), self.cents_part())
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid amount format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        let m = Money::from_units(50_000);
        assert_eq!(m.cents(), 5_000_000);
        assert_eq!(m.units(), 50_000);
        assert_eq!(m.cents_part(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "10.50");
        assert_eq!(Money::from_cents(-1050).to_string(), "-10.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(
            Money::from_units(1500).format_with_symbol("FCFA"),
            "1500.00 FCFA"
        );
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(1000);
        let b = Money::from_units(400);

        assert_eq!(a + b, Money::from_units(1400));
        assert_eq!(a - b, Money::from_units(600));
        assert_eq!((-a).units(), -1000);
        assert_eq!((b - a).abs(), Money::from_units(600));
    }

    #[test]
    fn test_parse_french_locale() {
        assert_eq!(Money::parse("50000").unwrap(), Money::from_units(50_000));
        assert_eq!(
            Money::parse("1 500,50").unwrap(),
            Money::from_units_cents(1500, 50)
        );
        assert_eq!(
            Money::parse("1500.5 FCFA").unwrap(),
            Money::from_units_cents(1500, 50)
        );
        assert_eq!(Money::parse("-200").unwrap(), Money::from_units(-200));
        assert!(Money::parse("abc").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(Money::parse("100000000000000000").is_err());
        assert!(Money::parse("100000000000000000,50").is_err());
        assert_eq!(
            Money::parse("92233720368547758").unwrap(),
            Money::from_units(92_233_720_368_547_758)
        );
    }

    #[test]
    fn test_parse_non_ascii_fraction_is_error() {
        assert!(Money::parse("1.5\u{0663}").is_err());
        assert!(Money::parse("1,\u{0663}\u{0663}").is_err());
        assert_eq!(Money::parse("1.505").unwrap(), Money::from_cents(150));
    }

    #[test]
    fn test_percent_of() {
        let total = Money::from_units(100_000);
        assert_eq!(total.percent_of(60.0), Money::from_units(60_000));
        assert_eq!(total.percent_of(18.0), Money::from_units(18_000));
        assert_eq!(Money::from_cents(1).percent_of(50.0), Money::from_cents(1));
    }

    #[test]
    fn test_sum() {
        let total: Money = vec![Money::from_units(60_000), Money::from_units(40_000)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_units(100_000));
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_cents(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
