//! Ventilation (split) model
//!
//! A ventilation distributes one line's amount across several sub-accounts
//! for cost allocation. Only the debit side of an entry is ventilated.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// How the split lines were produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitMethod {
    #[default]
    Manual,
    Percentage,
    Equal,
    Historical,
    AiSuggested,
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "MANUAL"),
            Self::Percentage => write!(f, "PERCENTAGE"),
            Self::Equal => write!(f, "EQUAL"),
            Self::Historical => write!(f, "HISTORICAL"),
            Self::AiSuggested => write!(f, "AI_SUGGESTED"),
        }
    }
}

/// One portion of a ventilated line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitLine {
    pub account: String,

    #[serde(default)]
    pub description: String,

    pub amount: Money,

    /// Share of the split total, 0 to 100
    #[serde(default)]
    pub percentage: f64,
}

impl SplitLine {
    pub fn new(account: impl Into<String>, amount: Money, percentage: f64) -> Self {
        Self {
            account: account.into(),
            description: String::new(),
            amount,
            percentage,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Ventilation attached to an entry line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VentilationSplit {
    /// When enabled, the split lines replace the line's debit amount in balance totals
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub method: SplitMethod,

    /// Amount the split lines are expected to reconcile to
    #[serde(default)]
    pub total_amount: Money,

    #[serde(default)]
    pub lines: Vec<SplitLine>,
}

impl VentilationSplit {
    /// Create an enabled split over the given lines
    pub fn enabled(method: SplitMethod, total_amount: Money, lines: Vec<SplitLine>) -> Self {
        Self {
            enabled: true,
            method,
            total_amount,
            lines,
        }
    }

    /// Sum of the split line amounts
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Difference between the split lines and the expected total
    ///
    /// Positive when the split lines exceed `total_amount`.
    pub fn drift(&self) -> Money {
        self.lines_total() - self.total_amount
    }

    /// Whether the split lines fail to reconcile to `total_amount`
    pub fn has_drift(&self) -> bool {
        self.enabled && self.drift().abs() >= Money::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(amounts: &[i64], total: i64) -> VentilationSplit {
        VentilationSplit::enabled(
            SplitMethod::Percentage,
            Money::from_units(total),
            amounts
                .iter()
                .map(|a| SplitLine::new("6011", Money::from_units(*a), 0.0))
                .collect(),
        )
    }

    #[test]
    fn test_reconciled_split_has_no_drift() {
        let s = split(&[60_000, 40_000], 100_000);
        assert_eq!(s.lines_total(), Money::from_units(100_000));
        assert!(!s.has_drift());
    }

    #[test]
    fn test_drift_is_signed() {
        let s = split(&[60_000, 30_000], 100_000);
        assert_eq!(s.drift(), Money::from_units(-10_000));
        assert!(s.has_drift());
    }

    #[test]
    fn test_disabled_split_never_drifts() {
        let mut s = split(&[1], 100_000);
        s.enabled = false;
        assert!(!s.has_drift());
    }

    #[test]
    fn test_method_serialization() {
        let json = serde_json::to_string(&SplitMethod::AiSuggested).unwrap();
        assert_eq!(json, "\"AI_SUGGESTED\"");
    }
}
