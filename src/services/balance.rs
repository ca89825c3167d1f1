//! Balance calculation
//!
//! Pure recomputation of debit/credit totals over an entry's lines. Called
//! after every mutation; nothing here ever blocks an edit.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::models::{EntryLine, JournalEntry, LineId, Money};

/// Split lines that do not reconcile to their expected total
///
/// Reported next to the offending line, never corrected automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDriftWarning {
    pub line_id: LineId,
    pub total_amount: Money,
    pub lines_total: Money,
}

impl SplitDriftWarning {
    /// Positive when the split lines exceed the expected total
    pub fn drift(&self) -> Money {
        self.lines_total - self.total_amount
    }
}

impl fmt::Display for SplitDriftWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Split lines total {} but the ventilated amount is {} (line {})",
            self.lines_total, self.total_amount, self.line_id
        )
    }
}

/// Totals and diagnostics for a set of entry lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub total_debit: Money,
    pub total_credit: Money,
    pub is_balanced: bool,

    /// Debit minus credit
    pub balance: Money,

    /// 0 to 100, diagnostic only
    pub complexity: u8,

    /// 0 to 100
    pub equilibrium_percentage: f64,

    #[serde(default)]
    pub warnings: Vec<SplitDriftWarning>,
}

impl BalanceSummary {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Stateless balance calculator
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Compute totals, equilibrium, complexity and split drift warnings
    pub fn compute(lines: &[EntryLine]) -> BalanceSummary {
        let total_debit: Money = lines.iter().map(EntryLine::effective_debit).sum();
        // Only the debit side is ventilated
        let total_credit: Money = lines.iter().map(|l| l.credit_amount).sum();
        let balance = total_debit - total_credit;

        let warnings: Vec<SplitDriftWarning> = lines
            .iter()
            .filter_map(|line| {
                let split = line.split.as_ref()?;
                split.has_drift().then(|| SplitDriftWarning {
                    line_id: line.id,
                    total_amount: split.total_amount,
                    lines_total: split.lines_total(),
                })
            })
            .collect();

        for warning in &warnings {
            warn!(line = %warning.line_id, drift = %warning.drift(), "split does not reconcile");
        }

        BalanceSummary {
            total_debit,
            total_credit,
            is_balanced: balance.abs() < Money::EPSILON,
            balance,
            complexity: Self::complexity(lines),
            equilibrium_percentage: Self::equilibrium_percentage(total_debit, total_credit),
            warnings,
        }
    }

    /// How close the two sides are, 100 meaning equal
    pub fn equilibrium_percentage(total_debit: Money, total_credit: Money) -> f64 {
        if !total_credit.is_positive() {
            return 0.0;
        }
        let smaller = total_debit.min(total_credit).to_f64();
        let larger = total_debit.max(total_credit).to_f64();
        (smaller / larger * 100.0).min(100.0)
    }

    /// Weighted count of lines, ventilations, third parties and cost centers
    pub fn complexity(lines: &[EntryLine]) -> u8 {
        let split_lines = lines.iter().filter(|l| l.is_split()).count();
        let with_third_party = lines.iter().filter(|l| l.third_party.is_some()).count();
        let with_cost_center = lines
            .iter()
            .filter(|l| l.analytics.cost_center.is_some())
            .count();

        let score = 5 * lines.len() + 15 * split_lines + 10 * with_third_party + 5 * with_cost_center;
        score.min(100) as u8
    }
}

/// Balance summary of a whole draft
pub fn balance(draft: &JournalEntry) -> BalanceSummary {
    BalanceCalculator::compute(&draft.lines)
}
