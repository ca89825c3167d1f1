//! Suggestion model
//!
//! Suggestions are transient: generated from a context analysis, then either
//! applied to the draft or dismissed. They never outlive the editing session.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::analysis::{AccountSuggestion, TransactionType, VentilationSuggestion};
use super::ids::{SuggestionId, ThirdPartyId};
use super::money::Money;
use super::template::EntryTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionType {
    Account,
    Amount,
    ThirdParty,
    Vat,
    Split,
    Template,
}

impl fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => write!(f, "ACCOUNT"),
            Self::Amount => write!(f, "AMOUNT"),
            Self::ThirdParty => write!(f, "THIRD_PARTY"),
            Self::Vat => write!(f, "VAT"),
            Self::Split => write!(f, "SPLIT"),
            Self::Template => write!(f, "TEMPLATE"),
        }
    }
}

/// Side of the entry a line lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Debit,
    Credit,
}

/// What applying a suggestion does to the draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionPayload {
    /// Replace the line set with a template
    Template {
        transaction_type: TransactionType,
        template: Option<EntryTemplate>,
    },
    /// Assign accounts to existing lines by position
    Accounts { accounts: Vec<AccountSuggestion> },
    /// Ventilate the largest line
    Split { split: VentilationSuggestion },
    /// Fill the first line's amount
    Amount { amount: Money },
    /// Append a VAT line
    Vat {
        account: String,
        description: String,
        side: Side,
        rate_percent: f64,
        amount: Money,
    },
    /// Attach a third party to the line at a position
    ThirdParty {
        line_index: usize,
        third_party: ThirdPartyId,
    },
}

impl SuggestionPayload {
    pub fn suggestion_type(&self) -> SuggestionType {
        match self {
            Self::Template { .. } => SuggestionType::Template,
            Self::Accounts { .. } => SuggestionType::Account,
            Self::Split { .. } => SuggestionType::Split,
            Self::Amount { .. } => SuggestionType::Amount,
            Self::Vat { .. } => SuggestionType::Vat,
            Self::ThirdParty { .. } => SuggestionType::ThirdParty,
        }
    }
}

/// A ranked, confidence-scored proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: SuggestionId,

    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,

    /// 0 to 100
    pub confidence: u8,

    pub payload: SuggestionPayload,

    pub reasoning: String,

    pub auto_apply: bool,
}

impl Suggestion {
    /// Create a suggestion that requires explicit confirmation
    pub fn new(payload: SuggestionPayload, confidence: u8, reasoning: impl Into<String>) -> Self {
        Self {
            id: SuggestionId::new(),
            suggestion_type: payload.suggestion_type(),
            confidence: confidence.min(100),
            payload,
            reasoning: reasoning.into(),
            auto_apply: false,
        }
    }

    /// Mark the suggestion as eligible for auto-apply
    ///
    /// Account assignments change the legal classification of a line and
    /// always stay manual; the flag is ignored for them.
    pub fn with_auto_apply(mut self, auto_apply: bool) -> Self {
        self.auto_apply = auto_apply && self.suggestion_type != SuggestionType::Account;
        self
    }

    /// Whether this suggestion is applied without asking when auto-accept is on
    pub fn is_auto_acceptable(&self) -> bool {
        self.auto_apply && self.confidence > 90
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}%): {}",
            self.suggestion_type, self.confidence, self.reasoning
        )
    }
}
