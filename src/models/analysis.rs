//! Context analysis model
//!
//! The result of classifying a free-text entry description. It is derived,
//! recomputed on every description change and never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;
use super::split::SplitMethod;
use super::template::EntryTemplate;

/// Kind of accounting transaction recognized in a description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    PurchaseInvoice,
    SaleInvoice,
    PaymentReceipt,
    Depreciation,
    Provision,
}

impl TransactionType {
    /// Default journal code for this kind of transaction
    pub fn journal_code(&self) -> &'static str {
        match self {
            Self::PurchaseInvoice => "AC",
            Self::SaleInvoice => "VE",
            Self::PaymentReceipt => "BQ",
            Self::Depreciation | Self::Provision => "OD",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PurchaseInvoice => write!(f, "PURCHASE_INVOICE"),
            Self::SaleInvoice => write!(f, "SALE_INVOICE"),
            Self::PaymentReceipt => write!(f, "PAYMENT_RECEIPT"),
            Self::Depreciation => write!(f, "DEPRECIATION"),
            Self::Provision => write!(f, "PROVISION"),
        }
    }
}

/// An account proposed for a description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSuggestion {
    pub account: String,
    pub description: String,
}

impl AccountSuggestion {
    pub fn new(account: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            description: description.into(),
        }
    }
}

/// A template ranked against a description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSuggestion {
    pub template: EntryTemplate,

    /// 0.0 to 1.0
    pub match_score: f64,
}

/// One weighted target of a ventilation suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedAccount {
    pub account: String,
    pub description: String,
    pub amount: Money,
    pub percentage: f64,
}

/// Proposed ventilation of the largest line of an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VentilationSuggestion {
    pub method: SplitMethod,
    pub accounts: Vec<WeightedAccount>,
}

impl VentilationSuggestion {
    pub fn total(&self) -> Money {
        self.accounts.iter().map(|a| a.amount).sum()
    }
}

/// Everything the classifier derived from a description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContextAnalysis {
    pub transaction_type: Option<TransactionType>,
    pub suggested_accounts: Vec<AccountSuggestion>,
    pub template_matches: Vec<TemplateSuggestion>,
    pub vat_applicable: bool,
    pub amount_estimate: Money,
    pub split_suggestion: Option<VentilationSuggestion>,

    /// 0 to 100
    pub confidence: u8,
}

impl ContextAnalysis {
    /// Highest-ranked template, preferring one tagged with the detected type
    pub fn best_template(&self) -> Option<&EntryTemplate> {
        self.template_matches
            .iter()
            .find(|m| {
                self.transaction_type.is_some()
                    && m.template.transaction_type == self.transaction_type
            })
            .or_else(|| self.template_matches.first())
            .map(|m| &m.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::template::TemplateLine;

    fn ranked(name: &str, ty: Option<TransactionType>, score: f64) -> TemplateSuggestion {
        let mut template = EntryTemplate::new(name, vec![TemplateLine::new("601", "")]);
        template.transaction_type = ty;
        TemplateSuggestion {
            template,
            match_score: score,
        }
    }

    #[test]
    fn test_best_template_prefers_detected_type() {
        let analysis = ContextAnalysis {
            transaction_type: Some(TransactionType::SaleInvoice),
            template_matches: vec![
                ranked("Achat", Some(TransactionType::PurchaseInvoice), 0.9),
                ranked("Vente", Some(TransactionType::SaleInvoice), 0.5),
            ],
            ..ContextAnalysis::default()
        };
        assert_eq!(analysis.best_template().unwrap().name, "Vente");
    }

    #[test]
    fn test_best_template_falls_back_to_first() {
        let analysis = ContextAnalysis {
            template_matches: vec![ranked("Loyer", None, 0.6)],
            ..ContextAnalysis::default()
        };
        assert_eq!(analysis.best_template().unwrap().name, "Loyer");
        assert!(ContextAnalysis::default().best_template().is_none());
    }

    #[test]
    fn test_transaction_type_serialization() {
        let json = serde_json::to_string(&TransactionType::PurchaseInvoice).unwrap();
        assert_eq!(json, "\"PURCHASE_INVOICE\"");
        assert_eq!(TransactionType::PaymentReceipt.journal_code(), "BQ");
    }
}
