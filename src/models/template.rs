//! Entry template model
//!
//! Templates are reusable skeletons of entry lines for recurring
//! transactions. They are owned by the template catalog and only read by
//! the engine.

use serde::{Deserialize, Serialize};

use super::analysis::TransactionType;
use super::entry::{Analytics, EntryLine};
use super::ids::TemplateId;
use super::money::Money;

/// One line of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLine {
    pub account: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub debit_amount: Money,

    #[serde(default)]
    pub credit_amount: Money,
}

impl TemplateLine {
    /// Create a line with no preset amounts
    pub fn new(account: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            description: description.into(),
            debit_amount: Money::zero(),
            credit_amount: Money::zero(),
        }
    }

    pub fn with_amounts(mut self, debit: Money, credit: Money) -> Self {
        self.debit_amount = debit;
        self.credit_amount = credit;
        self
    }

    /// Materialize into a fresh entry line
    pub fn to_entry_line(&self, confidence: u8) -> EntryLine {
        EntryLine {
            account: self.account.clone(),
            description: self.description.clone(),
            debit_amount: self.debit_amount,
            credit_amount: self.credit_amount,
            analytics: Analytics::default(),
            split: None,
            confidence,
            ai_suggested: true,
            ..EntryLine::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TemplateStructure {
    pub lines: Vec<TemplateLine>,
}

/// A reusable entry skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryTemplate {
    pub id: TemplateId,

    pub name: String,

    /// Journal code the template posts to
    #[serde(default)]
    pub journal: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,

    /// Lowercase keywords used for matching free text
    #[serde(default)]
    pub keywords: Vec<String>,

    pub structure: TemplateStructure,
}

impl EntryTemplate {
    pub fn new(name: impl Into<String>, lines: Vec<TemplateLine>) -> Self {
        Self {
            id: TemplateId::new(),
            name: name.into(),
            journal: String::new(),
            transaction_type: None,
            keywords: Vec::new(),
            structure: TemplateStructure { lines },
        }
    }

    pub fn with_journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = journal.into();
        self
    }

    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_entry_line_marks_suggested() {
        let line = TemplateLine::new("601", "Achats de marchandises")
            .with_amounts(Money::from_units(1000), Money::zero());
        let entry_line = line.to_entry_line(95);

        assert_eq!(entry_line.account, "601");
        assert_eq!(entry_line.debit_amount, Money::from_units(1000));
        assert!(entry_line.ai_suggested);
        assert_eq!(entry_line.confidence, 95);
        assert!(entry_line.split.is_none());
    }

    #[test]
    fn test_each_materialized_line_gets_fresh_id() {
        let line = TemplateLine::new("401", "Fournisseurs");
        assert_ne!(line.to_entry_line(95).id, line.to_entry_line(95).id);
    }

    #[test]
    fn test_keywords_lowercased() {
        let template = EntryTemplate::new("Achat", Vec::new()).with_keywords(&["Facture", "ACHAT"]);
        assert_eq!(template.keywords, vec!["facture", "achat"]);
    }
}
