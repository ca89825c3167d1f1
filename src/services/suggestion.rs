//! Suggestion generation and the pending suggestion queue
//!
//! The engine turns a context analysis into ranked suggestions. The queue
//! holds what the user has not yet applied or dismissed.

use std::collections::HashSet;

use tracing::debug;

use crate::config::ComposerSettings;
use crate::models::{
    ContextAnalysis, JournalEntry, Money, Side, Suggestion, SuggestionId, SuggestionPayload,
    SuggestionType, TransactionType,
};

/// Template suggestions need more than this analysis confidence
const TEMPLATE_MIN_CONFIDENCE: u8 = 70;

/// Template suggestions above this confidence may be auto-applied
const TEMPLATE_AUTO_APPLY_CONFIDENCE: u8 = 85;

const ACCOUNT_CONFIDENCE: u8 = 85;

/// Split suggestions need an estimated amount above this many units
const SPLIT_MIN_AMOUNT: i64 = 100_000;

const VAT_CONFIDENCE: u8 = 70;

const AMOUNT_CONFIDENCE: u8 = 60;

/// Rule-based suggestion generator
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    extended: bool,
    vat_rate_percent: f64,
    currency_symbol: String,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self {
            extended: false,
            vat_rate_percent: 18.0,
            currency_symbol: "FCFA".to_string(),
        }
    }
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &ComposerSettings) -> Self {
        Self {
            extended: settings.extended_suggestions,
            vat_rate_percent: settings.vat_rate_percent,
            currency_symbol: settings.currency_symbol.clone(),
        }
    }

    /// Also emit VAT and AMOUNT hints
    pub fn with_extended_rules(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    /// Generate suggestions for the current draft, in rule order
    pub fn generate(&self, analysis: &ContextAnalysis, draft: &JournalEntry) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        if let Some(transaction_type) = analysis.transaction_type {
            if analysis.confidence > TEMPLATE_MIN_CONFIDENCE {
                let template = analysis.best_template().cloned();
                let reasoning = match &template {
                    Some(t) => format!("Opération {} détectée, modèle « {} »", transaction_type, t.name),
                    None => format!("Opération {} détectée", transaction_type),
                };
                suggestions.push(
                    Suggestion::new(
                        SuggestionPayload::Template {
                            transaction_type,
                            template,
                        },
                        analysis.confidence,
                        reasoning,
                    )
                    .with_auto_apply(analysis.confidence > TEMPLATE_AUTO_APPLY_CONFIDENCE),
                );
            }
        }

        if !analysis.suggested_accounts.is_empty() {
            let accounts: Vec<&str> = analysis
                .suggested_accounts
                .iter()
                .map(|a| a.account.as_str())
                .collect();
            suggestions.push(Suggestion::new(
                SuggestionPayload::Accounts {
                    accounts: analysis.suggested_accounts.clone(),
                },
                ACCOUNT_CONFIDENCE,
                format!("Comptes associés aux mots-clés : {}", accounts.join(", ")),
            ));
        }

        if let Some(split) = &analysis.split_suggestion {
            if analysis.amount_estimate > Money::from_units(SPLIT_MIN_AMOUNT) {
                suggestions.push(Suggestion::new(
                    SuggestionPayload::Split {
                        split: split.clone(),
                    },
                    analysis.confidence,
                    format!(
                        "Ventilation de {} sur {} comptes",
                        self.format(analysis.amount_estimate),
                        split.accounts.len()
                    ),
                ));
            }
        }

        if self.extended {
            suggestions.extend(self.vat_suggestion(analysis, draft));
            suggestions.extend(self.amount_suggestion(analysis, draft));
        }

        debug!(count = suggestions.len(), "suggestions generated");
        suggestions
    }

    fn format(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    fn vat_suggestion(&self, analysis: &ContextAnalysis, draft: &JournalEntry) -> Option<Suggestion> {
        if !analysis.vat_applicable || !analysis.amount_estimate.is_positive() {
            return None;
        }

        let (account, description, side) = match analysis.transaction_type? {
            TransactionType::PurchaseInvoice => {
                ("4452", "État, TVA récupérable sur achats", Side::Debit)
            }
            TransactionType::SaleInvoice => ("4431", "État, TVA facturée sur ventes", Side::Credit),
            _ => return None,
        };

        if draft.lines.iter().any(|l| l.account.starts_with("443") || l.account.starts_with("445")) {
            return None;
        }

        let amount = analysis.amount_estimate.percent_of(self.vat_rate_percent);
        Some(Suggestion::new(
            SuggestionPayload::Vat {
                account: account.to_string(),
                description: description.to_string(),
                side,
                rate_percent: self.vat_rate_percent,
                amount,
            },
            VAT_CONFIDENCE,
            format!(
                "TVA à {}% sur {}",
                self.vat_rate_percent,
                self.format(analysis.amount_estimate)
            ),
        ))
    }

    fn amount_suggestion(&self, analysis: &ContextAnalysis, draft: &JournalEntry) -> Option<Suggestion> {
        if !analysis.amount_estimate.is_positive() || !draft.is_blank() {
            return None;
        }
        Some(Suggestion::new(
            SuggestionPayload::Amount {
                amount: analysis.amount_estimate,
            },
            AMOUNT_CONFIDENCE,
            format!(
                "Montant relevé dans le libellé : {}",
                self.format(analysis.amount_estimate)
            ),
        ))
    }
}

/// Suggestions from the default rule set
pub fn suggest(analysis: &ContextAnalysis, draft: &JournalEntry) -> Vec<Suggestion> {
    SuggestionEngine::new().generate(analysis, draft)
}

/// Suggestions awaiting a user decision
#[derive(Debug, Default)]
pub struct SuggestionQueue {
    input: Option<String>,
    pending: Vec<Suggestion>,
    dismissed: HashSet<SuggestionType>,
}

impl SuggestionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending list with suggestions for `input`
    ///
    /// Kinds dismissed for the same input are not offered again; a new
    /// input clears the dismissals.
    pub fn replace(&mut self, input: &str, suggestions: Vec<Suggestion>) {
        if self.input.as_deref() != Some(input) {
            self.dismissed.clear();
            self.input = Some(input.to_string());
        }
        self.pending = suggestions
            .into_iter()
            .filter(|s| !self.dismissed.contains(&s.suggestion_type))
            .collect();
    }

    pub fn pending(&self) -> &[Suggestion] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn get(&self, id: SuggestionId) -> Option<&Suggestion> {
        self.pending.iter().find(|s| s.id == id)
    }

    /// Remove a suggestion so it can be applied
    pub fn take(&mut self, id: SuggestionId) -> Option<Suggestion> {
        let index = self.pending.iter().position(|s| s.id == id)?;
        Some(self.pending.remove(index))
    }

    /// Dismiss a suggestion; returns false if it was already gone
    pub fn dismiss(&mut self, id: SuggestionId) -> bool {
        match self.take(id) {
            Some(suggestion) => {
                debug!(suggestion = %suggestion.id, kind = %suggestion.suggestion_type, "suggestion dismissed");
                self.dismissed.insert(suggestion.suggestion_type);
                true
            }
            None => false,
        }
    }

    /// Remove and return every suggestion eligible for auto-accept
    pub fn drain_auto_acceptable(&mut self) -> Vec<Suggestion> {
        let (accepted, remaining): (Vec<Suggestion>, Vec<Suggestion>) = self
            .pending
            .drain(..)
            .partition(Suggestion::is_auto_acceptable);
        self.pending = remaining;
        accepted
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryTemplateCatalog, KeywordAccountCatalog};
    use crate::models::{AccountSuggestion, EntryLine, SplitMethod, VentilationSuggestion, WeightedAccount};
    use crate::services::classifier::TextClassifier;

    fn analyze(description: &str) -> ContextAnalysis {
        let accounts = KeywordAccountCatalog::syscohada();
        let templates = InMemoryTemplateCatalog::syscohada();
        TextClassifier::new(&accounts, &templates).analyze(description)
    }

    fn split_analysis(amount: i64) -> ContextAnalysis {
        ContextAnalysis {
            amount_estimate: Money::from_units(amount),
            split_suggestion: Some(VentilationSuggestion {
                method: SplitMethod::Percentage,
                accounts: vec![
                    WeightedAccount {
                        account: "6041".into(),
                        description: String::new(),
                        amount: Money::from_units(amount / 2),
                        percentage: 50.0,
                    },
                    WeightedAccount {
                        account: "6047".into(),
                        description: String::new(),
                        amount: Money::from_units(amount / 2),
                        percentage: 50.0,
                    },
                ],
            }),
            confidence: 75,
            ..ContextAnalysis::default()
        }
    }

    fn types(suggestions: &[Suggestion]) -> Vec<SuggestionType> {
        suggestions.iter().map(|s| s.suggestion_type).collect()
    }

    #[test]
    fn test_purchase_invoice_suggestions() {
        let analysis = analyze("Facture achat fournitures 50000");
        let suggestions = SuggestionEngine::new().generate(&analysis, &JournalEntry::default());

        assert_eq!(
            types(&suggestions),
            vec![SuggestionType::Template, SuggestionType::Account]
        );

        let template = &suggestions[0];
        assert_eq!(template.confidence, analysis.confidence);
        assert!(template.auto_apply);
        match &template.payload {
            SuggestionPayload::Template {
                transaction_type,
                template,
            } => {
                assert_eq!(*transaction_type, TransactionType::PurchaseInvoice);
                assert_eq!(template.as_ref().unwrap().structure.lines.len(), 3);
            }
            other => panic!("unexpected payload {:?}", other),
        }

        assert_eq!(suggestions[1].confidence, 85);
        assert!(!suggestions[1].auto_apply);
    }

    #[test]
    fn test_template_needs_confidence_above_70() {
        let mut analysis = ContextAnalysis {
            transaction_type: Some(TransactionType::Provision),
            confidence: 70,
            ..ContextAnalysis::default()
        };
        let engine = SuggestionEngine::new();
        assert!(engine.generate(&analysis, &JournalEntry::default()).is_empty());

        analysis.confidence = 80;
        let suggestions = engine.generate(&analysis, &JournalEntry::default());
        assert_eq!(types(&suggestions), vec![SuggestionType::Template]);
        assert!(!suggestions[0].auto_apply);
    }

    #[test]
    fn test_account_suggestion_never_auto_applies() {
        let analysis = ContextAnalysis {
            suggested_accounts: vec![AccountSuggestion::new("601", "Achats")],
            confidence: 100,
            ..ContextAnalysis::default()
        };
        let suggestions = SuggestionEngine::new().generate(&analysis, &JournalEntry::default());
        assert_eq!(suggestions.len(), 1);
        assert!(!suggestions[0].auto_apply);
    }

    #[test]
    fn test_split_needs_amount_above_threshold() {
        let engine = SuggestionEngine::new();
        let at_threshold = engine.generate(&split_analysis(100_000), &JournalEntry::default());
        assert!(at_threshold.is_empty());

        let above = engine.generate(&split_analysis(150_000), &JournalEntry::default());
        assert_eq!(types(&above), vec![SuggestionType::Split]);
        assert!(!above[0].auto_apply);
    }

    #[test]
    fn test_extended_rules() {
        let analysis = analyze("Facture achat fournitures 50000");
        let engine = SuggestionEngine::new().with_extended_rules(true);
        let suggestions = engine.generate(&analysis, &JournalEntry::default());

        assert_eq!(
            types(&suggestions),
            vec![
                SuggestionType::Template,
                SuggestionType::Account,
                SuggestionType::Vat,
                SuggestionType::Amount
            ]
        );
        match &suggestions[2].payload {
            SuggestionPayload::Vat { account, amount, side, .. } => {
                assert_eq!(account, "4452");
                assert_eq!(*side, Side::Debit);
                assert_eq!(*amount, Money::from_units(9_000));
            }
            other => panic!("unexpected payload {:?}", other),
        }

        // A draft that already carries VAT and amounts gets neither hint
        let mut draft = JournalEntry::default();
        draft.lines[0] = EntryLine::debit("4452", "TVA", Money::from_units(9_000));
        let suggestions = engine.generate(&analysis, &draft);
        assert_eq!(
            types(&suggestions),
            vec![SuggestionType::Template, SuggestionType::Account]
        );
    }

    #[test]
    fn test_reasoning_uses_configured_currency() {
        let settings = ComposerSettings {
            extended_suggestions: true,
            currency_symbol: "XOF".into(),
            ..ComposerSettings::default()
        };
        let analysis = analyze("Facture achat fournitures 50000");
        let suggestions =
            SuggestionEngine::from_settings(&settings).generate(&analysis, &JournalEntry::default());

        let vat = suggestions
            .iter()
            .find(|s| s.suggestion_type == SuggestionType::Vat)
            .unwrap();
        assert_eq!(vat.reasoning, "TVA à 18% sur 50000.00 XOF");

        let amount = suggestions
            .iter()
            .find(|s| s.suggestion_type == SuggestionType::Amount)
            .unwrap();
        assert!(amount.reasoning.ends_with("50000.00 XOF"));

        let split = SuggestionEngine::new().generate(&split_analysis(150_000), &JournalEntry::default());
        assert!(split[0].reasoning.contains("150000.00 FCFA"));
    }

    fn queue_with(input: &str) -> (SuggestionQueue, Vec<SuggestionId>) {
        let analysis = analyze("Facture achat fournitures 50000");
        let suggestions = SuggestionEngine::new().generate(&analysis, &JournalEntry::default());
        let ids = suggestions.iter().map(|s| s.id).collect();
        let mut queue = SuggestionQueue::new();
        queue.replace(input, suggestions);
        (queue, ids)
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let (mut queue, ids) = queue_with("Facture achat fournitures 50000");
        assert!(queue.dismiss(ids[1]));
        assert!(!queue.dismiss(ids[1]));
        assert_eq!(queue.pending().len(), 1);
        assert!(queue.get(ids[1]).is_none());
    }

    #[test]
    fn test_dismissed_kind_not_reoffered_for_same_input() {
        let input = "Facture achat fournitures 50000";
        let (mut queue, ids) = queue_with(input);
        queue.dismiss(ids[1]);

        let regenerated = SuggestionEngine::new().generate(&analyze(input), &JournalEntry::default());
        queue.replace(input, regenerated.clone());
        assert_eq!(types(queue.pending()), vec![SuggestionType::Template]);

        queue.replace("Facture achat fournitures 60000", regenerated);
        assert_eq!(queue.pending().len(), 2);
    }

    #[test]
    fn test_drain_auto_acceptable() {
        let (mut queue, _) = queue_with("Facture achat fournitures 50000");
        let accepted = queue.drain_auto_acceptable();

        assert_eq!(types(&accepted), vec![SuggestionType::Template]);
        assert_eq!(types(queue.pending()), vec![SuggestionType::Account]);
    }
}
