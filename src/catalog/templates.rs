//! In-memory template catalog
//!
//! Ranks templates against free text using keyword hits and a word-overlap
//! similarity on the template name.

use std::collections::HashSet;

use crate::config::ComposerSettings;
use crate::models::{EntryTemplate, TemplateLine, TemplateSuggestion, TransactionType};

use super::TemplateCatalog;

/// Template library held in memory
#[derive(Debug, Clone)]
pub struct InMemoryTemplateCatalog {
    templates: Vec<EntryTemplate>,
    min_score: f64,
    max_matches: usize,
}

impl Default for InMemoryTemplateCatalog {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            min_score: 0.3,
            max_matches: 5,
        }
    }
}

impl InMemoryTemplateCatalog {
    pub fn new(templates: Vec<EntryTemplate>) -> Self {
        Self {
            templates,
            ..Self::default()
        }
    }

    /// Library of the recurring SYSCOHADA entries
    pub fn syscohada() -> Self {
        Self::new(vec![
            EntryTemplate::new(
                "Facture d'achat de marchandises",
                vec![
                    TemplateLine::new("601", "Achats de marchandises"),
                    TemplateLine::new("4452", "État, TVA récupérable sur achats"),
                    TemplateLine::new("401", "Fournisseurs, dettes en compte"),
                ],
            )
            .with_journal("AC")
            .with_type(TransactionType::PurchaseInvoice)
            .with_keywords(&["facture", "achat", "fournisseur", "marchandises"]),
            EntryTemplate::new(
                "Facture de vente de marchandises",
                vec![
                    TemplateLine::new("411", "Clients"),
                    TemplateLine::new("701", "Ventes de marchandises"),
                    TemplateLine::new("4431", "État, TVA facturée sur ventes"),
                ],
            )
            .with_journal("VE")
            .with_type(TransactionType::SaleInvoice)
            .with_keywords(&["facture", "vente", "client", "marchandises"]),
            EntryTemplate::new(
                "Règlement fournisseur par banque",
                vec![
                    TemplateLine::new("401", "Fournisseurs, dettes en compte"),
                    TemplateLine::new("512", "Banque"),
                ],
            )
            .with_journal("BQ")
            .with_type(TransactionType::PaymentReceipt)
            .with_keywords(&["règlement", "paiement", "fournisseur", "banque"]),
            EntryTemplate::new(
                "Dotation aux amortissements",
                vec![
                    TemplateLine::new("681", "Dotations aux amortissements d'exploitation"),
                    TemplateLine::new("284", "Amortissements du matériel"),
                ],
            )
            .with_journal("OD")
            .with_type(TransactionType::Depreciation)
            .with_keywords(&["amortissement", "dotation", "matériel"]),
            EntryTemplate::new(
                "Dotation aux provisions",
                vec![
                    TemplateLine::new("691", "Dotations aux provisions d'exploitation"),
                    TemplateLine::new("491", "Dépréciations des comptes clients"),
                ],
            )
            .with_journal("OD")
            .with_type(TransactionType::Provision)
            .with_keywords(&["provision", "dotation", "créance", "douteuse"]),
        ])
    }

    /// Override the ranking thresholds
    pub fn with_limits(mut self, min_score: f64, max_matches: usize) -> Self {
        self.min_score = min_score;
        self.max_matches = max_matches;
        self
    }

    /// Apply the configured ranking thresholds
    pub fn with_settings(self, settings: &ComposerSettings) -> Self {
        self.with_limits(settings.template_min_score, settings.max_template_matches)
    }

    pub fn templates(&self) -> &[EntryTemplate] {
        &self.templates
    }

    /// Score a template against free text (0.0 to 1.0)
    pub fn score(template: &EntryTemplate, text: &str) -> f64 {
        let text = normalize(text);

        let keyword_score = if template.keywords.is_empty() {
            0.0
        } else {
            let hits = template
                .keywords
                .iter()
                .filter(|k| text.contains(k.as_str()))
                .count();
            hits as f64 / template.keywords.len() as f64
        };

        keyword_score.max(name_similarity(&template.name, &text))
    }
}

impl TemplateCatalog for InMemoryTemplateCatalog {
    fn match_text(&self, text: &str) -> Vec<TemplateSuggestion> {
        let mut matches: Vec<TemplateSuggestion> = self
            .templates
            .iter()
            .map(|template| TemplateSuggestion {
                template: template.clone(),
                match_score: Self::score(template, text),
            })
            .filter(|m| m.match_score >= self.min_score)
            .collect();

        // Stable sort keeps catalog order among equal scores
        matches.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
        matches.truncate(self.max_matches);
        matches
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn words(text: &str) -> HashSet<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .collect()
}

/// Similarity between a template name and normalized text
fn name_similarity(name: &str, text: &str) -> f64 {
    let name = normalize(name);

    if name == text {
        return 1.0;
    }

    if !text.is_empty() && (name.contains(text) || text.contains(&name)) {
        return 0.8;
    }

    let name_words = words(&name);
    let text_words = words(text);
    let intersection = name_words.intersection(&text_words).count();
    let union = name_words.union(&text_words).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_description_ranks_purchase_first() {
        let catalog = InMemoryTemplateCatalog::syscohada();
        let matches = catalog.match_text("Facture achat fournitures 50000");

        assert!(!matches.is_empty());
        assert_eq!(
            matches[0].template.transaction_type,
            Some(TransactionType::PurchaseInvoice)
        );
        assert!(matches[0].match_score >= 0.5);
    }

    #[test]
    fn test_scores_are_sorted_descending() {
        let catalog = InMemoryTemplateCatalog::syscohada();
        let matches = catalog.match_text("facture vente client marchandises");
        for pair in matches.windows(2) {
            assert!(pair[0].match_score >= pair[1].match_score);
        }
        assert_eq!(matches[0].match_score, 1.0);
    }

    #[test]
    fn test_exact_name_match() {
        let template = EntryTemplate::new("Loyer mensuel", Vec::new());
        assert_eq!(InMemoryTemplateCatalog::score(&template, "  LOYER MENSUEL "), 1.0);
        assert_eq!(
            InMemoryTemplateCatalog::score(&template, "paiement loyer mensuel bureau"),
            0.8
        );
    }

    #[test]
    fn test_unrelated_text_returns_nothing() {
        let catalog = InMemoryTemplateCatalog::syscohada();
        assert!(catalog.match_text("zzz qqq").is_empty());
    }

    #[test]
    fn test_settings_limits_apply() {
        let settings = ComposerSettings {
            template_min_score: 0.0,
            max_template_matches: 1,
            ..ComposerSettings::default()
        };
        let catalog = InMemoryTemplateCatalog::syscohada().with_settings(&settings);
        assert_eq!(catalog.match_text("facture").len(), 1);

        let strict = ComposerSettings {
            template_min_score: 1.0,
            ..ComposerSettings::default()
        };
        let catalog = InMemoryTemplateCatalog::syscohada().with_settings(&strict);
        assert!(catalog.match_text("facture achat").is_empty());
    }

    #[test]
    fn test_limits_truncate() {
        let catalog = InMemoryTemplateCatalog::syscohada().with_limits(0.0, 2);
        assert_eq!(catalog.match_text("facture").len(), 2);
    }
}
