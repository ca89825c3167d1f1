//! Text classifier
//!
//! Deterministic keyword analysis of a free-text entry description. Each
//! heuristic is an ordered table of rules so the outcome is reproducible
//! and easy to test.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::catalog::{AccountCatalog, TemplateCatalog};
use crate::config::ComposerSettings;
use crate::error::ComposerResult;
use crate::models::{
    AccountSuggestion, ContextAnalysis, Money, SplitMethod, TransactionType,
    VentilationSuggestion, WeightedAccount,
};

use super::analysis::ContextAnalyzer;

/// Transaction type rules in priority order
///
/// Every group must match; within a group any alternative matches.
const TRANSACTION_TYPE_RULES: &[(&[&[&str]], TransactionType)] = &[
    (&[&["facture"], &["achat"]], TransactionType::PurchaseInvoice),
    (&[&["facture"], &["vente"]], TransactionType::SaleInvoice),
    (
        &[&["règlement", "reglement", "paiement"]],
        TransactionType::PaymentReceipt,
    ),
    (&[&["amortissement"]], TransactionType::Depreciation),
    (&[&["provision"]], TransactionType::Provision),
];

const VAT_KEYWORDS: &[&str] = &["facture", "achat", "vente", "prestation", "service"];

const SPLIT_KEYWORDS: &[&str] = &["répartir", "repartir", "ventiler"];


/// Ventilation targets used when the description names fewer than two
/// expense accounts
const DEFAULT_SPLIT_TARGETS: &[(&str, &str, f64)] = &[
    ("6041", "Matières consommables", 60.0),
    ("6047", "Fournitures de bureau", 40.0),
];

fn amount_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)?").expect("hardcoded regex should be valid"))
}

/// Currency codes as whole words (digits may touch them) or a currency sign
fn currency_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^|\P{L})(?:fcfa|xof|xaf|cfa|euros?)(?:\P{L}|$)|[€$]")
            .expect("hardcoded regex should be valid")
    })
}

/// Keyword classifier over the account and template catalogs
pub struct TextClassifier<'a> {
    accounts: &'a dyn AccountCatalog,
    templates: &'a dyn TemplateCatalog,
    min_description_length: usize,
}

impl<'a> TextClassifier<'a> {
    pub fn new(accounts: &'a dyn AccountCatalog, templates: &'a dyn TemplateCatalog) -> Self {
        Self {
            accounts,
            templates,
            min_description_length: 10,
        }
    }

    /// Classifier using the configured minimum description length
    pub fn from_settings(
        accounts: &'a dyn AccountCatalog,
        templates: &'a dyn TemplateCatalog,
        settings: &ComposerSettings,
    ) -> Self {
        Self::new(accounts, templates).with_min_description_length(settings.min_description_length)
    }

    /// Descriptions of `length` characters or fewer are not analyzed
    pub fn with_min_description_length(mut self, length: usize) -> Self {
        self.min_description_length = length;
        self
    }

    /// Whether a description is long enough to be worth analyzing
    pub fn should_analyze(&self, description: &str) -> bool {
        description.trim().chars().count() > self.min_description_length
    }

    /// Derive a context analysis from a description
    pub fn analyze(&self, description: &str) -> ContextAnalysis {
        let text = description.to_lowercase();
        let amount_estimate = Self::amount_estimate(&text);
        let suggested_accounts = self.accounts.lookup_by_keyword(&text);

        let analysis = ContextAnalysis {
            transaction_type: Self::transaction_type(&text),
            split_suggestion: Self::split_suggestion(&text, &suggested_accounts, amount_estimate),
            suggested_accounts,
            template_matches: self.templates.match_text(&text),
            vat_applicable: Self::vat_applicable(&text),
            amount_estimate,
            confidence: Self::confidence(description),
        };

        debug!(
            transaction_type = ?analysis.transaction_type,
            accounts = analysis.suggested_accounts.len(),
            templates = analysis.template_matches.len(),
            confidence = analysis.confidence,
            "description analyzed"
        );

        analysis
    }

    /// First rule whose keyword groups all match
    pub fn transaction_type(text: &str) -> Option<TransactionType> {
        let text = text.to_lowercase();
        TRANSACTION_TYPE_RULES
            .iter()
            .find(|(groups, _)| {
                groups
                    .iter()
                    .all(|alternatives| alternatives.iter().any(|k| text.contains(k)))
            })
            .map(|(_, ty)| *ty)
    }

    pub fn vat_applicable(text: &str) -> bool {
        let text = text.to_lowercase();
        VAT_KEYWORDS.iter().any(|k| text.contains(k))
    }

    /// First decimal number in the text, zero if there is none
    pub fn amount_estimate(text: &str) -> Money {
        amount_pattern()
            .find(text)
            .and_then(|m| Money::parse(m.as_str()).ok())
            .unwrap_or_default()
    }

    /// Heuristic confidence in the analysis, 0 to 100
    pub fn confidence(description: &str) -> u8 {
        let text = description.to_lowercase();
        let mut score: u32 = 50;

        if description.chars().count() > 20 {
            score += 10;
        }
        if description.chars().any(|c| c.is_ascii_digit()) {
            score += 15;
        }
        if text.contains("facture") {
            score += 20;
        }
        if currency_pattern().is_match(&text) {
            score += 10;
        }

        score.min(100) as u8
    }

    /// Percentage ventilation when the text asks to split
    pub fn split_suggestion(
        text: &str,
        suggested_accounts: &[AccountSuggestion],
        amount_estimate: Money,
    ) -> Option<VentilationSuggestion> {
        let text = text.to_lowercase();
        if !SPLIT_KEYWORDS.iter().any(|k| text.contains(k)) {
            return None;
        }

        let expense_accounts: Vec<&AccountSuggestion> = suggested_accounts
            .iter()
            .filter(|a| a.account.starts_with('6'))
            .collect();

        let targets: Vec<(String, String, f64)> = if expense_accounts.len() >= 2 {
            let share = 100.0 / expense_accounts.len() as f64;
            expense_accounts
                .iter()
                .map(|a| (a.account.clone(), a.description.clone(), share))
                .collect()
        } else {
            DEFAULT_SPLIT_TARGETS
                .iter()
                .map(|(account, description, pct)| {
                    (account.to_string(), description.to_string(), *pct)
                })
                .collect()
        };

        let mut allocated = Money::zero();
        let last = targets.len() - 1;
        let accounts = targets
            .into_iter()
            .enumerate()
            .map(|(i, (account, description, percentage))| {
                // The last target absorbs rounding so the parts add up
                let amount = if i == last {
                    amount_estimate - allocated
                } else {
                    amount_estimate.percent_of(percentage)
                };
                allocated += amount;
                WeightedAccount {
                    account,
                    description,
                    amount,
                    percentage,
                }
            })
            .collect();

        Some(VentilationSuggestion {
            method: SplitMethod::Percentage,
            accounts,
        })
    }
}

#[async_trait]
impl<'a> ContextAnalyzer for TextClassifier<'a> {
    async fn analyze(&self, description: &str) -> ComposerResult<ContextAnalysis> {
        Ok(TextClassifier::analyze(self, description))
    }
}

/// Analyze a description against the given catalogs
pub fn analyze(
    accounts: &dyn AccountCatalog,
    templates: &dyn TemplateCatalog,
    description: &str,
) -> ContextAnalysis {
    TextClassifier::new(accounts, templates).analyze(description)
}
