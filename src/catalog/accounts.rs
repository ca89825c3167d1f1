//! Keyword-driven account catalog
//!
//! Maps description keywords to SYSCOHADA accounts. The table is ordered:
//! the order of matches is the order in which accounts are later assigned
//! to entry lines.

use crate::models::AccountSuggestion;

use super::AccountCatalog;

/// A keyword and the account it points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub keyword: String,
    pub account: String,
    pub description: String,
}

/// In-memory account catalog keyed by lowercase keywords
#[derive(Debug, Clone, Default)]
pub struct KeywordAccountCatalog {
    rules: Vec<KeywordRule>,
}

const SYSCOHADA_KEYWORDS: &[(&str, &str, &str)] = &[
    ("achat", "601", "Achats de marchandises"),
    ("vente", "701", "Ventes de marchandises"),
    ("banque", "512", "Banque"),
    ("fournisseur", "401", "Fournisseurs, dettes en compte"),
    ("client", "411", "Clients"),
    ("caisse", "571", "Caisse"),
    ("fourniture", "6047", "Fournitures de bureau"),
    ("loyer", "622", "Locations et charges locatives"),
    ("transport", "618", "Autres frais de transport"),
    ("électricité", "6052", "Fournitures non stockables - électricité"),
    ("salaire", "661", "Rémunérations directes versées au personnel"),
    ("prestation", "706", "Services vendus"),
    ("amortissement", "681", "Dotations aux amortissements d'exploitation"),
    ("provision", "691", "Dotations aux provisions d'exploitation"),
];

impl KeywordAccountCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with common SYSCOHADA keywords
    pub fn syscohada() -> Self {
        let mut catalog = Self::new();
        for &(keyword, account, description) in SYSCOHADA_KEYWORDS {
            catalog = catalog.with_rule(keyword, account, description);
        }
        catalog
    }

    /// Append a rule; later rules rank after earlier ones
    pub fn with_rule(
        mut self,
        keyword: impl Into<String>,
        account: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.rules.push(KeywordRule {
            keyword: keyword.into().to_lowercase(),
            account: account.into(),
            description: description.into(),
        });
        self
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }
}

impl AccountCatalog for KeywordAccountCatalog {
    fn lookup_by_keyword(&self, text: &str) -> Vec<AccountSuggestion> {
        let text = text.to_lowercase();
        let mut matches: Vec<AccountSuggestion> = Vec::new();

        for rule in self.rules.iter().filter(|r| text.contains(&r.keyword)) {
            // Two keywords may share an account
            if matches.iter().any(|m| m.account == rule.account) {
                continue;
            }
            matches.push(AccountSuggestion::new(&rule.account, &rule.description));
        }

        matches
    }
}
