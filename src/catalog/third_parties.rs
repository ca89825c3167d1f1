//! Third-party register
//!
//! Entry lines reference third parties by id only; this catalog lets a
//! caller resolve those ids for display.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::models::ThirdPartyId;

use super::ThirdPartyCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThirdPartyKind {
    Customer,
    Supplier,
    Employee,
    Other,
}

/// A customer, supplier or other external entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdParty {
    pub id: ThirdPartyId,
    pub name: String,
    pub kind: ThirdPartyKind,

    /// Collective account the third party posts to (e.g. 401, 411)
    pub account: String,
}

impl ThirdParty {
    pub fn new(name: impl Into<String>, kind: ThirdPartyKind) -> Self {
        let account = match kind {
            ThirdPartyKind::Customer => "411",
            ThirdPartyKind::Supplier => "401",
            ThirdPartyKind::Employee => "422",
            ThirdPartyKind::Other => "471",
        };
        Self {
            id: ThirdPartyId::new(),
            name: name.into(),
            kind,
            account: account.to_string(),
        }
    }
}

impl fmt::Display for ThirdParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.account)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryThirdPartyCatalog {
    parties: HashMap<ThirdPartyId, ThirdParty>,
}

impl InMemoryThirdPartyCatalog {
    pub fn new(parties: impl IntoIterator<Item = ThirdParty>) -> Self {
        Self {
            parties: parties.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}

impl ThirdPartyCatalog for InMemoryThirdPartyCatalog {
    fn get(&self, id: ThirdPartyId) -> Option<ThirdParty> {
        self.parties.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collective_account_by_kind() {
        assert_eq!(ThirdParty::new("SOTRA", ThirdPartyKind::Supplier).account, "401");
        assert_eq!(ThirdParty::new("Orange CI", ThirdPartyKind::Customer).account, "411");
    }

    #[test]
    fn test_lookup() {
        let supplier = ThirdParty::new("CFAO Motors", ThirdPartyKind::Supplier);
        let id = supplier.id;
        let catalog = InMemoryThirdPartyCatalog::new(vec![supplier]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(id).unwrap().name, "CFAO Motors");
        assert!(catalog.get(ThirdPartyId::new()).is_none());
    }

    #[test]
    fn test_display() {
        let party = ThirdParty::new("CFAO Motors", ThirdPartyKind::Supplier);
        assert_eq!(party.to_string(), "CFAO Motors (401)");
    }
}
