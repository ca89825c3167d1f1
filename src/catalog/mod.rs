//! Read-only catalogs consulted by the engine
//!
//! The chart of accounts, the template library and the third-party
//! register are owned elsewhere. The engine only queries them through the
//! traits below and never mutates them, so implementations need no locking
//! beyond what their own storage requires.

pub mod accounts;
pub mod templates;
pub mod third_parties;

pub use accounts::KeywordAccountCatalog;
pub use templates::InMemoryTemplateCatalog;
pub use third_parties::{InMemoryThirdPartyCatalog, ThirdParty, ThirdPartyKind};

use crate::models::{AccountSuggestion, TemplateSuggestion, ThirdPartyId};

/// Chart-of-accounts lookup
pub trait AccountCatalog: Send + Sync {
    /// Accounts whose keywords appear in `text`, in catalog order
    fn lookup_by_keyword(&self, text: &str) -> Vec<AccountSuggestion>;
}

/// Template library lookup
pub trait TemplateCatalog: Send + Sync {
    /// Templates matching `text`, best match first
    fn match_text(&self, text: &str) -> Vec<TemplateSuggestion>;
}

/// Third-party register lookup
pub trait ThirdPartyCatalog: Send + Sync {
    fn get(&self, id: ThirdPartyId) -> Option<ThirdParty>;
}
