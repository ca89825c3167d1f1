//! Core data models
//!
//! This module contains the data structures of the entry composition
//! domain: entries and their lines, ventilations, templates, context
//! analyses and suggestions.

pub mod analysis;
pub mod entry;
pub mod ids;
pub mod money;
pub mod split;
pub mod suggestion;
pub mod template;

pub use analysis::{
    AccountSuggestion, ContextAnalysis, TemplateSuggestion, TransactionType,
    VentilationSuggestion, WeightedAccount,
};
pub use entry::{Analytics, EntryLine, EntryMetadata, JournalEntry, LineValidationError};
pub use ids::{LineId, SuggestionId, TemplateId, ThirdPartyId};
pub use money::{Money, MoneyParseError};
pub use split::{SplitLine, SplitMethod, VentilationSplit};
pub use suggestion::{Side, Suggestion, SuggestionPayload, SuggestionType};
pub use template::{EntryTemplate, TemplateLine, TemplateStructure};
