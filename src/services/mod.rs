//! Service layer for the entry composer
//!
//! The service layer holds the composition logic on top of the models:
//! description analysis, suggestion generation, balance calculation and
//! the stateful draft owner.

pub mod analysis;
pub mod balance;
pub mod classifier;
pub mod composer;
pub mod suggestion;

pub use analysis::{AnalysisOutcome, AnalysisScheduler, AnalysisTicket, ContextAnalyzer};
pub use balance::{BalanceCalculator, BalanceSummary, SplitDriftWarning};
pub use classifier::TextClassifier;
pub use composer::{EntryComposer, EntryOperation, EntryStatus, SubmitBlocked, SubmitIssue};
pub use suggestion::{SuggestionEngine, SuggestionQueue};
