//! OHADA composer - journal entry composition for SYSCOHADA bookkeeping
//!
//! This library provides the core of an assisted journal entry editor. A
//! free-text description is classified into a transaction type, suggested
//! accounts and templates; the suggestions are applied to a draft entry
//! whose debit/credit balance is recomputed after every mutation.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (entries, lines, splits, suggestions, etc.)
//! - `catalog`: Account, template and third party lookups
//! - `services`: Analysis, suggestion, balance and composition logic
//!
//! # Example
//!
//! ```rust
//! use ohada_composer::catalog::{InMemoryTemplateCatalog, KeywordAccountCatalog};
//! use ohada_composer::services::{EntryComposer, SuggestionEngine, TextClassifier};
//!
//! let accounts = KeywordAccountCatalog::syscohada();
//! let templates = InMemoryTemplateCatalog::syscohada();
//! let analysis = TextClassifier::new(&accounts, &templates)
//!     .analyze("Facture achat fournitures 50000");
//!
//! let mut composer = EntryComposer::new();
//! let suggestions = SuggestionEngine::new().generate(&analysis, composer.draft());
//! composer.offer_suggestions("Facture achat fournitures 50000", suggestions);
//! assert!(!composer.pending_suggestions().is_empty());
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::{ComposerError, ComposerResult};
pub use services::balance::balance;
pub use services::classifier::analyze;
pub use services::composer::{create_draft, mutate};
pub use services::suggestion::suggest;
