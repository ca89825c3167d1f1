//! Journal entry model
//!
//! A journal entry is an ordered, non-empty list of lines that together
//! must satisfy the double-entry invariant before they can be submitted.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{LineId, ThirdPartyId};
use super::money::Money;
use super::split::VentilationSplit;

/// Header fields of an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub entry_date: NaiveDate,

    /// Journal code (e.g. "AC" purchases, "VE" sales, "BQ" bank)
    #[serde(default)]
    pub journal: String,

    /// Piece reference (invoice number, receipt number)
    #[serde(default)]
    pub reference: String,

    #[serde(default)]
    pub description: String,
}

impl Default for EntryMetadata {
    fn default() -> Self {
        Self {
            entry_date: Local::now().date_naive(),
            journal: String::new(),
            reference: String::new(),
            description: String::new(),
        }
    }
}

/// Analytical dimensions of a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Analytics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytical_account: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// A single line of a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryLine {
    /// Stable for the whole editing session
    pub id: LineId,

    /// SYSCOHADA account number
    #[serde(default)]
    pub account: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub debit_amount: Money,

    #[serde(default)]
    pub credit_amount: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_party: Option<ThirdPartyId>,

    #[serde(default)]
    pub analytics: Analytics,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<VentilationSplit>,

    /// How sure the engine was when it produced this line, 0 to 100
    #[serde(default)]
    pub confidence: u8,

    /// Whether the line was produced by a suggestion or template
    #[serde(default)]
    pub ai_suggested: bool,
}

impl Default for EntryLine {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryLine {
    /// Create an empty line with a fresh id
    pub fn new() -> Self {
        Self {
            id: LineId::new(),
            account: String::new(),
            description: String::new(),
            debit_amount: Money::zero(),
            credit_amount: Money::zero(),
            third_party: None,
            analytics: Analytics::default(),
            split: None,
            confidence: 0,
            ai_suggested: false,
        }
    }

    /// Create a debit line
    pub fn debit(account: impl Into<String>, description: impl Into<String>, amount: Money) -> Self {
        Self {
            account: account.into(),
            description: description.into(),
            debit_amount: amount,
            ..Self::new()
        }
    }

    /// Create a credit line
    pub fn credit(account: impl Into<String>, description: impl Into<String>, amount: Money) -> Self {
        Self {
            account: account.into(),
            description: description.into(),
            credit_amount: amount,
            ..Self::new()
        }
    }

    /// Debit plus credit, ignoring any split
    pub fn movement(&self) -> Money {
        self.debit_amount + self.credit_amount
    }

    /// Whether an enabled ventilation supersedes the debit amount
    pub fn is_split(&self) -> bool {
        self.split.as_ref().is_some_and(|s| s.enabled)
    }

    /// Debit contribution used for balancing
    pub fn effective_debit(&self) -> Money {
        match &self.split {
            Some(split) if split.enabled => split.lines_total(),
            _ => self.debit_amount,
        }
    }

    /// Check the per-line amount rules
    pub fn validate(&self) -> Result<(), LineValidationError> {
        if self.debit_amount.is_negative() || self.credit_amount.is_negative() {
            return Err(LineValidationError::NegativeAmount);
        }
        if !self.debit_amount.is_zero() && !self.credit_amount.is_zero() {
            return Err(LineValidationError::BothSides);
        }
        Ok(())
    }
}

/// A journal entry draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub metadata: EntryMetadata,
    pub lines: Vec<EntryLine>,
}

impl Default for JournalEntry {
    fn default() -> Self {
        Self::new(EntryMetadata::default())
    }
}

impl JournalEntry {
    /// Create an entry holding a single empty line
    pub fn new(metadata: EntryMetadata) -> Self {
        Self {
            metadata,
            lines: vec![EntryLine::new()],
        }
    }

    /// Create an entry from existing lines
    ///
    /// An empty line set is replaced by a single empty line so the entry
    /// keeps at least one line.
    pub fn with_lines(metadata: EntryMetadata, lines: Vec<EntryLine>) -> Self {
        if lines.is_empty() {
            return Self::new(metadata);
        }
        Self { metadata, lines }
    }

    pub fn line(&self, id: LineId) -> Option<&EntryLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn line_mut(&mut self, id: LineId) -> Option<&mut EntryLine> {
        self.lines.iter_mut().find(|l| l.id == id)
    }

    pub fn line_index(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|l| l.id == id)
    }

    /// Whether every line is still blank
    pub fn is_blank(&self) -> bool {
        self.lines
            .iter()
            .all(|l| l.account.is_empty() && l.movement().is_zero() && !l.is_split())
    }
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} ({} lines)",
            self.metadata.entry_date.format("%Y-%m-%d"),
            self.metadata.journal,
            self.metadata.description,
            self.lines.len()
        )
    }
}

/// Validation errors for a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineValidationError {
    NegativeAmount,
    BothSides,
}

impl fmt::Display for LineValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAmount => write!(f, "Debit and credit amounts cannot be negative"),
            Self::BothSides => write!(f, "A line cannot carry both a debit and a credit"),
        }
    }
}

impl std::error::Error for LineValidationError {}
