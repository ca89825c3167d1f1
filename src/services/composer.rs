//! Entry composer
//!
//! Owns the draft journal entry for one editing session. Every mutation is
//! synchronous and followed by an immediate balance recomputation, so a
//! caller never observes a draft whose summary is out of date.
//!
//! Status moves from `Editing` to `Submittable` once the entry balances and
//! its required fields are filled, and to `Submitted` only through
//! [`EntryComposer::submit`], which refuses unbalanced entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::ComposerSettings;
use crate::error::{ComposerError, ComposerResult};
use crate::models::{
    AccountSuggestion, Analytics, EntryLine, EntryMetadata, EntryTemplate, JournalEntry, LineId,
    Money, Side, SplitLine, Suggestion, SuggestionId, SuggestionPayload, ThirdPartyId,
    VentilationSplit, VentilationSuggestion,
};

use super::balance::{BalanceCalculator, BalanceSummary};
use super::suggestion::SuggestionQueue;

/// Confidence given to lines created from a template
const TEMPLATE_LINE_CONFIDENCE: u8 = 95;

/// Lifecycle of a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Editing,
    Submittable,
    Submitted,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editing => write!(f, "Editing"),
            Self::Submittable => write!(f, "Submittable"),
            Self::Submitted => write!(f, "Submitted"),
        }
    }
}

/// Reason a draft cannot be submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum SubmitIssue {
    /// Debits and credits differ; `balance` is debit minus credit
    Imbalance { balance: Money },
    MissingJournal,
    MissingDescription,
    MissingAccount { line_id: LineId },
    InvalidLine { line_id: LineId, reason: String },
    ZeroAmount,
    AlreadySubmitted,
}

impl fmt::Display for SubmitIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Imbalance { balance } => write!(f, "Entry is not balanced ({})", balance),
            Self::MissingJournal => write!(f, "Journal code is required"),
            Self::MissingDescription => write!(f, "Entry description is required"),
            Self::MissingAccount { line_id } => write!(f, "Line {} has no account", line_id),
            Self::InvalidLine { line_id, reason } => write!(f, "Line {}: {}", line_id, reason),
            Self::ZeroAmount => write!(f, "Entry has no amounts"),
            Self::AlreadySubmitted => write!(f, "Entry was already submitted"),
        }
    }
}

/// Everything preventing submission, for inline display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitBlocked {
    pub issues: Vec<SubmitIssue>,
}

impl SubmitBlocked {
    pub fn is_imbalance(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, SubmitIssue::Imbalance { .. }))
    }
}

impl fmt::Display for SubmitBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for SubmitBlocked {}

/// A single draft mutation
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOperation {
    AddLine,
    RemoveLine(LineId),
    ApplyTemplate(EntryTemplate),
    ApplyAccountSuggestion(Vec<AccountSuggestion>),
    ApplySplitSuggestion(VentilationSuggestion),
    SetAmounts {
        line_id: LineId,
        debit: Money,
        credit: Money,
    },
    SetAccount {
        line_id: LineId,
        account: String,
        description: String,
    },
    SetThirdParty {
        line_id: LineId,
        third_party: Option<ThirdPartyId>,
    },
    SetAnalytics {
        line_id: LineId,
        analytics: Analytics,
    },
    SetSplit {
        line_id: LineId,
        split: Option<VentilationSplit>,
    },
    SetMetadata(EntryMetadata),
}

/// Stateful owner of one draft entry
#[derive(Debug)]
pub struct EntryComposer {
    draft: JournalEntry,
    summary: BalanceSummary,
    submitted: bool,
    suggestions: SuggestionQueue,
    auto_accept: bool,
}

impl Default for EntryComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryComposer {
    /// Start a session on a fresh draft with one empty line
    pub fn new() -> Self {
        Self::from_entry(JournalEntry::default())
    }

    /// Start a session on an existing draft
    pub fn from_entry(draft: JournalEntry) -> Self {
        let draft = JournalEntry::with_lines(draft.metadata, draft.lines);
        let summary = BalanceCalculator::compute(&draft.lines);
        Self {
            draft,
            summary,
            submitted: false,
            suggestions: SuggestionQueue::new(),
            auto_accept: false,
        }
    }

    pub fn with_settings(mut self, settings: &ComposerSettings) -> Self {
        self.auto_accept = settings.auto_accept_suggestions;
        self
    }

    /// Toggle auto-accept of high-confidence suggestions
    pub fn set_auto_accept(&mut self, enabled: bool) {
        self.auto_accept = enabled;
    }

    pub fn draft(&self) -> &JournalEntry {
        &self.draft
    }

    pub fn into_entry(self) -> JournalEntry {
        self.draft
    }

    /// Balance summary as of the last mutation
    pub fn balance(&self) -> &BalanceSummary {
        &self.summary
    }

    pub fn status(&self) -> EntryStatus {
        if self.submitted {
            EntryStatus::Submitted
        } else if self.submit_issues().is_empty() {
            EntryStatus::Submittable
        } else {
            EntryStatus::Editing
        }
    }

    // --- Line collection ---

    /// Append an empty line
    pub fn add_line(&mut self) -> ComposerResult<LineId> {
        self.ensure_editable()?;
        let line = EntryLine::new();
        let id = line.id;
        self.draft.lines.push(line);
        self.recompute();
        Ok(id)
    }

    /// Remove a line; the last remaining line cannot be removed
    pub fn remove_line(&mut self, id: LineId) -> ComposerResult<()> {
        self.ensure_editable()?;
        let index = self
            .draft
            .line_index(id)
            .ok_or_else(|| ComposerError::line_not_found(id.to_string()))?;
        if self.draft.lines.len() == 1 {
            return Err(ComposerError::EmptyEntry);
        }
        self.draft.lines.remove(index);
        self.recompute();
        Ok(())
    }

    // --- Suggestion-driven mutations ---

    /// Replace every line with the template's lines
    ///
    /// Unsaved edits to existing lines are discarded. The surrounding
    /// application is expected to confirm with the user first.
    pub fn apply_template(&mut self, template: &EntryTemplate) -> ComposerResult<()> {
        self.ensure_editable()?;
        if template.structure.lines.is_empty() {
            return Err(ComposerError::Validation(format!(
                "Template '{}' has no lines",
                template.name
            )));
        }

        self.draft.lines = template
            .structure
            .lines
            .iter()
            .map(|line| line.to_entry_line(TEMPLATE_LINE_CONFIDENCE))
            .collect();
        if self.draft.metadata.journal.is_empty() {
            self.draft.metadata.journal = template.journal.clone();
        }

        info!(template = %template.id, lines = self.draft.lines.len(), "template applied");
        self.recompute();
        Ok(())
    }

    /// Assign suggested accounts to existing lines by position
    ///
    /// Returns how many lines were updated. No line is created.
    pub fn apply_account_suggestion(&mut self, accounts: &[AccountSuggestion]) -> ComposerResult<usize> {
        self.ensure_editable()?;
        let mut updated = 0;
        for (line, suggestion) in self.draft.lines.iter_mut().zip(accounts) {
            line.account = suggestion.account.clone();
            line.description = suggestion.description.clone();
            updated += 1;
        }
        self.recompute();
        Ok(updated)
    }

    /// Ventilate the line with the largest movement
    ///
    /// The split total is the line's own debit plus credit while the split
    /// lines carry the suggested amounts unchanged; any difference shows up
    /// as a drift warning.
    pub fn apply_split_suggestion(&mut self, suggestion: &VentilationSuggestion) -> ComposerResult<LineId> {
        self.ensure_editable()?;
        if suggestion.accounts.is_empty() {
            return Err(ComposerError::NotApplicable(
                "Split suggestion has no accounts".into(),
            ));
        }

        let mut target = 0;
        for (index, line) in self.draft.lines.iter().enumerate() {
            // Strictly greater keeps the first of equal lines
            if line.movement() > self.draft.lines[target].movement() {
                target = index;
            }
        }

        let line = &mut self.draft.lines[target];
        let total_amount = line.movement();
        line.split = Some(VentilationSplit::enabled(
            suggestion.method,
            total_amount,
            suggestion
                .accounts
                .iter()
                .map(|a| {
                    SplitLine::new(&a.account, a.amount, a.percentage)
                        .with_description(&a.description)
                })
                .collect(),
        ));
        let id = line.id;

        info!(line = %id, parts = suggestion.accounts.len(), "split applied");
        self.recompute();
        Ok(id)
    }

    // --- Line edits ---

    pub fn set_amounts(&mut self, line_id: LineId, debit: Money, credit: Money) -> ComposerResult<()> {
        self.edit_line(line_id, |line| {
            let mut candidate = line.clone();
            candidate.debit_amount = debit;
            candidate.credit_amount = credit;
            candidate
                .validate()
                .map_err(|e| ComposerError::Validation(e.to_string()))?;
            *line = candidate;
            Ok(())
        })
    }

    pub fn set_account(
        &mut self,
        line_id: LineId,
        account: impl Into<String>,
        description: impl Into<String>,
    ) -> ComposerResult<()> {
        let account = account.into();
        let description = description.into();
        self.edit_line(line_id, move |line| {
            line.account = account;
            line.description = description;
            Ok(())
        })
    }

    pub fn set_third_party(&mut self, line_id: LineId, third_party: Option<ThirdPartyId>) -> ComposerResult<()> {
        self.edit_line(line_id, |line| {
            line.third_party = third_party;
            Ok(())
        })
    }

    pub fn set_analytics(&mut self, line_id: LineId, analytics: Analytics) -> ComposerResult<()> {
        self.edit_line(line_id, move |line| {
            line.analytics = analytics;
            Ok(())
        })
    }

    /// Attach, replace or remove a ventilation
    pub fn set_split(&mut self, line_id: LineId, split: Option<VentilationSplit>) -> ComposerResult<()> {
        self.edit_line(line_id, move |line| {
            line.split = split;
            Ok(())
        })
    }

    pub fn clear_split(&mut self, line_id: LineId) -> ComposerResult<()> {
        self.set_split(line_id, None)
    }

    pub fn set_metadata(&mut self, metadata: EntryMetadata) -> ComposerResult<()> {
        self.ensure_editable()?;
        self.draft.metadata = metadata;
        self.recompute();
        Ok(())
    }

    /// Apply one operation
    pub fn mutate(&mut self, operation: EntryOperation) -> ComposerResult<&JournalEntry> {
        match operation {
            EntryOperation::AddLine => {
                self.add_line()?;
            }
            EntryOperation::RemoveLine(id) => self.remove_line(id)?,
            EntryOperation::ApplyTemplate(template) => self.apply_template(&template)?,
            EntryOperation::ApplyAccountSuggestion(accounts) => {
                self.apply_account_suggestion(&accounts)?;
            }
            EntryOperation::ApplySplitSuggestion(split) => {
                self.apply_split_suggestion(&split)?;
            }
            EntryOperation::SetAmounts {
                line_id,
                debit,
                credit,
            } => self.set_amounts(line_id, debit, credit)?,
            EntryOperation::SetAccount {
                line_id,
                account,
                description,
            } => self.set_account(line_id, account, description)?,
            EntryOperation::SetThirdParty {
                line_id,
                third_party,
            } => self.set_third_party(line_id, third_party)?,
            EntryOperation::SetAnalytics { line_id, analytics } => {
                self.set_analytics(line_id, analytics)?
            }
            EntryOperation::SetSplit { line_id, split } => self.set_split(line_id, split)?,
            EntryOperation::SetMetadata(metadata) => self.set_metadata(metadata)?,
        }
        Ok(&self.draft)
    }

    // --- Suggestions ---

    /// Apply a suggestion's payload to the draft
    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) -> ComposerResult<()> {
        match &suggestion.payload {
            SuggestionPayload::Template { template, .. } => {
                let template = template.as_ref().ok_or_else(|| {
                    ComposerError::NotApplicable("No template matches this description".into())
                })?;
                self.apply_template(template)
            }
            SuggestionPayload::Accounts { accounts } => {
                self.apply_account_suggestion(accounts).map(|_| ())
            }
            SuggestionPayload::Split { split } => self.apply_split_suggestion(split).map(|_| ()),
            SuggestionPayload::Amount { amount } => {
                let first = self.draft.lines[0].id;
                self.set_amounts(first, *amount, Money::zero())
            }
            SuggestionPayload::Vat {
                account,
                description,
                side,
                amount,
                ..
            } => {
                self.ensure_editable()?;
                let line = match side {
                    Side::Debit => EntryLine::debit(account, description, *amount),
                    Side::Credit => EntryLine::credit(account, description, *amount),
                };
                self.draft.lines.push(EntryLine {
                    confidence: suggestion.confidence,
                    ai_suggested: true,
                    ..line
                });
                self.recompute();
                Ok(())
            }
            SuggestionPayload::ThirdParty {
                line_index,
                third_party,
            } => {
                let line_id = self
                    .draft
                    .lines
                    .get(*line_index)
                    .map(|l| l.id)
                    .ok_or_else(|| {
                        ComposerError::NotApplicable(format!("No line at position {}", line_index))
                    })?;
                self.set_third_party(line_id, Some(*third_party))
            }
        }
    }

    /// Receive freshly generated suggestions for `description`
    ///
    /// With auto-accept on, suggestions flagged auto-apply with confidence
    /// above 90 are applied at once and returned; the rest stay pending.
    pub fn offer_suggestions(&mut self, description: &str, suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        self.suggestions.replace(description, suggestions);
        if !self.auto_accept || self.submitted {
            return Vec::new();
        }

        let mut applied = Vec::new();
        for suggestion in self.suggestions.drain_auto_acceptable() {
            match self.apply_suggestion(&suggestion) {
                Ok(()) => {
                    info!(suggestion = %suggestion, "suggestion auto-applied");
                    applied.push(suggestion);
                }
                Err(e) => warn!(suggestion = %suggestion.id, error = %e, "auto-apply skipped"),
            }
        }
        applied
    }

    pub fn pending_suggestions(&self) -> &[Suggestion] {
        self.suggestions.pending()
    }

    /// Apply a pending suggestion and remove it from the list
    ///
    /// A suggestion that fails to apply stays pending.
    pub fn apply_pending(&mut self, id: SuggestionId) -> ComposerResult<()> {
        let suggestion = self
            .suggestions
            .get(id)
            .cloned()
            .ok_or_else(|| ComposerError::suggestion_not_found(id.to_string()))?;
        self.apply_suggestion(&suggestion)?;
        self.suggestions.take(id);
        Ok(())
    }

    /// Dismiss a pending suggestion; a second dismissal is a no-op
    pub fn dismiss_suggestion(&mut self, id: SuggestionId) -> bool {
        self.suggestions.dismiss(id)
    }

    // --- Submission ---

    /// Everything that currently prevents submission
    pub fn submit_issues(&self) -> Vec<SubmitIssue> {
        let mut issues = Vec::new();

        if self.submitted {
            issues.push(SubmitIssue::AlreadySubmitted);
        }
        if !self.summary.is_balanced {
            issues.push(SubmitIssue::Imbalance {
                balance: self.summary.balance,
            });
        }
        if self.draft.metadata.journal.trim().is_empty() {
            issues.push(SubmitIssue::MissingJournal);
        }
        if self.draft.metadata.description.trim().is_empty() {
            issues.push(SubmitIssue::MissingDescription);
        }
        for line in &self.draft.lines {
            if line.account.trim().is_empty() {
                issues.push(SubmitIssue::MissingAccount { line_id: line.id });
            }
            if let Err(e) = line.validate() {
                issues.push(SubmitIssue::InvalidLine {
                    line_id: line.id,
                    reason: e.to_string(),
                });
            }
        }
        if self.summary.total_debit.is_zero() && self.summary.total_credit.is_zero() {
            issues.push(SubmitIssue::ZeroAmount);
        }

        issues
    }

    /// Move the draft to `Submitted`
    ///
    /// Blocked while the entry is unbalanced or incomplete; the draft is
    /// left untouched in that case.
    pub fn submit(&mut self) -> Result<&JournalEntry, SubmitBlocked> {
        let issues = self.submit_issues();
        if !issues.is_empty() {
            debug!(issues = issues.len(), "submission blocked");
            return Err(SubmitBlocked { issues });
        }

        self.submitted = true;
        self.suggestions.clear();
        info!(entry = %self.draft, total = %self.summary.total_debit, "entry submitted");
        Ok(&self.draft)
    }

    // --- Internals ---

    fn ensure_editable(&self) -> ComposerResult<()> {
        if self.submitted {
            return Err(ComposerError::Locked(
                "Submitted entries cannot be edited".into(),
            ));
        }
        Ok(())
    }

    fn edit_line<F>(&mut self, line_id: LineId, edit: F) -> ComposerResult<()>
    where
        F: FnOnce(&mut EntryLine) -> ComposerResult<()>,
    {
        self.ensure_editable()?;
        let line = self
            .draft
            .line_mut(line_id)
            .ok_or_else(|| ComposerError::line_not_found(line_id.to_string()))?;
        edit(line)?;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.summary = BalanceCalculator::compute(&self.draft.lines);
        debug!(
            debit = %self.summary.total_debit,
            credit = %self.summary.total_credit,
            balanced = self.summary.is_balanced,
            "balance recomputed"
        );
    }
}

/// Create a draft, defaulting to a single empty line
pub fn create_draft(initial: Option<JournalEntry>) -> JournalEntry {
    match initial {
        Some(entry) => JournalEntry::with_lines(entry.metadata, entry.lines),
        None => JournalEntry::default(),
    }
}

/// Apply one operation to a draft and return the updated draft
pub fn mutate(draft: JournalEntry, operation: EntryOperation) -> ComposerResult<JournalEntry> {
    let mut composer = EntryComposer::from_entry(draft);
    composer.mutate(operation)?;
    Ok(composer.into_entry())
}
