//! Debounced, last-request-wins description analysis
//!
//! Analysis is the only asynchronous step of the engine. Every request takes
//! a ticket from a generation counter; a result whose ticket is no longer the
//! newest is discarded on arrival instead of overwriting a newer analysis.
//! Failures are fail-open: the caller simply gets no suggestions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::ComposerSettings;
use crate::error::ComposerResult;
use crate::models::{ContextAnalysis, TransactionType};

/// Something that can turn a description into a context analysis
///
/// The keyword classifier answers immediately; a remote classifier can be
/// swapped in without changing the cancellation semantics.
#[async_trait]
pub trait ContextAnalyzer: Send + Sync {
    async fn analyze(&self, description: &str) -> ComposerResult<ContextAnalysis>;
}

/// Identity of an analysis request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisKey {
    pub description: String,
    pub transaction_type: Option<TransactionType>,
}

/// Generation number handed out per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AnalysisTicket(u64);

/// Result of one analysis request
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The newest analysis; replace the current one with it
    Fresh(ContextAnalysis),
    /// Superseded by a newer request or cancelled; ignore
    Stale,
    /// Description too short to analyze
    Skipped,
    /// The analyzer failed; show no suggestions
    Failed(String),
}

impl AnalysisOutcome {
    pub fn into_analysis(self) -> Option<ContextAnalysis> {
        match self {
            Self::Fresh(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// Schedules analyses so that only the latest request wins
pub struct AnalysisScheduler<A> {
    analyzer: A,
    debounce: Duration,
    min_description_length: usize,
    generation: AtomicU64,
    last: Mutex<Option<(AnalysisKey, ContextAnalysis)>>,
}

impl<A: ContextAnalyzer> AnalysisScheduler<A> {
    pub fn new(analyzer: A, debounce: Duration) -> Self {
        Self {
            analyzer,
            debounce,
            min_description_length: 10,
            generation: AtomicU64::new(0),
            last: Mutex::new(None),
        }
    }

    /// Build a scheduler from engine settings
    pub fn from_settings(analyzer: A, settings: &ComposerSettings) -> Self {
        let mut scheduler = Self::new(analyzer, settings.debounce());
        scheduler.min_description_length = settings.min_description_length;
        scheduler
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Take a new ticket, making every earlier one stale
    pub fn begin(&self) -> AnalysisTicket {
        AnalysisTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: AnalysisTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Invalidate every in-flight request
    pub fn cancel(&self) {
        let ticket = self.begin();
        debug!(generation = ticket.0, "analysis cancelled");
    }

    /// Analyze a description, honoring debounce and last-request-wins
    pub async fn request(
        &self,
        description: &str,
        transaction_type: Option<TransactionType>,
    ) -> AnalysisOutcome {
        let ticket = self.begin();
        let key = AnalysisKey {
            description: description.to_string(),
            transaction_type,
        };

        if description.trim().chars().count() <= self.min_description_length {
            return AnalysisOutcome::Skipped;
        }

        if let Some((last_key, analysis)) = self.last.lock().await.as_ref() {
            if *last_key == key {
                return AnalysisOutcome::Fresh(analysis.clone());
            }
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if !self.is_current(ticket) {
            debug!(generation = ticket.0, "analysis superseded during debounce");
            return AnalysisOutcome::Stale;
        }

        let result = self.analyzer.analyze(&key.description).await;

        if !self.is_current(ticket) {
            debug!(generation = ticket.0, "stale analysis discarded");
            return AnalysisOutcome::Stale;
        }

        match result {
            Ok(analysis) => {
                *self.last.lock().await = Some((key, analysis.clone()));
                AnalysisOutcome::Fresh(analysis)
            }
            Err(e) => {
                warn!(error = %e, "analysis failed, no suggestions offered");
                AnalysisOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComposerError;
    use std::sync::atomic::AtomicUsize;

    /// Analyzer that takes longer for descriptions containing "lent"
    struct DelayedAnalyzer {
        calls: AtomicUsize,
    }

    impl DelayedAnalyzer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContextAnalyzer for DelayedAnalyzer {
        async fn analyze(&self, description: &str) -> ComposerResult<ContextAnalysis> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if description.contains("lent") {
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            if description.contains("erreur") {
                return Err(ComposerError::Analysis("classifier unavailable".into()));
            }
            Ok(ContextAnalysis {
                confidence: description.len().min(100) as u8,
                ..ContextAnalysis::default()
            })
        }
    }

    #[tokio::test]
    async fn test_slow_result_is_discarded() {
        let scheduler = AnalysisScheduler::new(DelayedAnalyzer::new(), Duration::ZERO);

        let slow = scheduler.request("description lente 1", None);
        let fast = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            scheduler.request("description rapide 2", None).await
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert!(slow.is_stale());
        assert_eq!(fast.into_analysis().unwrap().confidence, 20);
    }

    #[tokio::test]
    async fn test_debounce_drops_superseded_request() {
        let scheduler = AnalysisScheduler::new(DelayedAnalyzer::new(), Duration::from_millis(50));

        let first = scheduler.request("facture achat 1000", None);
        let second = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            scheduler.request("facture vente 2000", None).await
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_stale());
        assert!(matches!(second, AnalysisOutcome::Fresh(_)));
        // The superseded request never reached the analyzer
        assert_eq!(scheduler.analyzer().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_invalidates_in_flight() {
        let scheduler = AnalysisScheduler::new(DelayedAnalyzer::new(), Duration::ZERO);

        let request = scheduler.request("description lente", None);
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            scheduler.cancel();
        };
        let (outcome, ()) = tokio::join!(request, cancel);
        assert!(outcome.is_stale());
    }

    #[tokio::test]
    async fn test_failure_is_fail_open() {
        let scheduler = AnalysisScheduler::new(DelayedAnalyzer::new(), Duration::ZERO);
        let outcome = scheduler.request("une erreur de classement", None).await;
        assert!(matches!(outcome, AnalysisOutcome::Failed(_)));
        assert!(outcome.into_analysis().is_none());
    }

    #[tokio::test]
    async fn test_short_description_skipped() {
        let scheduler = AnalysisScheduler::new(DelayedAnalyzer::new(), Duration::ZERO);
        assert_eq!(scheduler.request("achat", None).await, AnalysisOutcome::Skipped);
        assert_eq!(scheduler.analyzer().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_same_key_reuses_last_result() {
        let scheduler = AnalysisScheduler::new(DelayedAnalyzer::new(), Duration::ZERO);

        let a = scheduler.request("facture achat 50000", None).await;
        let b = scheduler.request("facture achat 50000", None).await;
        assert_eq!(a, b);
        assert_eq!(scheduler.analyzer().calls.load(Ordering::SeqCst), 1);

        // A different transaction type is a different request
        scheduler
            .request("facture achat 50000", Some(TransactionType::PurchaseInvoice))
            .await;
        assert_eq!(scheduler.analyzer().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_tickets_supersede_each_other() {
        let scheduler = AnalysisScheduler::new(DelayedAnalyzer::new(), Duration::ZERO);
        let first = scheduler.begin();
        assert!(scheduler.is_current(first));
        let second = scheduler.begin();
        assert!(!scheduler.is_current(first));
        assert!(scheduler.is_current(second));
        assert!(second > first);
    }
}
