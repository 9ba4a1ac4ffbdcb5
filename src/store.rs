//! Single source of truth for the presentation layer.
//!
//! Readers get whole values; writers live in this crate and only touch a slot
//! at a settlement point, never across an await.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::fallback::FallbackDataset;
use crate::model::ViewModel;
use crate::report::ReportState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundStats {
    pub succeeded: u64,
    pub failed: u64,
}

impl RoundStats {
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }
}

#[derive(Debug)]
struct ViewSlot {
    current: Arc<ViewModel>,
    /// Set by a failed round, cleared by a successful one. Never touches `current`.
    degraded: bool,
    rounds: RoundStats,
}

#[derive(Debug)]
pub struct ViewModelStore {
    view: Mutex<ViewSlot>,
    report: Mutex<ReportState>,
    placeholder_highlights: Vec<String>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ViewModelStore {
    pub fn new(fallback: &FallbackDataset) -> Self {
        Self {
            view: Mutex::new(ViewSlot {
                current: Arc::new(fallback.view.clone()),
                degraded: false,
                rounds: RoundStats::default(),
            }),
            report: Mutex::new(ReportState::Idle),
            placeholder_highlights: fallback.placeholder_highlights.clone(),
        }
    }

    pub fn view(&self) -> Arc<ViewModel> {
        Arc::clone(&guard(&self.view).current)
    }

    pub fn is_degraded(&self) -> bool {
        guard(&self.view).degraded
    }

    pub fn rounds(&self) -> RoundStats {
        guard(&self.view).rounds
    }

    pub fn report_state(&self) -> ReportState {
        guard(&self.report).clone()
    }

    pub fn placeholder_highlights(&self) -> &[String] {
        &self.placeholder_highlights
    }

    /// Highlights to display: the current report's, else the placeholders.
    pub fn highlights(&self) -> Vec<String> {
        match self.report_state().shown_report() {
            Some(report) => report.highlights.clone(),
            None => self.placeholder_highlights.clone(),
        }
    }

    /// Swap in a complete view in one step. Returns the view it replaced.
    pub(crate) fn replace_view(&self, next: ViewModel) -> Arc<ViewModel> {
        let mut slot = guard(&self.view);
        slot.degraded = false;
        slot.rounds.succeeded += 1;
        std::mem::replace(&mut slot.current, Arc::new(next))
    }

    pub(crate) fn record_failed_round(&self) {
        let mut slot = guard(&self.view);
        slot.degraded = true;
        slot.rounds.failed += 1;
    }

    /// Move the report machine into `Loading`, keeping a shown report visible.
    /// Returns the state it left.
    pub(crate) fn enter_loading(&self) -> ReportState {
        let mut state = guard(&self.report);
        let previous = state.shown_report().cloned();
        std::mem::replace(&mut *state, ReportState::Loading { previous })
    }

    pub(crate) fn settle_report(&self, next: ReportState) -> ReportState {
        std::mem::replace(&mut *guard(&self.report), next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Report;

    fn store() -> ViewModelStore {
        ViewModelStore::new(&FallbackDataset::standard())
    }

    #[test]
    fn test_starts_from_fallback() {
        let s = store();
        assert_eq!(*s.view(), FallbackDataset::standard().view);
        assert!(!s.is_degraded());
        assert_eq!(s.rounds().total(), 0);
        assert_eq!(s.report_state(), ReportState::Idle);
        assert_eq!(s.highlights(), FallbackDataset::standard().placeholder_highlights);
    }

    #[test]
    fn test_failed_round_keeps_view_and_flags() {
        let s = store();
        let before = s.view();
        s.record_failed_round();
        assert_eq!(s.view(), before);
        assert!(s.is_degraded());

        let mut next = (*before).clone();
        next.insights.unique_labels = 40;
        s.replace_view(next.clone());
        assert_eq!(*s.view(), next);
        assert!(!s.is_degraded());
        assert_eq!(s.rounds(), RoundStats { succeeded: 1, failed: 1 });
    }

    #[test]
    fn test_loading_keeps_previous_report_visible() {
        let s = store();
        let report = Report {
            title: "W1".to_string(),
            highlights: vec!["x".to_string()],
        };
        s.settle_report(ReportState::Success(report.clone()));
        s.enter_loading();
        assert_eq!(
            s.report_state(),
            ReportState::Loading {
                previous: Some(report)
            }
        );
        assert_eq!(s.highlights(), vec!["x".to_string()]);
    }

    #[test]
    fn test_loading_after_failure_shows_placeholders() {
        let s = store();
        s.settle_report(ReportState::failure());
        s.enter_loading();
        assert_eq!(s.report_state(), ReportState::Loading { previous: None });
        assert_eq!(s.highlights().len(), 4);
    }
}
