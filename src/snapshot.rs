//! Read-only bundle handed to the presentation layer.

use serde::Serialize;

use crate::model::{ScoreCard, ViewModel};
use crate::report::ReportState;
use crate::store::{RoundStats, ViewModelStore};

pub const GENERATE_LABEL: &str = "Generate Weekly Report";
pub const GENERATING_LABEL: &str = "Generating...";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPanel {
    pub status: &'static str,
    pub title: Option<String>,
    pub highlights: Vec<String>,
    pub error: Option<String>,
    pub button_label: &'static str,
    pub button_enabled: bool,
}

impl ReportPanel {
    pub fn from_state(state: &ReportState, placeholders: &[String]) -> Self {
        let shown = state.shown_report();
        let loading = state.is_loading();
        Self {
            status: state.name(),
            title: shown.map(|r| r.title.clone()),
            highlights: shown
                .map(|r| r.highlights.clone())
                .unwrap_or_else(|| placeholders.to_vec()),
            error: state.error().map(str::to_string),
            button_label: if loading { GENERATING_LABEL } else { GENERATE_LABEL },
            button_enabled: !loading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub view: ViewModel,
    pub score_cards: [ScoreCard; 4],
    pub degraded: bool,
    pub rounds: RoundStats,
    pub report: ReportPanel,
}

impl DashboardSnapshot {
    pub fn capture(store: &ViewModelStore) -> Self {
        let view = (*store.view()).clone();
        Self {
            score_cards: view.score_cards(),
            view,
            degraded: store.is_degraded(),
            rounds: store.rounds(),
            report: ReportPanel::from_state(&store.report_state(), store.placeholder_highlights()),
        }
    }
}
