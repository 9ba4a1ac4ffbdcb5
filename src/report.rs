//! On-demand weekly report, independent of the bulk view.
//!
//! `Idle -> Loading -> Success | Failure`. Terminal states persist until the
//! next trigger. Triggers are serialised through a FIFO gate: each trigger
//! enters `Loading` at once, then waits its turn to issue its own request, so
//! the state that remains always belongs to the latest trigger.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::fetch::{MetricFetcher, Transport};
use crate::logging::{log_report_transition, ProfileScope};
use crate::model::Report;
use crate::store::ViewModelStore;

pub const REPORT_FAILURE_MESSAGE: &str = "Failed to generate report. Check the API.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportState {
    Idle,
    /// `previous` is the report still on display while the new one loads.
    Loading { previous: Option<Report> },
    Success(Report),
    Failure(String),
}

impl ReportState {
    pub fn failure() -> Self {
        ReportState::Failure(REPORT_FAILURE_MESSAGE.to_string())
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReportState::Idle => "idle",
            ReportState::Loading { .. } => "loading",
            ReportState::Success(_) => "success",
            ReportState::Failure(_) => "failure",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ReportState::Loading { .. })
    }

    pub fn shown_report(&self) -> Option<&Report> {
        match self {
            ReportState::Success(report) => Some(report),
            ReportState::Loading { previous } => previous.as_ref(),
            ReportState::Idle | ReportState::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ReportState::Failure(msg) => Some(msg),
            _ => None,
        }
    }
}

pub struct ReportRequester<T> {
    fetcher: Arc<MetricFetcher<T>>,
    store: Arc<ViewModelStore>,
    gate: Mutex<()>,
}

impl<T: Transport> ReportRequester<T> {
    pub fn new(fetcher: Arc<MetricFetcher<T>>, store: Arc<ViewModelStore>) -> Self {
        Self {
            fetcher,
            store,
            gate: Mutex::new(()),
        }
    }

    /// Trigger one report request. `Loading` is entered here, before the
    /// returned future is first polled; the future resolves to the settled state.
    pub fn request_report(&self) -> impl Future<Output = ReportState> + '_ {
        self.begin();
        async move {
            let _turn = self.gate.lock().await;
            // A queued trigger finds its predecessor settled; re-enter Loading.
            if !self.store.report_state().is_loading() {
                self.begin();
            }

            let _scope = ProfileScope::new("report_request");
            let (next, detail) = match self.fetcher.weekly_report().await {
                Ok(report) => (ReportState::Success(report), None),
                Err(err) => (ReportState::failure(), Some(err.to_string())),
            };
            self.store.settle_report(next.clone());
            log_report_transition("loading", next.name(), detail.as_deref());
            next
        }
    }

    fn begin(&self) {
        let left = self.store.enter_loading();
        if !left.is_loading() {
            log_report_transition(left.name(), "loading", None);
        }
    }
}
