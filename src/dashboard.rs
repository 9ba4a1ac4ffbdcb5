use std::future::Future;
use std::sync::Arc;

use crate::config::Config;
use crate::coordinator::{AggregationCoordinator, AggregationError};
use crate::fetch::http::HttpTransport;
use crate::fetch::{MetricFetcher, Transport};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::model::ViewModel;
use crate::report::{ReportRequester, ReportState};
use crate::snapshot::DashboardSnapshot;
use crate::store::ViewModelStore;

/// Wires one transport to the store, the coordinator and the report requester.
///
/// Outward mutation is limited to the two triggers; everything else reads.
pub struct Dashboard<T> {
    store: Arc<ViewModelStore>,
    coordinator: AggregationCoordinator<T>,
    reports: ReportRequester<T>,
    fetcher: Arc<MetricFetcher<T>>,
}

impl Dashboard<HttpTransport> {
    pub fn connect(cfg: &Config) -> Self {
        log(
            Level::Info,
            Domain::System,
            "dashboard_init",
            obj(&[("api_base", v_str(cfg.api_base.as_str()))]),
        );
        Self::with_transport(cfg, HttpTransport::new(cfg))
    }
}

impl<T: Transport> Dashboard<T> {
    pub fn with_transport(cfg: &Config, transport: T) -> Self {
        let store = Arc::new(ViewModelStore::new(&cfg.fallback));
        let fetcher = Arc::new(MetricFetcher::new(transport));
        Self {
            coordinator: AggregationCoordinator::new(Arc::clone(&fetcher), Arc::clone(&store)),
            reports: ReportRequester::new(Arc::clone(&fetcher), Arc::clone(&store)),
            store,
            fetcher,
        }
    }

    pub async fn load_all(&self) -> Result<ViewModel, AggregationError> {
        self.coordinator.load_all().await
    }

    /// Enters `Loading` immediately; await the future for the settled state.
    pub fn request_report(&self) -> impl Future<Output = ReportState> + '_ {
        self.reports.request_report()
    }

    pub fn view(&self) -> Arc<ViewModel> {
        self.store.view()
    }

    pub fn report_state(&self) -> ReportState {
        self.store.report_state()
    }

    pub fn highlights(&self) -> Vec<String> {
        self.store.highlights()
    }

    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::capture(&self.store)
    }

    pub fn transport(&self) -> &T {
        self.fetcher.transport()
    }
}
