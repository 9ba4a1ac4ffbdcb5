use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::fetch::{FetchError, MetricFetcher, Transport};
use crate::logging::{log_round, ProfileScope};
use crate::model::{DistributionEntry, InsightsSummary, KpiSet, RadarPoint, TrendPoint, ViewModel};
use crate::store::ViewModelStore;

/// A round in which at least one category failed. Every failure is listed.
#[derive(Debug, Error)]
#[error("aggregation round {round} failed in {} of 5 categories", .failures.len())]
pub struct AggregationError {
    pub round: u64,
    pub failures: Vec<FetchError>,
}

/// Fans out the five bulk fetches and swaps the view only when all succeed.
pub struct AggregationCoordinator<T> {
    fetcher: Arc<MetricFetcher<T>>,
    store: Arc<ViewModelStore>,
}

impl<T: Transport> AggregationCoordinator<T> {
    pub fn new(fetcher: Arc<MetricFetcher<T>>, store: Arc<ViewModelStore>) -> Self {
        Self { fetcher, store }
    }

    /// Run exactly one round. On failure the held view is left as it was.
    pub async fn load_all(&self) -> Result<ViewModel, AggregationError> {
        let round = self.store.rounds().total() + 1;
        let _scope = ProfileScope::with_context("aggregation_round", &[("round", json!(round))]);
        let before = self.store.view().fingerprint();

        // Initiated in this order on first poll; settles in any order.
        let f = &self.fetcher;
        let (kpis, distribution, radar, trend, insights) =
            tokio::join!(f.kpis(), f.distribution(), f.radar(), f.trend(), f.insights());

        match assemble(kpis, distribution, radar, trend, insights) {
            Ok(view) => {
                let after = view.fingerprint();
                self.store.replace_view(view.clone());
                log_round(round, "replaced", &[], &before, &after);
                Ok(view)
            }
            Err(failures) => {
                self.store.record_failed_round();
                let failed: Vec<&str> = failures.iter().map(|e| e.category().path()).collect();
                log_round(round, "retained", &failed, &before, &before);
                Err(AggregationError { round, failures })
            }
        }
    }
}

fn assemble(
    kpis: Result<KpiSet, FetchError>,
    distribution: Result<Vec<DistributionEntry>, FetchError>,
    radar: Result<Vec<RadarPoint>, FetchError>,
    trend: Result<Vec<TrendPoint>, FetchError>,
    insights: Result<InsightsSummary, FetchError>,
) -> Result<ViewModel, Vec<FetchError>> {
    match (kpis, distribution, radar, trend, insights) {
        (Ok(kpis), Ok(distribution), Ok(radar), Ok(trend), Ok(insights)) => Ok(ViewModel {
            kpis,
            distribution,
            radar,
            trend,
            insights,
        }),
        (k, d, r, t, i) => Err([k.err(), d.err(), r.err(), t.err(), i.err()]
            .into_iter()
            .flatten()
            .collect()),
    }
}
