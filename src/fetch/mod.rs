use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use thiserror::Error;

use crate::logging::log_fetch_failure;
use crate::model::{DistributionEntry, InsightsSummary, KpiSet, RadarPoint, Report, TrendPoint};

pub mod http;
pub mod stub;

/// One endpoint of the analytics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Kpis,
    Distribution,
    Radar,
    Trend,
    Insights,
    WeeklyReport,
}

impl Category {
    /// The five bulk categories, in the order a round initiates them.
    pub const BULK: [Category; 5] = [
        Category::Kpis,
        Category::Distribution,
        Category::Radar,
        Category::Trend,
        Category::Insights,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Category::Kpis => "/kpis",
            Category::Distribution => "/entity-distribution",
            Category::Radar => "/radar-metrics",
            Category::Trend => "/trend-series",
            Category::Insights => "/insights",
            Category::WeeklyReport => "/weekly-report",
        }
    }

    /// Path relative to the API base.
    pub fn relative(&self) -> &'static str {
        &self.path()[1..]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Decode => "decode",
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{category}: request did not complete: {detail}")]
    Transport { category: Category, detail: String },
    #[error("{category}: server answered HTTP {status}")]
    Status { category: Category, status: u16 },
    #[error("{category}: body does not match expected shape: {source}")]
    Decode {
        category: Category,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// A non-2xx status yields no usable body, so it counts as transport.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport { .. } | FetchError::Status { .. } => ErrorKind::Transport,
            FetchError::Decode { .. } => ErrorKind::Decode,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            FetchError::Transport { category, .. }
            | FetchError::Status { category, .. }
            | FetchError::Decode { category, .. } => *category,
        }
    }
}

/// Raw body retrieval for one category. Implementations do not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, category: Category) -> Result<Vec<u8>, FetchError>;
}

/// Retrieves and decodes one category per call.
pub struct MetricFetcher<T> {
    transport: T,
}

impl<T: Transport> MetricFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn kpis(&self) -> Result<KpiSet, FetchError> {
        self.fetch(Category::Kpis).await
    }

    pub async fn distribution(&self) -> Result<Vec<DistributionEntry>, FetchError> {
        self.fetch(Category::Distribution).await
    }

    pub async fn radar(&self) -> Result<Vec<RadarPoint>, FetchError> {
        self.fetch(Category::Radar).await
    }

    pub async fn trend(&self) -> Result<Vec<TrendPoint>, FetchError> {
        self.fetch(Category::Trend).await
    }

    pub async fn insights(&self) -> Result<InsightsSummary, FetchError> {
        self.fetch(Category::Insights).await
    }

    pub async fn weekly_report(&self) -> Result<Report, FetchError> {
        self.fetch(Category::WeeklyReport).await
    }

    async fn fetch<V: DeserializeOwned>(&self, category: Category) -> Result<V, FetchError> {
        let result = match self.transport.get(category).await {
            Ok(body) => serde_json::from_slice(&body)
                .map_err(|source| FetchError::Decode { category, source }),
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            log_fetch_failure(category.path(), err.kind().as_str(), &err.to_string());
        }
        result
    }
}
