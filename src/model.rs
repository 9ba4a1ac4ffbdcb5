//! Value records shared by the fetcher, the store and the presentation layer.
//!
//! Every type here decodes straight from the analytics API's JSON bodies.
//! Decoding is strict about shape (missing fields and wrong types fail) and
//! never reorders sequences.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Classifier quality snapshot. Each field is a ratio in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
}

/// One domain's share of the corpus, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub label: String,
    pub value: f64,
}

/// One axis of the performance profile. Order is vertex order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPoint {
    pub metric: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

/// What the corpus is about: size, label cardinality, dominant labels and terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub total_records: u64,
    pub unique_labels: u64,
    /// Count descending, as served.
    pub top_labels: Vec<LabelCount>,
    pub top_terms_global: Vec<String>,
}

/// Narrative report produced on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub highlights: Vec<String>,
}

/// The bulk view: replaced as a whole, never field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub kpis: KpiSet,
    pub distribution: Vec<DistributionEntry>,
    pub radar: Vec<RadarPoint>,
    pub trend: Vec<TrendPoint>,
    pub insights: InsightsSummary,
}

/// Headline card derived from the KPI set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub title: &'static str,
    pub value: f64,
    pub subtitle: &'static str,
}

impl ViewModel {
    /// Cards in display order: precision, recall, F1, accuracy.
    pub fn score_cards(&self) -> [ScoreCard; 4] {
        let k = &self.kpis;
        [
            ScoreCard {
                title: "Precision",
                value: k.precision,
                subtitle: "Model accuracy",
            },
            ScoreCard {
                title: "Recall",
                value: k.recall,
                subtitle: "Coverage",
            },
            ScoreCard {
                title: "F1-Score",
                value: k.f1,
                subtitle: "Harmonic mean",
            },
            ScoreCard {
                title: "Accuracy",
                value: k.accuracy,
                subtitle: "Overall quality",
            },
        ]
    }

    /// True when every category carries data.
    pub fn is_populated(&self) -> bool {
        !self.distribution.is_empty()
            && !self.radar.is_empty()
            && !self.trend.is_empty()
            && !self.insights.top_labels.is_empty()
            && !self.insights.top_terms_global.is_empty()
    }

    /// SHA-256 over the canonical JSON encoding, hex encoded.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}
