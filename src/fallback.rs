//! Static dataset shown before, or instead of, a successful aggregation round.

use crate::model::{
    DistributionEntry, InsightsSummary, KpiSet, LabelCount, RadarPoint, TrendPoint, ViewModel,
};

/// Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDataset {
    pub view: ViewModel,
    /// Shown in the report panel until a report has been generated.
    pub placeholder_highlights: Vec<String>,
}

impl FallbackDataset {
    pub fn standard() -> Self {
        Self {
            view: ViewModel {
                kpis: KpiSet {
                    precision: 0.818,
                    recall: 0.888,
                    f1: 0.851,
                    accuracy: 0.842,
                },
                distribution: vec![
                    share("NLP", 36.0),
                    share("CV", 24.0),
                    share("Robotics", 12.0),
                    share("Bioinformatics", 18.0),
                    share("Security", 10.0),
                ],
                radar: vec![
                    axis("Precision", 0.82),
                    axis("Recall", 0.89),
                    axis("F1", 0.85),
                    axis("Coverage", 0.78),
                    axis("Drift", 0.18),
                ],
                trend: vec![
                    month("Jan", 62.0),
                    month("Feb", 68.0),
                    month("Mar", 74.0),
                    month("Apr", 71.0),
                    month("May", 79.0),
                    month("Jun", 85.0),
                ],
                insights: InsightsSummary {
                    total_records: 10_000,
                    unique_labels: 12,
                    top_labels: vec![
                        labeled("cs.AI", 2100),
                        labeled("cs.LG", 1800),
                        labeled("cs.CL", 1600),
                    ],
                    top_terms_global: ["model", "learning", "neural", "network", "data", "training"]
                        .iter()
                        .map(|t| t.to_string())
                        .collect(),
                },
            },
            placeholder_highlights: vec![
                "Data QA flagged 1.8% noisy abstracts for review.".to_string(),
                "Emerging growth: Bioinformatics +18% in the last 30 days.".to_string(),
                "Precision improved after rebalancing minority classes.".to_string(),
                "Suggested action: fine-tune with SciBERT embeddings.".to_string(),
            ],
        }
    }
}

impl Default for FallbackDataset {
    fn default() -> Self {
        Self::standard()
    }
}

fn share(label: &str, value: f64) -> DistributionEntry {
    DistributionEntry {
        label: label.to_string(),
        value,
    }
}

fn axis(metric: &str, value: f64) -> RadarPoint {
    RadarPoint {
        metric: metric.to_string(),
        value,
    }
}

fn month(month: &str, value: f64) -> TrendPoint {
    TrendPoint {
        month: month.to_string(),
        value,
    }
}

fn labeled(label: &str, count: u64) -> LabelCount {
    LabelCount {
        label: label.to_string(),
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_fully_populated() {
        let fallback = FallbackDataset::standard();
        assert!(fallback.view.is_populated());
        assert_eq!(fallback.placeholder_highlights.len(), 4);
    }

    #[test]
    fn test_fallback_ratios_in_unit_range() {
        let view = FallbackDataset::standard().view;
        let k = view.kpis;
        for v in [k.precision, k.recall, k.f1, k.accuracy] {
            assert!((0.0..=1.0).contains(&v));
        }
        assert!(view.radar.iter().all(|p| (0.0..=1.0).contains(&p.value)));
    }

    #[test]
    fn test_fallback_distribution_sums_to_percent() {
        let total: f64 = FallbackDataset::standard()
            .view
            .distribution
            .iter()
            .map(|d| d.value)
            .sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_top_labels_count_descending() {
        let labels = FallbackDataset::standard().view.insights.top_labels;
        assert!(labels.windows(2).all(|w| w[0].count >= w[1].count));
    }
}
