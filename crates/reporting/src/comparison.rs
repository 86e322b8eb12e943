//! "Best version" badges and target tracking.

use campaign_core::config::TargetsConfig;
use campaign_core::types::{CampaignVariants, Metric, Variant, VariantMetrics, WinnerPolicy};
use serde::{Deserialize, Serialize};

/// Winning variant per headline metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestVariants {
    pub ctr: Variant,
    pub conversion_rate: Variant,
    pub revenue: Variant,
}

impl BestVariants {
    pub fn for_metric(&self, metric: Metric) -> Variant {
        match metric {
            Metric::Ctr => self.ctr,
            Metric::ConversionRate => self.conversion_rate,
            Metric::Revenue => self.revenue,
        }
    }
}

/// Decide the badge for each metric under `policy`. Computed ties go to A.
pub fn best_variants(variants: &CampaignVariants, policy: WinnerPolicy) -> BestVariants {
    match policy {
        WinnerPolicy::Fixed(v) => BestVariants {
            ctr: v,
            conversion_rate: v,
            revenue: v,
        },
        WinnerPolicy::Computed => {
            let pick = |f: fn(&VariantMetrics) -> f64| {
                if f(&variants.b) > f(&variants.a) {
                    Variant::B
                } else {
                    Variant::A
                }
            };
            BestVariants {
                ctr: pick(|m: &VariantMetrics| m.click_through_rate),
                conversion_rate: pick(|m: &VariantMetrics| m.conversion_rate),
                revenue: pick(|m: &VariantMetrics| m.revenue),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Met,
    Missed,
}

/// Progress of one metric towards its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetProgress {
    pub actual: f64,
    pub target: f64,
    pub status: TargetStatus,
    /// `min(actual / target × 100, 100)`.
    pub percent: f64,
}

impl TargetProgress {
    pub fn new(actual: f64, target: f64) -> Self {
        let status = if actual >= target {
            TargetStatus::Met
        } else {
            TargetStatus::Missed
        };
        let percent = if target > 0.0 {
            (actual / target * 100.0).min(100.0)
        } else {
            0.0
        };
        Self {
            actual,
            target,
            status,
            percent,
        }
    }
}

/// One variant's numbers checked against the configured targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub ctr: TargetProgress,
    pub conversion_rate: TargetProgress,
    pub revenue: TargetProgress,
}

impl PerformanceSnapshot {
    pub fn new(metrics: &VariantMetrics, targets: &TargetsConfig) -> Self {
        Self {
            ctr: TargetProgress::new(metrics.click_through_rate, targets.ctr),
            conversion_rate: TargetProgress::new(metrics.conversion_rate, targets.conversion_rate),
            revenue: TargetProgress::new(metrics.revenue, targets.revenue),
        }
    }

    /// Whether the "Improve" action should be offered.
    pub fn has_unmet_targets(&self) -> bool {
        [self.ctr, self.conversion_rate, self.revenue]
            .iter()
            .any(|p| p.status == TargetStatus::Missed)
    }
}
