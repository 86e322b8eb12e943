//! Metric dispatch table and Y-axis scaling.
//!
//! Each [`Metric`] maps to a [`MetricSpec`] holding how to read the value
//! from bucket totals, how to format it, and which axis policy scales it.
//! Adding a metric means adding a row here.

use campaign_core::format;
use campaign_core::types::Metric;
use serde::{Deserialize, Serialize};

use crate::aggregate::VariantTotals;

/// How a metric's Y axis is scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisPolicy {
    /// Zero-based axis rounded up to a multiple of `step_multiple`, split
    /// into `intervals` equal steps.
    Currency { step_multiple: f64, intervals: usize },
    /// Padded percentage axis snapped to half points.
    Rate,
}

pub struct MetricSpec {
    pub metric: Metric,
    pub label: &'static str,
    pub accessor: fn(&VariantTotals) -> f64,
    pub formatter: fn(f64) -> String,
    pub tick_formatter: fn(f64) -> String,
    pub axis: AxisPolicy,
}

static METRICS: [MetricSpec; 3] = [
    MetricSpec {
        metric: Metric::Ctr,
        label: "CTR",
        accessor: VariantTotals::ctr,
        formatter: format::percent,
        tick_formatter: format::compact_percent,
        axis: AxisPolicy::Rate,
    },
    MetricSpec {
        metric: Metric::ConversionRate,
        label: "Conversion rate",
        accessor: VariantTotals::conversion_rate,
        formatter: format::percent,
        tick_formatter: format::compact_percent,
        axis: AxisPolicy::Rate,
    },
    MetricSpec {
        metric: Metric::Revenue,
        label: "Revenue",
        accessor: revenue,
        formatter: format::currency_eur,
        tick_formatter: format::compact_currency_eur,
        axis: AxisPolicy::Currency {
            step_multiple: 5_000.0,
            intervals: 5,
        },
    },
];

fn revenue(totals: &VariantTotals) -> f64 {
    totals.revenue
}

pub fn spec(metric: Metric) -> &'static MetricSpec {
    match metric {
        Metric::Ctr => &METRICS[0],
        Metric::ConversionRate => &METRICS[1],
        Metric::Revenue => &METRICS[2],
    }
}

impl MetricSpec {
    pub fn value(&self, totals: &VariantTotals) -> f64 {
        (self.accessor)(totals)
    }

    pub fn format(&self, value: f64) -> String {
        (self.formatter)(value)
    }

    /// Axis covering `values`, or `None` when there is nothing to plot.
    pub fn axis_for(&self, values: &[f64]) -> Option<AxisScale> {
        if values.is_empty() {
            return None;
        }
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        Some(match self.axis {
            AxisPolicy::Currency {
                step_multiple,
                intervals,
            } => currency_axis(max, step_multiple, intervals),
            AxisPolicy::Rate => rate_axis(min, max),
        })
    }

    pub fn tick_labels(&self, axis: &AxisScale) -> Vec<String> {
        axis.ticks.iter().map(|t| (self.tick_formatter)(*t)).collect()
    }
}

/// Y-axis domain and tick positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<f64>,
}

fn currency_axis(observed_max: f64, step_multiple: f64, intervals: usize) -> AxisScale {
    let max = ((observed_max.max(0.0) / step_multiple).ceil() * step_multiple).max(step_multiple);
    let step = max / intervals as f64;
    AxisScale {
        min: 0.0,
        max,
        ticks: (0..=intervals).map(|i| step * i as f64).collect(),
    }
}

const RATE_HEADROOM: f64 = 1.2;
const RATE_FLOOR: f64 = 0.8;
const HALF: f64 = 0.5;
const MIN_RATE_INTERVALS: usize = 5;
const MAX_RATE_INTERVALS: usize = 7;

fn ceil_half(v: f64) -> f64 {
    (v / HALF).ceil() * HALF
}

fn floor_half(v: f64) -> f64 {
    (v / HALF).floor() * HALF
}

fn round_half(v: f64) -> f64 {
    (v / HALF).round() * HALF
}

/// Rate axis with 5 to 7 intervals of a half-point step. `max` is the last
/// tick, which can sit above the padded maximum when intervals are added to
/// reach the minimum count. Every quantity is a multiple of 0.5, so the
/// divisions are exact.
fn rate_axis(observed_min: f64, observed_max: f64) -> AxisScale {
    let hi = ceil_half(observed_max.max(0.0) * RATE_HEADROOM);
    let lo = floor_half(observed_min * RATE_FLOOR).max(0.0);
    let range = (hi - lo).max(HALF);

    let mut step = round_half(range / 6.0).max(HALF);
    while (range / step).ceil() as usize > MAX_RATE_INTERVALS {
        step += HALF;
    }
    let intervals = ((range / step).ceil() as usize).max(MIN_RATE_INTERVALS);
    let ticks: Vec<f64> = (0..=intervals).map(|i| lo + step * i as f64).collect();

    AxisScale {
        min: lo,
        max: lo + step * intervals as f64,
        ticks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_revenue_axis_example() {
        let axis = spec(Metric::Revenue).axis_for(&[1_200.0, 18_230.75]).unwrap();
        assert_eq!(axis.max, 20_000.0);
        assert_eq!(
            axis.ticks,
            vec![0.0, 4_000.0, 8_000.0, 12_000.0, 16_000.0, 20_000.0]
        );
        assert_eq!(
            spec(Metric::Revenue).tick_labels(&axis),
            vec!["€0", "€4K", "€8K", "€12K", "€16K", "€20K"]
        );
    }

    #[test]
    fn test_revenue_axis_on_exact_multiple_and_zero() {
        let axis = spec(Metric::Revenue).axis_for(&[15_000.0]).unwrap();
        assert_eq!(axis.max, 15_000.0);
        let axis = spec(Metric::Revenue).axis_for(&[0.0]).unwrap();
        assert_eq!(axis.max, 5_000.0);
        assert_eq!(axis.ticks.len(), 6);
    }

    #[test]
    fn test_rate_axis_known_values() {
        let axis = spec(Metric::Ctr).axis_for(&[2.6, 3.4]).unwrap();
        // hi = ceil_half(4.08) = 4.5, lo = floor_half(2.08) = 2.0
        assert_eq!(axis.min, 2.0);
        assert_eq!(axis.ticks, vec![2.0, 2.5, 3.0, 3.5, 4.0, 4.5]);
        assert_eq!(axis.max, 4.5);
    }

    #[test]
    fn test_narrow_rate_range_pads_to_five_intervals() {
        let axis = spec(Metric::ConversionRate).axis_for(&[2.0, 2.5]).unwrap();
        // hi = ceil_half(3.0) = 3.0, lo = floor_half(1.6) = 1.5
        assert_eq!(axis.min, 1.5);
        assert_eq!(axis.ticks, vec![1.5, 2.0, 2.5, 3.0, 3.5, 4.0]);
        assert_eq!(axis.max, 4.0);
    }

    #[test]
    fn test_rate_axis_headroom_property() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let n = rng.gen_range(1..24);
            let values: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..40.0)).collect();
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);

            for metric in [Metric::Ctr, Metric::ConversionRate] {
                let axis = spec(metric).axis_for(&values).unwrap();
                let top = *axis.ticks.last().unwrap();
                assert!(top >= RATE_HEADROOM * max - 1e-9, "{values:?} -> {axis:?}");
                assert!(axis.min >= 0.0 && axis.min <= min);
                assert!((6..=8).contains(&axis.ticks.len()), "{axis:?}");
                assert_eq!(top, axis.max);
                let step = axis.ticks[1] - axis.ticks[0];
                assert_eq!((step / HALF).fract(), 0.0);
            }
        }
    }

    #[test]
    fn test_revenue_axis_property() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let values: Vec<f64> = (0..12).map(|_| rng.gen_range(0.0..250_000.0)).collect();
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let axis = spec(Metric::Revenue).axis_for(&values).unwrap();
            assert!(axis.max >= max);
            assert_eq!(axis.max % 5_000.0, 0.0);
            assert_eq!(axis.ticks.len(), 6);
        }
    }

    #[test]
    fn test_all_zero_rates() {
        let axis = spec(Metric::ConversionRate).axis_for(&[0.0, 0.0]).unwrap();
        assert_eq!(axis.min, 0.0);
        assert_eq!(axis.ticks, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
    }

    #[test]
    fn test_empty_values_have_no_axis() {
        for metric in Metric::ALL {
            assert!(spec(metric).axis_for(&[]).is_none());
        }
    }

    #[test]
    fn test_dispatch_table_rows_match_metric() {
        for metric in Metric::ALL {
            assert_eq!(spec(metric).metric, metric);
        }
        let totals = VariantTotals {
            impressions: 1_000,
            clicks: 40,
            conversions: 2,
            revenue: 180.5,
        };
        assert_eq!(spec(Metric::Ctr).format(spec(Metric::Ctr).value(&totals)), "4.0%");
        assert_eq!(
            spec(Metric::ConversionRate).format(spec(Metric::ConversionRate).value(&totals)),
            "5.0%"
        );
        assert_eq!(
            spec(Metric::Revenue).format(spec(Metric::Revenue).value(&totals)),
            "€181"
        );
    }
}
