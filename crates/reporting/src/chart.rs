//! A/B comparison bar chart view model.
//!
//! Turns aggregated buckets into rows, an axis and tooltip text for the
//! selected metric. Toggling a variant's visibility rebuilds the view from
//! the same buckets without regenerating data.

use campaign_core::config::SampleProfile;
use campaign_core::format;
use campaign_core::types::{DateRange, Granularity, Metric, Variant};
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{aggregate, AggregatedBucket};
use crate::metric::{spec, AxisScale};
use crate::samples::generate_samples;

pub const EMPTY_MESSAGE: &str = "No data for the selected range.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantVisibility {
    pub a: bool,
    pub b: bool,
}

impl Default for VariantVisibility {
    fn default() -> Self {
        Self { a: true, b: true }
    }
}

impl VariantVisibility {
    pub fn is_visible(&self, variant: Variant) -> bool {
        match variant {
            Variant::A => self.a,
            Variant::B => self.b,
        }
    }

    pub fn toggle(&mut self, variant: Variant) {
        match variant {
            Variant::A => self.a = !self.a,
            Variant::B => self.b = !self.b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub key: String,
    pub label: String,
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub tooltip: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub metric: Metric,
    pub rows: Vec<ChartRow>,
    /// `None` when every variant is hidden.
    pub axis: Option<AxisScale>,
    pub tick_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartView {
    /// Nothing in range; offer to reset the date filter to `reset_range`.
    Empty {
        message: String,
        reset_range: DateRange,
    },
    Bars(BarChart),
}

/// Chart state owned by one view.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonChart {
    pub range: DateRange,
    pub granularity: Granularity,
    pub metric: Metric,
    pub visibility: VariantVisibility,
}

impl ComparisonChart {
    pub fn new(range: DateRange, granularity: Granularity, metric: Metric) -> Self {
        Self {
            range,
            granularity,
            metric,
            visibility: VariantVisibility::default(),
        }
    }

    pub fn toggle(&mut self, variant: Variant) {
        self.visibility.toggle(variant);
    }

    /// The "reset filter" action of the empty state.
    pub fn reset_filter(&mut self, today: NaiveDate) {
        self.range = DateRange::year_to_date(today);
    }

    /// Generate samples for the current range and build the view.
    pub fn render<R: Rng + ?Sized>(
        &self,
        profile: &SampleProfile,
        rng: &mut R,
        today: NaiveDate,
    ) -> ChartView {
        let samples = generate_samples(self.range, profile, rng);
        let buckets = aggregate(&samples, self.granularity);
        self.build(&buckets, today)
    }

    /// Build the view from already aggregated buckets.
    pub fn build(&self, buckets: &[AggregatedBucket], today: NaiveDate) -> ChartView {
        if buckets.is_empty() {
            debug!(from = %self.range.from, to = %self.range.to, "Chart range has no data");
            return ChartView::Empty {
                message: EMPTY_MESSAGE.to_string(),
                reset_range: DateRange::year_to_date(today),
            };
        }

        let metric = spec(self.metric);
        let visible = |v: Variant| self.visibility.is_visible(v);

        let rows: Vec<ChartRow> = buckets
            .iter()
            .map(|bucket| {
                let value = |v: Variant| visible(v).then(|| metric.value(bucket.variant(v)));
                let mut tooltip = vec![bucket.label.clone()];
                for variant in Variant::ALL.into_iter().filter(|v| visible(*v)) {
                    let totals = bucket.variant(variant);
                    tooltip.push(variant.display_name().to_string());
                    tooltip.push(format!(
                        "{}: {}",
                        metric.label,
                        metric.format(metric.value(totals))
                    ));
                    tooltip.push(format!("Clicks: {}", format::count(totals.clicks)));
                    tooltip.push(format!(
                        "Impressions: {}",
                        format::count(totals.impressions)
                    ));
                }
                ChartRow {
                    key: bucket.key.clone(),
                    label: bucket.label.clone(),
                    a: value(Variant::A),
                    b: value(Variant::B),
                    tooltip,
                }
            })
            .collect();

        let plotted: Vec<f64> = rows.iter().flat_map(|r| r.a.into_iter().chain(r.b)).collect();
        let axis = metric.axis_for(&plotted);
        let tick_labels = axis
            .as_ref()
            .map(|a| metric.tick_labels(a))
            .unwrap_or_default();

        ChartView::Bars(BarChart {
            title: format!("Total {} – Version A vs Version B", metric.label),
            metric: self.metric,
            rows,
            axis,
            tick_labels,
        })
    }
}
