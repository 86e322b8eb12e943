//! Calendar bucketing of metric samples with volume-weighted rates.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use campaign_core::types::{Granularity, Variant};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::samples::MetricSample;

/// Month labels in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Raw sums for one variant. Rates are always derived from these sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantTotals {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub revenue: f64,
}

impl VariantTotals {
    pub fn record(&mut self, sample: &MetricSample) {
        self.impressions += sample.impressions;
        self.clicks += sample.clicks;
        self.conversions += sample.conversions;
        self.revenue += sample.revenue;
    }

    /// Σclicks / Σimpressions × 100, or 0 without impressions.
    pub fn ctr(&self) -> f64 {
        ratio_percent(self.clicks, self.impressions)
    }

    /// Σconversions / Σclicks × 100, or 0 without clicks.
    pub fn conversion_rate(&self) -> f64 {
        ratio_percent(self.conversions, self.clicks)
    }
}

impl Add for VariantTotals {
    type Output = VariantTotals;

    fn add(self, rhs: Self) -> Self::Output {
        VariantTotals {
            impressions: self.impressions + rhs.impressions,
            clicks: self.clicks + rhs.clicks,
            conversions: self.conversions + rhs.conversions,
            revenue: self.revenue + rhs.revenue,
        }
    }
}

impl AddAssign for VariantTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

fn ratio_percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// One month or one day of traffic for both variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBucket {
    /// `YYYY-MM` or `YYYY-MM-DD`.
    pub key: String,
    /// `Sep` or `Sep 01`.
    pub label: String,
    pub period_start: NaiveDate,
    pub a: VariantTotals,
    pub b: VariantTotals,
}

impl AggregatedBucket {
    pub fn variant(&self, variant: Variant) -> &VariantTotals {
        match variant {
            Variant::A => &self.a,
            Variant::B => &self.b,
        }
    }

    fn variant_mut(&mut self, variant: Variant) -> &mut VariantTotals {
        match variant {
            Variant::A => &mut self.a,
            Variant::B => &mut self.b,
        }
    }
}

/// Start of the bucket `date` falls into.
pub fn bucket_start(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Monthly => date.with_day(1).unwrap_or(date),
        Granularity::Daily => date,
    }
}

fn bucket_key(start: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Monthly => start.format("%Y-%m").to_string(),
        Granularity::Daily => start.format("%Y-%m-%d").to_string(),
    }
}

fn bucket_label(start: NaiveDate, granularity: Granularity) -> String {
    let month = MONTH_NAMES[start.month0() as usize];
    match granularity {
        Granularity::Monthly => month.to_string(),
        Granularity::Daily => format!("{month} {:02}", start.day()),
    }
}

/// Group samples into calendar buckets, sorted chronologically.
pub fn aggregate(samples: &[MetricSample], granularity: Granularity) -> Vec<AggregatedBucket> {
    let mut buckets: BTreeMap<NaiveDate, AggregatedBucket> = BTreeMap::new();

    for sample in samples {
        let start = bucket_start(sample.date, granularity);
        buckets
            .entry(start)
            .or_insert_with(|| AggregatedBucket {
                key: bucket_key(start, granularity),
                label: bucket_label(start, granularity),
                period_start: start,
                a: VariantTotals::default(),
                b: VariantTotals::default(),
            })
            .variant_mut(sample.variant)
            .record(sample);
    }

    buckets.into_values().collect()
}

/// Per-variant sums across every bucket.
pub fn grand_totals(buckets: &[AggregatedBucket]) -> (VariantTotals, VariantTotals) {
    buckets
        .iter()
        .fold(Default::default(), |(a, b), bucket| (a + bucket.a, b + bucket.b))
}
