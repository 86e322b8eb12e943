use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CampaignError;

/// One of the two creatives compared in an A/B campaign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    A,
    B,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::A, Variant::B];

    pub fn display_name(self) -> &'static str {
        match self {
            Variant::A => "Version A",
            Variant::B => "Version B",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::A => write!(f, "A"),
            Variant::B => write!(f, "B"),
        }
    }
}

impl FromStr for Variant {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" | "V1" => Ok(Variant::A),
            "B" | "V2" => Ok(Variant::B),
            other => Err(CampaignError::Validation(format!("unknown variant '{other}'"))),
        }
    }
}

/// Metrics a comparison chart can plot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Ctr,
    ConversionRate,
    Revenue,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Ctr, Metric::ConversionRate, Metric::Revenue];
}

impl FromStr for Metric {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ctr" | "click_through_rate" => Ok(Metric::Ctr),
            "cr" | "conversion_rate" => Ok(Metric::ConversionRate),
            "revenue" => Ok(Metric::Revenue),
            other => Err(CampaignError::Validation(format!("unknown metric '{other}'"))),
        }
    }
}

/// Width of an aggregation time window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Monthly,
    Daily,
}

impl FromStr for Granularity {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(Granularity::Monthly),
            "daily" | "day" => Ok(Granularity::Daily),
            other => Err(CampaignError::Validation(format!(
                "unknown granularity '{other}'"
            ))),
        }
    }
}

/// How the "best version" badge is decided.
///
/// Serialized as `"computed"`, `"a"` or `"b"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WinnerPolicy {
    /// Always badge the given variant regardless of the numbers.
    Fixed(Variant),
    /// Compare the actual per-metric values.
    Computed,
}

impl Default for WinnerPolicy {
    fn default() -> Self {
        WinnerPolicy::Fixed(Variant::B)
    }
}

impl FromStr for WinnerPolicy {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "computed" => Ok(WinnerPolicy::Computed),
            other => other.parse().map(WinnerPolicy::Fixed),
        }
    }
}

impl TryFrom<String> for WinnerPolicy {
    type Error = CampaignError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WinnerPolicy> for String {
    fn from(policy: WinnerPolicy) -> Self {
        match policy {
            WinnerPolicy::Computed => "computed".to_string(),
            WinnerPolicy::Fixed(v) => v.to_string().to_lowercase(),
        }
    }
}

/// Inclusive calendar date range. A range whose `from` is after `to` is
/// empty rather than invalid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// January 1st of `today`'s year through `today`.
    pub fn year_to_date(today: NaiveDate) -> Self {
        Self {
            from: today.with_ordinal(1).unwrap_or(today),
            to: today,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }

    /// Number of days covered, 0 for an empty range.
    pub fn days(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.to - self.from).num_days() as u64 + 1
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        self.from.iter_days().take_while(move |d| *d <= to)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CampaignStatus {
    Running,
    Testing,
    Scheduled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    Good,
    Average,
    Poor,
}

impl PerformanceTier {
    pub fn emoji(self) -> &'static str {
        match self {
            PerformanceTier::Good => "🙂",
            PerformanceTier::Average => "😐",
            PerformanceTier::Poor => "🙁",
        }
    }
}

/// Headline numbers for one creative variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VariantMetrics {
    pub conversion_rate: f64,
    pub click_through_rate: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CampaignVariants {
    pub a: VariantMetrics,
    pub b: VariantMetrics,
}

impl CampaignVariants {
    pub fn get(&self, variant: Variant) -> &VariantMetrics {
        match variant {
            Variant::A => &self.a,
            Variant::B => &self.b,
        }
    }
}

/// Campaign record supplied by the data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub date_range: DateRange,
    pub owner: String,
    pub status: CampaignStatus,
    pub conversion_rate: f64,
    pub click_through_rate: f64,
    pub performance: PerformanceTier,
    pub variants: CampaignVariants,
}
