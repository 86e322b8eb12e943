use serde::Deserialize;

use crate::error::CampaignResult;
use crate::types::{Granularity, Metric, WinnerPolicy};

/// Root application configuration. Loaded from an optional
/// `campaign-insights.toml` and environment variables with the prefix
/// `CAMPAIGN_INSIGHTS__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    #[serde(default)]
    pub copilot: CopilotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_metric")]
    pub default_metric: Metric,
    #[serde(default)]
    pub default_granularity: Granularity,
    #[serde(default)]
    pub winner_policy: WinnerPolicy,
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub samples: SampleProfile,
}

/// Performance targets a variant is measured against.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TargetsConfig {
    #[serde(default = "default_ctr_target")]
    pub ctr: f64,
    #[serde(default = "default_conversion_target")]
    pub conversion_rate: f64,
    #[serde(default = "default_revenue_target")]
    pub revenue: f64,
}

/// Shape of the synthetic per-day traffic. Rates are percentages; jitter
/// values are the full width of a uniform band centred on zero.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SampleProfile {
    #[serde(default = "default_ctr_base")]
    pub ctr_base: f64,
    #[serde(default = "default_ctr_amplitude")]
    pub ctr_amplitude: f64,
    #[serde(default = "default_ctr_period")]
    pub ctr_period: f64,
    #[serde(default = "default_ctr_jitter")]
    pub ctr_jitter: f64,
    #[serde(default = "default_cr_base")]
    pub cr_base: f64,
    #[serde(default = "default_cr_amplitude")]
    pub cr_amplitude: f64,
    #[serde(default = "default_cr_period")]
    pub cr_period: f64,
    #[serde(default = "default_cr_jitter")]
    pub cr_jitter: f64,
    #[serde(default = "default_uplift_min")]
    pub uplift_min: f64,
    #[serde(default = "default_uplift_max")]
    pub uplift_max: f64,
    #[serde(default = "default_a_impressions_min")]
    pub a_impressions_min: f64,
    #[serde(default = "default_a_impressions_spread")]
    pub a_impressions_spread: f64,
    #[serde(default = "default_b_impressions_min")]
    pub b_impressions_min: f64,
    #[serde(default = "default_b_impressions_spread")]
    pub b_impressions_spread: f64,
    #[serde(default = "default_order_value_min")]
    pub order_value_min: f64,
    #[serde(default = "default_order_value_max")]
    pub order_value_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeatmapConfig {
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
    #[serde(default = "default_opacity")]
    pub default_opacity: u8,
    #[serde(default)]
    pub show_by_default: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CopilotConfig {
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default = "default_typewriter_delay_ms")]
    pub typewriter_delay_ms: u64,
    #[serde(default = "default_typewriter_speed_ms")]
    pub typewriter_speed_ms: u64,
}

// Default functions
fn default_metric() -> Metric {
    Metric::Ctr
}
fn default_ctr_target() -> f64 {
    5.0
}
fn default_conversion_target() -> f64 {
    5.0
}
fn default_revenue_target() -> f64 {
    80_000.0
}
fn default_ctr_base() -> f64 {
    2.5
}
fn default_ctr_amplitude() -> f64 {
    0.6
}
fn default_ctr_period() -> f64 {
    2.0
}
fn default_ctr_jitter() -> f64 {
    0.8
}
fn default_cr_base() -> f64 {
    2.0
}
fn default_cr_amplitude() -> f64 {
    0.5
}
fn default_cr_period() -> f64 {
    5.0
}
fn default_cr_jitter() -> f64 {
    0.6
}
fn default_uplift_min() -> f64 {
    1.15
}
fn default_uplift_max() -> f64 {
    1.25
}
fn default_a_impressions_min() -> f64 {
    8_000.0
}
fn default_a_impressions_spread() -> f64 {
    15_000.0
}
fn default_b_impressions_min() -> f64 {
    7_000.0
}
fn default_b_impressions_spread() -> f64 {
    17_000.0
}
fn default_order_value_min() -> f64 {
    40.0
}
fn default_order_value_max() -> f64 {
    120.0
}
fn default_image_width() -> u32 {
    1200
}
fn default_image_height() -> u32 {
    628
}
fn default_opacity() -> u8 {
    55
}
fn default_reply_delay_ms() -> u64 {
    1000
}
fn default_typewriter_delay_ms() -> u64 {
    1500
}
fn default_typewriter_speed_ms() -> u64 {
    30
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            default_metric: default_metric(),
            default_granularity: Granularity::default(),
            winner_policy: WinnerPolicy::default(),
            targets: TargetsConfig::default(),
            samples: SampleProfile::default(),
        }
    }
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            ctr: default_ctr_target(),
            conversion_rate: default_conversion_target(),
            revenue: default_revenue_target(),
        }
    }
}

impl Default for SampleProfile {
    fn default() -> Self {
        Self {
            ctr_base: default_ctr_base(),
            ctr_amplitude: default_ctr_amplitude(),
            ctr_period: default_ctr_period(),
            ctr_jitter: default_ctr_jitter(),
            cr_base: default_cr_base(),
            cr_amplitude: default_cr_amplitude(),
            cr_period: default_cr_period(),
            cr_jitter: default_cr_jitter(),
            uplift_min: default_uplift_min(),
            uplift_max: default_uplift_max(),
            a_impressions_min: default_a_impressions_min(),
            a_impressions_spread: default_a_impressions_spread(),
            b_impressions_min: default_b_impressions_min(),
            b_impressions_spread: default_b_impressions_spread(),
            order_value_min: default_order_value_min(),
            order_value_max: default_order_value_max(),
        }
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            image_width: default_image_width(),
            image_height: default_image_height(),
            default_opacity: default_opacity(),
            show_by_default: false,
        }
    }
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            typewriter_delay_ms: default_typewriter_delay_ms(),
            typewriter_speed_ms: default_typewriter_speed_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional config file and environment variables.
    pub fn load() -> CampaignResult<Self> {
        Self::load_from("campaign-insights")
    }

    /// Same as [`AppConfig::load`] with an explicit config file stem.
    pub fn load_from(file_stem: &str) -> CampaignResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(
                config::Environment::with_prefix("CAMPAIGN_INSIGHTS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
