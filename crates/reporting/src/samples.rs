//! Synthetic per-day traffic for the two creative variants of a campaign.
//!
//! Variant A follows a seasonal baseline with uniform jitter. Variant B is
//! derived from the same-day A baseline through a multiplicative uplift, so
//! the two series stay correlated day to day.

use campaign_core::config::SampleProfile;
use campaign_core::types::{DateRange, Variant};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One day's observed traffic for one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub date: NaiveDate,
    pub variant: Variant,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub revenue: f64,
}

/// Rates (percent) driving one day's samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBaseline {
    pub a_ctr: f64,
    pub a_conversion_rate: f64,
    pub uplift: f64,
}

impl DailyBaseline {
    pub fn ctr(&self, variant: Variant) -> f64 {
        match variant {
            Variant::A => self.a_ctr,
            Variant::B => self.a_ctr * self.uplift,
        }
    }

    pub fn conversion_rate(&self, variant: Variant) -> f64 {
        match variant {
            Variant::A => self.a_conversion_rate,
            Variant::B => self.a_conversion_rate * self.uplift,
        }
    }
}

/// Draw the baseline rates for `date`.
pub fn daily_baseline<R: Rng + ?Sized>(
    date: NaiveDate,
    profile: &SampleProfile,
    rng: &mut R,
) -> DailyBaseline {
    let month = date.month0() as f64;
    let day = date.day() as f64;

    let a_ctr = profile.ctr_base
        + (month / profile.ctr_period).sin() * profile.ctr_amplitude
        + (rng.gen::<f64>() - 0.5) * profile.ctr_jitter;
    let a_conversion_rate = profile.cr_base
        + (day / profile.cr_period).sin() * profile.cr_amplitude
        + (rng.gen::<f64>() - 0.5) * profile.cr_jitter;
    let uplift = profile.uplift_min + rng.gen::<f64>() * (profile.uplift_max - profile.uplift_min);

    DailyBaseline {
        a_ctr: a_ctr.max(0.0),
        a_conversion_rate: a_conversion_rate.max(0.0),
        uplift,
    }
}

/// Generate one sample per day per variant over the inclusive `range`.
///
/// Output is date-ascending with A before B within a date. An empty range
/// (`from > to`) produces no samples.
pub fn generate_samples<R: Rng + ?Sized>(
    range: DateRange,
    profile: &SampleProfile,
    rng: &mut R,
) -> Vec<MetricSample> {
    let mut samples = Vec::with_capacity(range.days() as usize * 2);

    for date in range.iter_days() {
        let baseline = daily_baseline(date, profile, rng);
        for variant in Variant::ALL {
            samples.push(sample_for(date, variant, &baseline, profile, rng));
        }
    }

    metrics::counter!("samples.generated").increment(samples.len() as u64);
    debug!(
        from = %range.from,
        to = %range.to,
        samples = samples.len(),
        "Generated metric samples"
    );
    samples
}

fn sample_for<R: Rng + ?Sized>(
    date: NaiveDate,
    variant: Variant,
    baseline: &DailyBaseline,
    profile: &SampleProfile,
    rng: &mut R,
) -> MetricSample {
    let (min, spread) = match variant {
        Variant::A => (profile.a_impressions_min, profile.a_impressions_spread),
        Variant::B => (profile.b_impressions_min, profile.b_impressions_spread),
    };
    let impressions = (min + rng.gen::<f64>() * spread).max(0.0).floor() as u64;
    let clicks = scale_count(impressions, baseline.ctr(variant));
    let conversions = scale_count(clicks, baseline.conversion_rate(variant));
    let order_value = profile.order_value_min
        + rng.gen::<f64>() * (profile.order_value_max - profile.order_value_min);
    let revenue = (conversions as f64 * order_value.max(0.0) * 100.0).round() / 100.0;

    MetricSample {
        date,
        variant,
        impressions,
        clicks,
        conversions,
        revenue,
    }
}

/// floor(total × rate / 100), never exceeding `total`.
fn scale_count(total: u64, rate_percent: f64) -> u64 {
    let scaled = (total as f64 * rate_percent.clamp(0.0, 100.0) / 100.0).floor() as u64;
    scaled.min(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn september() -> DateRange {
        DateRange::new(date(2025, 9, 1), date(2025, 9, 30))
    }

    #[test]
    fn test_one_sample_per_day_per_variant() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = generate_samples(september(), &SampleProfile::default(), &mut rng);
        assert_eq!(samples.len(), 60);

        for pair in samples.chunks(2) {
            assert_eq!(pair[0].variant, Variant::A);
            assert_eq!(pair[1].variant, Variant::B);
            assert_eq!(pair[0].date, pair[1].date);
        }
        assert!(samples.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(samples[0].date, date(2025, 9, 1));
        assert_eq!(samples[59].date, date(2025, 9, 30));
    }

    #[test]
    fn test_counts_are_nested() {
        let profile = SampleProfile::default();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let range = DateRange::new(date(2025, 1, 1), date(2025, 12, 31));
            for s in generate_samples(range, &profile, &mut rng) {
                assert!(s.clicks <= s.impressions, "{s:?}");
                assert!(s.conversions <= s.clicks, "{s:?}");
                assert!(s.revenue >= 0.0, "{s:?}");
            }
        }
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let range = DateRange::new(date(2025, 9, 30), date(2025, 9, 1));
        assert!(generate_samples(range, &SampleProfile::default(), &mut rng).is_empty());
    }

    #[test]
    fn test_same_seed_same_samples() {
        let profile = SampleProfile::default();
        let first = generate_samples(september(), &profile, &mut StdRng::seed_from_u64(42));
        let second = generate_samples(september(), &profile, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_variant_b_is_uplifted_from_a() {
        let profile = SampleProfile::default();
        let mut rng = StdRng::seed_from_u64(3);
        for day in september().iter_days() {
            let baseline = daily_baseline(day, &profile, &mut rng);
            let ratio = baseline.ctr(Variant::B) / baseline.ctr(Variant::A);
            assert!((1.15..=1.25).contains(&ratio), "ratio {ratio}");
            let cr_ratio =
                baseline.conversion_rate(Variant::B) / baseline.conversion_rate(Variant::A);
            assert!((cr_ratio - ratio).abs() < 1e-9);
        }
    }

    #[test]
    fn test_impressions_stay_in_volume_band() {
        let profile = SampleProfile::default();
        let mut rng = StdRng::seed_from_u64(11);
        for s in generate_samples(september(), &profile, &mut rng) {
            match s.variant {
                Variant::A => assert!((8_000..23_000).contains(&s.impressions)),
                Variant::B => assert!((7_000..24_000).contains(&s.impressions)),
            }
        }
    }

    #[test]
    fn test_scale_count_is_capped() {
        assert_eq!(scale_count(1_000, 2.5), 25);
        assert_eq!(scale_count(1_000, 250.0), 1_000);
        assert_eq!(scale_count(1_000, -3.0), 0);
        assert_eq!(scale_count(0, 50.0), 0);
    }
}
