//! Clustered click-point synthesis for creative previews.
//!
//! A handful of cluster centers are placed inside the image; each cluster
//! emits points at random polar offsets whose intensity fades with distance
//! from the center.

use std::f64::consts::TAU;

use campaign_core::error::{CampaignError, CampaignResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Points never come closer than this to an image edge.
pub const EDGE_MARGIN: f64 = 50.0;
/// Furthest a point may fall from its cluster center.
pub const CLUSTER_RADIUS: f64 = 80.0;
/// Preferred horizontal and vertical inset for cluster centers.
const CENTER_INSET: (f64, f64) = (200.0, 100.0);
const FALLOFF: f64 = 0.3;
const NOISE: f64 = 0.2;
const MIN_INTENSITY: f64 = 0.1;
const CLUSTER_LABELS: [&str; 2] = ["CTA Button", "Card Image"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
    pub clicks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn validate(&self) -> CampaignResult<()> {
        let min = (2.0 * EDGE_MARGIN) as u32;
        if self.width <= min || self.height <= min {
            return Err(CampaignError::Validation(format!(
                "heatmap image must be larger than {min}x{min}px, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Synthesize 3–5 click clusters over an image of `size`.
pub fn generate_points<R: Rng + ?Sized>(
    size: ImageSize,
    rng: &mut R,
) -> CampaignResult<Vec<HeatPoint>> {
    size.validate()?;
    let (width, height) = (size.width as f64, size.height as f64);
    let inset_x = CENTER_INSET.0.min(width / 4.0);
    let inset_y = CENTER_INSET.1.min(height / 4.0);

    let cluster_count = rng.gen_range(3..=5);
    let mut points = Vec::new();

    for cluster in 0..cluster_count {
        let center_x = inset_x + rng.gen::<f64>() * (width - 2.0 * inset_x);
        let center_y = inset_y + rng.gen::<f64>() * (height - 2.0 * inset_y);
        let cluster_size = rng.gen_range(15..35);
        let base_intensity = 0.4 + rng.gen::<f64>() * 0.6;
        let element = CLUSTER_LABELS.get(cluster).map(|l| l.to_string());

        for _ in 0..cluster_size {
            let angle = rng.gen::<f64>() * TAU;
            let distance = rng.gen::<f64>() * CLUSTER_RADIUS;
            let x = center_x + angle.cos() * distance;
            let y = center_y + angle.sin() * distance;
            let intensity = (base_intensity - (distance / CLUSTER_RADIUS) * FALLOFF
                + (rng.gen::<f64>() - 0.5) * NOISE)
                .clamp(MIN_INTENSITY, 1.0);

            points.push(HeatPoint {
                x: x.clamp(EDGE_MARGIN, width - EDGE_MARGIN),
                y: y.clamp(EDGE_MARGIN, height - EDGE_MARGIN),
                intensity,
                clicks: (50.0 + intensity * 200.0).floor() as u32,
                element: element.clone(),
            });
        }
    }

    metrics::counter!("heatmap.points_generated").increment(points.len() as u64);
    debug!(
        clusters = cluster_count,
        points = points.len(),
        width = size.width,
        height = size.height,
        "Generated heatmap points"
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BANNER: ImageSize = ImageSize {
        width: 1200,
        height: 628,
    };

    #[test]
    fn test_points_stay_inside_margins() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            for size in [BANNER, ImageSize::new(101, 101), ImageSize::new(320, 2000)] {
                let points = generate_points(size, &mut rng).unwrap();
                let (w, h) = (size.width as f64, size.height as f64);
                for p in &points {
                    assert!(p.x >= 50.0 && p.x <= w - 50.0, "{p:?}");
                    assert!(p.y >= 50.0 && p.y <= h - 50.0, "{p:?}");
                    assert!(p.intensity >= 0.1 && p.intensity <= 1.0, "{p:?}");
                }
            }
        }
    }

    #[test]
    fn test_cluster_shape() {
        for seed in 0..50 {
            let points = generate_points(BANNER, &mut StdRng::seed_from_u64(seed)).unwrap();
            // 3..=5 clusters of 15..=34 points each
            assert!(points.len() >= 45 && points.len() <= 170, "{}", points.len());

            let cta = points
                .iter()
                .take_while(|p| p.element.as_deref() == Some("CTA Button"))
                .count();
            assert!((15..35).contains(&cta));
            let card = points[cta..]
                .iter()
                .take_while(|p| p.element.as_deref() == Some("Card Image"))
                .count();
            assert!((15..35).contains(&card));
            assert!(points[cta + card..].iter().all(|p| p.element.is_none()));
            assert!(points.len() - cta - card >= 15);
        }
    }

    #[test]
    fn test_clicks_follow_intensity() {
        let points = generate_points(BANNER, &mut StdRng::seed_from_u64(9)).unwrap();
        for p in points {
            assert_eq!(p.clicks, (50.0 + p.intensity * 200.0).floor() as u32);
            assert!((70..=250).contains(&p.clicks));
        }
    }

    #[test]
    fn test_small_image_is_rejected() {
        let err = generate_points(ImageSize::new(100, 628), &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, CampaignError::Validation(_)));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let first = generate_points(BANNER, &mut StdRng::seed_from_u64(77)).unwrap();
        let second = generate_points(BANNER, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unlabeled_points_skip_element_field() {
        let point = HeatPoint {
            x: 60.0,
            y: 60.0,
            intensity: 0.5,
            clicks: 150,
            element: None,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert!(!json.contains("element"));
    }
}
