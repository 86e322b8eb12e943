//! Point generation through to the rendered overlay.

use campaign_heatmap::gradient::legend;
use campaign_heatmap::{generate_points, interpolate, HeatmapOverlay, ImageSize};
use rand::rngs::StdRng;
use rand::SeedableRng;

const BANNER: ImageSize = ImageSize {
    width: 1200,
    height: 628,
};

#[test]
fn test_opacity_changes_do_not_regenerate_points() {
    let points = generate_points(BANNER, &mut StdRng::seed_from_u64(12)).unwrap();
    let mut overlay = HeatmapOverlay::new(true, 55);
    let before = overlay.spots(&points, BANNER);

    overlay.set_opacity(80);
    let after = overlay.spots(&points, BANNER);
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.cx_percent, a.cx_percent);
        assert_eq!(b.radius, a.radius);
        assert_eq!(b.color, a.color);
        assert!((a.stops[0].opacity - 0.8).abs() < 1e-12);
    }
}

#[test]
fn test_every_point_becomes_a_spot_inside_the_image() {
    let points = generate_points(BANNER, &mut StdRng::seed_from_u64(3)).unwrap();
    let spots = HeatmapOverlay::new(true, 55).spots(&points, BANNER);
    assert_eq!(spots.len(), points.len());
    for (spot, point) in spots.iter().zip(&points) {
        assert!(spot.cx_percent > 0.0 && spot.cx_percent < 100.0);
        assert!(spot.cy_percent > 0.0 && spot.cy_percent < 100.0);
        assert!(spot.radius >= 35.0 && spot.radius <= 80.0);
        assert_eq!(spot.color, interpolate(point.intensity));
        assert!(spot.tooltip.clicks.ends_with(" clicks"));
    }
}

#[test]
fn test_svg_has_one_circle_per_point() {
    let points = generate_points(BANNER, &mut StdRng::seed_from_u64(21)).unwrap();
    let svg = HeatmapOverlay::new(true, 55).render_svg(&points, BANNER);
    assert_eq!(svg.matches("<circle").count(), points.len());
    assert!(svg.contains("mix-blend-mode: multiply"));
    assert!(svg.contains("blur(20px)"));
}

#[test]
fn test_legend_matches_scale_endpoints() {
    let swatches = legend();
    assert_eq!(swatches[0], interpolate(0.0));
    assert_eq!(swatches[2], interpolate(0.5));
    assert_eq!(swatches[4], interpolate(1.0));
}
