//! Heatmap overlay rendering.
//!
//! Each point becomes a blurred disc with a radial opacity falloff, colored
//! by intensity. Visibility and global opacity live on [`HeatmapOverlay`]
//! and never touch the point data.

use std::fmt::Write as _;

use campaign_core::config::HeatmapConfig;
use serde::{Deserialize, Serialize};

use crate::gradient::{interpolate, Rgb};
use crate::points::{HeatPoint, ImageSize};

const BASE_RADIUS: f64 = 30.0;
const RADIUS_PER_INTENSITY: f64 = 50.0;
const BLUR_PX: u32 = 20;

/// One stop of a spot's radial falloff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FalloffStop {
    /// Fraction of the radius, 0 at the center.
    pub offset: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotTooltip {
    pub clicks: String,
    pub density: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialSpot {
    /// Center as a percentage of the image width/height.
    pub cx_percent: f64,
    pub cy_percent: f64,
    pub radius: f64,
    pub color: Rgb,
    pub stops: [FalloffStop; 3],
    pub tooltip: SpotTooltip,
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// `30 + intensity × 50` pixels.
pub fn spot_radius(intensity: f64) -> f64 {
    BASE_RADIUS + intensity * RADIUS_PER_INTENSITY
}

/// Full at the center, half at mid-radius, transparent at the edge.
pub fn falloff(opacity_percent: u8) -> [FalloffStop; 3] {
    let o = opacity_percent.min(100) as f64 / 100.0;
    [
        FalloffStop {
            offset: 0.0,
            opacity: o,
        },
        FalloffStop {
            offset: 0.5,
            opacity: o * 0.5,
        },
        FalloffStop {
            offset: 1.0,
            opacity: 0.0,
        },
    ]
}

/// User-controlled overlay state for one preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapOverlay {
    visible: bool,
    opacity: u8,
}

impl Default for HeatmapOverlay {
    fn default() -> Self {
        Self {
            visible: false,
            opacity: 55,
        }
    }
}

impl HeatmapOverlay {
    pub fn new(visible: bool, opacity: u8) -> Self {
        Self {
            visible,
            opacity: opacity.min(100),
        }
    }

    pub fn from_config(config: &HeatmapConfig) -> Self {
        Self::new(config.show_by_default, config.default_opacity)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Set the opacity slider, clamped to [0, 100].
    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity.min(100);
    }

    /// Show/hide button caption.
    pub fn toggle_label(&self) -> &'static str {
        if self.visible {
            "Hide heatmap"
        } else {
            "Show heatmap"
        }
    }

    /// Spots for `points`; empty while the overlay is hidden.
    pub fn spots(&self, points: &[HeatPoint], size: ImageSize) -> Vec<RadialSpot> {
        if !self.visible {
            return Vec::new();
        }
        let stops = falloff(self.opacity);
        points
            .iter()
            .map(|p| RadialSpot {
                cx_percent: p.x / size.width as f64 * 100.0,
                cy_percent: p.y / size.height as f64 * 100.0,
                radius: spot_radius(p.intensity),
                color: interpolate(p.intensity),
                stops,
                tooltip: SpotTooltip {
                    clicks: format!("{} clicks", p.clicks),
                    density: format!("Density: {:.1}%", p.intensity * 100.0),
                    element: p.element.as_ref().map(|e| format!("Element: {e}")),
                },
            })
            .collect()
    }

    /// SVG overlay meant to sit on top of the creative image. Returns an
    /// empty string while hidden.
    pub fn render_svg(&self, points: &[HeatPoint], size: ImageSize) -> String {
        let spots = self.spots(points, size);
        if spots.is_empty() {
            return String::new();
        }

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" style="mix-blend-mode: multiply">"#,
            size.width, size.height
        );
        svg.push_str("  <defs>\n");
        for (idx, spot) in spots.iter().enumerate() {
            let _ = writeln!(svg, r#"    <radialGradient id="heat-{idx}">"#);
            for stop in &spot.stops {
                let color = if stop.opacity > 0.0 {
                    spot.color.to_string()
                } else {
                    "transparent".to_string()
                };
                let _ = writeln!(
                    svg,
                    r#"      <stop offset="{}%" stop-color="{}" stop-opacity="{}"/>"#,
                    stop.offset * 100.0,
                    color,
                    stop.opacity
                );
            }
            svg.push_str("    </radialGradient>\n");
        }
        svg.push_str("  </defs>\n");
        for (idx, spot) in spots.iter().enumerate() {
            let mut title = format!("{}\n{}", spot.tooltip.clicks, spot.tooltip.density);
            if let Some(element) = &spot.tooltip.element {
                title.push('\n');
                title.push_str(element);
            }
            let title = escape_xml(&title);
            let _ = writeln!(
                svg,
                r#"  <circle cx="{:.2}%" cy="{:.2}%" r="{:.1}" fill="url(#heat-{idx})" style="filter: blur({BLUR_PX}px)"><title>{title}</title></circle>"#,
                spot.cx_percent, spot.cy_percent, spot.radius
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}
