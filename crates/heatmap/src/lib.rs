//! Click heatmaps for campaign creatives: clustered click-point synthesis,
//! a cool-to-hot color scale, and the radial overlay renderer.

pub mod gradient;
pub mod points;
pub mod render;

pub use gradient::{interpolate, GradientStop, Rgb, HEAT_GRADIENT};
pub use points::{generate_points, HeatPoint, ImageSize};
pub use render::{HeatmapOverlay, RadialSpot};
