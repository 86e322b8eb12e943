//! Five-stop cool→hot color scale.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_u32)
    }

    /// `#RRGGBB`
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

/// `rgb(r, g, b)`
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub position: f64,
    pub color: Rgb,
}

pub const HEAT_GRADIENT: [GradientStop; 5] = [
    GradientStop { position: 0.0, color: Rgb::from_u32(0x2E7BFF) },  // blue
    GradientStop { position: 0.25, color: Rgb::from_u32(0x33C3A6) }, // teal
    GradientStop { position: 0.5, color: Rgb::from_u32(0xF5D90A) },  // yellow
    GradientStop { position: 0.75, color: Rgb::from_u32(0xFF6A3A) }, // orange
    GradientStop { position: 1.0, color: Rgb::from_u32(0xE5484D) },  // red
];

/// Color for `intensity`, clamped into [0, 1]. Stop positions map to their
/// stop colors exactly.
pub fn interpolate(intensity: f64) -> Rgb {
    let intensity = if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    };

    for pair in HEAT_GRADIENT.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if intensity >= lo.position && intensity <= hi.position {
            let t = (intensity - lo.position) / (hi.position - lo.position);
            return lo.color.lerp(hi.color, t);
        }
    }
    HEAT_GRADIENT[HEAT_GRADIENT.len() - 1].color
}

/// Legend swatches, low to high.
pub fn legend() -> [Rgb; 5] {
    HEAT_GRADIENT.map(|stop| stop.color)
}
