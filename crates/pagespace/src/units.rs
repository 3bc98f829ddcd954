//! Pixel, physical-unit and angle conversions
//!
//! All conversions stay in `f32` so every result matches the host's
//! single-precision numerics exactly.

use std::time::Duration;

/// Default z-offset distance in pixels when no `z-offset` attribute is set.
pub const DEFAULT_Z_OFFSET: f32 = 150.0;

/// De facto standard: 1 pixel = 0.0264583 cm (1in = 96px = 2.54cm).
pub const PIXEL_TO_CM: f32 = 0.026458333;

/// Scale ratio applied to a node while the pointer hovers an extractable node.
pub const MOUSE_OVER_RATIO: f32 = 1.25;

/// Z distance in meters a hovered extractable node moves toward the viewer.
pub const MOUSE_OVER_Z_MOVE: f32 = 0.02;

/// Margin in meters added to each dimension of an extracted volume so the
/// node clears the volume boundary.
pub const VOLUME_GAP: f32 = 0.0001;

/// Delay used to coalesce rapid pointer over/out flips on extractable nodes.
pub const HOVER_DEBOUNCE: Duration = Duration::from_millis(250);

/// Process-wide pixel-to-meter ratio.
///
/// Computed once at engine construction from the host viewport width in
/// meters over the window inner width in pixels. Without a host the ratio is
/// zero and every conversion degrades to zero instead of failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelMetrics {
    ratio: f32,
}

impl PixelMetrics {
    /// No spatial host: all conversions yield zero.
    pub const ABSENT: Self = Self { ratio: 0.0 };

    /// Derive the ratio from host viewport width (meters) and window inner
    /// width (pixels).
    pub fn new(viewport_width_m: f32, window_inner_width_px: f32) -> Self {
        if viewport_width_m > 0.0 && window_inner_width_px > 0.0 {
            Self {
                ratio: viewport_width_m / window_inner_width_px,
            }
        } else {
            Self::ABSENT
        }
    }

    /// Build directly from a known ratio (tests, embedders with one cached).
    pub fn from_ratio(ratio: f32) -> Self {
        Self { ratio }
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Convert from pixels to meters.
    pub fn pixels_to_meters(&self, pixels: f32) -> f32 {
        pixels * self.ratio
    }

    /// Convert from meters back to pixels. Zero ratio yields zero.
    pub fn meters_to_pixels(&self, meters: f32) -> f32 {
        if self.ratio == 0.0 {
            0.0
        } else {
            meters / self.ratio
        }
    }
}

/// Convert an attribute length to pixels, honoring `cm` and `mm` suffixes.
/// A bare number or an unrecognized suffix is treated as pixels already;
/// an unparseable value yields zero.
pub fn attribute_in_pixels(value: &str) -> f32 {
    let number = leading_float(value);
    if number == 0.0 {
        return 0.0;
    }

    let unit: String = value
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();

    match unit.as_str() {
        "cm" => number / PIXEL_TO_CM,
        "mm" => number / PIXEL_TO_CM / 10.0,
        _ => number,
    }
}

/// Standard degree-to-radian conversion.
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Parse the leading float of a string, `parseFloat` style: trailing
/// characters (a unit suffix) are ignored. `None` when nothing numeric leads.
pub fn try_leading_float(value: &str) -> Option<f32> {
    let trimmed = value.trim();
    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end].parse().ok()
}

/// [`try_leading_float`] with the original's zero fallback.
pub fn leading_float(value: &str) -> f32 {
    try_leading_float(value).unwrap_or(0.0)
}
