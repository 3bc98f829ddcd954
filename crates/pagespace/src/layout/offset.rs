//! Symbolic offset resolution for `move-to`/`move-by` destinations

use crate::host::{StageExtent, Viewport};
use crate::spatial::Vector3;
use crate::units::{try_leading_float, PixelMetrics};

use super::coords::{x_coordinate, y_coordinate, z_coordinate};
use super::WindowMetrics;

/// Which window axis a symbolic keyword is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Resolve one offset token to a pixel distance.
///
/// Keywords resolve against the outer window dimension for the axis; numeric
/// strings parse as-is. Anything else yields `None`, which callers treat as
/// "keep the current coordinate on that axis" rather than zero.
pub fn resolve_symbolic_offset(token: &str, axis: Axis, window: &WindowMetrics) -> Option<f32> {
    match (token, axis) {
        ("left", Axis::Horizontal) => Some(0.0),
        ("center" | "middle", Axis::Horizontal) => Some(window.outer_width / 2.0),
        ("right", Axis::Horizontal) => Some(window.outer_width),
        ("top", Axis::Vertical) => Some(0.0),
        ("center" | "middle", Axis::Vertical) => Some(window.outer_height / 2.0),
        ("bottom", Axis::Vertical) => Some(window.outer_height),
        _ => try_leading_float(token),
    }
}

/// Resolve a three-token offset to host-space coordinates.
///
/// Each resolved axis goes through the same center-relative mapping as
/// element placement; an unresolved axis passes `current` through untouched.
pub fn offset_coordinates(
    tokens: &[String],
    current: Vector3,
    pixels: &PixelMetrics,
    viewport: &Viewport,
    window: &WindowMetrics,
    extent: &StageExtent,
) -> Vector3 {
    let x_offset = tokens
        .first()
        .and_then(|t| resolve_symbolic_offset(t, Axis::Horizontal, window));
    let y_offset = tokens
        .get(1)
        .and_then(|t| resolve_symbolic_offset(t, Axis::Vertical, window));
    let z_offset = tokens.get(2).and_then(|t| try_leading_float(t));

    let x = match x_offset {
        Some(px) => x_coordinate(px, pixels, viewport) + (extent.left - extent.right) / 2.0,
        None => current.x,
    };
    let y = match y_offset {
        Some(px) => y_coordinate(px, pixels, viewport) + (extent.bottom - extent.top) / 2.0,
        None => current.y,
    };
    let z = match z_offset {
        Some(px) => z_coordinate(px, pixels) + (extent.back - extent.front) / 2.0,
        None => current.z,
    };

    Vector3::new(x, y, z)
}
