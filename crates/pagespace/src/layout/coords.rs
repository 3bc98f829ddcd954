//! Page-box to host-space coordinate conversion

use crate::dom::ElementBox;
use crate::host::{StageExtent, Viewport};
use crate::spatial::Vector3;
use crate::units::PixelMetrics;

/// Horizontal distance in meters from the viewport center.
pub fn x_coordinate(pixels_from_left: f32, pixels: &PixelMetrics, viewport: &Viewport) -> f32 {
    pixels.pixels_to_meters(pixels_from_left) - viewport.width / 2.0
}

/// Vertical distance in meters from the viewport center; up is positive.
pub fn y_coordinate(pixels_from_top: f32, pixels: &PixelMetrics, viewport: &Viewport) -> f32 {
    viewport.height / 2.0 - pixels.pixels_to_meters(pixels_from_top)
}

/// Depth in meters from the page plane.
pub fn z_coordinate(offset_pixels: f32, pixels: &PixelMetrics) -> f32 {
    pixels.pixels_to_meters(offset_pixels)
}

/// Local coordinates of an element's center relative to the volume, shifted
/// by the stage-extent asymmetries so the volume's own offset cancels out.
pub fn element_center(
    bounds: &ElementBox,
    z_offset_pixels: f32,
    pixels: &PixelMetrics,
    viewport: &Viewport,
    extent: &StageExtent,
) -> Vector3 {
    let x = x_coordinate(bounds.left + bounds.width / 2.0, pixels, viewport)
        + (extent.left - extent.right) / 2.0;
    let y = y_coordinate(bounds.top + bounds.height / 2.0, pixels, viewport)
        + (extent.bottom - extent.top) / 2.0;
    let z = z_coordinate(z_offset_pixels, pixels) + (extent.back - extent.front) / 2.0;

    Vector3::new(x, y, z)
}
