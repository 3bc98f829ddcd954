//! Mapping between page layout space and host space

mod coords;
mod offset;

pub use coords::{element_center, x_coordinate, y_coordinate, z_coordinate};
pub use offset::{offset_coordinates, resolve_symbolic_offset, Axis};

/// Browser window metrics, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMetrics {
    pub inner_width: f32,
    pub inner_height: f32,
    pub outer_width: f32,
    pub outer_height: f32,
}

impl WindowMetrics {
    /// A window whose outer chrome matches its inner size.
    pub fn new(inner_width: f32, inner_height: f32) -> Self {
        Self {
            inner_width,
            inner_height,
            outer_width: inner_width,
            outer_height: inner_height,
        }
    }
}
