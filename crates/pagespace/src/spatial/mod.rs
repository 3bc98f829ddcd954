//! Spatial primitives for node placement
//!
//! Uses the host's right-handed coordinate system:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Toward the viewer (+) / Away (-)

mod quaternion;
mod transform;
mod vector3;

pub use quaternion::Quaternion;
pub use transform::Transform;
pub use vector3::Vector3;
