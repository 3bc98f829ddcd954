//! Transform representing position, rotation, and scale in host space

use serde::{Deserialize, Serialize};

use super::{Quaternion, Vector3};

/// A complete 3D transform (position + rotation + scale).
///
/// Volume placement and extraction manifests hand one of these to the host
/// where the original wire format carried a 4x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vector3,
    pub rotation: Quaternion,
    pub scale: Vector3,
}

impl Transform {
    /// Identity transform (origin, no rotation, unit scale)
    pub fn identity() -> Self {
        Self {
            position: Vector3::ZERO,
            rotation: Quaternion::IDENTITY,
            scale: Vector3::ONE,
        }
    }

    /// Create a transform with just a translation
    pub fn from_position(position: Vector3) -> Self {
        Self {
            position,
            rotation: Quaternion::IDENTITY,
            scale: Vector3::ONE,
        }
    }

    /// Create a transform with a translation and a rotation
    pub fn from_position_rotation(position: Vector3, rotation: Quaternion) -> Self {
        Self {
            position,
            rotation,
            scale: Vector3::ONE,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        assert_eq!(t.position, Vector3::ZERO);
        assert_eq!(t.rotation, Quaternion::IDENTITY);
        assert_eq!(t.scale, Vector3::ONE);
    }

    #[test]
    fn test_from_position() {
        let t = Transform::from_position(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(t.position.y, 2.0);
        assert_eq!(t.rotation, Quaternion::IDENTITY);
    }
}
