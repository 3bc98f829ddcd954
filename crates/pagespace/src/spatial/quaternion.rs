//! Quaternion rotations and the angle conversions the attribute surface needs

use serde::{Deserialize, Serialize};

use super::Vector3;

/// Sine terms below this are treated as the identity-rotation singularity.
const AXIS_ANGLE_EPSILON: f32 = 1e-6;

/// A rotation quaternion, single-precision to match host numerics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Create a new quaternion
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create a quaternion from an axis and an angle in radians
    pub fn from_axis_angle(axis: Vector3, angle_radians: f32) -> Self {
        let half = angle_radians / 2.0;
        let sin_half = half.sin();
        let normalized = axis.normalize();

        Self {
            x: normalized.x * sin_half,
            y: normalized.y * sin_half,
            z: normalized.z * sin_half,
            w: half.cos(),
        }
    }

    /// Create a quaternion from per-axis angles in radians, ZYX composition.
    ///
    /// This is the single conversion behind both the `rotation` attribute and
    /// the `angles` animation parameters.
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        let c1 = (x / 2.0).cos();
        let c2 = (y / 2.0).cos();
        let c3 = (z / 2.0).cos();
        let s1 = (x / 2.0).sin();
        let s2 = (y / 2.0).sin();
        let s3 = (z / 2.0).sin();

        Self {
            x: s1 * c2 * c3 - c1 * s2 * s3,
            y: c1 * s2 * c3 + s1 * c2 * s3,
            z: c1 * c2 * s3 - s1 * s2 * c3,
            w: c1 * c2 * c3 + s1 * s2 * s3,
        }
    }

    /// Decompose into per-axis rotation angles in radians.
    ///
    /// Near the identity (`w ≈ ±1`) the sine term vanishes; the unnormalized
    /// `component * angle` form is returned instead of dividing by it, which
    /// collapses to zero rotation rather than NaN.
    pub fn to_axis_angle(&self) -> [f32; 3] {
        let angle = 2.0 * self.w.clamp(-1.0, 1.0).acos();
        let sin_sq = 1.0 - self.w * self.w;

        if sin_sq >= AXIS_ANGLE_EPSILON {
            let s = sin_sq.sqrt();
            [
                self.x / s * angle,
                self.y / s * angle,
                self.z / s * angle,
            ]
        } else {
            [self.x * angle, self.y * angle, self.z * angle]
        }
    }

    /// Get the magnitude of the quaternion
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Normalize the quaternion
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
                z: self.z / mag,
                w: self.w / mag,
            }
        } else {
            Self::IDENTITY
        }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_identity_round_trip() {
        let angles = Quaternion::IDENTITY.to_axis_angle();
        assert_eq!(angles, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_single_axis_round_trip() {
        let q = Quaternion::from_euler(0.0, PI / 2.0, 0.0);
        let angles = q.to_axis_angle();
        assert!(angles[0].abs() < 0.0001);
        assert!((angles[1] - PI / 2.0).abs() < 0.0001);
        assert!(angles[2].abs() < 0.0001);
    }

    #[test]
    fn test_from_axis_angle_matches_euler_on_x() {
        let a = Quaternion::from_axis_angle(Vector3::RIGHT, PI / 3.0);
        let b = Quaternion::from_euler(PI / 3.0, 0.0, 0.0);
        assert!((a.x - b.x).abs() < 0.0001);
        assert!((a.w - b.w).abs() < 0.0001);
    }

    #[test]
    fn test_near_identity_is_finite() {
        let q = Quaternion::new(1e-5, 0.0, 0.0, 1.0).normalize();
        let angles = q.to_axis_angle();
        assert!(angles.iter().all(|a| a.is_finite()));
        assert!(angles[0].abs() < 0.001);
    }

    #[test]
    fn test_normalize() {
        let q = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        assert!((q.normalize().magnitude() - 1.0).abs() < 0.0001);
    }
}
