// Rotation about an arbitrary axis, stored as a unit quaternion.

use crate::{Aabb, Quat, Vec3};

/// Rotation by a fixed angle about a unit axis through the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRotation {
    axis: Vec3,
    rotation: Quat,
}

impl AxisRotation {
    /// `axis` is normalized here; `degrees` follows the right-hand rule.
    pub fn from_degrees(axis: Vec3, degrees: f32) -> Self {
        Self::from_radians(axis, degrees.to_radians())
    }

    pub fn from_radians(axis: Vec3, radians: f32) -> Self {
        let axis = axis.normalize_or_zero();
        let rotation = if axis == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(axis, radians)
        };
        Self { axis, rotation }
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Same axis, opposite angle.
    pub fn inverse(&self) -> Self {
        Self {
            axis: self.axis,
            rotation: self.rotation.conjugate(),
        }
    }

    pub fn rotate(&self, v: Vec3) -> Vec3 {
        self.rotation * v
    }

    /// Loose world box of a rotated box: the union of its 8 rotated corners.
    pub fn rotate_aabb(&self, aabb: &Aabb) -> Aabb {
        let mut result = Aabb::EMPTY;
        for corner in aabb.corners() {
            result.extend(self.rotate(corner));
        }
        Aabb::from_points(result.min(), result.max())
    }
}
