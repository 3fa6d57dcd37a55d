//! Intersection results and arena handles.

use prism_math::Vec3;

/// Index of a primitive in a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId(pub(crate) usize);

/// Index of a material in a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

impl PrimitiveId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Record of a ray-object intersection.
///
/// The normal is unit length but not oriented against the ray; materials
/// decide which side they are on from the ray direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Ray parameter of the hit
    pub t: f32,
    /// World-space hit point
    pub p: Vec3,
    /// Object-local hit point, used by volume and cube-map lookups
    pub lp: Vec3,
    pub normal: Vec3,
    pub u: f32,
    pub v: f32,
    /// `None` for faces whose material is assigned by their owner
    pub material: Option<MaterialId>,
}

impl HitRecord {
    /// Keep whichever of two optional hits is closer along the ray.
    pub fn closer(a: Option<HitRecord>, b: Option<HitRecord>) -> Option<HitRecord> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.t < a.t { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}
