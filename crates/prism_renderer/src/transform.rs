//! Instancing wrappers that move another primitive.

use crate::{HitRecord, PrimitiveId, Scene};
use prism_math::{Aabb, AxisRotation, Interval, Ray, Vec3};
use rand::RngCore;

/// Another primitive shifted by a fixed offset.
#[derive(Debug, Clone)]
pub struct Translation {
    inner: PrimitiveId,
    offset: Vec3,
}

impl Translation {
    pub fn new(inner: PrimitiveId, offset: Vec3) -> Self {
        Self { inner, offset }
    }

    pub fn inner(&self) -> PrimitiveId {
        self.inner
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn hit(
        &self,
        scene: &Scene,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        let local = Ray::new(ray.origin - self.offset, ray.direction);
        let mut rec = scene.hit(self.inner, &local, ray_t, rng)?;
        rec.p += self.offset;
        Some(rec)
    }

    pub fn bounds(&self, scene: &Scene) -> Option<Aabb> {
        scene.bounds(self.inner).map(|b| b.translate(self.offset))
    }
}

/// Another primitive rotated about an axis through the world origin.
///
/// The box is computed once from the rotated corners of the inner box, so it
/// is looser than the true rotated extent.
#[derive(Debug, Clone)]
pub struct Rotation {
    inner: PrimitiveId,
    rotation: AxisRotation,
    bbox: Option<Aabb>,
}

impl Rotation {
    /// `degrees` about `axis` (normalized here), right-handed.
    pub fn new(scene: &Scene, inner: PrimitiveId, axis: Vec3, degrees: f32) -> Self {
        let rotation = AxisRotation::from_degrees(axis, degrees);
        let bbox = scene.bounds(inner).map(|b| rotation.rotate_aabb(&b));
        Self {
            inner,
            rotation,
            bbox,
        }
    }

    pub fn inner(&self) -> PrimitiveId {
        self.inner
    }

    pub fn rotation(&self) -> AxisRotation {
        self.rotation
    }

    pub fn hit(
        &self,
        scene: &Scene,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        let inverse = self.rotation.inverse();
        let local = Ray::new(inverse.rotate(ray.origin), inverse.rotate(ray.direction));

        // Rotation preserves length, so `t` carries over unchanged.
        let mut rec = scene.hit(self.inner, &local, ray_t, rng)?;
        rec.p = self.rotation.rotate(rec.p);
        rec.normal = self.rotation.rotate(rec.normal);
        Some(rec)
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bbox
    }
}
