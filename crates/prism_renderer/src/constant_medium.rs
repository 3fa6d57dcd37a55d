//! Homogeneous participating media.

use crate::sampling::gen_f32;
use crate::{HitRecord, MaterialId, PrimitiveId, Scene};
use prism_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Fog of constant density filling a closed boundary primitive.
///
/// A ray crossing the boundary travels an exponentially distributed free path
/// before scattering; if the path outlasts the boundary the ray passes
/// through untouched. Each query consumes one random draw.
#[derive(Debug, Clone)]
pub struct ConstantMedium {
    boundary: PrimitiveId,
    density: f32,
    phase: MaterialId,
}

impl ConstantMedium {
    /// `phase` should be an isotropic material; see [`Scene::add_medium`].
    pub fn new(boundary: PrimitiveId, density: f32, phase: MaterialId) -> Self {
        Self {
            boundary,
            density,
            phase,
        }
    }

    pub fn boundary(&self) -> PrimitiveId {
        self.boundary
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn hit(
        &self,
        scene: &Scene,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        // Entry and exit along the whole line, then clip to the query range.
        let entry = scene.hit(self.boundary, ray, Interval::UNIVERSE, rng)?;
        let exit = scene.hit(
            self.boundary,
            ray,
            Interval::new(entry.t + 1e-4, f32::INFINITY),
            rng,
        )?;

        let mut t1 = entry.t.max(ray_t.min);
        let t2 = exit.t.min(ray_t.max);
        if t1 >= t2 {
            return None;
        }
        t1 = t1.max(0.0);

        let ray_length = ray.direction.length();
        let distance_inside = (t2 - t1) * ray_length;
        let hit_distance = -(1.0 - gen_f32(rng)).ln() / self.density;
        if hit_distance > distance_inside {
            return None;
        }

        let t = t1 + hit_distance / ray_length;
        Some(HitRecord {
            t,
            p: ray.at(t),
            lp: entry.lp,
            // Arbitrary; the isotropic phase function ignores it.
            normal: Vec3::X,
            u: entry.u,
            v: entry.v,
            material: Some(self.phase),
        })
    }

    pub fn bounds(&self, scene: &Scene) -> Option<Aabb> {
        scene.bounds(self.boundary)
    }
}
