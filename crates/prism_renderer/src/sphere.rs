//! Sphere primitive for ray tracing.

use crate::{HitRecord, MaterialId};
use prism_math::{Aabb, Interval, Ray, Vec3};
use std::f32::consts::PI;

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: MaterialId,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: MaterialId) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Spherical texture coordinates of a unit direction from the center.
    fn sphere_uv(d: Vec3) -> (f32, f32) {
        let theta = d.x.atan2(d.z) + PI;
        let phi = d.y.clamp(-1.0, 1.0).acos();
        (theta / (2.0 * PI), phi / PI)
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant <= 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Nearest root first, the far one only if the near one is out of range.
        let mut root = (-half_b - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (-half_b + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let local = p - self.center;
        let normal = local / self.radius;
        let (u, v) = Self::sphere_uv(normal);

        Some(HitRecord {
            t: root,
            p,
            lp: local,
            normal,
            u,
            v,
            material: Some(self.material),
        })
    }

    pub fn bounds(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center - rvec, self.center + rvec)
    }
}
