//! The closed set of intersectable things.

use crate::{
    Bvh, ConstantMedium, Cube, Cylinder, HitRecord, Mesh, Rectangle, Rotation, Scene, Sphere,
    Translation, Triangle,
};
use prism_math::{Aabb, Interval, Ray};
use rand::RngCore;

/// Every primitive the scene arena can hold.
///
/// Composite variants refer to other primitives by id and resolve them
/// through the [`Scene`] at query time.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
    Rectangle(Rectangle),
    Cube(Cube),
    Cylinder(Cylinder),
    Mesh(Mesh),
    ConstantMedium(ConstantMedium),
    Translation(Translation),
    Rotation(Rotation),
    Bvh(Bvh),
}

impl Primitive {
    /// Closest intersection with `t` strictly inside `ray_t`.
    ///
    /// Only media consume randomness; every other variant is deterministic.
    pub fn hit(
        &self,
        scene: &Scene,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t),
            Primitive::Triangle(t) => t.hit(ray, ray_t),
            Primitive::Rectangle(r) => r.hit(ray, ray_t),
            Primitive::Cube(c) => c.hit(ray, ray_t),
            Primitive::Cylinder(c) => c.hit(ray, ray_t),
            Primitive::Mesh(m) => m.hit(scene, ray, ray_t, rng),
            Primitive::ConstantMedium(m) => m.hit(scene, ray, ray_t, rng),
            Primitive::Translation(t) => t.hit(scene, ray, ray_t, rng),
            Primitive::Rotation(r) => r.hit(scene, ray, ray_t, rng),
            Primitive::Bvh(b) => b.hit(scene, ray, ray_t, rng),
        }
    }

    /// Conservative world-space box, `None` when unbounded or empty.
    pub fn bounds(&self, scene: &Scene) -> Option<Aabb> {
        match self {
            Primitive::Sphere(s) => Some(s.bounds()),
            Primitive::Triangle(t) => Some(t.bounds()),
            Primitive::Rectangle(r) => Some(r.bounds()),
            Primitive::Cube(c) => Some(c.bounds()),
            Primitive::Cylinder(c) => Some(c.bounds()),
            Primitive::Mesh(m) => m.bounds(),
            Primitive::ConstantMedium(m) => m.bounds(scene),
            Primitive::Translation(t) => t.bounds(scene),
            Primitive::Rotation(r) => r.bounds(),
            Primitive::Bvh(b) => b.bounds(),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Primitive {
                fn from(value: $variant) -> Self {
                    Primitive::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive!(
    Sphere,
    Triangle,
    Rectangle,
    Cube,
    Cylinder,
    Mesh,
    ConstantMedium,
    Translation,
    Rotation,
    Bvh,
);
