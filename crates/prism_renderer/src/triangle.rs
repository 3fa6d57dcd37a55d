//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{HitRecord, MaterialId};
use prism_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// Determinants below this are treated as rays parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A triangle with per-vertex normals and texture coordinates.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
    pub normals: [Vec3; 3],
    pub tex_coords: [Vec2; 3],
    pub material: Option<MaterialId>,
}

impl Triangle {
    /// Flat-shaded triangle; every vertex gets the face normal of the
    /// counter-clockwise winding `p1, p2, p3`.
    pub fn new(p1: Vec3, p2: Vec3, p3: Vec3, material: Option<MaterialId>) -> Self {
        let n = (p2 - p1).cross(p3 - p1).normalize_or_zero();
        Self::with_normals(p1, p2, p3, [n; 3], material)
    }

    /// Smooth-shaded triangle with explicit vertex normals.
    pub fn with_normals(
        p1: Vec3,
        p2: Vec3,
        p3: Vec3,
        normals: [Vec3; 3],
        material: Option<MaterialId>,
    ) -> Self {
        Self {
            p1,
            p2,
            p3,
            normals,
            tex_coords: [Vec2::ZERO, Vec2::X, Vec2::Y],
            material,
        }
    }

    pub fn with_tex_coords(mut self, tex_coords: [Vec2; 3]) -> Self {
        self.tex_coords = tex_coords;
        self
    }

    pub fn centroid(&self) -> Vec3 {
        (self.p1 + self.p2 + self.p3) / 3.0
    }

    /// Barycentric weights `(w1, w2, w3)` of `x` with respect to the
    /// vertices, from signed sub-triangle areas. They sum to one.
    pub fn barycentric(&self, x: Vec3) -> Vec3 {
        let vn = (self.p2 - self.p1).cross(self.p3 - self.p1);
        let area = vn.length();
        let n = vn / area;

        let w1 = (self.p3 - self.p2).cross(x - self.p2).dot(n) / area;
        let w2 = (x - self.p3).cross(self.p3 - self.p1).dot(n) / area;
        Vec3::new(w1, w2, 1.0 - w1 - w2)
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let edge1 = self.p2 - self.p1;
        let edge2 = self.p3 - self.p1;

        let pvec = ray.direction.cross(edge2);
        let det = edge1.dot(pvec);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin - self.p1;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(edge1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(qvec) * inv_det;
        if !ray_t.surrounds(t) {
            return None;
        }

        let w = 1.0 - u - v;
        let [n1, n2, n3] = self.normals;
        let [t1, t2, t3] = self.tex_coords;
        let normal = (w * n1 + u * n2 + v * n3).normalize_or_zero();
        let uv = w * t1 + u * t2 + v * t3;

        Some(HitRecord {
            t,
            p: ray.at(t),
            lp: self.centroid(),
            normal,
            u: uv.x,
            v: uv.y,
            material: self.material,
        })
    }

    pub fn bounds(&self) -> Aabb {
        let mut bbox = Aabb::EMPTY;
        bbox.extend(self.p1);
        bbox.extend(self.p2);
        bbox.extend(self.p3);
        // Rebuild through from_points so flat triangles get padded.
        Aabb::from_points(bbox.min(), bbox.max())
    }
}
