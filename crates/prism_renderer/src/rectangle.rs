//! Rectangles (two triangles sharing a diagonal) and boxes built from them.

use crate::{HitRecord, MaterialId, Triangle};
use prism_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// A planar quad. Its face normal is `normalize(right × up)`.
#[derive(Debug, Clone)]
pub struct Rectangle {
    position: Vec3,
    first: Triangle,
    second: Triangle,
}

impl Rectangle {
    /// Quad centered at `position` spanning `±right` and `±up` (half extents).
    pub fn new(position: Vec3, right: Vec3, up: Vec3, material: Option<MaterialId>) -> Self {
        let tex = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
        ];
        Self::from_frame(position, right, up, tex, material)
    }

    /// Quad in the XY plane facing +Z, `width` by `height` in size.
    pub fn axis_aligned(
        position: Vec3,
        width: f32,
        height: f32,
        material: Option<MaterialId>,
    ) -> Self {
        let right = Vec3::new(width / 2.0, 0.0, 0.0);
        let up = Vec3::new(0.0, height / 2.0, 0.0);
        let tex = [
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ];
        Self::from_frame(position, right, up, tex, material)
    }

    fn from_frame(
        position: Vec3,
        right: Vec3,
        up: Vec3,
        tex: [Vec2; 4],
        material: Option<MaterialId>,
    ) -> Self {
        let p1 = position - right + up;
        let p2 = position - right - up;
        let p3 = position + right + up;
        let p4 = position + right - up;

        let first = Triangle::new(p1, p2, p3, material).with_tex_coords([tex[0], tex[1], tex[2]]);
        let second = Triangle::with_normals(p3, p2, p4, first.normals, material)
            .with_tex_coords([tex[2], tex[1], tex[3]]);

        Self {
            position,
            first,
            second,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn normal(&self) -> Vec3 {
        self.first.normals[0]
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let hit = HitRecord::closer(self.first.hit(ray, ray_t), self.second.hit(ray, ray_t));
        hit.map(|rec| HitRecord {
            lp: rec.p - self.position,
            ..rec
        })
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::surrounding(&self.first.bounds(), &self.second.bounds())
    }
}

/// Axis-aligned box made of six material-less rectangles.
///
/// Faces point outward, or inward when `invert` is set (a room or light box
/// seen from inside). Hits report the cube's own material.
#[derive(Debug, Clone)]
pub struct Cube {
    position: Vec3,
    faces: [Rectangle; 6],
    material: MaterialId,
}

impl Cube {
    pub fn new(position: Vec3, size: Vec3, material: MaterialId, invert: bool) -> Self {
        let dx = Vec3::new(size.x / 2.0, 0.0, 0.0);
        let dy = Vec3::new(0.0, size.y / 2.0, 0.0);
        let dz = Vec3::new(0.0, 0.0, size.z / 2.0);
        let p = position;

        let faces = if invert {
            [
                Rectangle::new(p + dx, dz, dy, None),
                Rectangle::new(p - dx, -dz, dy, None),
                Rectangle::new(p + dy, dx, dz, None),
                Rectangle::new(p - dy, dx, -dz, None),
                Rectangle::new(p + dz, -dx, dy, None),
                Rectangle::new(p - dz, dx, dy, None),
            ]
        } else {
            [
                Rectangle::new(p + dx, -dz, dy, None),
                Rectangle::new(p - dx, dz, dy, None),
                Rectangle::new(p + dy, dx, -dz, None),
                Rectangle::new(p - dy, dx, dz, None),
                Rectangle::new(p + dz, dx, dy, None),
                Rectangle::new(p - dz, -dx, dy, None),
            ]
        };

        Self {
            position,
            faces,
            material,
        }
    }

    pub fn faces(&self) -> &[Rectangle; 6] {
        &self.faces
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let hit = self
            .faces
            .iter()
            .map(|face| face.hit(ray, ray_t))
            .fold(None, HitRecord::closer)?;

        Some(HitRecord {
            lp: hit.p - self.position,
            material: Some(self.material),
            ..hit
        })
    }

    pub fn bounds(&self) -> Aabb {
        self.faces
            .iter()
            .fold(Aabb::EMPTY, |acc, face| Aabb::surrounding(&acc, &face.bounds()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Interval = Interval::new(0.001, f32::INFINITY);

    #[test]
    fn test_rectangle_normal_and_hit() {
        let rect = Rectangle::new(Vec3::new(0.0, 0.0, -2.0), Vec3::X, Vec3::Y, Some(MaterialId(0)));
        assert!((rect.normal() - Vec3::Z).length() < 1e-6);

        // Both halves of the diagonal are covered.
        for x in [-0.9, 0.9] {
            for y in [-0.9, 0.9] {
                let ray = Ray::new(Vec3::new(x, y, 0.0), Vec3::new(0.0, 0.0, -1.0));
                let rec = rect.hit(&ray, T).unwrap();
                assert!((rec.t - 2.0).abs() < 1e-5);
                assert!((rec.lp - Vec3::new(x, y, 0.0)).length() < 1e-5);
            }
        }

        let outside = Ray::new(Vec3::new(1.1, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(rect.hit(&outside, T).is_none());
    }

    #[test]
    fn test_rectangle_tex_coords() {
        let rect = Rectangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, None);

        // p1 = (-1, 1) carries (0, 0); p4 = (1, -1) carries (1, 1).
        let near_p1 = Ray::new(Vec3::new(-0.99, 0.99, 1.0), -Vec3::Z);
        let rec = rect.hit(&near_p1, T).unwrap();
        assert!(rec.u < 0.01 && rec.v < 0.01);

        let near_p4 = Ray::new(Vec3::new(0.99, -0.99, 1.0), -Vec3::Z);
        let rec = rect.hit(&near_p4, T).unwrap();
        assert!(rec.u > 0.99 && rec.v > 0.99);
    }

    #[test]
    fn test_axis_aligned_faces_plus_z() {
        let rect = Rectangle::axis_aligned(Vec3::ZERO, 4.0, 2.0, None);
        assert!((rect.normal() - Vec3::Z).length() < 1e-6);

        let b = rect.bounds();
        assert_eq!(b.x.max, 2.0);
        assert_eq!(b.y.min, -1.0);
    }

    #[test]
    fn test_cube_faces_outward() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let cube = Cube::new(center, Vec3::new(2.0, 4.0, 6.0), MaterialId(5), false);
        for face in cube.faces() {
            let outward = (face.position() - center).normalize();
            assert!((face.normal() - outward).length() < 1e-5);
        }

        let inverted = Cube::new(Vec3::ZERO, Vec3::ONE, MaterialId(5), true);
        for face in inverted.faces() {
            assert!(face.normal().dot(face.position()) < 0.0);
        }
    }

    #[test]
    fn test_cube_hit_reports_own_material() {
        let cube = Cube::new(Vec3::ZERO, Vec3::splat(2.0), MaterialId(7), false);
        let ray = Ray::new(Vec3::new(0.2, 0.1, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = cube.hit(&ray, T).unwrap();

        assert!((rec.t - 4.0).abs() < 1e-5);
        assert_eq!(rec.material, Some(MaterialId(7)));
        assert!((rec.normal - Vec3::Z).length() < 1e-5);

        // Faces are flat, so the box carries their padding.
        let b = cube.bounds();
        assert!((b.min() - Vec3::splat(-1.0)).abs().max_element() < 1e-3);
        assert!((b.max() - Vec3::splat(1.0)).abs().max_element() < 1e-3);
    }
}
