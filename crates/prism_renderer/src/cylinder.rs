//! Capped cylinder between two points.

use crate::{HitRecord, MaterialId};
use prism_math::{Aabb, Interval, Ray, Vec3};
use std::f32::consts::PI;

const EPSILON: f32 = 1e-6;

/// Solid cylinder from `p1` to `p2`: a lateral surface plus two disk caps.
#[derive(Debug, Clone)]
pub struct Cylinder {
    p1: Vec3,
    p2: Vec3,
    radius: f32,
    material: MaterialId,
    // Local frame; `axis_z` points from p1 to p2.
    axis_x: Vec3,
    axis_y: Vec3,
    axis_z: Vec3,
    length: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Surface {
    Lateral,
    BottomCap,
    TopCap,
}

impl Cylinder {
    pub fn new(p1: Vec3, p2: Vec3, radius: f32, material: MaterialId) -> Self {
        let axis_z = (p2 - p1).normalize_or_zero();
        let up = if axis_z.dot(Vec3::Y).abs() > 1.0 - EPSILON {
            Vec3::new(0.0, 0.0, -1.0)
        } else {
            Vec3::Y
        };
        let axis_x = up.cross(axis_z).normalize_or_zero();
        let axis_y = axis_z.cross(axis_x);

        Self {
            p1,
            p2,
            radius,
            material,
            axis_x,
            axis_y,
            axis_z,
            length: (p2 - p1).length(),
        }
    }

    fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.axis_x), v.dot(self.axis_y), v.dot(self.axis_z))
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let o = self.to_local(ray.origin - self.p1);
        let d = self.to_local(ray.direction);
        let r2 = self.radius * self.radius;

        let mut best: Option<(f32, Surface)> = None;
        let mut consider = |t: f32, surface: Surface| {
            if ray_t.surrounds(t) && best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, surface));
            }
        };

        // Lateral surface: x² + y² = r², restricted to 0 <= z <= length.
        let a = d.x * d.x + d.y * d.y;
        if a > EPSILON {
            let half_b = o.x * d.x + o.y * d.y;
            let c = o.x * o.x + o.y * o.y - r2;
            let discriminant = half_b * half_b - a * c;
            if discriminant > 0.0 {
                let sqrtd = discriminant.sqrt();
                for t in [(-half_b - sqrtd) / a, (-half_b + sqrtd) / a] {
                    let z = o.z + t * d.z;
                    if (0.0..=self.length).contains(&z) {
                        consider(t, Surface::Lateral);
                    }
                }
            }
        }

        // Caps: planes z = 0 and z = length, inside the radius.
        if d.z.abs() > EPSILON {
            for (z, surface) in [(0.0, Surface::BottomCap), (self.length, Surface::TopCap)] {
                let t = (z - o.z) / d.z;
                let x = o.x + t * d.x;
                let y = o.y + t * d.y;
                if x * x + y * y < r2 {
                    consider(t, surface);
                }
            }
        }

        let (t, surface) = best?;
        let p = ray.at(t);
        let normal = match surface {
            Surface::Lateral => {
                let on_axis = self.p1 + (p - self.p1).dot(self.axis_z) * self.axis_z;
                (p - on_axis).normalize_or_zero()
            }
            Surface::BottomCap => -self.axis_z,
            Surface::TopCap => self.axis_z,
        };
        let (u, v) = self.tex_coords(p);

        Some(HitRecord {
            t,
            p,
            lp: p - self.p1,
            normal,
            u,
            v,
            material: Some(self.material),
        })
    }

    /// Angle around the axis and normalized distance from `p2`.
    fn tex_coords(&self, p: Vec3) -> (f32, f32) {
        let local = self.to_local(p - self.p1);
        let theta = local.y.atan2(local.x) + PI;
        let v = if self.length > 0.0 {
            (p - self.p2).dot(self.axis_z).abs() / self.length
        } else {
            0.0
        };
        (theta / (2.0 * PI), v)
    }

    /// Exact box of the two cap disks.
    pub fn bounds(&self) -> Aabb {
        let a = self.p2 - self.p1;
        let aa = a.dot(a).max(f32::MIN_POSITIVE);
        let e = self.radius * (Vec3::ONE - a * a / aa).max(Vec3::ZERO).powf(0.5);
        Aabb::from_points((self.p1 - e).min(self.p2 - e), (self.p1 + e).max(self.p2 + e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Interval = Interval::new(0.001, f32::INFINITY);

    fn upright() -> Cylinder {
        Cylinder::new(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), 0.5, MaterialId(3))
    }

    #[test]
    fn test_lateral_hit() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = upright().hit(&ray, T).unwrap();

        assert!((rec.t - 4.5).abs() < 1e-4);
        assert!((rec.normal - Vec3::Z).length() < 1e-4);
        assert!((rec.v - 0.5).abs() < 1e-4);
        assert_eq!(rec.lp, rec.p);
    }

    #[test]
    fn test_cap_hits() {
        let down = Ray::new(Vec3::new(0.1, 5.0, 0.1), Vec3::new(0.0, -1.0, 0.0));
        let rec = upright().hit(&down, T).unwrap();
        assert!((rec.t - 3.0).abs() < 1e-4);
        assert!((rec.normal - Vec3::Y).length() < 1e-5);

        let up = Ray::new(Vec3::new(0.1, -5.0, 0.1), Vec3::Y);
        let rec = upright().hit(&up, T).unwrap();
        assert!((rec.t - 5.0).abs() < 1e-4);
        assert!((rec.normal + Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_misses_beyond_ends() {
        let above = Ray::new(Vec3::new(0.0, 2.5, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(upright().hit(&above, T).is_none());

        let wide = Ray::new(Vec3::new(0.6, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(upright().hit(&wide, T).is_none());
    }

    #[test]
    fn test_from_inside_hits_wall() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        let rec = upright().hit(&ray, T).unwrap();
        assert!((rec.t - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_bounds_contain_surface() {
        let (p1, p2) = (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let cyl = Cylinder::new(p1, p2, 0.3, MaterialId(0));
        let b = cyl.bounds();
        let loose = Aabb::new(b.x.expand(1e-4), b.y.expand(1e-4), b.z.expand(1e-4));

        for i in 0..64 {
            let angle = i as f32 / 64.0 * 2.0 * PI;
            for end in [cyl.p1, cyl.p2] {
                let rim = end + cyl.radius * (angle.cos() * cyl.axis_x + angle.sin() * cyl.axis_y);
                assert!(loose.contains_point(rim), "rim point {rim} outside {b:?}");
            }
        }

        let axis_aligned = upright().bounds();
        assert!((axis_aligned.x.max - 0.5).abs() < 1e-5);
        assert!((axis_aligned.y.max - 2.0).abs() < 1e-5);
    }
}
