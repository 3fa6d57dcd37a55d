use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box built from one interval per axis.
///
/// `Aabb::EMPTY` has min = +inf and max = -inf on every axis, so it is the
/// identity for [`Aabb::surrounding`] and contains no point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };

    /// Box from three intervals, padded so no axis is thinner than 1e-4.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Box spanning two opposite corners given in any order.
    ///
    /// Planar primitives (axis-aligned rectangles, flat triangles) produce a
    /// zero-width axis here; it is padded so the slab test can still hit it.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(
            Interval::new(a.x.min(b.x), a.x.max(b.x)),
            Interval::new(a.y.min(b.y), a.y.max(b.y)),
            Interval::new(a.z.min(b.z), a.z.max(b.z)),
        )
    }

    /// Grow the box to include `point`.
    pub fn extend(&mut self, point: Vec3) {
        self.x = Interval::new(self.x.min.min(point.x), self.x.max.max(point.x));
        self.y = Interval::new(self.y.min.min(point.y), self.y.max.max(point.y));
        self.z = Interval::new(self.z.min.min(point.z), self.z.max.max(point.z));
    }

    /// Union of two boxes.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Interval for axis `n` (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// True until at least one point has been added.
    pub fn is_empty(&self) -> bool {
        self.x.min > self.x.max || self.y.min > self.y.max || self.z.min > self.z.max
    }

    /// The eight corners, ordered by the bits of the index (x, y, z).
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min(), self.max());
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        })
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// True if `other` lies entirely inside this box. The empty box is
    /// contained by everything.
    pub fn contains(&self, other: &Aabb) -> bool {
        other.is_empty() || (self.contains_point(other.min()) && self.contains_point(other.max()))
    }

    /// Slab test against the open parameter range `ray_t`.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let origin = r.origin[axis];

            let mut t0 = (slab.min - origin) * adinv;
            let mut t1 = (slab.max - origin) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }
        true
    }

    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }

    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb::new(
            self.x.offset(offset.x),
            self.y.offset(offset.y),
            self.z.offset(offset.z),
        )
    }

    /// Index (0=X, 1=Y, 2=Z) of the widest axis.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_point(rng: &mut StdRng) -> Vec3 {
        Vec3::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
        )
    }

    fn random_box(rng: &mut StdRng) -> Aabb {
        let a = random_point(rng);
        let b = random_point(rng);
        Aabb::from_points(a, b)
    }

    fn random_point_in(rng: &mut StdRng, b: &Aabb) -> Vec3 {
        let (lo, hi) = (b.min(), b.max());
        Vec3::new(
            rng.gen_range(lo.x..=hi.x),
            rng.gen_range(lo.y..=hi.y),
            rng.gen_range(lo.z..=hi.z),
        )
    }

    #[test]
    fn test_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));

        assert_eq!(aabb.min(), Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(aabb.max(), Vec3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_flat_box_is_padded() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        assert!(aabb.z.size() > 0.0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(aabb.hit(&ray, Interval::new(0.001, f32::INFINITY)));
    }

    #[test]
    fn test_extend_from_empty() {
        let mut aabb = Aabb::EMPTY;
        assert!(aabb.is_empty());

        aabb.extend(Vec3::new(1.0, 2.0, 3.0));
        aabb.extend(Vec3::new(-1.0, 0.0, 4.0));

        assert!(!aabb.is_empty());
        assert_eq!(aabb.min(), Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(aabb.max(), Vec3::new(1.0, 2.0, 4.0));
    }

    #[test]
    fn test_union_with_empty_is_identity() {
        let a = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(2.0));
        assert_eq!(Aabb::surrounding(&a, &Aabb::EMPTY), a);
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &a), a);
    }

    #[test]
    fn test_union_contains_both_inputs() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let a = random_box(&mut rng);
            let b = random_box(&mut rng);
            let ab = Aabb::surrounding(&a, &b);

            assert!(ab.contains(&a));
            assert!(ab.contains(&b));
            for _ in 0..8 {
                assert!(ab.contains_point(random_point_in(&mut rng, &a)));
                assert!(ab.contains_point(random_point_in(&mut rng, &b)));
            }
        }
    }

    #[test]
    fn test_union_commutative_and_associative() {
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            let a = random_box(&mut rng);
            let b = random_box(&mut rng);
            let c = random_box(&mut rng);

            assert_eq!(Aabb::surrounding(&a, &b), Aabb::surrounding(&b, &a));
            assert_eq!(
                Aabb::surrounding(&Aabb::surrounding(&a, &b), &c),
                Aabb::surrounding(&a, &Aabb::surrounding(&b, &c))
            );
        }
    }

    #[test]
    fn test_slab_hit_and_miss() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let t = Interval::new(0.001, f32::INFINITY);

        let toward = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let away = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        let beside = Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::Z);
        let inside = Ray::new(Vec3::ZERO, Vec3::new(0.3, -0.2, 1.0));

        assert!(aabb.hit(&toward, t));
        assert!(!aabb.hit(&away, t));
        assert!(!aabb.hit(&beside, t));
        assert!(aabb.hit(&inside, t));
        // Box lies beyond the allowed range.
        assert!(!aabb.hit(&toward, Interval::new(0.001, 3.0)));
    }

    #[test]
    fn test_corners_and_axes() {
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 1.0, 2.0));
        let corners = aabb.corners();

        assert_eq!(corners[0], aabb.min());
        assert_eq!(corners[7], aabb.max());
        assert!(corners.iter().all(|c| aabb.contains_point(*c)));
        assert_eq!(aabb.longest_axis(), 0);
        assert_eq!(aabb.centroid(), Vec3::new(2.0, 0.5, 1.0));
        assert_eq!(aabb.translate(Vec3::ONE).min(), Vec3::ONE);
    }
}
