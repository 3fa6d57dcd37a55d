//! Camera for ray generation.

use crate::sampling::random_in_unit_disk;
use prism_math::{Ray, Vec3};
use rand::RngCore;

/// Pinhole camera, or thin-lens camera once an aperture is set.
///
/// Rays are addressed by image-plane coordinates `(s, t)` in `[0, 1]²`
/// measured from the upper-left corner, `t` growing downward.
#[derive(Debug, Clone)]
pub struct Camera {
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    half_width: f32,
    half_height: f32,
    lens_radius: f32,
    focus_dist: f32,

    // Derived by update()
    u: Vec3,
    v: Vec3,
    w: Vec3,
    upper_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
}

impl Camera {
    /// `vfov` is the vertical field of view in degrees; `aspect` is width
    /// over height.
    pub fn new(look_from: Vec3, look_at: Vec3, vup: Vec3, vfov: f32, aspect: f32) -> Self {
        let half_height = (vfov.to_radians() / 2.0).tan();
        let mut camera = Self {
            look_from,
            look_at,
            vup,
            half_width: aspect * half_height,
            half_height,
            lens_radius: 0.0,
            focus_dist: 1.0,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            upper_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
        };
        camera.update();
        camera
    }

    /// Thin lens of diameter `aperture`, focused on the look-at point.
    pub fn with_aperture(mut self, aperture: f32) -> Self {
        self.lens_radius = aperture / 2.0;
        self.focus_dist = if aperture > 0.0 {
            (self.look_at - self.look_from).length()
        } else {
            1.0
        };
        self.update();
        self
    }

    pub fn set_position(&mut self, look_from: Vec3) {
        self.look_from = look_from;
        self.update();
    }

    pub fn set_look_at(&mut self, look_at: Vec3) {
        self.look_at = look_at;
        self.update();
    }

    fn update(&mut self) {
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        let d = self.focus_dist;
        self.upper_left = self.look_from - self.half_width * d * self.u
            + self.half_height * d * self.v
            - d * self.w;
        self.horizontal = 2.0 * self.half_width * d * self.u;
        self.vertical = -2.0 * self.half_height * d * self.v;
    }

    /// Ray through image-plane point `(s, t)`.
    ///
    /// Only a thin-lens camera draws from `rng`.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let target = self.upper_left + s * self.horizontal + t * self.vertical;
        let origin = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.look_from + self.u * rd.x + self.v * rd.y
        } else {
            self.look_from
        };
        Ray::new(origin, target - origin)
    }

    pub fn position(&self) -> Vec3 {
        self.look_from
    }

    pub fn image_plane_origin(&self) -> Vec3 {
        self.upper_left
    }

    pub fn image_plane_xaxis(&self) -> Vec3 {
        self.horizontal
    }

    pub fn image_plane_yaxis(&self) -> Vec3 {
        self.vertical
    }

    pub fn image_plane_width(&self) -> f32 {
        2.0 * self.half_width
    }

    pub fn image_plane_height(&self) -> f32 {
        2.0 * self.half_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn looking_down_z() -> Camera {
        Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y, 90.0, 2.0)
    }

    #[test]
    fn test_camera_basis() {
        let camera = looking_down_z();
        assert_eq!(camera.position(), Vec3::ZERO);
        assert!((camera.w - Vec3::Z).length() < 1e-6);
        assert!((camera.u - Vec3::X).length() < 1e-6);
        assert!((camera.v - Vec3::Y).length() < 1e-6);
        assert!((camera.image_plane_height() - 2.0).abs() < 1e-5);
        assert!((camera.image_plane_width() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_camera_ray_corners() {
        let camera = looking_down_z();
        let mut rng = StdRng::seed_from_u64(42);

        let center = camera.get_ray(0.5, 0.5, &mut rng);
        assert!((center.direction.normalize() - Vec3::NEG_Z).length() < 1e-5);

        let upper_left = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((upper_left.direction - Vec3::new(-2.0, 1.0, -1.0)).length() < 1e-5);
        assert_eq!(upper_left.direction, camera.image_plane_origin());

        let lower_right = camera.get_ray(1.0, 1.0, &mut rng);
        assert!((lower_right.direction - Vec3::new(2.0, -1.0, -1.0)).length() < 1e-5);
        assert!((camera.image_plane_xaxis() - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
        assert!((camera.image_plane_yaxis() - Vec3::new(0.0, -2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_thin_lens_focus() {
        let look_at = Vec3::new(0.0, 0.0, -5.0);
        let camera = Camera::new(Vec3::ZERO, look_at, Vec3::Y, 40.0, 1.0).with_aperture(0.5);
        let mut rng = StdRng::seed_from_u64(3);

        let mut spread = 0.0f32;
        for _ in 0..100 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            assert!(ray.origin.length() <= 0.25 + 1e-5);
            // Every lens sample converges on the focus point.
            assert!((ray.at(1.0) - look_at).length() < 1e-4);
            spread = spread.max(ray.origin.length());
        }
        assert!(spread > 0.0);
    }
}
