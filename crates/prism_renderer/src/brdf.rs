//! Cook-Torrance microfacet BRDF.
//!
//! Each scatter picks the diffuse lobe with probability `kd` and the
//! specular lobe otherwise. The specular sample is the mirror direction,
//! weighted by the GGX/Smith/Schlick BRDF over its sampling pdf.

use crate::material::{reflect, ScatterResult};
use crate::sampling::{gen_f32, random_in_unit_sphere};
use crate::HitRecord;
use prism_core::{Color, Texture};
use prism_math::{Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Base reflectance of dielectrics at normal incidence.
const DIELECTRIC_F0: f32 = 0.04;

/// Smallest GGX alpha; at zero the distribution collapses to 0/0 at the peak.
const MIN_ALPHA: f32 = 1e-3;

#[derive(Debug, Clone)]
pub struct CookTorrance {
    /// Surface color: diffuse albedo, and specular tint for metals
    pub albedo: Texture,
    /// 0 = dielectric, 1 = metal
    pub metalness: f32,
    /// Probability of taking the diffuse lobe
    pub kd: f32,
    pub roughness: f32,
}

impl CookTorrance {
    pub fn new(albedo: impl Into<Texture>, metalness: f32, kd: f32, roughness: f32) -> Self {
        Self {
            albedo: albedo.into(),
            metalness: metalness.clamp(0.0, 1.0),
            kd: kd.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    pub(crate) fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> ScatterResult {
        let color = self.albedo.value(rec.u, rec.v, rec.lp);

        if gen_f32(rng) <= self.kd {
            let direction = (rec.normal + random_in_unit_sphere(rng)).normalize_or_zero();
            return ScatterResult {
                attenuation: self.kd * color,
                scattered: Ray::new(rec.p, direction),
            };
        }

        let n = rec.normal.normalize();
        let incoming = ray_in.direction.normalize();
        let reflected = reflect(incoming, n);
        ScatterResult {
            attenuation: self.specular_weight(color, n, -incoming, reflected),
            scattered: Ray::new(rec.p, reflected),
        }
    }

    /// BRDF times cosine over pdf of the mirror sample, clamped to [0, 1].
    fn specular_weight(&self, color: Color, n: Vec3, l: Vec3, v: Vec3) -> Color {
        let a = self.roughness.max(MIN_ALPHA);
        let k = a * a / 2.0;
        let h = (l + v).normalize_or_zero();

        let n_dot_l = saturate(n.dot(l));
        let n_dot_h = saturate(n.dot(h));
        let l_dot_h = saturate(l.dot(h));
        let n_dot_v = saturate(n.dot(v));

        let f0 = Color::splat(DIELECTRIC_F0).lerp(color, self.metalness);
        let d = ggx_d(n_dot_h, a);
        let g = smith_g(n_dot_l, n_dot_v, k);
        let f = schlick_fresnel3(f0, l_dot_h);

        let brdf = f * (d * g) / (4.0 * n_dot_l * n_dot_v);
        let pdf = d * n_dot_h / (4.0 * l_dot_h);
        saturate3(brdf / (pdf * (1.0 - self.kd)))
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Clamp to [0, 1]; NaN becomes 0.
#[inline]
fn saturate(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[inline]
fn saturate3(c: Color) -> Color {
    Color::new(saturate(c.x), saturate(c.y), saturate(c.z))
}

/// Schlick weight `(1 - cos_theta)^5`.
#[inline]
fn schlick_weight(cos_theta: f32) -> f32 {
    let x = (1.0 - cos_theta).clamp(0.0, 1.0);
    let x2 = x * x;
    x2 * x2 * x
}

/// Schlick Fresnel approximation.
#[inline]
fn schlick_fresnel3(f0: Color, cos_theta: f32) -> Color {
    f0 + (Color::ONE - f0) * schlick_weight(cos_theta)
}

/// GGX/Trowbridge-Reitz distribution.
#[inline]
fn ggx_d(n_dot_h: f32, alpha: f32) -> f32 {
    let a2 = alpha * alpha;
    let denom = n_dot_h * (a2 * n_dot_h - n_dot_h) + 1.0;
    a2 / (PI * denom * denom)
}

#[inline]
fn schlick_ggx(n_dot_x: f32, k: f32) -> f32 {
    n_dot_x / (n_dot_x * (1.0 - k) + k)
}

/// Smith geometry term from Schlick-GGX for both directions.
#[inline]
fn smith_g(n_dot_l: f32, n_dot_v: f32, k: f32) -> f32 {
    schlick_ggx(n_dot_v, k) * schlick_ggx(n_dot_l, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaterialId;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn hit(normal: Vec3) -> HitRecord {
        HitRecord {
            t: 1.0,
            p: Vec3::ZERO,
            lp: Vec3::ZERO,
            normal,
            u: 0.0,
            v: 0.0,
            material: Some(MaterialId(0)),
        }
    }

    fn random_dir(rng: &mut StdRng) -> Vec3 {
        loop {
            let v = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if v.length_squared() > 1e-4 {
                return v.normalize();
            }
        }
    }

    #[test]
    fn test_attenuation_always_finite_and_clamped() {
        let mut rng = StdRng::seed_from_u64(17);

        for roughness in [0.0, 0.05, 0.5, 1.0] {
            for kd in [0.0, 0.3, 0.9] {
                let mat = CookTorrance::new(Color::new(0.9, 0.6, 0.2), 0.7, kd, roughness);
                for _ in 0..500 {
                    let n = random_dir(&mut rng);
                    let ray = Ray::new(Vec3::ONE, random_dir(&mut rng));
                    let s = mat.scatter(&ray, &hit(n), &mut rng);

                    let c = s.attenuation;
                    assert!(c.is_finite(), "non-finite attenuation {c}");
                    assert!(c.min_element() >= 0.0 && c.max_element() <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_lobe_selection_follows_kd() {
        let mat = CookTorrance::new(Color::ONE, 0.0, 0.25, 0.4);
        let mut rng = StdRng::seed_from_u64(8);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mirror = Vec3::new(1.0, 1.0, 0.0).normalize();

        let trials = 4000;
        let specular = (0..trials)
            .filter(|_| {
                let s = mat.scatter(&ray, &hit(Vec3::Y), &mut rng);
                (s.scattered.direction - mirror).length() < 1e-5
            })
            .count();

        let fraction = specular as f32 / trials as f32;
        assert!((fraction - 0.75).abs() < 0.03, "specular fraction {fraction}");
    }

    #[test]
    fn test_diffuse_lobe_scaled_by_kd() {
        let mat = CookTorrance::new(Color::new(0.8, 0.4, 0.2), 0.0, 1.0, 0.5);
        let mut rng = StdRng::seed_from_u64(9);
        let ray = Ray::new(Vec3::Y, -Vec3::Y);

        let s = mat.scatter(&ray, &hit(Vec3::Y), &mut rng);
        assert_eq!(s.attenuation, Color::new(0.8, 0.4, 0.2));
        assert!(s.scattered.direction.y > 0.0);
    }

    #[test]
    fn test_fresnel_and_distribution() {
        assert!((schlick_weight(1.0) - 0.0).abs() < 1e-6);
        assert!((schlick_weight(0.0) - 1.0).abs() < 1e-6);

        let f0 = Color::splat(DIELECTRIC_F0);
        assert_eq!(schlick_fresnel3(f0, 1.0), f0);

        // Rougher surfaces spread the peak.
        assert!(ggx_d(1.0, 0.2) > ggx_d(1.0, 0.8));
        assert!((smith_g(1.0, 1.0, 0.1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_saturate_maps_nan_to_zero() {
        assert_eq!(saturate(f32::NAN), 0.0);
        assert_eq!(saturate(-2.0), 0.0);
        assert_eq!(saturate(3.0), 1.0);
        assert_eq!(
            saturate3(Color::new(f32::NAN, 0.5, f32::INFINITY)),
            Color::new(0.0, 0.5, 1.0)
        );
    }

    #[test]
    fn test_smooth_metal_reflects() {
        let n = Vec3::Y;
        let incoming = Vec3::new(1.0, -1.0, 0.0).normalize();
        let mirror = reflect(incoming, n);

        let smooth = CookTorrance::new(Color::splat(0.9), 1.0, 0.0, 0.0);
        let nearly = CookTorrance::new(Color::splat(0.9), 1.0, 0.0, 1e-4);
        let c = smooth.specular_weight(Color::splat(0.9), n, -incoming, mirror);
        let reference = nearly.specular_weight(Color::splat(0.9), n, -incoming, mirror);

        assert!(c.min_element() > 0.5, "smooth metal went dark: {c}");
        assert!((c - reference).length() < 1e-3);

        // Through scatter as well; kd = 0 always takes the mirror lobe.
        let mut rng = StdRng::seed_from_u64(3);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), incoming);
        let s = smooth.scatter(&ray, &hit(n), &mut rng);
        assert!(s.attenuation.min_element() > 0.5);
    }
}
