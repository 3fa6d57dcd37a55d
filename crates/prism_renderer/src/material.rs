//! Surface and volume materials.
//!
//! A material turns a hit into an attenuation plus a scattered ray, or
//! absorbs the path. Only lights emit. Materials are immutable once built and
//! shared by every primitive that references them through a [`MaterialId`].
//!
//! [`MaterialId`]: crate::MaterialId

use crate::brdf::CookTorrance;
use crate::sampling::{gen_f32, random_in_unit_sphere, random_unit_vector};
use crate::HitRecord;
use prism_core::{Color, Texture};
use prism_math::{Ray, Vec3};
use rand::RngCore;

/// Outcome of a successful scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// Closed set of materials, dispatched by `match`.
#[derive(Debug, Clone)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
    DiffuseLight(DiffuseLight),
    Isotropic(Isotropic),
    CookTorrance(CookTorrance),
    Normal(NormalMaterial),
}

impl Material {
    /// Scatter an incoming ray, or `None` if the path is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match self {
            Material::Lambertian(m) => Some(m.scatter(rec, rng)),
            Material::Metal(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => Some(m.scatter(ray_in, rec, rng)),
            Material::DiffuseLight(_) => None,
            Material::Isotropic(m) => Some(m.scatter(rec, rng)),
            Material::CookTorrance(m) => Some(m.scatter(ray_in, rec, rng)),
            Material::Normal(m) => Some(m.scatter(rec, rng)),
        }
    }

    /// Light emitted at a hit. Black for everything but lights.
    pub fn emitted(&self, u: f32, v: f32, lp: Vec3) -> Color {
        match self {
            Material::DiffuseLight(light) => light.emit.value(u, v, lp),
            _ => Color::ZERO,
        }
    }
}

/// Direction of the classic diffuse bounce: toward a random point in the
/// unit sphere sitting on the normal.
fn diffuse_direction(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let direction = normal + random_in_unit_sphere(rng);
    if direction.length_squared() < 1e-12 {
        normal
    } else {
        direction.normalize()
    }
}

/// Ideal diffuse reflector.
#[derive(Debug, Clone)]
pub struct Lambertian {
    pub albedo: Texture,
}

impl Lambertian {
    pub fn new(albedo: impl Into<Texture>) -> Self {
        Self {
            albedo: albedo.into(),
        }
    }

    fn scatter(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> ScatterResult {
        ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.lp),
            scattered: Ray::new(rec.p, diffuse_direction(rec.normal, rng)),
        }
    }
}

/// Mirror, optionally blurred by `fuzz`.
#[derive(Debug, Clone)]
pub struct Metal {
    pub albedo: Texture,
    pub fuzz: f32,
}

impl Metal {
    /// Ideal mirror.
    pub fn new(albedo: impl Into<Texture>) -> Self {
        Self {
            albedo: albedo.into(),
            fuzz: 0.0,
        }
    }

    /// `fuzz` in `[0, 1]`; 0 is a perfect mirror.
    pub fn with_fuzz(mut self, fuzz: f32) -> Self {
        self.fuzz = fuzz.clamp(0.0, 1.0);
        self
    }

    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut direction = reflect(ray_in.direction.normalize(), rec.normal);
        if self.fuzz > 0.0 {
            direction += self.fuzz * random_in_unit_sphere(rng);
        }

        // Reflections into the surface are absorbed.
        if direction.dot(rec.normal) <= 0.0 {
            return None;
        }
        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.lp),
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Refractive material such as glass or water, optionally tinted.
#[derive(Debug, Clone)]
pub struct Dielectric {
    pub ior: f32,
    pub tint: Texture,
}

impl Dielectric {
    pub fn new(ior: f32) -> Self {
        Self {
            ior,
            tint: Texture::Constant(Color::ONE),
        }
    }

    pub fn with_tint(mut self, tint: impl Into<Texture>) -> Self {
        self.tint = tint.into();
        self
    }

    /// Never absorbs: when refraction is impossible the ray reflects.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> ScatterResult {
        let dir = ray_in.direction;
        let d_dot_n = dir.dot(rec.normal);
        let reflected = reflect(dir, rec.normal);

        // Leaving the medium when the ray travels along the normal.
        let (outward_normal, ratio, cosine) = if d_dot_n > 0.0 {
            (-rec.normal, self.ior, self.ior * d_dot_n / dir.length())
        } else {
            (rec.normal, 1.0 / self.ior, -d_dot_n / dir.length())
        };

        let direction = match refract(dir, outward_normal, ratio) {
            Some(refracted) if gen_f32(rng) >= schlick(cosine, self.ior) => refracted,
            _ => reflected,
        };

        ScatterResult {
            attenuation: self.tint.value(rec.u, rec.v, rec.lp),
            scattered: Ray::new(rec.p, direction),
        }
    }
}

/// Area light; emits its texture and never scatters.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    pub emit: Texture,
}

impl DiffuseLight {
    pub fn new(emit: impl Into<Texture>) -> Self {
        Self { emit: emit.into() }
    }
}

/// Phase function of participating media: scatters uniformly.
#[derive(Debug, Clone)]
pub struct Isotropic {
    pub albedo: Texture,
}

impl Isotropic {
    pub fn new(albedo: impl Into<Texture>) -> Self {
        Self {
            albedo: albedo.into(),
        }
    }

    fn scatter(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> ScatterResult {
        ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.lp),
            scattered: Ray::new(rec.p, random_unit_vector(rng)),
        }
    }
}

/// Debug material that colors surfaces by their normal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalMaterial;

impl NormalMaterial {
    fn scatter(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> ScatterResult {
        ScatterResult {
            attenuation: (rec.normal + Vec3::ONE) * 0.5,
            scattered: Ray::new(rec.p, diffuse_direction(rec.normal, rng)),
        }
    }
}

impl From<Lambertian> for Material {
    fn from(m: Lambertian) -> Self {
        Material::Lambertian(m)
    }
}

impl From<Metal> for Material {
    fn from(m: Metal) -> Self {
        Material::Metal(m)
    }
}

impl From<Dielectric> for Material {
    fn from(m: Dielectric) -> Self {
        Material::Dielectric(m)
    }
}

impl From<DiffuseLight> for Material {
    fn from(m: DiffuseLight) -> Self {
        Material::DiffuseLight(m)
    }
}

impl From<Isotropic> for Material {
    fn from(m: Isotropic) -> Self {
        Material::Isotropic(m)
    }
}

impl From<CookTorrance> for Material {
    fn from(m: CookTorrance) -> Self {
        Material::CookTorrance(m)
    }
}

impl From<NormalMaterial> for Material {
    fn from(m: NormalMaterial) -> Self {
        Material::Normal(m)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Snell refraction of `v` through a surface with normal `n` facing the
/// incoming side. `None` on total internal reflection.
pub fn refract(v: Vec3, n: Vec3, ratio: f32) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ratio * ratio * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ratio * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}

/// Schlick's approximation of Fresnel reflectance.
pub fn schlick(cosine: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
