//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing bounded by a maximum depth
//! - A single-bounce direct estimator for quick previews
//! - Box-filtered anti-aliasing via jittered multi-sampling
//! - Gamma correction (gamma 2.0)
//! - Parallel bucket rendering with per-bucket random streams

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::sampling::gen_f32;
use crate::{Camera, Color, Ray, Scene};
use prism_math::Interval;
use rand::RngCore;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Smallest ray parameter accepted for a hit; keeps secondary rays from
/// re-hitting the surface they leave.
pub const RAY_EPSILON: f32 = 0.001;

/// How a camera ray is turned into radiance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Integrator {
    /// Recursive path tracing, see [`trace`].
    #[default]
    PathTrace,
    /// One bounce of emission plus attenuation, see [`trace_direct`].
    Direct,
}

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Depth at which paths stop scattering
    pub max_depth: u32,
    /// Background color when a ray escapes
    pub background: Color,
    /// Use the sky gradient instead of `background`
    pub use_sky_gradient: bool,
    /// Base seed for the per-bucket random streams
    pub seed: u64,
    pub bucket_size: u32,
    pub integrator: Integrator,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            use_sky_gradient: false,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
            integrator: Integrator::PathTrace,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Radiance arriving along `ray`.
///
/// A path stops when it escapes, is absorbed, or reaches `config.max_depth`;
/// at the depth limit only emission counts.
pub fn trace(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = scene.hit_root(ray, Interval::new(RAY_EPSILON, f32::INFINITY), rng) else {
        return escaped(ray, config);
    };

    // Faces without a material absorb everything.
    let Some(material) = rec.material.and_then(|id| scene.material(id)) else {
        return Color::ZERO;
    };

    let emitted = material.emitted(rec.u, rec.v, rec.lp);
    if depth >= config.max_depth {
        return emitted;
    }

    match material.scatter(ray, &rec, rng) {
        Some(result) => {
            emitted + result.attenuation * trace(&result.scattered, scene, depth + 1, config, rng)
        }
        None => emitted,
    }
}

/// Emission plus the first scatter's attenuation, without recursion.
///
/// Flat-shades every surface by its albedo, which is enough to check
/// geometry and materials at a fraction of the cost of [`trace`].
pub fn trace_direct(
    ray: &Ray,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = scene.hit_root(ray, Interval::new(RAY_EPSILON, f32::INFINITY), rng) else {
        return escaped(ray, config);
    };
    let Some(material) = rec.material.and_then(|id| scene.material(id)) else {
        return Color::ZERO;
    };

    let emitted = material.emitted(rec.u, rec.v, rec.lp);
    match material.scatter(ray, &rec, rng) {
        Some(result) => emitted + result.attenuation,
        None => emitted,
    }
}

fn escaped(ray: &Ray, config: &RenderConfig) -> Color {
    if config.use_sky_gradient {
        sky_gradient(ray)
    } else {
        config.background
    }
}

/// White at the horizon fading to light blue overhead.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction.normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Gamma-encoded estimate for pixel `(x, y)`, `(0, 0)` being top-left.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let s = (x as f32 + gen_f32(rng)) / config.width as f32;
        let t = (y as f32 + gen_f32(rng)) / config.height as f32;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += match config.integrator {
            Integrator::PathTrace => trace(&ray, scene, 0, config, rng),
            Integrator::Direct => trace_direct(&ray, scene, config, rng),
        };
    }

    let average = pixel_color / samples as f32;
    Color::new(
        linear_to_gamma(average.x),
        linear_to_gamma(average.y),
        linear_to_gamma(average.z),
    )
}

/// RGB float image of gamma-encoded colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let i = i as u32;
            self.set(bucket.x + i % bucket.width, bucket.y + i / bucket.width, *color);
        }
    }

    /// Quantize to 8 bits per channel, clamping out-of-range values.
    pub fn to_rgb8(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = self.get(x, y);
            image::Rgb([to_byte(c.x), to_byte(c.y), to_byte(c.z)])
        })
    }

    /// Encode to disk; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_rgb8().save(path)
    }
}

#[inline]
fn to_byte(value: f32) -> u8 {
    (255.0 * value.clamp(0.0, 1.0)).round() as u8
}

/// Render the whole image, buckets in parallel.
///
/// Output is reproducible for a fixed `config.seed`.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let buckets = generate_buckets(config.width, config.height, config.bucket_size);
    log::info!(
        "Rendering {}x{} at {} spp ({:?}), {} buckets on {} threads",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.integrator,
        buckets.len(),
        rayon::current_num_threads()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, camera, scene, config))
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}

/// Render on the calling thread with a caller-supplied random stream.
pub fn render_serial(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> ImageBuffer {
    let mut image = ImageBuffer::new(config.width, config.height);

    for y in 0..config.height {
        for x in 0..config.width {
            let color = render_pixel(camera, scene, x, y, config, rng);
            image.set(x, y, color);
        }
    }

    image
}
