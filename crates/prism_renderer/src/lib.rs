//! prism renderer - CPU path tracing
//!
//! A Monte Carlo path tracer over an arena of primitives and materials.
//! Primitives and materials are closed enums addressed by index, every
//! stochastic operation takes the caller's random stream, and images are
//! rendered in parallel buckets.

mod brdf;
mod bucket;
mod bvh;
mod camera;
mod constant_medium;
mod cylinder;
mod debug;
mod error;
mod hittable;
mod material;
mod mesh;
mod primitive;
mod rectangle;
mod renderer;
mod scene;
mod sphere;
mod transform;
mod triangle;

pub mod sampling;

pub use brdf::CookTorrance;
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhStats, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LEAF_SIZE};
pub use camera::Camera;
pub use constant_medium::ConstantMedium;
pub use cylinder::Cylinder;
pub use debug::{path_points, DebugOptions, DebugView};
pub use error::{SceneError, SceneResult};
pub use hittable::{HitRecord, MaterialId, PrimitiveId};
pub use material::{
    reflect, refract, schlick, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal,
    NormalMaterial, ScatterResult,
};
pub use mesh::Mesh;
pub use primitive::Primitive;
pub use rectangle::{Cube, Rectangle};
pub use renderer::{
    linear_to_gamma, render, render_pixel, render_serial, sky_gradient, trace, trace_direct,
    ImageBuffer, Integrator, RenderConfig, RAY_EPSILON,
};
pub use scene::Scene;
pub use sphere::Sphere;
pub use transform::{Rotation, Translation};
pub use triangle::Triangle;

pub use prism_core::{Color, Texture};
pub use prism_math::{Aabb, Interval, Ray, Vec2, Vec3};
