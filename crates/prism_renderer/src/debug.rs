//! Inspection view of a scene.
//!
//! Rebuilds a scene as wireframes and renders it from a second camera beside
//! the first: the world's bounds, the top levels of its BVH, the render
//! camera's image plane and a grid of traced camera paths. The view is an
//! ordinary [`Scene`], meant for the [`Direct`](crate::Integrator::Direct)
//! integrator.

use crate::sampling::gen_f32;
use crate::{
    Camera, Color, Cylinder, Dielectric, Lambertian, MaterialId, Primitive, PrimitiveId,
    RenderConfig, Scene, Sphere, RAY_EPSILON,
};
use prism_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Radius of the sphere marking the render camera.
const CAMERA_MARKER_RADIUS: f32 = 0.25;
const BOUNDS_RADIUS: f32 = 0.01;
const BVH_RADIUS: f32 = 0.005;
const IMAGE_PLANE_RADIUS: f32 = 0.005;
const PATH_RADIUS: f32 = 0.001;

/// How far a path that escapes the scene is drawn past its last point.
const ESCAPE_LENGTH: f32 = 10.0;

/// Field of view of the inspection camera, in degrees.
const VIEW_FOV: f32 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugOptions {
    /// Paths are traced on a `grid` by `grid` lattice of pixels
    pub grid: u32,
    /// Paths per lattice pixel
    pub samples: u32,
    /// BVH levels drawn, root included
    pub bvh_levels: usize,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            grid: 40,
            samples: 1,
            bvh_levels: 3,
        }
    }
}

/// Wireframe scene plus the camera that looks at it.
#[derive(Debug, Clone)]
pub struct DebugView {
    pub scene: Scene,
    pub camera: Camera,
}

impl DebugView {
    /// Build the view of `world` as seen through `camera`.
    ///
    /// Paths are traced with `config.max_depth` and sampled on the lattice
    /// of a `config.width` by `config.height` image.
    pub fn build(
        world: &Scene,
        camera: &Camera,
        config: &RenderConfig,
        options: &DebugOptions,
        rng: &mut dyn RngCore,
    ) -> Self {
        let mut scene = Scene::new();
        let mut ids = Vec::new();

        let blue = scene.add_material(Lambertian::new(Color::new(0.0, 0.0, 1.0)));
        ids.push(scene.add(Sphere::new(camera.position(), CAMERA_MARKER_RADIUS, blue)));

        let world_root = world.root();
        let bounds = world_root.and_then(|id| world.bounds(id)).map(|mut b| {
            b.extend(camera.position());
            b
        });

        if let Some(bounds) = bounds {
            let white = scene.add_material(Lambertian::new(Color::ONE));
            add_box_edges(&mut scene, &mut ids, &bounds, BOUNDS_RADIUS, white);
        }

        if let Some(Primitive::Bvh(bvh)) = world_root.and_then(|id| world.primitive(id)) {
            let green = scene.add_material(Lambertian::new(Color::new(0.1, 0.8, 0.2)));
            for node in bvh.node_bounds(options.bvh_levels) {
                add_box_edges(&mut scene, &mut ids, &node, BVH_RADIUS, green);
            }
        }

        let yellow = scene.add_material(Lambertian::new(Color::new(0.9, 0.8, 0.1)));
        let origin = camera.image_plane_origin();
        let (x, y) = (camera.image_plane_xaxis(), camera.image_plane_yaxis());
        let outline = [origin, origin + x, origin + x + y, origin + y, origin];
        for pair in outline.windows(2) {
            ids.extend(segment(&mut scene, pair[0], pair[1], IMAGE_PLANE_RADIUS, yellow));
        }

        let red = scene.add_material(Dielectric::new(1.0).with_tint(Color::new(1.0, 0.0, 0.0)));
        let mut paths = 0;
        let step_x = (config.width / options.grid.max(1)).max(1) as usize;
        let step_y = (config.height / options.grid.max(1)).max(1) as usize;
        for py in (0..config.height).step_by(step_y) {
            for px in (0..config.width).step_by(step_x) {
                for _ in 0..options.samples.max(1) {
                    let s = (px as f32 + gen_f32(rng)) / config.width as f32;
                    let t = (py as f32 + gen_f32(rng)) / config.height as f32;
                    let ray = camera.get_ray(s, t, rng);
                    let points = path_points(world, &ray, config.max_depth, rng);
                    for pair in points.windows(2) {
                        ids.extend(segment(&mut scene, pair[0], pair[1], PATH_RADIUS, red));
                    }
                    paths += 1;
                }
            }
        }

        log::info!("Debug view: {} paths, {} primitives", paths, scene.primitive_count());

        let root = scene.add_bvh(ids);
        scene.set_root(root);

        let camera = match bounds {
            Some(bounds) => side_camera(camera, &bounds, config.aspect_ratio()),
            None => camera.clone(),
        };
        Self { scene, camera }
    }
}

/// Vertices of one path through `world`, starting at the ray origin.
///
/// A path ends at the first surface that absorbs it, at the depth limit, or
/// [`ESCAPE_LENGTH`] past its last vertex when it leaves the scene.
pub fn path_points(
    world: &Scene,
    ray: &Ray,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> Vec<Vec3> {
    let ray_t = Interval::new(RAY_EPSILON, f32::INFINITY);
    let mut points = vec![ray.origin];
    let mut ray = *ray;

    for depth in 0..=max_depth {
        let Some(rec) = world.hit_root(&ray, ray_t, rng) else {
            points.push(ray.origin + ray.direction.normalize_or_zero() * ESCAPE_LENGTH);
            break;
        };
        points.push(rec.p);
        if depth == max_depth {
            break;
        }

        let material = rec.material.and_then(|id| world.material(id));
        match material.and_then(|m| m.scatter(&ray, &rec, rng)) {
            Some(result) => ray = result.scattered,
            None => break,
        }
    }

    points
}

/// Camera off to the right of `camera`'s view, far enough back to frame
/// `bounds`.
fn side_camera(camera: &Camera, bounds: &Aabb, aspect: f32) -> Camera {
    let plane_center = camera.image_plane_origin()
        + 0.5 * (camera.image_plane_xaxis() + camera.image_plane_yaxis());
    let view = (plane_center - camera.position()).normalize_or_zero();

    let mut side = view.cross(Vec3::Y).normalize_or_zero();
    if side == Vec3::ZERO {
        side = Vec3::X;
    }

    let center = bounds.centroid();
    let extent = (bounds.max() - bounds.min()).length().max(1.0);
    Camera::new(center + extent * side, center, Vec3::Y, VIEW_FOV, aspect)
}

fn add_box_edges(
    scene: &mut Scene,
    ids: &mut Vec<PrimitiveId>,
    bbox: &Aabb,
    radius: f32,
    material: MaterialId,
) {
    let origin = bbox.min();
    let size = bbox.max() - origin;
    let x = Vec3::new(size.x, 0.0, 0.0);
    let y = Vec3::new(0.0, size.y, 0.0);
    let z = Vec3::new(0.0, 0.0, size.z);

    let edges = [
        (origin, origin + x),
        (origin + x, origin + x + y),
        (origin + x + y, origin + y),
        (origin + y, origin),
        (origin + z, origin + z + x),
        (origin + z + x, origin + z + x + y),
        (origin + z + x + y, origin + z + y),
        (origin + z + y, origin + z),
        (origin, origin + z),
        (origin + x, origin + x + z),
        (origin + x + y, origin + x + y + z),
        (origin + y, origin + y + z),
    ];
    for (a, b) in edges {
        ids.extend(segment(scene, a, b, radius, material));
    }
}

/// Thin cylinder from `a` to `b`; `None` for a zero-length segment.
fn segment(
    scene: &mut Scene,
    a: Vec3,
    b: Vec3,
    radius: f32,
    material: MaterialId,
) -> Option<PrimitiveId> {
    if (b - a).length_squared() < 1e-12 {
        return None;
    }
    Some(scene.add(Cylinder::new(a, b, radius, material)))
}
