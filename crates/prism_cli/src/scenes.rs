//! Built-in scenes.

use crate::settings::{RenderSettings, Tracer};
use anyhow::{bail, Context, Result};
use prism_core::{ImageTexture, MeshData, Texture};
use prism_renderer::{
    Camera, Color, CookTorrance, Cube, Cylinder, DebugOptions, DebugView, Dielectric,
    DiffuseLight, Lambertian, Metal, NormalMaterial, PrimitiveId, Rectangle, RenderConfig,
    Rotation, Scene, Sphere, Translation, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SCENE_NAMES: [&str; 4] = ["cornell", "spheres", "volumes", "mesh"];

/// Everything a render needs besides the output path.
pub struct SceneSetup {
    pub scene: Scene,
    pub camera: Camera,
    pub config: RenderConfig,
}

pub fn build(name: &str, settings: &RenderSettings) -> Result<SceneSetup> {
    let setup = match name {
        "cornell" => cornell(settings)?,
        "spheres" => spheres(settings),
        "volumes" => volumes(settings),
        "mesh" => mesh(settings)?,
        other => bail!(
            "unknown scene '{}', expected one of: {}",
            other,
            SCENE_NAMES.join(", ")
        ),
    };

    log::info!(
        "Built scene '{}': {} primitives, {} materials",
        name,
        setup.scene.primitive_count(),
        setup.scene.material_count()
    );

    Ok(match settings.tracer {
        Tracer::Debug => debug_view(setup, settings),
        Tracer::Path | Tracer::Direct => setup,
    })
}

/// Replace a built scene by its wireframe inspection view.
fn debug_view(setup: SceneSetup, settings: &RenderSettings) -> SceneSetup {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let view = DebugView::build(
        &setup.scene,
        &setup.camera,
        &setup.config,
        &DebugOptions::default(),
        &mut rng,
    );
    SceneSetup {
        scene: view.scene,
        camera: view.camera,
        config: RenderConfig {
            use_sky_gradient: false,
            background: Color::splat(0.05),
            ..setup.config
        },
    }
}

fn camera(
    settings: &RenderSettings,
    config: &RenderConfig,
    from: Vec3,
    at: Vec3,
    vfov: f32,
) -> Camera {
    Camera::new(from, at, Vec3::Y, vfov, config.aspect_ratio()).with_aperture(settings.aperture)
}

fn finish(mut scene: Scene, ids: Vec<PrimitiveId>) -> Scene {
    let world = scene.add_bvh(ids);
    scene.set_root(world);
    scene
}

/// Closed box lit by a ceiling panel, open toward the camera.
fn cornell(settings: &RenderSettings) -> Result<SceneSetup> {
    let config = settings.render_config();
    let mut scene = Scene::new();

    let white = scene.add_material(Lambertian::new(Color::splat(0.73)));
    let red = scene.add_material(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let green = scene.add_material(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light = scene.add_material(DiffuseLight::new(Color::splat(15.0)));

    let albedo: Texture = match &settings.texture {
        Some(path) => ImageTexture::load(path)
            .with_context(|| format!("failed to load texture {}", path.display()))?
            .into(),
        None => Texture::solid(0.8, 0.6, 0.2),
    };
    let textured = scene.add_material(Lambertian::new(albedo));
    let glass = scene.add_material(Dielectric::new(1.5));
    let mirror = scene.add_material(Metal::new(Color::new(0.8, 0.85, 0.88)).with_fuzz(0.05));

    // Walls face into the box.
    let ids = vec![
        scene.add(Rectangle::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::NEG_Z, Vec3::Y, Some(red))),
        scene.add(Rectangle::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Z, Vec3::Y, Some(green))),
        scene.add(Rectangle::new(Vec3::new(0.0, -1.0, 0.0), Vec3::X, Vec3::NEG_Z, Some(white))),
        scene.add(Rectangle::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X, Vec3::Z, Some(white))),
        scene.add(Rectangle::new(Vec3::new(0.0, 0.0, -1.0), Vec3::X, Vec3::Y, Some(white))),
        scene.add(Rectangle::new(
            Vec3::new(0.0, 0.998, 0.0),
            Vec3::X * 0.25,
            Vec3::Z * 0.25,
            Some(light),
        )),
        scene.add(Sphere::new(Vec3::new(-0.45, -0.6, -0.35), 0.4, textured)),
        scene.add(Sphere::new(Vec3::new(0.45, -0.65, 0.25), 0.35, glass)),
        scene.add(Sphere::new(Vec3::new(-0.05, -0.8, 0.5), 0.2, mirror)),
    ];

    let camera = camera(settings, &config, Vec3::new(0.0, 0.0, 3.4), Vec3::ZERO, 40.0);
    Ok(SceneSetup {
        scene: finish(scene, ids),
        camera,
        config,
    })
}

/// Field of small random spheres around three large ones, under the sky.
fn spheres(settings: &RenderSettings) -> SceneSetup {
    let config = RenderConfig {
        use_sky_gradient: true,
        ..settings.render_config()
    };
    let mut scene = Scene::new();
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut ids = Vec::new();

    let ground = scene.add_material(Lambertian::new(Color::splat(0.5)));
    ids.push(scene.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground)));

    for a in -6..6 {
        for b in -6..6 {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let color = Color::new(rng.gen(), rng.gen(), rng.gen());
            let material = match rng.gen_range(0..10) {
                0..=4 => scene.add_material(Lambertian::new(color * color)),
                5 | 6 => scene.add_material(
                    Metal::new((color + Color::ONE) * 0.5).with_fuzz(rng.gen_range(0.0..0.5)),
                ),
                7 => scene.add_material(Dielectric::new(1.5)),
                8 => scene.add_material(CookTorrance::new(
                    color,
                    rng.gen(),
                    0.5,
                    rng.gen_range(0.05..0.8),
                )),
                _ => scene.add_material(NormalMaterial),
            };
            ids.push(scene.add(Sphere::new(center, 0.2, material)));
        }
    }

    let glass = scene.add_material(Dielectric::new(1.5));
    let matte = scene.add_material(Lambertian::new(Color::new(0.4, 0.2, 0.1)));
    let mirror = scene.add_material(Metal::new(Color::new(0.7, 0.6, 0.5)));
    ids.push(scene.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass)));
    ids.push(scene.add(Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 1.0, matte)));
    ids.push(scene.add(Sphere::new(Vec3::new(4.0, 1.0, 0.0), 1.0, mirror)));

    let camera = camera(settings, &config, Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, 20.0);
    SceneSetup {
        scene: finish(scene, ids),
        camera,
        config,
    }
}

/// Smoke and fog inside a dimly glowing room.
fn volumes(settings: &RenderSettings) -> SceneSetup {
    let config = settings.render_config();
    let mut scene = Scene::new();
    let mut ids = Vec::new();

    // The room itself emits, facing inward.
    let glow = scene.add_material(DiffuseLight::new(Color::splat(0.6)));
    let room = Cube::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(30.0, 14.0, 30.0), glow, true);
    ids.push(scene.add(room));

    let floor = scene.add_material(Lambertian::new(Color::splat(0.6)));
    let floor = Rectangle::new(Vec3::ZERO, Vec3::X * 9.0, Vec3::NEG_Z * 9.0, Some(floor));
    ids.push(scene.add(floor));

    let lamp = scene.add_material(DiffuseLight::new(Color::new(8.0, 7.0, 6.0)));
    let lamp = Rectangle::new(Vec3::new(0.0, 6.0, 0.0), Vec3::X * 1.5, Vec3::Z * 1.5, Some(lamp));
    ids.push(scene.add(lamp));

    // Smoke in a turned box.
    let shell = scene.add_material(Lambertian::new(Color::ONE));
    let cube = scene.add(Cube::new(Vec3::ZERO, Vec3::new(1.6, 2.4, 1.6), shell, false));
    let turned = Rotation::new(&scene, cube, Vec3::Y, 25.0);
    let turned = scene.add(turned);
    let placed = scene.add(Translation::new(turned, Vec3::new(-2.2, 1.2, 0.0)));
    ids.push(scene.add_medium(placed, 1.2, Color::splat(0.85)));

    // Blue fog inside a glass ball.
    let glass = scene.add_material(Dielectric::new(1.5));
    let ball = Sphere::new(Vec3::new(2.2, 1.0, 0.5), 1.0, glass);
    ids.push(scene.add(ball.clone()));
    let inner = scene.add(ball);
    ids.push(scene.add_medium(inner, 0.8, Color::new(0.2, 0.4, 0.9)));

    let brass = scene.add_material(Metal::new(Color::new(0.8, 0.6, 0.3)).with_fuzz(0.2));
    let post = Cylinder::new(Vec3::new(0.0, 0.0, -1.5), Vec3::new(0.0, 1.8, -1.5), 0.45, brass);
    ids.push(scene.add(post));

    for i in 0..4 {
        let roughness = 0.1 + 0.25 * i as f32;
        let surface = CookTorrance::new(Color::new(0.9, 0.5, 0.4), 0.8, 0.3, roughness);
        let material = scene.add_material(surface);
        let x = -1.5 + i as f32;
        ids.push(scene.add(Sphere::new(Vec3::new(x, 0.35, 2.2), 0.35, material)));
    }

    let from = Vec3::new(0.0, 3.0, 11.0);
    let camera = camera(settings, &config, from, Vec3::new(0.0, 1.0, 0.0), 35.0);
    SceneSetup {
        scene: finish(scene, ids),
        camera,
        config,
    }
}

/// An OBJ model, normalized to the unit sphere and set on a floor.
fn mesh(settings: &RenderSettings) -> Result<SceneSetup> {
    let Some(path) = &settings.mesh else {
        bail!("the mesh scene needs a \"mesh\" path in the settings file");
    };
    let data = MeshData::load_obj(path, false)
        .with_context(|| format!("failed to load mesh {}", path.display()))?;

    let config = RenderConfig {
        use_sky_gradient: true,
        ..settings.render_config()
    };
    let mut scene = Scene::new();

    let surface = CookTorrance::new(Color::new(0.75, 0.75, 0.8), 0.3, 0.6, 0.35);
    let surface = scene.add_material(surface);
    let model = scene.add_mesh(&data, surface);
    scene.normalize_mesh(model)?;
    let lifted = scene.add(Translation::new(model, Vec3::Y));

    let floor = scene.add_material(Lambertian::new(Color::splat(0.5)));
    let ground = Rectangle::new(Vec3::ZERO, Vec3::X * 10.0, Vec3::NEG_Z * 10.0, Some(floor));
    let ground = scene.add(ground);

    let from = Vec3::new(0.0, 1.6, 4.0);
    let camera = camera(settings, &config, from, Vec3::new(0.0, 1.0, 0.0), 40.0);
    Ok(SceneSetup {
        scene: finish(scene, vec![lifted, ground]),
        camera,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_renderer::{trace, Integrator, Ray};

    fn small() -> RenderSettings {
        RenderSettings {
            width: 16,
            height: 12,
            samples: 1,
            max_depth: 3,
            ..RenderSettings::default()
        }
    }

    #[test]
    fn test_builtin_scenes_build() {
        for name in ["cornell", "spheres", "volumes"] {
            let setup = build(name, &small()).unwrap();
            let root = setup.scene.root().expect("scene has a root");
            assert!(setup.scene.bounds(root).is_some());
        }
    }

    #[test]
    fn test_unknown_scene() {
        let err = build("teapot-party", &small()).err().unwrap();
        assert!(err.to_string().contains("unknown scene"));
    }

    #[test]
    fn test_mesh_scene_requires_path() {
        assert!(build("mesh", &small()).is_err());

        let settings = RenderSettings {
            mesh: Some("/no/such/model.obj".into()),
            ..small()
        };
        let err = build("mesh", &settings).err().unwrap();
        assert!(format!("{err:#}").contains("failed to load mesh"));
    }

    #[test]
    fn test_missing_texture_aborts() {
        let settings = RenderSettings {
            texture: Some("/no/such/texture.png".into()),
            ..small()
        };
        assert!(build("cornell", &settings).is_err());
    }

    #[test]
    fn test_cornell_light_is_visible() {
        let setup = build("cornell", &small()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let color = trace(&ray, &setup.scene, 0, &setup.config, &mut rng);
        assert!(color.min_element() >= 15.0);
    }

    #[test]
    fn test_debug_tracer_views_from_the_side() {
        let path = build("cornell", &small()).unwrap();
        let settings = RenderSettings {
            tracer: Tracer::Debug,
            ..small()
        };
        let debug = build("cornell", &settings).unwrap();

        assert_eq!(debug.config.integrator, Integrator::Direct);
        assert!(!debug.config.use_sky_gradient);
        assert_ne!(debug.camera.position(), path.camera.position());

        // The inspection scene wraps the render camera and its paths.
        let root = debug.scene.root().unwrap();
        let bounds = debug.scene.bounds(root).unwrap();
        assert!(bounds.contains_point(path.camera.position()));
        assert!(debug.scene.primitive_count() > path.scene.primitive_count());
    }
}
