//! Triangle meshes.

use crate::{Bvh, HitRecord, PrimitiveId, Scene};
use prism_math::{Aabb, Interval, Ray};
use rand::RngCore;

/// A group of triangles behind its own BVH.
///
/// The triangles live in the scene arena like any other primitive; the mesh
/// only holds their ids. Build one with [`Scene::add_mesh`].
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) triangles: Vec<PrimitiveId>,
    pub(crate) bvh: Bvh,
}

impl Mesh {
    /// Wrap triangles already in `scene` and build their hierarchy.
    pub fn new(scene: &Scene, triangles: Vec<PrimitiveId>) -> Self {
        let mut bvh = Bvh::default();
        bvh.insert_all(triangles.iter().copied());
        bvh.build(scene);
        Self { triangles, bvh }
    }

    pub fn triangles(&self) -> &[PrimitiveId] {
        &self.triangles
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn hit(
        &self,
        scene: &Scene,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        let mut rec = self.bvh.hit(scene, ray, ray_t, rng)?;
        rec.lp = rec.p;
        Some(rec)
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bvh.bounds()
    }
}
