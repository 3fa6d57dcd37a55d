//! Primitive and material arena.
//!
//! Everything that can be hit or shaded lives in one [`Scene`] and is
//! referred to by index. Composite primitives (meshes, transforms, media and
//! BVHs) hold ids of other primitives, which lets one triangle belong to a
//! mesh hierarchy and the world hierarchy at the same time.

use crate::{
    Bvh, ConstantMedium, HitRecord, Isotropic, Material, MaterialId, Mesh, Primitive, PrimitiveId,
    SceneError, SceneResult, Triangle,
};
use prism_core::{MeshData, Texture};
use prism_math::{Aabb, Interval, Ray};
use rand::RngCore;

#[derive(Debug, Clone, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    root: Option<PrimitiveId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, primitive: impl Into<Primitive>) -> PrimitiveId {
        self.primitives.push(primitive.into());
        PrimitiveId(self.primitives.len() - 1)
    }

    pub fn add_material(&mut self, material: impl Into<Material>) -> MaterialId {
        self.materials.push(material.into());
        MaterialId(self.materials.len() - 1)
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(id.0)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Closest hit on one primitive. Unknown ids never hit.
    pub fn hit(
        &self,
        id: PrimitiveId,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        self.primitives.get(id.0)?.hit(self, ray, ray_t, rng)
    }

    pub fn bounds(&self, id: PrimitiveId) -> Option<Aabb> {
        self.primitives.get(id.0)?.bounds(self)
    }

    /// Build a BVH over `ids` with default parameters and add it.
    pub fn add_bvh(&mut self, ids: impl IntoIterator<Item = PrimitiveId>) -> PrimitiveId {
        let mut bvh = Bvh::default();
        bvh.insert_all(ids);
        bvh.build(self);
        self.add(bvh)
    }

    /// Add every triangle of `data` plus the mesh that groups them.
    pub fn add_mesh(&mut self, data: &MeshData, material: MaterialId) -> PrimitiveId {
        let triangles: Vec<PrimitiveId> = data
            .iter_triangles()
            .map(|([a, b, c], normals)| {
                self.add(Triangle::with_normals(a, b, c, normals, Some(material)))
            })
            .collect();

        log::debug!(
            "Added mesh: {} vertices, {} triangles",
            data.vertex_count(),
            triangles.len()
        );

        let mesh = Mesh::new(self, triangles);
        self.add(mesh)
    }

    /// Fill `boundary` with fog of the given density and albedo.
    pub fn add_medium(
        &mut self,
        boundary: PrimitiveId,
        density: f32,
        albedo: impl Into<Texture>,
    ) -> PrimitiveId {
        let phase = self.add_material(Isotropic::new(albedo));
        self.add(ConstantMedium::new(boundary, density, phase))
    }

    /// Recenter and rescale a mesh so it fits the unit sphere, then rebuild
    /// its BVH.
    ///
    /// Boxes of hierarchies that already contain the mesh's triangles are not
    /// updated; normalize before building them.
    pub fn normalize_mesh(&mut self, id: PrimitiveId) -> SceneResult<()> {
        let (triangles, bounds, max_leaf_size, max_depth) = match self.primitives.get(id.0) {
            Some(Primitive::Mesh(mesh)) => (
                mesh.triangles.clone(),
                mesh.bounds(),
                mesh.bvh.max_leaf_size(),
                mesh.bvh.max_depth(),
            ),
            Some(_) => return Err(SceneError::NotAMesh(id)),
            None => return Err(SceneError::UnknownPrimitive(id)),
        };

        let Some(bounds) = bounds else {
            return Ok(());
        };
        let center = bounds.centroid();
        let radius = (bounds.max() - bounds.min()).length() / 2.0;
        if radius <= 0.0 {
            return Ok(());
        }

        for tri_id in &triangles {
            if let Some(Primitive::Triangle(tri)) = self.primitives.get_mut(tri_id.0) {
                tri.p1 = (tri.p1 - center) / radius;
                tri.p2 = (tri.p2 - center) / radius;
                tri.p3 = (tri.p3 - center) / radius;
            }
        }

        let mut bvh = Bvh::new(max_leaf_size, max_depth);
        bvh.insert_all(triangles.iter().copied());
        bvh.build(self);

        if let Some(Primitive::Mesh(mesh)) = self.primitives.get_mut(id.0) {
            mesh.bvh = bvh;
        }

        log::debug!(
            "Normalized mesh {:?}: center {:?}, radius {}",
            id,
            center,
            radius
        );
        Ok(())
    }

    pub fn set_root(&mut self, id: PrimitiveId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<PrimitiveId> {
        self.root
    }

    /// Closest hit against the root primitive; nothing hits without a root.
    pub fn hit_root(
        &self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        self.hit(self.root?, ray, ray_t, rng)
    }
}
