//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes store primitive ids, not primitives, so the same primitive can sit in
//! several hierarchies (a mesh's own BVH and the world BVH, for example).
//! A built BVH is itself a primitive and can be nested in another one.

use crate::{HitRecord, PrimitiveId, Scene};
use prism_math::{Aabb, Interval, Ray};
use rand::RngCore;

/// Maximum primitives per leaf before splitting.
pub const DEFAULT_MAX_LEAF_SIZE: usize = 10;

/// Recursion cap; deeper nodes become leaves regardless of size.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Binary tree over primitive ids.
#[derive(Debug, Clone)]
pub struct Bvh {
    max_leaf_size: usize,
    max_depth: usize,
    items: Vec<PrimitiveId>,
    root: Option<BvhNode>,
}

#[derive(Debug, Clone)]
enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of primitives.
    Leaf { items: Vec<PrimitiveId>, bbox: Aabb },
}

/// Shape summary of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
    pub primitives: usize,
    pub largest_leaf: usize,
}

impl Default for Bvh {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEAF_SIZE, DEFAULT_MAX_DEPTH)
    }
}

impl Bvh {
    pub fn new(max_leaf_size: usize, max_depth: usize) -> Self {
        Self {
            max_leaf_size: max_leaf_size.max(1),
            max_depth,
            items: Vec::new(),
            root: None,
        }
    }

    pub fn max_leaf_size(&self) -> usize {
        self.max_leaf_size
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Queue a primitive for the next [`build`](Self::build).
    pub fn insert(&mut self, id: PrimitiveId) {
        self.items.push(id);
    }

    pub fn insert_all(&mut self, ids: impl IntoIterator<Item = PrimitiveId>) {
        self.items.extend(ids);
    }

    /// Ids queued or built into this tree.
    pub fn items(&self) -> &[PrimitiveId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Build the tree from the queued ids, replacing any previous tree.
    ///
    /// Unbounded primitives cannot be placed in a box and are skipped.
    pub fn build(&mut self, scene: &Scene) {
        let entries: Vec<(PrimitiveId, Aabb)> = self
            .items
            .iter()
            .filter_map(|&id| match scene.bounds(id) {
                Some(bbox) => Some((id, bbox)),
                None => {
                    log::warn!("Skipping unbounded primitive {:?} in BVH", id);
                    None
                }
            })
            .collect();

        self.root = if entries.is_empty() {
            None
        } else {
            Some(self.create_node(entries, 0))
        };

        let stats = self.stats();
        log::debug!(
            "Built BVH: {} primitives, {} nodes, {} leaves, depth {}",
            stats.primitives,
            stats.nodes,
            stats.leaves,
            stats.depth
        );
    }

    /// Top-down split at the parent box center along its longest axis.
    fn create_node(&self, entries: Vec<(PrimitiveId, Aabb)>, depth: usize) -> BvhNode {
        let bbox = entries
            .iter()
            .fold(Aabb::EMPTY, |acc, (_, b)| Aabb::surrounding(&acc, b));

        if entries.len() <= self.max_leaf_size || depth >= self.max_depth {
            return Self::leaf(entries, bbox);
        }

        let axis = bbox.longest_axis();
        let split = bbox.centroid()[axis];
        let (left, right): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|(_, b)| b.centroid()[axis] < split);

        // Everything fell on one side; splitting again would not shrink the set.
        if left.is_empty() || right.is_empty() {
            let mut all = left;
            all.extend(right);
            return Self::leaf(all, bbox);
        }

        BvhNode::Branch {
            left: Box::new(self.create_node(left, depth + 1)),
            right: Box::new(self.create_node(right, depth + 1)),
            bbox,
        }
    }

    fn leaf(entries: Vec<(PrimitiveId, Aabb)>, bbox: Aabb) -> BvhNode {
        BvhNode::Leaf {
            items: entries.into_iter().map(|(id, _)| id).collect(),
            bbox,
        }
    }

    /// Box of the built tree; `None` before building or when empty.
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(BvhNode::bbox)
    }

    /// Closest hit among the contained primitives within `ray_t`.
    pub fn hit(
        &self,
        scene: &Scene,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        self.root.as_ref()?.hit(scene, ray, ray_t, rng)
    }

    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats::default();
        if let Some(root) = &self.root {
            root.collect_stats(1, &mut stats);
        }
        stats
    }

    /// Boxes of the nodes in the top `levels` levels, depth first from the root.
    pub fn node_bounds(&self, levels: usize) -> Vec<Aabb> {
        let mut boxes = Vec::new();
        if let Some(root) = &self.root {
            root.collect_bounds(levels, &mut boxes);
        }
        boxes
    }
}

impl BvhNode {
    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    fn hit(
        &self,
        scene: &Scene,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        if !self.bbox().hit(ray, ray_t) {
            return None;
        }

        match self {
            BvhNode::Leaf { items, .. } => {
                let mut closest: Option<HitRecord> = None;
                for &id in items {
                    let max = closest.map_or(ray_t.max, |rec| rec.t);
                    if let Some(rec) = scene.hit(id, ray, Interval::new(ray_t.min, max), rng) {
                        closest = Some(rec);
                    }
                }
                closest
            }
            // Both children see the full interval so the result does not
            // depend on which one is visited first.
            BvhNode::Branch { left, right, .. } => HitRecord::closer(
                left.hit(scene, ray, ray_t, rng),
                right.hit(scene, ray, ray_t, rng),
            ),
        }
    }

    fn collect_bounds(&self, levels: usize, boxes: &mut Vec<Aabb>) {
        if levels == 0 {
            return;
        }
        boxes.push(self.bbox());
        if let BvhNode::Branch { left, right, .. } = self {
            left.collect_bounds(levels - 1, boxes);
            right.collect_bounds(levels - 1, boxes);
        }
    }

    fn collect_stats(&self, depth: usize, stats: &mut BvhStats) {
        stats.nodes += 1;
        stats.depth = stats.depth.max(depth);
        match self {
            BvhNode::Leaf { items, .. } => {
                stats.leaves += 1;
                stats.primitives += items.len();
                stats.largest_leaf = stats.largest_leaf.max(items.len());
            }
            BvhNode::Branch { left, right, .. } => {
                left.collect_stats(depth + 1, stats);
                right.collect_stats(depth + 1, stats);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Cube, Cylinder, Lambertian, MaterialId, Rectangle, Rotation, Sphere, Translation, Triangle,
    };
    use prism_core::{Color, MeshData};
    use prism_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const T: Interval = Interval::new(0.001, f32::INFINITY);

    fn random_vec(rng: &mut StdRng, lo: f32, hi: f32) -> Vec3 {
        Vec3::new(rng.gen_range(lo..hi), rng.gen_range(lo..hi), rng.gen_range(lo..hi))
    }

    fn materials(scene: &mut Scene, count: usize) -> Vec<MaterialId> {
        (0..count)
            .map(|i| scene.add_material(Lambertian::new(Color::splat(i as f32 / count as f32))))
            .collect()
    }

    fn pick(rng: &mut StdRng, mats: &[MaterialId]) -> MaterialId {
        mats[rng.gen_range(0..mats.len())]
    }

    /// Closest hit by testing every primitive in turn.
    fn brute_force(
        scene: &Scene,
        ids: &[PrimitiveId],
        ray: &Ray,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;
        for &id in ids {
            let max = closest.map_or(T.max, |rec| rec.t);
            if let Some(rec) = scene.hit(id, ray, Interval::new(T.min, max), rng) {
                closest = Some(rec);
            }
        }
        closest
    }

    fn sphere_field(rng: &mut StdRng) -> (Scene, Vec<PrimitiveId>) {
        let mut scene = Scene::new();
        let mats = materials(&mut scene, 8);
        let ids = (0..300)
            .map(|_| {
                let center = random_vec(rng, -20.0, 20.0);
                let m = pick(rng, &mats);
                scene.add(Sphere::new(center, rng.gen_range(0.2..2.0), m))
            })
            .collect();
        (scene, ids)
    }

    fn triangle_soup(rng: &mut StdRng) -> (Scene, Vec<PrimitiveId>) {
        let mut scene = Scene::new();
        let mats = materials(&mut scene, 8);
        let ids = (0..400)
            .map(|_| {
                let anchor = random_vec(rng, -15.0, 15.0);
                let tri = Triangle::new(
                    anchor,
                    anchor + random_vec(rng, -3.0, 3.0),
                    anchor + random_vec(rng, -3.0, 3.0),
                    Some(pick(rng, &mats)),
                );
                scene.add(tri)
            })
            .collect();
        (scene, ids)
    }

    fn clustered(rng: &mut StdRng) -> (Scene, Vec<PrimitiveId>) {
        let mut scene = Scene::new();
        let mats = materials(&mut scene, 4);
        let mut ids: Vec<PrimitiveId> = (0..60)
            .map(|_| {
                let center = Vec3::new(5.0, 0.0, 0.0) + random_vec(rng, -0.01, 0.01);
                let m = pick(rng, &mats);
                scene.add(Sphere::new(center, 1.0, m))
            })
            .collect();
        // Identical boxes never split; they must still terminate as a leaf.
        for _ in 0..30 {
            ids.push(scene.add(Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 0.5, mats[0])));
        }
        (scene, ids)
    }

    fn mixed(rng: &mut StdRng) -> (Scene, Vec<PrimitiveId>) {
        let mut scene = Scene::new();
        let mats = materials(&mut scene, 6);
        let mut ids = Vec::new();

        for _ in 0..20 {
            let p = random_vec(rng, -10.0, 10.0);
            let m = pick(rng, &mats);
            let (edge1, edge2) = (random_vec(rng, -2.0, 2.0), random_vec(rng, -2.0, 2.0));
            ids.push(scene.add(Rectangle::new(p, edge1, edge2, Some(m))));

            let m = pick(rng, &mats);
            let (center, size) = (random_vec(rng, -10.0, 10.0), random_vec(rng, 0.5, 3.0));
            ids.push(scene.add(Cube::new(center, size, m, rng.gen_bool(0.5))));

            let a = random_vec(rng, -10.0, 10.0);
            let b = a + random_vec(rng, -3.0, 3.0);
            let m = pick(rng, &mats);
            ids.push(scene.add(Cylinder::new(a, b, rng.gen_range(0.2..1.0), m)));
        }

        // A small mesh, placed twice through transforms.
        let positions = vec![
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(0.0, -1.0, -1.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]];
        let data = MeshData::new(positions, faces, false).unwrap();
        let mesh = scene.add_mesh(&data, mats[1]);
        let moved = scene.add(Translation::new(mesh, Vec3::new(3.0, 2.0, -4.0)));
        let turned = Rotation::new(&scene, moved, Vec3::new(0.3, 1.0, 0.2), 40.0);
        ids.push(scene.add(turned));
        ids.push(mesh);

        // A nested BVH holding spheres.
        let inner: Vec<_> = (0..25)
            .map(|_| {
                let m = pick(rng, &mats);
                scene.add(Sphere::new(random_vec(rng, -8.0, 8.0), 0.7, m))
            })
            .collect();
        let mut nested = Bvh::new(2, 50);
        nested.insert_all(inner);
        nested.build(&scene);
        ids.push(scene.add(nested));

        (scene, ids)
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(1234);
        let builders: [fn(&mut StdRng) -> (Scene, Vec<PrimitiveId>); 4] =
            [sphere_field, triangle_soup, clustered, mixed];

        let mut rays = 0;
        let mut hits = 0;
        for build in builders {
            let (scene, ids) = build(&mut rng);
            for leaf_size in [1, 4, DEFAULT_MAX_LEAF_SIZE] {
                let mut bvh = Bvh::new(leaf_size, DEFAULT_MAX_DEPTH);
                bvh.insert_all(ids.iter().copied());
                bvh.build(&scene);

                for _ in 0..1000 {
                    let origin = random_vec(&mut rng, -30.0, 30.0);
                    let target = random_vec(&mut rng, -12.0, 12.0);
                    let ray = Ray::new(origin, target - origin);

                    let expected = brute_force(&scene, &ids, &ray, &mut rng);
                    let actual = bvh.hit(&scene, &ray, T, &mut rng);
                    rays += 1;

                    match (expected, actual) {
                        (None, None) => {}
                        (Some(e), Some(a)) => {
                            hits += 1;
                            assert!(
                                (e.t - a.t).abs() <= 1e-5 * e.t.max(1.0),
                                "t {} vs {}",
                                e.t,
                                a.t
                            );
                            assert_eq!(e.material, a.material);
                        }
                        (e, a) => panic!("brute force {e:?} but bvh {a:?}"),
                    }
                }
            }
        }
        assert!(rays >= 10_000);
        assert!(hits > rays / 10, "only {hits} hits");
    }

    #[test]
    fn test_bvh_empty() {
        let scene = Scene::new();
        let mut bvh = Bvh::default();
        bvh.build(&scene);

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(bvh.bounds().is_none());
        assert!(bvh.hit(&scene, &ray, T, &mut rng).is_none());
        assert_eq!(bvh.stats(), BvhStats::default());
    }

    #[test]
    fn test_bvh_leaf_sizes_and_bounds() {
        let mut rng = StdRng::seed_from_u64(77);
        let (scene, ids) = sphere_field(&mut rng);

        let mut bvh = Bvh::new(4, DEFAULT_MAX_DEPTH);
        bvh.insert_all(ids.iter().copied());
        bvh.build(&scene);

        let stats = bvh.stats();
        assert_eq!(stats.primitives, ids.len());
        assert_eq!(stats.nodes, 2 * stats.leaves - 1);
        assert!(stats.leaves > 1 && stats.depth > 1);

        let bounds = bvh.bounds().unwrap();
        for id in &ids {
            assert!(bounds.contains(&scene.bounds(*id).unwrap()));
        }
    }

    #[test]
    fn test_depth_cap_forces_leaf() {
        let mut rng = StdRng::seed_from_u64(78);
        let (scene, ids) = sphere_field(&mut rng);

        let mut bvh = Bvh::new(1, 0);
        bvh.insert_all(ids.iter().copied());
        bvh.build(&scene);

        let stats = bvh.stats();
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.largest_leaf, ids.len());
    }

    #[test]
    fn test_node_bounds_by_level() {
        let mut rng = StdRng::seed_from_u64(79);
        let (scene, ids) = sphere_field(&mut rng);

        let mut bvh = Bvh::new(4, DEFAULT_MAX_DEPTH);
        bvh.insert_all(ids.iter().copied());
        bvh.build(&scene);
        let root = bvh.bounds().unwrap();

        assert!(bvh.node_bounds(0).is_empty());
        assert_eq!(bvh.node_bounds(1), vec![root]);
        assert_eq!(bvh.node_bounds(2).len(), 3);

        let all = bvh.node_bounds(usize::MAX);
        assert_eq!(all.len(), bvh.stats().nodes);
        assert!(all.iter().all(|b| root.contains(b)));
    }
}
