//! Triangle mesh data loaded from OBJ files.
//!
//! Only geometry is kept: positions, one smooth normal per vertex and the
//! triangle index list. Materials referenced by the OBJ are ignored; the
//! renderer assigns one material to the whole mesh.

use std::path::Path;

use prism_math::{Aabb, Vec3};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("failed to load OBJ {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ {0} contains no triangles")]
    Empty(String),

    #[error(
        "triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices"
    )]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
}

pub type MeshResult<T> = Result<T, MeshError>;

#[derive(Clone, Debug)]
pub struct MeshData {
    pub positions: Vec<Vec3>,

    /// Smooth normals: the normalized average of the adjacent face normals.
    pub normals: Vec<Vec3>,

    pub triangles: Vec<[u32; 3]>,

    pub bounds: Aabb,
}

impl MeshData {
    /// Build a mesh from positions and triangles, computing smooth normals.
    ///
    /// With `flip_winding` each triangle's vertex order is reversed first, which
    /// also flips the face normals.
    pub fn new(
        positions: Vec<Vec3>,
        mut triangles: Vec<[u32; 3]>,
        flip_winding: bool,
    ) -> MeshResult<Self> {
        for (i, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&idx| idx as usize >= positions.len()) {
                return Err(MeshError::IndexOutOfRange {
                    triangle: i,
                    index,
                    vertex_count: positions.len(),
                });
            }
        }

        if flip_winding {
            for tri in &mut triangles {
                tri.reverse();
            }
        }

        let normals = smooth_normals(&positions, &triangles);
        let mut bounds = Aabb::EMPTY;
        for p in &positions {
            bounds.extend(*p);
        }

        Ok(Self {
            positions,
            normals,
            triangles,
            bounds,
        })
    }

    /// Load every model of an OBJ file into one mesh. Faces are triangulated.
    pub fn load_obj(path: impl AsRef<Path>, flip_winding: bool) -> MeshResult<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|source| MeshError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let mut positions = Vec::new();
        let mut triangles = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let base = positions.len() as u32;
            positions.extend(mesh.positions.chunks_exact(3).map(Vec3::from_slice));
            triangles.extend(
                mesh.indices
                    .chunks_exact(3)
                    .map(|f| [base + f[0], base + f[1], base + f[2]]),
            );
        }

        if triangles.is_empty() {
            return Err(MeshError::Empty(path.display().to_string()));
        }

        let mesh = Self::new(positions, triangles, flip_winding)?;
        log::info!(
            "Loaded {}: {} vertices, {} triangles",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Vertex positions and normals of every triangle.
    pub fn iter_triangles(&self) -> impl Iterator<Item = ([Vec3; 3], [Vec3; 3])> + '_ {
        self.triangles.iter().map(move |tri| {
            let [a, b, c] = tri.map(|i| i as usize);
            (
                [self.positions[a], self.positions[b], self.positions[c]],
                [self.normals[a], self.normals[b], self.normals[c]],
            )
        })
    }
}

fn smooth_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in triangles {
        let [a, b, c] = tri.map(|i| i as usize);
        let face_normal = (positions[b] - positions[a])
            .cross(positions[c] - positions[a])
            .normalize_or_zero();
        normals[a] += face_normal;
        normals[b] += face_normal;
        normals[c] += face_normal;
    }

    for normal in &mut normals {
        *normal = normal.normalize_or_zero();
    }
    normals
}
