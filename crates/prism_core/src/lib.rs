//! Scene resources for prism: textures and triangle meshes.
//!
//! - **Textures**: constant colors, filtered image lookups and cube maps
//! - **Meshes**: OBJ loading with smooth per-vertex normals

pub mod mesh;
pub mod texture;

pub use mesh::{MeshData, MeshError, MeshResult};
pub use texture::{
    Color, CubeFace, CubeMap, ImageData, ImageTexture, Interpolation, Texture, TextureError,
    TextureResult, Wrap,
};
