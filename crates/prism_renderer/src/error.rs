use thiserror::Error;

use crate::PrimitiveId;

/// Errors from misusing the primitive arena.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SceneError {
    #[error("primitive {0:?} does not exist")]
    UnknownPrimitive(PrimitiveId),

    #[error("primitive {0:?} is not a mesh")]
    NotAMesh(PrimitiveId),
}

pub type SceneResult<T> = Result<T, SceneError>;
