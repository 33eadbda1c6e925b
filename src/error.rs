use thiserror::Error;

use crate::attributes::PropertyTag;
use crate::model::EntityKind;

/// Top-level error type for the buffer compilation engine.
#[derive(Debug, Error)]
pub enum MeshDrawError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    ScalarRange(#[from] ScalarRangeError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Errors related to model topology and entity handles.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model has no valid geometry")]
    EmptyModel,

    #[error("invalid {kind} handle: {index}")]
    InvalidHandle { kind: EntityKind, index: u32 },

    #[error("invalid face: {0}")]
    InvalidFace(String),

    #[error("complex edge between vertices {from} and {to}")]
    ComplexEdge { from: u32, to: u32 },

    #[error("invalid edge: {0}")]
    InvalidEdge(String),
}

/// Errors related to named per-entity properties.
#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("property not found on {location}s: {name}")]
    MissingProperty { name: String, location: EntityKind },

    #[error("property {name} has type {found}, expected {expected}")]
    PropertyTypeMismatch {
        name: String,
        expected: String,
        found: PropertyTag,
    },

    #[error("a property named {0} already exists")]
    NameTaken(String),

    #[error("property {0} is reserved by the model")]
    Reserved(String),
}

/// Errors raised while computing or applying a scalar display range.
#[derive(Debug, Error)]
pub enum ScalarRangeError {
    #[error("empty property")]
    EmptyProperty,

    #[error("degenerate scalar range: all values are {0}")]
    DegenerateRange(f64),
}

/// Errors related to drawable compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unsupported combination: {0}")]
    UnsupportedCombination(String),
}

/// Errors related to the scene registry.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Convenience type alias for results using [`MeshDrawError`].
pub type Result<T> = std::result::Result<T, MeshDrawError>;
