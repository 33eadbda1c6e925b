pub mod attributes;
pub mod compile;
pub mod error;
pub mod math;
pub mod model;
pub mod scalar_range;
pub mod scene;
pub mod tessellation;

pub use attributes::{AttributeStore, PropertyTag};
pub use compile::{
    compile, compile_with, ColoringMethod, CompileOptions, CompiledBuffer, Drawable,
    DrawableIntent, PrimitiveKind, TriangleRange,
};
pub use error::{MeshDrawError, Result};
pub use model::{EntityKind, Graph, Model, PointSet, PolygonMesh};
pub use scalar_range::ScalarRange;
pub use scene::{DrawableId, ModelId, Scene, Settings};
pub use tessellation::{Tessellator, WindingRule};
