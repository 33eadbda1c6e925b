//! Conversion of a model plus a drawable intent into flat render buffers.

mod drawable;
mod lines;
mod points;
mod source;
mod special;
mod triangles;

pub use drawable::{Drawable, VectorField, BORDERS, LOCKS};
pub use special::{compile_borders, compile_locks, compile_vector_field};

use tracing::{debug, warn};

use crate::error::{CompileError, ModelError, Result};
use crate::math::{Vec2, Vec3};
use crate::model::{names, EntityKind, Model};
use crate::tessellation::WindingRule;

/// Primitive type a drawable renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Points,
    Lines,
    Triangles,
}

/// How a drawable is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColoringMethod {
    /// A single color, supplied by the drawable at draw time.
    #[default]
    Uniform,
    /// A `vec3` property copied per vertex.
    ColorProperty,
    /// A numeric property mapped to a colormap texture coordinate.
    ScalarField,
    /// A `vec2` texture coordinate property.
    Textured,
}

/// What to render from a model and how to color it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableIntent {
    pub primitive_kind: PrimitiveKind,
    pub coloring: ColoringMethod,
    pub location: EntityKind,
    pub property_name: String,
    /// Fraction of scalar samples clamped at the low end.
    pub clamp_lower: f32,
    /// Fraction of scalar samples clamped at the high end.
    pub clamp_upper: f32,
}

impl DrawableIntent {
    /// Uniformly colored primitives.
    #[must_use]
    pub fn new(primitive_kind: PrimitiveKind) -> Self {
        Self {
            primitive_kind,
            coloring: ColoringMethod::Uniform,
            location: EntityKind::Vertex,
            property_name: String::new(),
            clamp_lower: 0.0,
            clamp_upper: 0.0,
        }
    }

    /// Colors the primitives from property `name` on `location`.
    #[must_use]
    pub fn with_coloring(
        mut self,
        coloring: ColoringMethod,
        location: EntityKind,
        name: impl Into<String>,
    ) -> Self {
        self.coloring = coloring;
        self.location = location;
        self.property_name = name.into();
        self
    }

    /// Sets the scalar field clamping fractions.
    #[must_use]
    pub fn with_clamp(mut self, lower: f32, upper: f32) -> Self {
        self.clamp_lower = lower;
        self.clamp_upper = upper;
        self
    }
}

/// GPU-ready vertex and index arrays of one drawable.
///
/// Every present auxiliary array has one entry per position, and every
/// index is smaller than `positions.len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledBuffer {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub colors: Option<Vec<Vec3>>,
    pub texcoords: Option<Vec<Vec2>>,
    pub indices: Option<Vec<u32>>,
}

impl CompiledBuffer {
    /// Number of vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the buffer has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Checks the length and index-bound invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let n = self.positions.len();
        self.normals.as_ref().is_none_or(|a| a.len() == n)
            && self.colors.as_ref().is_none_or(|a| a.len() == n)
            && self.texcoords.as_ref().is_none_or(|a| a.len() == n)
            && self
                .indices
                .as_ref()
                .is_none_or(|idx| idx.iter().all(|&i| (i as usize) < n))
    }
}

/// Span of triangle ordinals emitted for one face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriangleRange {
    pub start: u32,
    pub count: u32,
}

impl TriangleRange {
    #[must_use]
    pub fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }

    /// One past the last triangle.
    #[must_use]
    pub fn end(&self) -> u32 {
        self.start + self.count
    }

    /// Last triangle of the span, `None` if the face produced none.
    #[must_use]
    pub fn last(&self) -> Option<u32> {
        self.count.checked_sub(1).map(|c| self.start + c)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn contains(&self, triangle: u32) -> bool {
        (self.start..self.end()).contains(&triangle)
    }
}

/// Settings applied while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Winding rule for faces that need tessellation.
    pub winding_rule: WindingRule,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            winding_rule: WindingRule::NonZero,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn with_winding_rule(mut self, rule: WindingRule) -> Self {
        self.winding_rule = rule;
        self
    }
}

/// Compiles `intent` against `model` with default options.
///
/// # Errors
///
/// See [`compile_with`].
pub fn compile(model: &mut Model, intent: &DrawableIntent) -> Result<CompiledBuffer> {
    compile_with(model, intent, &CompileOptions::default())
}

/// Compiles `intent` against `model`.
///
/// Compiling triangles of a polygon mesh rewrites its `f:triangle_range`
/// face property.
///
/// # Errors
///
/// Returns an error if the model is empty, the coloring property is
/// missing or has an incompatible type, the scalar range is degenerate, or
/// the primitive, model and location do not fit together.
pub fn compile_with(
    model: &mut Model,
    intent: &DrawableIntent,
    options: &CompileOptions,
) -> Result<CompiledBuffer> {
    if model.is_empty() {
        return Err(ModelError::EmptyModel.into());
    }

    let (buffer, ranges) = {
        let model = &*model;
        let source = source::resolve(model, intent)?;
        match (intent.primitive_kind, model) {
            (PrimitiveKind::Points, _) => (points::compile_points(model, intent, &source)?, None),
            (PrimitiveKind::Lines, _) => (lines::compile_lines(model, intent, &source)?, None),
            (PrimitiveKind::Triangles, Model::PolygonMesh(mesh)) => {
                let (buffer, ranges) =
                    triangles::compile_triangles(mesh, intent, &source, options)?;
                (buffer, Some(ranges))
            }
            (PrimitiveKind::Triangles, _) => {
                return Err(unsupported(model.variant_name(), intent).into());
            }
        }
    };

    if let (Some(ranges), Model::PolygonMesh(mesh)) = (ranges, &mut *model) {
        match mesh
            .attributes_mut(EntityKind::Face)
            .get_or_add(names::TRIANGLE_RANGE, TriangleRange::default())
        {
            Some(table) => table.copy_from_slice(&ranges),
            None => warn!(
                "{} exists with another type, triangle ranges not stored",
                names::TRIANGLE_RANGE
            ),
        }
    }

    debug!(
        "compiled {:?} of '{}': {} vertices, {} indices",
        intent.primitive_kind,
        model.name(),
        buffer.num_vertices(),
        buffer.indices.as_ref().map_or(0, Vec::len)
    );
    Ok(buffer)
}

pub(crate) fn unsupported(variant: &str, intent: &DrawableIntent) -> CompileError {
    CompileError::UnsupportedCombination(format!(
        "{:?} of a {variant} with {:?} coloring on {}s",
        intent.primitive_kind,
        intent.coloring,
        intent.location
    ))
}

/// Buffer slot of every raw vertex index given the live ones in order;
/// deleted vertices map to `u32::MAX`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn vertex_slots(len: usize, live: impl Iterator<Item = usize>) -> Vec<u32> {
    let mut slots = vec![u32::MAX; len];
    for (slot, v) in live.enumerate() {
        slots[v] = slot as u32;
    }
    slots
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{PointSet, PolygonMesh};

    fn unit_quad() -> Model {
        let mut mesh = PolygonMesh::new();
        let v: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(Vec3::new(x, y, 0.0)))
            .collect();
        mesh.add_face(&v).unwrap();
        mesh.into()
    }

    #[test]
    fn triangle_range_bounds() {
        let r = TriangleRange::new(4, 3);
        assert_eq!(r.end(), 7);
        assert_eq!(r.last(), Some(6));
        assert!(r.contains(4));
        assert!(!r.contains(7));
        assert_eq!(TriangleRange::new(2, 0).last(), None);
        assert!(TriangleRange::new(2, 0).is_empty());
    }

    #[test]
    fn empty_model_is_rejected() {
        let mut model: Model = PointSet::new().into();
        let err = compile(&mut model, &DrawableIntent::new(PrimitiveKind::Points)).unwrap_err();
        assert!(matches!(
            err,
            crate::error::MeshDrawError::Model(ModelError::EmptyModel)
        ));
    }

    #[test]
    fn quad_writes_triangle_ranges() {
        let mut model = unit_quad();
        let buffer = compile(&mut model, &DrawableIntent::new(PrimitiveKind::Triangles)).unwrap();
        assert!(buffer.is_consistent());
        assert_eq!(buffer.indices.as_ref().unwrap().len(), 6);
        let Model::PolygonMesh(mesh) = &model else {
            unreachable!()
        };
        assert_eq!(mesh.triangle_ranges().unwrap(), &[TriangleRange::new(0, 2)]);
        assert_eq!(
            mesh.triangle_ranges().unwrap()[0].last(),
            Some(1)
        );
    }

    #[test]
    fn triangles_of_point_set_are_unsupported() {
        let mut cloud = PointSet::new();
        cloud.add_vertex(Vec3::zeros());
        let mut model: Model = cloud.into();
        let err =
            compile(&mut model, &DrawableIntent::new(PrimitiveKind::Triangles)).unwrap_err();
        assert!(matches!(
            err,
            crate::error::MeshDrawError::Compile(CompileError::UnsupportedCombination(_))
        ));
    }

    #[test]
    fn inconsistent_buffer_is_detected() {
        let buffer = CompiledBuffer {
            positions: vec![Vec3::zeros(); 2],
            indices: Some(vec![0, 2]),
            ..CompiledBuffer::default()
        };
        assert!(!buffer.is_consistent());
    }
}
