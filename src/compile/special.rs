use crate::error::{CompileError, ModelError, PropertyError, Result};
use crate::math::Vec3;
use crate::model::{names, EntityKind, Model, PolygonMesh};

use super::lines::edge_endpoints;
use super::CompiledBuffer;

/// Number of edges sampled to estimate the average edge length.
const EDGE_LENGTH_SAMPLES: usize = 500;

fn require_mesh<'a>(model: &'a Model, what: &str) -> Result<&'a PolygonMesh> {
    match model {
        Model::PolygonMesh(mesh) => Ok(mesh),
        _ => Err(CompileError::UnsupportedCombination(format!(
            "{what} of a {}",
            model.variant_name()
        ))
        .into()),
    }
}

/// Unindexed line segments along the boundary edges of a polygon mesh.
///
/// # Errors
///
/// Returns an error if `model` is not a polygon mesh or is empty.
pub fn compile_borders(model: &Model) -> Result<CompiledBuffer> {
    let mesh = require_mesh(model, "borders")?;
    if model.is_empty() {
        return Err(ModelError::EmptyModel.into());
    }
    let points = mesh.points();
    let mut buffer = CompiledBuffer::default();
    for e in mesh.edges().filter(|&e| mesh.is_boundary(e)) {
        for i in 0..2 {
            buffer.positions.push(points[mesh.vertex(e, i).index()]);
        }
    }
    Ok(buffer)
}

/// Unindexed points at the vertices whose `v:locked` flag is set.
///
/// # Errors
///
/// Returns an error if the model is empty or has no boolean `v:locked`
/// property.
pub fn compile_locks(model: &Model) -> Result<CompiledBuffer> {
    if model.is_empty() {
        return Err(ModelError::EmptyModel.into());
    }
    let store = model
        .attributes(EntityKind::Vertex)
        .ok_or(ModelError::EmptyModel)?;
    let array = store
        .array(names::LOCKED)
        .ok_or_else(|| PropertyError::MissingProperty {
            name: names::LOCKED.to_owned(),
            location: EntityKind::Vertex,
        })?;
    let locked = store
        .get::<bool>(names::LOCKED)
        .ok_or_else(|| PropertyError::PropertyTypeMismatch {
            name: names::LOCKED.to_owned(),
            expected: "bool".to_owned(),
            found: array.tag(),
        })?;

    let points = model.points();
    let positions = model
        .iterate(EntityKind::Vertex)
        .filter(|&v| locked[v])
        .map(|v| points[v])
        .collect();
    Ok(CompiledBuffer {
        positions,
        ..CompiledBuffer::default()
    })
}

/// Line segments visualizing the `vec3` property `field` on `location`.
///
/// Each segment starts at the vertex, edge midpoint or face centroid and
/// runs along the vector, scaled by the average edge length (by a fraction
/// of the bounding box diagonal for point sets) times `scale`.
///
/// # Errors
///
/// Returns an error if the model is empty, `location` is not available on
/// the model or is a halfedge, or `field` is missing or not `vec3`.
pub fn compile_vector_field(
    model: &Model,
    field: &str,
    location: EntityKind,
    scale: f32,
) -> Result<CompiledBuffer> {
    if model.is_empty() {
        return Err(ModelError::EmptyModel.into());
    }
    let unsupported = || {
        CompileError::UnsupportedCombination(format!(
            "vector field on {location}s of a {}",
            model.variant_name()
        ))
    };
    if location == EntityKind::Halfedge {
        return Err(unsupported().into());
    }
    let store = model.attributes(location).ok_or_else(unsupported)?;
    let array = store
        .array(field)
        .ok_or_else(|| PropertyError::MissingProperty {
            name: field.to_owned(),
            location,
        })?;
    let vectors = store
        .get::<Vec3>(field)
        .ok_or_else(|| PropertyError::PropertyTypeMismatch {
            name: field.to_owned(),
            expected: "vec3".to_owned(),
            found: array.tag(),
        })?;

    let length = vector_length(model) * scale;
    let points = model.points();
    let mut buffer = CompiledBuffer::default();
    let mut push = |origin: Vec3, i: usize| {
        buffer.positions.push(origin);
        buffer.positions.push(origin + vectors[i] * length);
    };

    match (location, model) {
        (EntityKind::Vertex, _) => {
            for v in model.iterate(EntityKind::Vertex) {
                push(points[v], v);
            }
        }
        (EntityKind::Edge, _) => {
            for (e, [a, b]) in edge_endpoints(model).unwrap_or_default() {
                push((points[a] + points[b]) * 0.5, e);
            }
        }
        (EntityKind::Face, Model::PolygonMesh(mesh)) => {
            for f in mesh.faces() {
                let (sum, n) = mesh
                    .face_vertices(f)
                    .fold((Vec3::zeros(), 0.0f32), |(s, n), v| {
                        (s + points[v.index()], n + 1.0)
                    });
                push(sum / n.max(1.0), f.index());
            }
        }
        _ => return Err(unsupported().into()),
    }
    Ok(buffer)
}

/// Base length of a drawn vector before scaling.
#[allow(clippy::cast_precision_loss)]
fn vector_length(model: &Model) -> f32 {
    let diagonal_fraction = || {
        model
            .bounding_box()
            .map_or(0.0, |b| b.diagonal() * 0.5 * 0.01)
    };
    let Some(edges) = edge_endpoints(model) else {
        return diagonal_fraction();
    };
    let points = model.points();
    let sampled: Vec<f32> = edges
        .iter()
        .take(EDGE_LENGTH_SAMPLES)
        .map(|(_, [a, b])| (points[*a] - points[*b]).norm())
        .collect();
    if sampled.is_empty() {
        return diagonal_fraction();
    }
    sampled.iter().sum::<f32>() / sampled.len() as f32
}
