use crate::error::Result;
use crate::math::Vec3;
use crate::model::{names, EntityKind, Model};

use super::source::Source;
use super::{CompiledBuffer, DrawableIntent};

/// One point per live vertex, with `v:normal` when the model has it.
pub(super) fn compile_points(
    model: &Model,
    intent: &DrawableIntent,
    source: &Source<'_>,
) -> Result<CompiledBuffer> {
    if !source.is_uniform() && intent.location != EntityKind::Vertex {
        return Err(super::unsupported(model.variant_name(), intent).into());
    }

    let points = model.points();
    let normals = model
        .attributes(EntityKind::Vertex)
        .and_then(|s| s.get::<Vec3>(names::NORMAL));
    let mut buffer = source.buffer(normals.is_some());
    for v in model.iterate(EntityKind::Vertex) {
        buffer.positions.push(points[v]);
        if let (Some(out), Some(n)) = (buffer.normals.as_mut(), normals) {
            out.push(n[v]);
        }
        source.push(v, &mut buffer);
    }
    Ok(buffer)
}
