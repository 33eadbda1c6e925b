use crate::error::Result;
use crate::model::{EntityKind, Model};

use super::source::Source;
use super::{vertex_slots, CompiledBuffer, DrawableIntent};

/// Raw index and raw end-point indices of every live edge, `None` for
/// models without edges.
pub(super) fn edge_endpoints(model: &Model) -> Option<Vec<(usize, [usize; 2])>> {
    match model {
        Model::PointSet(_) => None,
        Model::Graph(g) => Some(
            g.edges()
                .map(|e| (e.index(), [g.vertex(e, 0).index(), g.vertex(e, 1).index()]))
                .collect(),
        ),
        Model::PolygonMesh(m) => Some(
            m.edges()
                .map(|e| (e.index(), [m.vertex(e, 0).index(), m.vertex(e, 1).index()]))
                .collect(),
        ),
    }
}

/// Line segments along the edges of a graph or mesh.
///
/// Vertex-located attributes give an indexed buffer over the live vertices;
/// edge-located attributes give two unshared vertices per edge.
pub(super) fn compile_lines(
    model: &Model,
    intent: &DrawableIntent,
    source: &Source<'_>,
) -> Result<CompiledBuffer> {
    let edges = edge_endpoints(model)
        .ok_or_else(|| super::unsupported(model.variant_name(), intent))?;
    let points = model.points();
    let location = if source.is_uniform() {
        EntityKind::Vertex
    } else {
        intent.location
    };

    let mut buffer = source.buffer(false);
    match location {
        EntityKind::Vertex => {
            let slots = vertex_slots(points.len(), model.iterate(EntityKind::Vertex));
            for v in model.iterate(EntityKind::Vertex) {
                buffer.positions.push(points[v]);
                source.push(v, &mut buffer);
            }
            buffer.indices = Some(
                edges
                    .iter()
                    .flat_map(|(_, [a, b])| [slots[*a], slots[*b]])
                    .collect(),
            );
        }
        EntityKind::Edge => {
            for (e, ends) in &edges {
                for &v in ends {
                    buffer.positions.push(points[v]);
                    source.push(*e, &mut buffer);
                }
            }
        }
        EntityKind::Face | EntityKind::Halfedge => {
            return Err(super::unsupported(model.variant_name(), intent).into());
        }
    }
    Ok(buffer)
}
