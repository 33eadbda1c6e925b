use std::borrow::Cow;

use crate::error::Result;
use crate::math::Vec3;
use crate::model::{names, Corner, EntityKind, Face, PolygonMesh, Vertex};
use crate::tessellation::{TessVertex, Tessellator};

use super::source::Source;
use super::{vertex_slots, CompileOptions, CompiledBuffer, DrawableIntent, TriangleRange};

/// Triangles of a polygon mesh plus the triangle range of every raw face
/// index.
///
/// Pure triangle meshes are copied directly; any other mesh goes through
/// the tessellator face by face.
pub(super) fn compile_triangles(
    mesh: &PolygonMesh,
    intent: &DrawableIntent,
    source: &Source<'_>,
    options: &CompileOptions,
) -> Result<(CompiledBuffer, Vec<TriangleRange>)> {
    let location = if source.is_uniform() {
        EntityKind::Vertex
    } else {
        intent.location
    };
    if location == EntityKind::Edge {
        return Err(super::unsupported("polygon mesh", intent).into());
    }

    let normals: Cow<'_, [Vec3]> = match mesh
        .attributes(EntityKind::Vertex)
        .get::<Vec3>(names::NORMAL)
    {
        Some(stored) => Cow::Borrowed(stored),
        None => Cow::Owned(mesh.vertex_normals()),
    };

    let out = if mesh.is_triangle_mesh() {
        if location == EntityKind::Vertex {
            direct_indexed(mesh, source, &normals)
        } else {
            direct_flat(mesh, location, source, &normals)
        }
    } else {
        tessellated(mesh, location, source, &normals, options)
    };
    Ok(out)
}

/// Raw entity index carrying the attribute of corner `c` of face `f`.
///
/// A halfedge attribute belongs to the corner its halfedge points into, so
/// the corner reads the incoming halfedge of its vertex.
fn attribute_index(mesh: &PolygonMesh, location: EntityKind, f: Face, c: Corner) -> usize {
    match location {
        EntityKind::Face => f.index(),
        EntityKind::Halfedge => mesh.prev(c.halfedge).index(),
        EntityKind::Vertex | EntityKind::Edge => c.vertex.index(),
    }
}

/// Visits every raw face index in order, recording the triangle span each
/// live face produces. Deleted faces get an empty span.
#[allow(clippy::cast_possible_truncation)]
fn for_each_face(
    mesh: &PolygonMesh,
    mut emit: impl FnMut(Face) -> usize,
) -> Vec<TriangleRange> {
    let mut ranges = Vec::with_capacity(mesh.faces_size());
    let mut start = 0u32;
    for i in 0..mesh.faces_size() {
        let f = Face::from_index(i);
        let count = if mesh.is_valid_face(f) { emit(f) as u32 } else { 0 };
        ranges.push(TriangleRange::new(start, count));
        start += count;
    }
    ranges
}

fn direct_indexed(
    mesh: &PolygonMesh,
    source: &Source<'_>,
    normals: &[Vec3],
) -> (CompiledBuffer, Vec<TriangleRange>) {
    let model_points = mesh.points();
    let mut buffer = source.buffer(true);
    for v in mesh.vertices() {
        buffer.positions.push(model_points[v.index()]);
        if let Some(out) = buffer.normals.as_mut() {
            out.push(normals[v.index()]);
        }
        source.push(v.index(), &mut buffer);
    }

    let slots = vertex_slots(mesh.vertices_size(), mesh.vertices().map(Vertex::index));
    let mut indices = Vec::with_capacity(3 * mesh.n_faces());
    let ranges = for_each_face(mesh, |f| {
        indices.extend(mesh.face_vertices(f).map(|v| slots[v.index()]));
        1
    });
    buffer.indices = Some(indices);
    (buffer, ranges)
}

fn direct_flat(
    mesh: &PolygonMesh,
    location: EntityKind,
    source: &Source<'_>,
    normals: &[Vec3],
) -> (CompiledBuffer, Vec<TriangleRange>) {
    let model_points = mesh.points();
    let mut buffer = source.buffer(true);
    let ranges = for_each_face(mesh, |f| {
        for c in mesh.corners(f) {
            buffer.positions.push(model_points[c.vertex.index()]);
            if let Some(out) = buffer.normals.as_mut() {
                out.push(normals[c.vertex.index()]);
            }
            source.push(attribute_index(mesh, location, f, c), &mut buffer);
        }
        1
    });
    (buffer, ranges)
}

fn tessellated(
    mesh: &PolygonMesh,
    location: EntityKind,
    source: &Source<'_>,
    normals: &[Vec3],
    options: &CompileOptions,
) -> (CompiledBuffer, Vec<TriangleRange>) {
    let model_points = mesh.points();
    let mut tess = Tessellator::new().with_winding_rule(options.winding_rule);
    let ranges = for_each_face(mesh, |f| {
        let before = tess.num_triangles();
        tess.begin_polygon(&mesh.compute_face_normal(f));
        tess.begin_contour();
        for c in mesh.corners(f) {
            let mut data = Vec::with_capacity(3 + source.width());
            data.extend_from_slice(normals[c.vertex.index()].as_slice());
            source.extend_payload(attribute_index(mesh, location, f, c), &mut data);
            tess.add_vertex(TessVertex::new(model_points[c.vertex.index()], data));
        }
        tess.end_contour();
        tess.end_polygon();
        tess.num_triangles() - before
    });

    let mut buffer = source.buffer(true);
    for v in tess.vertices() {
        buffer.positions.push(v.position);
        if let (Some(out), [x, y, z, rest @ ..]) = (buffer.normals.as_mut(), v.data.as_slice()) {
            out.push(Vec3::new(*x, *y, *z));
            source.push_payload(rest, &mut buffer);
        }
    }
    buffer.indices = Some(tess.elements().iter().flatten().copied().collect());
    (buffer, ranges)
}
