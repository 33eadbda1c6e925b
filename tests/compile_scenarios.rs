#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use meshdraw::compile::{compile, ColoringMethod, DrawableIntent, PrimitiveKind};
use meshdraw::math::Vec3;
use meshdraw::model::{Face, Vertex};
use meshdraw::{
    CompileOptions, Drawable, EntityKind, Graph, Model, PointSet, PolygonMesh, ScalarRange,
    WindingRule,
};

fn mesh_of(model: &Model) -> &PolygonMesh {
    match model {
        Model::PolygonMesh(mesh) => mesh,
        _ => panic!("not a polygon mesh"),
    }
}

fn regular_polygon(mesh: &mut PolygonMesh, k: u8, center: Vec3) -> Vec<Vertex> {
    (0..k)
        .map(|i| {
            let a = f32::from(i) * std::f32::consts::TAU / f32::from(k);
            mesh.add_vertex(center + Vec3::new(a.cos(), a.sin(), 0.0))
        })
        .collect()
}

#[test]
fn convex_quad_gives_two_triangles() {
    let mut mesh = PolygonMesh::new();
    let v = regular_polygon(&mut mesh, 4, Vec3::zeros());
    mesh.add_face(&v).unwrap();
    let mut model: Model = mesh.into();

    let buffer = compile(&mut model, &DrawableIntent::new(PrimitiveKind::Triangles)).unwrap();
    let indices = buffer.indices.as_ref().unwrap();
    assert_eq!(indices.len(), 6);
    assert!(indices.iter().all(|&i| (i as usize) < buffer.positions.len()));

    let range = mesh_of(&model).triangle_ranges().unwrap()[0];
    assert_eq!((range.start, range.last()), (0, Some(1)));
}

#[test]
fn percentile_clamp_ignores_outlier() {
    let range = ScalarRange::compute(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0], 0.0, 1.0 / 6.0).unwrap();
    assert_relative_eq!(range.max_value, 5.0);
    assert_relative_eq!(range.min_value, 1.0);
    assert_relative_eq!(range.normalize(100.0).unwrap(), 1.0);
}

#[test]
fn missing_scalar_field_keeps_previous_buffer() {
    let mut cloud = PointSet::new();
    cloud.add_vertex(Vec3::zeros());
    cloud.add_vertex(Vec3::x());
    let mut model: Model = cloud.into();
    let options = CompileOptions::default();

    let mut points = Drawable::new("vertices", DrawableIntent::new(PrimitiveKind::Points));
    points.update(&mut model, &options).unwrap();
    let before = points.buffer().cloned();

    points.set_intent(DrawableIntent::new(PrimitiveKind::Points).with_coloring(
        ColoringMethod::ScalarField,
        EntityKind::Vertex,
        "v:nonexistent",
    ));
    assert!(points.update(&mut model, &options).is_err());
    assert_eq!(points.buffer().cloned(), before);
}

#[test]
fn convex_polygons_produce_k_minus_two_triangles() {
    let mut mesh = PolygonMesh::new();
    for k in 3..=8u8 {
        let v = regular_polygon(&mut mesh, k, Vec3::new(3.0 * f32::from(k), 0.0, 0.0));
        mesh.add_face(&v).unwrap();
    }
    let mut model: Model = mesh.into();
    compile(&mut model, &DrawableIntent::new(PrimitiveKind::Triangles)).unwrap();

    let ranges = mesh_of(&model).triangle_ranges().unwrap();
    let counts: Vec<u32> = ranges.iter().map(|r| r.count).collect();
    assert_eq!(counts, vec![1, 2, 3, 4, 5, 6]);
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].end(), pair[1].start);
    }
}

#[test]
fn triangle_mesh_emits_three_indices_per_face() {
    let mut mesh = PolygonMesh::new();
    let v: Vec<Vertex> = [
        Vec3::zeros(),
        Vec3::x(),
        Vec3::y(),
        Vec3::z(),
    ]
    .into_iter()
    .map(|p| mesh.add_vertex(p))
    .collect();
    mesh.add_triangle(v[0], v[2], v[1]).unwrap();
    mesh.add_triangle(v[0], v[1], v[3]).unwrap();
    mesh.add_triangle(v[1], v[2], v[3]).unwrap();
    mesh.add_triangle(v[0], v[3], v[2]).unwrap();
    let mut model: Model = mesh.into();

    let buffer = compile(&mut model, &DrawableIntent::new(PrimitiveKind::Triangles)).unwrap();
    assert_eq!(buffer.indices.as_ref().unwrap().len(), 12);
    assert_eq!(buffer.num_vertices(), 4);
    assert!(buffer.is_consistent());
}

#[test]
fn compiling_twice_is_idempotent() {
    let mut mesh = PolygonMesh::new();
    let v = regular_polygon(&mut mesh, 5, Vec3::zeros());
    mesh.add_face(&v).unwrap();
    mesh.attributes_mut(EntityKind::Vertex)
        .add("v:quality", 0.0f64)
        .unwrap()
        .iter_mut()
        .zip([3.0, 1.0, 4.0, 1.0, 5.0])
        .for_each(|(q, value)| *q = value);
    let mut model: Model = mesh.into();
    let intent = DrawableIntent::new(PrimitiveKind::Triangles).with_coloring(
        ColoringMethod::ScalarField,
        EntityKind::Vertex,
        "v:quality",
    );

    let first = compile(&mut model, &intent).unwrap();
    let ranges = mesh_of(&model).triangle_ranges().unwrap().to_vec();
    let second = compile(&mut model, &intent).unwrap();
    assert_eq!(first, second);
    assert_eq!(mesh_of(&model).triangle_ranges().unwrap(), ranges.as_slice());
}

#[test]
fn picking_maps_triangles_back_to_faces() {
    let mut mesh = PolygonMesh::new();
    let tri = regular_polygon(&mut mesh, 3, Vec3::zeros());
    let hex = regular_polygon(&mut mesh, 6, Vec3::new(5.0, 0.0, 0.0));
    mesh.add_face(&tri).unwrap();
    mesh.add_face(&hex).unwrap();
    let mut model: Model = mesh.into();
    compile(&mut model, &DrawableIntent::new(PrimitiveKind::Triangles)).unwrap();

    let mesh = mesh_of(&model);
    assert_eq!(mesh.face_of_triangle(0), Some(Face::new(0)));
    for t in 1..5 {
        assert_eq!(mesh.face_of_triangle(t), Some(Face::new(1)));
    }
    assert_eq!(mesh.face_of_triangle(5), None);
}

#[test]
fn simple_faces_fill_under_odd_and_nonzero() {
    let mut mesh = PolygonMesh::new();
    let v = regular_polygon(&mut mesh, 4, Vec3::zeros());
    mesh.add_face(&v).unwrap();
    let mut model: Model = mesh.into();
    for rule in [WindingRule::Odd, WindingRule::NonZero] {
        let options = CompileOptions::default().with_winding_rule(rule);
        let buffer = meshdraw::compile_with(
            &mut model,
            &DrawableIntent::new(PrimitiveKind::Triangles),
            &options,
        )
        .unwrap();
        assert_eq!(buffer.indices.unwrap().len(), 6, "{rule:?}");
    }
}

#[test]
fn graph_edges_compile_to_lines() {
    let mut g = Graph::new();
    let a = g.add_vertex(Vec3::zeros());
    let b = g.add_vertex(Vec3::x());
    let c = g.add_vertex(Vec3::y());
    g.add_edge(a, b).unwrap();
    g.add_edge(b, c).unwrap();
    let mut model: Model = g.into();
    let buffer = compile(&mut model, &DrawableIntent::new(PrimitiveKind::Lines)).unwrap();
    assert_eq!(buffer.indices.unwrap(), vec![0, 1, 1, 2]);
}

#[test]
fn reserved_arrays_survive_removal_attempts() {
    let mut cloud = PointSet::new();
    cloud.add_vertex(Vec3::zeros());
    cloud.add_vertex(Vec3::x());
    assert!(!cloud.vertex_attributes_mut().remove(meshdraw::model::names::POINT));
    let mut model: Model = cloud.into();
    let buffer = compile(&mut model, &DrawableIntent::new(PrimitiveKind::Points)).unwrap();
    assert_eq!(buffer.positions, vec![Vec3::zeros(), Vec3::x()]);
}
