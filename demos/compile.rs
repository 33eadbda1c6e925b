//! Compiles a small polygon mesh and prints the buffers of its drawables.
//!
//! Usage:
//! ```text
//! cargo run --example compile
//! RUST_LOG=meshdraw=debug cargo run --example compile
//! ```

use meshdraw::compile::{ColoringMethod, DrawableIntent, PrimitiveKind};
use meshdraw::math::Vec3;
use meshdraw::model::names;
use meshdraw::{Drawable, EntityKind, MeshDrawError, PolygonMesh, Scene};

/// A hexagon next to a square, sharing one edge.
fn build_mesh() -> Result<PolygonMesh, MeshDrawError> {
    let mut mesh = PolygonMesh::new().with_name("hexagon_and_square");
    let hexagon: Vec<_> = (0..6)
        .map(|i| {
            let a = f32::from(u8::try_from(i).unwrap_or(0)) * std::f32::consts::FRAC_PI_3;
            mesh.add_vertex(Vec3::new(a.cos(), a.sin(), 0.0))
        })
        .collect();
    let hex = mesh.add_face(&hexagon)?;

    // square on the edge between hexagon corners 0 and 1
    let p0 = mesh.points()[hexagon[0].index()];
    let p1 = mesh.points()[hexagon[1].index()];
    let out = Vec3::new(p0.x + p1.x, p0.y + p1.y, 0.0).normalize();
    let a = mesh.add_vertex(p1 + out);
    let b = mesh.add_vertex(p0 + out);
    let square = mesh.add_quad(hexagon[1], hexagon[0], b, a)?;

    if let Some(height) = mesh
        .attributes_mut(EntityKind::Vertex)
        .add("v:height", 0.0f32)
    {
        for (i, h) in height.iter_mut().enumerate() {
            *h = f32::from(u8::try_from(i).unwrap_or(u8::MAX));
        }
    }
    if let Some(locked) = mesh
        .attributes_mut(EntityKind::Vertex)
        .add(names::LOCKED, false)
    {
        locked[a.index()] = true;
    }
    tracing::info!("built faces {hex} and {square}");
    Ok(mesh)
}

fn main() -> Result<(), MeshDrawError> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("compile=info".parse().unwrap_or_default())
        .add_directive("meshdraw=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut scene = Scene::new();
    let id = scene.add_model(build_mesh()?);

    let height = Drawable::new(
        "height",
        DrawableIntent::new(PrimitiveKind::Triangles)
            .with_coloring(ColoringMethod::ScalarField, EntityKind::Vertex, "v:height")
            .with_clamp(0.1, 0.1),
    );
    scene.add_drawable(id, height)?;

    for (_, drawable) in scene.drawables(id) {
        match drawable.buffer() {
            Some(buffer) => println!(
                "{:>8}: {:>3} vertices, {:>3} indices, visible: {}",
                drawable.name(),
                buffer.num_vertices(),
                buffer.indices.as_ref().map_or(0, Vec::len),
                drawable.is_visible()
            ),
            None => println!("{:>8}: not compiled", drawable.name()),
        }
    }

    if let meshdraw::Model::PolygonMesh(mesh) = scene.model(id)? {
        for t in 0..6 {
            if let Some(f) = mesh.face_of_triangle(t) {
                println!("triangle {t} -> face {f}");
            }
        }
    }
    Ok(())
}
