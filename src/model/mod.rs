pub mod connectivity;
mod graph;
mod handle;
mod point_set;
mod polygon_mesh;

pub use graph::Graph;
pub use handle::{Edge, Face, Halfedge, Vertex};
pub use point_set::PointSet;
pub use polygon_mesh::{Corner, PolygonMesh};

use std::fmt;

use crate::attributes::AttributeStore;
use crate::math::{BoundingBox, Vec3};

/// Reserved property names shared by all model variants.
pub mod names {
    pub const POINT: &str = "v:point";
    pub const NORMAL: &str = "v:normal";
    pub const LOCKED: &str = "v:locked";
    pub const VERTEX_DELETED: &str = "v:deleted";
    pub const EDGE_DELETED: &str = "e:deleted";
    pub const FACE_DELETED: &str = "f:deleted";
    pub const TRIANGLE_RANGE: &str = "f:triangle_range";
    pub const VERTEX_CONNECTIVITY: &str = "v:connectivity";
    pub const HALFEDGE_CONNECTIVITY: &str = "h:connectivity";
    pub const FACE_CONNECTIVITY: &str = "f:connectivity";
    pub const EDGE_CONNECTIVITY: &str = "e:connectivity";

    /// Returns `true` for the arrays a model cannot live without: positions,
    /// deletion flags and connectivity.
    #[must_use]
    pub fn is_reserved(name: &str) -> bool {
        matches!(
            name,
            POINT
                | VERTEX_DELETED
                | EDGE_DELETED
                | FACE_DELETED
                | VERTEX_CONNECTIVITY
                | HALFEDGE_CONNECTIVITY
                | FACE_CONNECTIVITY
                | EDGE_CONNECTIVITY
        )
    }
}

/// The kinds of entities a property can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Vertex,
    Edge,
    Face,
    Halfedge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::Face => "face",
            Self::Halfedge => "halfedge",
        })
    }
}

/// A renderable model: one of a closed set of variants.
#[derive(Debug, Clone)]
pub enum Model {
    PointSet(PointSet),
    Graph(Graph),
    PolygonMesh(PolygonMesh),
}

impl Model {
    /// Name of the model.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::PointSet(m) => m.name(),
            Self::Graph(m) => m.name(),
            Self::PolygonMesh(m) => m.name(),
        }
    }

    /// Human-readable name of the variant.
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::PointSet(_) => "point set",
            Self::Graph(_) => "graph",
            Self::PolygonMesh(_) => "polygon mesh",
        }
    }

    /// Attribute store for `kind`, or `None` if the variant has no such
    /// entities.
    #[must_use]
    pub fn attributes(&self, kind: EntityKind) -> Option<&AttributeStore> {
        match (self, kind) {
            (Self::PointSet(m), EntityKind::Vertex) => Some(m.vertex_attributes()),
            (Self::Graph(m), EntityKind::Vertex) => Some(m.vertex_attributes()),
            (Self::Graph(m), EntityKind::Edge) => Some(m.edge_attributes()),
            (Self::PolygonMesh(m), kind) => Some(m.attributes(kind)),
            _ => None,
        }
    }

    /// Mutable variant of [`attributes`](Self::attributes).
    pub fn attributes_mut(&mut self, kind: EntityKind) -> Option<&mut AttributeStore> {
        match (self, kind) {
            (Self::PointSet(m), EntityKind::Vertex) => Some(m.vertex_attributes_mut()),
            (Self::Graph(m), EntityKind::Vertex) => Some(m.vertex_attributes_mut()),
            (Self::Graph(m), EntityKind::Edge) => Some(m.edge_attributes_mut()),
            (Self::PolygonMesh(m), kind) => Some(m.attributes_mut(kind)),
            _ => None,
        }
    }

    /// Number of live (non-deleted) entities of `kind`.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        match (self, kind) {
            (Self::PointSet(m), EntityKind::Vertex) => m.n_vertices(),
            (Self::Graph(m), EntityKind::Vertex) => m.n_vertices(),
            (Self::Graph(m), EntityKind::Edge) => m.n_edges(),
            (Self::PolygonMesh(m), EntityKind::Vertex) => m.n_vertices(),
            (Self::PolygonMesh(m), EntityKind::Edge) => m.n_edges(),
            (Self::PolygonMesh(m), EntityKind::Face) => m.n_faces(),
            (Self::PolygonMesh(m), EntityKind::Halfedge) => m.n_halfedges(),
            _ => 0,
        }
    }

    /// Raw indices of the live entities of `kind`, in index order.
    #[must_use]
    pub fn iterate(&self, kind: EntityKind) -> Box<dyn Iterator<Item = usize> + '_> {
        let deleted = match kind {
            EntityKind::Vertex => names::VERTEX_DELETED,
            EntityKind::Edge | EntityKind::Halfedge => names::EDGE_DELETED,
            EntityKind::Face => names::FACE_DELETED,
        };
        match (self.attributes(kind), self, kind) {
            (Some(_), Self::PolygonMesh(m), EntityKind::Halfedge) => {
                Box::new(m.halfedges().map(Halfedge::index))
            }
            (Some(store), _, _) => Box::new(live_indices(store, deleted)),
            (None, _, _) => Box::new(std::iter::empty()),
        }
    }

    /// Returns `true` for polygon meshes whose live faces are all triangles.
    #[must_use]
    pub fn is_triangle_mesh(&self) -> bool {
        match self {
            Self::PolygonMesh(m) => m.is_triangle_mesh(),
            Self::PointSet(_) | Self::Graph(_) => false,
        }
    }

    /// Returns `true` if the model has no live vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count(EntityKind::Vertex) == 0
    }

    /// Vertex positions, indexed by raw vertex index.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        match self {
            Self::PointSet(m) => m.points(),
            Self::Graph(m) => m.points(),
            Self::PolygonMesh(m) => m.points(),
        }
    }

    /// Bounding box of the live vertices.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let points = self.points();
        BoundingBox::from_points(self.iterate(EntityKind::Vertex).map(|i| &points[i]))
    }
}

impl From<PointSet> for Model {
    fn from(m: PointSet) -> Self {
        Self::PointSet(m)
    }
}

impl From<Graph> for Model {
    fn from(m: Graph) -> Self {
        Self::Graph(m)
    }
}

impl From<PolygonMesh> for Model {
    fn from(m: PolygonMesh) -> Self {
        Self::PolygonMesh(m)
    }
}

/// Indices of the entities of `store` not flagged in its `deleted` property.
pub(crate) fn live_indices<'a>(
    store: &'a AttributeStore,
    deleted: &str,
) -> impl Iterator<Item = usize> + 'a {
    let flags = store.get::<bool>(deleted);
    (0..store.len()).filter(move |&i| !flags.is_some_and(|f| f[i]))
}

/// Reads boolean flag `name` of entity `index`; missing flags read `false`.
pub(crate) fn flag(store: &AttributeStore, name: &str, index: usize) -> bool {
    store
        .get::<bool>(name)
        .and_then(|d| d.get(index).copied())
        .unwrap_or(false)
}

/// Raises boolean flag `name` of entity `index`.
pub(crate) fn set_flag(store: &mut AttributeStore, name: &str, index: usize) {
    if let Some(f) = store.get_mut::<bool>(name).and_then(|d| d.get_mut(index)) {
        *f = true;
    }
}

/// Builds the old-to-new index map for a compaction keeping `keep`.
pub(crate) fn compaction_map(keep: &[bool]) -> Vec<Option<u32>> {
    let mut next = 0u32;
    keep.iter()
        .map(|&k| {
            k.then(|| {
                let i = next;
                next += 1;
                i
            })
        })
        .collect()
}
