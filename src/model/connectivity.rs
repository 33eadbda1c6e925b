//! Connectivity records stored as internal properties of a model.

use super::{Face, Halfedge, Vertex};

/// Per-vertex connectivity of a polygon mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexConnectivity {
    /// An outgoing halfedge, or invalid for isolated vertices.
    pub halfedge: Halfedge,
}

/// Per-halfedge connectivity of a polygon mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalfedgeConnectivity {
    /// Incident face, `None` on the boundary.
    pub face: Option<Face>,
    /// Vertex the halfedge points to.
    pub vertex: Vertex,
    /// Next halfedge within the incident face.
    pub next: Halfedge,
    /// Previous halfedge within the incident face.
    pub prev: Halfedge,
}

/// Per-face connectivity of a polygon mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceConnectivity {
    /// One of the halfedges bounding the face.
    pub halfedge: Halfedge,
}

/// Per-edge connectivity of a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeConnectivity {
    pub source: Vertex,
    pub target: Vertex,
}
