use crate::attributes::AttributeStore;
use crate::error::ModelError;
use crate::math::Vec3;

use super::connectivity::EdgeConnectivity;
use super::{compaction_map, flag, live_indices, names, set_flag, Edge, EntityKind, Vertex};

/// A set of vertices joined by edges, each edge referencing exactly two
/// distinct vertices.
#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    vertices: AttributeStore,
    edges: AttributeStore,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        let mut vertices = AttributeStore::new(EntityKind::Vertex);
        vertices.add(names::POINT, Vec3::zeros());
        vertices.add(names::VERTEX_DELETED, false);
        let mut edges = AttributeStore::new(EntityKind::Edge);
        edges.add(names::EDGE_CONNECTIVITY, EdgeConnectivity::default());
        edges.add(names::EDGE_DELETED, false);
        Self {
            name: String::new(),
            vertices,
            edges,
        }
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name of the model.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a vertex at `point`.
    pub fn add_vertex(&mut self, point: Vec3) -> Vertex {
        let v = Vertex::from_index(self.vertices.push());
        if let Some(points) = self.vertices.get_mut::<Vec3>(names::POINT) {
            points[v.index()] = point;
        }
        v
    }

    /// Adds an edge between two distinct live vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is invalid or both are the same.
    pub fn add_edge(&mut self, v0: Vertex, v1: Vertex) -> Result<Edge, ModelError> {
        for v in [v0, v1] {
            if !self.is_valid_vertex(v) {
                return Err(ModelError::InvalidHandle {
                    kind: EntityKind::Vertex,
                    index: v.idx(),
                });
            }
        }
        if v0 == v1 {
            return Err(ModelError::InvalidEdge(format!("{v0} is used twice")));
        }
        let e = Edge::from_index(self.edges.push());
        if let Some(conn) = self.edges.get_mut::<EdgeConnectivity>(names::EDGE_CONNECTIVITY) {
            conn[e.index()] = EdgeConnectivity {
                source: v0,
                target: v1,
            };
        }
        Ok(e)
    }

    /// Vertex property arrays.
    #[must_use]
    pub fn vertex_attributes(&self) -> &AttributeStore {
        &self.vertices
    }

    /// Mutable vertex property arrays.
    pub fn vertex_attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.vertices
    }

    /// Edge property arrays.
    #[must_use]
    pub fn edge_attributes(&self) -> &AttributeStore {
        &self.edges
    }

    /// Mutable edge property arrays.
    pub fn edge_attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.edges
    }

    /// Iterates over live vertices.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        live_indices(&self.vertices, names::VERTEX_DELETED).map(Vertex::from_index)
    }

    /// Iterates over live edges.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        live_indices(&self.edges, names::EDGE_DELETED).map(Edge::from_index)
    }

    /// Number of live vertices.
    #[must_use]
    pub fn n_vertices(&self) -> usize {
        self.vertices().count()
    }

    /// Number of live edges.
    #[must_use]
    pub fn n_edges(&self) -> usize {
        self.edges().count()
    }

    /// Positions indexed by raw vertex index.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        self.vertices.get::<Vec3>(names::POINT).unwrap_or_default()
    }

    fn connectivity(&self) -> &[EdgeConnectivity] {
        self.edges
            .get::<EdgeConnectivity>(names::EDGE_CONNECTIVITY)
            .unwrap_or_default()
    }

    /// The `i`-th end point (`0` = source, `1` = target) of `e`.
    #[must_use]
    pub fn vertex(&self, e: Edge, i: usize) -> Vertex {
        self.connectivity().get(e.index()).map_or(Vertex::INVALID, |c| {
            if i == 0 {
                c.source
            } else {
                c.target
            }
        })
    }

    /// Returns `true` if `v` is in bounds and not deleted.
    #[must_use]
    pub fn is_valid_vertex(&self, v: Vertex) -> bool {
        v.index() < self.vertices.len() && !flag(&self.vertices, names::VERTEX_DELETED, v.index())
    }

    /// Returns `true` if `e` is in bounds and not deleted.
    #[must_use]
    pub fn is_valid_edge(&self, e: Edge) -> bool {
        e.index() < self.edges.len() && !flag(&self.edges, names::EDGE_DELETED, e.index())
    }

    /// Flags `e` as deleted.
    pub fn delete_edge(&mut self, e: Edge) {
        set_flag(&mut self.edges, names::EDGE_DELETED, e.index());
    }

    /// Flags `v` and every edge incident to it as deleted.
    pub fn delete_vertex(&mut self, v: Vertex) {
        let incident: Vec<Edge> = self
            .edges()
            .filter(|&e| self.vertex(e, 0) == v || self.vertex(e, 1) == v)
            .collect();
        for e in incident {
            self.delete_edge(e);
        }
        set_flag(&mut self.vertices, names::VERTEX_DELETED, v.index());
    }

    /// Removes deleted entities from every property array and renumbers the
    /// edge end points.
    pub fn garbage_collection(&mut self) {
        let keep_v: Vec<bool> = (0..self.vertices.len())
            .map(|i| !flag(&self.vertices, names::VERTEX_DELETED, i))
            .collect();
        let keep_e: Vec<bool> = (0..self.edges.len())
            .map(|i| !flag(&self.edges, names::EDGE_DELETED, i))
            .collect();
        let vmap = compaction_map(&keep_v);
        let remap = |v: Vertex| {
            vmap.get(v.index())
                .copied()
                .flatten()
                .map_or(Vertex::INVALID, Vertex::new)
        };

        if let Some(conn) = self.edges.get_mut::<EdgeConnectivity>(names::EDGE_CONNECTIVITY) {
            for c in conn.iter_mut() {
                c.source = remap(c.source);
                c.target = remap(c.target);
            }
        }
        self.vertices.retain(&keep_v);
        self.edges.retain(&keep_e);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn path() -> (Graph, [Vertex; 3]) {
        let mut g = Graph::new();
        let a = g.add_vertex(Vec3::zeros());
        let b = g.add_vertex(Vec3::x());
        let c = g.add_vertex(Vec3::y());
        g.add_edge(a, b).unwrap();
        g.add_edge(b, c).unwrap();
        (g, [a, b, c])
    }

    #[test]
    fn edges_reference_two_vertices() {
        let (g, [a, b, _]) = path();
        let e = g.edges().next().unwrap();
        assert_eq!(g.vertex(e, 0), a);
        assert_eq!(g.vertex(e, 1), b);
    }

    #[test]
    fn loops_and_invalid_ends_are_rejected() {
        let (mut g, [a, ..]) = path();
        assert!(g.add_edge(a, a).is_err());
        assert!(g.add_edge(a, Vertex::new(99)).is_err());
    }

    #[test]
    fn deleting_vertex_removes_incident_edges() {
        let (mut g, [a, ..]) = path();
        g.delete_vertex(a);
        assert_eq!(g.n_vertices(), 2);
        assert_eq!(g.n_edges(), 1);

        g.garbage_collection();
        let e = g.edges().next().unwrap();
        assert_eq!(g.points()[g.vertex(e, 0).index()], Vec3::x());
        assert_eq!(g.points()[g.vertex(e, 1).index()], Vec3::y());
        assert_eq!(g.edge_attributes().len(), 1);
    }
}
