use std::collections::{BTreeMap, HashSet};

use crate::attributes::AttributeStore;
use crate::compile::TriangleRange;
use crate::error::ModelError;
use crate::math::polygon::{corner_angle, polygon_normal};
use crate::math::Vec3;

use super::connectivity::{FaceConnectivity, HalfedgeConnectivity, VertexConnectivity};
use super::{
    compaction_map, flag, live_indices, names, set_flag, Edge, EntityKind, Face, Halfedge, Vertex,
};

/// One vertex-within-face instance: the vertex and its outgoing halfedge
/// inside that face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    pub vertex: Vertex,
    pub halfedge: Halfedge,
}

/// A polygon mesh stored as a halfedge data structure.
///
/// Faces are ordered loops of corners and need not be planar, convex or
/// triangular. Edge `e` owns halfedges `2e` and `2e + 1`; boundary
/// halfedges carry no `next`/`prev` links.
#[derive(Debug, Clone)]
pub struct PolygonMesh {
    name: String,
    vertices: AttributeStore,
    halfedges: AttributeStore,
    edges: AttributeStore,
    faces: AttributeStore,
    edge_lookup: BTreeMap<(Vertex, Vertex), Halfedge>,
}

impl Default for PolygonMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonMesh {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        let mut vertices = AttributeStore::new(EntityKind::Vertex);
        vertices.add(names::POINT, Vec3::zeros());
        vertices.add(names::VERTEX_CONNECTIVITY, VertexConnectivity::default());
        vertices.add(names::VERTEX_DELETED, false);
        let mut halfedges = AttributeStore::new(EntityKind::Halfedge);
        halfedges.add(names::HALFEDGE_CONNECTIVITY, HalfedgeConnectivity::default());
        let mut edges = AttributeStore::new(EntityKind::Edge);
        edges.add(names::EDGE_DELETED, false);
        let mut faces = AttributeStore::new(EntityKind::Face);
        faces.add(names::FACE_CONNECTIVITY, FaceConnectivity::default());
        faces.add(names::FACE_DELETED, false);
        Self {
            name: String::new(),
            vertices,
            halfedges,
            edges,
            faces,
            edge_lookup: BTreeMap::new(),
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

    /// Property arrays of `kind`.
    #[must_use]
    pub fn attributes(&self, kind: EntityKind) -> &AttributeStore {
        match kind {
            EntityKind::Vertex => &self.vertices,
            EntityKind::Edge => &self.edges,
            EntityKind::Face => &self.faces,
            EntityKind::Halfedge => &self.halfedges,
        }
    }

    /// Mutable property arrays of `kind`.
    pub fn attributes_mut(&mut self, kind: EntityKind) -> &mut AttributeStore {
        match kind {
            EntityKind::Vertex => &mut self.vertices,
            EntityKind::Edge => &mut self.edges,
            EntityKind::Face => &mut self.faces,
            EntityKind::Halfedge => &mut self.halfedges,
        }
    }

    // --- Connectivity access ---

    fn vconn(&self) -> &[VertexConnectivity] {
        self.vertices
            .get::<VertexConnectivity>(names::VERTEX_CONNECTIVITY)
            .unwrap_or_default()
    }

    fn hconn(&self) -> &[HalfedgeConnectivity] {
        self.halfedges
            .get::<HalfedgeConnectivity>(names::HALFEDGE_CONNECTIVITY)
            .unwrap_or_default()
    }

    fn fconn(&self) -> &[FaceConnectivity] {
        self.faces
            .get::<FaceConnectivity>(names::FACE_CONNECTIVITY)
            .unwrap_or_default()
    }

    fn hconn_mut(&mut self) -> Option<&mut [HalfedgeConnectivity]> {
        self.halfedges
            .get_mut::<HalfedgeConnectivity>(names::HALFEDGE_CONNECTIVITY)
    }

    fn vconn_mut(&mut self) -> Option<&mut [VertexConnectivity]> {
        self.vertices
            .get_mut::<VertexConnectivity>(names::VERTEX_CONNECTIVITY)
    }

    /// Vertex `h` points to.
    #[must_use]
    pub fn to_vertex(&self, h: Halfedge) -> Vertex {
        self.hconn().get(h.index()).map_or(Vertex::INVALID, |c| c.vertex)
    }

    /// Vertex `h` emanates from.
    #[must_use]
    pub fn from_vertex(&self, h: Halfedge) -> Vertex {
        self.to_vertex(Self::opposite(h))
    }

    /// The other halfedge of the same edge.
    #[must_use]
    pub fn opposite(h: Halfedge) -> Halfedge {
        Halfedge::new(h.idx() ^ 1)
    }

    /// Next halfedge within the incident face.
    #[must_use]
    pub fn next(&self, h: Halfedge) -> Halfedge {
        self.hconn().get(h.index()).map_or(Halfedge::INVALID, |c| c.next)
    }

    /// Previous halfedge within the incident face.
    #[must_use]
    pub fn prev(&self, h: Halfedge) -> Halfedge {
        self.hconn().get(h.index()).map_or(Halfedge::INVALID, |c| c.prev)
    }

    /// Face incident to `h`, `None` on the boundary.
    #[must_use]
    pub fn face(&self, h: Halfedge) -> Option<Face> {
        self.hconn().get(h.index()).and_then(|c| c.face)
    }

    /// Edge containing `h`.
    #[must_use]
    pub fn edge(h: Halfedge) -> Edge {
        Edge::new(h.idx() >> 1)
    }

    /// The `i`-th (`0` or `1`) halfedge of `e`.
    #[must_use]
    pub fn halfedge(e: Edge, i: u32) -> Halfedge {
        Halfedge::new((e.idx() << 1) + (i & 1))
    }

    /// The `i`-th (`0` or `1`) end point of `e`.
    #[must_use]
    pub fn vertex(&self, e: Edge, i: u32) -> Vertex {
        self.to_vertex(Self::halfedge(e, i))
    }

    /// A halfedge bounding `f`.
    #[must_use]
    pub fn face_halfedge(&self, f: Face) -> Halfedge {
        self.fconn().get(f.index()).map_or(Halfedge::INVALID, |c| c.halfedge)
    }

    /// An outgoing halfedge of `v`, invalid for isolated vertices.
    #[must_use]
    pub fn vertex_halfedge(&self, v: Vertex) -> Halfedge {
        self.vconn().get(v.index()).map_or(Halfedge::INVALID, |c| c.halfedge)
    }

    /// Halfedge from `from` to `to`, if the two vertices are joined.
    #[must_use]
    pub fn find_halfedge(&self, from: Vertex, to: Vertex) -> Option<Halfedge> {
        self.edge_lookup.get(&(from, to)).copied()
    }

    /// Returns `true` if `h` has no incident face.
    #[must_use]
    pub fn is_boundary_halfedge(&self, h: Halfedge) -> bool {
        self.face(h).is_none()
    }

    /// Returns `true` if either halfedge of `e` lies on the boundary.
    #[must_use]
    pub fn is_boundary(&self, e: Edge) -> bool {
        self.is_boundary_halfedge(Self::halfedge(e, 0))
            || self.is_boundary_halfedge(Self::halfedge(e, 1))
    }

    // --- Iteration ---

    /// Iterates over live vertices.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        live_indices(&self.vertices, names::VERTEX_DELETED).map(Vertex::from_index)
    }

    /// Iterates over live edges.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        live_indices(&self.edges, names::EDGE_DELETED).map(Edge::from_index)
    }

    /// Iterates over the halfedges of live edges.
    pub fn halfedges(&self) -> impl Iterator<Item = Halfedge> + '_ {
        self.edges()
            .flat_map(|e| [Self::halfedge(e, 0), Self::halfedge(e, 1)])
    }

    /// Iterates over live faces.
    pub fn faces(&self) -> impl Iterator<Item = Face> + '_ {
        live_indices(&self.faces, names::FACE_DELETED).map(Face::from_index)
    }

    /// Halfedges around `f`, starting at [`face_halfedge`](Self::face_halfedge).
    pub fn face_halfedges(&self, f: Face) -> impl Iterator<Item = Halfedge> + '_ {
        let start = self.face_halfedge(f);
        let limit = self.halfedges.len();
        std::iter::successors((!start.is_invalid()).then_some(start), move |&h| {
            let n = self.next(h);
            (n != start && !n.is_invalid()).then_some(n)
        })
        .take(limit)
    }

    /// Vertices around `f`, in loop order.
    pub fn face_vertices(&self, f: Face) -> impl Iterator<Item = Vertex> + '_ {
        self.face_halfedges(f).map(|h| self.from_vertex(h))
    }

    /// Corners of `f`, in loop order.
    pub fn corners(&self, f: Face) -> impl Iterator<Item = Corner> + '_ {
        self.face_halfedges(f).map(|h| Corner {
            vertex: self.from_vertex(h),
            halfedge: h,
        })
    }

    /// Number of corners of `f`.
    #[must_use]
    pub fn valence(&self, f: Face) -> usize {
        self.face_halfedges(f).count()
    }

    // --- Counts ---

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

    /// Number of halfedges of live edges.
    #[must_use]
    pub fn n_halfedges(&self) -> usize {
        2 * self.n_edges()
    }

    /// Number of live faces.
    #[must_use]
    pub fn n_faces(&self) -> usize {
        self.faces().count()
    }

    /// Length of the vertex arrays, deleted vertices included.
    #[must_use]
    pub fn vertices_size(&self) -> usize {
        self.vertices.len()
    }

    /// Length of the face arrays, deleted faces included.
    #[must_use]
    pub fn faces_size(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if every live face is a triangle.
    #[must_use]
    pub fn is_triangle_mesh(&self) -> bool {
        self.faces().all(|f| self.valence(f) == 3)
    }

    // --- Validity ---

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

    /// Returns `true` if `f` is in bounds and not deleted.
    #[must_use]
    pub fn is_valid_face(&self, f: Face) -> bool {
        f.index() < self.faces.len() && !flag(&self.faces, names::FACE_DELETED, f.index())
    }

    // --- Geometry ---

    /// Positions indexed by raw vertex index.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        self.vertices.get::<Vec3>(names::POINT).unwrap_or_default()
    }

    /// Position of `v`.
    #[must_use]
    pub fn position(&self, v: Vertex) -> Option<Vec3> {
        self.points().get(v.index()).copied()
    }

    /// Unit normal of `f` (Newell's method); zero for degenerate faces.
    #[must_use]
    pub fn compute_face_normal(&self, f: Face) -> Vec3 {
        let points = self.points();
        let loop_points: Vec<Vec3> = self.face_vertices(f).map(|v| points[v.index()]).collect();
        polygon_normal(&loop_points)
    }

    /// Angle-weighted vertex normals, indexed by raw vertex index.
    ///
    /// Vertices without incident faces get a zero normal.
    #[must_use]
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let points = self.points();
        let mut normals = vec![Vec3::zeros(); self.vertices.len()];
        for f in self.faces() {
            let n = self.compute_face_normal(f);
            let loop_vertices: Vec<Vertex> = self.face_vertices(f).collect();
            let k = loop_vertices.len();
            for i in 0..k {
                let prev = points[loop_vertices[(i + k - 1) % k].index()];
                let curr = points[loop_vertices[i].index()];
                let next = points[loop_vertices[(i + 1) % k].index()];
                normals[loop_vertices[i].index()] += n * corner_angle(&prev, &curr, &next);
            }
        }
        for n in &mut normals {
            let len = n.norm();
            if len > f32::EPSILON {
                *n /= len;
            }
        }
        normals
    }

    /// Stores [`vertex_normals`](Self::vertex_normals) as the `v:normal`
    /// property.
    pub fn update_vertex_normals(&mut self) {
        let normals = self.vertex_normals();
        if let Some(prop) = self.vertices.get_or_add(names::NORMAL, Vec3::zeros()) {
            prop.copy_from_slice(&normals);
        }
    }

    /// Triangle range of every face, written by the last triangle compile.
    #[must_use]
    pub fn triangle_ranges(&self) -> Option<&[TriangleRange]> {
        self.faces.get::<TriangleRange>(names::TRIANGLE_RANGE)
    }

    /// Maps a triangle ordinal of the last compiled triangle buffer back to
    /// its source face.
    #[must_use]
    pub fn face_of_triangle(&self, triangle: u32) -> Option<Face> {
        let ranges = self.triangle_ranges()?;
        let faces: Vec<Face> = self.faces().collect();
        let i = faces.partition_point(|f| ranges[f.index()].end() <= triangle);
        faces
            .get(i)
            .copied()
            .filter(|f| ranges[f.index()].contains(triangle))
    }

    // --- Construction ---

    /// Adds a vertex at `point`.
    pub fn add_vertex(&mut self, point: Vec3) -> Vertex {
        let v = Vertex::from_index(self.vertices.push());
        if let Some(points) = self.vertices.get_mut::<Vec3>(names::POINT) {
            points[v.index()] = point;
        }
        v
    }

    fn new_edge(&mut self, from: Vertex, to: Vertex) -> Halfedge {
        let e = Edge::from_index(self.edges.push());
        self.halfedges.push();
        self.halfedges.push();
        let h0 = Self::halfedge(e, 0);
        let h1 = Self::halfedge(e, 1);
        if let Some(conn) = self.hconn_mut() {
            conn[h0.index()].vertex = to;
            conn[h1.index()].vertex = from;
        }
        self.edge_lookup.insert((from, to), h0);
        self.edge_lookup.insert((to, from), h1);
        h0
    }

    /// Adds a face bounded by `vertices` in loop order.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than three vertices are given, a vertex is
    /// invalid or repeated, or an edge of the loop already has a face on
    /// the same side (a complex edge).
    pub fn add_face(&mut self, vertices: &[Vertex]) -> Result<Face, ModelError> {
        let n = vertices.len();
        if n < 3 {
            return Err(ModelError::InvalidFace(format!(
                "a face needs at least 3 vertices, got {n}"
            )));
        }
        let mut seen = HashSet::with_capacity(n);
        for &v in vertices {
            if !self.is_valid_vertex(v) {
                return Err(ModelError::InvalidHandle {
                    kind: EntityKind::Vertex,
                    index: v.idx(),
                });
            }
            if !seen.insert(v) {
                return Err(ModelError::InvalidFace(format!("vertex {v} appears twice")));
            }
        }
        for i in 0..n {
            let (a, b) = (vertices[i], vertices[(i + 1) % n]);
            if let Some(h) = self.find_halfedge(a, b) {
                if !self.is_boundary_halfedge(h) {
                    return Err(ModelError::ComplexEdge {
                        from: a.idx(),
                        to: b.idx(),
                    });
                }
            }
        }

        let mut loop_halfedges = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (vertices[i], vertices[(i + 1) % n]);
            let h = match self.find_halfedge(a, b) {
                Some(h) => h,
                None => self.new_edge(a, b),
            };
            loop_halfedges.push(h);
        }

        let f = Face::from_index(self.faces.push());
        if let Some(conn) = self
            .faces
            .get_mut::<FaceConnectivity>(names::FACE_CONNECTIVITY)
        {
            conn[f.index()].halfedge = loop_halfedges[0];
        }
        if let Some(conn) = self.hconn_mut() {
            for i in 0..n {
                let h = loop_halfedges[i];
                let next = loop_halfedges[(i + 1) % n];
                conn[h.index()].face = Some(f);
                conn[h.index()].next = next;
                conn[next.index()].prev = h;
            }
        }
        if let Some(conn) = self.vconn_mut() {
            for (v, h) in vertices.iter().zip(&loop_halfedges) {
                if conn[v.index()].halfedge.is_invalid() {
                    conn[v.index()].halfedge = *h;
                }
            }
        }
        Ok(f)
    }

    /// Adds a triangle.
    ///
    /// # Errors
    ///
    /// See [`add_face`](Self::add_face).
    pub fn add_triangle(&mut self, a: Vertex, b: Vertex, c: Vertex) -> Result<Face, ModelError> {
        self.add_face(&[a, b, c])
    }

    /// Adds a quad.
    ///
    /// # Errors
    ///
    /// See [`add_face`](Self::add_face).
    pub fn add_quad(
        &mut self,
        a: Vertex,
        b: Vertex,
        c: Vertex,
        d: Vertex,
    ) -> Result<Face, ModelError> {
        self.add_face(&[a, b, c, d])
    }

    // --- Removal ---

    fn remove_edge(&mut self, e: Edge) {
        let h0 = Self::halfedge(e, 0);
        let (a, b) = (self.from_vertex(h0), self.to_vertex(h0));
        self.edge_lookup.remove(&(a, b));
        self.edge_lookup.remove(&(b, a));
        set_flag(&mut self.edges, names::EDGE_DELETED, e.index());
    }

    /// Re-targets the outgoing halfedge of `v` to a live edge, or deletes
    /// `v` when it has become isolated.
    fn refresh_vertex(&mut self, v: Vertex) {
        let current = self.vertex_halfedge(v);
        if !current.is_invalid() && self.is_valid_edge(Self::edge(current)) {
            return;
        }
        // keys are ordered by source vertex, so this visits only edges of `v`
        let outgoing = self
            .edge_lookup
            .range((v, Vertex::new(0))..=(v, Vertex::INVALID))
            .next()
            .map(|(_, &h)| h);
        match outgoing {
            Some(h) => {
                if let Some(conn) = self.vconn_mut() {
                    conn[v.index()].halfedge = h;
                }
            }
            None => {
                if let Some(conn) = self.vconn_mut() {
                    conn[v.index()].halfedge = Halfedge::INVALID;
                }
                set_flag(&mut self.vertices, names::VERTEX_DELETED, v.index());
            }
        }
    }

    /// Deletes `f`, along with edges and vertices it leaves isolated.
    pub fn delete_face(&mut self, f: Face) {
        if !self.is_valid_face(f) {
            return;
        }
        let loop_halfedges: Vec<Halfedge> = self.face_halfedges(f).collect();
        let loop_vertices: Vec<Vertex> = loop_halfedges.iter().map(|&h| self.from_vertex(h)).collect();
        set_flag(&mut self.faces, names::FACE_DELETED, f.index());
        if let Some(conn) = self.hconn_mut() {
            for h in &loop_halfedges {
                let c = &mut conn[h.index()];
                c.face = None;
                c.next = Halfedge::INVALID;
                c.prev = Halfedge::INVALID;
            }
        }
        for &h in &loop_halfedges {
            if self.is_boundary_halfedge(Self::opposite(h)) {
                self.remove_edge(Self::edge(h));
            }
        }
        for v in loop_vertices {
            self.refresh_vertex(v);
        }
    }

    /// Deletes every face incident to `e`, and `e` itself.
    pub fn delete_edge(&mut self, e: Edge) {
        if !self.is_valid_edge(e) {
            return;
        }
        for i in 0..2 {
            if let Some(f) = self.face(Self::halfedge(e, i)) {
                self.delete_face(f);
            }
        }
    }

    /// Deletes every face incident to `v`, and `v` itself.
    pub fn delete_vertex(&mut self, v: Vertex) {
        if !self.is_valid_vertex(v) {
            return;
        }
        let incident: Vec<Face> = self
            .faces()
            .filter(|&f| self.face_vertices(f).any(|w| w == v))
            .collect();
        for f in incident {
            self.delete_face(f);
        }
        set_flag(&mut self.vertices, names::VERTEX_DELETED, v.index());
    }

    /// Removes deleted entities from every property array and renumbers the
    /// connectivity.
    pub fn garbage_collection(&mut self) {
        let keep_v: Vec<bool> = (0..self.vertices.len())
            .map(|i| !flag(&self.vertices, names::VERTEX_DELETED, i))
            .collect();
        let keep_e: Vec<bool> = (0..self.edges.len())
            .map(|i| !flag(&self.edges, names::EDGE_DELETED, i))
            .collect();
        let keep_f: Vec<bool> = (0..self.faces.len())
            .map(|i| !flag(&self.faces, names::FACE_DELETED, i))
            .collect();
        let keep_h: Vec<bool> = (0..self.halfedges.len()).map(|i| keep_e[i >> 1]).collect();

        let vmap = compaction_map(&keep_v);
        let emap = compaction_map(&keep_e);
        let fmap = compaction_map(&keep_f);
        let map_v = |v: Vertex| {
            vmap.get(v.index())
                .copied()
                .flatten()
                .map_or(Vertex::INVALID, Vertex::new)
        };
        let map_h = |h: Halfedge| {
            emap.get(h.index() >> 1)
                .copied()
                .flatten()
                .map_or(Halfedge::INVALID, |e| Halfedge::new((e << 1) + (h.idx() & 1)))
        };
        let map_f = |f: Face| fmap.get(f.index()).copied().flatten().map(Face::new);

        if let Some(conn) = self
            .vertices
            .get_mut::<VertexConnectivity>(names::VERTEX_CONNECTIVITY)
        {
            for c in conn.iter_mut() {
                c.halfedge = map_h(c.halfedge);
            }
        }
        if let Some(conn) = self
            .halfedges
            .get_mut::<HalfedgeConnectivity>(names::HALFEDGE_CONNECTIVITY)
        {
            for c in conn.iter_mut() {
                c.vertex = map_v(c.vertex);
                c.next = map_h(c.next);
                c.prev = map_h(c.prev);
                c.face = c.face.and_then(map_f);
            }
        }
        if let Some(conn) = self
            .faces
            .get_mut::<FaceConnectivity>(names::FACE_CONNECTIVITY)
        {
            for c in conn.iter_mut() {
                c.halfedge = map_h(c.halfedge);
            }
        }

        self.vertices.retain(&keep_v);
        self.halfedges.retain(&keep_h);
        self.edges.retain(&keep_e);
        self.faces.retain(&keep_f);

        self.edge_lookup.clear();
        for i in 0..self.edges.len() {
            let e = Edge::from_index(i);
            let h0 = Self::halfedge(e, 0);
            let (a, b) = (self.from_vertex(h0), self.to_vertex(h0));
            self.edge_lookup.insert((a, b), h0);
            self.edge_lookup.insert((b, a), Self::opposite(h0));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Two triangles sharing the diagonal of the unit square.
    fn two_triangles() -> (PolygonMesh, [Vertex; 4]) {
        let mut mesh = PolygonMesh::new();
        let a = mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Vec3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Vec3::new(1.0, 1.0, 0.0));
        let d = mesh.add_vertex(Vec3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(a, b, c).unwrap();
        mesh.add_triangle(a, c, d).unwrap();
        (mesh, [a, b, c, d])
    }

    #[test]
    fn shared_edge_is_reused() {
        let (mesh, [a, _, c, _]) = two_triangles();
        assert_eq!(mesh.n_edges(), 5);
        assert_eq!(mesh.n_faces(), 2);
        let h = mesh.find_halfedge(a, c).unwrap();
        let opp = mesh.find_halfedge(c, a).unwrap();
        assert_eq!(PolygonMesh::opposite(h), opp);
        assert!(!mesh.is_boundary(PolygonMesh::edge(h)));
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.from_vertex(mesh.vertex_halfedge(a)), a);
    }

    #[test]
    fn boundary_edges_of_two_triangles() {
        let (mesh, _) = two_triangles();
        let boundary = mesh.edges().filter(|&e| mesh.is_boundary(e)).count();
        assert_eq!(boundary, 4);
    }

    #[test]
    fn corners_follow_input_order() {
        let mut mesh = PolygonMesh::new();
        let v: Vec<Vertex> = (0..5)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f32;
                mesh.add_vertex(Vec3::new(t.cos(), t.sin(), 0.0))
            })
            .collect();
        let f = mesh.add_face(&v).unwrap();
        let corners: Vec<Vertex> = mesh.corners(f).map(|c| c.vertex).collect();
        assert_eq!(corners, v);
        for c in mesh.corners(f) {
            assert_eq!(mesh.from_vertex(c.halfedge), c.vertex);
        }
        assert_eq!(mesh.valence(f), 5);
    }

    #[test]
    fn rejects_degenerate_and_complex_faces() {
        let (mut mesh, [a, b, c, d]) = two_triangles();
        assert!(matches!(
            mesh.add_face(&[a, b]),
            Err(ModelError::InvalidFace(_))
        ));
        assert!(matches!(
            mesh.add_face(&[a, b, a]),
            Err(ModelError::InvalidFace(_))
        ));
        // a -> b already bounds the first triangle
        assert!(matches!(
            mesh.add_face(&[a, b, d]),
            Err(ModelError::ComplexEdge { .. })
        ));
        assert!(matches!(
            mesh.add_face(&[a, c, Vertex::new(42)]),
            Err(ModelError::InvalidHandle { .. })
        ));
        assert_eq!(mesh.n_faces(), 2);
    }

    #[test]
    fn face_normal_of_ccw_square() {
        let mut mesh = PolygonMesh::new();
        let v: Vec<Vertex> = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(Vec3::new(x, y, 0.0)))
            .collect();
        let f = mesh.add_face(&v).unwrap();
        assert_relative_eq!(mesh.compute_face_normal(f), Vec3::z(), epsilon = 1e-6);
    }

    #[test]
    fn vertex_normals_are_unit_length() {
        let (mut mesh, _) = two_triangles();
        mesh.update_vertex_normals();
        let normals = mesh
            .attributes(EntityKind::Vertex)
            .get::<Vec3>(names::NORMAL)
            .unwrap();
        for n in normals {
            assert_relative_eq!(*n, Vec3::z(), epsilon = 1e-6);
        }
    }

    #[test]
    fn delete_face_removes_isolated_elements() {
        let (mut mesh, [_, b, _, _]) = two_triangles();
        let first = mesh.faces().next().unwrap();
        mesh.delete_face(first);
        assert_eq!(mesh.n_faces(), 1);
        assert_eq!(mesh.n_edges(), 3);
        assert!(!mesh.is_valid_vertex(b));
        assert_eq!(mesh.n_vertices(), 3);
    }

    #[test]
    fn delete_face_retargets_shared_vertices() {
        let (mut mesh, [a, b, c, d]) = two_triangles();
        let first = mesh.faces().next().unwrap();
        assert_eq!(mesh.to_vertex(mesh.vertex_halfedge(a)), b);
        mesh.delete_face(first);
        for v in [a, c, d] {
            let h = mesh.vertex_halfedge(v);
            assert!(mesh.is_valid_vertex(v));
            assert!(mesh.is_valid_edge(PolygonMesh::edge(h)));
            assert_eq!(mesh.from_vertex(h), v);
        }
        assert_ne!(mesh.to_vertex(mesh.vertex_halfedge(a)), b);

        let second = mesh.faces().next().unwrap();
        mesh.delete_face(second);
        assert_eq!(mesh.n_vertices(), 0);
        assert!(mesh.vertex_halfedge(a).is_invalid());
    }

    #[test]
    fn garbage_collection_renumbers_connectivity() {
        let (mut mesh, [_, b, _, _]) = two_triangles();
        mesh.attributes_mut(EntityKind::Face)
            .add("f:id", 0i32)
            .unwrap()[1] = 7;
        mesh.delete_vertex(b);
        mesh.garbage_collection();

        assert_eq!(mesh.vertices_size(), 3);
        assert_eq!(mesh.faces_size(), 1);
        assert_eq!(mesh.attributes(EntityKind::Halfedge).len(), 6);
        let f = mesh.faces().next().unwrap();
        let loop_points: Vec<Vec3> = mesh
            .face_vertices(f)
            .map(|v| mesh.position(v).unwrap())
            .collect();
        assert_eq!(
            loop_points,
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0)
            ]
        );
        assert_eq!(
            mesh.attributes(EntityKind::Face).get::<i32>("f:id").unwrap(),
            &[7]
        );
        let (a, c) = (Vertex::new(0), Vertex::new(1));
        assert!(mesh.find_halfedge(a, c).is_some());
    }

    #[test]
    fn face_of_triangle_uses_ranges() {
        let (mut mesh, _) = two_triangles();
        let ranges = mesh
            .attributes_mut(EntityKind::Face)
            .add(names::TRIANGLE_RANGE, TriangleRange::default())
            .unwrap();
        ranges[0] = TriangleRange::new(0, 1);
        ranges[1] = TriangleRange::new(1, 1);
        assert_eq!(mesh.face_of_triangle(0), Some(Face::new(0)));
        assert_eq!(mesh.face_of_triangle(1), Some(Face::new(1)));
        assert_eq!(mesh.face_of_triangle(2), None);
    }
}
