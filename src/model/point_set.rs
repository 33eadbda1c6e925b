use crate::attributes::AttributeStore;
use crate::math::Vec3;

use super::{flag, live_indices, names, set_flag, EntityKind, Vertex};

/// An unstructured set of points.
#[derive(Debug, Clone)]
pub struct PointSet {
    name: String,
    vertices: AttributeStore,
}

impl Default for PointSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PointSet {
    /// Creates an empty point set.
    #[must_use]
    pub fn new() -> Self {
        let mut vertices = AttributeStore::new(EntityKind::Vertex);
        vertices.add(names::POINT, Vec3::zeros());
        vertices.add(names::VERTEX_DELETED, false);
        Self {
            name: String::new(),
            vertices,
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

    /// Vertex property arrays.
    #[must_use]
    pub fn vertex_attributes(&self) -> &AttributeStore {
        &self.vertices
    }

    /// Mutable vertex property arrays.
    pub fn vertex_attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.vertices
    }

    /// Number of live vertices.
    #[must_use]
    pub fn n_vertices(&self) -> usize {
        self.vertices().count()
    }

    /// Length of the vertex arrays, deleted vertices included.
    #[must_use]
    pub fn vertices_size(&self) -> usize {
        self.vertices.len()
    }

    /// Iterates over live vertices.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        live_indices(&self.vertices, names::VERTEX_DELETED).map(Vertex::from_index)
    }

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

    /// Returns `true` if `v` is flagged deleted.
    #[must_use]
    pub fn is_deleted(&self, v: Vertex) -> bool {
        flag(&self.vertices, names::VERTEX_DELETED, v.index())
    }

    /// Returns `true` if `v` is in bounds and not deleted.
    #[must_use]
    pub fn is_valid(&self, v: Vertex) -> bool {
        v.index() < self.vertices.len() && !self.is_deleted(v)
    }

    /// Flags `v` as deleted. Storage is reclaimed by
    /// [`garbage_collection`](Self::garbage_collection).
    pub fn delete_vertex(&mut self, v: Vertex) {
        set_flag(&mut self.vertices, names::VERTEX_DELETED, v.index());
    }

    /// Removes deleted vertices from every property array.
    pub fn garbage_collection(&mut self) {
        let keep: Vec<bool> = (0..self.vertices.len())
            .map(|i| !self.is_deleted(Vertex::from_index(i)))
            .collect();
        self.vertices.retain(&keep);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn add_vertex_stores_position() {
        let mut cloud = PointSet::new();
        let v = cloud.add_vertex(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(cloud.position(v), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(cloud.n_vertices(), 1);
    }

    #[test]
    fn properties_follow_vertex_count() {
        let mut cloud = PointSet::new();
        cloud.add_vertex(Vec3::zeros());
        cloud
            .vertex_attributes_mut()
            .add("v:quality", 0.5f32)
            .unwrap();
        cloud.add_vertex(Vec3::x());
        let q = cloud.vertex_attributes().get::<f32>("v:quality").unwrap();
        assert_eq!(q, &[0.5, 0.5]);
    }

    #[test]
    fn garbage_collection_compacts_properties() {
        let mut cloud = PointSet::new();
        let a = cloud.add_vertex(Vec3::zeros());
        let b = cloud.add_vertex(Vec3::x());
        cloud.vertex_attributes_mut().add("v:id", 0u32).unwrap()[b.index()] = 42;
        cloud.delete_vertex(a);
        assert!(!cloud.is_valid(a));
        assert_eq!(cloud.vertices_size(), 2);
        assert_eq!(cloud.n_vertices(), 1);

        cloud.garbage_collection();
        assert_eq!(cloud.vertices_size(), 1);
        assert_eq!(cloud.points(), &[Vec3::x()]);
        assert_eq!(cloud.vertex_attributes().get::<u32>("v:id").unwrap(), &[42]);
    }
}
