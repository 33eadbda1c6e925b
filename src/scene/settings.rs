use crate::math::Vec4;

/// Appearance defaults applied to the drawables a [`Scene`](super::Scene)
/// creates for new models.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub point_cloud_vertices_color: Vec4,
    pub point_cloud_vertices_visible: bool,

    pub surface_mesh_faces_color: Vec4,
    pub surface_mesh_faces_visible: bool,
    pub surface_mesh_edges_color: Vec4,
    pub surface_mesh_edges_visible: bool,
    pub surface_mesh_vertices_color: Vec4,
    pub surface_mesh_vertices_visible: bool,
    pub surface_mesh_borders_color: Vec4,
    pub surface_mesh_borders_visible: bool,
    pub surface_mesh_locks_color: Vec4,
    pub surface_mesh_locks_visible: bool,

    pub graph_vertices_color: Vec4,
    pub graph_vertices_visible: bool,
    pub graph_edges_color: Vec4,
    pub graph_edges_visible: bool,

    /// Fraction of samples clamped at the low end of default scalar fields.
    pub clamp_lower: f32,
    /// Fraction of samples clamped at the high end of default scalar fields.
    pub clamp_upper: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            point_cloud_vertices_color: Vec4::new(0.33, 0.67, 1.0, 1.0),
            point_cloud_vertices_visible: true,

            surface_mesh_faces_color: Vec4::new(1.0, 0.8, 0.4, 1.0),
            surface_mesh_faces_visible: true,
            surface_mesh_edges_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            surface_mesh_edges_visible: false,
            surface_mesh_vertices_color: Vec4::new(0.0, 1.0, 0.0, 1.0),
            surface_mesh_vertices_visible: false,
            surface_mesh_borders_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            surface_mesh_borders_visible: false,
            surface_mesh_locks_color: Vec4::new(1.0, 1.0, 0.0, 1.0),
            surface_mesh_locks_visible: false,

            graph_vertices_color: Vec4::new(0.8, 0.0, 0.5, 1.0),
            graph_vertices_visible: true,
            graph_edges_color: Vec4::new(1.0, 0.67, 0.5, 1.0),
            graph_edges_visible: true,

            clamp_lower: 0.0,
            clamp_upper: 0.0,
        }
    }
}
