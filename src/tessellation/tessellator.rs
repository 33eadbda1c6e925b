use std::collections::HashMap;

use tracing::{error, warn};

use crate::math::{to_f64, Vec3, Vector3};

use super::triangulate::triangulate;
use super::{TessVertex, WindingRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InPolygon,
    InContour,
}

/// Incremental polygon tessellator.
///
/// Polygons are described with `begin_polygon`, one or more
/// `begin_contour` / `add_vertex` / `end_contour` groups, and
/// `end_polygon`. Triangles accumulate across polygons; vertices are
/// deduplicated within a polygon only, so two faces never share an output
/// vertex.
#[derive(Debug, Clone)]
pub struct Tessellator {
    rule: WindingRule,
    state: State,
    normal: Vector3,
    contours: Vec<Vec<TessVertex>>,
    vertex_data_size: Option<usize>,
    vertices: Vec<TessVertex>,
    elements: Vec<[u32; 3]>,
    num_elements_in_polygon: usize,
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl Tessellator {
    /// Creates an empty tessellator using [`WindingRule::Odd`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            rule: WindingRule::default(),
            state: State::Idle,
            normal: Vector3::zeros(),
            contours: Vec::new(),
            vertex_data_size: None,
            vertices: Vec::new(),
            elements: Vec::new(),
            num_elements_in_polygon: 0,
        }
    }

    /// Sets the winding rule used by subsequent polygons.
    #[must_use]
    pub fn with_winding_rule(mut self, rule: WindingRule) -> Self {
        self.rule = rule;
        self
    }

    /// Sets the winding rule used by subsequent polygons.
    pub fn set_winding_rule(&mut self, rule: WindingRule) {
        self.rule = rule;
    }

    /// Current winding rule.
    #[must_use]
    pub fn winding_rule(&self) -> WindingRule {
        self.rule
    }

    fn expect_state(&self, expected: State, call: &str) -> bool {
        debug_assert_eq!(self.state, expected, "Tessellator::{call} out of order");
        if self.state == expected {
            true
        } else {
            error!(
                "Tessellator::{call} called in state {:?}, expected {:?}",
                self.state, expected
            );
            false
        }
    }

    /// Starts a polygon lying in the plane orthogonal to `normal`.
    ///
    /// A zero normal lets the tessellator estimate the plane from the
    /// contours.
    pub fn begin_polygon(&mut self, normal: &Vec3) {
        if !self.expect_state(State::Idle, "begin_polygon") {
            return;
        }
        self.normal = to_f64(normal);
        self.contours.clear();
        self.num_elements_in_polygon = 0;
        self.state = State::InPolygon;
    }

    /// Starts a new closed contour of the current polygon.
    pub fn begin_contour(&mut self) {
        if !self.expect_state(State::InPolygon, "begin_contour") {
            return;
        }
        self.contours.push(Vec::new());
        self.state = State::InContour;
    }

    /// Appends a corner to the current contour.
    ///
    /// The payload length of the first corner fixes the vertex data size
    /// until [`reset`](Self::reset).
    pub fn add_vertex(&mut self, vertex: TessVertex) {
        if !self.expect_state(State::InContour, "add_vertex") {
            return;
        }
        let size = *self.vertex_data_size.get_or_insert(vertex.data.len());
        debug_assert_eq!(vertex.data.len(), size, "inconsistent vertex data size");
        if vertex.data.len() != size {
            error!(
                "vertex data size {} does not match {}, corner ignored",
                vertex.data.len(),
                size
            );
            return;
        }
        if let Some(contour) = self.contours.last_mut() {
            contour.push(vertex);
        }
    }

    /// Closes the current contour.
    pub fn end_contour(&mut self) {
        if !self.expect_state(State::InContour, "end_contour") {
            return;
        }
        self.state = State::InPolygon;
    }

    /// Triangulates the current polygon and appends the result to the
    /// output buffers.
    pub fn end_polygon(&mut self) {
        if !self.expect_state(State::InPolygon, "end_polygon") {
            return;
        }
        self.state = State::Idle;

        let contours: Vec<Vec<TessVertex>> = std::mem::take(&mut self.contours)
            .into_iter()
            .filter(|c| c.len() >= 3)
            .collect();
        if contours.is_empty() {
            return;
        }

        let triangles = match triangulate(&contours, &self.normal, self.rule) {
            Ok(t) => t,
            Err(e) => {
                warn!("polygon skipped: {e}");
                return;
            }
        };

        let corners: Vec<&TessVertex> = contours.iter().flatten().collect();
        let mut unique: HashMap<Vec<u32>, u32> = HashMap::new();
        for tri in triangles {
            let element = tri.map(|c| {
                let corner = corners[c];
                *unique.entry(corner.key()).or_insert_with(|| {
                    self.vertices.push(corner.clone());
                    #[allow(clippy::cast_possible_truncation)]
                    let index = (self.vertices.len() - 1) as u32;
                    index
                })
            });
            self.elements.push(element);
            self.num_elements_in_polygon += 1;
        }
    }

    /// Number of triangles produced by the last polygon.
    #[must_use]
    pub fn num_elements_in_polygon(&self) -> usize {
        self.num_elements_in_polygon
    }

    /// Number of triangles produced since the last reset.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.elements.len()
    }

    /// Output vertices of all polygons since the last reset.
    #[must_use]
    pub fn vertices(&self) -> &[TessVertex] {
        &self.vertices
    }

    /// Output triangles, as indices into [`vertices`](Self::vertices).
    #[must_use]
    pub fn elements(&self) -> &[[u32; 3]] {
        &self.elements
    }

    /// Payload length per vertex; zero before the first corner.
    #[must_use]
    pub fn vertex_data_size(&self) -> usize {
        self.vertex_data_size.unwrap_or(0)
    }

    /// Clears all output and protocol state. The winding rule is kept.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.contours.clear();
        self.vertex_data_size = None;
        self.vertices.clear();
        self.elements.clear();
        self.num_elements_in_polygon = 0;
    }
}

/// Tessellates a single polygon given as closed `contours`.
///
/// Returns the deduplicated vertices and the triangles indexing them.
#[must_use]
pub fn tessellate_polygon(
    contours: &[Vec<TessVertex>],
    normal: &Vec3,
    rule: WindingRule,
) -> (Vec<TessVertex>, Vec<[u32; 3]>) {
    let mut tess = Tessellator::new().with_winding_rule(rule);
    tess.begin_polygon(normal);
    for contour in contours {
        tess.begin_contour();
        for corner in contour {
            tess.add_vertex(corner.clone());
        }
        tess.end_contour();
    }
    tess.end_polygon();
    (tess.vertices, tess.elements)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn corners(points: &[(f32, f32)]) -> Vec<TessVertex> {
        points
            .iter()
            .map(|&(x, y)| TessVertex::at(Vec3::new(x, y, 0.0)))
            .collect()
    }

    fn add_polygon(tess: &mut Tessellator, contours: &[Vec<TessVertex>]) {
        tess.begin_polygon(&Vec3::z());
        for contour in contours {
            tess.begin_contour();
            for c in contour {
                tess.add_vertex(c.clone());
            }
            tess.end_contour();
        }
        tess.end_polygon();
    }

    #[test]
    fn triangle_produces_1_triangle() {
        let mut tess = Tessellator::new();
        add_polygon(&mut tess, &[corners(&[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0)])]);
        assert_eq!(tess.num_elements_in_polygon(), 1);
        assert_eq!(tess.vertices().len(), 3);
    }

    #[test]
    fn convex_polygon_produces_k_minus_2_triangles() {
        let mut tess = Tessellator::new();
        let hexagon: Vec<(f32, f32)> = (0..6)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let a = i as f32 * std::f32::consts::TAU / 6.0;
                (a.cos(), a.sin())
            })
            .collect();
        add_polygon(&mut tess, &[corners(&hexagon)]);
        assert_eq!(tess.num_elements_in_polygon(), 4);
        assert_eq!(tess.vertices().len(), 6);
    }

    #[test]
    fn hole_is_excluded() {
        let mut tess = Tessellator::new();
        let outer = corners(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let hole = corners(&[(3.0, 3.0), (3.0, 7.0), (7.0, 7.0), (7.0, 3.0)]);
        add_polygon(&mut tess, &[outer, hole]);
        assert_eq!(tess.num_elements_in_polygon(), 8);
        assert_eq!(tess.vertices().len(), 8);
    }

    #[test]
    fn vertices_are_not_shared_between_polygons() {
        let mut tess = Tessellator::new();
        let square = corners(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        add_polygon(&mut tess, &[square.clone()]);
        add_polygon(&mut tess, &[square]);
        assert_eq!(tess.num_triangles(), 4);
        assert_eq!(tess.vertices().len(), 8);
        assert_eq!(tess.num_elements_in_polygon(), 2);
        for e in tess.elements().iter().flatten() {
            assert!((*e as usize) < tess.vertices().len());
        }
    }

    #[test]
    fn payload_travels_with_corner() {
        let mut tess = Tessellator::new();
        let tri = vec![
            TessVertex::new(Vec3::new(0.0, 0.0, 0.0), [0.1, 0.0]),
            TessVertex::new(Vec3::new(1.0, 0.0, 0.0), [0.2, 0.0]),
            TessVertex::new(Vec3::new(0.0, 1.0, 0.0), [0.3, 0.0]),
        ];
        add_polygon(&mut tess, &[tri.clone()]);
        assert_eq!(tess.vertex_data_size(), 2);
        for v in tess.vertices() {
            assert!(tri.contains(v));
        }
    }

    #[test]
    fn short_contours_contribute_nothing() {
        let mut tess = Tessellator::new();
        add_polygon(&mut tess, &[corners(&[(0.0, 0.0), (1.0, 0.0)])]);
        assert_eq!(tess.num_elements_in_polygon(), 0);
        assert!(tess.vertices().is_empty());
    }

    #[test]
    fn positive_rule_rejects_clockwise_contour() {
        let mut tess = Tessellator::new().with_winding_rule(WindingRule::Positive);
        let cw = corners(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        add_polygon(&mut tess, &[cw.clone()]);
        assert_eq!(tess.num_elements_in_polygon(), 0);

        tess.set_winding_rule(WindingRule::Negative);
        add_polygon(&mut tess, &[cw]);
        assert_eq!(tess.num_elements_in_polygon(), 2);
    }

    #[test]
    fn reset_clears_output() {
        let mut tess = Tessellator::new();
        add_polygon(&mut tess, &[corners(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])]);
        tess.reset();
        assert_eq!(tess.num_triangles(), 0);
        assert!(tess.vertices().is_empty());
        assert_eq!(tess.vertex_data_size(), 0);
    }

    #[test]
    fn free_function_matches_incremental_use() {
        let square = corners(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let (vertices, elements) = tessellate_polygon(&[square], &Vec3::z(), WindingRule::NonZero);
        assert_eq!(elements.len(), 2);
        assert_eq!(vertices.len(), 4);
    }
}
