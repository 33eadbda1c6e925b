use std::collections::HashMap;

use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::math::polygon::{newell_normal, plane_basis, winding_number_2d};
use crate::math::{to_f64, Point2, Vector3};

use super::{TessVertex, WindingRule};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates closed contours lying (roughly) in the plane orthogonal to
/// `normal`.
///
/// Triangles are returned as indices into the concatenation of `contours`,
/// counter-clockwise about the normal. If `normal` is degenerate the Newell
/// normal of the contours is used instead.
///
/// # Errors
///
/// Returns an error if a projected corner cannot be inserted into the
/// triangulation (non-finite or out-of-range coordinates).
pub(super) fn triangulate(
    contours: &[Vec<TessVertex>],
    normal: &Vector3,
    rule: WindingRule,
) -> Result<Vec<[usize; 3]>, InsertionError> {
    let Some((u_dir, v_dir)) = plane_basis(normal).or_else(|| plane_basis(&contour_normal(contours)))
    else {
        return Ok(Vec::new());
    };

    let projected: Vec<Vec<Point2>> = contours
        .iter()
        .map(|contour| {
            contour
                .iter()
                .map(|c| {
                    let p = to_f64(&c.position);
                    Point2::new(p.dot(&u_dir), p.dot(&v_dir))
                })
                .collect()
        })
        .collect();

    let mut cdt = Cdt::new();
    let mut corner_of: HashMap<usize, usize> = HashMap::new();
    let mut base = 0;
    for loop_2d in &projected {
        insert_constraint_loop(&mut cdt, loop_2d, base, &mut corner_of)?;
        base += loop_2d.len();
    }

    let mut triangles = Vec::new();
    for face in cdt.inner_faces() {
        let verts = face.vertices();
        let sum = verts.iter().fold(Point2::origin(), |acc, v| {
            let p = v.position();
            Point2::new(acc.x + p.x, acc.y + p.y)
        });
        let centroid = Point2::new(sum.x / 3.0, sum.y / 3.0);
        let winding: i32 = projected
            .iter()
            .map(|loop_2d| winding_number_2d(&centroid, loop_2d))
            .sum();
        if !rule.accepts(winding) {
            continue;
        }

        let corners = verts.map(|v| corner_of.get(&v.fix().index()).copied());
        if let [Some(a), Some(b), Some(c)] = corners {
            triangles.push([a, b, c]);
        }
    }
    Ok(triangles)
}

/// Inserts a closed loop as constraint edges, recording which input corner
/// each triangulation vertex came from. Coincident corners share the vertex
/// of the first one inserted.
fn insert_constraint_loop(
    cdt: &mut Cdt,
    points: &[Point2],
    base: usize,
    corner_of: &mut HashMap<usize, usize>,
) -> Result<(), InsertionError> {
    let mut handles = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        let h = cdt.insert(SpadePoint2::new(p.x, p.y))?;
        corner_of.entry(h.index()).or_insert(base + i);
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        // Self-intersecting loops would cross an existing constraint; the
        // winding test still classifies the unconstrained triangles.
        if from != to && cdt.can_add_constraint(from, to) {
            cdt.add_constraint(from, to);
        }
    }
    Ok(())
}

/// Newell normal of all contours together.
fn contour_normal(contours: &[Vec<TessVertex>]) -> Vector3 {
    contours
        .iter()
        .map(|contour| {
            let points: Vec<Vector3> = contour.iter().map(|c| to_f64(&c.position)).collect();
            newell_normal(&points)
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn contour(points: &[(f32, f32)]) -> Vec<TessVertex> {
        points
            .iter()
            .map(|&(x, y)| TessVertex::at(Vec3::new(x, y, 0.0)))
            .collect()
    }

    #[test]
    fn l_shape_produces_four_triangles() {
        let l = contour(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 4.0),
            (0.0, 4.0),
        ]);
        let tris = triangulate(&[l], &Vector3::z(), WindingRule::Odd).unwrap();
        assert_eq!(tris.len(), 4);
    }

    #[test]
    fn zero_normal_falls_back_to_contour_plane() {
        let square = contour(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let tris = triangulate(&[square], &Vector3::zeros(), WindingRule::Odd).unwrap();
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn collinear_contour_yields_nothing() {
        let line = contour(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let tris = triangulate(&[line], &Vector3::zeros(), WindingRule::Odd).unwrap();
        assert!(tris.is_empty());
    }

    #[test]
    fn triangles_are_ccw_about_normal() {
        let square = contour(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let tris = triangulate(&[square.clone()], &Vector3::z(), WindingRule::Odd).unwrap();
        for [a, b, c] in tris {
            let (pa, pb, pc) = (square[a].position, square[b].position, square[c].position);
            assert!((pb - pa).cross(&(pc - pa)).z > 0.0);
        }
    }
}
