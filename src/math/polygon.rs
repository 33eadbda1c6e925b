use super::{Point2, Vec3, Vector3, TOLERANCE};

/// Newell normal of a closed polygon loop (unnormalized).
///
/// The magnitude equals twice the area of the polygon projected onto the
/// plane orthogonal to the result, so it is robust for concave and slightly
/// non-planar loops.
#[must_use]
pub fn newell_normal<'a>(points: impl IntoIterator<Item = &'a Vector3>) -> Vector3 {
    let pts: Vec<&Vector3> = points.into_iter().collect();
    let n = pts.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Unit normal of a polygon given by `f32` positions.
///
/// Returns the zero vector for degenerate loops.
#[must_use]
pub fn polygon_normal(points: &[Vec3]) -> Vec3 {
    let wide: Vec<Vector3> = points.iter().map(super::to_f64).collect();
    let n = newell_normal(&wide);
    let len = n.norm();
    if len < TOLERANCE {
        return Vec3::zeros();
    }
    #[allow(clippy::cast_possible_truncation)]
    let unit = Vec3::new((n.x / len) as f32, (n.y / len) as f32, (n.z / len) as f32);
    unit
}

/// Builds an orthonormal `(u, v)` basis of the plane orthogonal to `normal`
/// such that `u × v` points along `normal`.
///
/// Returns `None` when `normal` is zero or not finite.
#[must_use]
pub fn plane_basis(normal: &Vector3) -> Option<(Vector3, Vector3)> {
    let len = normal.norm();
    if !len.is_finite() || len < TOLERANCE {
        return None;
    }
    let n = normal / len;
    let helper = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = helper.cross(&n).normalize();
    let v = n.cross(&u);
    Some((u, v))
}

/// Winding number of point `p` with respect to the closed loop `verts`.
///
/// Counter-clockwise loops contribute `+1`, clockwise loops `-1`.
#[must_use]
pub fn winding_number_2d(p: &Point2, verts: &[Point2]) -> i32 {
    let n = verts.len();
    let mut winding = 0i32;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];

        if a.y <= p.y {
            if b.y > p.y && cross_2d(b.x - a.x, b.y - a.y, p.x - a.x, p.y - a.y) > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && cross_2d(b.x - a.x, b.y - a.y, p.x - a.x, p.y - a.y) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// 2D cross product: `(ax * by - ay * bx)`.
#[inline]
fn cross_2d(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

/// Interior angle at `corner` between the edges towards `prev` and `next`.
#[must_use]
pub fn corner_angle(prev: &Vec3, corner: &Vec3, next: &Vec3) -> f32 {
    let a = prev - corner;
    let b = next - corner;
    let denom = a.norm() * b.norm();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    (a.dot(&b) / denom).clamp(-1.0, 1.0).acos()
}
