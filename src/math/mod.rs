pub mod polygon;

/// 2D vector type used for texture coordinates.
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector type used for positions, normals and colors.
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector type used for RGBA colors.
pub type Vec4 = nalgebra::Vector4<f32>;

/// Double-precision 2D point used by the triangulation back end.
pub type Point2 = nalgebra::Point2<f64>;

/// Double-precision 3D vector used for plane projection.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Axis-aligned bounding box of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Computes the box enclosing `points`, or `None` when empty.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bbox = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bbox.min = bbox.min.inf(p);
            bbox.max = bbox.max.sup(p);
        }
        Some(bbox)
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).norm()
    }
}

/// Widens an `f32` vector to `f64`.
#[must_use]
pub fn to_f64(v: &Vec3) -> Vector3 {
    Vector3::new(f64::from(v.x), f64::from(v.y), f64::from(v.z))
}
