mod tessellator;
mod triangulate;

pub use tessellator::{tessellate_polygon, Tessellator};

use crate::math::Vec3;

/// Policy deciding which regions enclosed by the contours are interior,
/// based on their winding number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindingRule {
    #[default]
    Odd,
    NonZero,
    Positive,
    Negative,
    AbsGeqTwo,
}

impl WindingRule {
    /// Returns `true` if a region with winding number `winding` is interior.
    #[must_use]
    pub fn accepts(self, winding: i32) -> bool {
        match self {
            Self::Odd => winding % 2 != 0,
            Self::NonZero => winding != 0,
            Self::Positive => winding > 0,
            Self::Negative => winding < 0,
            Self::AbsGeqTwo => winding.abs() >= 2,
        }
    }
}

/// A contour corner: a position plus a fixed-size attribute payload that is
/// carried through tessellation unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct TessVertex {
    pub position: Vec3,
    pub data: Vec<f32>,
}

impl TessVertex {
    /// Creates a corner with the given payload.
    #[must_use]
    pub fn new(position: Vec3, data: impl Into<Vec<f32>>) -> Self {
        Self {
            position,
            data: data.into(),
        }
    }

    /// Creates a corner without payload.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            data: Vec::new(),
        }
    }

    /// Bit pattern of position and payload, used for exact deduplication.
    pub(crate) fn key(&self) -> Vec<u32> {
        self.position
            .iter()
            .chain(&self.data)
            .map(|x| x.to_bits())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winding_rules() {
        assert!(WindingRule::Odd.accepts(1));
        assert!(!WindingRule::Odd.accepts(2));
        assert!(WindingRule::Odd.accepts(-1));
        assert!(WindingRule::NonZero.accepts(-2));
        assert!(!WindingRule::NonZero.accepts(0));
        assert!(WindingRule::Positive.accepts(2));
        assert!(!WindingRule::Positive.accepts(-1));
        assert!(WindingRule::Negative.accepts(-1));
        assert!(WindingRule::AbsGeqTwo.accepts(-2));
        assert!(!WindingRule::AbsGeqTwo.accepts(1));
    }

    #[test]
    fn key_distinguishes_payload() {
        let a = TessVertex::new(Vec3::zeros(), [1.0]);
        let b = TessVertex::new(Vec3::zeros(), [2.0]);
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), a.clone().key());
    }
}
