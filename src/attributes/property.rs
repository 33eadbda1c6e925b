use std::fmt;

use crate::compile::TriangleRange;
use crate::math::{Vec2, Vec3};
use crate::model::connectivity::{
    EdgeConnectivity, FaceConnectivity, HalfedgeConnectivity, VertexConnectivity,
};

/// Element type of a property array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyTag {
    Float,
    Double,
    Int,
    UInt,
    Char,
    UChar,
    Bool,
    Vec2,
    Vec3,
    TriangleRange,
    VertexConnectivity,
    EdgeConnectivity,
    HalfedgeConnectivity,
    FaceConnectivity,
}

impl PropertyTag {
    /// Returns `true` for the numeric element types accepted as scalar fields.
    #[must_use]
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Float | Self::Double | Self::Int | Self::UInt | Self::Char | Self::UChar
        )
    }

    /// Returns `true` for element types that can drive a scalar field:
    /// the numeric types plus `bool`.
    #[must_use]
    pub fn is_scalar_field(self) -> bool {
        self.is_scalar() || self == Self::Bool
    }
}

impl fmt::Display for PropertyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Float => "f32",
            Self::Double => "f64",
            Self::Int => "i32",
            Self::UInt => "u32",
            Self::Char => "i8",
            Self::UChar => "u8",
            Self::Bool => "bool",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::TriangleRange => "triangle range",
            Self::VertexConnectivity => "vertex connectivity",
            Self::EdgeConnectivity => "edge connectivity",
            Self::HalfedgeConnectivity => "halfedge connectivity",
            Self::FaceConnectivity => "face connectivity",
        };
        f.write_str(name)
    }
}

/// Type-erased storage of one property: a closed set of typed arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyArray {
    Float(Vec<f32>),
    Double(Vec<f64>),
    Int(Vec<i32>),
    UInt(Vec<u32>),
    Char(Vec<i8>),
    UChar(Vec<u8>),
    Bool(Vec<bool>),
    Vec2(Vec<Vec2>),
    Vec3(Vec<Vec3>),
    TriangleRange(Vec<TriangleRange>),
    VertexConnectivity(Vec<VertexConnectivity>),
    EdgeConnectivity(Vec<EdgeConnectivity>),
    HalfedgeConnectivity(Vec<HalfedgeConnectivity>),
    FaceConnectivity(Vec<FaceConnectivity>),
}

/// Applies `$body` to the inner vector of every variant of a `PropertyArray`.
macro_rules! each_variant {
    ($array:expr, $data:ident => $body:expr) => {
        match $array {
            PropertyArray::Float($data) => $body,
            PropertyArray::Double($data) => $body,
            PropertyArray::Int($data) => $body,
            PropertyArray::UInt($data) => $body,
            PropertyArray::Char($data) => $body,
            PropertyArray::UChar($data) => $body,
            PropertyArray::Bool($data) => $body,
            PropertyArray::Vec2($data) => $body,
            PropertyArray::Vec3($data) => $body,
            PropertyArray::TriangleRange($data) => $body,
            PropertyArray::VertexConnectivity($data) => $body,
            PropertyArray::EdgeConnectivity($data) => $body,
            PropertyArray::HalfedgeConnectivity($data) => $body,
            PropertyArray::FaceConnectivity($data) => $body,
        }
    };
}

/// Applies `$body` to two arrays of the same variant; `$mismatch` otherwise.
macro_rules! same_variant {
    ($a:expr, $b:expr, ($x:ident, $y:ident) => $body:expr, _ => $mismatch:expr) => {
        match ($a, $b) {
            (PropertyArray::Float($x), PropertyArray::Float($y)) => $body,
            (PropertyArray::Double($x), PropertyArray::Double($y)) => $body,
            (PropertyArray::Int($x), PropertyArray::Int($y)) => $body,
            (PropertyArray::UInt($x), PropertyArray::UInt($y)) => $body,
            (PropertyArray::Char($x), PropertyArray::Char($y)) => $body,
            (PropertyArray::UChar($x), PropertyArray::UChar($y)) => $body,
            (PropertyArray::Bool($x), PropertyArray::Bool($y)) => $body,
            (PropertyArray::Vec2($x), PropertyArray::Vec2($y)) => $body,
            (PropertyArray::Vec3($x), PropertyArray::Vec3($y)) => $body,
            (PropertyArray::TriangleRange($x), PropertyArray::TriangleRange($y)) => $body,
            (PropertyArray::VertexConnectivity($x), PropertyArray::VertexConnectivity($y)) => {
                $body
            }
            (PropertyArray::EdgeConnectivity($x), PropertyArray::EdgeConnectivity($y)) => $body,
            (
                PropertyArray::HalfedgeConnectivity($x),
                PropertyArray::HalfedgeConnectivity($y),
            ) => $body,
            (PropertyArray::FaceConnectivity($x), PropertyArray::FaceConnectivity($y)) => $body,
            _ => $mismatch,
        }
    };
}

impl PropertyArray {
    /// Element type of this array.
    #[must_use]
    pub fn tag(&self) -> PropertyTag {
        match self {
            Self::Float(_) => PropertyTag::Float,
            Self::Double(_) => PropertyTag::Double,
            Self::Int(_) => PropertyTag::Int,
            Self::UInt(_) => PropertyTag::UInt,
            Self::Char(_) => PropertyTag::Char,
            Self::UChar(_) => PropertyTag::UChar,
            Self::Bool(_) => PropertyTag::Bool,
            Self::Vec2(_) => PropertyTag::Vec2,
            Self::Vec3(_) => PropertyTag::Vec3,
            Self::TriangleRange(_) => PropertyTag::TriangleRange,
            Self::VertexConnectivity(_) => PropertyTag::VertexConnectivity,
            Self::EdgeConnectivity(_) => PropertyTag::EdgeConnectivity,
            Self::HalfedgeConnectivity(_) => PropertyTag::HalfedgeConnectivity,
            Self::FaceConnectivity(_) => PropertyTag::FaceConnectivity,
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        each_variant!(self, data => data.len())
    }

    /// Returns `true` if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resizes to `n` elements, filling new slots with the first element of
    /// `fill` (which must be of the same variant).
    pub(crate) fn resize_with_fill(&mut self, n: usize, fill: &PropertyArray) {
        same_variant!(self, fill, (data, value) => {
            match value.first() {
                Some(v) => data.resize(n, v.clone()),
                None => data.truncate(n),
            }
        }, _ => debug_assert!(false, "fill value has a different element type"));
    }

    /// Keeps only the elements whose entry in `keep` is `true`.
    pub(crate) fn retain_mask(&mut self, keep: &[bool]) {
        each_variant!(self, data => {
            let mut i = 0;
            data.retain(|_| {
                let k = keep.get(i).copied().unwrap_or(false);
                i += 1;
                k
            });
        });
    }

    /// Resolves a numeric or `bool` array to a scalar view, or `None` for
    /// any other element type.
    #[must_use]
    pub fn as_scalars(&self) -> Option<ScalarArray<'_>> {
        match self {
            Self::Float(v) => Some(ScalarArray::Float(v)),
            Self::Double(v) => Some(ScalarArray::Double(v)),
            Self::Int(v) => Some(ScalarArray::Int(v)),
            Self::UInt(v) => Some(ScalarArray::UInt(v)),
            Self::Char(v) => Some(ScalarArray::Char(v)),
            Self::UChar(v) => Some(ScalarArray::UChar(v)),
            Self::Bool(v) => Some(ScalarArray::Bool(v)),
            _ => None,
        }
    }
}

/// Borrowed view of a numeric property, resolved once from its tag.
#[derive(Debug, Clone, Copy)]
pub enum ScalarArray<'a> {
    Float(&'a [f32]),
    Double(&'a [f64]),
    Int(&'a [i32]),
    UInt(&'a [u32]),
    Char(&'a [i8]),
    UChar(&'a [u8]),
    Bool(&'a [bool]),
}

impl ScalarArray<'_> {
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::UInt(v) => v.len(),
            Self::Char(v) => v.len(),
            Self::UChar(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    /// Returns `true` if the view has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coerces every element to `f64` in a single pass.
    #[must_use]
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Self::Float(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::Double(v) => v.to_vec(),
            Self::Int(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::UInt(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::Char(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::UChar(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::Bool(v) => v.iter().map(|&x| f64::from(u8::from(x))).collect(),
        }
    }
}

mod private {
    pub trait Sealed {}
}

/// Element types that can be stored in an [`AttributeStore`](super::AttributeStore).
///
/// The set is closed: every implementor maps to exactly one
/// [`PropertyArray`] variant.
pub trait PropertyType: Clone + private::Sealed + 'static {
    /// Tag of the matching array variant.
    const TAG: PropertyTag;

    /// Wraps a typed vector into its array variant.
    fn wrap(data: Vec<Self>) -> PropertyArray;

    /// Borrows the typed elements if `array` holds this type.
    fn view(array: &PropertyArray) -> Option<&[Self]>;

    /// Mutably borrows the typed elements if `array` holds this type.
    fn view_mut(array: &mut PropertyArray) -> Option<&mut [Self]>;
}

macro_rules! property_types {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}

            impl PropertyType for $ty {
                const TAG: PropertyTag = PropertyTag::$variant;

                fn wrap(data: Vec<Self>) -> PropertyArray {
                    PropertyArray::$variant(data)
                }

                fn view(array: &PropertyArray) -> Option<&[Self]> {
                    match array {
                        PropertyArray::$variant(data) => Some(data.as_slice()),
                        _ => None,
                    }
                }

                fn view_mut(array: &mut PropertyArray) -> Option<&mut [Self]> {
                    match array {
                        PropertyArray::$variant(data) => Some(data.as_mut_slice()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

property_types! {
    f32 => Float,
    f64 => Double,
    i32 => Int,
    u32 => UInt,
    i8 => Char,
    u8 => UChar,
    bool => Bool,
    Vec2 => Vec2,
    Vec3 => Vec3,
    TriangleRange => TriangleRange,
    VertexConnectivity => VertexConnectivity,
    EdgeConnectivity => EdgeConnectivity,
    HalfedgeConnectivity => HalfedgeConnectivity,
    FaceConnectivity => FaceConnectivity,
}
