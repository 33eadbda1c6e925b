use super::{PropertyArray, PropertyTag};

/// Converts `array` to the element type `target`.
///
/// Dispatch is keyed by `(source, target)`: identical tags clone, numeric
/// pairs go through `f64` (integers are rounded and saturate), and numeric
/// types convert to and from `bool` as non-zero / `0`-`1`. Returns `None` for
/// any other pair.
pub(crate) fn convert(array: &PropertyArray, target: PropertyTag) -> Option<PropertyArray> {
    let source = array.tag();
    match (source, target) {
        (s, t) if s == t => Some(array.clone()),
        (s, t) if s.is_scalar() && t.is_scalar() => {
            let values = array.as_scalars()?.to_f64();
            from_f64(&values, t)
        }
        (s, PropertyTag::Bool) if s.is_scalar() => {
            let values = array.as_scalars()?.to_f64();
            Some(PropertyArray::Bool(values.iter().map(|&v| v != 0.0).collect()))
        }
        (PropertyTag::Bool, t) if t.is_scalar() => {
            let values = array.as_scalars()?.to_f64();
            from_f64(&values, t)
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_f64(values: &[f64], target: PropertyTag) -> Option<PropertyArray> {
    let array = match target {
        PropertyTag::Float => PropertyArray::Float(values.iter().map(|&v| v as f32).collect()),
        PropertyTag::Double => PropertyArray::Double(values.to_vec()),
        PropertyTag::Int => PropertyArray::Int(values.iter().map(|&v| v.round() as i32).collect()),
        PropertyTag::UInt => PropertyArray::UInt(values.iter().map(|&v| v.round() as u32).collect()),
        PropertyTag::Char => PropertyArray::Char(values.iter().map(|&v| v.round() as i8).collect()),
        PropertyTag::UChar => {
            PropertyArray::UChar(values.iter().map(|&v| v.round() as u8).collect())
        }
        _ => return None,
    };
    Some(array)
}
