//! Display range of a scalar field, with optional percentile clamping.

use tracing::info;

use crate::error::ScalarRangeError;

/// Closed display interval `[min_value, max_value]` of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarRange {
    pub min_value: f64,
    pub max_value: f64,
}

impl ScalarRange {
    /// Computes the display range of `values`.
    ///
    /// `lower` and `upper` are the fractions of samples clamped away at the
    /// low and high ends (nearest rank, no interpolation). Fractions are
    /// clamped into `[0, 1)`. If clamping leaves no spread, the unclamped
    /// minimum and maximum are used.
    ///
    /// # Errors
    ///
    /// Returns [`ScalarRangeError::EmptyProperty`] if `values` is empty.
    pub fn compute(values: &[f64], lower: f32, upper: f32) -> Result<Self, ScalarRangeError> {
        if values.is_empty() {
            return Err(ScalarRangeError::EmptyProperty);
        }
        let lower = clamp_fraction(lower);
        let upper = clamp_fraction(upper);

        let mut sorted = values.to_vec();
        sorted.sort_unstable_by(f64::total_cmp);

        let n = sorted.len() - 1;
        let index_lower = rank(n, 0, lower);
        let index_upper = rank(n, n, -upper).max(index_lower);
        // a collapsed clamp falls back to the full extremes
        let (index_lower, index_upper) = if sorted[index_lower] >= sorted[index_upper] {
            (0, n)
        } else {
            (index_lower, index_upper)
        };
        let range = Self {
            min_value: sorted[index_lower],
            max_value: sorted[index_upper],
        };

        if lower > 0.0 || upper > 0.0 {
            info!(
                "scalar field range [{}, {}] clamped ({:.0}%, {:.0}%) to [{}, {}]",
                sorted[0],
                sorted[n],
                lower * 100.0,
                upper * 100.0,
                range.min_value,
                range.max_value
            );
        }
        Ok(range)
    }

    /// Maps `value` into `[0, 1]` relative to this range.
    ///
    /// # Errors
    ///
    /// Returns [`ScalarRangeError::DegenerateRange`] if the range is a single
    /// value.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn normalize(&self, value: f64) -> Result<f32, ScalarRangeError> {
        if self.max_value == self.min_value {
            return Err(ScalarRangeError::DegenerateRange(self.min_value));
        }
        let t = (value - self.min_value) / (self.max_value - self.min_value);
        Ok(t.clamp(0.0, 1.0) as f32)
    }

    /// Width of the range.
    #[must_use]
    pub fn extent(&self) -> f64 {
        self.max_value - self.min_value
    }
}

fn clamp_fraction(f: f32) -> f32 {
    if f.is_nan() {
        0.0
    } else {
        f.clamp(0.0, 1.0 - f32::EPSILON)
    }
}

/// Nearest rank `floor(base + n * fraction)`, kept within `[0, n]`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn rank(n: usize, base: usize, fraction: f32) -> usize {
    let r = (base as f64 + n as f64 * f64::from(fraction)).floor();
    (r.max(0.0) as usize).min(n)
}
