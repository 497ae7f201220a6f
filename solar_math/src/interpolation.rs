//! Linear interpolation helpers

use crate::{MathError, Result};

/// Linear interpolation between `a` and `b` at fraction `t`
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Upsample a regularly spaced series by an integer factor.
///
/// Every source value is kept at position `i * factor` and the points between
/// two source values lie on the straight line joining them. The points after
/// the last source value repeat it, so the output is always
/// `values.len() * factor` long.
pub fn upsample_linear(values: &[f64], factor: usize) -> Result<Vec<f64>> {
    if factor == 0 {
        return Err(MathError::InvalidInput(
            "Upsampling factor must be greater than zero".to_string(),
        ));
    }

    let Some(&last) = values.last() else {
        return Ok(Vec::new());
    };

    let mut result = Vec::with_capacity(values.len() * factor);
    for pair in values.windows(2) {
        for step in 0..factor {
            result.push(lerp(pair[0], pair[1], step as f64 / factor as f64));
        }
    }
    result.extend(std::iter::repeat(last).take(factor));

    Ok(result)
}
