//! Differencing and integration of time series
//!
//! A differencing operator such as `(1 - B)^d (1 - B^s)^D` is represented by
//! its lag-polynomial coefficients `[1, c1, c2, ...]`, where `c_k` multiplies
//! the value `k` steps back. Differencing applies the polynomial; integration
//! inverts it given the history the differences were taken from.

use crate::{MathError, Result};

/// Multiply two lag polynomials
pub fn polynomial_multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}

/// Build the lag polynomial of `(1 - B)^order (1 - B^period)^seasonal_order`
pub fn differencing_polynomial(
    order: usize,
    seasonal_order: usize,
    period: usize,
) -> Result<Vec<f64>> {
    if seasonal_order > 0 && period == 0 {
        return Err(MathError::InvalidInput(
            "Seasonal period must be positive when seasonal differencing is used".to_string(),
        ));
    }

    let mut poly = vec![1.0];
    for _ in 0..order {
        poly = polynomial_multiply(&poly, &[1.0, -1.0]);
    }

    if seasonal_order > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_order {
            poly = polynomial_multiply(&poly, &seasonal);
        }
    }

    Ok(poly)
}

/// Apply a differencing polynomial to a series.
///
/// The output is `poly.len() - 1` values shorter than the input.
pub fn apply_difference(data: &[f64], poly: &[f64]) -> Result<Vec<f64>> {
    if poly.is_empty() {
        return Err(MathError::InvalidInput(
            "Differencing polynomial must not be empty".to_string(),
        ));
    }

    let degree = poly.len() - 1;
    if data.len() <= degree {
        return Err(MathError::InsufficientData(format!(
            "Differencing of degree {} needs more than {} observations, have {}",
            degree,
            degree,
            data.len()
        )));
    }

    let differenced = (degree..data.len())
        .map(|t| {
            poly.iter()
                .enumerate()
                .map(|(k, c)| c * data[t - k])
                .sum::<f64>()
        })
        .collect();

    Ok(differenced)
}

/// Undo differencing for values that continue `history`.
///
/// `differences` are the future values on the differenced scale; the result
/// holds the matching values on the original scale.
pub fn integrate(history: &[f64], differences: &[f64], poly: &[f64]) -> Result<Vec<f64>> {
    if poly.first().copied() != Some(1.0) {
        return Err(MathError::InvalidInput(
            "Differencing polynomial must start with 1".to_string(),
        ));
    }

    let degree = poly.len() - 1;
    if history.len() < degree {
        return Err(MathError::InsufficientData(format!(
            "Integration of degree {} needs {} historical values, have {}",
            degree,
            degree,
            history.len()
        )));
    }

    let mut extended = history[history.len() - degree..].to_vec();
    let mut result = Vec::with_capacity(differences.len());

    for &w in differences {
        let t = extended.len();
        let carried: f64 = poly
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| c * extended[t - k])
            .sum();
        let value = w - carried;
        extended.push(value);
        result.push(value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_difference_polynomial() {
        let poly = differencing_polynomial(1, 0, 0).unwrap();
        assert_eq!(poly, vec![1.0, -1.0]);

        let diffs = apply_difference(&[1.0, 4.0, 9.0, 16.0], &poly).unwrap();
        assert_eq!(diffs, vec![3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_seasonal_polynomial_degree() {
        let poly = differencing_polynomial(1, 1, 24).unwrap();
        assert_eq!(poly.len(), 26);
        assert_eq!(poly[0], 1.0);
        assert_eq!(poly[1], -1.0);
        assert_eq!(poly[24], -1.0);
        assert_eq!(poly[25], 1.0);
    }

    #[test]
    fn test_seasonal_difference_of_periodic_series_is_zero() {
        let day = [0.0, 1.0, 3.0, 1.0];
        let data: Vec<f64> = day.iter().cycle().take(16).copied().collect();
        let poly = differencing_polynomial(0, 1, 4).unwrap();

        let diffs = apply_difference(&data, &poly).unwrap();
        assert_eq!(diffs.len(), 12);
        assert!(diffs.iter().all(|d| d.abs() < 1e-12));
    }

    #[test]
    fn test_integrate_inverts_difference() {
        let data: Vec<f64> = (0..40).map(|i| (i as f64 * 0.3).sin() * 5.0 + i as f64).collect();
        let poly = differencing_polynomial(1, 1, 6).unwrap();
        let diffs = apply_difference(&data, &poly).unwrap();

        let split = 30;
        let degree = poly.len() - 1;
        let restored = integrate(&data[..split], &diffs[split - degree..], &poly).unwrap();

        assert_eq!(restored.len(), data.len() - split);
        for (restored, original) in restored.iter().zip(&data[split..]) {
            assert_relative_eq!(restored, original, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_difference_needs_enough_data() {
        let poly = differencing_polynomial(1, 1, 24).unwrap();
        let result = apply_difference(&[1.0; 25], &poly);
        assert!(matches!(result, Err(MathError::InsufficientData(_))));
    }

    #[test]
    fn test_zero_period_with_seasonal_order_is_rejected() {
        assert!(differencing_polynomial(0, 1, 0).is_err());
    }
}
