//! Robust statistics for trend assessment.

use std::cmp::Ordering;

/// Median of a slice; the mean of the two central values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median absolute deviation: `median(|x_i - median(x)|)`, unscaled.
pub fn mad(values: &[f64]) -> Option<f64> {
    let center = median(values)?;
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Theil-Sen line through `(x, y)` pairs.
///
/// Slope is the median of all pairwise slopes with distinct x; intercept is
/// the median of `y_i - slope * x_i`. Duplicate x values still count in the
/// intercept. Returns `None` when no pair has distinct x or the fit is not finite.
pub fn theil_sen(points: &[(f64, f64)]) -> Option<LinearFit> {
    let mut slopes = Vec::with_capacity(points.len() * points.len().saturating_sub(1) / 2);
    for (i, &(xi, yi)) in points.iter().enumerate() {
        for &(xj, yj) in &points[i + 1..] {
            let dx = xj - xi;
            if dx != 0.0 {
                let slope = (yj - yi) / dx;
                if slope.is_finite() {
                    slopes.push(slope);
                }
            }
        }
    }

    let slope = median(&slopes)?;
    let offsets: Vec<f64> = points.iter().map(|&(x, y)| y - slope * x).collect();
    let intercept = median(&offsets)?;

    if slope.is_finite() && intercept.is_finite() {
        Some(LinearFit { intercept, slope })
    } else {
        None
    }
}
