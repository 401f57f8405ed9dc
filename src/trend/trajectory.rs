use crate::stats::{mad, theil_sen};

pub(crate) const MIN_TRAJECTORY_POINTS: usize = 3;

/// How far the current z-score sits from the line through the prior z-scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TrajectoryDeviation {
    pub expected_z: f64,
    pub residual: f64,
    pub sigma: f64,
    pub score: f64,
    pub threshold: f64,
    pub is_concern: bool,
}

/// Robust residual score of `(current_x, current_z)` against a Theil-Sen fit
/// of `history` (`(x, z)` pairs).
///
/// Residual scatter is `mad_scale * MAD`, floored at `sigma_floor` so a
/// perfectly flat history does not turn every wobble into a concern. `None`
/// with fewer than three points or when no line can be fitted.
pub(crate) fn trajectory_deviation(
    history: &[(f64, f64)],
    current_x: f64,
    current_z: f64,
    sigma_floor: f64,
    mad_scale: f64,
    threshold: f64,
) -> Option<TrajectoryDeviation> {
    if history.len() < MIN_TRAJECTORY_POINTS {
        return None;
    }

    let fit = theil_sen(history)?;
    let expected_z = fit.predict(current_x);
    let residual = current_z - expected_z;

    let residuals: Vec<f64> = history.iter().map(|&(x, z)| z - fit.predict(x)).collect();
    let sigma = (mad_scale * mad(&residuals)?).max(sigma_floor);
    let score = residual.abs() / sigma;

    if !score.is_finite() {
        return None;
    }

    Some(TrajectoryDeviation {
        expected_z,
        residual,
        sigma,
        score,
        threshold,
        is_concern: score >= threshold,
    })
}
