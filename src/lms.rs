use serde::{Deserialize, Serialize};

/// Box-Cox parameters of a reference distribution at one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lms {
    pub l: f64,
    pub m: f64,
    pub s: f64,
}

impl Lms {
    pub fn new(l: f64, m: f64, s: f64) -> Self {
        Self { l, m, s }
    }
}

/// LMS z-score. Callers must have checked `value` is finite and positive.
pub fn z_score(value: f64, lms: Lms) -> f64 {
    let Lms { l, m, s } = lms;
    if l == 0.0 {
        (value / m).ln() / s
    } else {
        ((value / m).powf(l) - 1.0) / (l * s)
    }
}

/// Inverse of [`z_score`]: the measurement value sitting at `z`.
///
/// Returns `None` where the Box-Cox base `1 + L*S*z` is not positive, which
/// happens far out in the tail for tables with negative L.
pub fn value_at_z(z: f64, lms: Lms) -> Option<f64> {
    let Lms { l, m, s } = lms;
    if l == 0.0 {
        return Some(m * (s * z).exp());
    }
    let base = 1.0 + l * s * z;
    if base <= 0.0 {
        return None;
    }
    let value = m * base.powf(1.0 / l);
    value.is_finite().then_some(value)
}

/// Percentile on a 0-100 scale.
pub fn percentile_from_z(z: f64) -> f64 {
    normal_cdf(z).clamp(0.0, 1.0) * 100.0
}

pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26, max abs error about 1.5e-7.
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}
