use crate::config::VelocityParams;

/// Observed weight change against the WHO median change over the same window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WeightVelocity {
    pub elapsed_months: f64,
    pub observed_gain_kg: f64,
    pub expected_gain_kg: f64,
    pub concern: Option<VelocityConcern>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum VelocityConcern {
    WeightLoss,
    /// Observed gain is below the configured share of the expected gain.
    InsufficientGain { ratio: f64 },
    /// Expected gain is too small to compare against, but nothing was gained over a long window.
    MinimalGain,
}

impl WeightVelocity {
    pub fn new(
        elapsed_months: f64,
        observed_gain_kg: f64,
        expected_gain_kg: f64,
        params: &VelocityParams,
    ) -> Self {
        let concern = classify(elapsed_months, observed_gain_kg, expected_gain_kg, params);
        Self {
            elapsed_months,
            observed_gain_kg,
            expected_gain_kg,
            concern,
        }
    }
}

fn classify(
    elapsed_months: f64,
    observed: f64,
    expected: f64,
    params: &VelocityParams,
) -> Option<VelocityConcern> {
    if observed < 0.0 {
        return Some(VelocityConcern::WeightLoss);
    }

    if expected >= params.meaningful_expected_gain_kg {
        let ratio = observed / expected;
        if ratio < params.min_gain_ratio {
            return Some(VelocityConcern::InsufficientGain { ratio });
        }
    } else if elapsed_months >= params.fallback_window_months
        && observed < params.fallback_min_gain_kg
    {
        return Some(VelocityConcern::MinimalGain);
    }

    None
}
