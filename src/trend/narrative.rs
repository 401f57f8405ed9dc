use super::trajectory::TrajectoryDeviation;
use super::velocity::{VelocityConcern, WeightVelocity};
use crate::tokens::format_z;

pub(crate) const SINGLE_MEASUREMENT: &str = "only one measurement available";

pub(crate) struct NarrativeInput<'a> {
    pub current_z: f64,
    pub baseline_z: f64,
    pub delta: f64,
    pub threshold_z: f64,
    pub prior_count: usize,
    pub median_shift: bool,
    /// Present only when the trajectory check raised a concern.
    pub trajectory: Option<&'a TrajectoryDeviation>,
    /// Present only when the velocity check raised a concern.
    pub velocity: Option<&'a WeightVelocity>,
}

/// One primary sentence, then one sentence per secondary concern.
pub(crate) fn compose(input: &NarrativeInput<'_>) -> String {
    let mut sentences = vec![primary_sentence(input)];

    if let Some(trajectory) = input.trajectory {
        sentences.push(format!(
            "It departs from the child's own trajectory (expected z {}, residual {}, {:.1}x the expected scatter of {:.2}; limit {:.1}x).",
            format_z(trajectory.expected_z),
            format_z(trajectory.residual),
            trajectory.score,
            trajectory.sigma,
            trajectory.threshold,
        ));
    }

    if let Some(velocity) = input.velocity {
        if let Some(sentence) = velocity_sentence(velocity) {
            sentences.push(sentence);
        }
    }

    sentences.join(" ")
}

fn primary_sentence(input: &NarrativeInput<'_>) -> String {
    let measurements = if input.prior_count == 1 {
        "1 prior measurement".to_string()
    } else {
        format!("{} prior measurements", input.prior_count)
    };

    if input.median_shift {
        let direction = if input.delta > 0.0 { "higher" } else { "lower" };
        format!(
            "Current z-score {} is {:.2} SD {} than the median of {} ({}), reaching the {:.2} SD shift threshold.",
            format_z(input.current_z),
            input.delta.abs(),
            direction,
            measurements,
            format_z(input.baseline_z),
            input.threshold_z,
        )
    } else if input.trajectory.is_some() || input.velocity.is_some() {
        format!(
            "Current z-score {} is within {:.2} SD of the median of {} ({}), but shows a deviation of concern.",
            format_z(input.current_z),
            input.threshold_z,
            measurements,
            format_z(input.baseline_z),
        )
    } else {
        format!(
            "Current z-score {} is consistent with the prior trend (median of {} {}, change {}).",
            format_z(input.current_z),
            measurements,
            format_z(input.baseline_z),
            format_z(input.delta),
        )
    }
}

fn velocity_sentence(velocity: &WeightVelocity) -> Option<String> {
    let sentence = match velocity.concern? {
        VelocityConcern::WeightLoss => format!(
            "Weight fell by {:.2} kg over {:.1} months.",
            velocity.observed_gain_kg.abs(),
            velocity.elapsed_months,
        ),
        VelocityConcern::InsufficientGain { ratio } => format!(
            "Weight gain of {:.2} kg over {:.1} months is {:.0}% of the WHO median expected gain of {:.2} kg.",
            velocity.observed_gain_kg,
            velocity.elapsed_months,
            ratio * 100.0,
            velocity.expected_gain_kg,
        ),
        VelocityConcern::MinimalGain => format!(
            "Weight gain of {:.2} kg over {:.1} months is minimal.",
            velocity.observed_gain_kg, velocity.elapsed_months,
        ),
    };
    Some(sentence)
}
