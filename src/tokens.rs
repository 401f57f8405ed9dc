//! Display helpers and stable problem tokens for persisting assessment outcomes.
//!
//! Tokens look like `growth.wfa.low` or `nutrition.obesity` and never change
//! spelling, so callers can store them and match on them later.

use crate::models::{NutritionAssessment, NutritionCategory, TrendAssessment};

/// |z| beyond this on the current point yields a `.low` / `.high` token.
pub const EXTREME_Z: f64 = 2.0;

/// Signed z-score with two decimals, e.g. `+1.23`.
pub fn format_z(z: f64) -> String {
    format!("{:+.2}", z)
}

/// Percentile with one decimal, saturating at `<0.1` and `>99.9`.
pub fn format_percentile(percentile: f64) -> String {
    if percentile < 0.1 {
        "<0.1".to_string()
    } else if percentile > 99.9 {
        ">99.9".to_string()
    } else {
        format!("{:.1}", percentile)
    }
}

/// `"{value} {unit} (z {z}, P{percentile})"`.
pub fn describe_measurement(assessment: &TrendAssessment) -> String {
    let current = &assessment.current;
    format!(
        "{} {} (z {}, P{})",
        current.value,
        current.kind.unit(),
        format_z(current.z_score),
        format_percentile(current.percentile)
    )
}

pub fn trend_tokens(assessment: &TrendAssessment) -> Vec<String> {
    let code = assessment.current.kind.code();
    let z = assessment.current.z_score;
    let mut tokens = Vec::new();

    if z < -EXTREME_Z {
        tokens.push(format!("growth.{}.low", code));
    } else if z > EXTREME_Z {
        tokens.push(format!("growth.{}.high", code));
    }

    let signals = &assessment.signals;
    if signals.median_shift {
        tokens.push(format!("growth.{}.shift", code));
    }
    if signals.trajectory_concern {
        tokens.push(format!("growth.{}.trajectory", code));
    }
    if signals.velocity_concern {
        tokens.push(format!("growth.{}.velocity", code));
    }

    tokens
}

/// `None` for a healthy status.
pub fn nutrition_token(assessment: &NutritionAssessment) -> Option<String> {
    match assessment.category {
        NutritionCategory::Healthy => None,
        category => Some(format!("nutrition.{}", category.code())),
    }
}

/// All tokens for a set of trend assessments plus an optional nutrition status.
pub fn problem_tokens(
    trends: &[TrendAssessment],
    nutrition: Option<&NutritionAssessment>,
) -> Vec<String> {
    trends
        .iter()
        .flat_map(trend_tokens)
        .chain(nutrition.and_then(nutrition_token))
        .collect()
}
