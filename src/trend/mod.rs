pub mod narrative;
pub mod trajectory;
pub mod velocity;

use crate::error::{GrowthError, GrowthResult};
use crate::evaluator::GrowthEvaluator;
use crate::models::{
    EvaluationResult, MeasurementKind, MeasurementPoint, Sex, TrendAssessment, TrendSignals,
};
use crate::stats::median;
use log::debug;
use narrative::{compose, NarrativeInput, SINGLE_MEASUREMENT};
use std::cmp::Ordering;
use trajectory::{trajectory_deviation, TrajectoryDeviation, MIN_TRAJECTORY_POINTS};
use velocity::WeightVelocity;

impl GrowthEvaluator {
    /// Compare `current` with the patient's own `prior` measurements of the same
    /// kind, using the configured shift threshold.
    pub fn assess_trend(
        &self,
        kind: MeasurementKind,
        sex: Sex,
        prior: &[MeasurementPoint],
        current: MeasurementPoint,
    ) -> GrowthResult<TrendAssessment> {
        let threshold_z = self.trend_params().shift_threshold_z;
        self.assess_trend_with_threshold(kind, sex, prior, current, threshold_z)
    }

    /// [`assess_trend`](Self::assess_trend) on `(length_cm, weight_kg)` points.
    pub fn assess_trend_weight_for_length(
        &self,
        sex: Sex,
        prior: &[MeasurementPoint],
        current: MeasurementPoint,
    ) -> GrowthResult<TrendAssessment> {
        self.assess_trend(MeasurementKind::WeightForLength, sex, prior, current)
    }

    /// Prior points with a non-finite or negative x, or a non-positive value, are
    /// ignored. Any other prior that fails to evaluate fails the whole call.
    ///
    /// A `threshold_z` that is not finite and positive is rejected with
    /// [`GrowthError::InvalidValue`], before the current point is evaluated.
    pub fn assess_trend_with_threshold(
        &self,
        kind: MeasurementKind,
        sex: Sex,
        prior: &[MeasurementPoint],
        current: MeasurementPoint,
        threshold_z: f64,
    ) -> GrowthResult<TrendAssessment> {
        if !(threshold_z.is_finite() && threshold_z > 0.0) {
            return Err(GrowthError::InvalidValue(format!(
                "shift threshold must be finite and positive, got {}",
                threshold_z
            )));
        }

        let current_result = self.evaluate(kind, sex, current.x, current.value)?;

        let mut history: Vec<MeasurementPoint> =
            prior.iter().copied().filter(MeasurementPoint::is_valid).collect();
        history.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        let prior_results = history
            .iter()
            .map(|p| self.evaluate(kind, sex, p.x, p.value))
            .collect::<GrowthResult<Vec<_>>>()?;
        let prior_zs: Vec<f64> = prior_results.iter().map(|r| r.z_score).collect();

        let Some(baseline_z) = median(&prior_zs) else {
            return Ok(single_measurement(current_result, threshold_z));
        };

        let current_z = current_result.z_score;
        let delta = current_z - baseline_z;

        let trajectory = self.trajectory_check(kind, &prior_results, &current_result);
        let velocity = match (kind, history.first()) {
            (MeasurementKind::WeightForAge, Some(first)) => self.velocity_check(sex, *first, current),
            _ => None,
        };

        let signals = TrendSignals {
            median_shift: delta.abs() >= threshold_z,
            trajectory_concern: trajectory.map_or(false, |t| t.is_concern),
            velocity_concern: velocity.map_or(false, |v| v.concern.is_some()),
        };

        let narrative = compose(&NarrativeInput {
            current_z,
            baseline_z,
            delta,
            threshold_z,
            prior_count: prior_results.len(),
            median_shift: signals.median_shift,
            trajectory: trajectory.as_ref().filter(|t| t.is_concern),
            velocity: velocity.as_ref().filter(|v| v.concern.is_some()),
        });

        debug!(
            "{} trend: z {:.3}, baseline {:.3}, delta {:.3}, signals {:?}",
            kind, current_z, baseline_z, delta, signals
        );

        Ok(TrendAssessment {
            current: current_result,
            previous_median_z: Some(baseline_z),
            delta_z_from_median: Some(delta),
            threshold_z,
            is_significant_shift: signals.any(),
            prior_count: prior_results.len(),
            signals,
            narrative,
        })
    }

    fn trajectory_check(
        &self,
        kind: MeasurementKind,
        prior: &[EvaluationResult],
        current: &EvaluationResult,
    ) -> Option<TrajectoryDeviation> {
        if prior.len() < MIN_TRAJECTORY_POINTS {
            return None;
        }

        let params = self.trend_params();
        let history: Vec<(f64, f64)> = prior.iter().map(|r| (r.x, r.z_score)).collect();
        let deviation = trajectory_deviation(
            &history,
            current.x,
            current.z_score,
            params.sigma_floor.for_kind(kind),
            params.mad_scale,
            params.trajectory_score_threshold,
        );

        if deviation.is_none() {
            debug!("{} trajectory check skipped: no stable fit over {} points", kind, prior.len());
        }
        deviation
    }

    /// Best-effort: reference lookup failures mean "no concern", never an error.
    fn velocity_check(
        &self,
        sex: Sex,
        first: MeasurementPoint,
        current: MeasurementPoint,
    ) -> Option<WeightVelocity> {
        let params = self.velocity_params();
        let elapsed = current.x - first.x;
        if elapsed < params.min_interval_months {
            return None;
        }

        let kind = MeasurementKind::WeightForAge;
        let expected = self
            .lms_at(kind, sex, current.x)
            .and_then(|end| Ok(end.m - self.lms_at(kind, sex, first.x)?.m));
        let expected_gain = match expected {
            Ok(gain) if gain.is_finite() => gain,
            Ok(_) => return None,
            Err(e) => {
                debug!("Weight velocity check skipped: {}", e);
                return None;
            }
        };

        Some(WeightVelocity::new(
            elapsed,
            current.value - first.value,
            expected_gain,
            params,
        ))
    }
}

fn single_measurement(current: EvaluationResult, threshold_z: f64) -> TrendAssessment {
    TrendAssessment {
        current,
        previous_median_z: None,
        delta_z_from_median: None,
        threshold_z,
        is_significant_shift: false,
        prior_count: 0,
        signals: TrendSignals::default(),
        narrative: SINGLE_MEASUREMENT.to_string(),
    }
}
