use crate::config::{Config, TrendParams, VelocityParams};
use crate::error::{GrowthError, GrowthResult};
use crate::lms::{percentile_from_z, value_at_z, z_score, Lms};
use crate::models::{EvaluationResult, IndexAxis, MeasurementKind, Sex};
use crate::reference::{DirectorySource, ReferenceCache, ReferenceSource};

/// Evaluates measurements against cached WHO reference tables.
///
/// Safe to share between threads; every operation is a pure function of its
/// inputs and the (immutable) loaded tables.
#[derive(Debug)]
pub struct GrowthEvaluator {
    cache: ReferenceCache,
    trend: TrendParams,
    velocity: VelocityParams,
}

impl GrowthEvaluator {
    pub fn new<S: ReferenceSource + 'static>(source: S) -> Self {
        Self {
            cache: ReferenceCache::new(source),
            trend: TrendParams::default(),
            velocity: VelocityParams::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let source = DirectorySource::with_extensions(
            &config.reference.directory,
            config.reference.extensions.clone(),
        );
        Self::new(source)
            .with_trend_params(config.trend.clone())
            .with_velocity_params(config.velocity.clone())
    }

    pub fn with_trend_params(mut self, params: TrendParams) -> Self {
        self.trend = params;
        self
    }

    pub fn with_velocity_params(mut self, params: VelocityParams) -> Self {
        self.velocity = params;
        self
    }

    pub fn trend_params(&self) -> &TrendParams {
        &self.trend
    }

    pub fn velocity_params(&self) -> &VelocityParams {
        &self.velocity
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// z-score and percentile of `value` at `x` (age in months, or length in
    /// cm for weight-for-length).
    pub fn evaluate(
        &self,
        kind: MeasurementKind,
        sex: Sex,
        x: f64,
        value: f64,
    ) -> GrowthResult<EvaluationResult> {
        validate_input(kind, x, value)?;

        let lms = self.lms_at(kind, sex, x)?;
        let z = z_score(value, lms);

        Ok(EvaluationResult {
            kind,
            sex,
            x,
            value,
            z_score: z,
            percentile: percentile_from_z(z),
        })
    }

    pub fn evaluate_weight_for_length(
        &self,
        sex: Sex,
        length_cm: f64,
        weight_kg: f64,
    ) -> GrowthResult<EvaluationResult> {
        self.evaluate(MeasurementKind::WeightForLength, sex, length_cm, weight_kg)
    }

    /// Interpolated LMS parameters at `x`, clamped to the table's range.
    pub fn lms_at(&self, kind: MeasurementKind, sex: Sex, x: f64) -> GrowthResult<Lms> {
        let table = self.cache.table(kind, sex)?;
        table
            .lms_at(x)
            .ok_or(GrowthError::NoLmsForAge { kind, sex, x })
    }

    /// Measurement values lying at `z` for each of `xs`; `None` where the
    /// Box-Cox transform has no solution.
    pub fn centile_curve(
        &self,
        kind: MeasurementKind,
        sex: Sex,
        z: f64,
        xs: &[f64],
    ) -> GrowthResult<Vec<(f64, Option<f64>)>> {
        if !z.is_finite() {
            return Err(GrowthError::InvalidValue(format!("z must be finite, got {}", z)));
        }

        let table = self.cache.table(kind, sex)?;
        xs.iter()
            .map(|&x| {
                let lms = table
                    .lms_at(x)
                    .ok_or(GrowthError::NoLmsForAge { kind, sex, x })?;
                Ok((x, value_at_z(z, lms)))
            })
            .collect()
    }
}

fn validate_input(kind: MeasurementKind, x: f64, value: f64) -> GrowthResult<()> {
    let axis = match kind.axis() {
        IndexAxis::AgeMonths => "age in months",
        IndexAxis::LengthCm => "length in cm",
    };

    if !(x.is_finite() && x >= 0.0) {
        return Err(GrowthError::InvalidValue(format!(
            "{} for {} must be finite and non-negative, got {}",
            axis, kind, x
        )));
    }
    if !(value.is_finite() && value > 0.0) {
        return Err(GrowthError::InvalidValue(format!(
            "{} measurement must be finite and positive, got {}",
            kind, value
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::InMemorySource;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    const WFA_MALE: &str = "Month,L,M,S\n0,1,3.3,0.15\n1,1,4.5,0.15\n2,1,5.6,0.15\n";

    fn evaluator() -> GrowthEvaluator {
        GrowthEvaluator::new(
            InMemorySource::new()
                .with_table("wfa_0_5y_male_lms", WFA_MALE)
                .with_table("wfl_0_2y_female_lms", "45,-0.3833,2.4607,0.09029\n50,-0.3833,3.2,0.09\n")
                .with_table("lhfa_0_5y_male_lms", "Month,L,M,S\n"),
        )
    }

    #[test]
    fn test_interpolated_median_is_fiftieth_percentile() {
        let result = evaluator()
            .evaluate(MeasurementKind::WeightForAge, Sex::Male, 0.5, 3.9)
            .unwrap();
        assert_abs_diff_eq!(result.z_score, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.percentile, 50.0, epsilon = 0.5);
        assert_eq!(result.kind, MeasurementKind::WeightForAge);
        assert_eq!(result.x, 0.5);
    }

    #[test]
    fn test_deterministic() {
        let evaluator = evaluator();
        let a = evaluator.evaluate(MeasurementKind::WeightForAge, Sex::Male, 1.3, 4.1).unwrap();
        let b = evaluator.evaluate(MeasurementKind::WeightForAge, Sex::Male, 1.3, 4.1).unwrap();
        assert_eq!(a.z_score.to_bits(), b.z_score.to_bits());
        assert_eq!(a.percentile.to_bits(), b.percentile.to_bits());
    }

    #[test]
    fn test_invalid_inputs() {
        let evaluator = evaluator();
        for (x, value) in [(-0.1, 4.0), (f64::NAN, 4.0), (1.0, 0.0), (1.0, -2.0), (1.0, f64::INFINITY)] {
            let err = evaluator
                .evaluate(MeasurementKind::WeightForAge, Sex::Male, x, value)
                .unwrap_err();
            assert!(matches!(err, GrowthError::InvalidValue(_)));
        }
    }

    #[test]
    fn test_missing_and_malformed_tables() {
        let evaluator = evaluator();
        let err = evaluator
            .evaluate(MeasurementKind::WeightForAge, Sex::Female, 1.0, 4.0)
            .unwrap_err();
        assert!(matches!(err, GrowthError::ResourceNotFound { .. }));

        let err = evaluator
            .evaluate(MeasurementKind::LengthHeightForAge, Sex::Male, 1.0, 54.0)
            .unwrap_err();
        assert!(matches!(err, GrowthError::MalformedCsv { .. }));
    }

    #[test]
    fn test_weight_for_length_uses_length_axis() {
        let evaluator = evaluator();
        let result = evaluator.evaluate_weight_for_length(Sex::Female, 45.0, 2.4607).unwrap();
        assert_eq!(result.kind, MeasurementKind::WeightForLength);
        assert_eq!(result.x, 45.0);
        assert_abs_diff_eq!(result.z_score, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_preloaded_table() {
        let evaluator = evaluator();
        evaluator.cache().insert(
            MeasurementKind::BmiForAge,
            Sex::Male,
            crate::reference::LmsTable::default(),
        );
        let err = evaluator
            .evaluate(MeasurementKind::BmiForAge, Sex::Male, 30.0, 16.0)
            .unwrap_err();
        assert!(matches!(err, GrowthError::NoLmsForAge { .. }));
    }

    #[test]
    fn test_centile_curve() {
        let evaluator = evaluator();
        let curve = evaluator
            .centile_curve(MeasurementKind::WeightForAge, Sex::Male, 2.0, &[0.0, 1.0, 2.0])
            .unwrap();
        assert_eq!(curve.len(), 3);
        assert_relative_eq!(curve[0].1.unwrap(), 3.3 * 1.3, epsilon = 1e-12);
        assert_relative_eq!(curve[2].1.unwrap(), 5.6 * 1.3, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn prop_percentile_increases_with_value(x in 0.0f64..2.0, value in 3.0f64..4.5, bump in 0.01f64..0.4) {
            // keeps |z| below about 3.3, away from the saturated tails
            let evaluator = evaluator();
            let low = evaluator.evaluate(MeasurementKind::WeightForAge, Sex::Male, x, value).unwrap();
            let high = evaluator.evaluate(MeasurementKind::WeightForAge, Sex::Male, x, value + bump).unwrap();
            prop_assert!(high.z_score > low.z_score);
            prop_assert!(high.percentile > low.percentile);
            prop_assert!((0.0..=100.0).contains(&high.percentile));
        }
    }
}
