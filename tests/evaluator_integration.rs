//! End-to-end tests reading synthetic reference tables from `tests/fixtures/reference`.

use approx::assert_abs_diff_eq;
use std::path::PathBuf;
use std::sync::Arc;
use who_growth::{
    assess_nutrition_status, Config, DirectorySource, GrowthError, GrowthEvaluator,
    MeasurementKind, MeasurementPoint, NutritionCategory, Sex,
};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/reference")
}

fn evaluator() -> GrowthEvaluator {
    GrowthEvaluator::new(DirectorySource::new(fixture_dir()))
}

#[test]
fn test_interpolated_weight_for_age() {
    let result = evaluator()
        .evaluate(MeasurementKind::WeightForAge, Sex::Male, 0.5, 3.9)
        .unwrap();
    assert_abs_diff_eq!(result.z_score, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result.percentile, 50.0, epsilon = 0.5);
}

#[test]
fn test_header_only_resource_is_malformed() {
    let err = evaluator()
        .evaluate(MeasurementKind::LengthHeightForAge, Sex::Female, 6.0, 65.0)
        .unwrap_err();
    match err {
        GrowthError::MalformedCsv { resource, .. } => {
            let expected = fixture_dir().join("lhfa_0_5y_female_lms.csv");
            assert_eq!(resource, expected.display().to_string());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_missing_resource() {
    let err = evaluator()
        .evaluate(MeasurementKind::HeadCircumferenceForAge, Sex::Male, 6.0, 43.0)
        .unwrap_err();
    assert!(matches!(err, GrowthError::ResourceNotFound { .. }));
}

#[test]
fn test_weight_for_length_fallback_stem_in_subdirectory() {
    let result = evaluator()
        .evaluate_weight_for_length(Sex::Female, 45.0, 2.4607)
        .unwrap();
    assert_abs_diff_eq!(result.z_score, 0.0, epsilon = 1e-12);

    // beyond the last row clamps to it
    let clamped = evaluator().evaluate_weight_for_length(Sex::Female, 95.0, 10.6).unwrap();
    assert_abs_diff_eq!(clamped.z_score, 0.0, epsilon = 1e-12);
}

#[test]
fn test_commented_semicolon_table() {
    let evaluator = evaluator();
    let result = evaluator
        .evaluate(MeasurementKind::BmiForAge, Sex::Male, 36.0, 15.6)
        .unwrap();
    assert_abs_diff_eq!(result.z_score, 0.0, epsilon = 1e-12);

    let high = evaluator
        .evaluate(MeasurementKind::BmiForAge, Sex::Male, 36.0, 21.0)
        .unwrap();
    let status = assess_nutrition_status(36.0, None, Some(high.z_score)).unwrap();
    assert_eq!(status.category, NutritionCategory::Obesity);
}

#[test]
fn test_shared_across_threads_is_deterministic() {
    let evaluator = Arc::new(evaluator());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let evaluator = Arc::clone(&evaluator);
            std::thread::spawn(move || {
                evaluator
                    .evaluate(MeasurementKind::WeightForAge, Sex::Male, 1.7, 5.0)
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results {
        assert_eq!(result.z_score.to_bits(), results[0].z_score.to_bits());
        assert_eq!(result.percentile.to_bits(), results[0].percentile.to_bits());
    }
    assert_eq!(evaluator.cache().cached_count(), 1);
}

#[test]
fn test_trend_over_fixture_table() {
    let prior = [MeasurementPoint::new(0.0, 3.3), MeasurementPoint::new(1.0, 4.5)];
    let assessment = evaluator()
        .assess_trend(MeasurementKind::WeightForAge, Sex::Male, &prior, MeasurementPoint::new(2.0, 5.6))
        .unwrap();
    assert_eq!(assessment.prior_count, 2);
    assert!(!assessment.is_significant_shift);
    assert!(assessment.narrative.contains("consistent with the prior trend"));
}

#[test]
fn test_evaluator_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let json = serde_json::json!({
        "reference": { "directory": fixture_dir() },
        "trend": { "shift_threshold_z": 1.0 }
    });
    std::fs::write(&path, json.to_string()).unwrap();

    let config = Config::from_file(&path).unwrap();
    let evaluator = GrowthEvaluator::from_config(&config);
    assert_eq!(evaluator.trend_params().shift_threshold_z, 1.0);

    // z goes from 0 to about -1.5, which now crosses the lowered threshold
    let assessment = evaluator
        .assess_trend(
            MeasurementKind::WeightForAge,
            Sex::Male,
            &[MeasurementPoint::new(0.0, 3.3)],
            MeasurementPoint::new(0.5, 3.0),
        )
        .unwrap();
    assert!(assessment.signals.median_shift);
}
