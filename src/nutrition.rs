use crate::models::{MeasurementKind, NutritionAssessment, NutritionCategory};

/// Below this age, weight-for-length is the basis; from it on, BMI-for-age.
pub const BMI_BASIS_AGE_MONTHS: f64 = 24.0;

/// Classify nutrition status from the z-score appropriate to the child's age.
///
/// `None` when the age is invalid or the z-score for the applicable basis is
/// missing or not finite.
pub fn assess_nutrition_status(
    age_months: f64,
    wfl_z: Option<f64>,
    bmi_z: Option<f64>,
) -> Option<NutritionAssessment> {
    if !(age_months.is_finite() && age_months >= 0.0) {
        return None;
    }

    let (basis_kind, z) = if age_months < BMI_BASIS_AGE_MONTHS {
        (MeasurementKind::WeightForLength, wfl_z?)
    } else {
        (MeasurementKind::BmiForAge, bmi_z?)
    };

    if !z.is_finite() {
        return None;
    }

    Some(NutritionAssessment {
        basis_kind,
        z_score: z,
        category: categorize(z),
    })
}

/// Boundary values fall into the bucket nearer to healthy.
pub fn categorize(z: f64) -> NutritionCategory {
    if z < -3.0 {
        NutritionCategory::SevereThinness
    } else if z < -2.0 {
        NutritionCategory::Thinness
    } else if z > 3.0 {
        NutritionCategory::Obesity
    } else if z > 2.0 {
        NutritionCategory::Overweight
    } else if z > 1.0 {
        NutritionCategory::RiskOfOverweight
    } else {
        NutritionCategory::Healthy
    }
}
