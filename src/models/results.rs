use super::{MeasurementKind, Sex};
use serde::{Deserialize, Serialize};

/// A single measurement placed on its reference distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub kind: MeasurementKind,
    pub sex: Sex,
    pub x: f64,
    pub value: f64,
    pub z_score: f64,
    pub percentile: f64,
}

/// Which checks fired during a trend assessment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSignals {
    pub median_shift: bool,
    pub trajectory_concern: bool,
    pub velocity_concern: bool,
}

impl TrendSignals {
    pub fn any(&self) -> bool {
        self.median_shift || self.trajectory_concern || self.velocity_concern
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAssessment {
    pub current: EvaluationResult,
    /// `None` exactly when `prior_count == 0`.
    pub previous_median_z: Option<f64>,
    pub delta_z_from_median: Option<f64>,
    pub threshold_z: f64,
    pub is_significant_shift: bool,
    pub prior_count: usize,
    pub signals: TrendSignals,
    pub narrative: String,
}

/// Ordered from most underweight to most overweight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionCategory {
    SevereThinness,
    Thinness,
    Healthy,
    RiskOfOverweight,
    Overweight,
    Obesity,
}

impl NutritionCategory {
    pub fn code(&self) -> &'static str {
        match self {
            NutritionCategory::SevereThinness => "severe_thinness",
            NutritionCategory::Thinness => "thinness",
            NutritionCategory::Healthy => "healthy",
            NutritionCategory::RiskOfOverweight => "risk_of_overweight",
            NutritionCategory::Overweight => "overweight",
            NutritionCategory::Obesity => "obesity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionAssessment {
    pub basis_kind: MeasurementKind,
    pub z_score: f64,
    pub category: NutritionCategory,
}
