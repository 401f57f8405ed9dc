use crate::error::{GrowthError, GrowthResult};
use crate::models::MeasurementKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub trend: TrendParams,
    #[serde(default)]
    pub velocity: VelocityParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub directory: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["csv".to_string(), "txt".to_string(), "tsv".to_string()]
}

/// Thresholds for the baseline-shift and trajectory checks.
///
/// These defaults are empirical and have not been clinically validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendParams {
    pub shift_threshold_z: f64,
    pub trajectory_score_threshold: f64,
    pub mad_scale: f64,
    pub sigma_floor: SigmaFloors,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            shift_threshold_z: 2.0,
            trajectory_score_threshold: 2.5,
            mad_scale: 1.4826,
            sigma_floor: SigmaFloors::default(),
        }
    }
}

/// Lower bound on trajectory residual scatter, per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigmaFloors {
    pub wfa: f64,
    pub lhfa: f64,
    pub hcfa: f64,
    pub bmifa: f64,
    pub wfl: f64,
}

impl Default for SigmaFloors {
    fn default() -> Self {
        Self {
            wfa: 0.30,
            lhfa: 0.35,
            hcfa: 0.45,
            bmifa: 0.35,
            wfl: 0.30,
        }
    }
}

impl SigmaFloors {
    pub fn for_kind(&self, kind: MeasurementKind) -> f64 {
        match kind {
            MeasurementKind::WeightForAge => self.wfa,
            MeasurementKind::LengthHeightForAge => self.lhfa,
            MeasurementKind::HeadCircumferenceForAge => self.hcfa,
            MeasurementKind::BmiForAge => self.bmifa,
            MeasurementKind::WeightForLength => self.wfl,
        }
    }
}

/// Weight-velocity heuristics (weight-for-age only). Not clinically validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityParams {
    pub min_interval_months: f64,
    pub meaningful_expected_gain_kg: f64,
    pub min_gain_ratio: f64,
    pub fallback_window_months: f64,
    pub fallback_min_gain_kg: f64,
}

impl Default for VelocityParams {
    fn default() -> Self {
        Self {
            min_interval_months: 1.0,
            meaningful_expected_gain_kg: 0.10,
            min_gain_ratio: 0.60,
            fallback_window_months: 3.0,
            fallback_min_gain_kg: 0.05,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> GrowthResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GrowthResult<()> {
        if self.reference.extensions.is_empty() {
            return Err(GrowthError::Config(
                "At least one reference file extension must be specified".to_string(),
            ));
        }

        self.trend.validate()?;
        self.velocity.validate()?;

        Ok(())
    }
}

impl TrendParams {
    pub fn validate(&self) -> GrowthResult<()> {
        require_positive("trend.shift_threshold_z", self.shift_threshold_z)?;
        require_positive("trend.trajectory_score_threshold", self.trajectory_score_threshold)?;
        require_positive("trend.mad_scale", self.mad_scale)?;

        for kind in MeasurementKind::ALL {
            require_positive(
                &format!("trend.sigma_floor.{}", kind.code()),
                self.sigma_floor.for_kind(kind),
            )?;
        }

        Ok(())
    }
}

impl VelocityParams {
    pub fn validate(&self) -> GrowthResult<()> {
        require_non_negative("velocity.min_interval_months", self.min_interval_months)?;
        require_non_negative(
            "velocity.meaningful_expected_gain_kg",
            self.meaningful_expected_gain_kg,
        )?;
        require_non_negative("velocity.fallback_window_months", self.fallback_window_months)?;
        require_non_negative("velocity.fallback_min_gain_kg", self.fallback_min_gain_kg)?;

        if !(self.min_gain_ratio > 0.0 && self.min_gain_ratio <= 1.0) {
            return Err(GrowthError::Config(
                "velocity.min_gain_ratio must be in (0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> GrowthResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GrowthError::Config(format!("{} must be positive, got {}", name, value)))
    }
}

fn require_non_negative(name: &str, value: f64) -> GrowthResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GrowthError::Config(format!("{} must be non-negative, got {}", name, value)))
    }
}
