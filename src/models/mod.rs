pub mod age;
pub mod results;

use crate::error::{GrowthError, GrowthResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use age::age_in_months;
pub use results::*;

/// The five WHO growth reference families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeasurementKind {
    #[serde(rename = "wfa")]
    WeightForAge,
    #[serde(rename = "lhfa")]
    LengthHeightForAge,
    #[serde(rename = "hcfa")]
    HeadCircumferenceForAge,
    #[serde(rename = "bmifa")]
    BmiForAge,
    #[serde(rename = "wfl")]
    WeightForLength,
}

/// What the x column of a reference table is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexAxis {
    AgeMonths,
    LengthCm,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 5] = [
        MeasurementKind::WeightForAge,
        MeasurementKind::LengthHeightForAge,
        MeasurementKind::HeadCircumferenceForAge,
        MeasurementKind::BmiForAge,
        MeasurementKind::WeightForLength,
    ];

    /// Short stable identifier, used in file stems, tokens and config keys.
    pub fn code(&self) -> &'static str {
        match self {
            MeasurementKind::WeightForAge => "wfa",
            MeasurementKind::LengthHeightForAge => "lhfa",
            MeasurementKind::HeadCircumferenceForAge => "hcfa",
            MeasurementKind::BmiForAge => "bmifa",
            MeasurementKind::WeightForLength => "wfl",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MeasurementKind::WeightForAge | MeasurementKind::WeightForLength => "kg",
            MeasurementKind::LengthHeightForAge | MeasurementKind::HeadCircumferenceForAge => "cm",
            MeasurementKind::BmiForAge => "kg/m²",
        }
    }

    pub fn axis(&self) -> IndexAxis {
        match self {
            MeasurementKind::WeightForLength => IndexAxis::LengthCm,
            _ => IndexAxis::AgeMonths,
        }
    }

    /// Candidate reference-table stems, tried in order.
    pub fn file_stems(&self, sex: Sex) -> Vec<String> {
        let sex = sex.code();
        match self {
            MeasurementKind::WeightForLength => vec![
                format!("wfl_0_2y_{}_lms", sex),
                format!("wfl_0_5y_{}_lms", sex),
                format!("wfh_0_5y_{}_lms", sex),
            ],
            kind => vec![format!("{}_0_5y_{}_lms", kind.code(), sex)],
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeasurementKind::WeightForAge => "weight-for-age",
            MeasurementKind::LengthHeightForAge => "length/height-for-age",
            MeasurementKind::HeadCircumferenceForAge => "head-circumference-for-age",
            MeasurementKind::BmiForAge => "BMI-for-age",
            MeasurementKind::WeightForLength => "weight-for-length",
        };
        f.write_str(name)
    }
}

impl FromStr for MeasurementKind {
    type Err = GrowthError;

    fn from_str(s: &str) -> GrowthResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wfa" | "weight_for_age" | "weight-for-age" => Ok(MeasurementKind::WeightForAge),
            "lhfa" | "hfa" | "lfa" | "length_height_for_age" => Ok(MeasurementKind::LengthHeightForAge),
            "hcfa" | "head_circumference_for_age" => Ok(MeasurementKind::HeadCircumferenceForAge),
            "bmifa" | "bfa" | "bmi_for_age" => Ok(MeasurementKind::BmiForAge),
            "wfl" | "wfh" | "weight_for_length" => Ok(MeasurementKind::WeightForLength),
            other => Err(GrowthError::InvalidValue(format!(
                "Unknown measurement kind: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Sex {
    type Err = GrowthError;

    fn from_str(s: &str) -> GrowthResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" | "boy" | "boys" => Ok(Sex::Male),
            "f" | "female" | "girl" | "girls" => Ok(Sex::Female),
            other => Err(GrowthError::InvalidValue(format!("Unknown sex: {}", other))),
        }
    }
}

/// One raw measurement: x is age in months, or length in cm for weight-for-length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    pub x: f64,
    pub value: f64,
}

impl MeasurementPoint {
    pub fn new(x: f64, value: f64) -> Self {
        Self { x, value }
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.x >= 0.0 && self.value.is_finite() && self.value > 0.0
    }
}

impl From<(f64, f64)> for MeasurementPoint {
    fn from((x, value): (f64, f64)) -> Self {
        Self { x, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_for_length_is_length_indexed() {
        assert_eq!(MeasurementKind::WeightForLength.axis(), IndexAxis::LengthCm);
        for kind in MeasurementKind::ALL.iter().filter(|k| **k != MeasurementKind::WeightForLength) {
            assert_eq!(kind.axis(), IndexAxis::AgeMonths);
        }
    }

    #[test]
    fn test_file_stems() {
        assert_eq!(
            MeasurementKind::HeadCircumferenceForAge.file_stems(Sex::Female),
            vec!["hcfa_0_5y_female_lms".to_string()]
        );
        let wfl = MeasurementKind::WeightForLength.file_stems(Sex::Male);
        assert_eq!(wfl[0], "wfl_0_2y_male_lms");
        assert_eq!(wfl[1], "wfl_0_5y_male_lms");
    }

    #[test]
    fn test_parse_kind_and_sex() {
        assert_eq!("WFA".parse::<MeasurementKind>().unwrap(), MeasurementKind::WeightForAge);
        assert_eq!("wfh".parse::<MeasurementKind>().unwrap(), MeasurementKind::WeightForLength);
        assert!("tsfa".parse::<MeasurementKind>().is_err());
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::Female);
        assert!("x".parse::<Sex>().is_err());
    }

    #[test]
    fn test_point_validity() {
        assert!(MeasurementPoint::new(0.0, 3.2).is_valid());
        assert!(!MeasurementPoint::new(-1.0, 3.2).is_valid());
        assert!(!MeasurementPoint::new(2.0, 0.0).is_valid());
        assert!(!MeasurementPoint::new(f64::NAN, 3.2).is_valid());
    }
}
