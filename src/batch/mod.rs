use crate::error::{GrowthError, GrowthResult};
use crate::evaluator::GrowthEvaluator;
use crate::models::{
    age_in_months, IndexAxis, MeasurementKind, MeasurementPoint, NutritionAssessment, Sex,
    TrendAssessment,
};
use crate::nutrition::assess_nutrition_status;
use crate::tokens::problem_tokens;
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

/// One input row: a single measurement of one patient.
///
/// `x` may be left blank for age-indexed kinds when both dates are present.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementRecord {
    pub patient_id: String,
    pub sex: String,
    pub kind: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub measured_on: Option<NaiveDate>,
    pub value: f64,
}

/// Per-row output; exactly one of `z_score` or `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRow {
    pub patient_id: String,
    pub kind: Option<MeasurementKind>,
    pub x: Option<f64>,
    pub value: f64,
    pub z_score: Option<f64>,
    pub percentile: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientReport {
    pub patient_id: String,
    pub sex: Option<Sex>,
    pub age_months: Option<f64>,
    pub trends: Vec<TrendAssessment>,
    pub nutrition: Option<NutritionAssessment>,
    pub tokens: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutput {
    pub evaluations: Vec<EvaluationRow>,
    pub patients: Vec<PatientReport>,
}

pub fn read_records<P: AsRef<Path>>(path: P) -> GrowthResult<Vec<MeasurementRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// A record that passed parsing, ready to evaluate.
struct ResolvedPoint {
    kind: MeasurementKind,
    point: MeasurementPoint,
    age_months: Option<f64>,
}

/// Evaluate every record, then assess each patient's series.
///
/// Row-level problems are reported in the output instead of aborting the run.
pub fn run_batch(evaluator: &GrowthEvaluator, records: &[MeasurementRecord]) -> BatchOutput {
    let mut by_patient: BTreeMap<&str, Vec<&MeasurementRecord>> = BTreeMap::new();
    for record in records {
        by_patient.entry(record.patient_id.as_str()).or_default().push(record);
    }

    info!("Evaluating {} records for {} patients", records.len(), by_patient.len());

    let mut output = BatchOutput::default();
    for (patient_id, rows) in by_patient {
        let report = assess_patient(evaluator, patient_id, &rows, &mut output.evaluations);
        output.patients.push(report);
    }
    output
}

fn assess_patient(
    evaluator: &GrowthEvaluator,
    patient_id: &str,
    rows: &[&MeasurementRecord],
    evaluations: &mut Vec<EvaluationRow>,
) -> PatientReport {
    let mut errors = Vec::new();
    let sex = match patient_sex(rows) {
        Ok(sex) => Some(sex),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    };

    let mut series: BTreeMap<MeasurementKind, Vec<MeasurementPoint>> = BTreeMap::new();
    let mut latest_age: Option<f64> = None;

    for record in rows {
        let resolved = resolve(record);
        let mut row = EvaluationRow {
            patient_id: patient_id.to_string(),
            kind: resolved.as_ref().ok().map(|r| r.kind),
            x: resolved.as_ref().ok().map(|r| r.point.x).or(record.x),
            value: record.value,
            z_score: None,
            percentile: None,
            error: None,
        };

        let outcome = resolved.and_then(|r| {
            let sex = sex.ok_or_else(|| GrowthError::InvalidValue("patient sex unknown".to_string()))?;
            let result = evaluator.evaluate(r.kind, sex, r.point.x, r.point.value)?;
            Ok((r, result))
        });

        match outcome {
            Ok((resolved, result)) => {
                row.z_score = Some(result.z_score);
                row.percentile = Some(result.percentile);
                series.entry(resolved.kind).or_default().push(resolved.point);
                if let Some(age) = resolved.age_months {
                    latest_age = Some(latest_age.map_or(age, |a: f64| a.max(age)));
                }
            }
            Err(e) => {
                warn!("Patient {}: {}", patient_id, e);
                row.error = Some(e.to_string());
            }
        }
        evaluations.push(row);
    }

    let mut trends = Vec::new();
    if let Some(sex) = sex {
        for (kind, mut points) in series {
            points.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
            let Some((current, prior)) = points.split_last() else {
                continue;
            };
            match evaluator.assess_trend(kind, sex, prior, *current) {
                Ok(assessment) => trends.push(assessment),
                Err(e) => errors.push(format!("{} trend: {}", kind, e)),
            }
        }
    }

    let current_z = |kind: MeasurementKind| {
        trends
            .iter()
            .find(|t| t.current.kind == kind)
            .map(|t| t.current.z_score)
    };
    let nutrition = latest_age.and_then(|age| {
        assess_nutrition_status(
            age,
            current_z(MeasurementKind::WeightForLength),
            current_z(MeasurementKind::BmiForAge),
        )
    });

    let tokens = problem_tokens(&trends, nutrition.as_ref());

    PatientReport {
        patient_id: patient_id.to_string(),
        sex,
        age_months: latest_age,
        trends,
        nutrition,
        tokens,
        errors,
    }
}

fn patient_sex(rows: &[&MeasurementRecord]) -> GrowthResult<Sex> {
    let mut sex: Option<Sex> = None;
    for record in rows {
        let parsed: Sex = record.sex.parse()?;
        match sex {
            Some(existing) if existing != parsed => {
                return Err(GrowthError::InvalidValue(format!(
                    "conflicting sex values ({} and {})",
                    existing, parsed
                )));
            }
            _ => sex = Some(parsed),
        }
    }
    sex.ok_or_else(|| GrowthError::InvalidValue("no rows".to_string()))
}

fn resolve(record: &MeasurementRecord) -> GrowthResult<ResolvedPoint> {
    let kind: MeasurementKind = record.kind.parse()?;

    let age_months = match (record.date_of_birth, record.measured_on) {
        (Some(dob), Some(on)) => Some(age_in_months(dob, on).ok_or_else(|| {
            GrowthError::InvalidValue(format!("measured on {} before birth on {}", on, dob))
        })?),
        _ => None,
    };

    let x = match (record.x, kind.axis()) {
        (Some(x), _) => x,
        (None, IndexAxis::AgeMonths) => age_months.ok_or_else(|| {
            GrowthError::InvalidValue(format!(
                "{} needs x or both date_of_birth and measured_on",
                kind
            ))
        })?,
        (None, IndexAxis::LengthCm) => {
            return Err(GrowthError::InvalidValue(format!("{} needs x (length in cm)", kind)))
        }
    };

    let age_months = match kind.axis() {
        IndexAxis::AgeMonths => age_months.or(Some(x)),
        IndexAxis::LengthCm => age_months,
    };

    Ok(ResolvedPoint {
        kind,
        point: MeasurementPoint::new(x, record.value),
        age_months,
    })
}
