//! WHO growth-reference evaluation.
//!
//! Converts anthropometric measurements into LMS z-scores and percentiles,
//! detects deviations from a child's own growth trajectory, and classifies
//! nutrition status.
//!
//! # Modules
//!
//! - [`lms`]: Box-Cox z-score and normal CDF math
//! - [`reference`]: LMS tables, CSV loading, resource sources and the shared cache
//! - [`evaluator`]: single-point evaluation ([`GrowthEvaluator`])
//! - [`trend`]: baseline shift, trajectory and weight-velocity assessment
//! - [`nutrition`]: six-way nutrition-status classification
//! - [`tokens`]: display formatting and persisted problem tokens
//! - [`batch`] / [`output`]: CSV batch driver and result writers used by the CLI

pub mod batch;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod lms;
pub mod models;
pub mod nutrition;
pub mod output;
pub mod reference;
pub mod stats;
pub mod tokens;
pub mod trend;

pub use config::{Config, TrendParams, VelocityParams};
pub use error::{GrowthError, GrowthResult};
pub use evaluator::GrowthEvaluator;
pub use lms::{percentile_from_z, z_score, Lms};
pub use models::{
    age_in_months, EvaluationResult, MeasurementKind, MeasurementPoint, NutritionAssessment,
    NutritionCategory, Sex, TrendAssessment, TrendSignals,
};
pub use nutrition::assess_nutrition_status;
pub use reference::{
    DirectorySource, InMemorySource, LmsRow, LmsTable, ReferenceResource, ReferenceSource,
};
