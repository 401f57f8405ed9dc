use crate::batch::{BatchOutput, PatientReport};
use crate::error::GrowthResult;
use crate::tokens::{format_percentile, format_z};
use log::info;
use std::fs::File;
use std::path::Path;

pub fn save_results<P: AsRef<Path>>(output: &BatchOutput, output_dir: P) -> GrowthResult<()> {
    let output_path = output_dir.as_ref();

    save_evaluations(output, &output_path.join("evaluations.csv"))?;
    save_assessments(&output.patients, &output_path.join("assessments.json"))?;
    generate_report(output, &output_path.join("report.md"))?;

    info!("All results saved to {:?}", output_path);
    Ok(())
}

fn save_evaluations<P: AsRef<Path>>(output: &BatchOutput, path: P) -> GrowthResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in &output.evaluations {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn save_assessments<P: AsRef<Path>>(patients: &[PatientReport], path: P) -> GrowthResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, patients)?;
    Ok(())
}

/// Markdown overview listing every patient with at least one problem token.
pub fn generate_report<P: AsRef<Path>>(output: &BatchOutput, path: P) -> GrowthResult<()> {
    let failed_rows = output.evaluations.iter().filter(|e| e.error.is_some()).count();
    let flagged: Vec<&PatientReport> =
        output.patients.iter().filter(|p| !p.tokens.is_empty()).collect();

    let mut content = format!(
        r#"# Growth Assessment Report

## Overview
- **Patients**: {}
- **Measurements**: {} ({} failed)
- **Patients with findings**: {}
"#,
        output.patients.len(),
        output.evaluations.len(),
        failed_rows,
        flagged.len(),
    );

    for patient in flagged {
        content.push_str(&format!("\n## Patient {}\n", patient.patient_id));
        content.push_str(&format!("- **Tokens**: {}\n", patient.tokens.join(", ")));
        for trend in &patient.trends {
            content.push_str(&format!(
                "- **{}** z {} (P{}): {}\n",
                trend.current.kind,
                format_z(trend.current.z_score),
                format_percentile(trend.current.percentile),
                trend.narrative
            ));
        }
        if let Some(nutrition) = &patient.nutrition {
            content.push_str(&format!(
                "- **Nutrition** ({}): {}\n",
                nutrition.basis_kind,
                nutrition.category.code()
            ));
        }
    }

    std::fs::write(path, content)?;
    Ok(())
}
