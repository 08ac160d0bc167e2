//! The `riskwatch score` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use riskwatch_core::risk::RiskEngine;

use crate::config::load_config_from;
use crate::loader;

pub fn execute(
    catalog_path: PathBuf,
    student_path: PathBuf,
    today: Option<NaiveDate>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let graph = super::load_graph(&catalog_path)?;
    let engine = RiskEngine::new(&graph, config)?;
    let student = loader::load_student(&student_path)?;
    let today = super::reference_date(today);

    let breakdown = engine.calculate_at(&student, today);
    let level = breakdown.level();

    match format.as_str() {
        "json" => {
            let out = serde_json::json!({
                "student_id": student.id,
                "name": student.name,
                "as_of": today,
                "risk_score": (breakdown.overall * 100.0).round() / 100.0,
                "risk_level": level,
                "breakdown": breakdown,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => {
            println!("Student: {} (#{})", student.name, student.id);
            println!("Risk score: {:.2} ({level})", breakdown.overall);
            println!("  absence       {:.2}", breakdown.absence);
            println!("  assignment    {:.2}", breakdown.assignment);
            println!("  prerequisite  {:.2}", breakdown.prerequisite);
            println!("  gpa           {:.2}", breakdown.gpa);
            println!("  grade         {:.2}", breakdown.grade);
        }
    }

    Ok(())
}
