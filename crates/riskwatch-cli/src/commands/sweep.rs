//! The `riskwatch sweep` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use riskwatch_core::risk::{RiskEngine, RiskLevel};
use riskwatch_core::sweep::{sweep, SweepReport};

use crate::config::load_config_from;
use crate::loader;

pub fn execute(
    catalog_path: PathBuf,
    students_dir: PathBuf,
    today: Option<NaiveDate>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let graph = super::load_graph(&catalog_path)?;
    let engine = RiskEngine::new(&graph, config)?;
    let students = loader::load_students(&students_dir)?;
    let today = super::reference_date(today);

    let report = sweep(&engine, &students, today);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_table(&report),
    }

    Ok(())
}

fn print_table(report: &SweepReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Name", "Score", "Level", "Absence", "Assign", "Prereq", "GPA", "Grade",
    ]);

    for s in &report.scored {
        let b = &s.breakdown;
        table.add_row(vec![
            Cell::new(s.student_id),
            Cell::new(&s.name),
            Cell::new(format!("{:.2}", b.overall)),
            Cell::new(s.level),
            Cell::new(format!("{:.2}", b.absence)),
            Cell::new(format!("{:.2}", b.assignment)),
            Cell::new(format!("{:.2}", b.prerequisite)),
            Cell::new(format!("{:.2}", b.gpa)),
            Cell::new(format!("{:.2}", b.grade)),
        ]);
    }

    println!("{table}");
    println!(
        "{} student(s): {} high, {} medium, {} low",
        report.scored.len(),
        report.count_at(RiskLevel::High),
        report.count_at(RiskLevel::Medium),
        report.count_at(RiskLevel::Low),
    );
}
