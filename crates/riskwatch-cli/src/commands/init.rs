//! The `riskwatch init` command.

use std::path::Path;

use anyhow::Result;

use crate::config::CONFIG_FILE;

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE).exists() {
        println!("{CONFIG_FILE} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE}");
    }

    println!("\nNext steps:");
    println!("  1. Adjust weights in {CONFIG_FILE} if needed");
    println!("  2. Run: riskwatch check-catalog --catalog data/course_catalog.json");
    println!("  3. Run: riskwatch sweep --catalog data/course_catalog.json --students data/students");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# riskwatch configuration

# Absences allowed per term (1-14).
max_absences = 14
absence_escalation_start = 0.7
absence_escalation_factor = 1.5

# Look-ahead window for upcoming deadlines, in days.
due_soon_days = 7

history_capacity = 100
autocomplete_limit = 10

# Must sum to 1.0.
[weights]
absence = 0.25
assignment = 0.25
prerequisite = 0.20
gpa = 0.15
grade = 0.15
"#;
