//! Batch risk sweep over many students.
//!
//! Scheduling is the caller's concern; this only scores, classifies, and
//! logs students whose level is HIGH.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::Student;
use crate::risk::{RiskBreakdown, RiskEngine, RiskLevel};

/// One student's score in a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRisk {
    pub student_id: u64,
    pub name: String,
    pub breakdown: RiskBreakdown,
    pub level: RiskLevel,
}

/// Result of scoring a batch of students.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepReport {
    /// Reference date used for scoring.
    pub as_of: Option<NaiveDate>,
    /// Every scored student, highest overall risk first.
    pub scored: Vec<StudentRisk>,
}

impl SweepReport {
    /// Students classified HIGH, highest first.
    pub fn high_risk(&self) -> impl Iterator<Item = &StudentRisk> {
        self.scored.iter().filter(|s| s.level == RiskLevel::High)
    }

    pub fn count_at(&self, level: RiskLevel) -> usize {
        self.scored.iter().filter(|s| s.level == level).count()
    }
}

/// Score every student as of `today`.
pub fn sweep<'a>(
    engine: &RiskEngine<'_>,
    students: impl IntoIterator<Item = &'a Student>,
    today: NaiveDate,
) -> SweepReport {
    let mut scored: Vec<StudentRisk> = students
        .into_iter()
        .map(|student| {
            let breakdown = engine.calculate_at(student, today);
            let level = breakdown.level();
            if level == RiskLevel::High {
                tracing::warn!(
                    student_id = student.id,
                    name = %student.name,
                    score = breakdown.overall,
                    "high risk student"
                );
            }
            StudentRisk {
                student_id: student.id,
                name: student.name.clone(),
                breakdown,
                level,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.breakdown
            .overall
            .total_cmp(&a.breakdown.overall)
            .then(a.student_id.cmp(&b.student_id))
    });

    let report = SweepReport {
        as_of: Some(today),
        scored,
    };

    let high = report.count_at(RiskLevel::High);
    if high > 0 {
        tracing::info!(
            "found {high} high-risk student(s) out of {}",
            report.scored.len()
        );
    } else {
        tracing::info!("no high-risk students among {}", report.scored.len());
    }

    report
}
