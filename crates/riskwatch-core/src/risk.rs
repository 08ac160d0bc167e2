//! Weighted student risk scoring.
//!
//! Five sub-scores, each clamped to [0, 1], are combined with the configured
//! weights into a single overall score:
//!
//! | Sub-score    | Source                                              |
//! |--------------|-----------------------------------------------------|
//! | absence      | set bits in `absence_bits` over the allowed maximum |
//! | assignment   | overdue work plus proximity of upcoming deadlines   |
//! | prerequisite | missing transitive prerequisites of current courses |
//! | gpa          | step function on the 4.0 scale                      |
//! | grade        | average letter-grade risk of completed courses      |
//!
//! Missing data never errors; each sub-score falls back to 0.0.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::deadlines::DeadlineQueue;
use crate::error::RiskError;
use crate::graph::DependencyGraph;
use crate::model::{CourseEnrollment, Grade, Student};

/// Risk contributed by a grade string that is not a known letter grade.
const UNKNOWN_GRADE_RISK: f64 = 0.5;

/// Display classification of an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const HIGH_THRESHOLD: f64 = 0.75;
    pub const MEDIUM_THRESHOLD: f64 = 0.5;

    pub fn from_score(score: f64) -> Self {
        if score > Self::HIGH_THRESHOLD {
            RiskLevel::High
        } else if score > Self::MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// The overall score together with its five components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub absence: f64,
    pub assignment: f64,
    pub prerequisite: f64,
    pub gpa: f64,
    pub grade: f64,
    pub overall: f64,
}

impl RiskBreakdown {
    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_score(self.overall)
    }
}

/// Enrollments split relative to a reference date.
#[derive(Debug, Default)]
struct EnrollmentSplit<'a> {
    completed_codes: BTreeSet<String>,
    completed: Vec<&'a CourseEnrollment>,
    current_codes: BTreeSet<String>,
}

impl<'a> EnrollmentSplit<'a> {
    /// Past-term enrollments are completed. In a term that has not ended,
    /// an enrollment is completed only if marked so without a failing grade;
    /// everything else is current.
    fn of(student: &'a Student, today: NaiveDate) -> Self {
        let mut split = Self::default();
        for term in &student.terms {
            let past = term.is_past(today);
            for enrollment in &term.courses {
                if past || (enrollment.completed && !enrollment.is_failed()) {
                    split.completed_codes.insert(enrollment.code.clone());
                    split.completed.push(enrollment);
                } else {
                    split.current_codes.insert(enrollment.code.clone());
                }
            }
        }
        split
    }
}

/// Scores students against one prerequisite graph.
///
/// The graph is built by the caller once per catalog version and borrowed
/// here; construct a new engine after rebuilding it.
#[derive(Debug, Clone)]
pub struct RiskEngine<'g> {
    graph: &'g DependencyGraph,
    config: RiskConfig,
}

impl<'g> RiskEngine<'g> {
    /// Create an engine, refusing cyclic graphs and invalid configuration.
    pub fn new(graph: &'g DependencyGraph, config: RiskConfig) -> Result<Self, RiskError> {
        config.validate()?;
        graph.ensure_acyclic()?;
        Ok(Self { graph, config })
    }

    /// Engine with the default weights and limits.
    pub fn with_defaults(graph: &'g DependencyGraph) -> Result<Self, RiskError> {
        Self::new(graph, RiskConfig::default())
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn graph(&self) -> &DependencyGraph {
        self.graph
    }

    /// Score a student as of today's local date.
    pub fn calculate(&self, student: &Student) -> RiskBreakdown {
        self.calculate_at(student, Local::now().date_naive())
    }

    /// Score a student as of `today`.
    pub fn calculate_at(&self, student: &Student, today: NaiveDate) -> RiskBreakdown {
        let split = EnrollmentSplit::of(student, today);

        let absence = self.absence_risk(student);
        let assignment = self.assignment_risk(student, today);
        let prerequisite = self.prerequisite_risk_for(&split);
        let gpa = gpa_risk(student.gpa);
        let grade = grade_risk_for(&split);

        let w = &self.config.weights;
        let weighted = w.absence * absence
            + w.assignment * assignment
            + w.prerequisite * prerequisite
            + w.gpa * gpa
            + w.grade * grade;
        let overall = clamp_unit(weighted);

        tracing::debug!(
            student_id = student.id,
            absence,
            assignment,
            prerequisite,
            gpa,
            grade,
            overall,
            "computed risk"
        );

        RiskBreakdown {
            absence,
            assignment,
            prerequisite,
            gpa,
            grade,
            overall,
        }
    }

    /// Absence ratio, with the excess above the escalation start scaled up.
    pub fn absence_risk(&self, student: &Student) -> f64 {
        let max = self.config.max_absences;
        if max == 0 {
            return 0.0;
        }
        let mut ratio = f64::from(student.absence_count()) / f64::from(max);
        let start = self.config.absence_escalation_start;
        if ratio > start {
            ratio = start + (ratio - start) * self.config.absence_escalation_factor;
        }
        clamp_unit(ratio)
    }

    /// Half overdue ratio, half upcoming-deadline pressure.
    ///
    /// Deadline pressure sums a weight for each unfinished assignment in the
    /// look-ahead window and divides by the number of assignments in that
    /// window, finished ones included.
    pub fn assignment_risk(&self, student: &Student, today: NaiveDate) -> f64 {
        if student.assignments.is_empty() {
            return 0.0;
        }

        let total = student.assignments.len() as f64;
        let missed = student
            .assignments
            .iter()
            .filter(|a| a.is_overdue(today))
            .count() as f64;
        let missed_ratio = missed / total;

        let queue = DeadlineQueue::from_assignments(&student.assignments);
        let upcoming = queue.due_within(self.config.due_soon_days, today);
        let pressure: f64 = upcoming
            .iter()
            .filter(|a| !a.done)
            .map(|a| deadline_weight((a.deadline - today).num_days()))
            .sum();
        let deadline_ratio = if upcoming.is_empty() {
            0.0
        } else {
            pressure / upcoming.len() as f64
        };

        clamp_unit(0.5 * missed_ratio + 0.5 * deadline_ratio)
    }

    /// Fraction of current courses' transitive prerequisites not yet completed.
    pub fn prerequisite_risk(&self, student: &Student, today: NaiveDate) -> f64 {
        self.prerequisite_risk_for(&EnrollmentSplit::of(student, today))
    }

    /// Average letter-grade risk over completed, graded enrollments.
    pub fn grade_risk(&self, student: &Student, today: NaiveDate) -> f64 {
        grade_risk_for(&EnrollmentSplit::of(student, today))
    }

    /// Transitive prerequisites of `code` missing from the student's
    /// completed courses as of `today`.
    pub fn missing_prerequisites(
        &self,
        student: &Student,
        code: &str,
        today: NaiveDate,
    ) -> BTreeSet<String> {
        let split = EnrollmentSplit::of(student, today);
        self.graph
            .missing_prerequisites(code, &split.completed_codes)
    }

    fn prerequisite_risk_for(&self, split: &EnrollmentSplit<'_>) -> f64 {
        let mut total = 0usize;
        let mut missing = 0usize;
        for code in &split.current_codes {
            total += self.graph.prerequisites_of(code).len();
            missing += self
                .graph
                .missing_prerequisites(code, &split.completed_codes)
                .len();
        }
        if total == 0 {
            return 0.0;
        }
        clamp_unit(missing as f64 / total as f64)
    }
}

/// Step function on a 4.0-scale GPA.
pub fn gpa_risk(gpa: f64) -> f64 {
    if gpa >= 3.5 {
        0.0
    } else if gpa >= 3.0 {
        0.2
    } else if gpa >= 2.5 {
        0.4
    } else if gpa >= 2.0 {
        0.6
    } else if gpa >= 1.5 {
        0.8
    } else {
        1.0
    }
}

/// Risk weight of a raw grade string; unknown grades score 0.5.
pub fn letter_grade_risk(grade: &str) -> f64 {
    grade
        .parse::<Grade>()
        .map(Grade::risk)
        .unwrap_or(UNKNOWN_GRADE_RISK)
}

fn grade_risk_for(split: &EnrollmentSplit<'_>) -> f64 {
    let risks: Vec<f64> = split
        .completed
        .iter()
        .filter_map(|e| e.grade.as_deref())
        .map(letter_grade_risk)
        .collect();
    if risks.is_empty() {
        return 0.0;
    }
    clamp_unit(risks.iter().sum::<f64>() / risks.len() as f64)
}

fn deadline_weight(days_left: i64) -> f64 {
    match days_left {
        d if d <= 1 => 1.0,
        d if d <= 3 => 0.7,
        d if d <= 5 => 0.4,
        _ => 0.2,
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, Catalog, Course, CourseEnrollment, Semester, Term};
    use chrono::Days;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
    }

    fn course(code: &str, prereq: &[&str]) -> Course {
        Course {
            code: code.into(),
            title: code.into(),
            credit: 3,
            prereq: prereq.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn graph() -> DependencyGraph {
        Catalog::new(vec![
            course("CS101", &[]),
            course("CS102", &["CS101"]),
            course("CS201", &["CS102"]),
        ])
        .build_graph()
        .unwrap()
    }

    fn term(year: i32, semester: Semester, courses: &[&str]) -> Term {
        Term {
            year,
            semester,
            courses: courses.iter().map(|c| CourseEnrollment::new(*c)).collect(),
        }
    }

    fn graded(code: &str, grade: &str) -> CourseEnrollment {
        CourseEnrollment {
            code: code.into(),
            completed: true,
            grade: Some(grade.into()),
        }
    }

    fn student() -> Student {
        let mut s = Student::new(1, "Test Student");
        s.gpa = 4.0;
        s
    }

    fn due_in(days: i64, done: bool) -> Assignment {
        let deadline = if days >= 0 {
            today().checked_add_days(Days::new(days as u64)).unwrap()
        } else {
            today().checked_sub_days(Days::new((-days) as u64)).unwrap()
        };
        Assignment { deadline, done }
    }

    #[test]
    fn no_risk_student_scores_low() {
        let g = graph();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let s = student();
        let r = engine.calculate_at(&s, today());
        assert!(r.overall < 0.1, "expected < 0.1, got {}", r.overall);
        assert_eq!(r.level(), RiskLevel::Low);
    }

    #[test]
    fn no_risk_student_with_satisfied_prereqs() {
        let g = graph();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        s.terms = vec![
            term(2024, Semester::Spring, &["CS101"]),
            term(2025, Semester::Fall, &["CS102"]),
        ];
        let r = engine.calculate_at(&s, today());
        assert_eq!(r.prerequisite, 0.0);
        assert!(r.overall < 0.1);
    }

    #[test]
    fn high_risk_student_scores_high() {
        let g = graph();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        s.gpa = 1.2;
        s.absence_bits = 0b11_1111_1111;
        s.terms = vec![
            term(2024, Semester::Spring, &[]),
            term(2025, Semester::Fall, &["CS201"]),
        ];
        s.assignments = vec![due_in(-5, false), due_in(1, false)];

        let r = engine.calculate_at(&s, today());
        assert!(r.overall > 0.7, "expected > 0.7, got {}", r.overall);
        assert!((r.prerequisite - 1.0).abs() < f64::EPSILON);
        assert!((r.gpa - 1.0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(4, 4.0 / 14.0)]
    #[case(7, 0.5)]
    #[case(9, 9.0 / 14.0)]
    #[case(10, 0.7 + (10.0 / 14.0 - 0.7) * 1.5)]
    #[case(12, 0.7 + (12.0 / 14.0 - 0.7) * 1.5)]
    #[case(14, 1.0)]
    fn absence_risk_by_count(#[case] absences: u32, #[case] expected: f64) {
        let g = DependencyGraph::new();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        s.absence_bits = ((1u32 << absences) - 1) as u16;
        let risk = engine.absence_risk(&s);
        assert!((risk - expected).abs() < 1e-9, "{absences}: {risk} != {expected}");
    }

    #[test]
    fn absence_risk_for_four_absences_is_moderate() {
        let g = DependencyGraph::new();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        s.absence_bits = 0b1111;
        let risk = engine.absence_risk(&s);
        assert!(risk > 0.2 && risk < 0.4);
    }

    #[test]
    fn absence_risk_depends_only_on_popcount() {
        let g = DependencyGraph::new();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        for bits in 0u16..(1 << 14) {
            let mut s = student();
            s.absence_bits = bits;
            let k = f64::from(bits.count_ones()) / 14.0;
            let expected = if k > 0.7 { 0.7 + (k - 0.7) * 1.5 } else { k };
            assert!((engine.absence_risk(&s) - expected.min(1.0)).abs() < 1e-9);
        }
    }

    #[rstest]
    #[case(4.0, 0.0)]
    #[case(3.5, 0.0)]
    #[case(3.2, 0.2)]
    #[case(2.7, 0.4)]
    #[case(2.2, 0.6)]
    #[case(1.7, 0.8)]
    #[case(1.0, 1.0)]
    #[case(0.0, 1.0)]
    fn gpa_step_function(#[case] gpa: f64, #[case] expected: f64) {
        assert!((gpa_risk(gpa) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn assignment_risk_empty_is_zero() {
        let g = DependencyGraph::new();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        assert_eq!(engine.assignment_risk(&student(), today()), 0.0);
    }

    #[test]
    fn assignment_risk_counts_done_in_denominator_only() {
        let g = DependencyGraph::new();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        // Due in 2 days (0.7), due in 4 days but done, due in 20 days.
        s.assignments = vec![due_in(2, false), due_in(4, true), due_in(20, false)];
        let risk = engine.assignment_risk(&s, today());
        let expected = 0.5 * 0.0 + 0.5 * (0.7 / 2.0);
        assert!((risk - expected).abs() < 1e-9, "{risk} != {expected}");
    }

    #[test]
    fn assignment_risk_weights_by_days_left() {
        let g = DependencyGraph::new();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        s.assignments = vec![
            due_in(0, false),
            due_in(3, false),
            due_in(5, false),
            due_in(7, false),
        ];
        let risk = engine.assignment_risk(&s, today());
        let expected = 0.5 * ((1.0 + 0.7 + 0.4 + 0.2) / 4.0);
        assert!((risk - expected).abs() < 1e-9);
    }

    #[test]
    fn overdue_assignment_counts_as_missed_and_urgent() {
        let g = DependencyGraph::new();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        s.assignments = vec![due_in(-3, false), due_in(-3, true)];
        // missed 1/2; both in window, only the unfinished one adds 1.0.
        let risk = engine.assignment_risk(&s, today());
        assert!((risk - (0.5 * 0.5 + 0.5 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn prerequisite_risk_partial() {
        let g = graph();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        s.terms = vec![
            term(2024, Semester::Fall, &["CS101"]),
            term(2025, Semester::Fall, &["CS201"]),
        ];
        // CS201 needs CS102 and CS101; CS101 is done.
        assert!((engine.prerequisite_risk(&s, today()) - 0.5).abs() < 1e-9);
        assert_eq!(
            engine.missing_prerequisites(&s, "CS201", today()),
            BTreeSet::from(["CS102".to_string()])
        );
    }

    #[test]
    fn current_term_completion_rules() {
        let g = graph();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        let mut current = term(2025, Semester::Fall, &["CS102"]);
        current.courses.push(graded("CS101", "BB"));
        s.terms = vec![current];
        assert_eq!(engine.prerequisite_risk(&s, today()), 0.0);

        s.terms[0].courses[1].grade = Some("FF".into());
        assert!((engine.prerequisite_risk(&s, today()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn spring_term_is_past_by_october() {
        let g = graph();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        s.terms = vec![term(2025, Semester::Spring, &["CS101", "CS102"])];
        assert_eq!(engine.prerequisite_risk(&s, today()), 0.0);

        let march = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!((engine.prerequisite_risk(&s, march) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn grade_risk_averages_completed_grades() {
        let g = graph();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        let mut past = Term::new(2024, Semester::Fall);
        past.courses = vec![
            graded("CS101", "AA"),
            graded("CS102", "DD"),
            graded("MATH101", "A+"),
            CourseEnrollment::new("PHYS101"),
        ];
        s.terms = vec![past];
        let expected = (0.0 + 0.8 + 0.5) / 3.0;
        assert!((engine.grade_risk(&s, today()) - expected).abs() < 1e-9);
    }

    #[test]
    fn grade_risk_empty_is_zero() {
        let g = graph();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        s.terms = vec![term(2025, Semester::Fall, &["CS101"])];
        assert_eq!(engine.grade_risk(&s, today()), 0.0);
    }

    #[test]
    fn weights_apply_to_components() {
        let g = DependencyGraph::new();
        let engine = RiskEngine::with_defaults(&g).unwrap();
        let mut s = student();
        s.gpa = 1.0;
        let r = engine.calculate_at(&s, today());
        assert!((r.overall - 0.15).abs() < 1e-9);
    }

    #[test]
    fn cyclic_graph_is_rejected() {
        let mut g = graph();
        g.add_course("CS101", &["CS201"]);
        let err = RiskEngine::with_defaults(&g).unwrap_err();
        assert!(matches!(err, RiskError::CyclicCatalog { .. }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let g = graph();
        let mut config = RiskConfig::default();
        config.weights.grade = 0.5;
        assert!(RiskEngine::new(&g, config).is_err());
    }

    #[rstest]
    #[case("AA", 0.0)]
    #[case("BB", 0.2)]
    #[case("FF", 1.0)]
    #[case("bb", 0.5)]
    #[case(" AA ", 0.5)]
    #[case("", 0.5)]
    fn letter_grade_risk_matches_exact_codes(#[case] grade: &str, #[case] expected: f64) {
        assert!((letter_grade_risk(grade) - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(0.9, RiskLevel::High)]
    #[case(0.76, RiskLevel::High)]
    #[case(0.75, RiskLevel::Medium)]
    #[case(0.51, RiskLevel::Medium)]
    #[case(0.5, RiskLevel::Low)]
    #[case(0.0, RiskLevel::Low)]
    fn risk_level_thresholds(#[case] score: f64, #[case] level: RiskLevel) {
        assert_eq!(RiskLevel::from_score(score), level);
    }

    #[test]
    fn risk_level_display() {
        assert_eq!(RiskLevel::High.to_string(), "HIGH");
        assert_eq!(
            serde_json::to_string(&RiskLevel::Medium).unwrap(),
            "\"MEDIUM\""
        );
    }
}
