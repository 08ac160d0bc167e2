//! Core data model types for riskwatch.
//!
//! These are the records the storage layer hands to the engine: courses,
//! per-term enrollments, assignments, and the student that owns them.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::RiskError;
use crate::graph::DependencyGraph;
use crate::prefix::PrefixIndex;

/// Number of meaningful bits in [`Student::absence_bits`].
pub const ABSENCE_BITS: u32 = 14;

const ABSENCE_MASK: u16 = (1 << ABSENCE_BITS) - 1;

/// A catalog course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course code (e.g. "CS101"). Case-sensitive for identity.
    pub code: String,
    /// Human-readable title.
    pub title: String,
    /// Credit hours.
    pub credit: u32,
    /// Prerequisite course codes. May reference courses not in the catalog.
    #[serde(default)]
    pub prereq: Vec<String>,
}

/// A course taken by a student in a single term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseEnrollment {
    pub code: String,
    #[serde(default)]
    pub completed: bool,
    /// Raw letter grade. Kept as a string so unmapped grades survive a round trip.
    #[serde(default)]
    pub grade: Option<String>,
}

impl CourseEnrollment {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            completed: false,
            grade: None,
        }
    }

    /// Parsed grade, if one is set and recognized.
    pub fn letter_grade(&self) -> Option<Grade> {
        self.grade.as_deref().and_then(|g| g.parse().ok())
    }

    /// Whether this enrollment carries a failing grade.
    pub fn is_failed(&self) -> bool {
        self.letter_grade() == Some(Grade::FF)
    }
}

/// Letter grades on the 4.0 scale. Parsing is exact: `"bb"` is not `BB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    AA,
    BA,
    BB,
    CB,
    CC,
    DC,
    DD,
    FF,
}

impl Grade {
    /// Per-letter risk weight used by the grade sub-score.
    pub fn risk(self) -> f64 {
        match self {
            Grade::AA => 0.0,
            Grade::BA => 0.1,
            Grade::BB => 0.2,
            Grade::CB => 0.3,
            Grade::CC => 0.4,
            Grade::DC => 0.6,
            Grade::DD => 0.8,
            Grade::FF => 1.0,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::AA => "AA",
            Grade::BA => "BA",
            Grade::BB => "BB",
            Grade::CB => "CB",
            Grade::CC => "CC",
            Grade::DC => "DC",
            Grade::DD => "DD",
            Grade::FF => "FF",
        };
        f.write_str(s)
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AA" => Ok(Grade::AA),
            "BA" => Ok(Grade::BA),
            "BB" => Ok(Grade::BB),
            "CB" => Ok(Grade::CB),
            "CC" => Ok(Grade::CC),
            "DC" => Ok(Grade::DC),
            "DD" => Ok(Grade::DD),
            "FF" => Ok(Grade::FF),
            other => Err(format!("unknown grade: {other}")),
        }
    }
}

/// Academic semester. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Semester {
    Spring = 1,
    Fall = 2,
    Summer = 3,
}

impl Semester {
    /// Last month (1-12) of the semester; the term is over once the
    /// reference month in the same year exceeds it.
    pub fn cutoff_month(self) -> u32 {
        match self {
            Semester::Spring => 6,
            Semester::Summer => 8,
            Semester::Fall => 12,
        }
    }

    /// The semester a calendar date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        match date.month() {
            1..=6 => Semester::Spring,
            7 | 8 => Semester::Summer,
            _ => Semester::Fall,
        }
    }
}

impl TryFrom<u8> for Semester {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Semester::Spring),
            2 => Ok(Semester::Fall),
            3 => Ok(Semester::Summer),
            other => Err(format!("unknown semester: {other}")),
        }
    }
}

impl From<Semester> for u8 {
    fn from(s: Semester) -> u8 {
        s as u8
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semester::Spring => write!(f, "spring"),
            Semester::Fall => write!(f, "fall"),
            Semester::Summer => write!(f, "summer"),
        }
    }
}

/// One academic term of a student's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub year: i32,
    pub semester: Semester,
    /// Enrollments, unique by code.
    #[serde(default)]
    pub courses: Vec<CourseEnrollment>,
}

impl Term {
    pub fn new(year: i32, semester: Semester) -> Self {
        Self {
            year,
            semester,
            courses: Vec::new(),
        }
    }

    /// Whether this term has ended relative to `reference`.
    ///
    /// Fall ends after December, so a Fall term is never past within its
    /// own year.
    pub fn is_past(&self, reference: NaiveDate) -> bool {
        self.year < reference.year()
            || (self.year == reference.year() && reference.month() > self.semester.cutoff_month())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.courses.iter().any(|c| c.code == code)
    }
}

/// A dated piece of coursework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub deadline: NaiveDate,
    #[serde(default)]
    pub done: bool,
}

impl Assignment {
    pub fn new(deadline: NaiveDate) -> Self {
        Self {
            deadline,
            done: false,
        }
    }

    /// Past due and not done, relative to `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.done && self.deadline < today
    }
}

/// A student's full academic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,
    pub name: String,
    /// GPA on the 4.0 scale.
    #[serde(default)]
    pub gpa: f64,
    /// One bit per recorded absence; only the low 14 bits are meaningful.
    #[serde(default)]
    pub absence_bits: u16,
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl Student {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            gpa: 0.0,
            absence_bits: 0,
            terms: Vec::new(),
            assignments: Vec::new(),
        }
    }

    /// Number of recorded absences among the meaningful bits.
    pub fn absence_count(&self) -> u32 {
        (self.absence_bits & ABSENCE_MASK).count_ones()
    }

    /// Enroll in `code` for the term containing `today`, creating the term
    /// if needed. Enrolling twice is a no-op.
    pub fn enroll(&mut self, code: impl Into<String>, today: NaiveDate) -> &Term {
        let code = code.into();
        let idx = self.current_term_index(today).unwrap_or_else(|| {
            self.terms
                .push(Term::new(today.year(), Semester::containing(today)));
            self.terms.len() - 1
        });
        let term = &mut self.terms[idx];
        if !term.contains(&code) {
            term.courses.push(CourseEnrollment::new(code));
        }
        &self.terms[idx]
    }

    /// Remove `code` from the term containing `today`.
    pub fn drop_course(&mut self, code: &str, today: NaiveDate) -> Result<&Term, RiskError> {
        let not_found = || RiskError::EnrollmentNotFound {
            code: code.to_string(),
        };
        let idx = self.current_term_index(today).ok_or_else(not_found)?;
        let term = &mut self.terms[idx];
        let pos = term
            .courses
            .iter()
            .position(|c| c.code == code)
            .ok_or_else(not_found)?;
        term.courses.remove(pos);
        Ok(&self.terms[idx])
    }

    /// Append an assignment and return its (ephemeral) index.
    pub fn add_assignment(&mut self, assignment: Assignment) -> usize {
        self.assignments.push(assignment);
        self.assignments.len() - 1
    }

    /// Replace the assignment at `index`, returning the previous value.
    pub fn update_assignment(
        &mut self,
        index: usize,
        assignment: Assignment,
    ) -> Result<Assignment, RiskError> {
        let len = self.assignments.len();
        let slot = self
            .assignments
            .get_mut(index)
            .ok_or(RiskError::AssignmentNotFound { index, len })?;
        Ok(std::mem::replace(slot, assignment))
    }

    /// Remove the assignment at `index`. Later indices shift down by one.
    pub fn remove_assignment(&mut self, index: usize) -> Result<Assignment, RiskError> {
        let len = self.assignments.len();
        if index >= len {
            return Err(RiskError::AssignmentNotFound { index, len });
        }
        Ok(self.assignments.remove(index))
    }

    fn current_term_index(&self, today: NaiveDate) -> Option<usize> {
        let semester = Semester::containing(today);
        self.terms
            .iter()
            .position(|t| t.year == today.year() && t.semester == semester)
    }
}

/// The course catalog for one scoring pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Look up a course by exact code.
    pub fn get(&self, code: &str) -> Result<&Course, RiskError> {
        self.courses
            .iter()
            .find(|c| c.code == code)
            .ok_or_else(|| RiskError::CourseNotFound(code.to_string()))
    }

    /// Build the prerequisite graph, failing if the catalog is cyclic.
    pub fn build_graph(&self) -> Result<DependencyGraph, RiskError> {
        let mut graph = DependencyGraph::new();
        for course in &self.courses {
            graph.add_course(&course.code, &course.prereq);
        }
        graph.ensure_acyclic()?;
        Ok(graph)
    }

    /// Build a fresh autocomplete index over course codes.
    pub fn build_index(&self) -> PrefixIndex<Course> {
        let mut index = PrefixIndex::new();
        for course in &self.courses {
            if !course.code.is_empty() {
                index.insert(&course.code, course.clone());
            }
        }
        index
    }
}

impl From<Vec<Course>> for Catalog {
    fn from(courses: Vec<Course>) -> Self {
        Self::new(courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn only_exact_ff_is_failed() {
        let mut e = CourseEnrollment::new("CS101");
        e.grade = Some("FF".into());
        assert!(e.is_failed());
        e.grade = Some("ff".into());
        assert!(!e.is_failed());
        assert_eq!(e.letter_grade(), None);
    }

    #[test]
    fn grade_display_and_parse() {
        assert_eq!(Grade::CB.to_string(), "CB");
        assert_eq!("DD".parse::<Grade>().unwrap(), Grade::DD);
        assert!("dd".parse::<Grade>().is_err());
        assert!(" DD".parse::<Grade>().is_err());
        assert!("A+".parse::<Grade>().is_err());
        assert!((Grade::DC.risk() - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn semester_serializes_as_integer() {
        let term = Term::new(2024, Semester::Summer);
        let json = serde_json::to_string(&term).unwrap();
        assert_eq!(json, r#"{"year":2024,"semester":3,"courses":[]}"#);
        assert!(serde_json::from_str::<Term>(r#"{"year":2024,"semester":4}"#).is_err());
    }

    #[test]
    fn term_past_cutoffs() {
        let spring = Term::new(2025, Semester::Spring);
        let summer = Term::new(2025, Semester::Summer);
        let fall = Term::new(2025, Semester::Fall);

        assert!(!spring.is_past(date(2025, 6, 30)));
        assert!(spring.is_past(date(2025, 7, 1)));
        assert!(!summer.is_past(date(2025, 8, 31)));
        assert!(summer.is_past(date(2025, 9, 1)));
        assert!(!fall.is_past(date(2025, 12, 31)));
        assert!(fall.is_past(date(2026, 1, 1)));
    }

    #[test]
    fn absence_count_ignores_high_bits() {
        let mut s = Student::new(1, "A");
        s.absence_bits = 0b1100_0000_0000_0111;
        assert_eq!(s.absence_count(), 3);
    }

    #[test]
    fn student_defaults_from_json() {
        let s: Student = serde_json::from_str(r#"{"id": 7, "name": "Ada"}"#).unwrap();
        assert_eq!(s.gpa, 0.0);
        assert!(s.terms.is_empty());
        assert!(s.assignments.is_empty());
    }

    #[test]
    fn enroll_creates_current_term_once() {
        let mut s = Student::new(1, "A");
        let today = date(2025, 10, 1);
        s.enroll("CS101", today);
        let term = s.enroll("CS101", today);
        assert_eq!(term.semester, Semester::Fall);
        assert_eq!(term.courses.len(), 1);
        s.enroll("CS102", today);
        assert_eq!(s.terms.len(), 1);
        assert_eq!(s.terms[0].courses.len(), 2);
    }

    #[test]
    fn drop_course_missing_is_not_found() {
        let mut s = Student::new(1, "A");
        let today = date(2025, 3, 1);
        assert!(matches!(
            s.drop_course("CS101", today),
            Err(RiskError::EnrollmentNotFound { .. })
        ));
        s.enroll("CS101", today);
        assert!(s.drop_course("CS999", today).is_err());
        let term = s.drop_course("CS101", today).unwrap();
        assert!(term.courses.is_empty());
    }

    #[test]
    fn assignment_index_errors() {
        let mut s = Student::new(1, "A");
        let idx = s.add_assignment(Assignment::new(date(2025, 1, 1)));
        assert_eq!(idx, 0);
        assert_eq!(
            s.remove_assignment(1),
            Err(RiskError::AssignmentNotFound { index: 1, len: 1 })
        );
        let mut done = Assignment::new(date(2025, 1, 2));
        done.done = true;
        let old = s.update_assignment(0, done.clone()).unwrap();
        assert_eq!(old.deadline, date(2025, 1, 1));
        assert_eq!(s.remove_assignment(0).unwrap(), done);
        assert!(s.update_assignment(0, done).is_err());
    }

    #[test]
    fn catalog_lookup() {
        let catalog = Catalog::new(vec![Course {
            code: "CS101".into(),
            title: "Intro".into(),
            credit: 3,
            prereq: vec![],
        }]);
        assert_eq!(catalog.get("CS101").unwrap().credit, 3);
        assert_eq!(
            catalog.get("cs101"),
            Err(RiskError::CourseNotFound("cs101".into()))
        );
    }
}
