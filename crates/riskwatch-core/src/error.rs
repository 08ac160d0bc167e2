//! Core error types.
//!
//! Only caller-input problems and structural catalog problems are errors.
//! Empty collections and missing optional fields are handled by defaults,
//! and undo/redo with nothing available is an `Option::None`.

use thiserror::Error;

/// Errors surfaced by the risk engine and its supporting structures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RiskError {
    /// The prerequisite graph built from a catalog contains cycles.
    #[error("course catalog has {} prerequisite cycle(s): {}", .cycles.len(), format_cycles(.cycles))]
    CyclicCatalog { cycles: Vec<Vec<String>> },

    /// A course code is not present in the catalog.
    #[error("course not found: {0}")]
    CourseNotFound(String),

    /// An assignment index is out of range for the student's list.
    #[error("assignment index {index} out of range (student has {len})")]
    AssignmentNotFound { index: usize, len: usize },

    /// A course code is not enrolled in the targeted term.
    #[error("course {code} not found in current term")]
    EnrollmentNotFound { code: String },

    /// The risk configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RiskError {
    /// Returns `true` for errors caused by catalog or configuration structure
    /// rather than by a single caller request.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RiskError::CyclicCatalog { .. } | RiskError::InvalidConfig(_)
        )
    }

    /// Returns `true` for the not-found family of caller-input errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RiskError::CourseNotFound(_)
                | RiskError::AssignmentNotFound { .. }
                | RiskError::EnrollmentNotFound { .. }
        )
    }
}

fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|c| {
            let mut path = c.join(" -> ");
            if let Some(first) = c.first() {
                path.push_str(" -> ");
                path.push_str(first);
            }
            path
        })
        .collect::<Vec<_>>()
        .join("; ")
}
