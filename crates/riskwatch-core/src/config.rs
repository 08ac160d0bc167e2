//! Risk engine configuration.
//!
//! Every field has a default so a partial TOML file only overrides what it
//! names. File discovery lives in the CLI; this module only parses and
//! validates.

use serde::{Deserialize, Serialize};

use crate::error::RiskError;
use crate::model::ABSENCE_BITS;

/// Relative weight of each sub-score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    #[serde(default = "default_absence_weight")]
    pub absence: f64,
    #[serde(default = "default_assignment_weight")]
    pub assignment: f64,
    #[serde(default = "default_prerequisite_weight")]
    pub prerequisite: f64,
    #[serde(default = "default_gpa_weight")]
    pub gpa: f64,
    #[serde(default = "default_grade_weight")]
    pub grade: f64,
}

fn default_absence_weight() -> f64 {
    0.25
}
fn default_assignment_weight() -> f64 {
    0.25
}
fn default_prerequisite_weight() -> f64 {
    0.20
}
fn default_gpa_weight() -> f64 {
    0.15
}
fn default_grade_weight() -> f64 {
    0.15
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            absence: default_absence_weight(),
            assignment: default_assignment_weight(),
            prerequisite: default_prerequisite_weight(),
            gpa: default_gpa_weight(),
            grade: default_grade_weight(),
        }
    }
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.absence + self.assignment + self.prerequisite + self.gpa + self.grade
    }

    fn all(&self) -> [(&'static str, f64); 5] {
        [
            ("absence", self.absence),
            ("assignment", self.assignment),
            ("prerequisite", self.prerequisite),
            ("gpa", self.gpa),
            ("grade", self.grade),
        ]
    }
}

/// Top-level riskwatch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Sub-score weights.
    #[serde(default)]
    pub weights: RiskWeights,
    /// Absences allowed per term (at most 14).
    #[serde(default = "default_max_absences")]
    pub max_absences: u32,
    /// Absence ratio above which the excess is scaled up.
    #[serde(default = "default_escalation_start")]
    pub absence_escalation_start: f64,
    /// Multiplier applied to the absence ratio above the escalation start.
    #[serde(default = "default_escalation_factor")]
    pub absence_escalation_factor: f64,
    /// Look-ahead window in days for upcoming deadlines.
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: u64,
    /// Snapshots kept per student by the edit history.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Maximum autocomplete matches returned.
    #[serde(default = "default_autocomplete_limit")]
    pub autocomplete_limit: usize,
}

fn default_max_absences() -> u32 {
    ABSENCE_BITS
}
fn default_escalation_start() -> f64 {
    0.7
}
fn default_escalation_factor() -> f64 {
    1.5
}
fn default_due_soon_days() -> u64 {
    7
}
fn default_history_capacity() -> usize {
    crate::history::DEFAULT_CAPACITY
}
fn default_autocomplete_limit() -> usize {
    10
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            max_absences: default_max_absences(),
            absence_escalation_start: default_escalation_start(),
            absence_escalation_factor: default_escalation_factor(),
            due_soon_days: default_due_soon_days(),
            history_capacity: default_history_capacity(),
            autocomplete_limit: default_autocomplete_limit(),
        }
    }
}

impl RiskConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, RiskError> {
        let config: RiskConfig =
            toml::from_str(content).map_err(|e| RiskError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), RiskError> {
        for (name, w) in self.weights.all() {
            if !(0.0..=1.0).contains(&w) {
                return Err(RiskError::InvalidConfig(format!(
                    "weight '{name}' must be between 0.0 and 1.0, got {w}"
                )));
            }
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(RiskError::InvalidConfig(format!(
                "weights must sum to 1.0, got {sum:.4}"
            )));
        }
        if self.max_absences == 0 || self.max_absences > ABSENCE_BITS {
            return Err(RiskError::InvalidConfig(format!(
                "max_absences must be between 1 and {ABSENCE_BITS}"
            )));
        }
        if !(0.0..=1.0).contains(&self.absence_escalation_start) {
            return Err(RiskError::InvalidConfig(
                "absence_escalation_start must be between 0.0 and 1.0".into(),
            ));
        }
        if self.absence_escalation_factor < 1.0 {
            return Err(RiskError::InvalidConfig(
                "absence_escalation_factor must be at least 1.0".into(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(RiskError::InvalidConfig(
                "history_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
