use crate::criteria::SchedulingCriteria;
use crate::error::{ConfigurationError, WarningSeverity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest classroom count that needs no attention.
pub const OK_CLASSROOM_LIMIT: u32 = 5;
/// Highest classroom count that is flagged as a warning rather than an error.
pub const WARNING_CLASSROOM_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassroomEstimate {
    pub number_of_classrooms: u32,
    pub total_training_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacitySeverity {
    Ok,
    Warning,
    Error,
}

impl CapacitySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapacitySeverity::Ok => "ok",
            CapacitySeverity::Warning => "warning",
            CapacitySeverity::Error => "error",
        }
    }

    /// Severity of the warning to raise, `None` when capacity is fine.
    pub fn warning_severity(&self) -> Option<WarningSeverity> {
        match self {
            CapacitySeverity::Ok => None,
            CapacitySeverity::Warning => Some(WarningSeverity::Warning),
            CapacitySeverity::Error => Some(WarningSeverity::Error),
        }
    }
}

impl fmt::Display for CapacitySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityAssessment {
    pub severity: CapacitySeverity,
    pub message: String,
}

/// Advisory "how many rooms do we need" estimate. The packing does not
/// depend on it being right.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityPlanner;

impl CapacityPlanner {
    /// `ceil(total_hours * contingency / (weeks * days_per_week * daily_hours))`, at least 1.
    pub fn classrooms_needed(
        total_training_hours: f64,
        criteria: &SchedulingCriteria,
    ) -> Result<ClassroomEstimate, ConfigurationError> {
        if !criteria.contingency.is_finite() || criteria.contingency <= 0.0 {
            return Err(ConfigurationError::InvalidContingency(criteria.contingency));
        }
        let available = criteria.available_hours_per_classroom();
        if !available.is_finite() || available <= 0.0 {
            return Err(ConfigurationError::InvalidCapacityWindow);
        }
        let demand = total_training_hours.max(0.0) * criteria.contingency;
        let needed = (demand / available).ceil();
        let number_of_classrooms = if needed >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            (needed as u32).max(1)
        };
        Ok(ClassroomEstimate {
            number_of_classrooms,
            total_training_hours,
        })
    }

    pub fn validate_capacity(number_of_classrooms: u32) -> CapacityAssessment {
        if number_of_classrooms <= OK_CLASSROOM_LIMIT {
            CapacityAssessment {
                severity: CapacitySeverity::Ok,
                message: format!("{number_of_classrooms} classroom(s) required"),
            }
        } else if number_of_classrooms <= WARNING_CLASSROOM_LIMIT {
            CapacityAssessment {
                severity: CapacitySeverity::Warning,
                message: format!(
                    "{number_of_classrooms} classrooms required; consider extending the training window"
                ),
            }
        } else {
            CapacityAssessment {
                severity: CapacitySeverity::Error,
                message: format!(
                    "{number_of_classrooms} classrooms required, more than the {WARNING_CLASSROOM_LIMIT} a location can reasonably provide"
                ),
            }
        }
    }
}

/// Pre-flight capacity figures for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCapacity {
    pub location: String,
    pub trainee_count: usize,
    pub session_groups: usize,
    pub estimate: ClassroomEstimate,
    pub assessment: CapacityAssessment,
    /// Classrooms the schedulers will use: the override if set, else the estimate.
    pub classrooms: u32,
}
