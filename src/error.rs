use crate::criteria::SchedulingPreference;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Input that makes a scheduling run impossible. Aborts `schedule()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("no courses supplied")]
    NoCourses,
    #[error("no trainees supplied")]
    NoTrainees,
    #[error("no valid scheduling weekdays configured")]
    NoValidWeekdays,
    #[error("preference {preference} requires `{field}` to be set")]
    MissingTimeBlock {
        preference: SchedulingPreference,
        field: &'static str,
    },
    #[error("time block {block} must start before it ends ({start} >= {end})")]
    InvalidTimeBlock {
        block: &'static str,
        start: NaiveTime,
        end: NaiveTime,
    },
    #[error("time block boundary `{field}` must fall on a whole minute (got {time})")]
    SubMinuteTimeBlock { field: &'static str, time: NaiveTime },
    #[error("no time blocks configured")]
    NoTimeBlocks,
    #[error("morning block must end before the afternoon block starts")]
    OverlappingTimeBlocks,
    #[error("max attendees per session must be at least 1")]
    ZeroMaxAttendees,
    #[error("contingency factor must be a positive finite number (got {0})")]
    InvalidContingency(f64),
    #[error("capacity window (weeks x days per week x daily hours) must be positive")]
    InvalidCapacityWindow,
    #[error("course {course_id} is invalid: {reason}")]
    InvalidCourse { course_id: String, reason: String },
    #[error("duplicate course id {0}")]
    DuplicateCourse(String),
    #[error("duplicate trainee id {0}")]
    DuplicateTrainee(String),
    #[error("no valid scheduling date found on or after {from}")]
    CalendarExhausted { from: NaiveDate },
}

/// Fatal outcome of a scheduling run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulingError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("scheduling invariant violated: {0}")]
    InvariantViolation(String),
}

impl SchedulingError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("no valid scheduling weekdays configured")]
    NoValidWeekdays,
    #[error("no valid date within {days} days of {from}")]
    SearchExhausted { from: NaiveDate, days: i64 },
}

impl CalendarError {
    pub(crate) fn into_configuration(self) -> ConfigurationError {
        match self {
            CalendarError::NoValidWeekdays => ConfigurationError::NoValidWeekdays,
            CalendarError::SearchExhausted { from, .. } => {
                ConfigurationError::CalendarExhausted { from }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("session duration must be positive (got {0} minutes)")]
    NonPositiveDuration(i64),
    #[error("session starting {start} would span more than {days} days")]
    SpanExceeded { start: NaiveDateTime, days: i64 },
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "classroom {classroom} at {location} is already booked by {existing} for [{start}, {end})"
)]
pub struct ReservationConflict {
    pub location: String,
    pub classroom: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub existing: String,
}

#[derive(Debug, Error)]
pub enum RequestLoadError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}

impl WarningSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningSeverity::Info => "info",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Error => "error",
        }
    }
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Estimated classroom count exceeds policy thresholds.
    Capacity,
    /// A session group could not be placed.
    Placement,
    /// Input records that were skipped.
    Input,
}

/// Non-fatal condition collected during a run and returned next to the timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingWarning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    pub message: String,
    pub severity: WarningSeverity,
    pub kind: WarningKind,
}

impl SchedulingWarning {
    pub fn capacity(
        location: impl Into<String>,
        severity: WarningSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location: Some(location.into()),
            course: None,
            message: message.into(),
            severity,
            kind: WarningKind::Capacity,
        }
    }

    pub fn placement(
        location: impl Into<String>,
        course: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location: Some(location.into()),
            course: course.map(str::to_string),
            message: message.into(),
            severity: WarningSeverity::Error,
            kind: WarningKind::Placement,
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self {
            location: None,
            course: None,
            message: message.into(),
            severity: WarningSeverity::Warning,
            kind: WarningKind::Input,
        }
    }

    pub fn is_placement_failure(&self) -> bool {
        self.kind == WarningKind::Placement
    }
}

impl fmt::Display for SchedulingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.severity)?;
        if let Some(location) = &self.location {
            write!(f, " {location}")?;
        }
        if let Some(course) = &self.course {
            write!(f, " / {course}")?;
        }
        write!(f, ": {}", self.message)
    }
}
