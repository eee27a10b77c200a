pub mod course_complete;
pub mod group_complete;
pub mod grouping;
pub mod splitter;

use crate::availability::ClassroomAvailabilityTracker;
use crate::calendar::TimeBlockModel;
use crate::course::Course;
use crate::criteria::SchedulingMode;
use crate::error::{SchedulingError, SchedulingWarning, SplitError};
use crate::timetable::ScheduledSessionPart;
use chrono::NaiveDateTime;
use grouping::{LocationDemand, SessionGroup};
use splitter::SessionSplitter;
use std::collections::BTreeMap;

pub use course_complete::CourseCompleteScheduler;
pub use group_complete::GroupCompleteScheduler;

/// Read-only inputs shared by both strategies for one run.
#[derive(Debug, Clone)]
pub struct SchedulingPlan<'a> {
    pub model: &'a TimeBlockModel,
    /// Courses in `(priority, id)` order.
    pub courses: Vec<&'a Course>,
    pub demand: &'a BTreeMap<String, LocationDemand>,
    /// Classrooms available per location.
    pub classrooms: BTreeMap<String, u32>,
    /// First schedulable instant of the run.
    pub opening: NaiveDateTime,
    pub max_placement_rounds: u32,
}

impl<'a> SchedulingPlan<'a> {
    pub fn splitter(&self) -> SessionSplitter<'a> {
        SessionSplitter::new(self.model)
    }

    pub fn classrooms_for(&self, location: &str) -> u32 {
        self.classrooms.get(location).copied().unwrap_or(0)
    }
}

/// Parts and warnings produced by a strategy, or by one location within it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyOutcome {
    pub parts: Vec<ScheduledSessionPart>,
    pub warnings: Vec<SchedulingWarning>,
}

impl StrategyOutcome {
    pub fn merge(&mut self, other: StrategyOutcome) {
        self.parts.extend(other.parts);
        self.warnings.extend(other.warnings);
    }

    pub(crate) fn warn(&mut self, warning: SchedulingWarning) {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("-"),
            course = warning.course.as_deref().unwrap_or("-"),
            "{}",
            warning.message
        );
        self.warnings.push(warning);
    }

    pub(crate) fn warn_no_classrooms(&mut self, location: &str) {
        self.warn(SchedulingWarning::placement(
            location,
            None,
            "no classrooms available; location skipped",
        ));
    }

    pub(crate) fn warn_unplaced(&mut self, group: &SessionGroup, reason: &str) {
        self.warn(SchedulingWarning::placement(
            group.location.as_str(),
            Some(group.course_id.as_str()),
            format!(
                "session group {} ({} trainees) could not be placed: {}",
                group.group_number,
                group.size(),
                reason
            ),
        ));
    }
}

/// A global ordering policy for placing session groups.
pub trait SchedulingStrategy: Send + Sync {
    fn mode(&self) -> SchedulingMode;

    fn schedule(
        &self,
        plan: &SchedulingPlan<'_>,
        tracker: &mut ClassroomAvailabilityTracker,
    ) -> Result<StrategyOutcome, SchedulingError>;
}

/// Maps a splitter failure to a placement-failure reason. A non-positive
/// duration never passes input validation and is reported as a violation.
pub(crate) fn split_failure(
    err: SplitError,
    course: &Course,
) -> Result<String, SchedulingError> {
    match err {
        SplitError::NonPositiveDuration(minutes) => Err(SchedulingError::invariant(format!(
            "course {} reached the splitter with {} minutes",
            course.id, minutes
        ))),
        other => Ok(other.to_string()),
    }
}
