use crate::availability::{ClassroomAvailabilityTracker, UtilizationSummary};
use crate::calculations::grouping::{LocationDemand, build_demand};
use crate::calculations::{
    CourseCompleteScheduler, GroupCompleteScheduler, SchedulingPlan, SchedulingStrategy,
};
use crate::calendar::TimeBlockModel;
use crate::capacity::{CapacityPlanner, LocationCapacity};
use crate::course::{Course, Trainee, priority_order};
use crate::criteria::{SchedulingCriteria, SchedulingMode};
use crate::error::{
    CalendarError, ConfigurationError, RequestLoadError, SchedulingError, SchedulingWarning,
};
use crate::timetable::{ScheduleSummary, SessionRow, Timetable};
use crate::validation::{validate_course_collection, validate_inputs, verify_timetable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Everything one run needs, in the shape it is stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulingRequest {
    #[serde(default)]
    pub criteria: SchedulingCriteria,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub trainees: Vec<Trainee>,
}

impl SchedulingRequest {
    pub fn from_json_str(json: &str) -> Result<Self, RequestLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, RequestLoadError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn schedule(&self) -> Result<ScheduleReport, SchedulingError> {
        SchedulingEngine::new(self.criteria.clone()).schedule(&self.trainees, &self.courses)
    }
}

/// Timetable plus everything collected while building it. Callers must look at
/// `warnings` to find out whether the timetable is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub timetable: Timetable,
    pub warnings: Vec<SchedulingWarning>,
    pub summary: ScheduleSummary,
    pub utilization: UtilizationSummary,
}

impl ScheduleReport {
    pub fn rows(&self) -> Vec<SessionRow> {
        self.timetable.rows()
    }

    pub fn is_complete(&self) -> bool {
        self.summary.placement_failures == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchedulingEngine {
    criteria: SchedulingCriteria,
}

impl SchedulingEngine {
    pub fn new(criteria: SchedulingCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &SchedulingCriteria {
        &self.criteria
    }

    pub fn criteria_mut(&mut self) -> &mut SchedulingCriteria {
        &mut self.criteria
    }

    pub fn strategy(&self) -> Box<dyn SchedulingStrategy> {
        match self.criteria.mode {
            SchedulingMode::GroupComplete => Box::new(GroupCompleteScheduler::new()),
            SchedulingMode::CourseComplete => Box::new(CourseCompleteScheduler::new()),
        }
    }

    /// Per-location classroom estimate and assessment, without scheduling.
    pub fn estimate_capacity(
        &self,
        trainees: &[Trainee],
        courses: &[Course],
    ) -> Result<Vec<LocationCapacity>, SchedulingError> {
        validate_course_collection(courses)?;
        self.criteria.validate()?;
        let (demand, _) = build_demand(trainees, courses, self.criteria.max_attendees);
        Ok(self.capacity_for(&demand, courses)?)
    }

    fn capacity_for(
        &self,
        demand: &BTreeMap<String, LocationDemand>,
        courses: &[Course],
    ) -> Result<Vec<LocationCapacity>, ConfigurationError> {
        demand
            .values()
            .map(|location| {
                let estimate =
                    CapacityPlanner::classrooms_needed(location.demand_hours(courses), &self.criteria)?;
                let assessment = CapacityPlanner::validate_capacity(estimate.number_of_classrooms);
                let classrooms = self
                    .criteria
                    .classroom_override(&location.location)
                    .unwrap_or(estimate.number_of_classrooms);
                Ok(LocationCapacity {
                    location: location.location.clone(),
                    trainee_count: location.trainee_count,
                    session_groups: location.session_group_count(),
                    estimate,
                    assessment,
                    classrooms,
                })
            })
            .collect()
    }

    /// Builds the timetable for `trainees` and `courses`.
    ///
    /// Only structurally invalid input fails the call. Problems confined to a
    /// location or course become warnings next to a partial timetable.
    #[instrument(
        name = "schedule",
        skip_all,
        fields(
            mode = %self.criteria.mode,
            trainees = trainees.len(),
            courses = courses.len()
        )
    )]
    pub fn schedule(
        &self,
        trainees: &[Trainee],
        courses: &[Course],
    ) -> Result<ScheduleReport, SchedulingError> {
        validate_inputs(trainees, courses, &self.criteria)?;
        let model = TimeBlockModel::from_criteria(&self.criteria)?;
        info!(
            blocks = model.time_blocks().len(),
            start = %self.criteria.start_date,
            "scheduling run started"
        );

        let (demand, mut warnings) = build_demand(trainees, courses, self.criteria.max_attendees);
        for warning in &warnings {
            warn!("{}", warning.message);
        }

        let capacity = self.capacity_for(&demand, courses)?;
        for location in &capacity {
            if let Some(severity) = location.assessment.severity.warning_severity() {
                warn!(
                    location = location.location.as_str(),
                    classrooms = location.estimate.number_of_classrooms,
                    "{}",
                    location.assessment.message
                );
                warnings.push(SchedulingWarning::capacity(
                    location.location.as_str(),
                    severity,
                    location.assessment.message.as_str(),
                ));
            }
        }

        let opening = model
            .first_slot_on_or_after(self.criteria.start_date)
            .map_err(CalendarError::into_configuration)?;
        let plan = SchedulingPlan {
            model: &model,
            courses: priority_order(courses),
            demand: &demand,
            classrooms: capacity
                .iter()
                .map(|location| (location.location.clone(), location.classrooms))
                .collect(),
            opening,
            max_placement_rounds: self.criteria.max_placement_rounds,
        };

        // Fresh per run so repeated calls never see each other's bookings.
        let mut tracker = ClassroomAvailabilityTracker::new();
        let strategy = self.strategy();
        let outcome = strategy.schedule(&plan, &mut tracker)?;
        warnings.extend(outcome.warnings);

        let timetable = Timetable::from_parts(outcome.parts);
        verify_timetable(&timetable, courses, &model)?;

        let summary = ScheduleSummary::from_timetable(&timetable, &warnings);
        let utilization = tracker.utilization_summary(None);
        info!(
            mode = %strategy.mode(),
            parts = summary.part_count,
            sessions = summary.session_count,
            warnings = summary.warning_count,
            "scheduling run finished"
        );

        Ok(ScheduleReport {
            timetable,
            warnings,
            summary,
            utilization,
        })
    }
}

/// One-shot form of [`SchedulingEngine::schedule`].
pub fn schedule(
    trainees: &[Trainee],
    courses: &[Course],
    criteria: &SchedulingCriteria,
) -> Result<ScheduleReport, SchedulingError> {
    SchedulingEngine::new(criteria.clone()).schedule(trainees, courses)
}
