use super::grouping::SessionGroup;
use super::splitter::SessionPartPlan;
use super::{SchedulingPlan, SchedulingStrategy, StrategyOutcome, split_failure};
use crate::availability::{ClassroomAvailabilityTracker, LocationLedger};
use crate::course::Course;
use crate::criteria::SchedulingMode;
use crate::error::SchedulingError;
use crate::timetable::{ScheduledSessionPart, session_id};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Every group finishes a course, at every location, before any group starts
/// the next course.
///
/// Courses form the outer loop and share one global cursor. Within a course
/// each location packs its groups into parallel classrooms round by round,
/// starting at the cursor; the cursor then moves to the first block of the
/// valid day after the course's last part.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseCompleteScheduler;

/// Result of trying to place one group at the current local time.
enum Placement {
    Placed(u32, Vec<SessionPartPlan>),
    Blocked,
    Unplaceable(String),
}

/// One location's share of a course.
struct LocationCourseOutcome {
    outcome: StrategyOutcome,
    latest_end: Option<NaiveDateTime>,
}

impl CourseCompleteScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Candidate starts on the local day, earliest first: the local time
    /// snapped into a block, later block starts, and later reservation ends.
    fn candidate_starts(
        plan: &SchedulingPlan<'_>,
        ledger: &LocationLedger,
        local: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>, String> {
        let (snapped, _) = plan.model.snap_forward(local).map_err(|e| e.to_string())?;
        let day = snapped.date();
        let mut starts = BTreeSet::from([snapped]);
        starts.extend(plan.model.block_starts_on(day, snapped));
        for end in ledger.ends_on(day) {
            if end <= snapped {
                continue;
            }
            if let Ok((at, _)) = plan.model.snap_forward(end) {
                if at.date() == day {
                    starts.insert(at);
                }
            }
        }
        Ok(starts.into_iter().collect())
    }

    fn try_place(
        plan: &SchedulingPlan<'_>,
        ledger: &LocationLedger,
        course: &Course,
        classrooms: u32,
        local: NaiveDateTime,
    ) -> Result<Placement, SchedulingError> {
        let candidates = match Self::candidate_starts(plan, ledger, local) {
            Ok(candidates) => candidates,
            Err(reason) => return Ok(Placement::Unplaceable(reason)),
        };
        let splitter = plan.splitter();
        for start in candidates {
            let parts = match splitter.split(course.duration_minutes(), start) {
                Ok(parts) => parts,
                Err(err) => return split_failure(err, course).map(Placement::Unplaceable),
            };
            let intervals: Vec<(NaiveDateTime, NaiveDateTime)> =
                parts.iter().map(SessionPartPlan::interval).collect();
            if let Some(room) = ledger.free_classroom(&intervals, classrooms) {
                return Ok(Placement::Placed(room, parts));
            }
        }
        Ok(Placement::Blocked)
    }

    fn schedule_course_at_location(
        plan: &SchedulingPlan<'_>,
        course: &Course,
        groups: &[SessionGroup],
        ledger: &mut LocationLedger,
        cursor: NaiveDateTime,
    ) -> Result<LocationCourseOutcome, SchedulingError> {
        let mut outcome = StrategyOutcome::default();
        let mut latest_end: Option<NaiveDateTime> = None;
        let location = ledger.location().to_string();
        // Earlier courses end before `cursor`, so one room per group is always enough.
        let classrooms = plan
            .classrooms_for(&location)
            .min(u32::try_from(groups.len()).unwrap_or(u32::MAX));

        let mut pending: Vec<&SessionGroup> = groups.iter().collect();
        let mut local = cursor;
        let mut rounds = 0u32;

        while !pending.is_empty() {
            if rounds >= plan.max_placement_rounds {
                for group in &pending {
                    outcome.warn_unplaced(
                        group,
                        &format!("gave up after {} placement rounds", plan.max_placement_rounds),
                    );
                }
                break;
            }
            rounds += 1;

            let mut placed_any = false;
            let mut still_pending = Vec::with_capacity(pending.len());
            for group in pending {
                match Self::try_place(plan, ledger, course, classrooms, local)? {
                    Placement::Placed(room, parts) => {
                        let id = session_id(&course.id, &location, group.group_number);
                        for part in &parts {
                            ledger
                                .reserve_classroom(room, part.start, part.end, &id)
                                .map_err(|conflict| SchedulingError::invariant(conflict.to_string()))?;
                        }
                        if let Some(last) = parts.last() {
                            latest_end = Some(latest_end.map_or(last.end, |end| end.max(last.end)));
                        }
                        debug!(
                            location = location.as_str(),
                            classroom = room,
                            course = course.id.as_str(),
                            group = group.group_number,
                            round = rounds,
                            "placed session group"
                        );
                        outcome.parts.extend(
                            parts
                                .iter()
                                .map(|part| ScheduledSessionPart::from_plan(course, group, room, part)),
                        );
                        placed_any = true;
                    }
                    Placement::Blocked => still_pending.push(group),
                    Placement::Unplaceable(reason) => outcome.warn_unplaced(group, &reason),
                }
            }
            pending = still_pending;

            if !placed_any && !pending.is_empty() {
                match plan.model.next_day_start(local) {
                    Ok(next) => local = next,
                    Err(err) => {
                        for group in &pending {
                            outcome.warn_unplaced(group, &err.to_string());
                        }
                        break;
                    }
                }
            }
        }

        Ok(LocationCourseOutcome {
            outcome,
            latest_end,
        })
    }
}

impl SchedulingStrategy for CourseCompleteScheduler {
    fn mode(&self) -> SchedulingMode {
        SchedulingMode::CourseComplete
    }

    fn schedule(
        &self,
        plan: &SchedulingPlan<'_>,
        tracker: &mut ClassroomAvailabilityTracker,
    ) -> Result<StrategyOutcome, SchedulingError> {
        for location in plan.demand.keys() {
            tracker.ledger_mut(location);
        }

        let mut outcome = StrategyOutcome::default();
        for location in plan.demand.keys() {
            if plan.classrooms_for(location) == 0 {
                outcome.warn_no_classrooms(location);
            }
        }
        let mut cursor = plan.opening;

        for (idx, course) in plan.courses.iter().enumerate() {
            // Locations run in parallel within a course; the next course waits
            // for all of them.
            let per_location: Vec<Result<LocationCourseOutcome, SchedulingError>> = tracker
                .ledgers_mut()
                .par_iter_mut()
                .filter_map(|(location, ledger)| {
                    let groups = plan.demand.get(location)?.groups_for(&course.id);
                    if groups.is_empty() || plan.classrooms_for(location) == 0 {
                        return None;
                    }
                    Some(Self::schedule_course_at_location(
                        plan, course, groups, ledger, cursor,
                    ))
                })
                .collect();

            let mut course_end: Option<NaiveDateTime> = None;
            for result in per_location {
                let LocationCourseOutcome {
                    outcome: location_outcome,
                    latest_end,
                } = result?;
                outcome.merge(location_outcome);
                if let Some(end) = latest_end {
                    course_end = Some(course_end.map_or(end, |current| current.max(end)));
                }
            }

            if let Some(end) = course_end {
                info!(course = course.id.as_str(), finished = %end, "course delivered");
                match plan.model.next_day_start(end) {
                    Ok(next) => cursor = next,
                    Err(err) => {
                        let reason = format!("calendar ran out after course {}: {}", course.id, err);
                        for later in &plan.courses[idx + 1..] {
                            for demand in plan.demand.values() {
                                for group in demand.groups_for(&later.id) {
                                    outcome.warn_unplaced(group, &reason);
                                }
                            }
                        }
                        break;
                    }
                }
            }
        }

        Ok(outcome)
    }
}
