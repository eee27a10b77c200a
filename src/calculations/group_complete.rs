use super::grouping::LocationDemand;
use super::{SchedulingPlan, SchedulingStrategy, StrategyOutcome, split_failure};
use crate::availability::{ClassroomAvailabilityTracker, LocationLedger};
use crate::criteria::SchedulingMode;
use crate::error::SchedulingError;
use crate::timetable::{ScheduledSessionPart, session_id};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::debug;

/// Each group takes every course it needs, in priority order, before the next
/// group moves into the classroom.
///
/// Every classroom at a location keeps a time cursor. Group `n` goes to the
/// classroom whose cursor is earliest (lowest number on ties), runs its
/// courses back to back from there, and leaves the cursor at its last end.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupCompleteScheduler;

impl GroupCompleteScheduler {
    pub fn new() -> Self {
        Self
    }

    fn schedule_location(
        &self,
        plan: &SchedulingPlan<'_>,
        demand: &LocationDemand,
        ledger: &mut LocationLedger,
    ) -> Result<StrategyOutcome, SchedulingError> {
        let mut outcome = StrategyOutcome::default();
        let location = demand.location.as_str();
        let classrooms = plan.classrooms_for(location);
        if classrooms == 0 {
            outcome.warn_no_classrooms(location);
            return Ok(outcome);
        }

        let splitter = plan.splitter();
        // Rooms past the group count never receive a group.
        let rooms_in_use = classrooms.min(demand.max_group_count());
        let mut cursors: Vec<NaiveDateTime> = vec![plan.opening; rooms_in_use as usize];

        for group_number in 1..=demand.max_group_count() {
            let Some((slot, start)) = cursors
                .iter()
                .copied()
                .enumerate()
                .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
            else {
                break;
            };
            let classroom = slot as u32 + 1;
            let mut local = start;

            for course in &plan.courses {
                let Some(group) = demand.group(&course.id, group_number) else {
                    continue;
                };
                let parts = match splitter.split(course.duration_minutes(), local) {
                    Ok(parts) => parts,
                    Err(err) => {
                        let reason = split_failure(err, course)?;
                        outcome.warn_unplaced(group, &reason);
                        continue;
                    }
                };
                let id = session_id(&course.id, location, group_number);
                for part in &parts {
                    ledger
                        .reserve_classroom(classroom, part.start, part.end, &id)
                        .map_err(|conflict| SchedulingError::invariant(conflict.to_string()))?;
                }
                if let Some(last) = parts.last() {
                    local = last.end;
                }
                debug!(
                    location,
                    classroom,
                    course = course.id.as_str(),
                    group = group_number,
                    parts = parts.len(),
                    "placed session group"
                );
                outcome.parts.extend(
                    parts
                        .iter()
                        .map(|part| ScheduledSessionPart::from_plan(course, group, classroom, part)),
                );
            }

            cursors[slot] = local;
        }

        Ok(outcome)
    }
}

impl SchedulingStrategy for GroupCompleteScheduler {
    fn mode(&self) -> SchedulingMode {
        SchedulingMode::GroupComplete
    }

    fn schedule(
        &self,
        plan: &SchedulingPlan<'_>,
        tracker: &mut ClassroomAvailabilityTracker,
    ) -> Result<StrategyOutcome, SchedulingError> {
        for location in plan.demand.keys() {
            tracker.ledger_mut(location);
        }

        // Locations share nothing, so each runs on its own ledger.
        let per_location: Vec<Result<StrategyOutcome, SchedulingError>> = tracker
            .ledgers_mut()
            .par_iter_mut()
            .filter_map(|(location, ledger)| {
                plan.demand
                    .get(location)
                    .map(|demand| self.schedule_location(plan, demand, ledger))
            })
            .collect();

        let mut outcome = StrategyOutcome::default();
        for result in per_location {
            outcome.merge(result?);
        }
        Ok(outcome)
    }
}
