use crate::calendar::TimeBlockModel;
use crate::course::{Course, Trainee};
use crate::criteria::SchedulingCriteria;
use crate::error::{ConfigurationError, SchedulingError};
use crate::timetable::{ScheduledSessionPart, Timetable};
use std::collections::{BTreeMap, HashSet};

pub fn validate_course(course: &Course) -> Result<(), ConfigurationError> {
    if course.id.trim().is_empty() {
        return Err(ConfigurationError::InvalidCourse {
            course_id: course.id.clone(),
            reason: "course id must not be empty".to_string(),
        });
    }
    if !course.duration_hours.is_finite() || course.duration_hours <= 0.0 {
        return Err(ConfigurationError::InvalidCourse {
            course_id: course.id.clone(),
            reason: format!("duration must be positive (got {} hours)", course.duration_hours),
        });
    }
    if course.duration_minutes() <= 0 {
        return Err(ConfigurationError::InvalidCourse {
            course_id: course.id.clone(),
            reason: format!(
                "duration of {} hours rounds to zero minutes",
                course.duration_hours
            ),
        });
    }
    Ok(())
}

pub fn validate_course_collection(courses: &[Course]) -> Result<(), ConfigurationError> {
    if courses.is_empty() {
        return Err(ConfigurationError::NoCourses);
    }
    let mut seen_ids = HashSet::with_capacity(courses.len());
    for course in courses {
        if !seen_ids.insert(course.id.as_str()) {
            return Err(ConfigurationError::DuplicateCourse(course.id.clone()));
        }
        validate_course(course)?;
    }
    Ok(())
}

pub fn validate_trainee_collection(trainees: &[Trainee]) -> Result<(), ConfigurationError> {
    if trainees.is_empty() {
        return Err(ConfigurationError::NoTrainees);
    }
    let mut seen_ids = HashSet::with_capacity(trainees.len());
    for trainee in trainees {
        if !seen_ids.insert(trainee.id.as_str()) {
            return Err(ConfigurationError::DuplicateTrainee(trainee.id.clone()));
        }
    }
    Ok(())
}

/// Structural checks that abort a run before anything is scheduled.
pub fn validate_inputs(
    trainees: &[Trainee],
    courses: &[Course],
    criteria: &SchedulingCriteria,
) -> Result<(), ConfigurationError> {
    validate_course_collection(courses)?;
    validate_trainee_collection(trainees)?;
    criteria.validate()
}

/// Re-checks the output of a strategy: no double booking, every part inside
/// one block on a valid day, and each session group's parts adding up to its
/// course's duration.
pub fn verify_timetable(
    timetable: &Timetable,
    courses: &[Course],
    model: &TimeBlockModel,
) -> Result<(), SchedulingError> {
    let mut by_room: BTreeMap<(&str, u32), Vec<&ScheduledSessionPart>> = BTreeMap::new();
    let mut by_session: BTreeMap<(&str, &str, u32), i64> = BTreeMap::new();

    for part in timetable.parts() {
        if part.start >= part.end {
            return Err(SchedulingError::invariant(format!(
                "{} has an empty or inverted interval [{}, {})",
                part.session_id(),
                part.start,
                part.end
            )));
        }
        if (part.end - part.start).num_minutes() != part.duration_minutes {
            return Err(SchedulingError::invariant(format!(
                "{} part {} claims {} minutes but spans [{}, {})",
                part.session_id(),
                part.part,
                part.duration_minutes,
                part.start,
                part.end
            )));
        }
        if model.block_containing(part.start, part.end).is_none() {
            return Err(SchedulingError::invariant(format!(
                "{} part {} at [{}, {}) is not inside a time block on a valid day",
                part.session_id(),
                part.part,
                part.start,
                part.end
            )));
        }
        by_room
            .entry((part.location.as_str(), part.classroom))
            .or_default()
            .push(part);
        *by_session
            .entry((part.course_id.as_str(), part.location.as_str(), part.session_group))
            .or_default() += part.duration_minutes;
    }

    for ((location, classroom), mut parts) in by_room {
        parts.sort_by_key(|part| part.start);
        for pair in parts.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(SchedulingError::invariant(format!(
                    "classroom {} at {} is double booked by {} and {}",
                    classroom,
                    location,
                    pair[0].session_id(),
                    pair[1].session_id()
                )));
            }
        }
    }

    let durations: BTreeMap<&str, i64> = courses
        .iter()
        .map(|course| (course.id.as_str(), course.duration_minutes()))
        .collect();
    for ((course_id, location, group), minutes) in by_session {
        let Some(expected) = durations.get(course_id) else {
            return Err(SchedulingError::invariant(format!(
                "timetable references unknown course {course_id}"
            )));
        };
        if minutes != *expected {
            return Err(SchedulingError::invariant(format!(
                "session group {group} of {course_id} at {location} got {minutes} minutes, expected {expected}"
            )));
        }
    }

    Ok(())
}
