use crate::course::{Course, Trainee};
use crate::error::SchedulingWarning;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

/// A bounded slice of the trainees at one location who need one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGroup {
    pub course_id: String,
    pub location: String,
    /// 1-based, stable within (course, location).
    pub group_number: u32,
    /// Index range into the location's trainee list for this course.
    pub trainees: Range<usize>,
    pub trainee_ids: Vec<String>,
}

impl SessionGroup {
    pub fn size(&self) -> usize {
        self.trainee_ids.len()
    }
}

/// Splits `trainee_ids` into contiguous groups of at most `max_attendees`.
pub fn partition_trainees(
    course_id: &str,
    location: &str,
    trainee_ids: &[String],
    max_attendees: u32,
) -> Vec<SessionGroup> {
    let chunk = (max_attendees as usize).max(1);
    trainee_ids
        .chunks(chunk)
        .enumerate()
        .map(|(idx, ids)| {
            let first = idx * chunk;
            SessionGroup {
                course_id: course_id.to_string(),
                location: location.to_string(),
                group_number: idx as u32 + 1,
                trainees: first..first + ids.len(),
                trainee_ids: ids.to_vec(),
            }
        })
        .collect()
}

/// Everything one location needs scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationDemand {
    pub location: String,
    pub trainee_count: usize,
    /// Session groups keyed by course id.
    pub groups: BTreeMap<String, Vec<SessionGroup>>,
}

impl LocationDemand {
    pub fn groups_for(&self, course_id: &str) -> &[SessionGroup] {
        self.groups.get(course_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn group(&self, course_id: &str, group_number: u32) -> Option<&SessionGroup> {
        self.groups_for(course_id)
            .iter()
            .find(|group| group.group_number == group_number)
    }

    pub fn max_group_count(&self) -> u32 {
        self.groups.values().map(|g| g.len() as u32).max().unwrap_or(0)
    }

    pub fn session_group_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Classroom-hours of demand: one course duration per session group.
    pub fn demand_hours(&self, courses: &[Course]) -> f64 {
        courses
            .iter()
            .map(|course| self.groups_for(&course.id).len() as f64 * course.duration_hours)
            .sum()
    }
}

/// Per-location session groups for every course, plus warnings for course
/// references that match no known course.
pub fn build_demand(
    trainees: &[Trainee],
    courses: &[Course],
    max_attendees: u32,
) -> (BTreeMap<String, LocationDemand>, Vec<SchedulingWarning>) {
    let known: HashSet<&str> = courses.iter().map(|c| c.id.as_str()).collect();
    let mut warnings = Vec::new();
    // location -> course -> trainee ids, input order
    let mut needs: BTreeMap<&str, BTreeMap<&str, Vec<String>>> = BTreeMap::new();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

    for trainee in trainees {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut resolved = false;
        for course_id in &trainee.courses {
            if !known.contains(course_id.as_str()) {
                warnings.push(SchedulingWarning::input(format!(
                    "trainee {} references unknown course {}",
                    trainee.id, course_id
                )));
                continue;
            }
            if !seen.insert(course_id.as_str()) {
                continue;
            }
            resolved = true;
            needs
                .entry(trainee.location.as_str())
                .or_default()
                .entry(course_id.as_str())
                .or_default()
                .push(trainee.id.clone());
        }
        if resolved {
            *counts.entry(trainee.location.as_str()).or_default() += 1;
        } else {
            warnings.push(SchedulingWarning::input(format!(
                "trainee {} has no schedulable courses and was skipped",
                trainee.id
            )));
        }
    }

    let demand = needs
        .into_iter()
        .map(|(location, by_course)| {
            let groups = by_course
                .into_iter()
                .map(|(course_id, ids)| {
                    let groups = partition_trainees(course_id, location, &ids, max_attendees);
                    (course_id.to_string(), groups)
                })
                .collect();
            let demand = LocationDemand {
                location: location.to_string(),
                trainee_count: counts.get(location).copied().unwrap_or(0),
                groups,
            };
            (location.to_string(), demand)
        })
        .collect();
    (demand, warnings)
}
