use crate::calculations::grouping::SessionGroup;
use crate::calculations::splitter::SessionPartPlan;
use crate::calendar::BlockKind;
use crate::course::Course;
use crate::error::SchedulingWarning;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One contiguous scheduled block of time for one session group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSessionPart {
    pub location: String,
    pub classroom: u32,
    pub course_id: String,
    pub course_name: String,
    pub functional_area: String,
    pub session_group: u32,
    pub trainee_count: usize,
    pub part: u32,
    pub total_parts: u32,
    pub day: u32,
    pub total_days: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
    pub block: BlockKind,
    pub title: String,
}

pub fn classroom_key(classroom: u32) -> String {
    format!("Classroom {classroom}")
}

pub fn session_id(course_id: &str, location: &str, session_group: u32) -> String {
    format!("{course_id}@{location}#{session_group}")
}

fn session_title(course: &Course, group: u32, plan: &SessionPartPlan) -> String {
    let mut title = format!("{} - Session {}", course.name, group);
    if plan.total_days > 1 {
        title.push_str(&format!(" (Day {} of {})", plan.day, plan.total_days));
    } else if plan.total_parts > 1 {
        title.push_str(&format!(" (Part {} of {})", plan.part, plan.total_parts));
    }
    title
}

impl ScheduledSessionPart {
    pub fn from_plan(
        course: &Course,
        group: &SessionGroup,
        classroom: u32,
        plan: &SessionPartPlan,
    ) -> Self {
        Self {
            location: group.location.clone(),
            classroom,
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            functional_area: course.functional_area().to_string(),
            session_group: group.group_number,
            trainee_count: group.size(),
            part: plan.part,
            total_parts: plan.total_parts,
            day: plan.day,
            total_days: plan.total_days,
            start: plan.start,
            end: plan.end,
            duration_minutes: plan.duration_minutes,
            block: plan.block,
            title: session_title(course, group.group_number, plan),
        }
    }

    pub fn interval(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.start, self.end)
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes as f64 / 60.0
    }

    pub fn session_id(&self) -> String {
        session_id(&self.course_id, &self.location, self.session_group)
    }

    pub fn classroom_key(&self) -> String {
        classroom_key(self.classroom)
    }
}

/// Flat row handed to persistence and calendar collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub course: String,
    pub session_number: u32,
    pub part_number: u32,
    pub location: String,
    pub classroom_number: u32,
    pub group_name: String,
}

impl From<&ScheduledSessionPart> for SessionRow {
    fn from(part: &ScheduledSessionPart) -> Self {
        Self {
            start: part.start,
            end: part.end,
            course: part.course_id.clone(),
            session_number: part.session_group,
            part_number: part.part,
            location: part.location.clone(),
            classroom_number: part.classroom,
            group_name: format!("Group {}", part.session_group),
        }
    }
}

pub type ClassroomSessions = BTreeMap<String, Vec<ScheduledSessionPart>>;
pub type LocationSessions = BTreeMap<String, ClassroomSessions>;

/// `functional area -> location -> "Classroom {n}" -> parts`, each list in start order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable {
    areas: BTreeMap<String, LocationSessions>,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = ScheduledSessionPart>,
    {
        let mut timetable = Self::new();
        for part in parts {
            timetable.insert(part);
        }
        timetable
    }

    pub fn insert(&mut self, part: ScheduledSessionPart) {
        let sessions = self
            .areas
            .entry(part.functional_area.clone())
            .or_default()
            .entry(part.location.clone())
            .or_default()
            .entry(part.classroom_key())
            .or_default();
        let idx = sessions.partition_point(|existing| existing.start <= part.start);
        sessions.insert(idx, part);
    }

    pub fn areas(&self) -> &BTreeMap<String, LocationSessions> {
        &self.areas
    }

    pub fn location(&self, area: &str, location: &str) -> Option<&ClassroomSessions> {
        self.areas.get(area).and_then(|locations| locations.get(location))
    }

    pub fn classroom(&self, area: &str, location: &str, classroom: u32) -> &[ScheduledSessionPart] {
        self.location(area, location)
            .and_then(|rooms| rooms.get(&classroom_key(classroom)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn parts(&self) -> impl Iterator<Item = &ScheduledSessionPart> {
        self.areas
            .values()
            .flat_map(|locations| locations.values())
            .flat_map(|rooms| rooms.values())
            .flatten()
    }

    /// Parts in chronological order, ties broken by location then classroom.
    pub fn chronological(&self) -> Vec<&ScheduledSessionPart> {
        let mut parts: Vec<&ScheduledSessionPart> = self.parts().collect();
        parts.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.location.cmp(&b.location))
                .then_with(|| a.classroom.cmp(&b.classroom))
        });
        parts
    }

    /// Parts of one (course, location, group), in part order.
    pub fn session_parts(
        &self,
        course_id: &str,
        location: &str,
        session_group: u32,
    ) -> Vec<&ScheduledSessionPart> {
        let mut parts: Vec<&ScheduledSessionPart> = self
            .parts()
            .filter(|p| {
                p.course_id == course_id && p.location == location && p.session_group == session_group
            })
            .collect();
        parts.sort_by_key(|p| p.part);
        parts
    }

    pub fn rows(&self) -> Vec<SessionRow> {
        self.chronological().into_iter().map(SessionRow::from).collect()
    }

    pub fn len(&self) -> usize {
        self.parts().count()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub session_count: usize,
    pub part_count: usize,
    pub location_count: usize,
    pub classroom_count: usize,
    pub first_start: Option<NaiveDateTime>,
    pub last_end: Option<NaiveDateTime>,
    pub warning_count: usize,
    pub placement_failures: usize,
}

impl ScheduleSummary {
    pub fn from_timetable(timetable: &Timetable, warnings: &[SchedulingWarning]) -> Self {
        let mut sessions = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut classrooms = BTreeSet::new();
        let mut first_start: Option<NaiveDateTime> = None;
        let mut last_end: Option<NaiveDateTime> = None;
        let mut part_count = 0;
        for part in timetable.parts() {
            part_count += 1;
            sessions.insert((&part.course_id, &part.location, part.session_group));
            locations.insert(&part.location);
            classrooms.insert((&part.location, part.classroom));
            first_start = Some(first_start.map_or(part.start, |s| s.min(part.start)));
            last_end = Some(last_end.map_or(part.end, |e| e.max(part.end)));
        }
        Self {
            session_count: sessions.len(),
            part_count,
            location_count: locations.len(),
            classroom_count: classrooms.len(),
            first_start,
            last_end,
            warning_count: warnings.len(),
            placement_failures: warnings.iter().filter(|w| w.is_placement_failure()).count(),
        }
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("sessions={}", self.session_count));
        parts.push(format!("parts={}", self.part_count));
        parts.push(format!("locations={}", self.location_count));
        parts.push(format!("classrooms={}", self.classroom_count));
        if let Some(start) = self.first_start {
            parts.push(format!("first={}", start.format("%Y-%m-%d %H:%M")));
        }
        if let Some(end) = self.last_end {
            parts.push(format!("last={}", end.format("%Y-%m-%d %H:%M")));
        }
        if self.warning_count > 0 {
            parts.push(format!("warnings={}", self.warning_count));
        }
        if self.placement_failures > 0 {
            parts.push(format!("unplaced={}", self.placement_failures));
        }
        parts.join(", ")
    }
}
