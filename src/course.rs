use serde::{Deserialize, Serialize};

/// Functional area used for courses that carry no category tag.
pub const DEFAULT_FUNCTIONAL_AREA: &str = "General";

/// A course to deliver. Lower `priority` is scheduled first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    /// Total duration in hours. Fractional values are allowed (e.g. 2.5).
    pub duration_hours: f64,
    #[serde(default)]
    pub priority: i32,
    /// Application or category tag; becomes the timetable's functional area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Course {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration_hours: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_hours,
            priority: 0,
            category: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Duration rounded to whole minutes, the unit the engine schedules in.
    pub fn duration_minutes(&self) -> i64 {
        (self.duration_hours * 60.0).round() as i64
    }

    pub fn functional_area(&self) -> &str {
        self.category
            .as_deref()
            .filter(|area| !area.trim().is_empty())
            .unwrap_or(DEFAULT_FUNCTIONAL_AREA)
    }
}

/// Courses sorted by `(priority, id)`.
pub fn priority_order(courses: &[Course]) -> Vec<&Course> {
    let mut ordered: Vec<&Course> = courses.iter().collect();
    ordered.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
    ordered
}

/// A person who must attend `courses` at `location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainee {
    pub id: String,
    pub location: String,
    #[serde(default)]
    pub courses: Vec<String>,
}

impl Trainee {
    pub fn new<I, S>(id: impl Into<String>, location: impl Into<String>, courses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            location: location.into(),
            courses: courses.into_iter().map(Into::into).collect(),
        }
    }

    pub fn needs(&self, course_id: &str) -> bool {
        self.courses.iter().any(|id| id == course_id)
    }
}
