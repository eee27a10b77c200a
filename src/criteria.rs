use crate::error::{ConfigurationError, RequestLoadError};
use chrono::{NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_MAX_PLACEMENT_ROUNDS: u32 = 50;

/// Which daily time blocks sessions may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPreference {
    #[default]
    Both,
    MorningOnly,
    AfternoonOnly,
}

impl SchedulingPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingPreference::Both => "both",
            SchedulingPreference::MorningOnly => "morning_only",
            SchedulingPreference::AfternoonOnly => "afternoon_only",
        }
    }

    pub fn uses_morning(&self) -> bool {
        matches!(
            self,
            SchedulingPreference::Both | SchedulingPreference::MorningOnly
        )
    }

    pub fn uses_afternoon(&self) -> bool {
        matches!(
            self,
            SchedulingPreference::Both | SchedulingPreference::AfternoonOnly
        )
    }
}

impl fmt::Display for SchedulingPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulingPreference {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(SchedulingPreference::Both),
            "morning_only" | "morning" | "am" => Ok(SchedulingPreference::MorningOnly),
            "afternoon_only" | "afternoon" | "pm" => Ok(SchedulingPreference::AfternoonOnly),
            other => Err(format!("unknown scheduling preference '{other}'")),
        }
    }
}

/// Global ordering of work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingMode {
    /// A group finishes every course before the next group starts in that classroom.
    #[default]
    GroupComplete,
    /// A course finishes for every group, at every location, before the next course starts.
    CourseComplete,
}

impl SchedulingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingMode::GroupComplete => "group_complete",
            SchedulingMode::CourseComplete => "course_complete",
        }
    }
}

impl fmt::Display for SchedulingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulingMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "group_complete" | "group" => Ok(SchedulingMode::GroupComplete),
            "course_complete" | "course" => Ok(SchedulingMode::CourseComplete),
            other => Err(format!("unknown scheduling mode '{other}'")),
        }
    }
}

/// Read-only configuration for one scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingCriteria {
    pub max_attendees: u32,
    #[serde(default)]
    pub preference: SchedulingPreference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning_start: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning_end: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afternoon_start: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afternoon_end: Option<NaiveTime>,
    /// Multiplier applied to demand when estimating classrooms (1.2 = 20% slack).
    pub contingency: f64,
    /// Capacity-estimation window. Not used by the packing itself.
    pub total_weeks: u32,
    pub days_per_week: u32,
    pub daily_hours: f64,
    pub start_date: NaiveDate,
    pub valid_weekdays: Vec<Weekday>,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
    #[serde(default)]
    pub mode: SchedulingMode,
    /// Fixed classroom counts per location, replacing the capacity estimate.
    #[serde(default)]
    pub classroom_overrides: BTreeMap<String, u32>,
    #[serde(default = "default_max_placement_rounds")]
    pub max_placement_rounds: u32,
}

fn default_max_placement_rounds() -> u32 {
    DEFAULT_MAX_PLACEMENT_ROUNDS
}

fn hm(hour: u32, minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
}

impl Default for SchedulingCriteria {
    fn default() -> Self {
        Self {
            max_attendees: 10,
            preference: SchedulingPreference::Both,
            morning_start: hm(8, 0),
            morning_end: hm(12, 0),
            afternoon_start: hm(13, 0),
            afternoon_end: hm(17, 0),
            contingency: 1.2,
            total_weeks: 4,
            days_per_week: 5,
            daily_hours: 8.0,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap_or_default(),
            valid_weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            holidays: Vec::new(),
            mode: SchedulingMode::GroupComplete,
            classroom_overrides: BTreeMap::new(),
            max_placement_rounds: DEFAULT_MAX_PLACEMENT_ROUNDS,
        }
    }
}

impl SchedulingCriteria {
    pub fn with_max_attendees(mut self, max_attendees: u32) -> Self {
        self.max_attendees = max_attendees;
        self
    }

    pub fn with_preference(mut self, preference: SchedulingPreference) -> Self {
        self.preference = preference;
        self
    }

    pub fn with_mode(mut self, mode: SchedulingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    pub fn with_valid_weekdays<I>(mut self, weekdays: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        self.valid_weekdays = weekdays.into_iter().collect();
        self
    }

    pub fn with_holidays<I>(mut self, holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.holidays = holidays.into_iter().collect();
        self
    }

    pub fn with_morning_block(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.morning_start = Some(start);
        self.morning_end = Some(end);
        self
    }

    pub fn with_afternoon_block(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.afternoon_start = Some(start);
        self.afternoon_end = Some(end);
        self
    }

    pub fn with_contingency(mut self, contingency: f64) -> Self {
        self.contingency = contingency;
        self
    }

    pub fn with_capacity_window(mut self, weeks: u32, days_per_week: u32, daily_hours: f64) -> Self {
        self.total_weeks = weeks;
        self.days_per_week = days_per_week;
        self.daily_hours = daily_hours;
        self
    }

    pub fn with_classrooms(mut self, location: impl Into<String>, classrooms: u32) -> Self {
        self.classroom_overrides.insert(location.into(), classrooms);
        self
    }

    pub fn with_max_placement_rounds(mut self, rounds: u32) -> Self {
        self.max_placement_rounds = rounds;
        self
    }

    pub fn classroom_override(&self, location: &str) -> Option<u32> {
        self.classroom_overrides.get(location).copied()
    }

    /// Hours one classroom offers over the estimation window.
    pub fn available_hours_per_classroom(&self) -> f64 {
        f64::from(self.total_weeks) * f64::from(self.days_per_week) * self.daily_hours
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.valid_weekdays.is_empty() {
            return Err(ConfigurationError::NoValidWeekdays);
        }
        if self.max_attendees == 0 {
            return Err(ConfigurationError::ZeroMaxAttendees);
        }
        if !self.contingency.is_finite() || self.contingency <= 0.0 {
            return Err(ConfigurationError::InvalidContingency(self.contingency));
        }
        let hours = self.available_hours_per_classroom();
        if !hours.is_finite() || hours <= 0.0 {
            return Err(ConfigurationError::InvalidCapacityWindow);
        }

        let morning = if self.preference.uses_morning() {
            Some(self.required_block("morning", self.morning_start, self.morning_end)?)
        } else {
            None
        };
        let afternoon = if self.preference.uses_afternoon() {
            Some(self.required_block("afternoon", self.afternoon_start, self.afternoon_end)?)
        } else {
            None
        };
        if let (Some((_, morning_end)), Some((afternoon_start, _))) = (morning, afternoon) {
            if morning_end > afternoon_start {
                return Err(ConfigurationError::OverlappingTimeBlocks);
            }
        }
        Ok(())
    }

    fn required_block(
        &self,
        block: &'static str,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Result<(NaiveTime, NaiveTime), ConfigurationError> {
        let (start_field, end_field) = match block {
            "morning" => ("morning_start", "morning_end"),
            _ => ("afternoon_start", "afternoon_end"),
        };
        let start = start.ok_or(ConfigurationError::MissingTimeBlock {
            preference: self.preference,
            field: start_field,
        })?;
        let end = end.ok_or(ConfigurationError::MissingTimeBlock {
            preference: self.preference,
            field: end_field,
        })?;
        whole_minute(start_field, start)?;
        whole_minute(end_field, end)?;
        if start >= end {
            return Err(ConfigurationError::InvalidTimeBlock { block, start, end });
        }
        Ok((start, end))
    }

    pub fn from_json_str(json: &str) -> Result<Self, RequestLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, RequestLoadError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// Block boundaries are whole minutes so part durations are never truncated.
pub(crate) fn whole_minute(field: &'static str, time: NaiveTime) -> Result<(), ConfigurationError> {
    if time.second() != 0 || time.nanosecond() != 0 {
        return Err(ConfigurationError::SubMinuteTimeBlock { field, time });
    }
    Ok(())
}
