use crate::criteria::{SchedulingCriteria, whole_minute};
use crate::error::{CalendarError, ConfigurationError};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Upper bound on how far ahead date searches look.
pub const MAX_DAY_SEARCH: i64 = 732;

/// Days on which training can take place: a weekday set minus holidays.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingCalendar {
    working_days: HashSet<Weekday>,
    holidays: HashSet<NaiveDate>,
}

impl TrainingCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn new<I, J>(working_days: I, holidays: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let working_days: HashSet<Weekday> = working_days.into_iter().collect();
        if working_days.is_empty() {
            return Err(CalendarError::NoValidWeekdays);
        }
        Ok(Self {
            working_days,
            holidays: holidays.into_iter().collect(),
        })
    }

    /// Working days in Monday-first order.
    pub fn working_days(&self) -> Vec<Weekday> {
        Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| self.working_days.contains(day))
            .collect()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_available(&self, date: NaiveDate) -> bool {
        self.working_days.contains(&date.weekday()) && !self.holidays.contains(&date)
    }

    /// Earliest available date on or after `from`.
    pub fn next_available_on_or_after(&self, from: NaiveDate) -> Result<NaiveDate, CalendarError> {
        let mut current = from;
        for _ in 0..=MAX_DAY_SEARCH {
            if self.is_available(current) {
                return Ok(current);
            }
            current += Duration::days(1);
        }
        Err(CalendarError::SearchExhausted {
            from,
            days: MAX_DAY_SEARCH,
        })
    }

    /// Earliest available date strictly after `from`.
    pub fn next_available(&self, from: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.next_available_on_or_after(from + Duration::days(1))
    }
}

/// Earliest date on or after `date` whose weekday is in `valid_weekdays`.
pub fn next_valid_date(
    date: NaiveDate,
    valid_weekdays: &[Weekday],
) -> Result<NaiveDate, CalendarError> {
    TrainingCalendar::new(valid_weekdays.iter().copied(), [])?.next_available_on_or_after(date)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Morning,
    Afternoon,
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Morning => "Morning",
            BlockKind::Afternoon => "Afternoon",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recurring daily window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub kind: BlockKind,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

fn clock_hours(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) / 3600.0
}

impl TimeBlock {
    pub fn new(kind: BlockKind, start: NaiveTime, end: NaiveTime) -> Self {
        Self { kind, start, end }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn start_hours(&self) -> f64 {
        clock_hours(self.start)
    }

    pub fn end_hours(&self) -> f64 {
        clock_hours(self.end)
    }

    pub fn duration_hours(&self) -> f64 {
        self.end_hours() - self.start_hours()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn starts_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start)
    }

    pub fn ends_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.end)
    }

    /// Whether `[start, end)` on a single calendar day lies inside this block.
    pub fn contains(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start.date() == end.date() && start.time() >= self.start && end.time() <= self.end
    }
}

/// The daily time blocks plus the calendar of valid days.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBlockModel {
    blocks: Vec<TimeBlock>,
    calendar: TrainingCalendar,
}

impl TimeBlockModel {
    pub fn new(
        mut blocks: Vec<TimeBlock>,
        calendar: TrainingCalendar,
    ) -> Result<Self, ConfigurationError> {
        blocks.sort_by_key(|block| block.start);
        for block in &blocks {
            whole_minute(block.name(), block.start)?;
            whole_minute(block.name(), block.end)?;
            if block.start >= block.end {
                return Err(ConfigurationError::InvalidTimeBlock {
                    block: block.name(),
                    start: block.start,
                    end: block.end,
                });
            }
        }
        if blocks.windows(2).any(|pair| pair[0].end > pair[1].start) {
            return Err(ConfigurationError::OverlappingTimeBlocks);
        }
        if blocks.is_empty() {
            return Err(ConfigurationError::NoTimeBlocks);
        }
        Ok(Self { blocks, calendar })
    }

    pub fn from_criteria(criteria: &SchedulingCriteria) -> Result<Self, ConfigurationError> {
        criteria.validate()?;
        let mut blocks = Vec::with_capacity(2);
        if criteria.preference.uses_morning() {
            if let (Some(start), Some(end)) = (criteria.morning_start, criteria.morning_end) {
                blocks.push(TimeBlock::new(BlockKind::Morning, start, end));
            }
        }
        if criteria.preference.uses_afternoon() {
            if let (Some(start), Some(end)) = (criteria.afternoon_start, criteria.afternoon_end) {
                blocks.push(TimeBlock::new(BlockKind::Afternoon, start, end));
            }
        }
        let calendar = TrainingCalendar::new(
            criteria.valid_weekdays.iter().copied(),
            criteria.holidays.iter().copied(),
        )
        .map_err(CalendarError::into_configuration)?;
        Self::new(blocks, calendar)
    }

    /// Blocks in clock order.
    pub fn time_blocks(&self) -> &[TimeBlock] {
        &self.blocks
    }

    pub fn block(&self, kind: BlockKind) -> Option<&TimeBlock> {
        self.blocks.iter().find(|block| block.kind == kind)
    }

    pub fn calendar(&self) -> &TrainingCalendar {
        &self.calendar
    }

    pub fn daily_capacity_minutes(&self) -> i64 {
        self.blocks.iter().map(TimeBlock::duration_minutes).sum()
    }

    pub fn is_valid_date(&self, date: NaiveDate) -> bool {
        self.calendar.is_available(date)
    }

    pub fn next_valid_date(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        self.calendar.next_available_on_or_after(date)
    }

    /// `date` at the start clock-time of block `kind`, or `None` if that block
    /// is not configured.
    pub fn set_date_to_block_start(&self, date: NaiveDate, kind: BlockKind) -> Option<NaiveDateTime> {
        self.block(kind).map(|block| block.starts_at(date))
    }

    fn first_block(&self) -> &TimeBlock {
        &self.blocks[0]
    }

    /// Start of the first block on the first valid date on or after `date`.
    pub fn first_slot_on_or_after(&self, date: NaiveDate) -> Result<NaiveDateTime, CalendarError> {
        let date = self.next_valid_date(date)?;
        Ok(self.first_block().starts_at(date))
    }

    /// Start of the first block on the first valid date strictly after `at`'s day.
    pub fn next_day_start(&self, at: NaiveDateTime) -> Result<NaiveDateTime, CalendarError> {
        let date = self.calendar.next_available(at.date())?;
        Ok(self.first_block().starts_at(date))
    }

    /// Earliest instant at or after `at` that lies inside a block with time
    /// left in it, together with that block.
    pub fn snap_forward(&self, at: NaiveDateTime) -> Result<(NaiveDateTime, &TimeBlock), CalendarError> {
        let date = at.date();
        if self.calendar.is_available(date) {
            for block in &self.blocks {
                let start = block.starts_at(date);
                if at < block.ends_at(date) {
                    return Ok((at.max(start), block));
                }
            }
        }
        let next = self.calendar.next_available(date)?;
        let block = self.first_block();
        Ok((block.starts_at(next), block))
    }

    /// Block starts on `date` at or after `from`, in clock order. Empty when
    /// `date` is not a valid day.
    pub fn block_starts_on(&self, date: NaiveDate, from: NaiveDateTime) -> Vec<NaiveDateTime> {
        if !self.calendar.is_available(date) {
            return Vec::new();
        }
        self.blocks
            .iter()
            .map(|block| block.starts_at(date))
            .filter(|start| *start >= from)
            .collect()
    }

    /// The block containing `[start, end)` on a valid day, if any.
    pub fn block_containing(&self, start: NaiveDateTime, end: NaiveDateTime) -> Option<&TimeBlock> {
        if start >= end || !self.calendar.is_available(start.date()) {
            return None;
        }
        self.blocks.iter().find(|block| block.contains(start, end))
    }
}
