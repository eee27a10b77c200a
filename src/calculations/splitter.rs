use crate::calendar::{BlockKind, TimeBlockModel};
use crate::error::SplitError;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Sessions may not stretch further than this from their first day.
pub const MAX_SESSION_SPAN_DAYS: i64 = 366;

/// One contiguous piece of a session, inside a single time block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPartPlan {
    pub part: u32,
    pub total_parts: u32,
    pub day: u32,
    pub total_days: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
    pub block: BlockKind,
}

impl SessionPartPlan {
    pub fn interval(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.start, self.end)
    }
}

/// Decomposes a duration into block-sized parts, filling each block greedily
/// and rolling over to the next block or valid day.
#[derive(Debug, Clone, Copy)]
pub struct SessionSplitter<'a> {
    model: &'a TimeBlockModel,
}

impl<'a> SessionSplitter<'a> {
    pub fn new(model: &'a TimeBlockModel) -> Self {
        Self { model }
    }

    pub fn split_hours(
        &self,
        duration_hours: f64,
        start: NaiveDateTime,
    ) -> Result<Vec<SessionPartPlan>, SplitError> {
        self.split((duration_hours * 60.0).round() as i64, start)
    }

    pub fn split(
        &self,
        duration_minutes: i64,
        start: NaiveDateTime,
    ) -> Result<Vec<SessionPartPlan>, SplitError> {
        if duration_minutes <= 0 {
            return Err(SplitError::NonPositiveDuration(duration_minutes));
        }
        let (mut cursor, mut block) = self.model.snap_forward(start)?;
        let first_day = cursor.date();
        let mut remaining = duration_minutes;
        let mut pieces: Vec<(NaiveDateTime, NaiveDateTime, i64, BlockKind)> = Vec::new();

        loop {
            let block_end = block.ends_at(cursor.date());
            let taken = remaining.min((block_end - cursor).num_minutes());
            if taken > 0 {
                let end = cursor + Duration::minutes(taken);
                pieces.push((cursor, end, taken, block.kind));
                remaining -= taken;
                if remaining <= 0 {
                    break;
                }
            }
            let (next, next_block) = self.model.snap_forward(block_end)?;
            if (next.date() - first_day).num_days() > MAX_SESSION_SPAN_DAYS {
                return Err(SplitError::SpanExceeded {
                    start,
                    days: MAX_SESSION_SPAN_DAYS,
                });
            }
            cursor = next;
            block = next_block;
        }

        Ok(label(pieces))
    }
}

fn label(pieces: Vec<(NaiveDateTime, NaiveDateTime, i64, BlockKind)>) -> Vec<SessionPartPlan> {
    let total_parts = pieces.len() as u32;
    let mut days: Vec<NaiveDate> = pieces.iter().map(|(start, ..)| start.date()).collect();
    days.dedup();
    let total_days = days.len() as u32;

    pieces
        .into_iter()
        .enumerate()
        .map(|(idx, (start, end, duration_minutes, block))| {
            let day = days
                .iter()
                .position(|date| *date == start.date())
                .map_or(1, |pos| pos as u32 + 1);
            SessionPartPlan {
                part: idx as u32 + 1,
                total_parts,
                day,
                total_days,
                start,
                end,
                duration_minutes,
                block,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SchedulingCriteria;

    #[test]
    fn label_numbers_days_by_distinct_date() {
        let model = TimeBlockModel::from_criteria(&SchedulingCriteria::default()).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let start = monday.and_hms_opt(8, 0, 0).unwrap();
        let parts = SessionSplitter::new(&model).split(10 * 60, start).unwrap();
        let labels: Vec<(u32, u32, u32)> =
            parts.iter().map(|p| (p.part, p.day, p.total_days)).collect();
        assert_eq!(labels, vec![(1, 1, 2), (2, 1, 2), (3, 2, 2)]);
    }
}
