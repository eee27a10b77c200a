use crate::error::ReservationConflict;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Half-open overlap test: `[a_start, a_end)` and `[b_start, b_end)`.
pub fn intervals_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomReservation {
    pub location: String,
    pub classroom: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub session_id: String,
}

impl ClassroomReservation {
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        intervals_overlap(self.start, self.end, start, end)
    }
}

/// Reservations for the numbered classrooms of one location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationLedger {
    location: String,
    rooms: BTreeMap<u32, Vec<ClassroomReservation>>,
}

impl LocationLedger {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            rooms: BTreeMap::new(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn conflict_in(
        &self,
        classroom: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<&ClassroomReservation> {
        self.rooms
            .get(&classroom)
            .and_then(|booked| booked.iter().find(|r| r.overlaps(start, end)))
    }

    pub fn is_classroom_free(&self, classroom: u32, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.conflict_in(classroom, start, end).is_none()
    }

    pub fn is_available(&self, start: NaiveDateTime, end: NaiveDateTime, max_classrooms: u32) -> bool {
        self.free_classroom(&[(start, end)], max_classrooms).is_some()
    }

    /// Lowest-numbered classroom in `1..=max_classrooms` free for every interval.
    pub fn free_classroom(
        &self,
        intervals: &[(NaiveDateTime, NaiveDateTime)],
        max_classrooms: u32,
    ) -> Option<u32> {
        (1..=max_classrooms).find(|&room| {
            intervals
                .iter()
                .all(|&(start, end)| self.is_classroom_free(room, start, end))
        })
    }

    /// Books the lowest-numbered free classroom. `None` when all are taken.
    pub fn reserve(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        session_id: &str,
        max_classrooms: u32,
    ) -> Option<u32> {
        let room = self.free_classroom(&[(start, end)], max_classrooms)?;
        self.push(room, start, end, session_id);
        Some(room)
    }

    /// Books one specific classroom, refusing on overlap.
    pub fn reserve_classroom(
        &mut self,
        classroom: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
        session_id: &str,
    ) -> Result<(), ReservationConflict> {
        if let Some(existing) = self.conflict_in(classroom, start, end) {
            return Err(ReservationConflict {
                location: self.location.clone(),
                classroom,
                start,
                end,
                existing: existing.session_id.clone(),
            });
        }
        self.push(classroom, start, end, session_id);
        Ok(())
    }

    fn push(&mut self, classroom: u32, start: NaiveDateTime, end: NaiveDateTime, session_id: &str) {
        let reservation = ClassroomReservation {
            location: self.location.clone(),
            classroom,
            start,
            end,
            session_id: session_id.to_string(),
        };
        let booked = self.rooms.entry(classroom).or_default();
        let idx = booked.partition_point(|r| r.start <= start);
        booked.insert(idx, reservation);
    }

    pub fn reservations(&self, classroom: u32) -> &[ClassroomReservation] {
        self.rooms.get(&classroom).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn reservation_count(&self) -> usize {
        self.rooms.values().map(Vec::len).sum()
    }

    pub fn classrooms_used(&self) -> usize {
        self.rooms.values().filter(|booked| !booked.is_empty()).count()
    }

    pub fn booked_minutes(&self) -> i64 {
        self.rooms
            .values()
            .flatten()
            .map(|r| (r.end - r.start).num_minutes())
            .sum()
    }

    /// Reservation end times falling on `date`, ascending and deduplicated.
    pub fn ends_on(&self, date: NaiveDate) -> Vec<NaiveDateTime> {
        let mut ends: Vec<NaiveDateTime> = self
            .rooms
            .values()
            .flatten()
            .map(|r| r.end)
            .filter(|end| end.date() == date)
            .collect();
        ends.sort_unstable();
        ends.dedup();
        ends
    }
}

/// Diagnostic counts for warnings and reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilizationSummary {
    pub locations: usize,
    pub classrooms_used: usize,
    pub reservations: usize,
    pub booked_minutes: i64,
}

/// Classroom bookings for every location, partitioned into one ledger per
/// location so that locations can be worked on independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassroomAvailabilityTracker {
    ledgers: BTreeMap<String, LocationLedger>,
}

impl ClassroomAvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self, location: &str) -> Option<&LocationLedger> {
        self.ledgers.get(location)
    }

    pub fn ledger_mut(&mut self, location: &str) -> &mut LocationLedger {
        self.ledgers
            .entry(location.to_string())
            .or_insert_with(|| LocationLedger::new(location))
    }

    pub(crate) fn ledgers_mut(&mut self) -> &mut BTreeMap<String, LocationLedger> {
        &mut self.ledgers
    }

    pub fn is_available(
        &self,
        location: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        max_classrooms: u32,
    ) -> bool {
        match self.ledgers.get(location) {
            Some(ledger) => ledger.is_available(start, end, max_classrooms),
            None => max_classrooms > 0,
        }
    }

    pub fn reserve(
        &mut self,
        location: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        session_id: &str,
        max_classrooms: u32,
    ) -> Option<u32> {
        self.ledger_mut(location)
            .reserve(start, end, session_id, max_classrooms)
    }

    pub fn reserve_classroom(
        &mut self,
        location: &str,
        classroom: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
        session_id: &str,
    ) -> Result<(), ReservationConflict> {
        self.ledger_mut(location)
            .reserve_classroom(classroom, start, end, session_id)
    }

    pub fn utilization_summary(&self, location: Option<&str>) -> UtilizationSummary {
        self.ledgers
            .values()
            .filter(|ledger| location.is_none_or(|wanted| ledger.location() == wanted))
            .fold(UtilizationSummary::default(), |mut acc, ledger| {
                acc.locations += 1;
                acc.classrooms_used += ledger.classrooms_used();
                acc.reservations += ledger.reservation_count();
                acc.booked_minutes += ledger.booked_minutes();
                acc
            })
    }
}
