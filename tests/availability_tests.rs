use chrono::{NaiveDate, NaiveDateTime};
use training_scheduler::availability::intervals_overlap;
use training_scheduler::ClassroomAvailabilityTracker;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    d(2025, 1, 6).and_hms_opt(h, m, 0).unwrap()
}

#[test]
fn touching_intervals_do_not_overlap() {
    assert!(!intervals_overlap(at(8, 0), at(10, 0), at(10, 0), at(12, 0)));
    assert!(intervals_overlap(at(8, 0), at(10, 0), at(9, 59), at(12, 0)));
    assert!(intervals_overlap(at(8, 0), at(12, 0), at(9, 0), at(10, 0)));
}

#[test]
fn reserve_assigns_lowest_free_classroom() {
    let mut tracker = ClassroomAvailabilityTracker::new();
    assert_eq!(tracker.reserve("HQ", at(8, 0), at(10, 0), "a", 3), Some(1));
    assert_eq!(tracker.reserve("HQ", at(9, 0), at(11, 0), "b", 3), Some(2));
    // Room 1 frees up at 10:00
    assert_eq!(tracker.reserve("HQ", at(10, 0), at(12, 0), "c", 3), Some(1));
    assert_eq!(tracker.reserve("HQ", at(9, 30), at(9, 45), "d", 3), Some(3));
    assert_eq!(tracker.reserve("HQ", at(9, 30), at(9, 45), "e", 3), None);
}

#[test]
fn availability_respects_classroom_limit() {
    let mut tracker = ClassroomAvailabilityTracker::new();
    assert!(tracker.is_available("HQ", at(8, 0), at(10, 0), 1));
    assert!(!tracker.is_available("HQ", at(8, 0), at(10, 0), 0));
    tracker.reserve("HQ", at(8, 0), at(10, 0), "a", 1);
    assert!(!tracker.is_available("HQ", at(9, 0), at(9, 30), 1));
    assert!(tracker.is_available("HQ", at(9, 0), at(9, 30), 2));
    assert!(tracker.is_available("HQ", at(10, 0), at(11, 0), 1));
}

#[test]
fn locations_are_tracked_independently() {
    let mut tracker = ClassroomAvailabilityTracker::new();
    assert_eq!(tracker.reserve("HQ", at(8, 0), at(10, 0), "a", 1), Some(1));
    assert_eq!(tracker.reserve("Branch", at(8, 0), at(10, 0), "b", 1), Some(1));
    assert!(!tracker.is_available("HQ", at(8, 0), at(10, 0), 1));
}

#[test]
fn reserve_classroom_refuses_overlap() {
    let mut tracker = ClassroomAvailabilityTracker::new();
    tracker.reserve_classroom("HQ", 2, at(8, 0), at(10, 0), "a").unwrap();
    let conflict = tracker
        .reserve_classroom("HQ", 2, at(9, 0), at(11, 0), "b")
        .unwrap_err();
    assert_eq!(conflict.classroom, 2);
    assert_eq!(conflict.existing, "a");
    assert!(tracker.reserve_classroom("HQ", 1, at(9, 0), at(11, 0), "b").is_ok());
}

#[test]
fn utilization_summary_counts_reservations() {
    let mut tracker = ClassroomAvailabilityTracker::new();
    tracker.reserve("HQ", at(8, 0), at(10, 0), "a", 2);
    tracker.reserve("HQ", at(8, 0), at(9, 0), "b", 2);
    tracker.reserve("Branch", at(13, 0), at(17, 0), "c", 2);

    let all = tracker.utilization_summary(None);
    assert_eq!(all.locations, 2);
    assert_eq!(all.reservations, 3);
    assert_eq!(all.classrooms_used, 3);
    assert_eq!(all.booked_minutes, 120 + 60 + 240);

    let hq = tracker.utilization_summary(Some("HQ"));
    assert_eq!(hq.locations, 1);
    assert_eq!(hq.reservations, 2);

    let ledger = tracker.ledger("HQ").unwrap();
    assert_eq!(ledger.reservations(1)[0].session_id, "a");
    assert_eq!(ledger.ends_on(d(2025, 1, 6)), vec![at(9, 0), at(10, 0)]);
}
