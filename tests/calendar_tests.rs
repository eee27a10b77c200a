use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use training_scheduler::calendar::{next_valid_date, MAX_DAY_SEARCH};
use training_scheduler::error::CalendarError;
use training_scheduler::{
    BlockKind, ConfigurationError, SchedulingCriteria, SchedulingPreference, TimeBlockModel,
    TrainingCalendar,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_hms_opt(h, m, 0).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn both_preference_yields_morning_then_afternoon() {
    let model = TimeBlockModel::from_criteria(&SchedulingCriteria::default()).unwrap();
    let blocks = model.time_blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].kind, BlockKind::Morning);
    assert_eq!(blocks[0].start_hours(), 8.0);
    assert_eq!(blocks[0].end_hours(), 12.0);
    assert_eq!(blocks[0].duration_hours(), 4.0);
    assert_eq!(blocks[1].name(), "Afternoon");
    assert_eq!(blocks[1].start_hours(), 13.0);
    assert_eq!(model.daily_capacity_minutes(), 8 * 60);
}

#[test]
fn single_preference_yields_one_block() {
    let criteria = SchedulingCriteria::default().with_preference(SchedulingPreference::AfternoonOnly);
    let model = TimeBlockModel::from_criteria(&criteria).unwrap();
    assert_eq!(model.time_blocks().len(), 1);
    assert_eq!(model.time_blocks()[0].kind, BlockKind::Afternoon);
    assert!(model.block(BlockKind::Morning).is_none());
}

#[test]
fn morning_only_without_afternoon_times_is_valid() {
    let mut criteria = SchedulingCriteria::default().with_preference(SchedulingPreference::MorningOnly);
    criteria.afternoon_start = None;
    criteria.afternoon_end = None;
    assert!(TimeBlockModel::from_criteria(&criteria).is_ok());
}

#[test]
fn missing_block_field_is_a_configuration_error() {
    let mut criteria = SchedulingCriteria::default();
    criteria.morning_end = None;
    match TimeBlockModel::from_criteria(&criteria) {
        Err(ConfigurationError::MissingTimeBlock { field, .. }) => assert_eq!(field, "morning_end"),
        other => panic!("expected MissingTimeBlock, got {:?}", other),
    }
}

#[test]
fn inverted_block_is_rejected() {
    let criteria = SchedulingCriteria::default().with_morning_block(t(12, 0), t(8, 0));
    assert!(matches!(
        TimeBlockModel::from_criteria(&criteria),
        Err(ConfigurationError::InvalidTimeBlock { block: "morning", .. })
    ));
}

#[test]
fn next_valid_date_returns_same_day_when_valid() {
    let weekdays = [Weekday::Mon, Weekday::Wed];
    assert_eq!(next_valid_date(d(2025, 1, 6), &weekdays).unwrap(), d(2025, 1, 6));
    // Tuesday rolls to Wednesday
    assert_eq!(next_valid_date(d(2025, 1, 7), &weekdays).unwrap(), d(2025, 1, 8));
    // Thursday rolls to next Monday
    let next = next_valid_date(d(2025, 1, 9), &weekdays).unwrap();
    assert_eq!(next.weekday(), Weekday::Mon);
    assert_eq!(next, d(2025, 1, 13));
}

#[test]
fn next_valid_date_fails_without_weekdays() {
    assert_eq!(
        next_valid_date(d(2025, 1, 6), &[]),
        Err(CalendarError::NoValidWeekdays)
    );
}

#[test]
fn holidays_are_skipped() {
    let calendar = TrainingCalendar::new(
        [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
        [d(2025, 1, 6), d(2025, 1, 7)],
    )
    .unwrap();
    assert!(calendar.is_holiday(d(2025, 1, 6)));
    assert!(!calendar.is_available(d(2025, 1, 6)));
    assert_eq!(calendar.next_available_on_or_after(d(2025, 1, 6)).unwrap(), d(2025, 1, 8));
    assert_eq!(calendar.next_available(d(2025, 1, 3)).unwrap(), d(2025, 1, 8));
}

#[test]
fn calendar_search_is_bounded() {
    // A single weekday that is blacked out for longer than the search window.
    let holidays = (0..=MAX_DAY_SEARCH / 7 + 1).map(|w| d(2025, 1, 6) + chrono::Duration::weeks(w));
    let calendar = TrainingCalendar::new([Weekday::Mon], holidays).unwrap();
    assert!(matches!(
        calendar.next_available_on_or_after(d(2025, 1, 6)),
        Err(CalendarError::SearchExhausted { .. })
    ));
}

#[test]
fn set_date_to_block_start_uses_block_clock_time() {
    let model = TimeBlockModel::from_criteria(&SchedulingCriteria::default()).unwrap();
    assert_eq!(
        model.set_date_to_block_start(d(2025, 1, 8), BlockKind::Afternoon),
        Some(at(d(2025, 1, 8), 13, 0))
    );
}

#[test]
fn snap_forward_moves_through_gaps_and_weekends() {
    let model = TimeBlockModel::from_criteria(&SchedulingCriteria::default()).unwrap();
    let friday = d(2025, 1, 10);

    let (inside, block) = model.snap_forward(at(friday, 9, 30)).unwrap();
    assert_eq!(inside, at(friday, 9, 30));
    assert_eq!(block.kind, BlockKind::Morning);

    let (lunch, block) = model.snap_forward(at(friday, 12, 0)).unwrap();
    assert_eq!(lunch, at(friday, 13, 0));
    assert_eq!(block.kind, BlockKind::Afternoon);

    let (early, _) = model.snap_forward(at(friday, 6, 0)).unwrap();
    assert_eq!(early, at(friday, 8, 0));

    let (evening, block) = model.snap_forward(at(friday, 17, 0)).unwrap();
    assert_eq!(evening, at(d(2025, 1, 13), 8, 0));
    assert_eq!(block.kind, BlockKind::Morning);
}

#[test]
fn next_day_start_skips_to_following_valid_day() {
    let model = TimeBlockModel::from_criteria(&SchedulingCriteria::default()).unwrap();
    assert_eq!(
        model.next_day_start(at(d(2025, 1, 6), 10, 0)).unwrap(),
        at(d(2025, 1, 7), 8, 0)
    );
    assert_eq!(
        model.next_day_start(at(d(2025, 1, 10), 14, 0)).unwrap(),
        at(d(2025, 1, 13), 8, 0)
    );
}

#[test]
fn block_containing_requires_valid_day_and_single_block() {
    let model = TimeBlockModel::from_criteria(&SchedulingCriteria::default()).unwrap();
    let monday = d(2025, 1, 6);
    assert!(model.block_containing(at(monday, 8, 0), at(monday, 12, 0)).is_some());
    assert!(model.block_containing(at(monday, 11, 0), at(monday, 14, 0)).is_none());
    let saturday = d(2025, 1, 11);
    assert!(model.block_containing(at(saturday, 8, 0), at(saturday, 9, 0)).is_none());
}
