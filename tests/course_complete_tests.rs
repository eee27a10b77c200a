use chrono::{NaiveDate, NaiveDateTime};
use training_scheduler::calculations::grouping::build_demand;
use training_scheduler::calculations::{SchedulingPlan, StrategyOutcome};
use training_scheduler::course::priority_order;
use training_scheduler::{
    ClassroomAvailabilityTracker, Course, CourseCompleteScheduler, ScheduledSessionPart,
    SchedulingCriteria, SchedulingMode, SchedulingStrategy, TimeBlockModel, Trainee,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_hms_opt(h, m, 0).unwrap()
}

fn trainees_at(location: &str, count: usize, courses: &[&str]) -> Vec<Trainee> {
    (1..=count)
        .map(|i| Trainee::new(format!("{location}-{i}"), location, courses.iter().copied()))
        .collect()
}

fn run_with_rounds(
    courses: &[Course],
    trainees: &[Trainee],
    classrooms: &[(&str, u32)],
    max_placement_rounds: u32,
) -> StrategyOutcome {
    let criteria = SchedulingCriteria::default().with_mode(SchedulingMode::CourseComplete);
    let model = TimeBlockModel::from_criteria(&criteria).unwrap();
    let (demand, _) = build_demand(trainees, courses, criteria.max_attendees);
    let plan = SchedulingPlan {
        model: &model,
        courses: priority_order(courses),
        demand: &demand,
        classrooms: classrooms
            .iter()
            .map(|(location, n)| (location.to_string(), *n))
            .collect(),
        opening: at(d(2025, 1, 6), 8, 0),
        max_placement_rounds,
    };
    let mut tracker = ClassroomAvailabilityTracker::new();
    CourseCompleteScheduler::new()
        .schedule(&plan, &mut tracker)
        .unwrap()
}

fn run(courses: &[Course], trainees: &[Trainee], classrooms: &[(&str, u32)]) -> StrategyOutcome {
    run_with_rounds(courses, trainees, classrooms, 50)
}

fn parts_of<'a>(
    outcome: &'a StrategyOutcome,
    location: &str,
    course: &str,
    group: u32,
) -> Vec<&'a ScheduledSessionPart> {
    outcome
        .parts
        .iter()
        .filter(|p| p.location == location && p.course_id == course && p.session_group == group)
        .collect()
}

#[test]
fn reports_its_mode() {
    assert_eq!(CourseCompleteScheduler::new().mode(), SchedulingMode::CourseComplete);
}

#[test]
fn overflow_group_takes_next_free_slot_same_day() {
    let courses = vec![Course::new("c1", "Intro", 2.0)];
    let trainees = trainees_at("HQ", 15, &["c1"]);
    let outcome = run(&courses, &trainees, &[("HQ", 1)]);
    let monday = d(2025, 1, 6);

    assert_eq!(parts_of(&outcome, "HQ", "c1", 1)[0].interval(), (at(monday, 8, 0), at(monday, 10, 0)));
    assert_eq!(parts_of(&outcome, "HQ", "c1", 2)[0].interval(), (at(monday, 10, 0), at(monday, 12, 0)));
    assert!(outcome.warnings.is_empty());
}

#[test]
fn groups_share_the_slot_when_classrooms_allow() {
    let courses = vec![Course::new("c1", "Intro", 3.0)];
    let trainees = trainees_at("HQ", 25, &["c1"]);
    let outcome = run(&courses, &trainees, &[("HQ", 3)]);
    let monday = d(2025, 1, 6);

    for group in 1..=3 {
        let parts = parts_of(&outcome, "HQ", "c1", group);
        assert_eq!(parts[0].start, at(monday, 8, 0));
        assert_eq!(parts[0].classroom, group);
    }
}

#[test]
fn next_course_starts_on_day_after_previous_course_finished_everywhere() {
    let courses = vec![
        Course::new("c1", "First", 2.0).with_priority(0),
        Course::new("c2", "Second", 1.0).with_priority(1),
    ];
    let mut trainees = trainees_at("HQ", 15, &["c1", "c2"]);
    trainees.extend(trainees_at("Branch", 5, &["c1", "c2"]));
    let outcome = run(&courses, &trainees, &[("HQ", 1), ("Branch", 1)]);
    let monday = d(2025, 1, 6);
    let tuesday = d(2025, 1, 7);

    // HQ needs until 12:00 Monday for c1; Branch finishes at 10:00 but still waits.
    assert_eq!(parts_of(&outcome, "Branch", "c1", 1)[0].end, at(monday, 10, 0));
    assert_eq!(parts_of(&outcome, "HQ", "c1", 2)[0].end, at(monday, 12, 0));
    assert_eq!(parts_of(&outcome, "Branch", "c2", 1)[0].start, at(tuesday, 8, 0));
    assert_eq!(parts_of(&outcome, "HQ", "c2", 1)[0].start, at(tuesday, 8, 0));
    assert_eq!(parts_of(&outcome, "HQ", "c2", 2)[0].start, at(tuesday, 9, 0));

    let last_c1 = outcome
        .parts
        .iter()
        .filter(|p| p.course_id == "c1")
        .map(|p| p.end)
        .max()
        .unwrap();
    let first_c2 = outcome
        .parts
        .iter()
        .filter(|p| p.course_id == "c2")
        .map(|p| p.start)
        .min()
        .unwrap();
    assert!(last_c1 <= first_c2);
}

#[test]
fn blocked_groups_roll_to_next_valid_day() {
    let courses = vec![Course::new("c1", "Half day", 4.0)];
    let trainees = trainees_at("HQ", 30, &["c1"]);
    let outcome = run(&courses, &trainees, &[("HQ", 1)]);

    assert_eq!(parts_of(&outcome, "HQ", "c1", 1)[0].start, at(d(2025, 1, 6), 8, 0));
    assert_eq!(parts_of(&outcome, "HQ", "c1", 2)[0].start, at(d(2025, 1, 6), 13, 0));
    assert_eq!(parts_of(&outcome, "HQ", "c1", 3)[0].start, at(d(2025, 1, 7), 8, 0));
    assert!(outcome.warnings.is_empty());
}

#[test]
fn round_cap_reports_unplaced_groups() {
    let courses = vec![Course::new("c1", "Half day", 4.0)];
    let trainees = trainees_at("HQ", 30, &["c1"]);
    let outcome = run_with_rounds(&courses, &trainees, &[("HQ", 1)], 1);

    assert_eq!(parts_of(&outcome, "HQ", "c1", 1).len(), 1);
    assert_eq!(parts_of(&outcome, "HQ", "c1", 2).len(), 1);
    assert!(parts_of(&outcome, "HQ", "c1", 3).is_empty());
    assert_eq!(outcome.warnings.len(), 1);
    let warning = &outcome.warnings[0];
    assert!(warning.is_placement_failure());
    assert_eq!(warning.course.as_deref(), Some("c1"));
    assert!(warning.message.contains("session group 3"));
    assert!(warning.message.contains("1 placement rounds"));
}

#[test]
fn multi_part_sessions_need_the_same_classroom_throughout() {
    let courses = vec![Course::new("c1", "Day and a half", 12.0)];
    let trainees = trainees_at("HQ", 20, &["c1"]);
    let outcome = run(&courses, &trainees, &[("HQ", 2)]);

    for group in 1..=2 {
        let parts = parts_of(&outcome, "HQ", "c1", group);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.classroom == group));
        assert_eq!(parts[2].title, format!("Day and a half - Session {group} (Day 2 of 2)"));
    }
}

#[test]
fn location_without_classrooms_is_reported_once() {
    let courses = vec![Course::new("c1", "First", 2.0), Course::new("c2", "Second", 1.0)];
    let mut trainees = trainees_at("HQ", 3, &["c1", "c2"]);
    trainees.extend(trainees_at("Remote", 3, &["c1", "c2"]));
    let outcome = run(&courses, &trainees, &[("HQ", 1), ("Remote", 0)]);

    assert!(outcome.parts.iter().all(|p| p.location == "HQ"));
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].location.as_deref(), Some("Remote"));
    assert!(outcome.warnings[0].is_placement_failure());
}

#[test]
fn classroom_count_far_above_group_count_is_harmless() {
    let courses = vec![Course::new("c1", "Intro", 2.0)];
    let trainees = trainees_at("HQ", 25, &["c1"]);
    let outcome = run(&courses, &trainees, &[("HQ", u32::MAX)]);
    let monday = d(2025, 1, 6);

    let rooms: Vec<u32> = (1..=3)
        .map(|group| parts_of(&outcome, "HQ", "c1", group)[0].classroom)
        .collect();
    assert_eq!(rooms, vec![1, 2, 3]);
    assert!(outcome.parts.iter().all(|p| p.start == at(monday, 8, 0)));
}
