use training_scheduler::{
    CapacityPlanner, CapacitySeverity, ConfigurationError, Course, SchedulingCriteria,
    SchedulingEngine, Trainee,
};

#[test]
fn classrooms_needed_applies_contingency_and_rounds_up() {
    // 4 weeks x 5 days x 8 hours = 160 hours per classroom
    let criteria = SchedulingCriteria::default();
    let estimate = CapacityPlanner::classrooms_needed(200.0, &criteria).unwrap();
    // 200 * 1.2 / 160 = 1.5 -> 2
    assert_eq!(estimate.number_of_classrooms, 2);
    assert_eq!(estimate.total_training_hours, 200.0);
}

#[test]
fn classrooms_needed_is_at_least_one() {
    let criteria = SchedulingCriteria::default();
    assert_eq!(CapacityPlanner::classrooms_needed(0.0, &criteria).unwrap().number_of_classrooms, 1);
    assert_eq!(CapacityPlanner::classrooms_needed(1.0, &criteria).unwrap().number_of_classrooms, 1);
}

#[test]
fn classrooms_needed_is_pure() {
    let criteria = SchedulingCriteria::default().with_capacity_window(2, 4, 6.0);
    let first = CapacityPlanner::classrooms_needed(123.5, &criteria).unwrap();
    let second = CapacityPlanner::classrooms_needed(123.5, &criteria).unwrap();
    assert_eq!(first, second);
}

#[test]
fn classrooms_needed_rejects_degenerate_window() {
    let criteria = SchedulingCriteria::default().with_capacity_window(0, 5, 8.0);
    assert_eq!(
        CapacityPlanner::classrooms_needed(10.0, &criteria),
        Err(ConfigurationError::InvalidCapacityWindow)
    );
    let criteria = SchedulingCriteria::default().with_contingency(0.0);
    assert!(matches!(
        CapacityPlanner::classrooms_needed(10.0, &criteria),
        Err(ConfigurationError::InvalidContingency(_))
    ));
}

#[test]
fn validate_capacity_thresholds() {
    assert_eq!(CapacityPlanner::validate_capacity(1).severity, CapacitySeverity::Ok);
    assert_eq!(CapacityPlanner::validate_capacity(5).severity, CapacitySeverity::Ok);
    assert_eq!(CapacityPlanner::validate_capacity(6).severity, CapacitySeverity::Warning);
    assert_eq!(CapacityPlanner::validate_capacity(10).severity, CapacitySeverity::Warning);
    let error = CapacityPlanner::validate_capacity(11);
    assert_eq!(error.severity, CapacitySeverity::Error);
    assert!(error.message.contains("11"));
}

#[test]
fn estimate_capacity_reports_each_location() {
    let courses = vec![Course::new("c1", "Intro", 40.0), Course::new("c2", "Advanced", 8.0)];
    let mut trainees: Vec<Trainee> = (0..25)
        .map(|i| Trainee::new(format!("hq{i}"), "HQ", ["c1", "c2"]))
        .collect();
    trainees.push(Trainee::new("b1", "Branch", ["c2"]));

    let criteria = SchedulingCriteria::default().with_classrooms("Branch", 4);
    let estimates = SchedulingEngine::new(criteria)
        .estimate_capacity(&trainees, &courses)
        .unwrap();
    assert_eq!(estimates.len(), 2);

    let branch = &estimates[0];
    assert_eq!(branch.location, "Branch");
    assert_eq!(branch.session_groups, 1);
    assert_eq!(branch.estimate.total_training_hours, 8.0);
    assert_eq!(branch.estimate.number_of_classrooms, 1);
    assert_eq!(branch.classrooms, 4);

    let hq = &estimates[1];
    assert_eq!(hq.trainee_count, 25);
    // 3 groups each of c1 and c2
    assert_eq!(hq.session_groups, 6);
    assert_eq!(hq.estimate.total_training_hours, 3.0 * 40.0 + 3.0 * 8.0);
    // 144 * 1.2 / 160 = 1.08 -> 2
    assert_eq!(hq.estimate.number_of_classrooms, 2);
    assert_eq!(hq.classrooms, 2);
    assert_eq!(hq.assessment.severity, CapacitySeverity::Ok);
}
