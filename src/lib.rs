pub mod availability;
pub mod calculations;
pub mod calendar;
pub mod capacity;
pub mod course;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod timetable;
pub mod validation;

pub use availability::{ClassroomAvailabilityTracker, ClassroomReservation, UtilizationSummary};
pub use calculations::grouping::SessionGroup;
pub use calculations::splitter::{SessionPartPlan, SessionSplitter};
pub use calculations::{CourseCompleteScheduler, GroupCompleteScheduler, SchedulingStrategy};
pub use calendar::{BlockKind, TimeBlock, TimeBlockModel, TrainingCalendar};
pub use capacity::{CapacityPlanner, CapacitySeverity, ClassroomEstimate, LocationCapacity};
pub use course::{Course, Trainee};
pub use criteria::{SchedulingCriteria, SchedulingMode, SchedulingPreference};
pub use engine::{ScheduleReport, SchedulingEngine, SchedulingRequest, schedule};
pub use error::{
    ConfigurationError, SchedulingError, SchedulingWarning, WarningKind, WarningSeverity,
};
pub use timetable::{ScheduleSummary, ScheduledSessionPart, SessionRow, Timetable};
