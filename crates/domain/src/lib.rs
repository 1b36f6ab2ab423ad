//! Domain layer for the HR meeting planner
//!
//! Contains contract records, the meetings derived from them, the schedule
//! engine and the value objects shared by all other layers. No I/O happens
//! here.

pub mod entities;
pub mod errors;
pub mod schedule;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use schedule::{
    CANDIDATE_DAYS, MeetingSchedule, RandomSource, ScheduleEngine, ScheduleRules, add_months,
};
pub use value_objects::*;
