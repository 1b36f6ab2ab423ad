//! Application services
//!
//! Services orchestrate domain logic and ports to fulfill use cases.

mod batch_service;

pub use batch_service::{
    BatchReport, BatchService, MeetingSettings, PlannedRow, UnitOutcome, UnitReport,
};
