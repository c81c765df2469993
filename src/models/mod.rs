//! Timetabling domain models.
//!
//! Immutable value entities built once from raw input: courses and their
//! parts, professors, rooms, the weekly calendar and its slots, plus the
//! read-only schedule view produced by a solve.
//!
//! # Domain Mappings
//!
//! | u-timetable | Search role |
//! |-------------|-------------|
//! | CoursePart | Variable |
//! | Professor × Room × Slot | Value (candidate) |
//! | ConflictRule | Pairwise hard constraint |
//! | Schedule | Solution |

mod calendar;
mod catalog;
mod constraint;
mod course;
mod resource;
mod schedule;

pub use calendar::{Calendar, Slot, Weekday};
pub use catalog::{invert_qualifications, Catalog, CourseFilter, CourseRecord};
pub use constraint::{ConflictRule, DEFAULT_DAILY_HOUR_CAP};
pub use course::{Course, CourseKind, CoursePart, PART_HOURS, SPLIT_THRESHOLD};
pub use resource::{Professor, Room};
pub use schedule::{Assignment, Schedule};

#[cfg(test)]
pub(crate) use schedule::sample_assignment;
