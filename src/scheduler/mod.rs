//! Timetabling pipeline and KPI evaluation.
//!
//! # Pipeline
//!
//! `Timetabler` runs validation, filtering, graph and conflict construction,
//! the search, and decoding as one call.
//!
//! # KPI
//!
//! `TimetableKpi` computes gap score, professor workload per week and per
//! day, overloaded days, room usage and preferred elective placements.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated
//!   Timetabling"

mod kpi;
mod timetabler;

pub use kpi::{OverloadedDay, TimetableKpi};
pub use timetabler::{TimetableOutcome, Timetabler};
