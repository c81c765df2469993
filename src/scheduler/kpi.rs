//! Timetable quality metrics (KPIs).
//!
//! Computes workload and compactness indicators from a decoded schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Gap score | Σ squared idle windows per (program, period, weekday) |
//! | Professor hours | Weekly hours per professor |
//! | Daily hours | Hours per (professor, weekday) |
//! | Overloaded days | (professor, weekday) pairs above the daily cap |
//! | Rooms used | Distinct rooms with at least one session |
//! | Preferred electives | Elective sessions placed on night slots |
//!
//! The daily workload conflict rule is pairwise, so a solved schedule may
//! still contain overloaded days; this report surfaces them.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::Schedule;
use crate::solver::schedule_gap_score;

/// A (professor, weekday) pair whose summed hours exceed the daily cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverloadedDay {
    pub professor_id: String,
    pub weekday: u8,
    pub hours: u32,
}

/// Timetable performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct TimetableKpi {
    /// Gap score recomputed from the schedule.
    pub gap_score: u64,
    /// Weekly hours per professor.
    pub professor_hours: BTreeMap<String, u32>,
    /// Hours per professor, then weekday.
    pub daily_hours: BTreeMap<String, BTreeMap<u8, u32>>,
    /// Days above the cap, ordered by professor then weekday.
    pub overloaded_days: Vec<OverloadedDay>,
    /// Number of distinct rooms in use.
    pub rooms_used: usize,
    /// Elective sessions on preferred (night) slots.
    pub preferred_electives: usize,
    /// Total scheduled sessions.
    pub sessions: usize,
}

impl TimetableKpi {
    /// Computes KPIs from a schedule.
    ///
    /// # Arguments
    /// * `schedule` - The decoded schedule.
    /// * `daily_hour_cap` - Hours per professor and weekday above which a
    ///   day counts as overloaded.
    pub fn calculate(schedule: &Schedule, daily_hour_cap: u32) -> Self {
        let mut daily_hours: BTreeMap<String, BTreeMap<u8, u32>> = BTreeMap::new();
        let mut rooms = BTreeSet::new();
        let mut preferred_electives = 0;

        for a in &schedule.assignments {
            *daily_hours
                .entry(a.professor_id.clone())
                .or_default()
                .entry(a.weekday)
                .or_insert(0) += a.hours;
            rooms.insert(a.room_id.as_str());
            if a.preferred_elective {
                preferred_electives += 1;
            }
        }

        let overloaded_days = daily_hours
            .iter()
            .flat_map(|(professor_id, days)| {
                days.iter()
                    .filter(move |(_, &hours)| hours > daily_hour_cap)
                    .map(move |(&weekday, &hours)| OverloadedDay {
                        professor_id: professor_id.clone(),
                        weekday,
                        hours,
                    })
            })
            .collect();

        Self {
            gap_score: schedule_gap_score(schedule),
            professor_hours: schedule.professor_hours(),
            daily_hours,
            overloaded_days,
            rooms_used: rooms.len(),
            preferred_electives,
            sessions: schedule.assignment_count(),
        }
    }

    /// Whether no professor exceeds the daily cap on any day.
    pub fn within_daily_cap(&self) -> bool {
        self.overloaded_days.is_empty()
    }

    /// Largest weekly load of any professor.
    pub fn max_professor_hours(&self) -> u32 {
        self.professor_hours.values().copied().max().unwrap_or(0)
    }
}
