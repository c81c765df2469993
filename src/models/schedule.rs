//! Schedule (solution view) model.
//!
//! A schedule is the read-only result of a solve: one assignment per course
//! part, carrying the denormalized attributes renderers need. It is produced
//! by [`CandidateGraph::decode`](crate::graph::CandidateGraph::decode) and
//! never mutated by consumers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::CourseKind;

/// One course part placed on a (professor, room, slot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Deterministic candidate id.
    pub candidate_id: String,
    pub part_id: String,
    pub course_id: String,
    /// Real course code.
    pub code: String,
    pub name: String,
    /// 1-based part number.
    pub part: u32,
    pub hours: u32,
    pub kind: CourseKind,
    pub program: String,
    pub period: Option<u32>,
    pub semester: Option<u32>,
    pub professor_id: String,
    pub professor_name: String,
    pub room_id: String,
    pub room_name: String,
    pub slot_id: String,
    pub weekday: u8,
    pub weekday_name: String,
    /// Position in the band table.
    pub hour: usize,
    pub time_range: String,
    /// Elective placed on a night slot (informational).
    pub preferred_elective: bool,
}

/// A complete conflict-free timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub assignments: Vec<Assignment>,
    /// Gap score of the chosen solution (lower is better).
    pub gap_score: u64,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Finds the assignment for a part.
    pub fn assignment_for_part(&self, part_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.part_id == part_id)
    }

    /// All assignments of one course.
    pub fn assignments_for_course(&self, course_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.course_id == course_id)
            .collect()
    }

    /// All assignments of one professor.
    pub fn assignments_for_professor(&self, professor_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.professor_id == professor_id)
            .collect()
    }

    /// All assignments in one room.
    pub fn assignments_for_room(&self, room_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.room_id == room_id)
            .collect()
    }

    /// Assignments grouped by "name (code)", each group sorted by part.
    pub fn by_course(&self) -> BTreeMap<String, Vec<&Assignment>> {
        let mut grouped: BTreeMap<String, Vec<&Assignment>> = BTreeMap::new();
        for a in &self.assignments {
            grouped
                .entry(format!("{} ({})", a.name, a.code))
                .or_default()
                .push(a);
        }
        for parts in grouped.values_mut() {
            parts.sort_by_key(|a| a.part);
        }
        grouped
    }

    /// Weekly teaching hours per professor.
    pub fn professor_hours(&self) -> BTreeMap<String, u32> {
        let mut hours: BTreeMap<String, u32> = BTreeMap::new();
        for a in &self.assignments {
            *hours.entry(a.professor_id.clone()).or_insert(0) += a.hours;
        }
        hours
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}

#[cfg(test)]
pub(crate) fn sample_assignment(
    part_id: &str,
    course_id: &str,
    professor_id: &str,
    weekday: u8,
    hour: usize,
    hours: u32,
) -> Assignment {
    Assignment {
        candidate_id: format!("assign_{part_id}__prof_{professor_id}__room_R1__slot_{weekday}_{hour}"),
        part_id: part_id.to_string(),
        course_id: course_id.to_string(),
        code: course_id.split('_').next().unwrap_or(course_id).to_string(),
        name: format!("Course {course_id}"),
        part: part_id
            .rsplit("_p")
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(1),
        hours,
        kind: CourseKind::Mandatory,
        program: "CCO".into(),
        period: Some(1),
        semester: Some(1),
        professor_id: professor_id.to_string(),
        professor_name: format!("Prof {professor_id}"),
        room_id: "R1".into(),
        room_name: "Room 1".into(),
        slot_id: format!("{weekday}_{hour}"),
        weekday,
        weekday_name: format!("Day {weekday}"),
        hour,
        time_range: String::new(),
        preferred_elective: false,
    }
}
