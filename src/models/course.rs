//! Course and course-part models.
//!
//! A course is split once, at load time, into parts of at most two hours.
//! Parts are the scheduling variables: the solver assigns exactly one
//! (professor, room, slot) candidate to each part.
//!
//! # Split Rule
//! - `hours >= 4` → `hours / 2` parts of 2 hours each (an odd remainder hour
//!   is dropped).
//! - otherwise → a single part carrying all hours.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Result, TimetableError};

/// Hours per part when a course is split.
pub const PART_HOURS: u32 = 2;

/// Minimum weekly hours for a course to be split into several parts.
pub const SPLIT_THRESHOLD: u32 = 4;

/// Course category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseKind {
    Mandatory,
    Elective,
}

impl FromStr for CourseKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mandatory" => Ok(Self::Mandatory),
            "elective" => Ok(Self::Elective),
            other => Err(format!(
                "unknown course kind '{other}' (expected 'mandatory' or 'elective')"
            )),
        }
    }
}

impl fmt::Display for CourseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mandatory => f.write_str("mandatory"),
            Self::Elective => f.write_str("elective"),
        }
    }
}

/// An academic course.
///
/// Immutable once built; shared by its parts through an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Real (catalog) code, not necessarily unique.
    pub code: String,
    pub name: String,
    pub kind: CourseKind,
    /// Total weekly hours (> 0).
    pub hours: u32,
    /// Program/track code.
    pub program: String,
    /// Academic period within the program.
    pub period: Option<u32>,
    pub semester: Option<u32>,
    /// Raw comma-separated list of qualified professor ids.
    pub professors: String,
}

impl Course {
    /// Creates a course.
    ///
    /// # Errors
    /// [`TimetableError::InvalidCourse`] when `hours` is zero.
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        kind: CourseKind,
        hours: u32,
    ) -> Result<Self> {
        let id = id.into();
        if hours == 0 {
            return Err(TimetableError::InvalidCourse {
                course: id,
                reason: "weekly hours must be greater than zero".into(),
            });
        }
        Ok(Self {
            id,
            code: code.into(),
            name: name.into(),
            kind,
            hours,
            program: String::new(),
            period: None,
            semester: None,
            professors: String::new(),
        })
    }

    /// Creates a course from a kind string.
    ///
    /// # Errors
    /// [`TimetableError::InvalidCourse`] when the kind is not one of the
    /// enumerated values or `hours` is zero.
    pub fn with_kind_str(
        id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        kind: &str,
        hours: u32,
    ) -> Result<Self> {
        let id = id.into();
        let kind = kind
            .parse::<CourseKind>()
            .map_err(|reason| TimetableError::InvalidCourse {
                course: id.clone(),
                reason,
            })?;
        Self::new(id, code, name, kind, hours)
    }

    /// Sets the program code.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the academic period.
    pub fn with_period(mut self, period: u32) -> Self {
        self.period = Some(period);
        self
    }

    /// Sets the semester.
    pub fn with_semester(mut self, semester: u32) -> Self {
        self.semester = Some(semester);
        self
    }

    /// Sets the raw qualified-professor list.
    pub fn with_professors(mut self, professors: impl Into<String>) -> Self {
        self.professors = professors.into();
        self
    }

    /// Parsed professor ids from the raw qualification list.
    pub fn qualified_professor_ids(&self) -> Vec<&str> {
        self.professors
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether this course is elective.
    #[inline]
    pub fn is_elective(&self) -> bool {
        self.kind == CourseKind::Elective
    }

    /// Number of parts this course splits into.
    pub fn part_count(&self) -> u32 {
        if self.hours >= SPLIT_THRESHOLD {
            self.hours / PART_HOURS
        } else {
            1
        }
    }
}

/// A schedulable unit of a course.
///
/// Course attributes are read through the shared parent, never copied
/// into mutable state.
#[derive(Debug, Clone)]
pub struct CoursePart {
    /// `{course_id}_p{part}`.
    pub id: String,
    /// 1-based part number.
    pub part: u32,
    /// Hours carried by this part.
    pub hours: u32,
    course: Arc<Course>,
}

impl CoursePart {
    /// Splits a course into its parts.
    pub fn split(course: &Arc<Course>) -> Vec<CoursePart> {
        let count = course.part_count();
        let hours = if course.hours >= SPLIT_THRESHOLD {
            PART_HOURS
        } else {
            course.hours
        };
        (1..=count)
            .map(|part| CoursePart {
                id: format!("{}_p{}", course.id, part),
                part,
                hours,
                course: Arc::clone(course),
            })
            .collect()
    }

    /// Parent course.
    #[inline]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[inline]
    pub fn course_id(&self) -> &str {
        &self.course.id
    }

    #[inline]
    pub fn program(&self) -> &str {
        &self.course.program
    }

    #[inline]
    pub fn kind(&self) -> CourseKind {
        self.course.kind
    }

    #[inline]
    pub fn period(&self) -> Option<u32> {
        self.course.period
    }

    #[inline]
    pub fn semester(&self) -> Option<u32> {
        self.course.semester
    }

    /// Raw qualification list of the parent course.
    #[inline]
    pub fn professors(&self) -> &str {
        &self.course.professors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(hours: u32) -> Arc<Course> {
        Arc::new(
            Course::new("ALG_0", "ALG", "Algorithms", CourseKind::Mandatory, hours)
                .unwrap()
                .with_program("CCO")
                .with_period(3)
                .with_semester(1)
                .with_professors("P1, P2,,P3 "),
        )
    }

    #[test]
    fn test_zero_hours_rejected() {
        let err = Course::new("X", "X", "X", CourseKind::Mandatory, 0).unwrap_err();
        assert!(matches!(err, TimetableError::InvalidCourse { .. }));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("mandatory".parse::<CourseKind>(), Ok(CourseKind::Mandatory));
        assert_eq!(" Elective ".parse::<CourseKind>(), Ok(CourseKind::Elective));
        assert!("seminar".parse::<CourseKind>().is_err());

        let err = Course::with_kind_str("X_0", "X", "X", "seminar", 2).unwrap_err();
        match err {
            TimetableError::InvalidCourse { course, reason } => {
                assert_eq!(course, "X_0");
                assert!(reason.contains("seminar"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_qualified_professor_ids() {
        let c = course(4);
        assert_eq!(c.qualified_professor_ids(), vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_split_four_hours() {
        let parts = CoursePart::split(&course(4));
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].id, "ALG_0_p1");
        assert_eq!(parts[1].id, "ALG_0_p2");
        assert!(parts.iter().all(|p| p.hours == 2));
    }

    #[test]
    fn test_split_odd_hours_drops_remainder() {
        let parts = CoursePart::split(&course(5));
        assert_eq!(parts.len(), 2);
        assert_eq!(parts.iter().map(|p| p.hours).sum::<u32>(), 4);
    }

    #[test]
    fn test_split_small_course_single_part() {
        for hours in 1..=3 {
            let parts = CoursePart::split(&course(hours));
            assert_eq!(parts.len(), 1);
            assert_eq!(parts[0].hours, hours);
            assert_eq!(parts[0].part, 1);
        }
    }

    #[test]
    fn test_part_delegates_to_course() {
        let c = course(6);
        let parts = CoursePart::split(&c);
        assert_eq!(parts.len(), 3);
        for p in &parts {
            assert_eq!(p.course_id(), "ALG_0");
            assert_eq!(p.program(), "CCO");
            assert_eq!(p.period(), Some(3));
            assert_eq!(p.semester(), Some(1));
            assert_eq!(p.kind(), CourseKind::Mandatory);
            assert_eq!(p.professors(), c.professors);
        }
        // Parts share the parent instead of copying it.
        assert_eq!(Arc::strong_count(&c), 4);
    }
}
