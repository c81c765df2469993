//! Input validation for timetabling catalogs.
//!
//! Checks structural integrity of a catalog before the candidate graph is
//! built. Detects:
//! - Duplicate course, professor and room IDs (fatal)
//! - An empty calendar, i.e. no teaching slots (fatal)
//! - Qualification lists naming unknown professors (warning)
//! - Courses no listed professor is qualified for (warning)
//!
//! All issues are collected in one pass. Warnings do not stop a run; an
//! unqualified course still fails later with the id of its first part.

use std::collections::HashSet;

use tracing::warn;

use crate::models::Catalog;

/// `Ok` carries the warnings, `Err` the fatal errors.
pub type ValidationResult = Result<Vec<ValidationError>, Vec<ValidationError>>;

/// A validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of one kind share the same ID.
    DuplicateId,
    /// The calendar yields no slots.
    EmptyCalendar,
    /// A course's qualification list names a professor that is not listed.
    UnknownProfessor,
    /// No listed professor may teach a course.
    UnqualifiedCourse,
}

impl ValidationErrorKind {
    /// Whether findings of this kind abort the run.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::DuplicateId | Self::EmptyCalendar)
    }
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

/// Collects every finding for a catalog, in check order.
pub fn catalog_findings(catalog: &Catalog) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut course_ids = HashSet::new();
    for c in &catalog.courses {
        if !course_ids.insert(c.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", c.id),
            ));
        }
    }

    let mut professor_ids = HashSet::new();
    for p in &catalog.professors {
        if !professor_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate professor ID: {}", p.id),
            ));
        }
    }

    let mut room_ids = HashSet::new();
    for r in &catalog.rooms {
        if !room_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
    }

    if catalog.slots.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCalendar,
            "Calendar has no teaching slots",
        ));
    }

    for c in &catalog.courses {
        for prof_id in c.qualified_professor_ids() {
            if !professor_ids.contains(prof_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownProfessor,
                    format!("Course {} lists unknown professor {}", c.id, prof_id),
                ));
            }
        }
        if !catalog.professors.iter().any(|p| p.is_qualified_for(&c.id)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnqualifiedCourse,
                format!("No professor is qualified for course {}", c.id),
            ));
        }
    }

    errors
}

/// Validates a catalog, logging warnings and splitting off fatal errors.
///
/// # Returns
/// `Ok(warnings)` if no fatal issue was found, `Err(fatal)` otherwise.
pub fn validate_catalog(catalog: &Catalog) -> ValidationResult {
    let (fatal, warnings): (Vec<_>, Vec<_>) = catalog_findings(catalog)
        .into_iter()
        .partition(ValidationError::is_fatal);

    for w in &warnings {
        warn!(event = "validation_warning", kind = ?w.kind, message = %w.message);
    }

    if fatal.is_empty() {
        Ok(warnings)
    } else {
        Err(fatal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Calendar, Course, CourseKind, Professor, Room, Weekday};

    fn course(id: &str, professors: &str) -> Course {
        Course::new(id, id, id, CourseKind::Mandatory, 2)
            .unwrap()
            .with_professors(professors)
    }

    fn valid_catalog() -> Catalog {
        Catalog::new(
            vec![course("A", "P1"), course("B", "P2")],
            vec![
                Professor::new("P1", "Ada").with_course("A"),
                Professor::new("P2", "Grace").with_course("B"),
            ],
            vec![Room::new("R1", "Room 1")],
            &Calendar::default(),
        )
    }

    #[test]
    fn test_valid_input() {
        assert_eq!(validate_catalog(&valid_catalog()), Ok(Vec::new()));
    }

    #[test]
    fn test_duplicate_ids() {
        let cat = Catalog::new(
            vec![course("A", "P1"), course("A", "P1")],
            vec![
                Professor::new("P1", "Ada").with_course("A"),
                Professor::new("P1", "Ada again"),
            ],
            vec![Room::new("R1", "Room 1"), Room::new("R1", "Room 1b")],
            &Calendar::default(),
        );
        let errors = validate_catalog(&cat).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.kind == ValidationErrorKind::DuplicateId));
        assert!(errors[2].message.contains("room"));
    }

    #[test]
    fn test_empty_calendar() {
        let cal = Calendar::new(vec![Weekday::new(2, "Mon")], vec!["only".into()]);
        let cat = Catalog::new(
            vec![course("A", "P1")],
            vec![Professor::new("P1", "Ada").with_course("A")],
            vec![Room::new("R1", "Room 1")],
            &cal,
        );
        let errors = validate_catalog(&cat).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyCalendar);
    }

    #[test]
    fn test_unknown_professor_is_warning() {
        let mut cat = valid_catalog();
        cat.courses[0] = std::sync::Arc::new(course("A", "P1, P404"));
        let warnings = validate_catalog(&cat).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ValidationErrorKind::UnknownProfessor);
        assert!(warnings[0].message.contains("P404"));
        assert!(!warnings[0].is_fatal());
    }

    #[test]
    fn test_unqualified_course_is_warning() {
        let cat = Catalog::new(
            vec![course("A", "P1"), course("C", "")],
            vec![Professor::new("P1", "Ada").with_course("A")],
            vec![Room::new("R1", "Room 1")],
            &Calendar::default(),
        );
        let warnings = validate_catalog(&cat).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ValidationErrorKind::UnqualifiedCourse);
    }

    #[test]
    fn test_findings_collects_everything() {
        let cal = Calendar::new(vec![], vec!["a".into(), "b".into(), "c".into()]);
        let cat = Catalog::new(
            vec![course("A", "P9")],
            vec![],
            vec![Room::new("R1", "x"), Room::new("R1", "y")],
            &cal,
        );
        let kinds: Vec<_> = catalog_findings(&cat).iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ValidationErrorKind::DuplicateId,
                ValidationErrorKind::EmptyCalendar,
                ValidationErrorKind::UnknownProfessor,
                ValidationErrorKind::UnqualifiedCourse,
            ]
        );
    }
}
