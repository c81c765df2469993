//! The immutable domain catalog for one run.
//!
//! Collects courses, their parts, professors, rooms and slots. Built once from
//! raw input records and never mutated afterwards; filtering produces a new
//! catalog.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

use super::{Calendar, Course, CourseKind, CoursePart, Professor, Room, Slot};
use crate::config::CatalogConfig;
use crate::error::{Result, TimetableError};

/// A raw course record as produced by an ingestion collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Real course code.
    pub code: String,
    pub name: String,
    /// Weekly hours. Records with `hours <= 0` are skipped.
    pub hours: i64,
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub period: Option<u32>,
    #[serde(default)]
    pub semester: Option<u32>,
    /// Comma-separated qualified professor ids.
    #[serde(default)]
    pub professors: String,
    /// Explicit kind (`mandatory`/`elective`). Derived from the program
    /// when absent.
    #[serde(default)]
    pub kind: Option<String>,
}

impl CourseRecord {
    /// Creates a record with the required fields.
    pub fn new(code: impl Into<String>, name: impl Into<String>, hours: i64) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            hours,
            program: String::new(),
            period: None,
            semester: None,
            professors: String::new(),
            kind: None,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_period(mut self, period: u32) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_semester(mut self, semester: u32) -> Self {
        self.semester = Some(semester);
        self
    }

    pub fn with_professors(mut self, professors: impl Into<String>) -> Self {
        self.professors = professors.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Optional course filters.
///
/// Unset fields do not filter. Electives always pass the program filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseFilter {
    pub semesters: Option<Vec<u32>>,
    pub periods: Option<Vec<u32>>,
    /// Program codes, compared trimmed and upper-cased.
    pub programs: Option<Vec<String>>,
}

impl CourseFilter {
    /// Creates an empty (pass-through) filter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_semesters(mut self, semesters: Vec<u32>) -> Self {
        self.semesters = Some(semesters);
        self
    }

    pub fn with_periods(mut self, periods: Vec<u32>) -> Self {
        self.periods = Some(periods);
        self
    }

    pub fn with_programs(mut self, programs: Vec<String>) -> Self {
        self.programs = Some(programs);
        self
    }

    /// Whether the filter lets every course through.
    pub fn is_empty(&self) -> bool {
        self.semesters.is_none() && self.periods.is_none() && self.programs.is_none()
    }

    /// Whether a course passes every set filter.
    pub fn matches(&self, course: &Course) -> bool {
        if let Some(semesters) = &self.semesters {
            if !course.semester.is_some_and(|s| semesters.contains(&s)) {
                return false;
            }
        }
        if let Some(periods) = &self.periods {
            if !course.period.is_some_and(|p| periods.contains(&p)) {
                return false;
            }
        }
        if let Some(programs) = &self.programs {
            let program = course.program.trim().to_uppercase();
            let listed = programs.iter().any(|p| p.trim().to_uppercase() == program);
            if !(listed || course.is_elective()) {
                return false;
            }
        }
        true
    }
}

/// All domain entities of a run.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub courses: Vec<Arc<Course>>,
    /// Parts of every course, in course order.
    pub parts: Vec<CoursePart>,
    pub professors: Vec<Professor>,
    pub rooms: Vec<Room>,
    pub slots: Vec<Slot>,
}

impl Catalog {
    /// Creates a catalog, splitting every course into parts and generating
    /// slots from the calendar.
    pub fn new(
        courses: Vec<Course>,
        professors: Vec<Professor>,
        rooms: Vec<Room>,
        calendar: &Calendar,
    ) -> Self {
        let courses: Vec<Arc<Course>> = courses.into_iter().map(Arc::new).collect();
        Self::from_shared(courses, professors, rooms, calendar.slots())
    }

    fn from_shared(
        courses: Vec<Arc<Course>>,
        professors: Vec<Professor>,
        rooms: Vec<Room>,
        slots: Vec<Slot>,
    ) -> Self {
        let parts = courses.iter().flat_map(CoursePart::split).collect();
        Self {
            courses,
            parts,
            professors,
            rooms,
            slots,
        }
    }

    /// Builds a catalog from raw records and id → name listings.
    ///
    /// - Records with non-positive hours are skipped.
    /// - Course ids are `{code}_{record_index}`.
    /// - Professors keep their listing order; qualification ids that are not
    ///   listed are ignored.
    ///
    /// # Errors
    /// [`TimetableError::InvalidCourse`] for an explicit kind that is neither
    /// `mandatory` nor `elective`, or for weekly hours beyond `u32::MAX`.
    pub fn from_records<P, R>(
        records: &[CourseRecord],
        professors: P,
        rooms: R,
        calendar: &Calendar,
        options: &CatalogConfig,
    ) -> Result<Self>
    where
        P: IntoIterator<Item = (String, String)>,
        R: IntoIterator<Item = (String, String)>,
    {
        let mut courses = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if record.hours <= 0 {
                debug!(
                    event = "record_skipped",
                    code = %record.code,
                    hours = record.hours,
                    "non-positive weekly hours"
                );
                continue;
            }
            let id = format!("{}_{}", record.code, index);
            let Ok(hours) = u32::try_from(record.hours) else {
                return Err(TimetableError::InvalidCourse {
                    course: id,
                    reason: format!("weekly hours {} out of range", record.hours),
                });
            };
            let mut course = match &record.kind {
                Some(kind) => Course::with_kind_str(id, &record.code, &record.name, kind, hours)?,
                None => {
                    let kind = if record
                        .program
                        .trim()
                        .eq_ignore_ascii_case(options.elective_program.trim())
                    {
                        CourseKind::Elective
                    } else {
                        CourseKind::Mandatory
                    };
                    Course::new(id, &record.code, &record.name, kind, hours)?
                }
            }
            .with_program(&record.program)
            .with_professors(&record.professors);
            course.period = record.period;
            course.semester = record.semester;
            courses.push(course);
        }

        let professors = invert_qualifications(&courses, professors);
        let rooms = rooms
            .into_iter()
            .map(|(id, name)| Room::new(id, name))
            .collect();

        Ok(Self::new(courses, professors, rooms, calendar))
    }

    /// Returns a new catalog keeping only courses that pass `filter`.
    ///
    /// Professors, rooms and slots are carried over unchanged.
    pub fn filtered(&self, filter: &CourseFilter) -> Self {
        let courses = self
            .courses
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        Self::from_shared(
            courses,
            self.professors.clone(),
            self.rooms.clone(),
            self.slots.clone(),
        )
    }

    /// Finds a course by id.
    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id).map(|c| c.as_ref())
    }

    /// Finds a professor by id.
    pub fn professor(&self, id: &str) -> Option<&Professor> {
        self.professors.iter().find(|p| p.id == id)
    }

    /// Parts of one course.
    pub fn parts_of(&self, course_id: &str) -> Vec<&CoursePart> {
        self.parts
            .iter()
            .filter(|p| p.course_id() == course_id)
            .collect()
    }

    /// Total weekly hours over all parts.
    pub fn total_part_hours(&self) -> u32 {
        self.parts.iter().map(|p| p.hours).sum()
    }
}

/// Builds professors from an id → name listing, each qualified for the
/// courses whose raw list names them.
pub fn invert_qualifications<P>(courses: &[Course], professors: P) -> Vec<Professor>
where
    P: IntoIterator<Item = (String, String)>,
{
    let mut qualified: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for course in courses {
        for prof_id in course.qualified_professor_ids() {
            qualified
                .entry(prof_id)
                .or_default()
                .insert(course.id.clone());
        }
    }

    professors
        .into_iter()
        .map(|(id, name)| {
            let qualified_courses = qualified.get(id.as_str()).cloned().unwrap_or_default();
            Professor {
                id,
                name,
                qualified_courses,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CourseRecord> {
        vec![
            CourseRecord::new("ALG", "Algorithms", 4)
                .with_program("CCO")
                .with_period(3)
                .with_semester(1)
                .with_professors("P1,P2"),
            CourseRecord::new("ZERO", "Empty", 0).with_program("CCO"),
            CourseRecord::new("ML", "Machine Learning", 2)
                .with_program("optativa")
                .with_semester(2)
                .with_professors("P2"),
            CourseRecord::new("DB", "Databases", 3)
                .with_program("SIN")
                .with_period(5)
                .with_semester(1)
                .with_professors("P3, P404"),
        ]
    }

    fn people() -> Vec<(String, String)> {
        vec![
            ("P1".into(), "Ada".into()),
            ("P2".into(), "Grace".into()),
            ("P3".into(), "Alan".into()),
            ("P4".into(), "Idle".into()),
        ]
    }

    fn rooms() -> Vec<(String, String)> {
        vec![("R1".into(), "Room 1".into())]
    }

    fn catalog() -> Catalog {
        Catalog::from_records(
            &records(),
            people(),
            rooms(),
            &Calendar::default(),
            &CatalogConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_from_records_skips_zero_hours() {
        let cat = catalog();
        assert_eq!(cat.courses.len(), 3);
        assert!(cat.course("ZERO_1").is_none());
        // ALG: 2 parts, ML: 1 part, DB: 1 part
        assert_eq!(cat.parts.len(), 4);
        assert_eq!(cat.total_part_hours(), 4 + 2 + 3);
    }

    #[test]
    fn test_course_ids_use_record_index() {
        let cat = catalog();
        let ids: Vec<&str> = cat.courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ALG_0", "ML_2", "DB_3"]);
        assert_eq!(cat.parts_of("ALG_0").len(), 2);
    }

    #[test]
    fn test_kind_derived_from_program() {
        let cat = catalog();
        assert_eq!(cat.course("ML_2").unwrap().kind, CourseKind::Elective);
        assert_eq!(cat.course("ALG_0").unwrap().kind, CourseKind::Mandatory);
    }

    #[test]
    fn test_explicit_kind() {
        let recs = vec![CourseRecord::new("X", "X", 2).with_kind("elective")];
        let cat = Catalog::from_records(
            &recs,
            people(),
            rooms(),
            &Calendar::default(),
            &CatalogConfig::default(),
        )
        .unwrap();
        assert!(cat.courses[0].is_elective());

        let bad = vec![CourseRecord::new("X", "X", 2).with_kind("lab")];
        assert!(Catalog::from_records(
            &bad,
            people(),
            rooms(),
            &Calendar::default(),
            &CatalogConfig::default(),
        )
        .is_err());
    }

    #[test]
    fn test_oversized_hours_rejected() {
        let recs = vec![CourseRecord::new("BIG", "Big", i64::from(u32::MAX) + 1)];
        let err = Catalog::from_records(
            &recs,
            people(),
            rooms(),
            &Calendar::default(),
            &CatalogConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TimetableError::InvalidCourse { course, .. } if course == "BIG_0"));
    }

    #[test]
    fn test_qualifications_inverted() {
        let cat = catalog();
        let p1 = cat.professor("P1").unwrap();
        assert!(p1.is_qualified_for("ALG_0"));
        let p2 = cat.professor("P2").unwrap();
        assert_eq!(p2.qualified_courses.len(), 2);
        let p4 = cat.professor("P4").unwrap();
        assert!(p4.qualified_courses.is_empty());
        // P404 is not listed and is dropped.
        assert!(cat.professor("P404").is_none());
        assert_eq!(cat.professors.len(), 4);
    }

    #[test]
    fn test_slots_generated() {
        assert_eq!(catalog().slots.len(), 30);
    }

    #[test]
    fn test_filter_semester() {
        let cat = catalog().filtered(&CourseFilter::new().with_semesters(vec![1]));
        let ids: Vec<&str> = cat.courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ALG_0", "DB_3"]);
        assert_eq!(cat.parts.len(), 3);
    }

    #[test]
    fn test_filter_period_excludes_missing_period() {
        let cat = catalog().filtered(&CourseFilter::new().with_periods(vec![3, 5]));
        assert_eq!(cat.courses.len(), 2);
        assert!(cat.course("ML_2").is_none());
    }

    #[test]
    fn test_filter_program_keeps_electives() {
        let cat = catalog().filtered(&CourseFilter::new().with_programs(vec![" sin".into()]));
        let ids: Vec<&str> = cat.courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ML_2", "DB_3"]);
    }

    #[test]
    fn test_empty_filter_passes_all() {
        let filter = CourseFilter::new();
        assert!(filter.is_empty());
        assert_eq!(catalog().filtered(&filter).courses.len(), 3);
    }

    #[test]
    fn test_record_deserialize_defaults() {
        let rec: CourseRecord =
            serde_json::from_str(r#"{"code":"A","name":"A","hours":2}"#).unwrap();
        assert_eq!(rec.program, "");
        assert!(rec.period.is_none());
        assert!(rec.kind.is_none());
    }
}
