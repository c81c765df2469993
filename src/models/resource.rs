//! Professor and room models.
//!
//! Professors carry the set of course ids they may teach, derived by
//! inverting every course's qualification list. Rooms carry no capacity or
//! type: any room may host any part; room strictness comes from the conflict
//! relation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A professor who can be assigned to course parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professor {
    /// Unique professor identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Course ids this professor is qualified to teach.
    pub qualified_courses: BTreeSet<String>,
}

impl Professor {
    /// Creates a professor qualified for nothing.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            qualified_courses: BTreeSet::new(),
        }
    }

    /// Adds a qualified course id.
    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.qualified_courses.insert(course_id.into());
        self
    }

    /// Whether this professor may teach the given course.
    #[inline]
    pub fn is_qualified_for(&self, course_id: &str) -> bool {
        self.qualified_courses.contains(course_id)
    }
}

/// A room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Room {
    /// Creates a room.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
