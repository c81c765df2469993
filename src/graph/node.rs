//! Node and edge payloads of the multilayer candidate graph.

use serde::{Deserialize, Serialize};

use crate::models::{CourseKind, CoursePart, Professor, Room, Slot};

/// Graph layer of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Part,
    Professor,
    Room,
    Slot,
}

/// Course-part node with the parent course's attributes denormalized,
/// so conflict checks and scoring never re-resolve the course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartNode {
    pub part_id: String,
    pub course_id: String,
    pub code: String,
    pub name: String,
    pub part: u32,
    pub hours: u32,
    pub kind: CourseKind,
    pub program: String,
    pub period: Option<u32>,
    pub semester: Option<u32>,
}

impl From<&CoursePart> for PartNode {
    fn from(part: &CoursePart) -> Self {
        let course = part.course();
        Self {
            part_id: part.id.clone(),
            course_id: course.id.clone(),
            code: course.code.clone(),
            name: course.name.clone(),
            part: part.part,
            hours: part.hours,
            kind: course.kind,
            program: course.program.clone(),
            period: course.period,
            semester: course.semester,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessorNode {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomNode {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotNode {
    pub id: String,
    pub weekday: u8,
    pub weekday_name: String,
    pub hour: usize,
    pub time_range: String,
}

impl From<&Professor> for ProfessorNode {
    fn from(p: &Professor) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
        }
    }
}

impl From<&Room> for RoomNode {
    fn from(r: &Room) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
        }
    }
}

impl From<&Slot> for SlotNode {
    fn from(s: &Slot) -> Self {
        Self {
            id: s.id.clone(),
            weekday: s.weekday.number,
            weekday_name: s.weekday.name.clone(),
            hour: s.hour,
            time_range: s.time_range.clone(),
        }
    }
}

/// A node of the candidate graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Part(PartNode),
    Professor(ProfessorNode),
    Room(RoomNode),
    Slot(SlotNode),
}

impl Node {
    /// Layer of this node.
    pub fn layer(&self) -> Layer {
        match self {
            Node::Part(_) => Layer::Part,
            Node::Professor(_) => Layer::Professor,
            Node::Room(_) => Layer::Room,
            Node::Slot(_) => Layer::Slot,
        }
    }

    /// Layer-prefixed key, unique across the graph.
    pub fn key(&self) -> String {
        match self {
            Node::Part(n) => format!("part_{}", n.part_id),
            Node::Professor(n) => format!("prof_{}", n.id),
            Node::Room(n) => format!("room_{}", n.id),
            Node::Slot(n) => format!("slot_{}", n.id),
        }
    }
}

/// A feasibility edge between a part node and a resource node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Professor qualified for the part's course.
    Qualified,
    /// Room may host the part.
    Hosts,
    /// Slot allowed for the part.
    Offered {
        /// Elective on a night slot. Informational, never enforced.
        preferred_elective: bool,
    },
}
