//! Hard-constraint taxonomy.
//!
//! Every conflict edge between two candidates is attributed to the first of
//! these rules that fires, in declaration order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default pairwise daily workload cap (hours) per professor.
pub const DEFAULT_DAILY_HOUR_CAP: u32 = 8;

/// A rule making two candidates mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictRule {
    /// Both candidates place the same course part.
    Identity,
    /// Same professor in the same slot.
    ProfessorClash,
    /// Same room in the same slot.
    RoomClash,
    /// Same program and period in the same slot, different courses.
    CurriculumClash,
    /// Same professor on the same weekday above the daily hour cap
    /// (evaluated pairwise).
    DailyWorkload,
    /// Two sessions of one course in adjacent bands of the same day.
    Adjacency,
    /// Two sessions of one course in different rooms (strict mode only).
    StrictRoom,
}

impl ConflictRule {
    /// All rules in evaluation order.
    pub const ALL: [ConflictRule; 7] = [
        ConflictRule::Identity,
        ConflictRule::ProfessorClash,
        ConflictRule::RoomClash,
        ConflictRule::CurriculumClash,
        ConflictRule::DailyWorkload,
        ConflictRule::Adjacency,
        ConflictRule::StrictRoom,
    ];

    /// Position in [`ALL`](Self::ALL).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short rule name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::ProfessorClash => "professor_clash",
            Self::RoomClash => "room_clash",
            Self::CurriculumClash => "curriculum_clash",
            Self::DailyWorkload => "daily_workload",
            Self::Adjacency => "adjacency",
            Self::StrictRoom => "strict_room",
        }
    }
}

impl fmt::Display for ConflictRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_matches_index() {
        for (i, rule) in ConflictRule::ALL.iter().enumerate() {
            assert_eq!(rule.index(), i);
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(ConflictRule::CurriculumClash.to_string(), "curriculum_clash");
        let json = serde_json::to_string(&ConflictRule::StrictRoom).unwrap();
        assert_eq!(json, "\"strict_room\"");
    }
}
