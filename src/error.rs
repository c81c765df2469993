//! Error types for timetable construction.
//!
//! Infeasibility is not an error: the solver reports it as
//! [`SolveOutcome::Infeasible`](crate::solver::SolveOutcome). Errors here are
//! data/config problems detected before search, or broken internal lookups.

use thiserror::Error;

use crate::config::ConfigError;
use crate::validation::ValidationError;

/// Main error type for timetable operations.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// A course violates its construction invariants.
    #[error("invalid course '{course}': {reason}")]
    InvalidCourse { course: String, reason: String },

    /// A course-part has no (professor, room, slot) candidate at all.
    #[error("course part '{part_id}' has no valid candidates")]
    EmptyDomain { part_id: String },

    /// Input validation found fatal issues.
    #[error("invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A graph lookup failed (missing node or wrong layer).
    #[error("graph lookup failed: {0}")]
    Graph(String),
}

/// Result type alias for timetable operations.
pub type Result<T> = std::result::Result<T, TimetableError>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
