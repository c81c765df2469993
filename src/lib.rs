//! Course timetabling for the U-Engine ecosystem.
//!
//! Assigns every course part a (professor, room, slot) triple such that no
//! hard constraint is violated, then picks the most compact timetable among
//! the solutions found.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `CoursePart`, `Professor`, `Room`,
//!   `Calendar`, `Slot`, `Catalog`, `ConflictRule`, `Schedule`, `Assignment`
//! - **`graph`**: Multilayer candidate graph (parts, professors, rooms, slots)
//!   and candidate generation
//! - **`conflict`**: Pairwise conflict relation over all candidates
//! - **`solver`**: MRV backtracking, first-solution and bounded
//!   multi-solution modes, gap scoring
//! - **`scheduler`**: End-to-end pipeline and timetable KPIs
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown
//!   professors, unqualified courses, empty calendar)
//! - **`config`**: TOML configuration of calendar, solver and filters
//!
//! # Architecture
//!
//! Data flows one way: raw records → `Catalog` → `CandidateGraph` →
//! `ConflictGraph` → `BacktrackingSolver` → `Schedule`. Everything before
//! the solver is immutable once built; the solver's trail is the only state
//! mutated during search.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach",
//!   Ch. 6: Constraint Satisfaction Problems

pub mod config;
pub mod conflict;
pub mod error;
pub mod graph;
pub mod models;
pub mod scheduler;
pub mod solver;
pub mod validation;

pub use error::{Result, TimetableError};
